//! In-memory [`RecordStore`] implementation.
//!
//! Records live in a `BTreeMap` keyed by id. Identifiers only ever grow, so
//! key order is creation order and listing needs no extra bookkeeping. A
//! single `RwLock` guards the map and the id counter together: readers share
//! it, and every mutation holds the write half for its whole duration.

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::RwLock;
use petstore_core::Resource;

use crate::storage::engine::RecordStore;

struct Inner<R> {
    next_id: u64,
    records: BTreeMap<u64, R>,
}

/// Process-lifetime store for one resource type.
pub struct MemoryStore<R> {
    inner: RwLock<Inner<R>>,
}

impl<R> MemoryStore<R> {
    /// Creates an empty store whose first assigned id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> RecordStore<R> for MemoryStore<R> {
    fn create(&self, draft: R::Draft) -> R {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        let record = R::from_draft(id, draft, Utc::now());
        inner.records.insert(id, record.clone());
        record
    }

    fn get(&self, id: u64) -> Option<R> {
        self.inner.read().records.get(&id).cloned()
    }

    fn list(&self) -> Vec<R> {
        self.inner.read().records.values().cloned().collect()
    }

    fn list_where(&self, predicate: &dyn Fn(&R) -> bool) -> Vec<R> {
        self.inner
            .read()
            .records
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    fn update(&self, id: u64, draft: R::Draft) -> Option<R> {
        let mut inner = self.inner.write();
        let record = inner.records.get_mut(&id)?;
        record.replace(draft, Utc::now());
        Some(record.clone())
    }

    fn delete(&self, id: u64) -> Option<R> {
        self.inner.write().records.remove(&id)
    }

    fn len(&self) -> usize {
        self.inner.read().records.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use petstore_core::{Pet, PetDraft, PetStatus};
    use proptest::prelude::*;

    use super::*;

    fn draft(name: &str) -> PetDraft {
        PetDraft {
            name: name.to_string(),
            ..PetDraft::default()
        }
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let store = MemoryStore::<Pet>::new();
        assert_eq!(store.create(draft("a")).id, 1);
        assert_eq!(store.create(draft("b")).id, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let store = MemoryStore::<Pet>::new();
        let first = store.create(draft("a"));
        assert!(store.delete(first.id).is_some());
        assert_eq!(store.create(draft("b")).id, 2);
    }

    #[test]
    fn create_then_get_returns_same_record() {
        let store = MemoryStore::<Pet>::new();
        let created = store.create(draft("Rex"));
        assert_eq!(store.get(created.id), Some(created));
    }

    #[test]
    fn missing_ids_are_not_found() {
        let store = MemoryStore::<Pet>::new();
        assert!(store.get(42).is_none());
        assert!(store.update(42, draft("x")).is_none());
        assert!(store.delete(42).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn second_delete_is_not_found() {
        let store = MemoryStore::<Pet>::new();
        let pet = store.create(draft("Rex"));
        assert!(store.delete(pet.id).is_some());
        assert!(store.delete(pet.id).is_none());
        assert!(store.get(pet.id).is_none());
    }

    #[test]
    fn update_replaces_fields_but_keeps_id() {
        let store = MemoryStore::<Pet>::new();
        let pet = store.create(PetDraft {
            name: "Rex".into(),
            tags: vec!["loud".into()],
            ..PetDraft::default()
        });
        let updated = store
            .update(
                pet.id,
                PetDraft {
                    name: "Max".into(),
                    status: PetStatus::Sold,
                    ..PetDraft::default()
                },
            )
            .unwrap();
        assert_eq!(updated.id, pet.id);
        assert_eq!(updated.name, "Max");
        assert!(updated.tags.is_empty());
        assert!(updated.updated_at.is_some());
        assert_eq!(store.get(pet.id), Some(updated));
    }

    #[test]
    fn list_where_filters_in_creation_order() {
        let store = MemoryStore::<Pet>::new();
        for (name, status) in [
            ("a", PetStatus::Available),
            ("b", PetStatus::Sold),
            ("c", PetStatus::Available),
        ] {
            store.create(PetDraft {
                name: name.into(),
                status,
                ..PetDraft::default()
            });
        }
        let available = store.list_where(&|pet: &Pet| pet.status == PetStatus::Available);
        let names: Vec<_> = available.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn concurrent_creates_never_collide() {
        let store = Arc::new(MemoryStore::<Pet>::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|i| store.create(draft(&format!("{t}-{i}"))).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert_eq!(store.len(), 400);
    }

    proptest! {
        #[test]
        fn list_after_n_creates_has_n_records_in_order(
            names in prop::collection::vec("[a-z]{1,12}", 0..40),
        ) {
            let store = MemoryStore::<Pet>::new();
            for name in &names {
                store.create(draft(name));
            }
            let listed: Vec<String> = store.list().into_iter().map(|p| p.name).collect();
            prop_assert_eq!(listed, names);
        }

        #[test]
        fn deleted_records_stay_gone(count in 1usize..20, victim in 0usize..20) {
            let store = MemoryStore::<Pet>::new();
            let ids: Vec<u64> = (0..count)
                .map(|i| store.create(draft(&i.to_string())).id)
                .collect();
            let id = ids[victim % count];
            prop_assert!(store.delete(id).is_some());
            prop_assert!(store.get(id).is_none());
            prop_assert!(store.delete(id).is_none());
            prop_assert_eq!(store.len(), count - 1);
        }
    }
}
