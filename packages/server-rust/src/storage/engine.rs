//! Record store trait: the CRUD contract every resource store implements.
//!
//! A [`RecordStore`] owns all records of one resource type plus the counter
//! that assigns their identifiers. Absence is reported through `Option`, never
//! as an error, so callers decide how to surface it.

use petstore_core::Resource;

/// CRUD storage for one resource type.
///
/// Wrapped in `Arc<dyn RecordStore<R>>` for sharing across handlers.
/// Implementations must make every operation atomic with respect to the
/// others; two concurrent `create` calls never receive the same id.
pub trait RecordStore<R: Resource>: Send + Sync + 'static {
    /// Assigns the next identifier, stores the record, and returns it.
    fn create(&self, draft: R::Draft) -> R;

    /// Returns the record with `id`, or `None` if absent.
    fn get(&self, id: u64) -> Option<R>;

    /// Returns a snapshot of every record in creation order.
    fn list(&self) -> Vec<R>;

    /// Returns a snapshot of the records matching `predicate`, in creation order.
    fn list_where(&self, predicate: &dyn Fn(&R) -> bool) -> Vec<R>;

    /// Replaces every field except the identifier. `None` if absent.
    fn update(&self, id: u64, draft: R::Draft) -> Option<R>;

    /// Removes and returns the record with `id`. `None` if absent.
    fn delete(&self, id: u64) -> Option<R>;

    /// Number of records currently stored.
    fn len(&self) -> usize;

    /// Whether the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
