//! The application's record stores, bundled into one injectable object.

use std::collections::BTreeMap;
use std::sync::Arc;

use petstore_core::{Item, Order, Pet, PetDraft, PetStatus, Resource, User, UserDraft};
use serde::Serialize;
use tracing::info;

use super::engine::RecordStore;
use super::engines::MemoryStore;

/// One store per resource type, created at startup and shared by handlers.
///
/// Stores are independent: no operation on one store reads another.
#[derive(Clone)]
pub struct Repository {
    pub pets: Arc<dyn RecordStore<Pet>>,
    pub orders: Arc<dyn RecordStore<Order>>,
    pub users: Arc<dyn RecordStore<User>>,
    pub items: Arc<dyn RecordStore<Item>>,
}

impl Repository {
    /// Creates a repository backed by empty [`MemoryStore`]s.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            pets: Arc::new(MemoryStore::<Pet>::new()),
            orders: Arc::new(MemoryStore::<Order>::new()),
            users: Arc::new(MemoryStore::<User>::new()),
            items: Arc::new(MemoryStore::<Item>::new()),
        }
    }

    /// Returns the store for resource type `R`.
    #[must_use]
    pub fn store<R: Stored>(&self) -> &Arc<dyn RecordStore<R>> {
        R::store(self)
    }

    /// Counts pets per status. Statuses with no pets are omitted.
    #[must_use]
    pub fn inventory(&self) -> BTreeMap<PetStatus, u64> {
        let mut counts = BTreeMap::new();
        for pet in self.pets.list() {
            *counts.entry(pet.status).or_insert(0) += 1;
        }
        counts
    }

    /// Loads the demo catalogue: three pets and two users.
    pub fn seed_sample_data(&self) {
        let pets = [
            (
                "Buddy",
                "dog",
                PetStatus::Available,
                ["friendly", "house-trained"],
                299.99,
                "A friendly golden retriever",
            ),
            (
                "Whiskers",
                "cat",
                PetStatus::Available,
                ["playful", "indoor"],
                199.99,
                "A playful orange tabby cat",
            ),
            (
                "Tweety",
                "bird",
                PetStatus::Sold,
                ["colorful", "singing"],
                89.99,
                "A beautiful canary",
            ),
        ];
        for (name, category, status, tags, price, description) in pets {
            self.pets.create(PetDraft {
                name: name.to_string(),
                category: Some(category.to_string()),
                status,
                tags: tags.iter().map(ToString::to_string).collect(),
                price: Some(price),
                description: Some(description.to_string()),
                photo_urls: vec![format!(
                    "https://example.com/{}1.jpg",
                    name.to_lowercase()
                )],
            });
        }

        let users = [
            ("johndoe", "John", "john@example.com", "+1234567890"),
            ("janedoe", "Jane", "jane@example.com", "+1234567891"),
        ];
        for (username, first_name, email, phone) in users {
            self.users.create(UserDraft {
                username: username.to_string(),
                first_name: Some(first_name.to_string()),
                last_name: Some("Doe".to_string()),
                email: Some(email.to_string()),
                password: Some("password123".to_string()),
                phone: Some(phone.to_string()),
                user_status: 1,
            });
        }

        info!(
            pets = self.pets.len(),
            users = self.users.len(),
            "Loaded sample data"
        );
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Resources that have a store in the [`Repository`] and a JSON representation.
pub trait Stored: Resource + Serialize {
    fn store(repository: &Repository) -> &Arc<dyn RecordStore<Self>>;
}

impl Stored for Pet {
    fn store(repository: &Repository) -> &Arc<dyn RecordStore<Self>> {
        &repository.pets
    }
}

impl Stored for Order {
    fn store(repository: &Repository) -> &Arc<dyn RecordStore<Self>> {
        &repository.orders
    }
}

impl Stored for User {
    fn store(repository: &Repository) -> &Arc<dyn RecordStore<Self>> {
        &repository.users
    }
}

impl Stored for Item {
    fn store(repository: &Repository) -> &Arc<dyn RecordStore<Self>> {
        &repository.items
    }
}
