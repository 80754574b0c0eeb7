//! Record storage for the Pet Store server.
//!
//! - [`RecordStore`]: the per-resource CRUD contract
//! - [`MemoryStore`]: the lock-guarded in-memory implementation
//! - [`Repository`]: the four resource stores, owned by the application

pub mod engine;
pub mod engines;
pub mod repository;

pub use engine::RecordStore;
pub use engines::MemoryStore;
pub use repository::{Repository, Stored};
