//! HTTP handler definitions for the Pet Store server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod orders;
pub mod pets;
pub mod resources;

pub use health::{health_handler, liveness_handler, readiness_handler, root_handler};
pub use orders::list_orders;
pub use pets::{inventory_handler, list_pets};
pub use resources::{create_record, delete_record, get_record, list_records, update_record};

use std::sync::Arc;

use super::{AppConfig, ShutdownController};
use crate::storage::Repository;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The resource stores. Owned by the application, injected at startup.
    pub repository: Repository,
    /// Lifecycle state for readiness probes.
    pub shutdown: Arc<ShutdownController>,
    /// Application settings (name, environment).
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State over `repository` with default settings, in the `Starting` state.
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(AppConfig::default()),
        }
    }
}
