//! Network module with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` creates resources,
//! `start()` binds the TCP listener, and `serve()` starts accepting
//! connections. Binding before serving lets the caller learn the actual
//! port (useful with port 0) before any request is accepted.

use std::future::Future;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use petstore_core::{Item, Order, Pet, User};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

use super::config::{AppConfig, NetworkConfig};
use super::handlers::{
    create_record, delete_record, get_record, health_handler, inventory_handler, list_orders,
    list_pets, list_records, liveness_handler, readiness_handler, root_handler, update_record,
    AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;
use crate::storage::Repository;

/// Manages the full HTTP server lifecycle.
///
/// Follows the deferred startup pattern:
/// 1. `new()` -- allocates shared state (repository, shutdown controller)
/// 2. `start()` -- binds TCP listener to the configured address
/// 3. `serve()` -- begins accepting connections until shutdown is signalled
pub struct NetworkModule {
    config: NetworkConfig,
    app: Arc<AppConfig>,
    listener: Option<TcpListener>,
    repository: Repository,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, app: AppConfig, repository: Repository) -> Self {
        Self {
            config,
            app: Arc::new(app),
            listener: None,
            repository,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /`, `GET /health` -- informational health JSON
    /// - `GET /health/live`, `GET /health/ready` -- Kubernetes probes
    /// - `/pets`, `/orders`, `/users`, `/items` -- list and create
    /// - `/<resources>/{id}` -- read, replace, delete
    /// - `GET /inventory` -- pet counts per status
    ///
    /// Unmatched paths answer 404 `{"detail": "Not Found"}`.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            repository: self.repository.clone(),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::clone(&self.app),
        };

        let layers = build_http_layers(&self.config);

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/pets", get(list_pets).post(create_record::<Pet>))
            .route(
                "/pets/{id}",
                get(get_record::<Pet>)
                    .put(update_record::<Pet>)
                    .delete(delete_record::<Pet>),
            )
            .route("/orders", get(list_orders).post(create_record::<Order>))
            .route(
                "/orders/{id}",
                get(get_record::<Order>)
                    .put(update_record::<Order>)
                    .delete(delete_record::<Order>),
            )
            .route("/users", get(list_records::<User>).post(create_record::<User>))
            .route(
                "/users/{id}",
                get(get_record::<User>)
                    .put(update_record::<User>)
                    .delete(delete_record::<User>),
            )
            .route("/items", get(list_records::<Item>).post(create_record::<Item>))
            .route(
                "/items/{id}",
                get(get_record::<Item>)
                    .put(update_record::<Item>)
                    .delete(delete_record::<Item>),
            )
            .route("/inventory", get(inventory_handler))
            .fallback(not_found_fallback)
            .layer(layers)
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Starts serving connections until the shutdown signal fires.
    ///
    /// Consumes `self` because the listener is moved into the server.
    /// Once `shutdown` resolves the health state moves to Draining, axum
    /// finishes in-flight requests, and the state ends at Stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first, or if the server
    /// encounters a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;

        let router = self.build_router();
        let shutdown_ctrl = Arc::clone(&self.shutdown);
        let draining = Arc::clone(&self.shutdown);

        // Transition to Ready so readiness probes pass.
        shutdown_ctrl.set_ready();
        info!(
            app = %self.app.app_name,
            environment = %self.app.environment,
            "Serving HTTP connections"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown signal received, draining in-flight requests");
                draining.trigger_shutdown();
            })
            .await?;

        shutdown_ctrl.mark_stopped();
        info!(state = shutdown_ctrl.health_state().as_str(), "Server stopped");
        Ok(())
    }
}

/// Fallback for unmatched paths.
async fn not_found_fallback() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::HealthState;

    fn module() -> NetworkModule {
        NetworkModule::new(
            NetworkConfig::default(),
            AppConfig::default(),
            Repository::in_memory(),
        )
    }

    #[test]
    fn new_creates_module_without_binding() {
        assert!(module().listener.is_none());
    }

    #[test]
    fn shutdown_controller_returns_shared_arc() {
        let module = module();
        let s1 = module.shutdown_controller();
        let s2 = module.shutdown_controller();
        assert!(Arc::ptr_eq(&s1, &s2));
    }

    #[tokio::test]
    async fn build_router_serves_shared_repository() {
        use axum::body::Body;
        use axum::http::Request;
        use petstore_core::PetDraft;
        use tower::ServiceExt;

        let repository = Repository::in_memory();
        repository.pets.create(PetDraft {
            name: "Rex".to_string(),
            ..PetDraft::default()
        });
        let router = NetworkModule::new(NetworkConfig::default(), AppConfig::default(), repository)
            .build_router();

        let request = Request::builder().uri("/pets/1").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let pet: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(pet["name"], "Rex");
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = module();
        let port = module.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_fails_without_start() {
        let err = module()
            .serve(std::future::pending::<()>())
            .await
            .expect_err("serve without start should fail");
        assert!(err.to_string().contains("start() must be called"));
    }

    #[tokio::test]
    async fn serve_stops_when_signal_resolves() {
        let mut module = module();
        module.start().await.unwrap();
        let controller = module.shutdown_controller();
        module.serve(async {}).await.unwrap();
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }
}
