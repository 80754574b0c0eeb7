//! Pet Store server entry point.
//!
//! Reads settings from flags, the environment, and `.env`, installs the log
//! subscriber, and serves the API until SIGINT or SIGTERM.

use petstore_server::config::ServerArgs;
use petstore_server::network::{shutdown_signal, NetworkModule};
use petstore_server::storage::Repository;
use petstore_server::telemetry::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::load();
    init_tracing(args.log_format, args.debug)?;

    let app = args.app_config();
    info!(
        app = %app.app_name,
        version = env!("CARGO_PKG_VERSION"),
        environment = %app.environment,
        "Starting server"
    );

    let repository = Repository::in_memory();
    if args.sample_data {
        repository.seed_sample_data();
    }

    let mut module = NetworkModule::new(args.network_config(), app, repository);
    let port = module.start().await?;
    info!("Listening on http://{}:{port}", args.host);

    module.serve(shutdown_signal()).await
}
