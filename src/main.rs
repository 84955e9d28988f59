use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use export_core::config::core_config_from_env_values;
use export_core::{DocumentEngine, ExportService, FsNodeStore};

/// Main entry point for the export server
///
/// Resolves configuration from the environment once, opens the node store and serves the
/// REST API until the server stops.
///
/// # Environment Variables
/// - `EXPORT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `NODE_DATA_DIR`: Directory holding node YAML files (default: "node_data")
/// - `EXPORT_ENABLED_EXTENSIONS`: Comma-separated extensions to offer (default: all)
/// - `EXPORT_DEFAULT_WIDTH`: Content width used when a request leaves it empty
/// - `EXPORT_MAX_FILE_NAME_LEN`: Longest accepted output file name (default: 200)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("export_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("export_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("EXPORT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = core_config_from_env_values(
        std::env::var("NODE_DATA_DIR").ok(),
        std::env::var("EXPORT_ENABLED_EXTENSIONS").ok(),
        std::env::var("EXPORT_DEFAULT_WIDTH").ok(),
        std::env::var("EXPORT_MAX_FILE_NAME_LEN").ok(),
    )?;
    let store = FsNodeStore::new(cfg.node_data_dir())?;

    tracing::info!("++ Serving nodes from {}", cfg.node_data_dir().display());
    tracing::info!(
        "++ Enabled extensions: {}",
        cfg.enabled_extensions()
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("++ Starting export REST on {}", rest_addr);

    let export_service = ExportService::new(Arc::new(cfg), Arc::new(DocumentEngine::new(store)));
    api_rest::serve(&rest_addr, AppState { export_service }).await
}
