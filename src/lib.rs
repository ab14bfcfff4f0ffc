pub mod api; // HTTP routers, handlers, server lifecycle
pub mod config;
pub mod models; // Validated records + derived fields
pub mod predictor; // Premium model adapter
pub mod store; // JSON file store gateway

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ServiceConfig};
use crate::predictor::PredictError;
use crate::store::{JsonFileStore, StoreError};

/// Startup failures. Anything here stops the process before it serves.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Model error: {0}")]
    Model(#[from] PredictError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Run the patient record service until Ctrl-C.
pub async fn run_patient_service(config: ServiceConfig) -> Result<(), ServiceError> {
    tracing::info!("{} patient service starting v{}", config::APP_NAME, config::APP_VERSION);

    let store = Arc::new(JsonFileStore::new(&config.patients_file));
    if config.create_store {
        store.ensure_exists()?;
    }
    // Fail at startup rather than on the first request.
    let records = store.load()?.len();
    tracing::info!(path = %store.path().display(), records, "Patient store ready");

    let app = api::patient_api_router(store);
    let server = api::start_api_server("patients", app, config.patients_addr).await?;
    serve_until_ctrl_c(server).await
}

/// Run the premium prediction service until Ctrl-C.
pub async fn run_premium_service(config: ServiceConfig) -> Result<(), ServiceError> {
    tracing::info!("{} premium service starting v{}", config::APP_NAME, config::APP_VERSION);

    let model = predictor::load_model(&config.model_path)?;

    let app = api::premium_api_router(model);
    let server = api::start_api_server("premium", app, config.premium_addr).await?;
    serve_until_ctrl_c(server).await
}

async fn serve_until_ctrl_c(mut server: api::ApiServer) -> Result<(), ServiceError> {
    tracing::info!(addr = %server.session.server_addr, "Listening");
    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.wait().await;
    Ok(())
}
