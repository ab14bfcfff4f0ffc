//! Insurance premium prediction service.

use carepoint_lib::config::ServiceConfig;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    carepoint_lib::init_tracing();

    let result = match ServiceConfig::from_env() {
        Ok(config) => carepoint_lib::run_premium_service(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Premium service failed: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
