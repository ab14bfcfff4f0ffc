//! API server lifecycle: bind a router, serve it from a background task,
//! and hand back a handle with a shutdown channel.
//!
//! Both binaries use this; they differ only in which router they mount.

use std::net::SocketAddr;

use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Session metadata for a running API server.
#[derive(Debug, Clone)]
pub struct ApiSession {
    pub session_id: String,
    pub service: &'static str,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running API server.
pub struct ApiServer {
    pub session: ApiSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Signal the server to stop accepting connections.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!(service = self.session.service, "API server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish (after `shutdown`, or on error).
    pub async fn wait(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(service = self.session.service, "API server task failed: {e}");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` (port 0 picks an ephemeral port) and serve `app` from a
/// background tokio task.
pub async fn start_api_server(
    service: &'static str,
    app: Router,
    addr: SocketAddr,
) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let session = ApiSession {
        session_id: Uuid::new_v4().to_string(),
        service,
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!(service, "API server received shutdown signal");
        };

        tracing::info!(service, %addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!(service, "API server error: {e}");
        }

        tracing::info!(service, "API server stopped");
    });

    Ok(ApiServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    use crate::api::router::patient_api_router;
    use crate::store::JsonFileStore;

    fn loopback() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
    }

    fn test_app() -> (Router, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(tmp.path().join("patients.json")));
        store.ensure_exists().unwrap();
        (patient_api_router(store), tmp)
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let (app, _tmp) = test_app();
        let mut server = start_api_server("patients", app, loopback())
            .await
            .expect("server should start");

        assert!(!server.session.session_id.is_empty());
        assert!(server.session.port > 0);

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://127.0.0.1:{}/create", server.session.port))
            .json(&serde_json::json!({
                "id": "P001", "name": "Ravi", "city": "Pune", "age": 40,
                "gender": "male", "height": 1.75, "weight": 70.0
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let url = format!("http://127.0.0.1:{}/patients/P001", server.session.port);
        let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body["bmi"], 22.86);

        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn session_has_valid_metadata() {
        let (app, _tmp) = test_app();
        let mut server = start_api_server("patients", app, loopback())
            .await
            .expect("server should start");

        assert_eq!(server.session.service, "patients");
        assert!(!server.session.started_at.is_empty());
        assert!(server.session.server_addr.contains(':'));

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (app, _tmp) = test_app();
        let mut server = start_api_server("patients", app, loopback())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown(); // Second call should be safe
        server.wait().await;
        server.wait().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let (app, _tmp) = test_app();
        let mut first = start_api_server("patients", app.clone(), loopback())
            .await
            .unwrap();
        let taken: SocketAddr = first.session.server_addr.parse().unwrap();

        assert!(start_api_server("patients", app, taken).await.is_err());
        first.shutdown();
    }
}
