//! Static informational endpoints for the patient service.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `GET /`: liveness message.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Patient Management System API",
    })
}

/// `GET /about`: static description.
pub async fn about() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "A fully functional API to manage your patient records",
    })
}
