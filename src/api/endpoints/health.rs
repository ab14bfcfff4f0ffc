//! Liveness and health endpoints for the premium service.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::endpoints::info::MessageResponse;
use crate::api::types::PremiumContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_name: String,
    pub model_version: String,
}

/// `GET /`: liveness message.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Insurance Premium Prediction API",
    })
}

/// `GET /health`: reports the loaded model.
pub async fn check(State(ctx): State<PremiumContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model_name: ctx.model.name().to_string(),
        model_version: ctx.model.version().to_string(),
    })
}
