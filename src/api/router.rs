//! Routers for the two services.
//!
//! Both return a composable `Router` with state already applied, wrapped
//! in the audit logger. Patient responses also carry
//! `Cache-Control: no-store` since they contain personal health data.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::{PatientContext, PremiumContext};
use crate::predictor::PremiumModel;
use crate::store::JsonFileStore;

/// Build the patient record service router.
pub fn patient_api_router(store: Arc<JsonFileStore>) -> Router {
    let ctx = PatientContext::new(store);

    Router::new()
        .route("/", get(endpoints::info::root))
        .route("/about", get(endpoints::info::about))
        .route("/view", get(endpoints::patients::view))
        .route("/patients/:id", get(endpoints::patients::detail))
        .route("/sort", get(endpoints::patients::sort))
        .route("/create", post(endpoints::patients::create))
        .route("/edit/:id", put(endpoints::patients::update))
        .route("/delete/:id", delete(endpoints::patients::delete))
        .with_state(ctx)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}

/// Build the premium prediction service router around an already-loaded model.
pub fn premium_api_router(model: Arc<dyn PremiumModel>) -> Router {
    let ctx = PremiumContext::new(model);

    Router::new()
        .route("/", get(endpoints::health::root))
        .route("/health", get(endpoints::health::check))
        .route("/predict", post(endpoints::premium::predict))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}
