//! Shared types for the API layer.

use std::sync::Arc;

use crate::predictor::PremiumModel;
use crate::store::JsonFileStore;

// ═══════════════════════════════════════════════════════════
// Service contexts: handler state, one per service
// ═══════════════════════════════════════════════════════════

/// State for the patient record service. The store owns the write lock
/// that serializes mutations.
#[derive(Clone)]
pub struct PatientContext {
    pub store: Arc<JsonFileStore>,
}

impl PatientContext {
    pub fn new(store: Arc<JsonFileStore>) -> Self {
        Self { store }
    }
}

/// State for the premium prediction service. The model is loaded once
/// at startup and never replaced.
#[derive(Clone)]
pub struct PremiumContext {
    pub model: Arc<dyn PremiumModel>,
}

impl PremiumContext {
    pub fn new(model: Arc<dyn PremiumModel>) -> Self {
        Self { model }
    }
}

// ═══════════════════════════════════════════════════════════
// Request context: injected by the audit middleware
// ═══════════════════════════════════════════════════════════

/// Per-request identity, available to handlers as an `Extension`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn generate() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}
