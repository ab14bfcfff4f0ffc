//! HTTP surface for both services.
//!
//! `patient_api_router()` and `premium_api_router()` each return a
//! self-contained `Router` that can be mounted on any axum server instance.
//! `server` binds one of them and manages its shutdown.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::{patient_api_router, premium_api_router};
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::{PatientContext, PremiumContext};
