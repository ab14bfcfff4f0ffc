//! API endpoint handlers.
//!
//! `info` and `patients` serve the patient record service; `health` and
//! `premium` serve the prediction service.

pub mod health;
pub mod info;
pub mod patients;
pub mod premium;
