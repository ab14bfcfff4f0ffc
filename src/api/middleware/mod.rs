//! API middleware.
//!
//! Both services wrap their routes in the audit logger, which tags each
//! request with an id and logs its outcome.

pub mod audit;
