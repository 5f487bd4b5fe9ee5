//! Fee Estimation Module
//!
//! Pure fee arithmetic plus a node-backed quote service.

mod estimator;
mod service;

pub use estimator::*;
pub use service::*;
