//! # backend-adapters
//!
//! Implementations of the `MaintenanceBackend` port.

pub mod http;

pub use http::{HttpBackend, SetupError};
