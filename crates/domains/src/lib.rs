//! # domains
//!
//! The records, wire shapes, ports and pure classifiers of the
//! predictive-maintenance console. Nothing in this crate performs I/O.

pub mod dates;
pub mod error;
pub mod models;
pub mod ports;
pub mod severity;
pub mod status;
pub mod validation;
pub mod wire;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
pub use severity::*;
pub use status::*;
pub use validation::*;
