//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements the I/O boundary traits and wires up services.

pub mod cache;
pub mod di;
pub mod error;
pub mod stores;
pub mod traits;

pub use error::InfraError;
