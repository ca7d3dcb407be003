//! Settee Core Library
//!
//! Shared types for the Settee client, including:
//! - Connection descriptor parsing and URL derivation
//! - View query rows and results
//! - Recognised view query parameter names
//! - Client configuration

pub mod config;
pub mod descriptor;
pub mod models;
pub mod params;

// Re-export commonly used types
pub use config::ClientConfig;
pub use descriptor::{ConnectionDescriptor, Credentials};
pub use models::*;
