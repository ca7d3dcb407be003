//! Settee Client Library
//!
//! HTTP client for CouchDB-compatible REST API servers.

mod client;
pub mod query;
pub mod request;
pub mod response;
pub mod transport;

pub use client::Client;
pub use query::QueryParams;
pub use request::{build_request, Request};
pub use response::{verify_and_decode, verify_and_decode_map, Response};
pub use transport::{BoxError, ReqwestTransport, Transport};

pub use reqwest::{Method, StatusCode};
pub use settee_core::params;
pub use settee_core::{
    ClientConfig, ConnectionDescriptor, Credentials, DocumentId, Revision, Row, ViewResult,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid connection url: {0}")]
    Parse(#[from] url::ParseError),

    #[error("Client not configured: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[source] BoxError),

    #[error("Unexpected status {got} (expected {want})")]
    StatusMismatch { got: u16, want: u16 },

    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Invalid response from server: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
