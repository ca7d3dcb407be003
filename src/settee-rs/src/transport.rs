use futures::stream::{self, TryStreamExt};
use reqwest::header::{HeaderValue, CONNECTION};
use settee_core::ClientConfig;

use crate::request::Request;
use crate::response::Response;
use crate::{ClientError, Result};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transport trait for exchanging one request for one response
///
/// Timeouts, pooling and TLS are whatever the implementation provides.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> std::result::Result<Response, BoxError>;
}

/// Default transport backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.insecure_skip_verify);

        if !config.ca_cert_path.is_empty() {
            let pem = std::fs::read(&config.ca_cert_path)
                .map_err(|e| ClientError::Config(format!("CA certificate {}: {e}", config.ca_cert_path)))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ClientError::Config(format!("CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> std::result::Result<Response, BoxError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        if request.close() {
            builder = builder.header(CONNECTION, HeaderValue::from_static("close"));
        }

        // Bodiless requests carry no body framing at all
        let chunked = request.chunked();
        let body = request.into_body();
        if !body.is_empty() {
            builder = if chunked {
                // A streamed body has no known length, so hyper frames it as chunks
                let chunks = stream::once(async move { Ok::<_, std::io::Error>(body) });
                builder.body(reqwest::Body::wrap_stream(chunks))
            } else {
                builder.body(body)
            };
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes_stream().map_err(std::io::Error::other);

        Ok(Response::from_stream(status, headers, body))
    }
}
