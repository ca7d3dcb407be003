use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use settee_core::Credentials;
use url::Url;

use crate::{ClientError, Result};

/// A fully formed request, ready to hand to a [`Transport`](crate::Transport)
///
/// Every request asks for the connection to be closed after one exchange and
/// is marked for chunked transfer encoding, which applies on the wire when
/// there is a body to send. `content_length` is kept as metadata only.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
    content_length: u64,
    close: bool,
    chunked: bool,
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Whether the connection must be torn down after this exchange
    pub fn close(&self) -> bool {
        self.close
    }

    /// Whether the body goes on the wire as chunks
    pub fn chunked(&self) -> bool {
        self.chunked
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Build a request for `url`.
///
/// A non-`None` header map is used as is. Credentials only produce an
/// `Authorization: Basic` header when they carry a password.
pub fn build_request(
    method: Method,
    url: &str,
    headers: Option<HeaderMap>,
    body: impl Into<Bytes>,
    credentials: Option<&Credentials>,
) -> Result<Request> {
    let url = Url::parse(url)?;
    let body = body.into();
    let mut headers = headers.unwrap_or_default();

    if let Some(Credentials {
        username,
        password: Some(password),
    }) = credentials
    {
        headers.insert(AUTHORIZATION, basic_auth(username, password)?);
    }

    Ok(Request {
        method,
        url,
        headers,
        content_length: body.len() as u64,
        body,
        close: true,
        chunked: true,
    })
}

fn basic_auth(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
        .map_err(|e| ClientError::Config(format!("authorization header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}
