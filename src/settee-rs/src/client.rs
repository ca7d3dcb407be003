use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use settee_core::{ClientConfig, ConnectionDescriptor, DocumentId, Revision, Row, ViewResult};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::query::QueryParams;
use crate::request::build_request;
use crate::response::{verify_and_decode, verify_and_decode_map, Response};
use crate::transport::{ReqwestTransport, Transport};
use crate::{ClientError, Result};

/// Settee REST API Client
///
/// Holds an immutable connection descriptor and the transport used to reach
/// the server. Cloning shares the transport.
#[derive(Clone)]
pub struct Client {
    descriptor: ConnectionDescriptor,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client for the given connection string using the default transport
    pub fn new(url: &str) -> Result<Self> {
        let descriptor = ConnectionDescriptor::parse(url)?;
        Ok(Self::with_transport(descriptor, Arc::new(ReqwestTransport::new())))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let descriptor = ConnectionDescriptor::parse(&config.url)?;
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::with_transport(descriptor, Arc::new(transport)))
    }

    pub fn with_transport(descriptor: ConnectionDescriptor, transport: Arc<dyn Transport>) -> Self {
        Self {
            descriptor,
            transport,
        }
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: Option<HeaderMap>,
        body: Bytes,
    ) -> Result<Response> {
        let credentials = self.descriptor.credentials();
        let request = build_request(method, url, headers, body, credentials.as_ref())?;
        debug!("{} {}", request.method(), request.url());

        let response = self
            .transport
            .send(request)
            .await
            .map_err(ClientError::Transport)?;
        debug!("Response status: {}", response.status());
        Ok(response)
    }

    /// Check whether the server answers its root URL with a welcome message
    pub async fn running(&self) -> Result<bool> {
        let base_url = self.descriptor.base_url();
        if base_url.is_empty() {
            return Err(ClientError::Config("connection url not valid".to_string()));
        }

        let response = self.send(Method::GET, &base_url, None, Bytes::new()).await?;
        let welcome = verify_and_decode_map(response, StatusCode::OK).await?;

        let version = welcome
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let greeting = welcome.get("couchdb").and_then(Value::as_str);

        Ok(!version.is_empty() && greeting == Some("Welcome"))
    }

    /// List every database on the server
    pub async fn all_dbs(&self) -> Result<Vec<String>> {
        let url = self.descriptor.all_dbs_url();
        if url.is_empty() {
            return Err(ClientError::Config("connection url not valid".to_string()));
        }

        let response = self.send(Method::GET, &url, None, Bytes::new()).await?;
        verify_and_decode(response, StatusCode::OK).await
    }

    /// Store a new document, returning the id and revision the server assigned
    pub async fn insert<T: Serialize + ?Sized>(
        &self,
        document: &T,
    ) -> Result<(DocumentId, Revision)> {
        let url = self.descriptor.database_url();
        if url.is_empty() {
            return Err(ClientError::Config(
                "connection url has no database".to_string(),
            ));
        }

        let body = serde_json::to_vec(document).map_err(ClientError::Serialization)?;
        let response = self
            .send(Method::POST, &url, Some(json_headers()), body.into())
            .await?;
        let ack = verify_and_decode_map(response, StatusCode::CREATED).await?;

        let id = string_field(&ack, "id")?;
        let rev = string_field(&ack, "rev")?;
        if ack.get("ok") != Some(&Value::Bool(true)) {
            return Err(ClientError::Protocol("ok flag not true".to_string()));
        }

        Ok((DocumentId::new(id), Revision::new(rev)))
    }

    /// Query a view (or any row-returning endpoint) under the database.
    ///
    /// A body switches the request from GET to POST.
    pub async fn query(
        &self,
        path: &str,
        body: Option<&Value>,
        params: &QueryParams,
    ) -> Result<ViewResult> {
        let db_url = self.descriptor.database_url();
        if db_url.is_empty() {
            return Err(ClientError::Config(
                "connection url has no database".to_string(),
            ));
        }

        let mut url = format!("{}/{}", db_url, path.trim_start_matches('/'));
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query_string());
        }

        let (method, body) = match body {
            Some(json) => (
                Method::POST,
                serde_json::to_vec(json).map_err(ClientError::Serialization)?,
            ),
            None => (Method::GET, Vec::new()),
        };

        let response = self
            .send(method, &url, Some(json_headers()), body.into())
            .await?;
        let view = verify_and_decode_map(response, StatusCode::OK).await?;

        let total_rows = count_field(&view, "total_rows")?;
        let offset = count_field(&view, "offset")?;
        let rows = match view.get("rows") {
            Some(Value::Array(rows)) => rows,
            Some(_) => return Err(ClientError::Protocol("invalid rows value".to_string())),
            None => return Err(ClientError::Protocol("rows not set".to_string())),
        };

        let rows: Vec<Row> = rows.iter().filter_map(parse_row).collect();
        Ok(ViewResult {
            rows,
            total_rows,
            offset,
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn string_field<'a>(map: &'a Map<String, Value>, name: &str) -> Result<&'a str> {
    match map.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ClientError::Protocol(format!("invalid {} value", name))),
        None => Err(ClientError::Protocol(format!("{} not set", name))),
    }
}

fn count_field(map: &Map<String, Value>, name: &str) -> Result<u64> {
    match map.get(name) {
        Some(Value::Number(n)) => Ok(n
            .as_u64()
            .unwrap_or_else(|| n.as_f64().unwrap_or_default() as u64)),
        Some(_) => Err(ClientError::Protocol(format!("invalid {} value", name))),
        None => Err(ClientError::Protocol(format!("{} not set", name))),
    }
}

// Rows without a string id are dropped rather than failing the query
fn parse_row(row: &Value) -> Option<Row> {
    let Some(id) = row.get("id").and_then(Value::as_str) else {
        warn!("Dropping malformed view row: {}", row);
        return None;
    };

    Some(Row {
        id: DocumentId::new(id),
        key: row.get("key").cloned().unwrap_or(Value::Null),
        value: row.get("value").cloned().unwrap_or(Value::Null),
    })
}
