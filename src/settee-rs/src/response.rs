use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ClientError, Result};

pub type BodyStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Response handed back by a [`Transport`](crate::Transport)
///
/// The body is a stream of chunks. It is released when the response is
/// dropped, whether or not it was read.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: BodyStream,
}

impl Response {
    pub fn from_stream<S>(status: StatusCode, headers: HeaderMap, body: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        Self {
            status,
            headers,
            body: body.boxed(),
        }
    }

    /// Canned response with a fully buffered body
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::from_stream(status, HeaderMap::new(), stream::once(async move { Ok(body) }))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Read the whole body
    pub async fn bytes(mut self) -> std::io::Result<Bytes> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(Bytes::from(buf))
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Check the status, then read and decode the JSON body.
pub async fn verify_and_decode<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected {
        return Err(ClientError::StatusMismatch {
            got: status.as_u16(),
            want: expected.as_u16(),
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(ClientError::Decode)
}

/// [`verify_and_decode`] into a generic JSON object
pub async fn verify_and_decode_map(
    response: Response,
    expected: StatusCode,
) -> Result<Map<String, Value>> {
    verify_and_decode(response, expected).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_decodes_object_body() {
        let response = Response::from_bytes(
            StatusCode::OK,
            "{\"couchdb\":\"Welcome\",\"version\":\"1.0.2\"}\r\n\r\n",
        );
        let map = verify_and_decode_map(response, StatusCode::OK).await.unwrap();
        assert_eq!(map["couchdb"], json!("Welcome"));
        assert_eq!(map["version"], json!("1.0.2"));
    }

    #[tokio::test]
    async fn test_status_mismatch() {
        let response = Response::from_bytes(StatusCode::NOT_FOUND, "{}");
        let err = verify_and_decode_map(response, StatusCode::CREATED).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::StatusMismatch { got: 404, want: 201 }
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let response = Response::from_bytes(StatusCode::OK, "{\"ok\":");
        let err = verify_and_decode_map(response, StatusCode::OK).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));

        // Valid JSON that is not an object
        let response = Response::from_bytes(StatusCode::OK, "[1, 2]");
        let err = verify_and_decode_map(response, StatusCode::OK).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_read_failure_is_io_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"{\"ok\"")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let response = Response::from_stream(StatusCode::OK, HeaderMap::new(), stream::iter(chunks));
        let err = verify_and_decode_map(response, StatusCode::OK).await.unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[tokio::test]
    async fn test_chunked_body_is_reassembled() {
        let chunks = vec![
            Ok(Bytes::from_static(b"{\"total_rows\":")),
            Ok(Bytes::from_static(b"3}")),
        ];
        let response = Response::from_stream(StatusCode::OK, HeaderMap::new(), stream::iter(chunks));
        let map = verify_and_decode_map(response, StatusCode::OK).await.unwrap();
        assert_eq!(map["total_rows"], json!(3));
    }

    struct ReleaseFlag(Arc<AtomicBool>);

    impl Drop for ReleaseFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_body_released_on_status_mismatch() {
        let released = Arc::new(AtomicBool::new(false));
        let flag = ReleaseFlag(released.clone());
        let body = stream::once(async move {
            let _flag = flag;
            Ok(Bytes::from_static(b"{}"))
        });
        let response = Response::from_stream(StatusCode::BAD_REQUEST, HeaderMap::new(), body);

        assert!(verify_and_decode_map(response, StatusCode::OK).await.is_err());
        assert!(released.load(Ordering::SeqCst));
    }
}
