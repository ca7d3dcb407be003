use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use url::form_urlencoded::byte_serialize;

use crate::{ClientError, Result};

/// View query parameters, each value kept as its JSON encoding
///
/// Names are free-form; [`params`](crate::params) lists the ones the server
/// recognises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name`, JSON-encoding `value`
    pub fn push<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).map_err(ClientError::Serialization)?;
        self.pairs.push((name.to_string(), json));
        Ok(self)
    }

    /// Build from alternating name/value items.
    ///
    /// Pairs whose name is not a JSON string are skipped, as is a trailing
    /// name without a value.
    pub fn from_alternating<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        let mut pairs = Vec::with_capacity(items.len() / 2);

        for pair in items.chunks_exact(2) {
            match &pair[0] {
                Value::String(name) => pairs.push((name.clone(), pair[1].to_string())),
                other => warn!("Skipping query parameter with non-string name: {}", other),
            }
        }

        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `name=value&...` with both sides query-escaped
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, json)| format!("{}={}", escape(name), escape(json)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn escape(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use serde_json::json;

    #[test]
    fn test_values_are_json_then_escaped() {
        let query = QueryParams::new()
            .push(params::KEY, "abc")
            .unwrap()
            .push(params::LIMIT, &10)
            .unwrap()
            .push(params::DESCENDING, &true)
            .unwrap();
        assert_eq!(
            query.to_query_string(),
            "key=%22abc%22&limit=10&descending=true"
        );
    }

    #[test]
    fn test_escaped_json_round_trips() {
        let original = json!(["a b", {"x": "&=?+"}, 1.5, null]);
        let query = QueryParams::new().push(params::START_KEY, &original).unwrap();
        let encoded = query.to_query_string();

        let decoded: Vec<(String, String)> = url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].0, "startkey");
        let echoed: Value = serde_json::from_str(&decoded[0].1).unwrap();
        assert_eq!(echoed, original);
    }

    #[test]
    fn test_from_alternating_skips_non_string_names() {
        let query = QueryParams::from_alternating(vec![
            json!("key"),
            json!("abc"),
            json!(42),
            json!("dropped"),
            json!("limit"),
            json!(5),
            json!("dangling"),
        ]);
        assert_eq!(query.len(), 2);
        assert_eq!(query.to_query_string(), "key=%22abc%22&limit=5");
    }

    #[test]
    fn test_empty_params() {
        assert!(QueryParams::new().is_empty());
        assert_eq!(QueryParams::from_alternating(Vec::new()).to_query_string(), "");
    }

    #[test]
    fn test_unserializable_value_fails() {
        use std::collections::HashMap;
        // Non-string map keys cannot be encoded as JSON
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let err = QueryParams::new().push(params::KEY, &bad).unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }
}
