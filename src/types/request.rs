use crate::error::{Error, ErrorContext};
use crate::types::SchemaVersion;
use crate::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::{Map, Value};

/// Everything except unreserved characters and `/` is escaped, so nested
/// object names keep their path structure.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode a predictive object URI for use as a path suffix.
pub fn encode_uri(uri: &str) -> String {
    utf8_percent_encode(uri, URI_ENCODE_SET).to_string()
}

/// Serialize caller data and require a JSON object.
fn to_mapping<T: Serialize + ?Sized>(value: &T, field: &str) -> Result<Map<String, Value>> {
    let context = || ErrorContext::new().with_field_path(field);
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::invalid_argument_with_context(
            format!("'{}' needs to be a mapping", field),
            context().with_details(format!("expected a JSON object, got {}", kind(&other))),
        )),
        Err(e) => Err(Error::invalid_argument_with_context(
            format!("'{}' cannot be serialized", field),
            context().with_details(e.to_string()),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_argument_with_context(
            format!("'{}' has to be a non-empty string", field),
            ErrorContext::new().with_field_path(field),
        ));
    }
    Ok(())
}

/// A query against a deployed predictive object.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub uri: String,
    pub data: Map<String, Value>,
}

impl QueryRequest {
    /// Validate the arguments of a query; nothing is sent yet.
    pub fn new<P: Serialize + ?Sized>(uri: &str, params: &P) -> Result<Self> {
        require_non_empty(uri, "uri")?;
        let data = to_mapping(params, "params")?;
        Ok(Self {
            uri: uri.to_string(),
            data,
        })
    }

    pub fn encoded_uri(&self) -> String {
        encode_uri(&self.uri)
    }

    /// Path relative to the service endpoint.
    pub fn path(&self) -> String {
        format!("query/{}", self.encoded_uri())
    }

    pub fn into_body(self, schema: SchemaVersion, api_key: &str) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("data".to_string(), Value::Object(self.data));
        schema.shape_body(body, api_key)
    }
}

/// Free-form feedback about an earlier query result.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRequest {
    pub id: String,
    pub data: Map<String, Value>,
}

impl FeedbackRequest {
    pub const PATH: &'static str = "feedback";

    pub fn new<D: Serialize + ?Sized>(key: &str, data: &D) -> Result<Self> {
        require_non_empty(key, "key")?;
        let data = to_mapping(data, "data")?;
        Ok(Self {
            id: key.to_string(),
            data,
        })
    }

    pub fn into_body(self, schema: SchemaVersion, api_key: &str) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("data".to_string(), Value::Object(self.data));
        body.insert("id".to_string(), Value::String(self.id));
        schema.shape_body(body, api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_encode_uri() {
        assert_eq!(encode_uri("recommender"), "recommender");
        assert_eq!(encode_uri("my model"), "my%20model");
        assert_eq!(encode_uri("a/b-c_d.e~f"), "a/b-c_d.e~f");
        assert_eq!(encode_uri("q?x=1&y"), "q%3Fx%3D1%26y");
        assert_eq!(encode_uri("modèle"), "mod%C3%A8le");
    }

    #[test]
    fn test_query_request_accepts_typed_params() {
        let mut params = HashMap::new();
        params.insert("method", json!("predict"));
        let req = QueryRequest::new("recommender", &params).unwrap();
        assert_eq!(req.path(), "query/recommender");
        assert_eq!(req.data.get("method"), Some(&json!("predict")));
    }

    #[test]
    fn test_query_request_rejects_non_mapping_params() {
        let err = QueryRequest::new("recommender", &json!(123)).unwrap_err();
        assert!(err.is_invalid_argument());
        let ctx = err.context().unwrap();
        assert_eq!(ctx.field_path.as_deref(), Some("params"));
        assert_eq!(
            ctx.details.as_deref(),
            Some("expected a JSON object, got a number")
        );

        assert!(QueryRequest::new("recommender", &vec![1, 2])
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_query_request_rejects_empty_uri() {
        let blank = QueryRequest::new(" ", &json!({})).unwrap();
        assert_eq!(blank.path(), "query/%20");

        let err = QueryRequest::new("", &json!({})).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("uri")
        );
    }

    #[test]
    fn test_query_body_shape() {
        let req = QueryRequest::new("m", &json!({"method": "predict"})).unwrap();
        let body = req.into_body(SchemaVersion::new(9), "secret");
        assert_eq!(Value::Object(body), json!({"data": {"method": "predict"}}));
    }

    #[test]
    fn test_feedback_body_shape() {
        let req = FeedbackRequest::new("id1", &json!({"user_clicked": 3})).unwrap();
        let body = req.into_body(SchemaVersion::UNKNOWN, "secret");
        assert_eq!(
            Value::Object(body),
            json!({"data": {"user_clicked": 3}, "id": "id1", "api_key": "secret"})
        );
    }

    #[test]
    fn test_feedback_request_validation() {
        assert!(FeedbackRequest::new("", &json!({}))
            .unwrap_err()
            .is_invalid_argument());
        let err = FeedbackRequest::new("id1", &json!("text")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: 'data' needs to be a mapping (field: data, details: expected a JSON object, got a string)"
        );
    }
}
