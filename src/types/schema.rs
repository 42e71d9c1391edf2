use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Service schema version discovered by the liveness probe.
///
/// Deployments older than [`SchemaVersion::HEADER_AUTH_ONLY`] only read the
/// API key from the JSON body, so it is embedded there in addition to the
/// basic-auth header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(i64);

impl SchemaVersion {
    /// Used whenever discovery fails.
    pub const UNKNOWN: SchemaVersion = SchemaVersion(-1);

    /// First version that authenticates from the header alone.
    pub const HEADER_AUTH_ONLY: SchemaVersion = SchemaVersion(7);

    pub fn new(version: i64) -> Self {
        Self(version)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_known(self) -> bool {
        self != Self::UNKNOWN
    }

    pub fn requires_api_key_in_body(self) -> bool {
        self < Self::HEADER_AUTH_ONLY
    }

    /// Extract `schema_version` from a ping body.
    ///
    /// Malformed JSON, a non-object body, a missing field or a non-integer
    /// value all resolve to [`SchemaVersion::UNKNOWN`].
    pub fn from_ping_body(body: &str) -> Self {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("schema_version").and_then(Value::as_i64))
            .map(Self)
            .unwrap_or(Self::UNKNOWN)
    }

    /// Merge `api_key` into a request body when this version needs it.
    pub fn shape_body(self, mut body: Map<String, Value>, api_key: &str) -> Map<String, Value> {
        if self.requires_api_key_in_body() {
            body.insert("api_key".to_string(), Value::String(api_key.to_string()));
        }
        body
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_ping_body() {
        assert_eq!(
            SchemaVersion::from_ping_body(r#"{"schema_version": 9}"#),
            SchemaVersion::new(9)
        );
        assert_eq!(
            SchemaVersion::from_ping_body(r#"{"status": "ok"}"#),
            SchemaVersion::UNKNOWN
        );
        assert_eq!(
            SchemaVersion::from_ping_body("<html>ok</html>"),
            SchemaVersion::UNKNOWN
        );
        assert_eq!(
            SchemaVersion::from_ping_body(r#"{"schema_version": "7"}"#),
            SchemaVersion::UNKNOWN
        );
        assert_eq!(SchemaVersion::from_ping_body("[]"), SchemaVersion::UNKNOWN);
    }

    #[test]
    fn test_api_key_threshold() {
        assert!(SchemaVersion::UNKNOWN.requires_api_key_in_body());
        assert!(SchemaVersion::new(6).requires_api_key_in_body());
        assert!(!SchemaVersion::new(7).requires_api_key_in_body());
        assert!(!SchemaVersion::new(12).requires_api_key_in_body());
        assert!(!SchemaVersion::default().is_known());
        assert_eq!(SchemaVersion::default().value(), -1);
        assert_eq!(SchemaVersion::new(8).value(), 8);
    }

    #[test]
    fn test_shape_body() {
        let mut body = Map::new();
        body.insert("data".into(), json!({"x": 1}));

        let old = SchemaVersion::new(5).shape_body(body.clone(), "k");
        assert_eq!(Value::Object(old), json!({"data": {"x": 1}, "api_key": "k"}));

        let new = SchemaVersion::new(9).shape_body(body, "k");
        assert_eq!(Value::Object(new), json!({"data": {"x": 1}}));
    }
}
