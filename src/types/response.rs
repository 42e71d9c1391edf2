use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object returned by a successful call.
///
/// For queries the prediction itself lives under `response`; feedback
/// replies are free-form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceResponse {
    body: Map<String, Value>,
}

impl ServiceResponse {
    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(body) => Ok(Self { body }),
            _ => Err(Error::InvalidResponse(
                "expected a JSON object in the response body".to_string(),
            )),
        }
    }

    /// The `response` field of a query result.
    pub fn response(&self) -> Option<&Value> {
        self.body.get("response")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.body
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }
}

impl From<Map<String, Value>> for ServiceResponse {
    fn from(body: Map<String, Value>) -> Self {
        Self { body }
    }
}
