//! Request and response bodies for the `/predict` operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Label;

/// Body of a prediction request.
///
/// `title` is optional at the type level so a missing or `null` field can be
/// reported as a validation error rather than a decode error. Only a JSON
/// object decodes; arrays and scalars are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PredictRequest {
    pub title: Option<String>,
}

impl TryFrom<Map<String, Value>> for PredictRequest {
    type Error = String;

    fn try_from(mut body: Map<String, Value>) -> Result<Self, Self::Error> {
        let title = match body.remove("title") {
            None | Some(Value::Null) => None,
            Some(Value::String(title)) => Some(title),
            Some(other) => {
                return Err(format!(
                    "invalid type for `title`: expected a string, found {}",
                    json_type(&other)
                ));
            }
        };
        Ok(Self { title })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl PredictRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// The title if it is present and non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

/// Body of a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Label,
}

/// Body of any error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}
