//! Locating the JSON object in a model reply.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("reply is empty")]
    Empty,
    #[error("no JSON object found in reply")]
    NoObject,
    #[error("invalid JSON: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("expected a JSON object, found {0}")]
    NotObject(&'static str),
}

/// Extract the single JSON object a reply is expected to contain.
///
/// The whole text is tried first; otherwise the span from the first `{` to
/// the last `}` is parsed. Either way the result must be an object.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, ResponseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ResponseError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return into_object(value);
    }

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(ResponseError::NoObject);
    };
    if end < start {
        return Err(ResponseError::NoObject);
    }

    into_object(serde_json::from_str(&text[start..=end])?)
}

fn into_object(value: Value) -> Result<Map<String, Value>, ResponseError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(ResponseError::NotObject("an array")),
        Value::String(_) => Err(ResponseError::NotObject("a string")),
        Value::Number(_) => Err(ResponseError::NotObject("a number")),
        Value::Bool(_) => Err(ResponseError::NotObject("a boolean")),
        Value::Null => Err(ResponseError::NotObject("null")),
    }
}
