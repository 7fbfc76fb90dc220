//! Converts a successful response body into the configured output shape

use serde::de::DeserializeOwned;
use serde_json::Value;
use tsheets_core::{OutputFormat, Result};

/// Successful API response in one of the three output shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
  /// Nested key-ordered maps and sequences
  Map(Value),
  /// Structured object with path accessors
  Object(ApiObject),
  /// Body exactly as received
  Raw(String),
}

impl Output {
  /// Parsed data for the `Map` and `Object` shapes
  pub fn as_value(&self) -> Option<&Value> {
    match self {
      Output::Map(value) => Some(value),
      Output::Object(object) => Some(object.as_value()),
      Output::Raw(_) => None,
    }
  }

  pub fn as_raw(&self) -> Option<&str> {
    match self {
      Output::Raw(body) => Some(body),
      _ => None,
    }
  }

  /// Parsed data regardless of shape; raw text is parsed on demand
  pub fn into_value(self) -> Result<Value> {
    match self {
      Output::Map(value) => Ok(value),
      Output::Object(object) => Ok(object.into_value()),
      Output::Raw(body) => parse(&body),
    }
  }

  /// Deserialize into a type chosen at the call site
  pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
    match self {
      Output::Raw(body) => Ok(serde_json::from_str(&body)?),
      other => Ok(serde_json::from_value(other.into_value()?)?),
    }
  }
}

/// A JSON document exposed through object-style accessors
#[derive(Debug, Clone, PartialEq)]
pub struct ApiObject(Value);

impl ApiObject {
  pub fn new(value: Value) -> Self {
    Self(value)
  }

  /// Member of an object, `None` for missing keys or non-objects
  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  /// Lookup by JSON pointer, e.g. `/results/users/1/first_name`
  pub fn pointer(&self, path: &str) -> Option<&Value> {
    self.0.pointer(path)
  }

  pub fn as_value(&self) -> &Value {
    &self.0
  }

  pub fn into_value(self) -> Value {
    self.0
  }

  pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
    Ok(T::deserialize(&self.0)?)
  }
}

/// Apply the output format to a body the transport already accepted
pub fn normalize(body: String, format: OutputFormat) -> Result<Output> {
  match format {
    OutputFormat::AssociativeMap => parse(&body).map(Output::Map),
    OutputFormat::TypedObject => parse(&body).map(|value| Output::Object(ApiObject::new(value))),
    OutputFormat::RawText => Ok(Output::Raw(body)),
  }
}

// An empty body (e.g. 204) carries no document
fn parse(body: &str) -> Result<Value> {
  if body.trim().is_empty() {
    return Ok(Value::Null);
  }
  Ok(serde_json::from_str(body)?)
}
