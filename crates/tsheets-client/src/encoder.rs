//! Turns a logical operation into a wire-ready [`HttpRequest`].
//!
//! Reads and deletes carry their parameters in a url-encoded query string.
//! Writes carry a JSON body wrapped in the `{"data": ...}` envelope the API
//! expects. OAuth grants carry a url-encoded form body.

use crate::transport::{HttpMethod, HttpRequest};
use crate::USER_AGENT;
use serde::Serialize;
use serde_json::Value;
use tsheets_core::{ClientConfig, RequestFailure, Result};
use url::form_urlencoded;

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Builds requests against the endpoints of one client configuration
#[derive(Debug, Clone, Copy)]
pub struct RequestEncoder<'a> {
  config: &'a ClientConfig,
}

impl<'a> RequestEncoder<'a> {
  pub fn new(config: &'a ClientConfig) -> Self {
    Self { config }
  }

  /// GET or DELETE with `params` flattened into the query string
  pub fn query<P: Serialize + ?Sized>(
    &self,
    method: HttpMethod,
    endpoint: &str,
    params: &P,
  ) -> Result<HttpRequest> {
    let url = self.config.endpoint_url(endpoint);
    let pairs = to_value(params, &url).and_then(|value| {
      flatten_params(&value).map_err(|msg| RequestFailure::validation(msg, url.as_str()).into())
    })?;

    let query = encode_pairs(pairs);
    let url = if query.is_empty() { url } else { format!("{url}?{query}") };

    Ok(self.request(method, url, None, None))
  }

  /// POST or PUT with `payload` wrapped in the data envelope.
  ///
  /// With `require_indexed_array` the payload must be a list of objects; when
  /// it is false a single object is accepted as well.
  pub fn json<P: Serialize + ?Sized>(
    &self,
    method: HttpMethod,
    endpoint: &str,
    payload: &P,
    require_indexed_array: bool,
  ) -> Result<HttpRequest> {
    let url = self.config.endpoint_url(endpoint);
    let value = to_value(payload, &url)?;
    let body = wrap_envelope(value, require_indexed_array)
      .map_err(|msg| RequestFailure::validation(msg, url.as_str()))?;

    Ok(self.request(method, url, Some(body), Some(CONTENT_TYPE_JSON)))
  }

  /// POST with an url-encoded form body, fields sent in the given order
  pub fn form(&self, endpoint: &str, fields: &[(&str, &str)]) -> HttpRequest {
    let url = self.config.endpoint_url(endpoint);
    let body = encode_pairs(fields.iter().copied());
    self.request(HttpMethod::Post, url, Some(body), Some(CONTENT_TYPE_FORM))
  }

  fn request(
    &self,
    method: HttpMethod,
    url: String,
    body: Option<String>,
    content_type: Option<&str>,
  ) -> HttpRequest {
    let mut headers = vec![
      ("User-Agent".to_string(), USER_AGENT.to_string()),
      ("Referer".to_string(), self.config.base_url()),
    ];
    if let Some(token) = self.config.access_token.as_deref().filter(|t| !t.is_empty()) {
      headers.push(("Authorization".to_string(), format!("Bearer {token}")));
    }
    if let Some(content_type) = content_type {
      headers.push(("Content-Type".to_string(), content_type.to_string()));
    }

    HttpRequest {
      method,
      url,
      headers,
      body,
      verify_tls: !self.config.bypass_ssl_peer_verification,
    }
  }
}

fn to_value<P: Serialize + ?Sized>(payload: &P, url: &str) -> Result<Value> {
  serde_json::to_value(payload).map_err(|e| {
    RequestFailure::validation(format!("payload could not be encoded: {e}"), url).into()
  })
}

/// Name of a JSON value's kind, for validation messages
fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// Serialize a write payload as `{"data": payload}`
pub fn wrap_envelope(payload: Value, require_indexed_array: bool) -> std::result::Result<String, String> {
  match &payload {
    Value::Array(items) => {
      if require_indexed_array {
        if let Some(item) = items.iter().find(|item| !item.is_object()) {
          return Err(format!(
            "expected an array of objects, but an element is a {}",
            kind_of(item)
          ));
        }
      }
    }
    Value::Object(_) => {
      if require_indexed_array {
        return Err("expected an array of objects, but received a single object".to_string());
      }
    }
    other => {
      return Err(format!("expected an array or object, but received {}", kind_of(other)));
    }
  }

  let mut envelope = serde_json::Map::with_capacity(1);
  envelope.insert("data".to_string(), payload);
  serde_json::to_string(&Value::Object(envelope)).map_err(|e| e.to_string())
}

/// Flatten a parameter map into ordered key/value strings.
///
/// `null` (or unit) means no parameters. Scalars are rendered as their text,
/// lists of scalars are comma-joined, nested objects are rejected.
pub fn flatten_params(params: &Value) -> std::result::Result<Vec<(String, String)>, String> {
  match params {
    Value::Null => Ok(Vec::new()),
    Value::Object(map) => map
      .iter()
      .map(|(key, value)| render_param(key, value).map(|v| (key.clone(), v)))
      .collect(),
    other => Err(format!("expected a map of parameters, but received {}", kind_of(other))),
  }
}

fn render_param(key: &str, value: &Value) -> std::result::Result<String, String> {
  match value {
    Value::Array(items) => items
      .iter()
      .map(|item| render_scalar(key, item))
      .collect::<std::result::Result<Vec<_>, _>>()
      .map(|parts| parts.join(",")),
    other => render_scalar(key, other),
  }
}

fn render_scalar(key: &str, value: &Value) -> std::result::Result<String, String> {
  match value {
    Value::Null => Ok(String::new()),
    Value::Bool(b) => Ok(b.to_string()),
    Value::Number(n) => Ok(n.to_string()),
    Value::String(s) => Ok(s.clone()),
    other => Err(format!("parameter '{key}' cannot be query encoded from a nested {}", kind_of(other))),
  }
}

/// `key=value&key=value` with every key and value percent-encoded
pub fn encode_pairs<I, K, V>(pairs: I) -> String
where
  I: IntoIterator<Item = (K, V)>,
  K: AsRef<str>,
  V: AsRef<str>,
{
  let mut serializer = form_urlencoded::Serializer::new(String::new());
  for (key, value) in pairs {
    serializer.append_pair(key.as_ref(), value.as_ref());
  }
  serializer.finish()
}

/// One identifier or a list of them, sent as a single `ids` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ids(Vec<String>);

impl Ids {
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Comma-joined in input order
  pub fn joined(&self) -> String {
    self.0.join(",")
  }
}

macro_rules! impl_ids_from_int {
  ($($int:ty),*) => {
    $(
      impl From<$int> for Ids {
        fn from(id: $int) -> Self {
          Ids(vec![id.to_string()])
        }
      }
    )*
  };
}

impl_ids_from_int!(i32, i64, u32, u64, usize);

impl From<&str> for Ids {
  fn from(id: &str) -> Self {
    Ids(vec![id.to_string()])
  }
}

impl From<String> for Ids {
  fn from(id: String) -> Self {
    Ids(vec![id])
  }
}

impl<T: ToString> From<Vec<T>> for Ids {
  fn from(ids: Vec<T>) -> Self {
    Ids(ids.iter().map(ToString::to_string).collect())
  }
}

impl<T: ToString> From<&[T]> for Ids {
  fn from(ids: &[T]) -> Self {
    Ids(ids.iter().map(ToString::to_string).collect())
  }
}

impl<T: ToString, const N: usize> From<[T; N]> for Ids {
  fn from(ids: [T; N]) -> Self {
    Ids(ids.iter().map(ToString::to_string).collect())
  }
}
