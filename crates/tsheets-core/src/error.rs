use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// The main error type for the tsheets-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Encoding, transport or HTTP level failure of a request
  #[error("{0}")]
  Request(Box<RequestFailure>),

  /// The call succeeded but the body could not be parsed into the requested shape
  #[error("Deserialization error: {0}")]
  Deserialization(#[from] serde_json::Error),

  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),
}

impl Error {
  /// The request failure details, if this is a request error
  pub fn as_request_failure(&self) -> Option<&RequestFailure> {
    match self {
      Error::Request(failure) => Some(failure),
      _ => None,
    }
  }

  /// HTTP status of a failed request, when the server answered at all
  pub fn http_code(&self) -> Option<u16> {
    self.as_request_failure().and_then(|f| f.http_code)
  }
}

impl From<RequestFailure> for Error {
  fn from(failure: RequestFailure) -> Self {
    Error::Request(Box::new(failure))
  }
}

/// Details of a failed request.
///
/// Created for payloads that fail validation before anything is sent, for
/// transport errors (DNS, connect, TLS) and for responses with a status of
/// 400 or above.
#[derive(Debug, Clone)]
pub struct RequestFailure {
  /// Human readable summary including url, status and body
  pub message: String,
  /// Url that was attempted, with the query string for GET and DELETE
  pub full_url: String,
  /// HTTP status, `None` when no response was received
  pub http_code: Option<u16>,
  /// Raw response body
  pub http_body: Option<String>,
  /// Transport error text
  pub error_text: Option<String>,
  /// Transport error code
  pub error_code: Option<u32>,
  error_properties: OnceLock<Option<Value>>,
}

impl RequestFailure {
  /// Failure raised before the request left the client
  pub fn validation(message: impl Into<String>, full_url: impl Into<String>) -> Self {
    Self::new(message, full_url, None, None, None, None)
  }

  pub fn new(
    message: impl Into<String>,
    full_url: impl Into<String>,
    http_code: Option<u16>,
    http_body: Option<String>,
    error_text: Option<String>,
    error_code: Option<u32>,
  ) -> Self {
    Self {
      message: message.into(),
      full_url: full_url.into(),
      http_code,
      http_body,
      error_text,
      error_code,
      error_properties: OnceLock::new(),
    }
  }

  /// Structured error payload parsed from the body on first access.
  ///
  /// Returns `None` when there is no body or it is not JSON.
  pub fn error_properties(&self) -> Option<&Value> {
    self
      .error_properties
      .get_or_init(|| {
        self
          .http_body
          .as_deref()
          .filter(|body| !body.trim().is_empty())
          .and_then(|body| serde_json::from_str(body).ok())
      })
      .as_ref()
  }
}

impl fmt::Display for RequestFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}

/// Result type alias for tsheets-* crates
pub type Result<T> = std::result::Result<T, Error>;
