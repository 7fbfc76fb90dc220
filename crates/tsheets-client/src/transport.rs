//! HTTP transport layer for TSheets API requests
//!
//! Requests and responses are plain data. Anything that can execute an
//! [`HttpRequest`] can stand in for the built-in reqwest transport, which
//! keeps the encoder and the failure rules testable without a network.

use reqwest::blocking::Client;
use reqwest::Method;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, error};
use tsheets_core::{Error, RequestFailure, Result};

/// HTTP verbs used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
  Get,
  Post,
  Put,
  Delete,
}

impl HttpMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
      HttpMethod::Put => "PUT",
      HttpMethod::Delete => "DELETE",
    }
  }
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A wire-ready request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
  pub method: HttpMethod,
  /// Full url, including the query string for GET and DELETE
  pub url: String,
  pub headers: Vec<(String, String)>,
  pub body: Option<String>,
  /// `false` only when peer verification was explicitly bypassed
  pub verify_tls: bool,
}

impl HttpRequest {
  /// First header value with the given name, compared case-insensitively
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, value)| value.as_str())
  }

  /// Url without the query string
  pub fn endpoint_url(&self) -> &str {
    self.url.split_once('?').map_or(self.url.as_str(), |(base, _)| base)
  }
}

/// What came back from one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
  pub status: u16,
  /// `None` when the transport produced no body at all
  pub body: Option<String>,
}

/// Coarse classification of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
  Connect,
  Timeout,
  Request,
  Body,
  Builder,
  Other,
}

impl TransportErrorKind {
  /// Stable numeric code reported in request failures
  pub fn code(&self) -> u32 {
    match self {
      TransportErrorKind::Connect => 1,
      TransportErrorKind::Timeout => 2,
      TransportErrorKind::Request => 3,
      TransportErrorKind::Body => 4,
      TransportErrorKind::Builder => 5,
      TransportErrorKind::Other => 99,
    }
  }
}

/// The exchange itself failed; no usable status or body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
  pub kind: TransportErrorKind,
  pub text: String,
}

impl TransportError {
  pub fn new(kind: TransportErrorKind, text: impl Into<String>) -> Self {
    Self { kind, text: text.into() }
  }
}

impl fmt::Display for TransportError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?} error: {}", self.kind, self.text)
  }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
  fn from(err: reqwest::Error) -> Self {
    let kind = if err.is_timeout() {
      TransportErrorKind::Timeout
    } else if err.is_connect() {
      TransportErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
      TransportErrorKind::Body
    } else if err.is_builder() {
      TransportErrorKind::Builder
    } else if err.is_request() {
      TransportErrorKind::Request
    } else {
      TransportErrorKind::Other
    };

    // reqwest keeps the useful detail (dns, tls, refused) in the source chain
    let mut text = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
      text.push_str(": ");
      text.push_str(&cause.to_string());
      source = cause.source();
    }

    TransportError { kind, text }
  }
}

/// Anything able to perform one HTTP exchange
pub trait HttpTransport {
  fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
  fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
    (**self).execute(request)
  }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
  fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
    (**self).execute(request)
  }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
  fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
    (**self).execute(request)
  }
}

/// Built-in blocking transport on reqwest
#[derive(Debug)]
pub struct ReqwestTransport {
  verified: Client,
  unverified: OnceLock<Client>,
  connect_timeout: Duration,
}

impl ReqwestTransport {
  /// Create a new transport instance
  pub fn new(connect_timeout: Duration) -> Result<Self> {
    let verified = build_client(connect_timeout, true)
      .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self { verified, unverified: OnceLock::new(), connect_timeout })
  }

  pub fn connect_timeout(&self) -> Duration {
    self.connect_timeout
  }

  fn client_for(&self, verify_tls: bool) -> std::result::Result<&Client, TransportError> {
    if verify_tls {
      return Ok(&self.verified);
    }
    if let Some(client) = self.unverified.get() {
      return Ok(client);
    }
    let client = build_client(self.connect_timeout, false)?;
    Ok(self.unverified.get_or_init(|| client))
  }
}

fn build_client(connect_timeout: Duration, verify_tls: bool) -> reqwest::Result<Client> {
  Client::builder()
    .connect_timeout(connect_timeout)
    .timeout(None::<Duration>)
    .gzip(true)
    .deflate(true)
    .brotli(true)
    .danger_accept_invalid_certs(!verify_tls)
    .build()
}

impl HttpTransport for ReqwestTransport {
  fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
    let client = self.client_for(request.verify_tls)?;

    let method = match request.method {
      HttpMethod::Get => Method::GET,
      HttpMethod::Post => Method::POST,
      HttpMethod::Put => Method::PUT,
      HttpMethod::Delete => Method::DELETE,
    };

    let mut builder = client.request(method, request.url.as_str());
    for (name, value) in &request.headers {
      builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
      builder = builder.body(body.clone());
    }

    let response = builder.send()?;
    let status = response.status().as_u16();
    // body is passed on untouched; invalid UTF-8 is a body error
    let bytes = response.bytes()?;
    let body = String::from_utf8(bytes.to_vec()).map_err(|e| {
      TransportError::new(TransportErrorKind::Body, format!("response body is not valid UTF-8: {e}"))
    })?;

    Ok(HttpResponse { status, body: Some(body) })
  }
}

/// Perform one exchange and apply the failure rule.
///
/// A transport error, a missing body or a status of 400 and above all become
/// a [`RequestFailure`]; otherwise the raw body is returned.
pub fn invoke<T: HttpTransport + ?Sized>(transport: &T, request: &HttpRequest) -> Result<String> {
  debug!("Making {} request to: {}", request.method, request.url);

  let (status, body, transport_error) = match transport.execute(request) {
    Ok(response) => (Some(response.status), response.body, None),
    Err(e) => (None, None, Some(e)),
  };

  match (status, body, transport_error) {
    (Some(status), Some(body), None) if status < 400 => {
      debug!("Request successful with status: {}, body length: {} bytes", status, body.len());
      Ok(body)
    }
    (status, body, transport_error) => {
      let mut message = format!(
        "invalid response from {} http_code:{}",
        request.endpoint_url(),
        status.unwrap_or(0)
      );
      if let Some(e) = &transport_error {
        message.push_str(&format!(" transport_error#: {}", e.kind.code()));
        message.push_str(&format!(" transport_error: {}", e.text));
      }
      if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
        message.push_str(&format!(" http_body: {}", body));
      }

      error!("Request failed: {}", message);

      Err(
        RequestFailure::new(
          message,
          request.url.clone(),
          status,
          body,
          transport_error.as_ref().map(|e| e.text.clone()),
          transport_error.as_ref().map(|e| e.kind.code()),
        )
        .into(),
      )
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Canned(std::result::Result<HttpResponse, TransportError>);

  impl HttpTransport for Canned {
    fn execute(&self, _request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
      self.0.clone()
    }
  }

  fn request(url: &str) -> HttpRequest {
    HttpRequest {
      method: HttpMethod::Get,
      url: url.to_string(),
      headers: vec![("User-Agent".to_string(), "test".to_string())],
      body: None,
      verify_tls: true,
    }
  }

  fn respond(status: u16, body: Option<&str>) -> Canned {
    Canned(Ok(HttpResponse { status, body: body.map(str::to_string) }))
  }

  #[test]
  fn test_success_returns_body() {
    let body = invoke(&respond(200, Some(r#"{"results":{}}"#)), &request("https://h/api/v1/users"))
      .unwrap();
    assert_eq!(body, r#"{"results":{}}"#);

    let body = invoke(&respond(204, Some("")), &request("https://h/api/v1/users")).unwrap();
    assert_eq!(body, "");
  }

  #[test]
  fn test_http_error_status_is_failure() {
    let err = invoke(
      &respond(417, Some(r#"{"error":{"code":417,"message":"Expectation Failed"}}"#)),
      &request("https://h/api/v1/users?active=yes"),
    )
    .unwrap_err();

    let failure = err.as_request_failure().expect("request failure");
    assert_eq!(failure.http_code, Some(417));
    assert_eq!(
      failure.http_body.as_deref(),
      Some(r#"{"error":{"code":417,"message":"Expectation Failed"}}"#)
    );
    assert_eq!(failure.full_url, "https://h/api/v1/users?active=yes");
    assert!(failure.message.starts_with("invalid response from https://h/api/v1/users http_code:417"));
    assert!(failure.message.contains("http_body: {\"error\""));
    assert_eq!(failure.error_properties().unwrap()["error"]["code"], 417);
    assert!(failure.error_text.is_none());
  }

  #[test]
  fn test_status_399_is_success_400_is_failure() {
    assert!(invoke(&respond(399, Some("ok")), &request("https://h/x")).is_ok());
    assert!(invoke(&respond(400, Some("bad")), &request("https://h/x")).is_err());
  }

  #[test]
  fn test_missing_body_is_failure() {
    let err = invoke(&respond(200, None), &request("https://h/api/v1/users")).unwrap_err();
    let failure = err.as_request_failure().unwrap();
    assert_eq!(failure.http_code, Some(200));
    assert!(failure.http_body.is_none());
    assert!(!failure.message.contains("http_body"));
  }

  #[test]
  fn test_transport_error_is_failure() {
    let transport = Canned(Err(TransportError::new(
      TransportErrorKind::Connect,
      "connection refused",
    )));
    let err = invoke(&transport, &request("https://h/api/v1/users")).unwrap_err();
    let failure = err.as_request_failure().unwrap();

    assert_eq!(failure.http_code, None);
    assert_eq!(failure.error_text.as_deref(), Some("connection refused"));
    assert_eq!(failure.error_code, Some(TransportErrorKind::Connect.code()));
    assert!(failure.message.contains("http_code:0"));
    assert!(failure.message.contains("transport_error: connection refused"));
  }

  #[test]
  fn test_request_helpers() {
    let req = request("https://h/api/v1/timesheets?ids=1%2C2");
    assert_eq!(req.endpoint_url(), "https://h/api/v1/timesheets");
    assert_eq!(req.header("user-agent"), Some("test"));
    assert!(req.header("authorization").is_none());
  }

  #[test]
  fn test_reqwest_transport_creation() {
    let transport = ReqwestTransport::new(Duration::from_secs(5)).expect("client");
    assert_eq!(transport.connect_timeout(), Duration::from_secs(5));
    assert!(transport.client_for(false).is_ok());
  }
}
