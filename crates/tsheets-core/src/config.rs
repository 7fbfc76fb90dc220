//! Configuration management for the TSheets client

use crate::error::{Error, Result};
use crate::types::OutputFormat;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Settings owned by a single client instance.
///
/// Mutated after construction only through the client's setters; nothing here
/// is shared between clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
  /// Host name portion of the REST url
  pub host: String,

  /// REST API version
  pub api_version: u32,

  /// Bearer token sent with every request when present
  pub access_token: Option<String>,

  /// OAuth2 client id, needed for the authorization url and token grants
  pub oauth_client_id: Option<String>,

  /// OAuth2 client secret, needed for token grants
  pub oauth_client_secret: Option<String>,

  /// Refresh token used by `refresh_access_token` when none is passed
  pub refresh_token: Option<String>,

  /// Shape of successful responses
  pub output_format: OutputFormat,

  /// Skip TLS peer verification. Should not normally be used.
  pub bypass_ssl_peer_verification: bool,

  /// Connect timeout in seconds
  pub connect_timeout_secs: u64,

  /// Replaces `https://<host>/api/v<version>` entirely, e.g. for a local mock
  #[serde(default)]
  pub base_url: Option<String>,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self::new(crate::DEFAULT_API_VERSION)
  }
}

impl ClientConfig {
  /// Config for the given API version with every optional setting unset
  pub fn new(api_version: u32) -> Self {
    ClientConfig {
      host: crate::DEFAULT_HOST.to_string(),
      api_version,
      access_token: None,
      oauth_client_id: None,
      oauth_client_secret: None,
      refresh_token: None,
      output_format: OutputFormat::default(),
      bypass_ssl_peer_verification: false,
      connect_timeout_secs: crate::DEFAULT_CONNECT_TIMEOUT_SECS,
      base_url: None,
    }
  }

  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let api_version = env::var("TSHEETS_API_VERSION")
      .unwrap_or_else(|_| crate::DEFAULT_API_VERSION.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid TSHEETS_API_VERSION".to_string()))?;

    let connect_timeout_secs = env::var("TSHEETS_CONNECT_TIMEOUT_SECS")
      .unwrap_or_else(|_| crate::DEFAULT_CONNECT_TIMEOUT_SECS.to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid TSHEETS_CONNECT_TIMEOUT_SECS".to_string()))?;

    let output_format = match env::var("TSHEETS_OUTPUT_FORMAT") {
      Ok(value) => value.parse()?,
      Err(_) => OutputFormat::default(),
    };

    let host = env::var("TSHEETS_HOST").unwrap_or_else(|_| crate::DEFAULT_HOST.to_string());

    Ok(ClientConfig {
      host,
      api_version,
      access_token: env::var("TSHEETS_ACCESS_TOKEN").ok(),
      oauth_client_id: env::var("TSHEETS_CLIENT_ID").ok(),
      oauth_client_secret: env::var("TSHEETS_CLIENT_SECRET").ok(),
      refresh_token: env::var("TSHEETS_REFRESH_TOKEN").ok(),
      output_format,
      bypass_ssl_peer_verification: false,
      connect_timeout_secs,
      base_url: env::var("TSHEETS_BASE_URL").ok(),
    })
  }

  pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
    self.access_token = Some(access_token.into());
    self
  }

  pub fn with_oauth_client(
    mut self,
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
  ) -> Self {
    self.oauth_client_id = Some(client_id.into());
    self.oauth_client_secret = Some(client_secret.into());
    self
  }

  pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
    self.refresh_token = Some(refresh_token.into());
    self
  }

  pub fn with_host(mut self, host: impl Into<String>) -> Self {
    self.host = host.into();
    self
  }

  pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
    self.output_format = output_format;
    self
  }

  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = Some(base_url.into());
    self
  }

  /// `https://<host>/api/v<version>` unless overridden
  pub fn base_url(&self) -> String {
    match &self.base_url {
      Some(base_url) => base_url.trim_end_matches('/').to_string(),
      None => format!("https://{}/api/v{}", self.host, self.api_version),
    }
  }

  /// Url of an endpoint below the base url, without any query string
  pub fn endpoint_url(&self, endpoint: &str) -> String {
    format!("{}/{}", self.base_url(), endpoint.trim_start_matches('/'))
  }

  pub fn connect_timeout(&self) -> Duration {
    Duration::from_secs(self.connect_timeout_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.host, "rest.tsheets.com");
    assert_eq!(config.api_version, 1);
    assert_eq!(config.output_format, OutputFormat::AssociativeMap);
    assert!(!config.bypass_ssl_peer_verification);
    assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    assert!(config.access_token.is_none());
  }

  #[test]
  fn test_urls() {
    let config = ClientConfig::new(1);
    assert_eq!(config.base_url(), "https://rest.tsheets.com/api/v1");
    assert_eq!(config.endpoint_url("timesheets"), "https://rest.tsheets.com/api/v1/timesheets");

    let config = config.with_host("localhost:8443");
    assert_eq!(config.endpoint_url("/grant"), "https://localhost:8443/api/v1/grant");

    let config = config.with_base_url("http://127.0.0.1:9000/api/v1/");
    assert_eq!(config.base_url(), "http://127.0.0.1:9000/api/v1");
    assert_eq!(config.endpoint_url("users"), "http://127.0.0.1:9000/api/v1/users");
  }

  #[test]
  fn test_builders() {
    let config = ClientConfig::new(1)
      .with_access_token("token")
      .with_oauth_client("id", "secret")
      .with_refresh_token("refresh")
      .with_output_format(OutputFormat::RawText);

    assert_eq!(config.access_token.as_deref(), Some("token"));
    assert_eq!(config.oauth_client_id.as_deref(), Some("id"));
    assert_eq!(config.oauth_client_secret.as_deref(), Some("secret"));
    assert_eq!(config.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(config.output_format, OutputFormat::RawText);
  }

  #[test]
  fn test_config_from_env() {
    env::set_var("TSHEETS_ACCESS_TOKEN", "test_token");
    env::set_var("TSHEETS_OUTPUT_FORMAT", "raw");
    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.access_token.as_deref(), Some("test_token"));
    assert_eq!(config.output_format, OutputFormat::RawText);
    assert_eq!(config.api_version, 1);
    env::remove_var("TSHEETS_ACCESS_TOKEN");
    env::remove_var("TSHEETS_OUTPUT_FORMAT");
  }
}
