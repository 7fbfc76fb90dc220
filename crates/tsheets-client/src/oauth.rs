//! OAuth2 authorization-code helpers.
//!
//! The flow runs Unauthenticated -> authorization url issued -> code exchanged
//! for tokens -> Authenticated, and may refresh from there at any time. The
//! client never refreshes on its own; a 401 is surfaced like any other
//! failure and the caller decides when to call `refresh_access_token`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::encoder::encode_pairs;

/// Endpoint the user is sent to in a browser to approve access
pub const AUTHORIZE_ENDPOINT: &str = "authorize";

/// Endpoint for code exchange and refresh grants
pub const GRANT_ENDPOINT: &str = "grant";

/// Token payload returned by the grant endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenResponse {
  pub access_token: String,
  /// Lifetime in seconds
  pub expires_in: i64,
  pub token_type: String,
  #[serde(default)]
  pub scope: Option<String>,
  #[serde(default)]
  pub refresh_token: Option<String>,
}

impl TokenResponse {
  pub fn expires_at(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::seconds(self.expires_in)
  }

  pub fn is_expired(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= self.expires_at(issued_at)
  }
}

/// One of the two grants accepted by the grant endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant<'a> {
  AuthorizationCode { code: &'a str, redirect_uri: &'a str },
  RefreshToken { refresh_token: &'a str },
}

impl<'a> Grant<'a> {
  /// Form fields in the order the API documents them
  pub fn form_fields(&self, client_id: &'a str, client_secret: &'a str) -> Vec<(&'a str, &'a str)> {
    match *self {
      Grant::AuthorizationCode { code, redirect_uri } => vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("redirect_uri", redirect_uri),
      ],
      Grant::RefreshToken { refresh_token } => vec![
        ("grant_type", "refresh_token"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
      ],
    }
  }
}

/// `<base_url>/authorize?response_type=code&client_id=..&redirect_uri=..&state=..`
pub fn authorization_url(base_url: &str, client_id: &str, redirect_uri: &str, state: &str) -> String {
  let query = encode_pairs([
    ("response_type", "code"),
    ("client_id", client_id),
    ("redirect_uri", redirect_uri),
    ("state", state),
  ]);
  format!("{base_url}/{AUTHORIZE_ENDPOINT}?{query}")
}
