/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. TSheets Rust Client Contributors
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use crate::encoder::{Ids, RequestEncoder};
use crate::normalizer::{normalize, Output};
use crate::oauth::{authorization_url, Grant, TokenResponse, GRANT_ENDPOINT};
use crate::transport::{invoke, HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument};
use tsheets_core::{
  ClientConfig, ObjectType, OutputFormat, ReportType, RequestFailure, Result,
};

/// Main TSheets API client
///
/// Every operation encodes one request, performs exactly one blocking round
/// trip and normalizes the body into the configured [`OutputFormat`].
/// Failures are returned immediately; nothing is retried.
///
/// The client owns mutable state (access token, output format) and all
/// setters take `&mut self`. It is not synchronized internally: use one
/// client per thread, or wrap it in a lock when it must be shared.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_json::json;
/// use tsheets_client::{ObjectType, TSheetsClient};
/// use tsheets_core::ClientConfig;
///
/// let config = ClientConfig::new(1).with_access_token("your_access_token");
/// let client = TSheetsClient::new(config)?;
///
/// let jobcodes = client.get(ObjectType::Jobcodes, ())?;
/// let users = client.get(ObjectType::Users, json!({"modified_since": "2014-01-12T15:19:21+00:00"}))?;
/// # Ok::<(), tsheets_core::Error>(())
/// ```
#[derive(Debug)]
pub struct TSheetsClient<T: HttpTransport = ReqwestTransport> {
  config: ClientConfig,
  transport: T,
}

impl TSheetsClient<ReqwestTransport> {
  /// Create a new client on the built-in reqwest transport
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn new(config: ClientConfig) -> Result<Self> {
    let transport = ReqwestTransport::new(config.connect_timeout())?;
    Ok(Self { config, transport })
  }

  /// Create a client from the individual credentials.
  ///
  /// `access_token` may be omitted when one will be obtained through
  /// [`get_access_token`](Self::get_access_token). The OAuth client id and
  /// secret are only needed for the token grants.
  pub fn with_credentials(
    api_version: u32,
    access_token: Option<&str>,
    oauth_client_id: Option<&str>,
    oauth_client_secret: Option<&str>,
    refresh_token: Option<&str>,
  ) -> Result<Self> {
    let mut config = ClientConfig::new(api_version);
    config.access_token = access_token.map(str::to_string);
    config.oauth_client_id = oauth_client_id.map(str::to_string);
    config.oauth_client_secret = oauth_client_secret.map(str::to_string);
    config.refresh_token = refresh_token.map(str::to_string);
    Self::new(config)
  }
}

impl<T: HttpTransport> TSheetsClient<T> {
  /// Create a client on a caller supplied transport
  pub fn with_transport(config: ClientConfig, transport: T) -> Self {
    Self { config, transport }
  }

  pub fn config(&self) -> &ClientConfig {
    &self.config
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  /// `https://<host>/api/v<version>`
  pub fn base_url(&self) -> String {
    self.config.base_url()
  }

  pub fn output_format(&self) -> OutputFormat {
    self.config.output_format
  }

  pub fn set_access_token(&mut self, access_token: impl Into<String>) {
    self.config.access_token = Some(access_token.into());
  }

  /// Drop the access token; later requests go out without `Authorization`
  pub fn clear_access_token(&mut self) {
    self.config.access_token = None;
  }

  pub fn set_refresh_token(&mut self, refresh_token: impl Into<String>) {
    self.config.refresh_token = Some(refresh_token.into());
  }

  /// Change the host name portion of the REST url.
  ///
  /// Has no effect while a full base url override is configured.
  pub fn set_host(&mut self, host: impl Into<String>) {
    self.config.host = host.into();
  }

  pub fn set_output_format(&mut self, output_format: OutputFormat) {
    self.config.output_format = output_format;
  }

  /// Set the output format by name, failing on anything unrecognized
  pub fn set_output_format_str(&mut self, output_format: &str) -> Result<()> {
    self.config.output_format = output_format.parse()?;
    Ok(())
  }

  /// Skip TLS peer verification. This should not normally be used.
  pub fn bypass_ssl_peer_verification(&mut self, bypass: bool) {
    self.config.bypass_ssl_peer_verification = bypass;
  }

  /// Adopt the tokens from a grant response
  pub fn store_token(&mut self, token: &TokenResponse) {
    self.config.access_token = Some(token.access_token.clone());
    if let Some(refresh_token) = &token.refresh_token {
      self.config.refresh_token = Some(refresh_token.clone());
    }
    info!("Stored new access token (expires in {}s)", token.expires_in);
  }

  fn encoder(&self) -> RequestEncoder<'_> {
    RequestEncoder::new(&self.config)
  }

  /// Retrieve a list of objects
  ///
  /// # Arguments
  ///
  /// * `object_type` - Resource to list, an [`ObjectType`] or its wire name
  /// * `filters` - Map of filters; `()` or an empty map for none
  ///
  /// # Examples
  ///
  /// ```rust,no_run
  /// # use serde_json::json;
  /// # use tsheets_client::{ObjectType, TSheetsClient};
  /// # let client = TSheetsClient::new(tsheets_core::ClientConfig::new(1))?;
  /// let active = client.get(ObjectType::Users, json!({"active": "yes"}))?;
  /// let same = client.get("users", json!({"active": "yes"}))?;
  /// # Ok::<(), tsheets_core::Error>(())
  /// ```
  pub fn get(&self, object_type: impl Into<ObjectType>, filters: impl Serialize) -> Result<Output> {
    let object_type = object_type.into();
    let request = self.encoder().query(HttpMethod::Get, object_type.as_str(), &filters)?;
    self.execute(request)
  }

  /// Add new objects; `objects` must serialize to a list of objects
  pub fn add(&self, object_type: impl Into<ObjectType>, objects: impl Serialize) -> Result<Output> {
    let object_type = object_type.into();
    self.post(object_type.as_str(), objects, true)
  }

  /// POST `payload` wrapped in the data envelope.
  ///
  /// With `require_indexed_array` the payload must be a list of objects;
  /// pass `false` to send a single map such as report filters.
  pub fn post(
    &self,
    endpoint: &str,
    payload: impl Serialize,
    require_indexed_array: bool,
  ) -> Result<Output> {
    let request = self.encoder().json(HttpMethod::Post, endpoint, &payload, require_indexed_array)?;
    self.execute(request)
  }

  /// Apply edits to existing objects, each normally carrying its `id`
  pub fn edit(&self, object_type: impl Into<ObjectType>, objects: impl Serialize) -> Result<Output> {
    self.put(object_type, objects)
  }

  /// Synonym for [`edit`](Self::edit)
  pub fn put(&self, object_type: impl Into<ObjectType>, objects: impl Serialize) -> Result<Output> {
    let object_type = object_type.into();
    let request = self.encoder().json(HttpMethod::Put, object_type.as_str(), &objects, true)?;
    self.execute(request)
  }

  /// Delete one or more objects by id
  pub fn delete(&self, object_type: impl Into<ObjectType>, ids: impl Into<Ids>) -> Result<Output> {
    let object_type = object_type.into();
    let ids = ids.into();
    if ids.is_empty() {
      return Err(
        RequestFailure::validation(
          "expected at least one id to delete",
          self.config.endpoint_url(object_type.as_str()),
        )
        .into(),
      );
    }

    let params = json!({ "ids": ids.joined() });
    let request = self.encoder().query(HttpMethod::Delete, object_type.as_str(), &params)?;
    self.execute(request)
  }

  /// Run a report with a single map of filters
  pub fn get_report(&self, report_type: impl Into<ReportType>, filters: impl Serialize) -> Result<Output> {
    let endpoint = report_type.into().endpoint();
    self.post(&endpoint, filters, false)
  }

  /// Url of the authorization page for this client application.
  ///
  /// No request is made. Fails when no OAuth client id is configured.
  pub fn get_auth_url(&self, redirect_uri: &str, state: &str) -> Result<String> {
    let base_url = self.config.base_url();
    let client_id = self.config.oauth_client_id.as_deref().ok_or_else(|| {
      RequestFailure::validation(
        "an oauth client id is required to build the authorization url",
        format!("{base_url}/authorize"),
      )
    })?;
    Ok(authorization_url(&base_url, client_id, redirect_uri, state))
  }

  /// Exchange an authorization code for an access token.
  ///
  /// The response holds `access_token`, `expires_in`, `token_type`, `scope`
  /// and `refresh_token`; see [`Output::into_typed`] and [`TokenResponse`].
  pub fn get_access_token(&self, auth_code: &str, redirect_uri: &str) -> Result<Output> {
    self.grant(Grant::AuthorizationCode { code: auth_code, redirect_uri })
  }

  /// Exchange a refresh token for a new access token.
  ///
  /// Falls back to the refresh token held by the client when none is given
  /// and fails without a request when neither is available. The new tokens
  /// are not stored; pass them to [`store_token`](Self::store_token).
  pub fn refresh_access_token(&self, refresh_token: Option<&str>) -> Result<Output> {
    let refresh_token = refresh_token
      .filter(|t| !t.is_empty())
      .or(self.config.refresh_token.as_deref())
      .filter(|t| !t.is_empty())
      .ok_or_else(|| {
        RequestFailure::validation(
          "no refresh token available: pass one or configure it on the client",
          self.config.endpoint_url(GRANT_ENDPOINT),
        )
      })?;

    self.grant(Grant::RefreshToken { refresh_token })
  }

  fn grant(&self, grant: Grant<'_>) -> Result<Output> {
    let url = self.config.endpoint_url(GRANT_ENDPOINT);
    let (client_id, client_secret) =
      match (self.config.oauth_client_id.as_deref(), self.config.oauth_client_secret.as_deref()) {
        (Some(id), Some(secret)) => (id, secret),
        _ => {
          return Err(
            RequestFailure::validation("an oauth client id and secret are required for token grants", url)
              .into(),
          );
        }
      };

    let request = self.encoder().form(GRANT_ENDPOINT, &grant.form_fields(client_id, client_secret));
    self.execute(request)
  }

  #[instrument(skip(self, request), fields(method = %request.method, url = %request.endpoint_url()))]
  fn execute(&self, request: HttpRequest) -> Result<Output> {
    let body = invoke(&self.transport, &request)?;
    debug!("Normalizing response as {}", self.config.output_format);
    normalize(body, self.config.output_format)
  }
}
