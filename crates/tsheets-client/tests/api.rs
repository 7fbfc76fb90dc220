//! End-to-end tests of the blocking client against a local wiremock server.
//!
//! The reqwest blocking client must not run on an async worker, so every
//! client call happens inside `spawn_blocking`.

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use tsheets_client::{
  ClientConfig, Error, ObjectType, Output, OutputFormat, ReportType, Result, TSheetsClient,
  TokenResponse, TransportErrorKind, USER_AGENT,
};
use wiremock::matchers::{body_json, body_string, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USERS_BODY: &str = r#"{"results":{"users":{"1":{"id":1,"first_name":"Alex","active":true}}},"more":false}"#;

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

fn config(server: &MockServer) -> ClientConfig {
  ClientConfig::new(1)
    .with_base_url(format!("{}/api/v1", server.uri()))
    .with_access_token("tok-1")
    .with_oauth_client("abc", "s3cret")
}

/// Run `f` against a fresh client on a blocking thread
async fn with_client<F, R>(config: ClientConfig, f: F) -> R
where
  F: FnOnce(&mut TSheetsClient) -> R + Send + 'static,
  R: Send + 'static,
{
  tokio::task::spawn_blocking(move || {
    let mut client = TSheetsClient::new(config).expect("Failed to create client");
    f(&mut client)
  })
  .await
  .expect("blocking task panicked")
}

#[tokio::test(flavor = "multi_thread")]
async fn get_sends_query_and_headers() {
  init_tracing();
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/v1/users"))
    .and(query_param("active", "yes"))
    .and(query_param("last_name", "O'Neil & Sons"))
    .and(header("authorization", "Bearer tok-1"))
    .and(header("user-agent", USER_AGENT))
    .and(header_exists("accept-encoding"))
    .respond_with(ResponseTemplate::new(200).set_body_string(USERS_BODY))
    .expect(1)
    .mount(&server)
    .await;

  let output = with_client(config(&server), |client| {
    client.get(ObjectType::Users, json!({"active": "yes", "last_name": "O'Neil & Sons"}))
  })
  .await;

  let output = assert_ok!(output);
  let users = output.as_value().expect("parsed output");
  assert_eq!(users["results"]["users"]["1"]["first_name"], "Alex");
}

#[tokio::test(flavor = "multi_thread")]
async fn add_posts_json_envelope() {
  let server = MockServer::start().await;
  let reminders = json!([
    {"user_id": "0", "reminder_type": "clock-in", "due_time": "06:00:00", "due_days_of_week": "Mon,Tue,Wed,Thu,Fri"},
    {"user_id": "0", "reminder_type": "clock-out", "due_time": "20:00:00", "due_days_of_week": "Mon,Tue,Wed,Thu,Fri"},
  ]);
  Mock::given(method("POST"))
    .and(path("/api/v1/reminders"))
    .and(header("content-type", "application/json"))
    .and(body_json(json!({ "data": reminders.clone() })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "results": {"reminders": {"1": {"_status_code": 200, "id": 11}, "2": {"_status_code": 200, "id": 12}}}
    })))
    .expect(1)
    .mount(&server)
    .await;

  let output = with_client(config(&server), move |client| client.add(ObjectType::Reminders, &reminders))
    .await;

  let output = assert_ok!(output);
  assert_eq!(output.as_value().unwrap()["results"]["reminders"]["2"]["id"], 12);
}

#[tokio::test(flavor = "multi_thread")]
async fn edit_puts_json_envelope() {
  let server = MockServer::start().await;
  Mock::given(method("PUT"))
    .and(path("/api/v1/timesheets"))
    .and(body_string(r#"{"data":[{"id":4244211,"notes":"note2 text"}]}"#))
    .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
    .expect(1)
    .mount(&server)
    .await;

  let output = with_client(config(&server), |client| {
    client.edit(ObjectType::Timesheets, json!([{"id": 4244211, "notes": "note2 text"}]))
  })
  .await;
  assert_ok!(output);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_sends_comma_joined_ids() {
  let server = MockServer::start().await;
  Mock::given(method("DELETE"))
    .and(path("/api/v1/reminders"))
    .and(query_param("ids", "11,12"))
    .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":{}}"#))
    .expect(1)
    .mount(&server)
    .await;

  let output = with_client(config(&server), |client| client.delete(ObjectType::Reminders, vec![11, 12]))
    .await;
  assert_ok!(output);
}

#[tokio::test(flavor = "multi_thread")]
async fn report_posts_single_filter_map() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/api/v1/reports/project"))
    .and(body_json(json!({"data": {"start_date": "2024-01-01", "end_date": "2024-01-31"}})))
    .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":{"project_report":{}}}"#))
    .expect(1)
    .mount(&server)
    .await;

  let output = with_client(config(&server), |client| {
    client.get_report(ReportType::Project, json!({"start_date": "2024-01-01", "end_date": "2024-01-31"}))
  })
  .await;
  assert_ok!(output);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_error_carries_status_and_body() {
  let server = MockServer::start().await;
  let body = r#"{"error":{"code":417,"message":"Expectation Failed: active must be yes, no or both"}}"#;
  Mock::given(method("GET"))
    .and(path("/api/v1/users"))
    .respond_with(ResponseTemplate::new(417).set_body_string(body))
    .mount(&server)
    .await;

  let result = with_client(config(&server), |client| client.get(ObjectType::Users, json!({"active": "maybe"})))
    .await;

  let err = assert_err!(result);
  let failure = err.as_request_failure().expect("request failure");
  assert_eq!(failure.http_code, Some(417));
  assert_eq!(failure.http_body.as_deref(), Some(body));
  assert_eq!(failure.full_url, format!("{}/api/v1/users?active=maybe", server.uri()));
  assert_eq!(failure.error_properties().unwrap()["error"]["code"], 417);
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_is_not_refreshed_automatically() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/v1/current_user"))
    .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":{"code":401}}"#))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/api/v1/grant"))
    .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
    .expect(0)
    .mount(&server)
    .await;

  let config = config(&server).with_refresh_token("r1");
  let result = with_client(config, |client| client.get(ObjectType::CurrentUser, ())).await;
  assert_eq!(assert_err!(result).http_code(), Some(401));
}

#[tokio::test(flavor = "multi_thread")]
async fn oauth_code_exchange_then_authenticated_call() {
  let server = MockServer::start().await;
  let redirect = "https://app.example/cb";
  Mock::given(method("POST"))
    .and(path("/api/v1/grant"))
    .and(header("content-type", "application/x-www-form-urlencoded"))
    .and(body_string(
      "grant_type=authorization_code&code=c0de&client_id=abc&client_secret=s3cret&redirect_uri=https%3A%2F%2Fapp.example%2Fcb",
    ))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "access_token": "fresh-token",
      "expires_in": 5184000,
      "token_type": "bearer",
      "scope": "",
      "refresh_token": "fresh-refresh",
    })))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/api/v1/current_user"))
    .and(header("authorization", "Bearer fresh-token"))
    .respond_with(ResponseTemplate::new(200).set_body_string(USERS_BODY))
    .expect(1)
    .mount(&server)
    .await;

  let mut config = config(&server);
  config.access_token = None;

  let result = with_client(config, move |client| -> Result<TokenResponse> {
    let token: TokenResponse = client.get_access_token("c0de", redirect)?.into_typed()?;
    client.store_token(&token);
    client.get(ObjectType::CurrentUser, ())?;
    Ok(token)
  })
  .await;

  let token = assert_ok!(result);
  assert_eq!(token.refresh_token.as_deref(), Some("fresh-refresh"));
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_uses_configured_refresh_token() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/api/v1/grant"))
    .and(body_string("grant_type=refresh_token&client_id=abc&client_secret=s3cret&refresh_token=r1"))
    .respond_with(ResponseTemplate::new(200).set_body_string(
      r#"{"access_token":"a2","expires_in":3600,"token_type":"bearer","refresh_token":"r2"}"#,
    ))
    .expect(1)
    .mount(&server)
    .await;

  let config = config(&server).with_refresh_token("r1");
  let result = with_client(config, |client| client.refresh_access_token(None)).await;
  let token: TokenResponse = assert_ok!(assert_ok!(result).into_typed());
  assert_eq!(token.access_token, "a2");
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_output_is_byte_exact() {
  let server = MockServer::start().await;
  let body = "{ \"results\" : {\"users\":{}},\n  \"more\": false }";
  Mock::given(method("GET"))
    .and(path("/api/v1/users"))
    .respond_with(ResponseTemplate::new(200).set_body_string(body))
    .mount(&server)
    .await;

  let config = config(&server).with_output_format(OutputFormat::RawText);
  let output = with_client(config, |client| client.get(ObjectType::Users, ())).await;
  assert_eq!(assert_ok!(output), Output::Raw(body.to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_output_keeps_multibyte_text_intact() {
  let server = MockServer::start().await;
  let body = "{\"n\":\"caf\u{e9} \u{1f552}\"}".as_bytes().to_vec();
  Mock::given(method("GET"))
    .and(path("/api/v1/users"))
    .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "application/json"))
    .mount(&server)
    .await;

  let config = config(&server).with_output_format(OutputFormat::RawText);
  let output = with_client(config, |client| client.get(ObjectType::Users, ())).await;
  let output = assert_ok!(output);
  assert_eq!(output.as_raw().map(str::as_bytes), Some(body.as_slice()));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_utf8_body_is_transport_failure() {
  let server = MockServer::start().await;
  for (route, body) in [("/api/v1/users", b"{\"n\":\"caf\xE9\"}".to_vec()), ("/api/v1/jobcodes", b"{}\xFF\xFE".to_vec())] {
    Mock::given(method("GET"))
      .and(path(route))
      .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
      .mount(&server)
      .await;
  }

  let config = config(&server).with_output_format(OutputFormat::RawText);
  let results = with_client(config, |client| {
    [client.get(ObjectType::Users, ()), client.get(ObjectType::Jobcodes, ())]
  })
  .await;

  for result in results {
    let err = assert_err!(result);
    let failure = err.as_request_failure().expect("request failure");
    assert_eq!(failure.error_code, Some(TransportErrorKind::Body.code()));
    assert!(failure.error_text.as_deref().unwrap().contains("not valid UTF-8"));
    assert!(failure.http_body.is_none());
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_success_body_is_deserialization_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/v1/jobcodes"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
    .mount(&server)
    .await;

  let output = with_client(config(&server), |client| client.get(ObjectType::Jobcodes, ())).await;
  assert!(matches!(assert_err!(output), Error::Deserialization(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn connection_refused_is_transport_failure() {
  // nothing listens on the discard port
  let config = ClientConfig::new(1).with_base_url("http://127.0.0.1:9/api/v1");
  let result = with_client(config, |client| client.get(ObjectType::Users, ())).await;

  let err = assert_err!(result);
  let failure = err.as_request_failure().expect("request failure");
  assert_eq!(failure.http_code, None);
  assert!(failure.http_body.is_none());
  assert!(failure.error_text.is_some());
  assert!(failure.error_code.is_some());
  assert_eq!(failure.full_url, "http://127.0.0.1:9/api/v1/users");
}
