//! # tsheets-client
//!
//! A blocking client for the TSheets time-tracking REST API.
//!
//! ## Features
//!
//! - **CRUD verbs**: `get`, `add`/`post`, `edit`/`put`, `delete` and `get_report`
//! - **OAuth2**: authorization url, code exchange and token refresh
//! - **Output formats**: key-ordered maps, object accessors or the raw body
//! - **Pluggable transport**: reqwest by default, any [`HttpTransport`] otherwise
//!
//! ## Usage
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tsheets_client::{ObjectType, ReportType, TSheetsClient};
//! use tsheets_core::ClientConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let client = TSheetsClient::new(config)?;
//!
//!     // List users
//!     let users = client.get(ObjectType::Users, ())?;
//!     println!("{:?}", users.as_value());
//!
//!     // Create two jobcodes with one call
//!     client.add(ObjectType::Jobcodes, json!([{"name": "jobcode1"}, {"name": "jobcode2"}]))?;
//!
//!     // Run a report
//!     let payroll = client.get_report(
//!         ReportType::Payroll,
//!         json!({"start_date": "2024-01-01", "end_date": "2024-01-15"}),
//!     )?;
//!     println!("{:?}", payroll.as_value());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, tsheets_core::Error>`. Validation,
//! transport and HTTP failures are `Error::Request`; a successful body that
//! cannot be parsed is `Error::Deserialization`.

#![warn(clippy::all)]

pub mod client;
pub mod encoder;
pub mod normalizer;
pub mod oauth;
pub mod transport;

// Re-export the main client and common types
pub use client::TSheetsClient;
pub use encoder::Ids;
pub use normalizer::{ApiObject, Output};
pub use oauth::TokenResponse;
pub use transport::{
  HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
  TransportErrorKind,
};
pub use tsheets_core::{
  ClientConfig, Error, ObjectType, OutputFormat, ReportType, RequestFailure, Result,
};

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("tsheets-client/", env!("CARGO_PKG_VERSION"), " (Rust)");
