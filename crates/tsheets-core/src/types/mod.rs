//! Common types used across tsheets-* crates

pub mod endpoint;
pub mod output;

pub use endpoint::{ObjectType, ReportType};
pub use output::OutputFormat;
