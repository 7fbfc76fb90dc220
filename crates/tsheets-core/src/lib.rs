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

//! Core types shared by the TSheets client crates: configuration, the error
//! model and the endpoint identifier sets.

pub mod config;
pub mod error;
pub mod types;

pub use config::ClientConfig;
pub use error::{Error, RequestFailure, Result};
pub use types::{ObjectType, OutputFormat, ReportType};

/// Host serving the TSheets REST API
pub const DEFAULT_HOST: &str = "rest.tsheets.com";

/// REST API version. 1 is currently the only one published.
pub const DEFAULT_API_VERSION: u32 = 1;

/// Connect timeout applied to every request, in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
