//! HTTP layer used to download documentation and default config files.
//!
//! This module provides:
//! - Request and response value types ([`HttpRequest`], [`HttpResponse`])
//! - The client abstraction strategies depend on ([`HttpClient`])
//! - A production client backed by reqwest ([`ReqwestClient`])

mod client;
mod error;
mod http;


pub use client::{DEFAULT_MAX_BODY_BYTES, ReqwestClient};
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, HttpResponse};
