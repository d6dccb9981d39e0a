//! sky-api: stateless REST client for the Skylark control plane
//!
//! Every operation is one authenticated HTTP request and a decoded JSON
//! response; there is no orchestration, retrying, or caching here. Responses
//! arrive enveloped as `{"data": ...}` and callers get the payload.

mod client;
mod types;

pub use client::{ApiClient, DEFAULT_HOST};
pub use types::App;
