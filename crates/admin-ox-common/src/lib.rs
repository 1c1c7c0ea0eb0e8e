#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Shared HTTP plumbing for the admin dashboard client
//!
//! Request building and cancellation, identifier-safe JSON decoding, and the
//! flattening of paginated list envelopes.

pub mod envelope;
pub mod error;
pub mod id_safe;
pub mod request_builder;
pub mod timestamp;

pub use envelope::{ENVELOPE_FIELDS, as_records, into_records};
pub use error::{AdminRequestError, ErrorKind};
pub use request_builder::{Endpoint, HttpMethod, RequestBuilder, RequestConfig};
pub use timestamp::Timestamp;

/// Re-export common types for convenience
pub use async_trait::async_trait;
pub use serde_json::Value;
pub use tokio_util::sync::CancellationToken;
