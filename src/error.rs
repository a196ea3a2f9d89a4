//! Failure taxonomy for upstream retrievals.
//!
//! Superseded/canceled retrievals are deliberately absent: they are discarded
//! silently and never surface as an error. Durable-store failures are handled
//! in the store layer (logged and swallowed) and never reach callers either.

use thiserror::Error;

/// A retrieval failure that surfaces as a human-readable message on a
/// tracker outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, timeout, broken stream).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status code.
    #[error("server returned status {0}")]
    Status(u16),

    /// The body arrived but could not be parsed into the expected payload.
    #[error("malformed response body: {0}")]
    Parse(String),

    /// A detail lookup for a known id came back with no result.
    #[error("no meal found for id {0}")]
    NotFound(String),
}
