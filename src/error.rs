//! Driver error taxonomy.
//!
//! Every failure surfaced by this crate is classified into one of the
//! [`Error`] kinds below. Nothing is retried internally; errors propagate to
//! the caller with enough context to decide what to do next.

use thiserror::Error;

use crate::protocol::TransportError;

/// Errors raised by sessions, cursors and the marshalling layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure: connect refused, socket reset, frame
    /// corruption. Fatal to the operation that hit it.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Credentials rejected by the remote node during login.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Caller misuse: operating on a closed session or cursor, or a
    /// statement the remote node rejected as invalid.
    #[error("programming error: {0}")]
    Programming(String),

    /// Functionality the backing store does not offer.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Malformed or truncated wire data for a known column type.
    #[error("decode error [{kind}]: {reason}")]
    Decode { kind: String, reason: String },

    /// Failure reported by the remote node itself.
    #[error("server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
