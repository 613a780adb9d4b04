//! Error types for the session crate.
//!
//! Store backends report failures as `SessionStoreError`; the HTTP layer
//! decides whether a failure degrades to an anonymous session or a redirect.

use std::fmt;

/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The backend could not be reached.
    ConnectionFailed { reason: String },
    /// A stored session could not be decoded.
    Corrupted { session_id: String, reason: String },
    /// A session could not be encoded for storage.
    Encoding { reason: String },
    /// The backend rejected a command.
    Backend { reason: String },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => {
                write!(f, "session store connection failed: {reason}")
            }
            Self::Corrupted { session_id, reason } => {
                write!(f, "stored session '{session_id}' is corrupted: {reason}")
            }
            Self::Encoding { reason } => {
                write!(f, "failed to encode session: {reason}")
            }
            Self::Backend { reason } => {
                write!(f, "session store error: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionStoreError {}
