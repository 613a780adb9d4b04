//! Error types for the entitlement crate.

use std::fmt;

/// Errors from an entitlement check.
///
/// None of these mean "the visitor is not entitled"; they mean the provider
/// could not answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementError {
    /// The checker was built with unusable settings.
    Configuration { reason: String },
    /// The request never produced a response (DNS, TLS, connection reset).
    Transport { reason: String },
    /// The provider answered with a status that carries no verdict.
    UnexpectedStatus { status: u16 },
    /// The provider's response body could not be decoded.
    MalformedResponse { reason: String },
}

impl fmt::Display for EntitlementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "invalid checker configuration: {reason}")
            }
            Self::Transport { reason } => {
                write!(f, "provider request failed: {reason}")
            }
            Self::UnexpectedStatus { status } => {
                write!(f, "provider returned unexpected status {status}")
            }
            Self::MalformedResponse { reason } => {
                write!(f, "malformed provider response: {reason}")
            }
        }
    }
}

impl std::error::Error for EntitlementError {}
