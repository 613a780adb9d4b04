//! Pipeline construction errors.

use gatehouse_core::Provider;
use std::fmt;

/// Returned when a checker is wired to the wrong entitlement slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The checker consumes a different provider's token than its slot.
    CheckerMismatch { expected: Provider, actual: Provider },
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckerMismatch { expected, actual } => write!(
                f,
                "entitlement checker for '{actual}' given where '{expected}' is required"
            ),
        }
    }
}

impl std::error::Error for VerificationError {}
