//! Tri-state entitlement results.

use serde::{Deserialize, Serialize};

/// The cached outcome of one entitlement check.
///
/// `Unknown` means the check never ran in this session (typically because
/// the visitor has no token for that provider). It is distinct from
/// `Unsatisfied`, although both are non-granting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entitlement {
    /// Not evaluated.
    #[default]
    Unknown,
    /// The provider confirmed the entitlement.
    Satisfied,
    /// The provider denied the entitlement, or the check failed.
    Unsatisfied,
}

impl Entitlement {
    /// Returns true only for a confirmed entitlement.
    #[must_use]
    pub const fn is_satisfied(self) -> bool {
        matches!(self, Self::Satisfied)
    }

    /// Returns true once a check has produced a result.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl From<bool> for Entitlement {
    fn from(satisfied: bool) -> Self {
        if satisfied {
            Self::Satisfied
        } else {
            Self::Unsatisfied
        }
    }
}
