//! Identity providers and the credentials they hand back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An external identity provider a visitor can authenticate with.
///
/// Each provider is paired with exactly one entitlement: Google with a
/// YouTube channel subscription, GitHub with following an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google OAuth, granting access to the YouTube Data API.
    Google,
    /// GitHub OAuth.
    #[serde(rename = "github")]
    GitHub,
}

impl Provider {
    /// All providers, in the order their entitlements are evaluated.
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::GitHub];

    /// Returns the lowercase provider name used in routes and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque OAuth access token.
///
/// The secret is never rendered by `Debug`, so tokens can sit inside
/// structures that are logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Proof of a successful authentication, produced by an OAuth callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The provider that authenticated the visitor.
    pub provider: Provider,
    /// The access token issued by that provider.
    pub access_token: AccessToken,
}

impl Identity {
    /// Creates an identity for the given provider.
    #[must_use]
    pub fn new(provider: Provider, access_token: AccessToken) -> Self {
        Self {
            provider,
            access_token,
        }
    }
}
