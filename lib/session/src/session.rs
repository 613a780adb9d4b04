//! Per-visitor session state.
//!
//! A session holds at most one access token per provider and the cached
//! result of that provider's entitlement check. It is created empty for any
//! visitor without a valid session cookie and filled in by the verification
//! pipeline after each OAuth callback.

use chrono::{DateTime, Utc};
use gatehouse_core::{AccessToken, Identity, Provider};
use serde::{Deserialize, Serialize};

use crate::entitlement::Entitlement;

/// One visitor's interaction window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Token from the most recent Google authentication.
    google_access_token: Option<AccessToken>,
    /// Token from the most recent GitHub authentication.
    github_access_token: Option<AccessToken>,
    /// Cached YouTube subscription check.
    #[serde(default)]
    subscription: Entitlement,
    /// Cached GitHub follow check.
    #[serde(default)]
    following: Entitlement,
    /// Provider of the most recent successful authentication.
    last_provider: Option<Provider>,
    /// When the session was first materialised.
    created_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            google_access_token: None,
            github_access_token: None,
            subscription: Entitlement::Unknown,
            following: Entitlement::Unknown,
            last_provider: None,
            created_at: Utc::now(),
        }
    }

    /// Stores the token from a fresh authentication.
    ///
    /// Any previous token for the same provider is replaced, and that
    /// provider's entitlement goes back to `Unknown` until it is checked
    /// against the new token. The other provider's state is untouched.
    pub fn record_identity(&mut self, identity: Identity) {
        let Identity {
            provider,
            access_token,
        } = identity;
        match provider {
            Provider::Google => self.google_access_token = Some(access_token),
            Provider::GitHub => self.github_access_token = Some(access_token),
        }
        self.set_entitlement(provider, Entitlement::Unknown);
        self.last_provider = Some(provider);
    }

    /// Returns the stored token for a provider, if the visitor authenticated with it.
    #[must_use]
    pub fn access_token(&self, provider: Provider) -> Option<&AccessToken> {
        match provider {
            Provider::Google => self.google_access_token.as_ref(),
            Provider::GitHub => self.github_access_token.as_ref(),
        }
    }

    /// Returns the cached entitlement paired with a provider.
    #[must_use]
    pub fn entitlement(&self, provider: Provider) -> Entitlement {
        match provider {
            Provider::Google => self.subscription,
            Provider::GitHub => self.following,
        }
    }

    /// Caches the entitlement paired with a provider.
    pub fn set_entitlement(&mut self, provider: Provider, entitlement: Entitlement) {
        match provider {
            Provider::Google => self.subscription = entitlement,
            Provider::GitHub => self.following = entitlement,
        }
    }

    /// Returns the cached YouTube subscription state.
    #[must_use]
    pub fn subscription(&self) -> Entitlement {
        self.subscription
    }

    /// Returns the cached GitHub follow state.
    #[must_use]
    pub fn following(&self) -> Entitlement {
        self.following
    }

    /// Returns true once the visitor has authenticated with any provider.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.google_access_token.is_some() || self.github_access_token.is_some()
    }

    /// Returns the provider of the most recent authentication.
    #[must_use]
    pub fn last_provider(&self) -> Option<Provider> {
        self.last_provider
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
