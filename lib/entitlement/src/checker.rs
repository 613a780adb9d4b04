//! The checker trait shared by every provider.

use async_trait::async_trait;
use gatehouse_core::{AccessToken, Provider, Result};

use crate::error::EntitlementError;

/// User agent sent with every provider API call. GitHub rejects requests
/// without one.
const USER_AGENT: &str = concat!("gatehouse/", env!("CARGO_PKG_VERSION"));

/// Checks one provider-specific entitlement for a visitor.
///
/// The target (channel, account) is fixed when the checker is built, so a
/// check only needs the visitor's token.
#[async_trait]
pub trait EntitlementChecker: Send + Sync {
    /// The provider whose token this checker consumes.
    fn provider(&self) -> Provider;

    /// Returns `Ok(true)` if the provider confirms the entitlement and
    /// `Ok(false)` if it denies it.
    async fn check(&self, access_token: &AccessToken) -> Result<bool, EntitlementError>;
}

/// Builds the HTTP client used by the provider checkers.
pub fn http_client() -> Result<reqwest::Client, EntitlementError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| EntitlementError::Configuration {
            reason: format!("failed to create HTTP client: {e}"),
        })?;
    Ok(client)
}
