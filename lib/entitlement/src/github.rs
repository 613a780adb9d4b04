//! GitHub follow check.

use async_trait::async_trait;
use gatehouse_core::{AccessToken, Provider, Result};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument};

use crate::checker::EntitlementChecker;
use crate::error::EntitlementError;

/// Production GitHub REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// REST API version pinned for the follow endpoint.
const API_VERSION: &str = "2022-11-28";

/// Checks whether the token's owner follows a fixed GitHub account.
#[derive(Debug, Clone)]
pub struct GitHubFollowChecker {
    http: reqwest::Client,
    api_base_url: String,
    target_login: String,
}

impl GitHubFollowChecker {
    /// Creates a checker for `target_login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the login is not a plausible GitHub username.
    pub fn new(
        http: reqwest::Client,
        api_base_url: impl Into<String>,
        target_login: impl Into<String>,
    ) -> Result<Self, EntitlementError> {
        let target_login = target_login.into();
        if !is_valid_login(&target_login) {
            return Err(EntitlementError::Configuration {
                reason: format!("'{target_login}' is not a valid GitHub login"),
            }
            .into());
        }
        Ok(Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            target_login,
        })
    }

    /// Returns the configured account to follow.
    #[must_use]
    pub fn target_login(&self) -> &str {
        &self.target_login
    }

    /// Calls `GET /user/following/{target_login}` as the token's owner.
    ///
    /// GitHub answers `204` when the user follows the target and `404` when
    /// not. Anything else (rate limiting, revoked token) is an error.
    #[instrument(skip_all, fields(target_login = %self.target_login))]
    pub async fn check_following(
        &self,
        access_token: &AccessToken,
    ) -> Result<bool, EntitlementError> {
        let url = format!(
            "{}/user/following/{}",
            self.api_base_url, self.target_login
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token.secret())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| EntitlementError::Transport {
                reason: e.to_string(),
            })?;

        let following = match response.status() {
            StatusCode::NO_CONTENT => true,
            StatusCode::NOT_FOUND => false,
            status => {
                return Err(EntitlementError::UnexpectedStatus {
                    status: status.as_u16(),
                }
                .into());
            }
        };

        debug!(following, "follow check result");
        Ok(following)
    }
}

#[async_trait]
impl EntitlementChecker for GitHubFollowChecker {
    fn provider(&self) -> Provider {
        Provider::GitHub
    }

    async fn check(&self, access_token: &AccessToken) -> Result<bool, EntitlementError> {
        self.check_following(access_token).await
    }
}

/// GitHub logins are 1-39 alphanumerics or single hyphens, never leading
/// or trailing with a hyphen.
fn is_valid_login(login: &str) -> bool {
    !login.is_empty()
        && login.len() <= 39
        && !login.starts_with('-')
        && !login.ends_with('-')
        && !login.contains("--")
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
