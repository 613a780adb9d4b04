//! Authentication for the gatehouse server.
//!
//! This module provides:
//! - OAuth 2.0 login against Google and GitHub
//! - The cookie-backed [`VisitorSession`] extractor
//! - Login, callback and logout routes
//!
//! A successful callback hands the visitor's access token to the
//! [`VerificationPipeline`], which runs the matching entitlement check once
//! and picks the redirect target.

pub mod oauth;
pub mod routes;
pub mod session;

use std::sync::Arc;

use gatehouse_core::Provider;
use gatehouse_session::SessionStore;
use gatehouse_verification::VerificationPipeline;

use crate::config::SessionConfig;
use crate::pages::PageDirectory;

pub use oauth::{AuthState, OAuthClient, OAuthError};
pub use routes::{github_callback, github_login, google_callback, google_login, logout};
pub use session::VisitorSession;

/// Shared application state.
pub struct AppState {
    /// Session storage backend.
    pub sessions: Arc<dyn SessionStore>,
    /// Entitlement orchestration.
    pub pipeline: VerificationPipeline,
    /// Google OAuth client.
    pub google: OAuthClient,
    /// GitHub OAuth client.
    pub github: OAuthClient,
    /// Static pages.
    pub pages: PageDirectory,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        pipeline: VerificationPipeline,
        google: OAuthClient,
        github: OAuthClient,
        pages: PageDirectory,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            sessions,
            pipeline,
            google,
            github,
            pages,
            session_config,
        }
    }

    /// Returns the OAuth client for `provider`.
    #[must_use]
    pub fn oauth(&self, provider: Provider) -> &OAuthClient {
        match provider {
            Provider::Google => &self.google,
            Provider::GitHub => &self.github,
        }
    }
}
