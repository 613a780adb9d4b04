//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables, with `__`
//! separating nested keys (`GOOGLE__CLIENT_ID` becomes `google.client_id`).

use std::path::PathBuf;
use std::time::Duration;

use gatehouse_verification::RecheckPolicy;
use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the static pages and `assets/`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Google OAuth client.
    pub google: OAuthProviderConfig,

    /// GitHub OAuth client.
    pub github: OAuthProviderConfig,

    /// YouTube subscription target.
    pub youtube: YouTubeConfig,

    /// GitHub follow target.
    #[serde(default)]
    pub follow: FollowConfig,

    /// Verification behaviour.
    #[serde(default)]
    pub verification: VerificationConfig,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Credentials and endpoints for one OAuth provider.
///
/// `auth_url` and `token_url` fall back to the provider's production
/// endpoints when unset.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    /// Channel the visitor must be subscribed to.
    pub channel_id: String,

    #[serde(default = "default_youtube_api_base_url")]
    pub api_base_url: String,
}

fn default_youtube_api_base_url() -> String {
    gatehouse_entitlement::youtube::DEFAULT_API_BASE_URL.to_string()
}

/// GitHub follow-check settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowConfig {
    /// Login the visitor must follow.
    #[serde(default = "default_target_login")]
    pub target_login: String,

    #[serde(default = "default_github_api_base_url")]
    pub api_base_url: String,
}

fn default_target_login() -> String {
    "bytemait".to_string()
}

fn default_github_api_base_url() -> String {
    gatehouse_entitlement::github::DEFAULT_API_BASE_URL.to_string()
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            target_login: default_target_login(),
            api_base_url: default_github_api_base_url(),
        }
    }
}

/// Which session store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    #[default]
    Memory,
    Redis,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Minutes of inactivity before a session expires.
    #[serde(default = "default_idle_minutes")]
    pub idle_minutes: u64,

    /// Capacity of the in-memory store.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,

    #[serde(default)]
    pub backend: SessionBackend,

    /// Required when `backend` is `redis`.
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_cookie_name() -> String {
    "gatehouse_session".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

fn default_idle_minutes() -> u64 {
    24 * 60
}

fn default_max_sessions() -> u64 {
    100_000
}

impl SessionConfig {
    /// Idle timeout as a [`Duration`].
    #[must_use]
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_minutes.saturating_mul(60))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure_cookies: default_secure_cookies(),
            idle_minutes: default_idle_minutes(),
            max_sessions: default_max_sessions(),
            backend: SessionBackend::default(),
            redis_url: None,
        }
    }
}

/// Verification settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationConfig {
    #[serde(default)]
    pub recheck: RecheckPolicy,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required() -> HashMap<String, String> {
        [
            ("GOOGLE__CLIENT_ID", "google-client"),
            ("GOOGLE__CLIENT_SECRET", "google-secret"),
            ("GOOGLE__REDIRECT_URL", "http://localhost:8000/auth/google/callback"),
            ("GITHUB__CLIENT_ID", "github-client"),
            ("GITHUB__CLIENT_SECRET", "github-secret"),
            ("GITHUB__REDIRECT_URL", "http://localhost:8000/auth/github/callback"),
            ("YOUTUBE__CHANNEL_ID", "UC_target"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn load(vars: HashMap<String, String>) -> Result<ServerConfig, config::ConfigError> {
        ServerConfig::from_environment(config::Environment::default().source(Some(vars)))
    }

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "gatehouse_session");
        assert!(config.secure_cookies);
        assert_eq!(config.idle_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.backend, SessionBackend::Memory);
    }

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = load(required()).expect("config");
        assert_eq!(config.listen_host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.google.client_id, "google-client");
        assert!(config.google.auth_url.is_none());
        assert_eq!(config.youtube.channel_id, "UC_target");
        assert_eq!(config.follow.target_login, "bytemait");
        assert_eq!(config.verification.recheck, RecheckPolicy::Always);
    }

    #[test]
    fn nested_overrides_are_applied() {
        let mut vars = required();
        vars.insert("PORT".into(), "9090".into());
        vars.insert("SESSION__SECURE_COOKIES".into(), "false".into());
        vars.insert("SESSION__BACKEND".into(), "redis".into());
        vars.insert("SESSION__REDIS_URL".into(), "redis://127.0.0.1/".into());
        vars.insert("VERIFICATION__RECHECK".into(), "trust_cached".into());
        vars.insert("FOLLOW__TARGET_LOGIN".into(), "octocat".into());

        let config = load(vars).expect("config");
        assert_eq!(config.port, 9090);
        assert!(!config.session.secure_cookies);
        assert_eq!(config.session.backend, SessionBackend::Redis);
        assert_eq!(config.session.redis_url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(config.verification.recheck, RecheckPolicy::TrustCached);
        assert_eq!(config.follow.target_login, "octocat");
    }

    #[test]
    fn missing_client_credentials_fail() {
        let mut vars = required();
        vars.remove("GITHUB__CLIENT_SECRET");
        assert!(load(vars).is_err());
    }
}
