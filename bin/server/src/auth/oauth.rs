//! OAuth 2.0 authorization-code flow for the two identity providers.
//!
//! Both providers use PKCE (S256) and a random CSRF state. The state and the
//! PKCE verifier travel back to the callback in a short-lived cookie as
//! base64url-encoded JSON.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use gatehouse_core::{AccessToken, Identity, Provider, Result};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::OAuthProviderConfig;

/// Google OAuth authorization URL.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth token URL.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// GitHub OAuth authorization URL.
pub const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";

/// GitHub OAuth token URL.
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

const GOOGLE_SCOPES: &[&str] = &[
    "openid",
    "profile",
    "email",
    "https://www.googleapis.com/auth/youtube.readonly",
];

const GITHUB_SCOPES: &[&str] = &["user:email"];

/// OAuth client for one provider.
#[derive(Clone)]
pub struct OAuthClient {
    provider: Provider,
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Creates a client from configuration, validating every URL.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is invalid or the HTTP client cannot be built.
    pub fn new(provider: Provider, config: &OAuthProviderConfig) -> Result<Self, OAuthError> {
        let (default_auth_url, default_token_url) = match provider {
            Provider::Google => (GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL),
            Provider::GitHub => (GITHUB_AUTH_URL, GITHUB_TOKEN_URL),
        };

        let auth_url = config
            .auth_url
            .clone()
            .unwrap_or_else(|| default_auth_url.to_string());
        let auth_url = AuthUrl::new(auth_url).map_err(|e| OAuthError::Configuration {
            reason: format!("invalid auth URL: {e}"),
        })?;

        let token_url = config
            .token_url
            .clone()
            .unwrap_or_else(|| default_token_url.to_string());
        let token_url = TokenUrl::new(token_url).map_err(|e| OAuthError::Configuration {
            reason: format!("invalid token URL: {e}"),
        })?;

        let redirect_url =
            RedirectUrl::new(config.redirect_url.clone()).map_err(|e| OAuthError::Configuration {
                reason: format!("invalid redirect URL: {e}"),
            })?;

        // The token endpoint must not be allowed to bounce us elsewhere.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OAuthError::Configuration {
                reason: format!("HTTP client error: {e}"),
            })?;

        Ok(Self {
            provider,
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            auth_url,
            token_url,
            redirect_url,
            http,
        })
    }

    fn scopes(&self) -> &'static [&'static str] {
        match self.provider {
            Provider::Google => GOOGLE_SCOPES,
            Provider::GitHub => GITHUB_SCOPES,
        }
    }

    fn auth_type(&self) -> AuthType {
        match self.provider {
            Provider::Google => AuthType::BasicAuth,
            Provider::GitHub => AuthType::RequestBody,
        }
    }

    /// Generates the consent URL.
    ///
    /// Returns the URL to redirect the visitor to, along with the state to
    /// keep until the callback.
    pub fn authorization_url(&self) -> (String, AuthState) {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);
        for scope in self.scopes() {
            request = request.add_scope(Scope::new((*scope).to_string()));
        }

        let (url, csrf_token) = request.url();

        let state = AuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (url.to_string(), state)
    }

    /// Exchanges an authorization code for the visitor's access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint rejects the code or answers
    /// with something other than a token response.
    #[instrument(skip_all, fields(provider = %self.provider))]
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<Identity, OAuthError> {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .set_auth_type(self.auth_type());

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| OAuthError::TokenExchange {
                reason: e.to_string(),
            })?;

        debug!("authorization code exchanged");

        Ok(Identity::new(
            self.provider,
            AccessToken::new(token.access_token().secret().clone()),
        ))
    }
}

/// State kept in a cookie between the redirect to the provider and the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

impl AuthState {
    /// Encodes the state as a cookie-safe string.
    pub fn encode(&self) -> Result<String, OAuthError> {
        let json = serde_json::to_vec(self).map_err(|e| OAuthError::StateEncoding {
            reason: e.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes a value produced by [`AuthState::encode`].
    pub fn decode(value: &str) -> Result<Self, OAuthError> {
        let json = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|e| OAuthError::StateEncoding {
                reason: e.to_string(),
            })?;
        let state = serde_json::from_slice(&json).map_err(|e| OAuthError::StateEncoding {
            reason: e.to_string(),
        })?;
        Ok(state)
    }
}

/// OAuth errors.
#[derive(Debug)]
pub enum OAuthError {
    /// Invalid client configuration.
    Configuration { reason: String },
    /// The token endpoint did not hand out a token.
    TokenExchange { reason: String },
    /// The auth state cookie could not be written or read.
    StateEncoding { reason: String },
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "OAuth configuration error: {reason}"),
            Self::TokenExchange { reason } => write!(f, "token exchange failed: {reason}"),
            Self::StateEncoding { reason } => write!(f, "invalid auth state: {reason}"),
        }
    }
}

impl std::error::Error for OAuthError {}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(token_url: Option<String>) -> OAuthProviderConfig {
        OAuthProviderConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_url: "http://localhost:8000/auth/callback".to_string(),
            auth_url: None,
            token_url,
        }
    }

    fn token_body() -> serde_json::Value {
        serde_json::json!({
            "access_token": "issued-token",
            "token_type": "bearer",
            "scope": "user:email"
        })
    }

    #[test]
    fn google_url_requests_youtube_scope_with_pkce() {
        let client = OAuthClient::new(Provider::Google, &config(None)).expect("client");
        let (url, state) = client.authorization_url();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("youtube.readonly"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains(&format!("state={}", state.csrf_token)));
    }

    #[test]
    fn github_url_requests_email_scope() {
        let client = OAuthClient::new(Provider::GitHub, &config(None)).expect("client");
        let (url, _) = client.authorization_url();

        assert!(url.starts_with(GITHUB_AUTH_URL));
        assert!(url.contains("scope=user%3Aemail"));
    }

    #[test]
    fn each_authorization_gets_fresh_state() {
        let client = OAuthClient::new(Provider::Google, &config(None)).expect("client");
        let (_, first) = client.authorization_url();
        let (_, second) = client.authorization_url();
        assert_ne!(first.csrf_token, second.csrf_token);
        assert_ne!(first.pkce_verifier, second.pkce_verifier);
    }

    #[test]
    fn invalid_redirect_url_is_rejected() {
        let mut config = config(None);
        config.redirect_url = "not a url".to_string();
        assert!(OAuthClient::new(Provider::Google, &config).is_err());
    }

    #[test]
    fn auth_state_cookie_value_decodes() {
        let state = AuthState {
            csrf_token: "csrf".to_string(),
            pkce_verifier: "verifier".to_string(),
        };
        let encoded = state.encode().expect("encode");
        assert!(!encoded.contains('='));
        assert_eq!(AuthState::decode(&encoded).expect("decode"), state);
        assert!(AuthState::decode("!!not base64!!").is_err());
    }

    #[tokio::test]
    async fn google_exchange_uses_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("code_verifier=verifier"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(
            Provider::Google,
            &config(Some(format!("{}/token", server.uri()))),
        )
        .expect("client");
        let identity = client.exchange_code("code", "verifier").await.expect("exchange");

        assert_eq!(identity.provider, Provider::Google);
        assert_eq!(identity.access_token.secret(), "issued-token");
    }

    #[tokio::test]
    async fn github_exchange_sends_credentials_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("client_secret=client-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(
            Provider::GitHub,
            &config(Some(format!("{}/token", server.uri()))),
        )
        .expect("client");
        let identity = client.exchange_code("code", "verifier").await.expect("exchange");

        assert_eq!(identity.provider, Provider::GitHub);
    }

    #[tokio::test]
    async fn rejected_code_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::new(
            Provider::Google,
            &config(Some(format!("{}/token", server.uri()))),
        )
        .expect("client");
        assert!(client.exchange_code("stale", "verifier").await.is_err());
    }
}
