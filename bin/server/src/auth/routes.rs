//! Authentication routes for login, callback, and logout.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gatehouse_core::Provider;
use serde::Deserialize;
use time::Duration as TimeDuration;
use tracing::{error, info, warn};

use super::{AppState, AuthState, VisitorSession};

/// Auth state cookie for the Google flow.
const GOOGLE_AUTH_STATE_COOKIE: &str = "google_auth_state";

/// Auth state cookie for the GitHub flow.
const GITHUB_AUTH_STATE_COOKIE: &str = "github_auth_state";

fn auth_state_cookie(provider: Provider) -> &'static str {
    match provider {
        Provider::Google => GOOGLE_AUTH_STATE_COOKIE,
        Provider::GitHub => GITHUB_AUTH_STATE_COOKIE,
    }
}

/// Expires the auth state cookie for `provider`.
fn clear_auth_state(provider: Provider) -> Cookie<'static> {
    Cookie::build((auth_state_cookie(provider), ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Query parameters the provider appends to the callback.
///
/// A denied consent comes back with only `error` set.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Starts the Google login flow.
pub async fn google_login(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    start(&state, Provider::Google, jar).into_response()
}

/// Starts the GitHub login flow.
pub async fn github_login(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    start(&state, Provider::GitHub, jar).into_response()
}

/// Handles the Google callback.
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    jar: CookieJar,
    visitor: VisitorSession,
) -> Response {
    callback(&state, Provider::Google, query, jar, visitor).await
}

/// Handles the GitHub callback.
pub async fn github_callback(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    jar: CookieJar,
    visitor: VisitorSession,
) -> Response {
    callback(&state, Provider::GitHub, query, jar, visitor).await
}

/// Logs the visitor out by deleting their session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    visitor: VisitorSession,
) -> impl IntoResponse {
    let jar = visitor.destroy(&state, jar).await;
    (jar, Redirect::to("/"))
}

fn start(
    state: &AppState,
    provider: Provider,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    let (auth_url, auth_state) = state.oauth(provider).authorization_url();
    let value = auth_state
        .encode()
        .map_err(|report| AuthError::StateEncoding(report.to_string()))?;

    let cookie = Cookie::build((auth_state_cookie(provider), value))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    Ok((jar.add(cookie), Redirect::to(&auth_url)))
}

/// Runs the callback, expiring the auth state cookie whatever the outcome.
async fn callback(
    state: &AppState,
    provider: Provider,
    query: Result<Query<CallbackQuery>, QueryRejection>,
    jar: CookieJar,
    visitor: VisitorSession,
) -> Response {
    let outcome = match query {
        Ok(Query(query)) => complete(state, provider, query, jar, visitor).await,
        Err(rejection) => Err(AuthError::MalformedCallback {
            provider,
            reason: rejection.body_text(),
        }),
    };

    match outcome {
        Ok(done) => done.into_response(),
        Err(err) => (CookieJar::new().add(clear_auth_state(provider)), err).into_response(),
    }
}

async fn complete(
    state: &AppState,
    provider: Provider,
    query: CallbackQuery,
    jar: CookieJar,
    mut visitor: VisitorSession,
) -> Result<(CookieJar, Redirect), AuthError> {
    if let Some(error) = query.error {
        return Err(AuthError::ProviderDenied { provider, error });
    }

    let stored = jar
        .get(auth_state_cookie(provider))
        .ok_or(AuthError::MissingAuthState)?;
    let auth_state =
        AuthState::decode(stored.value()).map_err(|_| AuthError::InvalidAuthState)?;

    if query.state.as_deref() != Some(auth_state.csrf_token.as_str()) {
        return Err(AuthError::CsrfMismatch);
    }

    let code = query.code.ok_or(AuthError::MissingCode)?;

    let identity = state
        .oauth(provider)
        .exchange_code(&code, &auth_state.pkce_verifier)
        .await
        .map_err(|report| AuthError::TokenExchange(report.to_string()))?;

    state.pipeline.authenticate(visitor.session_mut(), identity);
    let destination = state
        .pipeline
        .verify_callback(visitor.session_mut(), provider)
        .await;

    let jar = visitor
        .persist(state, jar)
        .await
        .map_err(|report| AuthError::SessionStore(report.to_string()))?;

    info!(provider = %provider, destination = destination.path(), "callback complete");
    Ok((jar.add(clear_auth_state(provider)), Redirect::to(destination.path())))
}

/// Authentication errors.
///
/// Every variant sends the visitor back to the entry page.
#[derive(Debug)]
pub enum AuthError {
    ProviderDenied { provider: Provider, error: String },
    MalformedCallback { provider: Provider, reason: String },
    MissingAuthState,
    InvalidAuthState,
    CsrfMismatch,
    MissingCode,
    StateEncoding(String),
    TokenExchange(String),
    SessionStore(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::ProviderDenied { provider, error } => {
                info!(provider = %provider, error = %error, "provider did not grant consent");
            }
            Self::MalformedCallback { provider, reason } => {
                warn!(provider = %provider, reason = %reason, "callback query could not be parsed");
            }
            Self::MissingAuthState => warn!("callback without auth state cookie"),
            Self::InvalidAuthState => warn!("callback with unreadable auth state"),
            Self::CsrfMismatch => warn!("callback state does not match auth state"),
            Self::MissingCode => warn!("callback without authorization code"),
            Self::StateEncoding(msg) => error!("Failed to encode auth state: {}", msg),
            Self::TokenExchange(msg) => error!("Token exchange failed: {}", msg),
            Self::SessionStore(msg) => error!("Failed to save session: {}", msg),
        }

        Redirect::to("/").into_response()
    }
}
