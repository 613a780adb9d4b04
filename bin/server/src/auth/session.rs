//! Visitor session extractor.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gatehouse_core::SessionId;
use gatehouse_session::{Session, SessionStoreError};
use time::Duration as TimeDuration;
use tracing::{debug, warn};

use super::AppState;

/// The session belonging to the current request.
///
/// Visitors without a valid session cookie get a fresh, empty session. It is
/// only stored, and the cookie only issued, when a handler calls
/// [`VisitorSession::persist`].
pub struct VisitorSession {
    id: SessionId,
    session: Session,
    is_new: bool,
}

impl VisitorSession {
    fn fresh() -> Self {
        Self {
            id: SessionId::generate(),
            session: Session::new(),
            is_new: true,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Saves the session, adding the session cookie to `jar` the first time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub async fn persist(
        &self,
        state: &AppState,
        jar: CookieJar,
    ) -> gatehouse_core::Result<CookieJar, SessionStoreError> {
        state.sessions.save(&self.id, &self.session).await?;

        if !self.is_new {
            return Ok(jar);
        }

        debug!("issuing session cookie");
        // Browser-session cookie; expiry is the store's idle TTL.
        let cookie = Cookie::build((
            state.session_config.cookie_name.clone(),
            self.id.as_str().to_string(),
        ))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax);

        Ok(jar.add(cookie))
    }

    /// Deletes the stored session and expires the cookie.
    pub async fn destroy(self, state: &AppState, jar: CookieJar) -> CookieJar {
        if !self.is_new
            && let Err(report) = state.sessions.remove(&self.id).await
        {
            warn!(error = %report, "failed to delete session");
        }

        let removal = Cookie::build((state.session_config.cookie_name.clone(), ""))
            .path("/")
            .max_age(TimeDuration::ZERO);

        jar.add(removal)
    }
}

impl<S> FromRequestParts<S> for VisitorSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(cookie) = jar.get(&app_state.session_config.cookie_name) else {
            return Ok(Self::fresh());
        };

        let id = SessionId::new(cookie.value());
        match app_state.sessions.load(&id).await {
            Ok(Some(session)) => Ok(Self {
                id,
                session,
                is_new: false,
            }),
            Ok(None) => {
                debug!("session cookie does not match a stored session");
                Ok(Self::fresh())
            }
            Err(report) => {
                warn!(error = %report, "failed to load session, starting a fresh one");
                Ok(Self::fresh())
            }
        }
    }
}
