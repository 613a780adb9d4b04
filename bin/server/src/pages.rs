//! Static pages and the handlers that decide which one a visitor sees.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use gatehouse_verification::Destination;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::warn;

use crate::auth::{AppState, VisitorSession};

/// A page served from the public directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Success,
    AccessDenied,
    YouTubeVerificationFailed,
    GitHubVerificationFailed,
    Confirmation,
}

impl Page {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Login => "login_screen.html",
            Self::Success => "success.html",
            Self::AccessDenied => "access_denied.html",
            Self::YouTubeVerificationFailed => "youtube_verification_failed.html",
            Self::GitHubVerificationFailed => "github_verification_fail.html",
            Self::Confirmation => "testing.html",
        }
    }
}

/// The directory the pages and `assets/` are served from.
#[derive(Debug, Clone)]
pub struct PageDirectory {
    root: PathBuf,
}

impl PageDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn assets(&self) -> PathBuf {
        self.root.join("assets")
    }

    /// Serves `page` in response to `request`.
    pub async fn serve(&self, page: Page, request: Request) -> Response {
        let file = ServeFile::new(self.root.join(page.file_name()));
        match file.oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(infallible) => match infallible {},
        }
    }
}

/// Entry route.
pub async fn entry(State(state): State<Arc<AppState>>, request: Request) -> Response {
    state.pages.serve(Page::Login, request).await
}

/// Public confirmation page.
pub async fn confirmation(State(state): State<Arc<AppState>>, request: Request) -> Response {
    state.pages.serve(Page::Confirmation, request).await
}

/// The gated success route.
///
/// Runs the entitlement guards for the visitor's session and either serves
/// the success page or redirects.
pub async fn login_success(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut visitor: VisitorSession,
    request: Request,
) -> Response {
    let destination = state.pipeline.evaluate(visitor.session_mut()).await;
    if destination == Destination::Root {
        return Redirect::to(destination.path()).into_response();
    }

    let jar = match visitor.persist(&state, jar.clone()).await {
        Ok(jar) => jar,
        Err(report) => {
            warn!(error = %report, "failed to save verification results");
            jar
        }
    };

    match destination {
        Destination::SuccessPage => {
            let page = state.pages.serve(Page::Success, request).await;
            (jar, page).into_response()
        }
        other => (jar, Redirect::to(other.path())).into_response(),
    }
}

/// Generic denial page.
pub async fn login_failed(
    State(state): State<Arc<AppState>>,
    visitor: VisitorSession,
    request: Request,
) -> Response {
    serve_authenticated(&state, &visitor, Page::AccessDenied, request).await
}

/// Failure page after a YouTube check at callback time.
pub async fn youtube_failed(
    State(state): State<Arc<AppState>>,
    visitor: VisitorSession,
    request: Request,
) -> Response {
    serve_authenticated(&state, &visitor, Page::YouTubeVerificationFailed, request).await
}

/// Failure page after a GitHub check at callback time.
pub async fn github_failed(
    State(state): State<Arc<AppState>>,
    visitor: VisitorSession,
    request: Request,
) -> Response {
    serve_authenticated(&state, &visitor, Page::GitHubVerificationFailed, request).await
}

/// Anonymous visitors never learn a gated page exists.
async fn serve_authenticated(
    state: &AppState,
    visitor: &VisitorSession,
    page: Page,
    request: Request,
) -> Response {
    if visitor.session().is_authenticated() {
        state.pages.serve(page, request).await
    } else {
        Redirect::to(Destination::Root.path()).into_response()
    }
}

/// Any unmatched path goes back to the entry route.
pub async fn fallback() -> Redirect {
    Redirect::to(Destination::Root.path())
}
