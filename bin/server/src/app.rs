//! Router assembly.

use std::sync::Arc;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::pages;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(state.pages.assets()).fallback(pages::fallback.into_service());

    Router::new()
        .route("/", get(pages::entry))
        .route("/auth/google", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/auth/github", get(auth::github_login))
        .route("/auth/github/callback", get(auth::github_callback))
        .route("/auth/logout", get(auth::logout))
        .route("/login/success", get(pages::login_success))
        .route("/login/failed", get(pages::login_failed))
        .route("/youtube/verification/failed", get(pages::youtube_failed))
        .route("/github/verification/failed", get(pages::github_failed))
        .route("/confirmation", get(pages::confirmation))
        .nest_service("/assets", assets)
        .fallback(pages::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
