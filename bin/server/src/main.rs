use std::sync::Arc;

use gatehouse_core::Provider;
use gatehouse_entitlement::{GitHubFollowChecker, YouTubeSubscriptionChecker, http_client};
use gatehouse_server::{
    app,
    auth::{AppState, OAuthClient},
    config::{ServerConfig, SessionBackend},
    pages::PageDirectory,
};
use gatehouse_session::{MemorySessionStore, RedisSessionStore, SessionStore};
use gatehouse_verification::VerificationPipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let idle_ttl = config.session.idle_ttl();
    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Memory => Arc::new(MemorySessionStore::new(
            config.session.max_sessions,
            idle_ttl,
        )),
        SessionBackend::Redis => {
            let url = config
                .session
                .redis_url
                .as_deref()
                .expect("SESSION__REDIS_URL is required for the redis backend");
            Arc::new(
                RedisSessionStore::connect(url, idle_ttl)
                    .await
                    .expect("failed to connect to Redis"),
            )
        }
    };
    tracing::info!(backend = ?config.session.backend, "Session store ready");

    let http = http_client().expect("failed to create HTTP client");
    let youtube = YouTubeSubscriptionChecker::new(
        http.clone(),
        &config.youtube.api_base_url,
        &config.youtube.channel_id,
    )
    .expect("invalid YouTube configuration");
    let follow = GitHubFollowChecker::new(
        http,
        &config.follow.api_base_url,
        &config.follow.target_login,
    )
    .expect("invalid follow configuration");
    tracing::info!(
        channel_id = youtube.channel_id(),
        target_login = follow.target_login(),
        "Entitlement checkers ready"
    );

    let pipeline = VerificationPipeline::new(Arc::new(youtube), Arc::new(follow))
        .expect("entitlement checkers wired to the wrong providers")
        .with_recheck_policy(config.verification.recheck);
    tracing::info!(recheck = ?pipeline.recheck_policy(), "Verification pipeline ready");

    let google =
        OAuthClient::new(Provider::Google, &config.google).expect("invalid Google OAuth config");
    let github =
        OAuthClient::new(Provider::GitHub, &config.github).expect("invalid GitHub OAuth config");

    let addr = format!("{}:{}", config.listen_host, config.port);
    let state = Arc::new(AppState::new(
        sessions,
        pipeline,
        google,
        github,
        PageDirectory::new(config.public_dir),
        config.session,
    ));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down");
}
