//! HTTP server bootstrap for the policy ledger.
//!
//! This module wires together:
//! - configuration
//! - database connection pool and migrations
//! - the stores and the notification hub
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::api;
use crate::api::handlers::health;
use crate::auth::{
    auth_middleware, ApiKeyRecord, ApiKeyValidator, AuthMiddlewareState, Authenticator,
    Permissions, RateLimiter,
};
use crate::dispatch::NotificationHub;
use crate::infra::{
    PgAcknowledgmentLedger, PgNotificationStore, PgPolicyStore, PgStatsStore, PgUserDirectory,
};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Maximum database connections.
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/policy_ledger".to_string());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        let max_connections: u32 = std::env::var("MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(10);

        Self {
            database_url,
            listen_addr,
            max_connections,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub policy_store: Arc<PgPolicyStore>,
    pub ledger: Arc<PgAcknowledgmentLedger>,
    pub notifications: Arc<PgNotificationStore>,
    pub stats: Arc<PgStatsStore>,
    pub users: Arc<PgUserDirectory>,
    pub hub: Arc<NotificationHub>,
    pub api_keys: Arc<ApiKeyValidator>,
}

impl AppState {
    /// Build the full state over one connection pool.
    pub fn new(pool: PgPool, api_keys: Arc<ApiKeyValidator>) -> Self {
        Self {
            policy_store: Arc::new(PgPolicyStore::new(pool.clone())),
            ledger: Arc::new(PgAcknowledgmentLedger::new(pool.clone())),
            notifications: Arc::new(PgNotificationStore::new(pool.clone())),
            stats: Arc::new(PgStatsStore::new(pool.clone())),
            users: Arc::new(PgUserDirectory::new(pool.clone())),
            hub: Arc::new(NotificationHub::default()),
            api_keys,
            pool,
        }
    }
}

/// Build the application router.
pub fn app(state: AppState, auth_state: AuthMiddlewareState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(tower_http::cors::Any);

    let api = api::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting policy-ledger v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    crate::migrations::run_postgres(&pool).await?;

    // Auth configuration
    let auth_mode = std::env::var("AUTH_MODE").unwrap_or_else(|_| "required".to_string());
    let require_auth = auth_mode != "disabled";

    let api_key_validator = Arc::new(ApiKeyValidator::new());
    let mut any_auth_configured = false;

    if let Ok(bootstrap_key) = std::env::var("BOOTSTRAP_ADMIN_API_KEY") {
        let key_hash = ApiKeyValidator::hash_key(&bootstrap_key);
        api_key_validator.register_key(ApiKeyRecord {
            key_hash,
            user_id: Uuid::nil(),
            permissions: Permissions::admin(),
            active: true,
        });
        any_auth_configured = true;
        info!("Bootstrap admin API key is configured");
    }

    if require_auth && !any_auth_configured {
        anyhow::bail!(
            "AUTH_MODE=required but no auth is configured; set BOOTSTRAP_ADMIN_API_KEY (or set AUTH_MODE=disabled for local dev)"
        );
    }

    let rate_limiter = std::env::var("RATE_LIMIT_PER_MINUTE")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .map(|limit| Arc::new(RateLimiter::new(limit)));

    let auth_state = AuthMiddlewareState {
        authenticator: Arc::new(Authenticator::new(api_key_validator.clone())),
        require_auth,
        rate_limiter,
    };

    let state = AppState::new(pool, api_key_validator);
    let app = app(state, auth_state);

    info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
