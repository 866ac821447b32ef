//! HTTP server bootstrap for the Gravy marketplace core.
//!
//! This module wires together:
//! - configuration
//! - database connection pool
//! - core services (store, scorer, proposal intake, settlement processor)
//! - the Axum router

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use crate::auth::{AuthMiddlewareState, Principal, SessionValidator};
use crate::intake::{IntakePolicy, ProposalIntake};
use crate::scoring::{DisabledScorer, GuardedScorer, HttpScorer, Scorer, ScorerConfig};
use crate::settlement::SettlementProcessor;
use crate::store::{HealthCheck, MarketplaceStore, PgStore};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Maximum database connections.
    pub max_connections: u32,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
    /// Shared secret for the internal rescore worker, if configured.
    pub worker_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/gravy_core".to_string());

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

        let webhook_secret = std::env::var("PAYMENT_WEBHOOK_SECRET").unwrap_or_default();
        let worker_secret = std::env::var("WORKER_SECRET").ok();

        Self {
            database_url,
            listen_addr,
            max_connections,
            webhook_secret,
            worker_secret,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketplaceStore>,
    pub sessions: Arc<SessionValidator>,
    pub intake: Arc<ProposalIntake>,
    pub settlement: Arc<SettlementProcessor>,
    pub worker_secret: Option<String>,
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting gravy-core v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Max connections: {}", config.max_connections);

    if config.webhook_secret.is_empty() {
        warn!("PAYMENT_WEBHOOK_SECRET is empty; webhook deliveries will be rejected");
    }

    // Auth configuration
    let auth_mode = std::env::var("AUTH_MODE").unwrap_or_else(|_| "required".to_string());
    let require_auth = auth_mode != "disabled";

    let sessions = Arc::new(SessionValidator::new());
    let mut any_session_configured = false;
    if let Ok(bootstrap) = std::env::var("BOOTSTRAP_SESSIONS") {
        for entry in bootstrap.split(',').filter(|s| !s.trim().is_empty()) {
            let session = parse_bootstrap_session(entry)
                .map_err(|e| anyhow::anyhow!("Invalid BOOTSTRAP_SESSIONS entry: {e}"))?;
            sessions.register(&session.0, session.1);
            any_session_configured = true;
        }
        info!("Bootstrap sessions registered");
    }

    if require_auth && !any_session_configured {
        warn!(
            "AUTH_MODE=required but no sessions are configured; set BOOTSTRAP_SESSIONS or AUTH_MODE=disabled for local dev"
        );
    }

    let auth_state = AuthMiddlewareState {
        sessions: sessions.clone(),
        require_auth,
    };

    // Connect to PostgreSQL
    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Connected to PostgreSQL");

    let migrate_on_startup = std::env::var("DB_MIGRATE_ON_STARTUP")
        .ok()
        .map(|v| {
            !matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off"
            )
        })
        .unwrap_or(true);
    if migrate_on_startup {
        info!("Running database migrations...");
        crate::migrations::run_postgres(&pool).await?;
        info!("Database migrations applied");
    } else {
        info!("DB migrations skipped (DB_MIGRATE_ON_STARTUP=0)");
    }

    // Initialize services
    let store: Arc<dyn MarketplaceStore> = Arc::new(PgStore::new(pool));

    let scorer: Arc<dyn Scorer> = match ScorerConfig::from_env() {
        Some(scorer_config) => {
            info!("Scoring service configured:");
            info!("  Endpoint: {}", scorer_config.endpoint);
            info!("  Timeout: {:?}", scorer_config.timeout);
            let timeout = scorer_config.timeout;
            let http = HttpScorer::new(scorer_config)
                .map_err(|e| anyhow::anyhow!("scoring client: {e}"))?;
            Arc::new(GuardedScorer::new(http, timeout))
        }
        None => {
            info!("Scoring service not configured (set SCORING_URL to enable); proposals will be created unscored");
            Arc::new(DisabledScorer)
        }
    };

    let policy = IntakePolicy::from_env();
    info!(
        "Intake policy: require_active_campaign={} single_proposal_per_creator={}",
        policy.require_active_campaign, policy.single_proposal_per_creator
    );

    let intake = Arc::new(ProposalIntake::new(store.clone(), scorer, policy));
    let settlement = Arc::new(SettlementProcessor::new(
        store.clone(),
        config.webhook_secret.as_bytes(),
    ));

    let state = AppState {
        store,
        sessions,
        intake,
        settlement,
        worker_secret: config.worker_secret.clone(),
    };

    // Build router
    let app = build_router(auth_state)?.with_state(state);

    // Start server
    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("gravy-core is ready to accept connections");
    axum::serve(listener, app).await?;

    Ok(())
}

fn parse_bootstrap_session(entry: &str) -> Result<(String, Principal), String> {
    // Format: token:email:role
    let mut parts = entry.trim().splitn(3, ':');
    let token = parts.next().filter(|s| !s.is_empty()).ok_or("missing token")?;
    let email = parts.next().filter(|s| !s.is_empty()).ok_or("missing email")?;
    let role = parts
        .next()
        .ok_or("missing role")?
        .parse()
        .map_err(|e: String| e)?;
    Ok((token.to_string(), Principal::new(email, role)))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

fn build_router(auth_state: AuthMiddlewareState) -> anyhow::Result<Router<AppState>> {
    let protected = crate::api::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        crate::auth::auth_middleware,
    ));

    let mut router = Router::new()
        .merge(crate::api::public_router())
        .merge(protected)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http());

    if let Some(cors_layer) = cors_layer_from_env()? {
        router = router.layer(cors_layer);
    }

    Ok(router)
}

fn cors_layer_from_env() -> anyhow::Result<Option<CorsLayer>> {
    let origins = match std::env::var("CORS_ALLOW_ORIGINS") {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };

    let origins = origins.trim();
    if origins.is_empty() {
        return Ok(None);
    }

    let allow_origin = if origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ]),
    ))
}

/// Health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": "gravy-core",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check endpoint.
async fn readiness_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    match state.store.ping().await {
        Ok(()) => Ok(axum::Json(serde_json::json!({
            "status": "ready",
            "database": "connected",
        }))),
        Err(e) => Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            format!("Store unavailable: {}", e),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn bootstrap_session_parses() {
        let (token, principal) =
            parse_bootstrap_session("gv_abc:brand@example.com:BRAND").unwrap();
        assert_eq!(token, "gv_abc");
        assert_eq!(principal.email, "brand@example.com");
        assert_eq!(principal.role, Role::Brand);
    }

    #[test]
    fn bootstrap_session_rejects_garbage() {
        assert!(parse_bootstrap_session("no-colons").is_err());
        assert!(parse_bootstrap_session("t:e@x.com:WIZARD").is_err());
        assert!(parse_bootstrap_session(":e@x.com:BRAND").is_err());
    }
}
