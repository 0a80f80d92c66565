//! TaskVault Task API
//!
//! Task management service with JWT authentication.
//!
//! ## Auth Endpoints
//!
//! - `POST /api/auth/register` - Create an account
//! - `POST /api/auth/login` - Log in
//! - `POST /api/auth/refresh` - Exchange the refresh cookie for a new access token
//! - `POST /api/auth/logout` - Invalidate the refresh token
//! - `GET /api/auth/me` - Current user profile
//!
//! ## Task Endpoints
//!
//! - `GET /api/tasks` - List tasks with filtering, sorting and pagination
//! - `POST /api/tasks` - Create a task
//! - `GET /api/tasks/:id` - Get a task
//! - `PATCH /api/tasks/:id` - Update a task
//! - `PATCH /api/tasks/:id/toggle` - Toggle completion status
//! - `DELETE /api/tasks/:id` - Delete a task
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe

mod config;
mod error;
mod extractors;
mod handlers;
mod response;
mod state;
mod validation;

use std::net::SocketAddr;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("task_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TaskVault Task API");

    // Load configuration
    let config = Config::from_env()?;
    error::set_production(config.is_production());
    tracing::info!(
        port = config.port,
        environment = ?config.environment,
        "Configuration loaded"
    );

    // Create database pool
    let pool = taskvault_db::create_pool(&config.database_url, &config.pool).await?;
    tracing::info!(
        max_connections = config.pool.max_connections,
        "Database pool created"
    );

    // Create application state
    let state = AppState::new(config.clone(), pool);

    // Build HTTP router
    let app = build_router(state)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::me));

    let task_routes = Router::new()
        .route("/", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/:id",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/:id/toggle", patch(handlers::toggle_task));

    // Health routes bypass CORS and tracing layers
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Credentialed CORS requires an explicit origin, never a wildcard
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .merge(health_routes)
        .with_state(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
