//! Live quiz host backend
//!
//! A facilitator steps through rounds and questions, players poll for their view
//! and submit answers, and scores are revealed question by question. SQLite holds
//! all state.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod quiz;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quiz host");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.control_psk.is_none() {
        tracing::warn!("No control key configured (QUIZ_CONTROL_PSK). Anyone can run the quiz!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Refuse to serve without the quiz state row
    let quiz_state = repo.get_state().await?;
    tracing::info!("Resuming at {:?}", quiz_state);

    // Players log in again after a restart; answers and progress are kept
    let cleared = repo.clear_players().await?;
    if cleared > 0 {
        tracing::info!("Cleared {} players from the previous run", cleared);
    }

    if let Some(path) = &config.questions_path {
        db::seed_questions(&repo, path).await?;
    }

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let control_psk = state.config.control_psk.clone();

    // Facilitator routes
    let control_routes = Router::new()
        .route("/control", get(api::get_control).post(api::post_control))
        .route(
            "/control/questions",
            get(api::list_questions).put(api::import_questions),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::control_auth_layer(control_psk.clone(), req, next)
        }));

    // Player routes
    let player_routes = Router::new()
        .route("/login", post(api::login))
        .route("/view", get(api::get_view))
        .route("/answers", post(api::submit_answers))
        .route("/leaderboard", get(api::get_leaderboard));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", player_routes.merge(control_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
