//! League Server - HTTP API for the league simulator
//!
//! This crate provides the web backend:
//! - Team, match, table and prediction listings
//! - Week and full-season simulation
//! - Standings and season resets

mod error;
mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use league_core::Season;

pub use error::ApiError;
pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Liveness and status
        .route("/health", get(routes::status::health_handler))
        .route("/api/status", get(routes::status::status_handler))
        // Teams
        .route("/api/teams", get(routes::teams::list_teams))
        .route("/api/teams/{id}", get(routes::teams::get_team))
        // Matches
        .route("/api/matches", get(routes::matches::list_matches))
        .route("/api/matches/week/{week}", get(routes::matches::matches_for_week))
        .route("/api/matches/generate", post(routes::matches::generate_matches))
        .route(
            "/api/matches/simulate/{week}",
            post(routes::matches::simulate_week),
        )
        .route("/api/matches/simulate-all", post(routes::matches::simulate_all))
        // League table
        .route("/api/league/table", get(routes::league::current_table))
        .route(
            "/api/league/table/week/{week}",
            get(routes::league::table_at_week),
        )
        .route("/api/league/reset", post(routes::league::reset_table))
        // Predictions
        .route("/api/predictions", get(routes::predictions::list_predictions))
        .route(
            "/api/predictions/generate",
            post(routes::predictions::generate_predictions),
        )
        // System
        .route("/api/system/reset", post(routes::system::reset_season))
        // Shared state
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig, season: Season) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(ServerState::new(season));
    let router = create_router(state);

    tracing::info!("League server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
