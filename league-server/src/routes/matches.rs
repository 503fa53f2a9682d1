//! Match endpoints
//!
//! Listing, explicit schedule generation and simulation. Simulating a week
//! past the prediction threshold also returns the refreshed predictions.
//! Week segments are taken as text so that a malformed number reports the
//! same `{ error, kind }` body as an out-of-range one.

use axum::{
    extract::{Path, State},
    Json,
};
use league_core::{parse_week, Fixture, Prediction, SimulationReport};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::ServerState;

#[derive(Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub matches: Vec<Fixture>,
}

#[derive(Serialize)]
pub struct SimulationResponse {
    pub message: String,
    pub matches: Vec<Fixture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<Prediction>>,
}

impl SimulationResponse {
    fn from_report(summary: String, report: SimulationReport) -> Self {
        let message = if report.predictions.is_some() {
            format!("{summary} and generated championship predictions")
        } else {
            summary
        };
        Self {
            message,
            matches: report.fixtures,
            predictions: report.predictions,
        }
    }
}

/// All fixtures ordered by week
pub async fn list_matches(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<Fixture>> {
    Ok(Json(state.season.fixtures()?))
}

pub async fn matches_for_week(
    State(state): State<Arc<ServerState>>,
    Path(week): Path<String>,
) -> ApiResult<Vec<Fixture>> {
    let week = parse_week(&week)?;
    Ok(Json(state.season.fixtures_for_week(week)?))
}

pub async fn generate_matches(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<GenerateResponse> {
    let matches = state.season.generate_fixtures()?;
    Ok(Json(GenerateResponse {
        message: format!("Generated {} matches", matches.len()),
        matches,
    }))
}

pub async fn simulate_week(
    State(state): State<Arc<ServerState>>,
    Path(week): Path<String>,
) -> ApiResult<SimulationResponse> {
    let week = parse_week(&week)?;
    let report = state.season.simulate_week(week)?;
    Ok(Json(SimulationResponse::from_report(
        format!("Successfully simulated week {week}"),
        report,
    )))
}

pub async fn simulate_all(State(state): State<Arc<ServerState>>) -> ApiResult<SimulationResponse> {
    let report = state.season.simulate_all_remaining()?;
    Ok(Json(SimulationResponse::from_report(
        "Successfully simulated all remaining matches".to_string(),
        report,
    )))
}
