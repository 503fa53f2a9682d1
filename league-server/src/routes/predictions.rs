//! Prediction endpoints

use axum::{extract::State, Json};
use league_core::Prediction;
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::ServerState;

#[derive(Serialize)]
pub struct PredictionsResponse {
    pub message: String,
    pub predictions: Vec<Prediction>,
}

/// Stored predictions, best placed first
pub async fn list_predictions(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<Vec<Prediction>> {
    Ok(Json(state.season.predictions()?))
}

/// Regenerate predictions from the current table
pub async fn generate_predictions(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<PredictionsResponse> {
    let predictions = state.season.generate_predictions()?;
    Ok(Json(PredictionsResponse {
        message: "Championship probabilities generated successfully".to_string(),
        predictions,
    }))
}
