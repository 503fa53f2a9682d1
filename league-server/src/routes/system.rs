//! System endpoints

use axum::{extract::State, Json};
use std::sync::Arc;

use super::MessageResponse;
use crate::error::ApiResult;
use crate::state::ServerState;

/// Clear fixtures and predictions and zero the standings
pub async fn reset_season(State(state): State<Arc<ServerState>>) -> ApiResult<MessageResponse> {
    state.season.reset_season()?;
    Ok(Json(MessageResponse::new(
        "System reset successful. All matches, predictions, and league table data have been cleared.",
    )))
}
