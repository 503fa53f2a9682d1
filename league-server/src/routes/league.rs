//! League table endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use league_core::{parse_week, StandingsRow};
use std::sync::Arc;

use super::MessageResponse;
use crate::error::ApiResult;
use crate::state::ServerState;

/// Current table in league order
pub async fn current_table(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<StandingsRow>> {
    Ok(Json(state.season.table()?))
}

/// Table as it stood at the end of `week`
pub async fn table_at_week(
    State(state): State<Arc<ServerState>>,
    Path(week): Path<String>,
) -> ApiResult<Vec<StandingsRow>> {
    let week = parse_week(&week)?;
    Ok(Json(state.season.table_at_week(week)?))
}

/// Zero the standings, keeping fixtures
pub async fn reset_table(State(state): State<Arc<ServerState>>) -> ApiResult<MessageResponse> {
    state.season.reset_standings()?;
    Ok(Json(MessageResponse::new("League table reset successfully")))
}
