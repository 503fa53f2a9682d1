//! Team endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use league_core::{Competitor, CompetitorId};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::ServerState;

pub async fn list_teams(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<Competitor>> {
    Ok(Json(state.season.competitors()?))
}

pub async fn get_team(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<CompetitorId>,
) -> ApiResult<Competitor> {
    Ok(Json(state.season.competitor(id)?))
}
