//! Session routes.

use super::{
    AppState, Caller,
    extract::PathParams,
};
use crate::{
    core::session::{self, Session},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};

/// Session routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(current))
        .route("/session/farm/{farm_id}", put(switch_farm))
}

async fn current(State(state): State<AppState>, caller: Caller) -> Result<Json<Session>> {
    Ok(Json(session::load_session(&state.database, &caller.email).await?))
}

async fn switch_farm(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
) -> Result<Json<Session>> {
    Ok(Json(
        session::switch_active_farm(&state.database, &caller.email, &farm_id).await?,
    ))
}
