//! Farm document routes.

use super::{
    AppState, Caller,
    extract::{JsonBody, PathParams},
};
use crate::{
    core::{
        farm::{self, FarmInput, FarmUpdate},
        user,
    },
    entities::farm as farm_entity,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

/// Farm routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/farms", get(list).post(create))
        .route(
            "/farms/{farm_id}",
            get(get_by_id).put(update).delete(delete),
        )
}

/// GET /farms
async fn list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<farm_entity::Model>>> {
    user::get_user(&state.database, &caller.email).await?;
    Ok(Json(farm::list_farms(&state.database, &caller.email).await?))
}

/// POST /farms
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(input): JsonBody<FarmInput>,
) -> Result<(StatusCode, Json<farm_entity::Model>)> {
    let farm = farm::create_farm(&state.database, &caller.email, input).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

/// GET /farms/{farm_id}
async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
) -> Result<Json<farm_entity::Model>> {
    Ok(Json(
        farm::get_farm(&state.database, &caller.email, &farm_id).await?,
    ))
}

/// PUT /farms/{farm_id}
async fn update(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
    JsonBody(update): JsonBody<FarmUpdate>,
) -> Result<Json<farm_entity::Model>> {
    Ok(Json(
        farm::update_farm(&state.database, &caller.email, &farm_id, update).await?,
    ))
}

/// DELETE /farms/{farm_id}
async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
) -> Result<StatusCode> {
    farm::delete_farm(&state.database, &caller.email, &farm_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
