//! Zone plans, zone locks and the financial roll-up of a farm.

use super::{
    AppState, Caller,
    extract::{JsonBody, PathParams, QueryParams},
};
use crate::{
    clients::zoning::{ZonePlan, plan_zones},
    core::{
        farm,
        finance::{self, FinancialSummary},
        locks::{LockRequest, ZoneLock, ZoneLockStore},
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get},
};
use serde::Deserialize;

/// Zone, lock and financial routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/farms/{farm_id}/zones", get(zones))
        .route("/farms/{farm_id}/locks", get(list_locks).put(lock_zone))
        .route("/farms/{farm_id}/locks/{zone_id}", delete(unlock_zone))
        .route("/farms/{farm_id}/financials", get(financials))
}

/// Query of `GET /farms/{farm_id}/zones`
#[derive(Debug, Deserialize)]
pub struct ZoneQuery {
    /// Moisture reading in percent, overriding the farm's stored average
    pub moisture: Option<f64>,
}

/// GET /farms/{farm_id}/zones
async fn zones(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
    QueryParams(query): QueryParams<ZoneQuery>,
) -> Result<Json<ZonePlan>> {
    let farm = farm::get_farm(&state.database, &caller.email, &farm_id).await?;
    let mut input = farm::zone_input(&farm);
    if let Some(percent) = query.moisture {
        if !percent.is_finite() {
            return Err(Error::validation("Moisture must be a number"));
        }
        input.moisture = Some(percent / 100.0);
    }
    let plan = plan_zones(&state.clients.zoning, farm.latitude, farm.longitude, &input).await;
    Ok(Json(plan))
}

/// GET /farms/{farm_id}/locks
async fn list_locks(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
) -> Result<Json<Vec<ZoneLock>>> {
    let farm = farm::get_farm(&state.database, &caller.email, &farm_id).await?;
    let store = ZoneLockStore::for_farm(state.locks.as_ref(), &farm.id);
    Ok(Json(store.list().await))
}

/// PUT /farms/{farm_id}/locks
async fn lock_zone(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
    JsonBody(request): JsonBody<LockRequest>,
) -> Result<Json<Vec<ZoneLock>>> {
    let farm = farm::get_farm(&state.database, &caller.email, &farm_id).await?;
    let store = ZoneLockStore::for_farm(state.locks.as_ref(), &farm.id);
    let locks = store.add_or_replace(request.into_lock(&state.config)).await?;
    Ok(Json(locks))
}

/// DELETE /farms/{farm_id}/locks/{zone_id}
async fn unlock_zone(
    State(state): State<AppState>,
    caller: Caller,
    PathParams((farm_id, zone_id)): PathParams<(String, String)>,
) -> Result<Json<Vec<ZoneLock>>> {
    let farm = farm::get_farm(&state.database, &caller.email, &farm_id).await?;
    let store = ZoneLockStore::for_farm(state.locks.as_ref(), &farm.id);
    Ok(Json(store.remove(&zone_id).await?))
}

/// GET /farms/{farm_id}/financials
async fn financials(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
) -> Result<Json<FinancialSummary>> {
    let farm = farm::get_farm(&state.database, &caller.email, &farm_id).await?;
    let locks = ZoneLockStore::for_farm(state.locks.as_ref(), &farm.id)
        .list()
        .await;
    Ok(Json(finance::summarize(&locks)))
}
