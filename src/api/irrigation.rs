//! Irrigation advice route.

use super::{
    AppState, Caller,
    extract::JsonBody,
};
use crate::{
    clients::{Source, Sourced},
    core::{
        farm,
        irrigation::{self, IrrigationAdvice, IrrigationRequest},
        weather::{Coordinates, resolve_coordinates},
    },
    errors::Result,
};
use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;

/// Irrigation routes
pub fn router() -> Router<AppState> {
    Router::new().route("/irrigation/recommend", post(recommend))
}

/// Response of `POST /irrigation/recommend`
#[derive(Debug, Serialize)]
pub struct IrrigationResponse {
    /// The advice
    #[serde(flatten)]
    pub advice: IrrigationAdvice,
    /// Where the forecast was looked up
    pub coordinates: Coordinates,
    /// Whether the rain figure came from the provider
    pub weather_source: Source,
}

/// Recommends irrigation for a farm (when `farm_id` is given) or for a
/// state/district, using today's forecast rain. The advice is logged.
async fn recommend(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(request): JsonBody<IrrigationRequest>,
) -> Result<Json<IrrigationResponse>> {
    let coordinates = match request.farm_id.as_deref() {
        Some(farm_id) => {
            let farm = farm::get_farm(&state.database, &caller.email, farm_id).await?;
            Coordinates {
                lat: farm.latitude,
                lon: farm.longitude,
            }
        }
        None => {
            let default = &state.config.default_location;
            resolve_coordinates(
                &request.state_name,
                &request.district_name,
                Coordinates {
                    lat: default.latitude,
                    lon: default.longitude,
                },
            )
        }
    };

    let forecast = state.clients.weather.forecast(coordinates, 1).await;
    let rain = Sourced::resolve(forecast, "irrigation forecast", Vec::new)
        .map(|days| days.first().map_or(0.0, |d| d.rain_amount));

    let advice = irrigation::recommend(&request.soil_feel, request.application_rate, rain.data)?;
    irrigation::record_advice(&state.database, &caller.email, request.farm_id, &advice).await?;

    Ok(Json(IrrigationResponse {
        advice,
        coordinates,
        weather_source: rain.source,
    }))
}
