//! Weather proxy, forecast analytics and generative insights.
//!
//! Every response is a [`Sourced`] value so the dashboard can tell live data from
//! a fallback.

use super::{
    AppState, Caller,
    extract::{PathParams, QueryParams},
};
use crate::{
    clients::{FetchError, Sourced, insights::Insights, weather::forecast_days},
    core::{
        farm,
        weather::{
            self, Coordinates, CurrentWeather, ForecastDay, GeoLocation, WeatherAnalytics,
            analyze_forecast,
        },
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;
use tracing::warn;

/// Weather routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/farms/{farm_id}/weather", get(farm_weather))
        .route("/farms/{farm_id}/insights", get(farm_insights))
        .route("/weather/geocode", get(geocode))
        .route("/weather/forecast", get(forecast))
        .route("/weather/analytics", get(analytics))
}

/// Query of `GET /weather/geocode`
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    /// Place name to search for
    #[serde(default)]
    pub q: String,
}

/// Query of the forecast and analytics routes
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Days ahead, clamped into `1..=14`
    pub days: Option<u32>,
}

/// Query of `GET /farms/{farm_id}/insights`
#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    /// Days ahead, clamped into `1..=14`
    pub days: Option<u32>,
}

/// Current weather of a farm.
///
/// A live reading is stored as a snapshot. When the provider fails, the newest
/// snapshot is served instead, and failing that a fixed default reading.
async fn farm_weather(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
) -> Result<Json<Sourced<CurrentWeather>>> {
    let farm = farm::get_farm(&state.database, &caller.email, &farm_id).await?;
    let coordinates = Coordinates {
        lat: farm.latitude,
        lon: farm.longitude,
    };

    let sourced = match state.clients.weather.current(coordinates).await {
        Ok(current) => {
            if let Err(e) = weather::record_snapshot(&state.database, &farm.id, &current).await {
                warn!(farm_id = %farm.farm_id, error = %e, "Failed to store weather snapshot");
            }
            Sourced::remote(current)
        }
        Err(e) => {
            if !matches!(e, FetchError::Disabled) {
                warn!(farm_id = %farm.farm_id, error = %e, "Weather provider failed");
            }
            let fallback = match weather::latest_snapshot(&state.database, &farm.id).await? {
                Some(snapshot) => CurrentWeather::from_snapshot(&snapshot, &farm.location, coordinates),
                None => CurrentWeather::fallback(&farm.location, coordinates),
            };
            Sourced::fallback(fallback, &e)
        }
    };
    Ok(Json(sourced))
}

/// Generative insights for a farm's location.
async fn farm_insights(
    State(state): State<AppState>,
    caller: Caller,
    PathParams(farm_id): PathParams<String>,
    QueryParams(query): QueryParams<DaysQuery>,
) -> Result<Json<Sourced<Insights>>> {
    let farm = farm::get_farm(&state.database, &caller.email, &farm_id).await?;
    let insights = state
        .clients
        .insights
        .insights_or_placeholder(farm.latitude, farm.longitude, forecast_days(query.days))
        .await;
    Ok(Json(insights))
}

/// Place-name search. Falls back to the configured default location.
async fn geocode(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<GeocodeQuery>,
) -> Result<Json<Sourced<Vec<GeoLocation>>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(Error::validation("Search text cannot be empty"));
    }
    let result = state.clients.weather.geocode(q).await;
    let default = &state.config.default_location;
    Ok(Json(Sourced::resolve(result, "geocode", || {
        vec![GeoLocation {
            name: default.name.clone(),
            region: String::new(),
            country: default.name.clone(),
            lat: default.latitude,
            lon: default.longitude,
        }]
    })))
}

async fn fetch_forecast(state: &AppState, query: &ForecastQuery) -> Result<Sourced<Vec<ForecastDay>>> {
    let coordinates = Coordinates::new(query.lat, query.lon)?;
    let result = state
        .clients
        .weather
        .forecast(coordinates, forecast_days(query.days))
        .await;
    Ok(Sourced::resolve(result, "forecast", Vec::new))
}

/// Daily forecast. Falls back to an empty list.
async fn forecast(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ForecastQuery>,
) -> Result<Json<Sourced<Vec<ForecastDay>>>> {
    Ok(Json(fetch_forecast(&state, &query).await?))
}

/// Forecast aggregates. A failed forecast gives all zeros.
async fn analytics(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ForecastQuery>,
) -> Result<Json<Sourced<WeatherAnalytics>>> {
    let forecast = fetch_forecast(&state, &query).await?;
    Ok(Json(forecast.map(|days| analyze_forecast(&days))))
}
