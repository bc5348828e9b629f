//! WeatherAPI-style weather provider.

use super::{FetchError, read_json};
use crate::core::weather::{Coordinates, CurrentWeather, ForecastDay, GeoLocation, dedupe_locations};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Base URL used when none is configured.
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weatherapi.com/v1";
/// Forecast length used when the caller does not ask for one.
pub const DEFAULT_FORECAST_DAYS: u32 = 7;
/// Longest forecast the provider serves.
pub const MAX_FORECAST_DAYS: u32 = 14;

/// Clamps a requested forecast length into `1..=14`, defaulting to 7.
#[must_use]
pub fn forecast_days(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_FORECAST_DAYS)
        .clamp(1, MAX_FORECAST_DAYS)
}

/// Client for the weather provider
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    #[serde(default)]
    last_updated: String,
    temp_c: f64,
    feelslike_c: f64,
    condition: ApiCondition,
    humidity: f64,
    #[serde(default)]
    wind_kph: f64,
    #[serde(default)]
    wind_degree: f64,
    #[serde(default)]
    pressure_mb: f64,
    #[serde(default)]
    vis_km: f64,
    #[serde(default)]
    uv: f64,
    #[serde(default)]
    precip_mm: f64,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    #[serde(default)]
    maxwind_kph: f64,
    #[serde(default)]
    totalprecip_mm: f64,
    #[serde(default)]
    avghumidity: f64,
    #[serde(default)]
    daily_chance_of_rain: f64,
    condition: ApiCondition,
}

#[derive(Debug, Default, Deserialize)]
struct ApiAstro {
    #[serde(default)]
    sunrise: String,
    #[serde(default)]
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: String,
    day: ApiDay,
    #[serde(default)]
    astro: ApiAstro,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: ApiLocation,
    current: ApiCurrent,
    forecast: ApiForecast,
}

#[derive(Debug, Deserialize)]
struct ApiSearchResult {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

fn forecast_days_from(days: Vec<ApiForecastDay>) -> Vec<ForecastDay> {
    days.into_iter()
        .enumerate()
        .map(|(index, d)| ForecastDay {
            date: d.date,
            high: d.day.maxtemp_c,
            low: d.day.mintemp_c,
            avg_temp: d.day.avgtemp_c,
            condition: d.day.condition.text,
            rain_chance: d.day.daily_chance_of_rain,
            rain_amount: d.day.totalprecip_mm,
            humidity: d.day.avghumidity,
            wind_speed: d.day.maxwind_kph,
            is_today: index == 0,
        })
        .collect()
}

fn current_from(response: ForecastResponse, coordinates: Coordinates) -> CurrentWeather {
    let ForecastResponse {
        location,
        current,
        forecast,
    } = response;
    let today = forecast.forecastday.into_iter().next();
    let (astro, rain_chance) = today.map_or_else(
        || (ApiAstro::default(), 0.0),
        |d| (d.astro, d.day.daily_chance_of_rain),
    );
    let place = [location.name, location.region, location.country]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    CurrentWeather {
        location: place,
        coordinates,
        temperature: current.temp_c,
        feels_like: current.feelslike_c,
        condition: current.condition.text,
        humidity: current.humidity,
        wind_speed: current.wind_kph,
        wind_direction: current.wind_degree,
        pressure: current.pressure_mb,
        visibility: current.vis_km,
        uv_index: current.uv,
        precip_mm: current.precip_mm,
        rain_chance,
        sunrise: astro.sunrise,
        sunset: astro.sunset,
        last_updated: current.last_updated,
    }
}

impl WeatherClient {
    /// Creates a client. Without an API key the provider is disabled.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: Option<String>, api_key: Option<String>) -> Self {
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get_forecast(&self, coordinates: Coordinates, days: u32) -> Result<ForecastResponse, FetchError> {
        let key = self.api_key.as_deref().ok_or(FetchError::Disabled)?;
        let q = format!("{},{}", coordinates.lat, coordinates.lon);
        let days = days.to_string();
        let response = self
            .http
            .get(format!("{}/forecast.json", self.base_url))
            .query(&[
                ("key", key),
                ("q", q.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await?;
        read_json(response).await
    }

    /// Current conditions, with today's sunrise, sunset and rain chance.
    #[instrument(skip(self))]
    pub async fn current(&self, coordinates: Coordinates) -> Result<CurrentWeather, FetchError> {
        let response = self.get_forecast(coordinates, 1).await?;
        Ok(current_from(response, coordinates))
    }

    /// Daily forecast. `days` is clamped into `1..=14`.
    #[instrument(skip(self))]
    pub async fn forecast(&self, coordinates: Coordinates, days: u32) -> Result<Vec<ForecastDay>, FetchError> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let response = self.get_forecast(coordinates, days).await?;
        let forecast = forecast_days_from(response.forecast.forecastday);
        debug!(days = forecast.len(), "Forecast fetched");
        Ok(forecast)
    }

    /// Place-name search. Repeated places are dropped.
    #[instrument(skip(self))]
    pub async fn geocode(&self, query: &str) -> Result<Vec<GeoLocation>, FetchError> {
        let key = self.api_key.as_deref().ok_or(FetchError::Disabled)?;
        let response = self
            .http
            .get(format!("{}/search.json", self.base_url))
            .query(&[("key", key), ("q", query)])
            .send()
            .await?;
        let results: Vec<ApiSearchResult> = read_json(response).await?;
        Ok(dedupe_locations(
            results
                .into_iter()
                .map(|r| GeoLocation {
                    name: r.name,
                    region: r.region,
                    country: r.country,
                    lat: r.lat,
                    lon: r.lon,
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    const FORECAST_JSON: &str = r#"{
        "location": {"name": "Durg", "region": "Chhattisgarh", "country": "India", "lat": 21.19, "lon": 81.28},
        "current": {
            "last_updated": "2025-01-10 14:15",
            "temp_c": 29.4, "feelslike_c": 30.1,
            "condition": {"text": "Partly cloudy"},
            "humidity": 48, "wind_kph": 11.2, "wind_degree": 240,
            "pressure_mb": 1012.0, "vis_km": 6.0, "uv": 7.0, "precip_mm": 0.0
        },
        "forecast": {"forecastday": [
            {"date": "2025-01-10",
             "day": {"maxtemp_c": 31.0, "mintemp_c": 16.2, "avgtemp_c": 23.5, "maxwind_kph": 14.0,
                     "totalprecip_mm": 0.4, "avghumidity": 52, "daily_chance_of_rain": 20,
                     "condition": {"text": "Sunny"}},
             "astro": {"sunrise": "06:45 AM", "sunset": "05:38 PM"}},
            {"date": "2025-01-11",
             "day": {"maxtemp_c": 30.0, "mintemp_c": 15.0, "avgtemp_c": 22.0,
                     "condition": {"text": "Mist"}}}
        ]}
    }"#;

    #[test]
    fn test_forecast_days_clamp() {
        assert_eq!(forecast_days(None), 7);
        assert_eq!(forecast_days(Some(0)), 1);
        assert_eq!(forecast_days(Some(30)), 14);
        assert_eq!(forecast_days(Some(3)), 3);
    }

    #[test]
    fn test_forecast_mapping_flags_first_day() {
        let response: ForecastResponse = serde_json::from_str(FORECAST_JSON).unwrap();
        let days = forecast_days_from(response.forecast.forecastday);
        assert_eq!(days.len(), 2);
        assert!(days[0].is_today);
        assert!(!days[1].is_today);
        assert_eq!(days[0].rain_chance, 20.0);
        assert_eq!(days[1].rain_amount, 0.0);
        assert_eq!(days[1].condition, "Mist");
    }

    #[test]
    fn test_current_mapping() {
        let response: ForecastResponse = serde_json::from_str(FORECAST_JSON).unwrap();
        let coordinates = Coordinates { lat: 21.19, lon: 81.28 };
        let current = current_from(response, coordinates);
        assert_eq!(current.location, "Durg, Chhattisgarh, India");
        assert_eq!(current.temperature, 29.4);
        assert_eq!(current.humidity, 48.0);
        assert_eq!(current.sunrise, "06:45 AM");
        assert_eq!(current.rain_chance, 20.0);
        assert_eq!(current.coordinates, coordinates);
    }

    #[tokio::test]
    async fn test_missing_key_disables_provider() {
        let client = WeatherClient::new(reqwest::Client::new(), None, None);
        assert!(!client.is_enabled());
        let result = client.geocode("Durg").await;
        assert!(matches!(result, Err(FetchError::Disabled)));
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = WeatherClient::new(
            reqwest::Client::new(),
            Some("http://localhost:9000/v1/".to_string()),
            Some("k".to_string()),
        );
        assert_eq!(client.base_url, "http://localhost:9000/v1");
    }
}
