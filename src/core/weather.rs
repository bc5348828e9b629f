//! Weather business logic.
//!
//! Provider-independent weather types, forecast analytics, the state/district
//! coordinate table, and the per-farm snapshot documents used when the provider
//! cannot be reached.

use crate::{
    entities::{WeatherSnapshot, weather_snapshot},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Coordinates {
    /// Validated coordinates: finite, latitude in `[-90, 90]`, longitude in
    /// `[-180, 180]`.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::validation(format!("Latitude out of range: {lat}")));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::validation(format!("Longitude out of range: {lon}")));
        }
        Ok(Self { lat, lon })
    }
}

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    /// "Name, Region, Country"
    pub location: String,
    /// Where the reading applies
    pub coordinates: Coordinates,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Feels-like temperature in degrees Celsius
    pub feels_like: f64,
    /// Condition text
    pub condition: String,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Wind direction in degrees
    pub wind_direction: f64,
    /// Pressure in millibar
    pub pressure: f64,
    /// Visibility in km
    pub visibility: f64,
    /// UV index
    pub uv_index: f64,
    /// Current precipitation in mm
    pub precip_mm: f64,
    /// Chance of rain today in percent
    pub rain_chance: f64,
    /// Local sunrise time
    pub sunrise: String,
    /// Local sunset time
    pub sunset: String,
    /// Provider timestamp of the reading
    pub last_updated: String,
}

impl CurrentWeather {
    /// Fixed reading served when neither the provider nor a stored snapshot is
    /// available.
    #[must_use]
    pub fn fallback(location: &str, coordinates: Coordinates) -> Self {
        Self {
            location: location.to_string(),
            coordinates,
            temperature: 25.0,
            feels_like: 25.0,
            condition: "Unknown".to_string(),
            humidity: 60.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            pressure: 0.0,
            visibility: 0.0,
            uv_index: 0.0,
            precip_mm: 0.0,
            rain_chance: 0.0,
            sunrise: String::new(),
            sunset: String::new(),
            last_updated: String::new(),
        }
    }

    /// Rebuilds a reading from a stored snapshot. Fields the snapshot does not
    /// carry take the fallback values.
    #[must_use]
    pub fn from_snapshot(
        snapshot: &weather_snapshot::Model,
        location: &str,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            temperature: snapshot.temperature_c,
            feels_like: snapshot.temperature_c,
            condition: snapshot.condition.clone(),
            humidity: snapshot.humidity,
            precip_mm: snapshot.precip_mm,
            last_updated: snapshot.captured_at.to_rfc3339(),
            ..Self::fallback(location, coordinates)
        }
    }
}

/// One day of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    /// Date, `YYYY-MM-DD`
    pub date: String,
    /// Maximum temperature in degrees Celsius
    pub high: f64,
    /// Minimum temperature in degrees Celsius
    pub low: f64,
    /// Average temperature in degrees Celsius
    pub avg_temp: f64,
    /// Condition text
    pub condition: String,
    /// Chance of rain in percent
    pub rain_chance: f64,
    /// Total precipitation in mm
    pub rain_amount: f64,
    /// Average humidity in percent
    pub humidity: f64,
    /// Maximum wind speed in km/h
    pub wind_speed: f64,
    /// Whether this is the first day of the forecast
    pub is_today: bool,
}

/// A location returned by a place-name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Place name
    pub name: String,
    /// Region or state
    pub region: String,
    /// Country
    pub country: String,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

/// Drops repeated `(name, region, country)` entries, keeping the first.
#[must_use]
pub fn dedupe_locations(locations: Vec<GeoLocation>) -> Vec<GeoLocation> {
    let mut seen = std::collections::HashSet::new();
    locations
        .into_iter()
        .filter(|l| seen.insert((l.name.clone(), l.region.clone(), l.country.clone())))
        .collect()
}

/// Aggregates over a forecast window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAnalytics {
    /// Mean of the daily average temperatures
    pub avg_temp: f64,
    /// Highest daily average temperature
    pub max_temp: f64,
    /// Lowest daily average temperature
    pub min_temp: f64,
    /// Sum of daily precipitation in mm
    pub total_rainfall: f64,
    /// Mean of the daily average humidity
    pub avg_humidity: f64,
    /// Mean of the daily maximum wind speed
    pub avg_wind_speed: f64,
    /// Days hotter than 40 C or colder than 5 C
    pub extreme_days: usize,
}

/// Summarizes a forecast. An empty forecast gives all zeros.
#[must_use]
pub fn analyze_forecast(days: &[ForecastDay]) -> WeatherAnalytics {
    if days.is_empty() {
        return WeatherAnalytics::default();
    }
    // Cast safety: forecasts are at most 14 days.
    #[allow(clippy::cast_precision_loss)]
    let count = days.len() as f64;
    let mean = |f: fn(&ForecastDay) -> f64| days.iter().map(f).sum::<f64>() / count;

    WeatherAnalytics {
        avg_temp: mean(|d| d.avg_temp),
        max_temp: days.iter().map(|d| d.avg_temp).fold(f64::MIN, f64::max),
        min_temp: days.iter().map(|d| d.avg_temp).fold(f64::MAX, f64::min),
        total_rainfall: days.iter().map(|d| d.rain_amount).sum(),
        avg_humidity: mean(|d| d.humidity),
        avg_wind_speed: mean(|d| d.wind_speed),
        extreme_days: days.iter().filter(|d| d.high > 40.0 || d.low < 5.0).count(),
    }
}

// (state, district) -> (lat, lon), lowercase keys
const DISTRICT_COORDINATES: &[(&str, &str, f64, f64)] = &[
    ("chhattisgarh", "durg", 21.1939, 81.2740),
    ("chhattisgarh", "raipur", 21.2514, 81.6296),
    ("chhattisgarh", "bilaspur", 22.0796, 82.1590),
    ("chhattisgarh", "rajnandgaon", 22.5596, 81.3089),
    ("maharashtra", "pune", 18.5204, 73.8567),
    ("maharashtra", "mumbai", 19.0760, 72.8777),
    ("maharashtra", "nagpur", 21.1458, 79.0882),
    ("maharashtra", "aurangabad", 19.8762, 75.3433),
    ("maharashtra", "nashik", 19.9975, 73.7898),
    ("maharashtra", "kolhapur", 16.7050, 74.2433),
    ("delhi", "delhi", 28.7041, 77.1025),
    ("karnataka", "bangalore", 12.9716, 77.5946),
    ("karnataka", "bengaluru", 12.9716, 77.5946),
    ("karnataka", "belagavi", 15.8497, 74.4977),
    ("karnataka", "belgaum", 15.8497, 74.4977),
    ("karnataka", "ballari", 15.1400, 76.6200),
    ("karnataka", "bellary", 15.1400, 76.6200),
    ("karnataka", "dharwad", 15.4589, 75.1342),
    ("karnataka", "dharwar", 15.4589, 75.1342),
    ("karnataka", "hubballi", 15.3647, 75.1240),
    ("karnataka", "hubli", 15.3647, 75.1240),
    ("karnataka", "gulbarga", 17.3265, 76.4304),
    ("karnataka", "kalaburagi", 17.3265, 76.4304),
    ("karnataka", "tumkur", 13.2173, 77.1145),
    ("karnataka", "tumkuru", 13.2173, 77.1145),
    ("karnataka", "mysore", 12.2958, 76.6394),
    ("karnataka", "mysuru", 12.2958, 76.6394),
    ("karnataka", "mandya", 12.5353, 76.8970),
    ("karnataka", "hassan", 13.3352, 75.9103),
    ("karnataka", "chikmagalur", 13.3181, 75.7708),
    ("karnataka", "kodagu", 12.3381, 75.7273),
    ("karnataka", "coorg", 12.3381, 75.7273),
    ("karnataka", "udupi", 13.3408, 74.7421),
    ("karnataka", "dakshina kannada", 12.6689, 75.3692),
    ("karnataka", "mangalore", 12.8658, 74.8440),
    ("karnataka", "mangaluru", 12.8658, 74.8440),
    ("karnataka", "uttara kannada", 14.4505, 74.6660),
    ("karnataka", "chitradurga", 14.2267, 75.6760),
    ("karnataka", "chikballapur", 13.4359, 77.7297),
    ("karnataka", "kolar", 13.1359, 78.1304),
    ("karnataka", "ramanagara", 12.7667, 77.2833),
    ("karnataka", "davangere", 14.4667, 75.9167),
    ("karnataka", "davanagere", 14.4667, 75.9167),
    ("karnataka", "shimoga", 13.9299, 75.5681),
    ("karnataka", "shivamogga", 13.9299, 75.5681),
    ("karnataka", "vikarabad", 16.9891, 77.1331),
    ("karnataka", "yadgir", 16.7669, 77.1391),
    ("karnataka", "bagalkot", 16.1703, 75.6667),
    ("karnataka", "bijapur", 16.8302, 75.7053),
    ("karnataka", "vijayapura", 16.8302, 75.7053),
    ("tamil nadu", "chennai", 13.0827, 80.2707),
    ("tamil nadu", "coimbatore", 11.0168, 76.9558),
    ("tamil nadu", "madurai", 9.9252, 78.1198),
    ("tamil nadu", "salem", 11.6643, 78.1460),
    ("tamil nadu", "tiruppur", 11.3889, 77.3411),
    ("tamil nadu", "erode", 11.3919, 77.7172),
    ("tamil nadu", "trichy", 10.7905, 78.7047),
    ("tamil nadu", "thanjavur", 10.7870, 79.1378),
    ("telangana", "hyderabad", 17.3850, 78.4867),
    ("telangana", "warangal", 17.9689, 79.5941),
    ("telangana", "nizamabad", 19.2705, 78.0945),
    ("andhra pradesh", "visakhapatnam", 17.6868, 83.2185),
    ("andhra pradesh", "vijayawada", 16.5062, 80.6480),
    ("andhra pradesh", "tirupati", 13.1939, 79.8941),
    ("uttar pradesh", "lucknow", 26.8467, 80.9462),
    ("uttar pradesh", "kanpur", 26.4499, 80.3319),
    ("uttar pradesh", "varanasi", 25.3176, 82.9739),
    ("uttar pradesh", "agra", 27.1767, 78.0081),
    ("west bengal", "kolkata", 22.5726, 88.3639),
    ("west bengal", "darjeeling", 27.0410, 88.2663),
    ("west bengal", "siliguri", 26.7271, 88.3953),
    ("gujarat", "surat", 21.1702, 72.8311),
    ("gujarat", "ahmedabad", 23.0225, 72.5714),
    ("gujarat", "vadodara", 22.3072, 73.1812),
    ("gujarat", "rajkot", 22.3039, 70.8022),
    ("rajasthan", "jaipur", 26.9124, 75.7873),
    ("rajasthan", "jodhpur", 26.2389, 73.0243),
    ("rajasthan", "ajmer", 26.4499, 74.6399),
    ("rajasthan", "udaipur", 24.5854, 73.7125),
    ("madhya pradesh", "bhopal", 23.2599, 77.4126),
    ("madhya pradesh", "indore", 22.7196, 75.8577),
    ("madhya pradesh", "gwalior", 26.2389, 78.1770),
    ("madhya pradesh", "jabalpur", 23.1815, 79.9864),
    ("bihar", "patna", 25.5941, 85.1376),
    ("bihar", "gaya", 24.7955, 84.9994),
    ("bihar", "bhagalpur", 25.2820, 86.4728),
    ("haryana", "gurugram", 28.4595, 77.0266),
    ("haryana", "faridabad", 28.4089, 77.3178),
    ("haryana", "hisar", 29.1461, 75.7337),
    ("punjab", "ludhiana", 30.9009, 75.8573),
    ("punjab", "amritsar", 31.6340, 74.8723),
    ("punjab", "jalandhar", 31.7260, 75.5762),
    ("punjab", "chandigarh", 30.7333, 76.7794),
    ("odisha", "bhubaneswar", 20.2961, 85.8245),
    ("odisha", "cuttack", 20.4625, 85.8830),
    ("odisha", "rourkela", 22.2271, 84.8537),
    ("assam", "guwahati", 26.1863, 91.7668),
    ("assam", "dibrugarh", 27.4728, 94.9119),
    ("uttaranchal", "dehradun", 30.3165, 78.0322),
    ("uttarakhand", "dehradun", 30.3165, 78.0322),
    ("uttaranchal", "nainital", 29.3804, 79.4608),
    ("uttarakhand", "nainital", 29.3804, 79.4608),
    ("himachal pradesh", "shimla", 31.1048, 77.1734),
    ("himachal pradesh", "manali", 32.2541, 77.1882),
    ("himachal pradesh", "mandi", 31.5885, 76.9386),
    ("meghalaya", "shillong", 25.5687, 91.8832),
    ("tripura", "agartala", 23.8317, 91.2868),
    ("mizoram", "aizawl", 23.7148, 92.7299),
    ("nagaland", "kohima", 25.6782, 94.1115),
    ("arunachal pradesh", "itanagar", 27.1767, 93.6926),
    ("sikkim", "gangtok", 27.7022, 88.5630),
    ("kerala", "thiruvananthapuram", 8.5241, 76.9366),
    ("kerala", "kochi", 9.9312, 76.2673),
    ("kerala", "kozhikode", 11.2588, 75.7804),
    ("goa", "panaji", 15.2993, 74.1240),
    ("goa", "margao", 15.2833, 73.9500),
    ("puducherry", "pondicherry", 11.9416, 79.8084),
    ("jammu and kashmir", "srinagar", 34.0837, 74.8070),
    ("jammu and kashmir", "jammu", 32.7266, 75.8472),
    ("ladakh", "leh", 34.1526, 77.5794),
    ("ladakh", "kargil", 34.5543, 76.1119),
    ("andaman and nicobar islands", "port blair", 11.7401, 92.7673),
];

/// Looks up a district's coordinates. Matching ignores case and surrounding
/// whitespace.
#[must_use]
pub fn lookup_coordinates(state: &str, district: &str) -> Option<Coordinates> {
    let state = state.trim().to_lowercase();
    let district = district.trim().to_lowercase();
    DISTRICT_COORDINATES
        .iter()
        .find(|(s, d, _, _)| *s == state && *d == district)
        .map(|&(_, _, lat, lon)| Coordinates { lat, lon })
}

/// Looks up a district's coordinates, returning `default` for unknown districts.
#[must_use]
pub fn resolve_coordinates(state: &str, district: &str, default: Coordinates) -> Coordinates {
    lookup_coordinates(state, district).unwrap_or_else(|| {
        debug!(state, district, "Unknown district, using default coordinates");
        default
    })
}

/// Stores a successful reading for a farm, replacing the previous one.
pub async fn record_snapshot(
    db: &DatabaseConnection,
    farm_key: &str,
    weather: &CurrentWeather,
) -> Result<()> {
    let snapshot = weather_snapshot::ActiveModel {
        farm_key: Set(farm_key.to_string()),
        temperature_c: Set(weather.temperature),
        humidity: Set(weather.humidity),
        precip_mm: Set(weather.precip_mm),
        condition: Set(weather.condition.clone()),
        captured_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    WeatherSnapshot::insert(snapshot)
        .on_conflict(
            OnConflict::column(weather_snapshot::Column::FarmKey)
                .update_columns([
                    weather_snapshot::Column::TemperatureC,
                    weather_snapshot::Column::Humidity,
                    weather_snapshot::Column::PrecipMm,
                    weather_snapshot::Column::Condition,
                    weather_snapshot::Column::CapturedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Newest stored reading for a farm.
pub async fn latest_snapshot(
    db: &DatabaseConnection,
    farm_key: &str,
) -> Result<Option<weather_snapshot::Model>> {
    WeatherSnapshot::find()
        .filter(weather_snapshot::Column::FarmKey.eq(farm_key))
        .order_by_desc(weather_snapshot::Column::CapturedAt)
        .order_by_desc(weather_snapshot::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}
