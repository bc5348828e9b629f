//! Application settings loaded from config.toml
//!
//! The file is optional. Every section has built-in defaults, so a fresh checkout
//! runs with the zone and insight services disabled, the public weather provider,
//! and a small crop economics table used to price zone locks.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Endpoints of external collaborators
    pub services: ServicesConfig,
    /// Coordinates used when a location cannot be resolved
    pub default_location: DefaultLocation,
    /// Per-acre cost used when a crop has no entry in `crops`
    pub default_cost_per_acre: f64,
    /// Per-acre revenue used when a crop has no entry in `crops`
    pub default_revenue_per_acre: f64,
    /// Assumed economics per crop, used to price zone locks
    pub crops: Vec<CropEconomics>,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind_address: String,
}

/// Endpoints of external collaborators. A missing URL disables that service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Remote zone division service
    pub zone_service_url: Option<String>,
    /// Generative insight service
    pub insight_service_url: Option<String>,
    /// Weather provider base URL
    pub weather_base_url: Option<String>,
}

/// Coordinates used when a location cannot be resolved
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultLocation {
    /// Display name of the fallback location
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Assumed economics for a single crop
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CropEconomics {
    /// Crop name, matched case-insensitively
    pub name: String,
    /// Estimated input cost per acre
    pub cost_per_acre: f64,
    /// Expected revenue per acre
    pub revenue_per_acre: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Default for DefaultLocation {
    fn default() -> Self {
        Self {
            name: "India".to_string(),
            latitude: 20.0,
            longitude: 78.0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let crop = |name: &str, cost_per_acre: f64, revenue_per_acre: f64| CropEconomics {
            name: name.to_string(),
            cost_per_acre,
            revenue_per_acre,
        };
        Self {
            server: ServerConfig::default(),
            services: ServicesConfig::default(),
            default_location: DefaultLocation::default(),
            default_cost_per_acre: 20_000.0,
            default_revenue_per_acre: 40_000.0,
            crops: vec![
                crop("Wheat", 18_000.0, 42_000.0),
                crop("Rice", 25_000.0, 55_000.0),
                crop("Cotton", 30_000.0, 60_000.0),
                crop("Maize", 15_000.0, 35_000.0),
                crop("Sugarcane", 45_000.0, 95_000.0),
            ],
        }
    }
}

impl AppConfig {
    /// Returns `(cost_per_acre, revenue_per_acre)` for a crop, falling back to the
    /// configured defaults when the crop is not listed.
    #[must_use]
    pub fn economics_for(&self, crop: &str) -> (f64, f64) {
        self.crops
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(crop.trim()))
            .map_or(
                (self.default_cost_per_acre, self.default_revenue_per_acre),
                |c| (c.cost_per_acre, c.revenue_per_acre),
            )
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `FARM_BUDDY_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: built-in defaults are used instead.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("FARM_BUDDY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No configuration file at {path}, using defaults.");
        return Ok(AppConfig::default());
    }
    load_config(path)
}
