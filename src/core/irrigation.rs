//! Irrigation advice from how the soil feels and how much rain is coming.
//!
//! Every recommendation served is logged to the `irrigation_logs` table.

use crate::{
    core::zones::round_to_cents,
    entities::irrigation_log,
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Moisture assumed when the soil feel is not one of the known phrases.
pub const DEFAULT_SOIL_MOISTURE: f64 = 0.45;

/// Maps a farmer's description of the soil to a moisture fraction.
#[must_use]
pub fn moisture_from_feel(soil_feel: &str) -> f64 {
    match soil_feel.trim().to_lowercase().as_str() {
        "dry and crumbly" => 0.2,
        "slightly damp" => 0.5,
        "wet and muddy" => 0.8,
        _ => DEFAULT_SOIL_MOISTURE,
    }
}

/// Water depth in mm needed to bring soil at `moisture` back up.
#[must_use]
pub fn base_water_mm(moisture: f64) -> f64 {
    if moisture < 0.3 {
        20.0
    } else if moisture < 0.5 {
        12.0
    } else if moisture < 0.7 {
        5.0
    } else {
        0.0
    }
}

/// Applies the forecast rain to a water depth, returning the new depth and the
/// reason shown to the farmer.
#[must_use]
pub fn adjust_for_rain(water_mm: f64, forecast_rain_mm: f64) -> (f64, String) {
    if forecast_rain_mm > 10.0 {
        (
            0.0,
            "Heavy rain expected (>10mm), skipping irrigation.".to_string(),
        )
    } else if forecast_rain_mm > 5.0 {
        (
            water_mm * 0.5,
            format!("Moderate rain expected ({forecast_rain_mm:.1}mm), reducing irrigation by 50%."),
        )
    } else {
        (water_mm, "No significant rain expected.".to_string())
    }
}

/// A recommendation request as sent by the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct IrrigationRequest {
    /// "Dry and Crumbly", "Slightly Damp", "Wet and Muddy" or free text
    pub soil_feel: String,
    /// Application rate of the irrigation system in mm per hour
    pub application_rate: f64,
    /// State used to locate the forecast
    #[serde(default)]
    pub state_name: String,
    /// District used to locate the forecast
    #[serde(default)]
    pub district_name: String,
    /// Farm the request is for, recorded in the log
    #[serde(default)]
    pub farm_id: Option<String>,
}

/// The recommendation itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrrigationAdvice {
    /// Whether to irrigate at all
    pub irrigate: bool,
    /// Moisture fraction derived from the soil feel
    pub moisture_level: f64,
    /// Water to apply in mm, two decimals
    pub water_mm: f64,
    /// Run time in hours, two decimals
    pub duration_hours: f64,
    /// Why the rain adjustment did what it did
    pub reason_weather: String,
    /// Forecast rain used, in mm
    pub forecast_rain_mm: f64,
    /// Application rate as requested
    pub application_rate_mm_per_h: f64,
    /// Soil feel as requested
    pub soil_feel: String,
}

/// Computes a recommendation.
///
/// Fails only if the application rate or the rain amount is not a finite number.
/// A rate of zero or below gives a duration of zero.
pub fn recommend(
    soil_feel: &str,
    application_rate_mm_per_h: f64,
    forecast_rain_mm: f64,
) -> Result<IrrigationAdvice> {
    if !application_rate_mm_per_h.is_finite() {
        return Err(Error::validation("Application rate must be a finite number"));
    }
    if !forecast_rain_mm.is_finite() {
        return Err(Error::validation("Forecast rain must be a finite number"));
    }

    let moisture = moisture_from_feel(soil_feel);
    let (water_mm, reason_weather) = adjust_for_rain(base_water_mm(moisture), forecast_rain_mm);
    let duration_hours = if application_rate_mm_per_h > 0.0 {
        water_mm / application_rate_mm_per_h
    } else {
        0.0
    };

    debug!(moisture, water_mm, duration_hours, "Irrigation computed");

    Ok(IrrigationAdvice {
        irrigate: water_mm > 0.0,
        moisture_level: moisture,
        water_mm: round_to_cents(water_mm),
        duration_hours: round_to_cents(duration_hours),
        reason_weather,
        forecast_rain_mm,
        application_rate_mm_per_h,
        soil_feel: soil_feel.to_string(),
    })
}

/// Writes a served recommendation to the log.
#[instrument(skip(db, advice))]
pub async fn record_advice(
    db: &DatabaseConnection,
    user_email: &str,
    farm_id: Option<String>,
    advice: &IrrigationAdvice,
) -> Result<irrigation_log::Model> {
    let entry = irrigation_log::ActiveModel {
        user_email: Set(user_email.to_string()),
        farm_id: Set(farm_id),
        soil_feel: Set(advice.soil_feel.clone()),
        application_rate_mm_per_h: Set(advice.application_rate_mm_per_h),
        forecast_rain_mm: Set(advice.forecast_rain_mm),
        irrigate: Set(advice.irrigate),
        water_mm: Set(advice.water_mm),
        duration_hours: Set(advice.duration_hours),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(id = entry.id, irrigate = entry.irrigate, "Irrigation advice logged");
    Ok(entry)
}
