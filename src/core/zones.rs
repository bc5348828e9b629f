//! Zone generation business logic.
//!
//! Splits a farm into a small fixed number of equal zones and attaches a naive
//! suitability score and a crop suggestion to each. This is the local fallback used
//! whenever the remote zone service is disabled or fails, so it never fails itself:
//! missing inputs are defaulted and out-of-range inputs are clamped.

use serde::{Deserialize, Serialize};

/// Area assumed when the farm has none recorded, in acres.
pub const DEFAULT_AREA_ACRES: f64 = 5.0;
/// Soil type assumed when the farm has none recorded.
pub const DEFAULT_SOIL_TYPE: &str = "loamy";
/// Moisture assumed when the farm has none recorded, as a fraction.
pub const DEFAULT_MOISTURE: f64 = 0.5;

/// Inputs to the zone generator. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneInput {
    /// Farm area in acres
    pub area_acres: Option<f64>,
    /// Free-text soil type name
    pub soil_type: Option<String>,
    /// Average moisture as a fraction in `[0, 1]`
    pub moisture: Option<f64>,
}

impl ZoneInput {
    /// Builds generator input from a stored moisture percentage (0-100).
    #[must_use]
    pub fn from_percent(
        area_acres: Option<f64>,
        soil_type: Option<String>,
        moisture_percent: Option<f64>,
    ) -> Self {
        Self {
            area_acres,
            soil_type,
            moisture: moisture_percent.map(|p| p / 100.0),
        }
    }

    /// Area with the default applied and negatives clamped to zero.
    #[must_use]
    pub fn resolved_area(&self) -> f64 {
        match self.area_acres {
            Some(area) if area.is_finite() => area.max(0.0),
            _ => DEFAULT_AREA_ACRES,
        }
    }

    /// Soil type with the default applied.
    #[must_use]
    pub fn resolved_soil_type(&self) -> String {
        self.soil_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOIL_TYPE)
            .to_string()
    }

    /// Moisture fraction with the default applied, clamped into `[0, 1]`.
    #[must_use]
    pub fn resolved_moisture(&self) -> f64 {
        match self.moisture {
            Some(m) if m.is_finite() => m.clamp(0.0, 1.0),
            _ => DEFAULT_MOISTURE,
        }
    }
}

/// A generated zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Ordinal id, `zone_1`, `zone_2`, ...
    pub id: String,
    /// Zone area in acres, rounded to 2 decimals
    pub area: f64,
    /// Heuristic suitability score, 0-100
    pub suitability: u8,
    /// Suggested crop
    pub crop: String,
    /// Soil type the zone was generated with
    pub soil_type: String,
    /// Moisture in whole percent
    pub moisture_percent: u8,
}

/// Rounds half-up, the way the dashboard always has (`floor(x + 0.5)`).
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to 2 decimal places.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Number of zones for a farm of the given area.
#[must_use]
pub fn zone_count_for_area(area_acres: f64) -> usize {
    if area_acres <= 5.0 {
        2
    } else if area_acres <= 10.0 {
        3
    } else {
        5
    }
}

/// Suitability score for a moisture fraction:
/// `clamp(0, 100, round(70 + (m - 0.5) * 40))`.
#[must_use]
pub fn suitability_for_moisture(moisture: f64) -> u8 {
    let score = round_half_up((moisture - 0.5).mul_add(40.0, 70.0)).clamp(0.0, 100.0);
    // Cast safety: score is clamped to [0, 100].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = score as u8;
    score
}

/// Crop suggestion: any loam wins, then wet ground gets rice, everything else cotton.
#[must_use]
pub fn suggest_crop(soil_type: &str, moisture: f64) -> &'static str {
    if soil_type.to_lowercase().contains("loam") {
        "Wheat"
    } else if moisture > 0.6 {
        "Rice"
    } else {
        "Cotton"
    }
}

/// Generates the zones for a farm.
///
/// All zones share the same area, score and crop; only the ordinal id differs.
#[must_use]
pub fn generate_zones(input: &ZoneInput) -> Vec<Zone> {
    let area = input.resolved_area();
    let soil_type = input.resolved_soil_type();
    let moisture = input.resolved_moisture();

    let count = zone_count_for_area(area);
    // Cast safety: count is at most 5.
    #[allow(clippy::cast_precision_loss)]
    let zone_area = round_to_cents(area / count as f64);
    let suitability = suitability_for_moisture(moisture);
    let crop = suggest_crop(&soil_type, moisture);
    // Cast safety: moisture is clamped to [0, 1].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let moisture_percent = round_half_up(moisture * 100.0) as u8;

    tracing::debug!(area, count, suitability, crop, "Generated heuristic zones");

    (1..=count)
        .map(|ordinal| Zone {
            id: format!("zone_{ordinal}"),
            area: zone_area,
            suitability,
            crop: crop.to_string(),
            soil_type: soil_type.clone(),
            moisture_percent,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn input(area: f64, soil: &str, moisture: f64) -> ZoneInput {
        ZoneInput {
            area_acres: Some(area),
            soil_type: Some(soil.to_string()),
            moisture: Some(moisture),
        }
    }

    #[test]
    fn test_zone_count_tiers() {
        assert_eq!(zone_count_for_area(0.5), 2);
        assert_eq!(zone_count_for_area(5.0), 2);
        assert_eq!(zone_count_for_area(5.01), 3);
        assert_eq!(zone_count_for_area(10.0), 3);
        assert_eq!(zone_count_for_area(10.5), 5);
        assert_eq!(zone_count_for_area(250.0), 5);
    }

    #[test]
    fn test_generated_zone_counts_follow_tiers() {
        assert_eq!(generate_zones(&input(4.0, "Sandy", 0.5)).len(), 2);
        assert_eq!(generate_zones(&input(7.5, "Sandy", 0.5)).len(), 3);
        assert_eq!(generate_zones(&input(42.0, "Sandy", 0.5)).len(), 5);
    }

    #[test]
    fn test_zone_areas_sum_within_rounding_tolerance() {
        for area in [1.0, 3.33, 7.0, 10.0, 11.11, 99.99, 123.456] {
            let zones = generate_zones(&input(area, "Clay", 0.4));
            let total: f64 = zones.iter().map(|z| z.area).sum();
            #[allow(clippy::cast_precision_loss)]
            let tolerance = zones.len() as f64 * 0.01;
            assert!(
                (total - area).abs() <= tolerance + 1e-9,
                "area {area}: zones sum to {total}"
            );
        }
    }

    #[test]
    fn test_zone_area_is_rounded_to_two_decimals() {
        let zones = generate_zones(&input(10.0, "Clay", 0.4));
        assert!(zones.iter().all(|z| z.area == 3.33));
    }

    #[test]
    fn test_suitability_formula() {
        assert_eq!(suitability_for_moisture(0.5), 70);
        assert_eq!(suitability_for_moisture(1.0), 90);
        assert_eq!(suitability_for_moisture(0.0), 50);
        assert_eq!(suitability_for_moisture(0.76), 80);
        assert_eq!(suitability_for_moisture(0.25), 60);
    }

    #[test]
    fn test_every_zone_gets_the_same_score_and_crop() {
        let zones = generate_zones(&input(50.0, "Sandy", 0.7));
        assert!(zones.iter().all(|z| z.suitability == 78));
        assert!(zones.iter().all(|z| z.crop == "Rice"));
    }

    #[test]
    fn test_crop_suggestions() {
        assert_eq!(suggest_crop("Loamy Clay", 0.3), "Wheat");
        assert_eq!(suggest_crop("LOAM", 0.9), "Wheat");
        assert_eq!(suggest_crop("Sandy", 0.7), "Rice");
        assert_eq!(suggest_crop("Sandy", 0.3), "Cotton");
        assert_eq!(suggest_crop("Sandy", 0.6), "Cotton");
    }

    #[test]
    fn test_zone_ids_are_ordinal_from_one() {
        let ids: Vec<String> = generate_zones(&input(8.0, "Red", 0.5))
            .into_iter()
            .map(|z| z.id)
            .collect();
        assert_eq!(ids, vec!["zone_1", "zone_2", "zone_3"]);
    }

    #[test]
    fn test_missing_inputs_use_defaults() {
        let zones = generate_zones(&ZoneInput::default());
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].area, 2.5);
        assert_eq!(zones[0].soil_type, "loamy");
        assert_eq!(zones[0].crop, "Wheat");
        assert_eq!(zones[0].suitability, 70);
        assert_eq!(zones[0].moisture_percent, 50);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let zones = generate_zones(&input(-3.0, "Sandy", 1.7));
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].area, 0.0);
        assert_eq!(zones[0].suitability, 90);
        assert_eq!(zones[0].moisture_percent, 100);

        let nan = ZoneInput {
            area_acres: Some(f64::NAN),
            soil_type: Some("  ".to_string()),
            moisture: Some(f64::NAN),
        };
        let zones = generate_zones(&nan);
        assert_eq!(zones[0].area, 2.5);
        assert_eq!(zones[0].soil_type, "loamy");
    }

    #[test]
    fn test_from_percent_converts_moisture() {
        let zone_input = ZoneInput::from_percent(Some(12.0), Some("Black".to_string()), Some(65.0));
        assert_eq!(zone_input.resolved_moisture(), 0.65);
        let zones = generate_zones(&zone_input);
        assert_eq!(zones[0].crop, "Rice");
        assert_eq!(zones[0].moisture_percent, 65);
    }
}
