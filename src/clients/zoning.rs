//! Remote zone division service, with the local generator as fallback.

use super::{FetchError, Source, Sourced, read_json};
use crate::core::zones::{Zone, ZoneInput, generate_zones, round_half_up};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Client for the zone service
#[derive(Debug, Clone)]
pub struct ZoneServiceClient {
    http: reqwest::Client,
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ZoneServiceRequest {
    lat: f64,
    lon: f64,
    area_acres: f64,
    soil_type: String,
    avg_moisture: f64,
}

#[derive(Debug, Deserialize)]
struct ZoneServiceResponse {
    zones: Vec<RemoteZone>,
}

#[derive(Debug, Deserialize)]
struct RemoteZone {
    id: String,
    area_acres: f64,
    soil_type: String,
    moisture: f64,
    crop_suggestion: String,
    suitability: f64,
}

impl RemoteZone {
    fn into_zone(self) -> Result<Zone, FetchError> {
        let malformed = |what: &str| Err(FetchError::Malformed(format!("zone '{}': {what}", self.id)));
        if self.id.trim().is_empty() {
            return Err(FetchError::Malformed("zone without id".to_string()));
        }
        if !self.area_acres.is_finite() || self.area_acres < 0.0 {
            return malformed("invalid area");
        }
        if !self.moisture.is_finite() || !(0.0..=1.0).contains(&self.moisture) {
            return malformed("moisture outside [0, 1]");
        }
        if !self.suitability.is_finite() || !(0.0..=100.0).contains(&self.suitability) {
            return malformed("suitability outside [0, 100]");
        }
        if self.crop_suggestion.trim().is_empty() {
            return malformed("missing crop suggestion");
        }

        // Cast safety: both values were range-checked above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (suitability, moisture_percent) = (
            round_half_up(self.suitability) as u8,
            round_half_up(self.moisture * 100.0) as u8,
        );
        Ok(Zone {
            id: self.id,
            area: self.area_acres,
            suitability,
            crop: self.crop_suggestion,
            soil_type: self.soil_type,
            moisture_percent,
        })
    }
}

impl ZoneServiceClient {
    /// Creates a client. `None` disables the service.
    #[must_use]
    pub fn new(http: reqwest::Client, url: Option<String>) -> Self {
        Self {
            http,
            url: url.filter(|u| !u.trim().is_empty()),
        }
    }

    /// Whether a service URL is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Asks the service to divide a farm. The payload is validated; an empty or
    /// out-of-range zone list is [`FetchError::Malformed`].
    pub async fn fetch_zones(
        &self,
        lat: f64,
        lon: f64,
        input: &ZoneInput,
    ) -> Result<Vec<Zone>, FetchError> {
        let url = self.url.as_deref().ok_or(FetchError::Disabled)?;
        let request = ZoneServiceRequest {
            lat,
            lon,
            area_acres: input.resolved_area(),
            soil_type: input.resolved_soil_type(),
            avg_moisture: input.resolved_moisture(),
        };
        let response = self.http.post(url).json(&request).send().await?;
        let body: ZoneServiceResponse = read_json(response).await?;
        if body.zones.is_empty() {
            return Err(FetchError::Malformed("empty zone list".to_string()));
        }
        body.zones.into_iter().map(RemoteZone::into_zone).collect()
    }
}

/// Zones for a farm plus where they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonePlan {
    /// The zones, in display order
    pub zones: Vec<Zone>,
    /// `service` or `heuristic`
    pub source: ZoneSource,
    /// Why the heuristic was used, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Origin of a zone plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    /// Returned by the remote zone service
    Service,
    /// Produced by the local generator
    Heuristic,
}

impl From<Sourced<Vec<Zone>>> for ZonePlan {
    fn from(sourced: Sourced<Vec<Zone>>) -> Self {
        match sourced.source {
            Source::Remote => Self {
                zones: sourced.data,
                source: ZoneSource::Service,
                fallback_reason: None,
            },
            Source::Fallback { reason } => Self {
                zones: sourced.data,
                source: ZoneSource::Heuristic,
                fallback_reason: Some(reason),
            },
        }
    }
}

/// Plans the zones for a farm: remote service first, local generator otherwise.
#[instrument(skip(client, input))]
pub async fn plan_zones(client: &ZoneServiceClient, lat: f64, lon: f64, input: &ZoneInput) -> ZonePlan {
    let result = client.fetch_zones(lat, lon, input).await;
    let plan = ZonePlan::from(Sourced::resolve(result, "zone service", || generate_zones(input)));
    debug!(source = ?plan.source, zones = plan.zones.len(), "Zones planned");
    plan
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn remote(id: &str, moisture: f64, suitability: f64) -> RemoteZone {
        RemoteZone {
            id: id.to_string(),
            area_acres: 2.5,
            soil_type: "clay".to_string(),
            moisture,
            crop_suggestion: "Rice".to_string(),
            suitability,
        }
    }

    #[tokio::test]
    async fn test_disabled_service_uses_heuristic() {
        let client = ZoneServiceClient::new(reqwest::Client::new(), None);
        let input = ZoneInput::from_percent(Some(12.0), Some("Loamy".to_string()), Some(45.0));

        let plan = plan_zones(&client, 21.19, 81.27, &input).await;
        assert_eq!(plan.source, ZoneSource::Heuristic);
        assert_eq!(plan.fallback_reason.as_deref(), Some("disabled"));
        assert_eq!(plan.zones, generate_zones(&input));
        assert_eq!(plan.zones.len(), 5);
    }

    #[test]
    fn test_blank_url_counts_as_disabled() {
        let client = ZoneServiceClient::new(reqwest::Client::new(), Some("  ".to_string()));
        assert!(!client.is_enabled());
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back_with_reason() {
        let client = ZoneServiceClient::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:9/zones".to_string()),
        );
        let plan = plan_zones(&client, 0.0, 0.0, &ZoneInput::default()).await;
        assert_eq!(plan.source, ZoneSource::Heuristic);
        assert!(
            plan.fallback_reason
                .as_deref()
                .is_some_and(|r| r.starts_with("failed: "))
        );
        assert_eq!(plan.zones.len(), 2);
    }

    #[test]
    fn test_remote_zone_conversion() {
        let zone = remote("north", 0.62, 88.4).into_zone();
        assert!(matches!(
            zone,
            Ok(Zone { ref id, suitability: 88, moisture_percent: 62, .. }) if id == "north"
        ));
    }

    #[test]
    fn test_remote_zone_validation() {
        assert!(matches!(remote("a", 1.5, 50.0).into_zone(), Err(FetchError::Malformed(_))));
        assert!(matches!(remote("a", 0.5, 120.0).into_zone(), Err(FetchError::Malformed(_))));
        assert!(matches!(remote("", 0.5, 50.0).into_zone(), Err(FetchError::Malformed(_))));
        assert!(matches!(
            remote("a", f64::NAN, 50.0).into_zone(),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_service_plan_has_no_reason() {
        let plan = ZonePlan::from(Sourced::remote(vec![]));
        assert_eq!(plan.source, ZoneSource::Service);
        assert!(plan.fallback_reason.is_none());
    }
}
