//! Generative insight service.

use super::{FetchError, Sourced, read_json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Client for the insight service
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    url: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct InsightRequest {
    lat: f64,
    lon: f64,
    days: u32,
}

/// Farming advice for the coming days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    /// One-paragraph outlook
    pub summary: String,
    /// Irrigation advice
    pub irrigation: String,
    /// Rainfall outlook
    pub rainfall: String,
    /// Soil risk notes
    pub soil_risk: String,
}

impl Insights {
    /// Shown when no insights could be produced.
    #[must_use]
    pub fn placeholder() -> Self {
        let none = "No insights available right now.".to_string();
        Self {
            summary: none.clone(),
            irrigation: none.clone(),
            rainfall: none.clone(),
            soil_risk: none,
        }
    }
}

impl InsightClient {
    /// Creates a client. `None` for the URL disables the service.
    #[must_use]
    pub fn new(http: reqwest::Client, url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.filter(|u| !u.trim().is_empty()),
            api_key,
        }
    }

    /// Whether a service URL is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Requests insights for a location.
    pub async fn fetch(&self, lat: f64, lon: f64, days: u32) -> Result<Insights, FetchError> {
        let url = self.url.as_deref().ok_or(FetchError::Disabled)?;
        let mut request = self.http.post(url).json(&InsightRequest { lat, lon, days });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let insights: Insights = read_json(request.send().await?).await?;
        if insights.summary.trim().is_empty() {
            return Err(FetchError::Malformed("empty summary".to_string()));
        }
        Ok(insights)
    }

    /// Requests insights, substituting the placeholder on any failure.
    #[instrument(skip(self))]
    pub async fn insights_or_placeholder(&self, lat: f64, lon: f64, days: u32) -> Sourced<Insights> {
        Sourced::resolve(self.fetch(lat, lon, days).await, "insights", Insights::placeholder)
    }
}
