//! HTTP clients for the external collaborators: the zone service, the generative
//! insight service and the weather provider.
//!
//! Every remote call returns `Result<T, FetchError>`. Callers never swallow a
//! failure; they wrap the outcome in a [`Sourced`] value that says whether the
//! data came from the service or from a local fallback, and why.

pub mod insights;
pub mod weather;
pub mod zoning;

use crate::config::{AppConfig, secrets::ServiceKeys};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

pub use insights::InsightClient;
pub use weather::WeatherClient;
pub use zoning::ZoneServiceClient;

/// Why a remote call produced no usable data
#[derive(Error, Debug)]
pub enum FetchError {
    /// No URL or key configured for the service
    #[error("service is not configured")]
    Disabled,

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// Response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Short reason recorded with a fallback: `disabled` or `failed: <detail>`.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Disabled => "disabled".to_string(),
            other => format!("failed: {other}"),
        }
    }
}

/// Where a value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// The remote service answered
    Remote,
    /// A local fallback was used
    Fallback {
        /// `disabled` or `failed: <detail>`
        reason: String,
    },
}

/// A value tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    /// The value itself
    pub data: T,
    /// Where it came from
    pub source: Source,
}

impl<T> Sourced<T> {
    /// Wraps data returned by a remote service.
    pub const fn remote(data: T) -> Self {
        Self {
            data,
            source: Source::Remote,
        }
    }

    /// Wraps fallback data substituted for a failed or disabled call.
    pub fn fallback(data: T, error: &FetchError) -> Self {
        Self {
            data,
            source: Source::Fallback {
                reason: error.reason(),
            },
        }
    }

    /// Resolves a remote result, substituting `fallback()` on error. Failures are
    /// logged at `warn`; a disabled service only at `debug`.
    pub fn resolve(
        result: Result<T, FetchError>,
        what: &str,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match result {
            Ok(data) => Self::remote(data),
            Err(FetchError::Disabled) => {
                debug!(what, "Service disabled, using fallback");
                Self::fallback(fallback(), &FetchError::Disabled)
            }
            Err(e) => {
                warn!(what, error = %e, "Remote call failed, using fallback");
                Self::fallback(fallback(), &e)
            }
        }
    }

    /// Transforms the data, keeping the source.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            data: f(self.data),
            source: self.source,
        }
    }

    /// True when the data did not come from the remote service.
    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, Source::Fallback { .. })
    }
}

/// Checks the status and decodes a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// All outbound clients, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct ServiceClients {
    /// Remote zone division
    pub zoning: ZoneServiceClient,
    /// Generative insights
    pub insights: InsightClient,
    /// Weather provider
    pub weather: WeatherClient,
}

impl ServiceClients {
    /// Builds the clients from settings and secrets. Services without a URL (or,
    /// for the weather provider, without a key) are disabled.
    #[must_use]
    pub fn from_config(config: &AppConfig, keys: &ServiceKeys) -> Self {
        let http = reqwest::Client::new();
        Self {
            zoning: ZoneServiceClient::new(http.clone(), config.services.zone_service_url.clone()),
            insights: InsightClient::new(
                http.clone(),
                config.services.insight_service_url.clone(),
                keys.insight_api_key.clone(),
            ),
            weather: WeatherClient::new(
                http,
                config.services.weather_base_url.clone(),
                keys.weather_api_key.clone(),
            ),
        }
    }

    /// Every service disabled. All calls take the fallback path.
    #[must_use]
    pub fn disabled() -> Self {
        Self::from_config(&AppConfig::default(), &ServiceKeys::default())
    }
}
