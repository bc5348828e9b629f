//! Secrets loaded from environment variables.
//!
//! API keys never live in config.toml. They are read from the environment (usually
//! populated from `.env` by `dotenvy`) right before the clients are built.

/// API keys for the external collaborators
#[derive(Debug, Clone, Default)]
pub struct ServiceKeys {
    /// Key for the weather provider (`WEATHER_API_KEY`)
    pub weather_api_key: Option<String>,
    /// Key for the generative insight service (`INSIGHT_API_KEY`)
    pub insight_api_key: Option<String>,
}

/// Reads the service keys from the environment. Empty values count as unset.
#[must_use]
pub fn load_service_keys() -> ServiceKeys {
    ServiceKeys {
        weather_api_key: non_empty_var("WEATHER_API_KEY"),
        insight_api_key: non_empty_var("INSIGHT_API_KEY"),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
