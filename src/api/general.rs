//! Service banner and health check.

use super::AppState;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

/// Public routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
}

/// Response of `GET /`
#[derive(Debug, Serialize)]
pub struct Banner {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Response of `GET /health`
#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    database: &'static str,
}

async fn banner() -> Json<Banner> {
    Json(Banner {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let database = match state.database.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            "unavailable"
        }
    };
    Json(Health {
        status: if database == "ok" { "ok" } else { "degraded" },
        database,
    })
}
