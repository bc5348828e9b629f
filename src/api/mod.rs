//! HTTP API - axum router, shared state and request identity.
//!
//! # Routes
//!
//! - [`general`] - service banner and health check
//! - [`auth`] - signup and profile
//! - [`session`] - current session and active farm switching
//! - [`farms`] - farm documents
//! - [`zones`] - zone plans, zone locks and financials
//! - [`weather`] - weather proxy, analytics and insights
//! - [`irrigation`] - irrigation advice
//!
//! Callers identify themselves with the `X-User-Email` header. Nothing is
//! verified; the header is the whole of authentication.

pub mod auth;
pub mod error;
pub mod extract;
pub mod farms;
pub mod general;
pub mod irrigation;
pub mod session;
pub mod weather;
pub mod zones;

use crate::{
    clients::ServiceClients,
    config::AppConfig,
    core::{
        locks::{DbLockStorage, LockStorage},
        user::normalize_email,
    },
    errors::Error,
};
use axum::{Router, extract::FromRequestParts, http::request::Parts};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

/// Header carrying the caller's e-mail.
pub const USER_HEADER: &str = "x-user-email";

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub database: DatabaseConnection,
    /// Application settings
    pub config: Arc<AppConfig>,
    /// Backing store for zone lock lists
    pub locks: Arc<dyn LockStorage>,
    /// Outbound clients
    pub clients: ServiceClients,
}

impl AppState {
    /// Builds the state with lock lists stored in the database.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: AppConfig, clients: ServiceClients) -> Self {
        let locks: Arc<dyn LockStorage> = Arc::new(DbLockStorage::new(database.clone()));
        Self {
            database,
            config: Arc::new(config),
            locks,
            clients,
        }
    }
}

/// The authenticated caller, taken from [`USER_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Normalized e-mail address
    pub email: String,
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::Unauthenticated)?;
        let email = normalize_email(header).map_err(|_| {
            debug!(uri = %parts.uri, "Rejected malformed identity header");
            Error::Unauthenticated
        })?;
        Ok(Self { email })
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::router())
        .merge(session::router())
        .merge(farms::router())
        .merge(zones::router())
        .merge(weather::router())
        .merge(irrigation::router());

    Router::new()
        .merge(general::router())
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
