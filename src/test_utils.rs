//! Shared test utilities for `FarmBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    api::AppState,
    clients::ServiceClients,
    config::AppConfig,
    core::{farm::FarmInput, locks::ZoneLock, user, user::ProfileInput},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes tracing output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Application state over a fresh in-memory database, default settings and every
/// external service disabled.
pub async fn setup_test_state() -> Result<AppState> {
    let db = setup_test_db().await?;
    Ok(AppState::new(
        db,
        AppConfig::default(),
        ServiceClients::disabled(),
    ))
}

/// Profile with only a name filled in.
pub fn test_profile(full_name: &str) -> ProfileInput {
    ProfileInput {
        full_name: full_name.to_string(),
        ..ProfileInput::default()
    }
}

/// Farm input with sensible defaults.
///
/// # Defaults
/// * coordinates: Durg, Chhattisgarh (21.19, 81.27)
/// * `soil_type`: "Loamy"
/// * `avg_moisture`: 45%
pub fn test_farm_input(name: &str, area_acres: f64) -> FarmInput {
    FarmInput {
        name: name.to_string(),
        location: "Durg".to_string(),
        latitude: 21.19,
        longitude: 81.27,
        area_acres,
        crop_type: Some("Wheat".to_string()),
        soil_type: Some("Loamy".to_string()),
        avg_moisture: Some(45.0),
    }
}

/// Signs up a user with a 10-acre first farm.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<(entities::user::Model, entities::farm::Model)> {
    user::signup(
        db,
        email,
        test_profile("Test Farmer"),
        test_farm_input("Home field", 10.0),
    )
    .await
}

/// Lock priced at 100 per acre cost and 250 per acre revenue.
pub fn test_lock(zone_id: &str, crop: &str, area: f64) -> ZoneLock {
    ZoneLock {
        zone_id: zone_id.to_string(),
        crop: crop.to_string(),
        area,
        estimated_cost_per_acre: 100.0,
        expected_revenue_per_acre: 250.0,
    }
}
