//! Irrigation log entity - One row per irrigation recommendation served.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Irrigation log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "irrigation_logs")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// E-mail of the user who asked
    pub user_email: String,
    /// Farm the recommendation was for, if any
    pub farm_id: Option<String>,
    /// Soil feel as entered (e.g. "Slightly Damp")
    pub soil_feel: String,
    /// Sprinkler/drip application rate in mm per hour
    pub application_rate_mm_per_h: f64,
    /// Forecast rain used for the adjustment, in mm
    pub forecast_rain_mm: f64,
    /// Whether irrigation was recommended
    pub irrigate: bool,
    /// Recommended water depth in mm
    pub water_mm: f64,
    /// Recommended run time in hours
    pub duration_hours: f64,
    /// When the recommendation was made
    pub created_at: DateTimeUtc,
}

/// `IrrigationLog` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
