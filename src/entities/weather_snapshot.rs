//! Weather snapshot entity - Current conditions captured for a farm.
//!
//! Each farm keeps one snapshot, overwritten every time its current weather is
//! fetched from the provider. It is served when the provider is unreachable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weather snapshot database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weather_snapshots")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Document key of the farm this snapshot belongs to
    #[sea_orm(unique)]
    pub farm_key: String,
    /// Air temperature in degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Precipitation in millimetres
    pub precip_mm: f64,
    /// Condition text from the provider (e.g. "Partly cloudy")
    pub condition: String,
    /// When the snapshot was taken
    pub captured_at: DateTimeUtc,
}

/// Defines relationships between `WeatherSnapshot` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each snapshot belongs to one farm
    #[sea_orm(
        belongs_to = "super::farm::Entity",
        from = "Column::FarmKey",
        to = "super::farm::Column::Id",
        on_delete = "Cascade"
    )]
    Farm,
}

impl Related<super::farm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
