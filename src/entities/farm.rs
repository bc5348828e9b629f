//! Farm entity - A single farm owned by one user.
//!
//! The primary key is the document key `{email}_{farm_id}` so that farm ids only
//! need to be unique per owner. Soil type and moisture are optional; the zone
//! generator supplies defaults when they are missing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Farm database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "farms")]
pub struct Model {
    /// Document key, `{owner_email}_{farm_id}`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Farm identifier as seen by the owner (e.g. `farm_3f2a...`)
    pub farm_id: String,
    /// E-mail of the owning user
    pub owner_email: String,
    /// Display name
    pub name: String,
    /// Free-text location
    pub location: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Farm area in acres
    pub area_acres: f64,
    /// Crop currently grown, if known
    pub crop_type: Option<String>,
    /// Soil type name (e.g. "Loamy", "Sandy")
    pub soil_type: Option<String>,
    /// Average soil moisture in percent (0-100)
    pub avg_moisture: Option<f64>,
    /// When the farm was created
    pub created_at: DateTimeUtc,
    /// When the farm was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Farm and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each farm belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerEmail",
        to = "super::user::Column::Email"
    )]
    Owner,
    /// One farm has many weather snapshots
    #[sea_orm(has_many = "super::weather_snapshot::Entity")]
    WeatherSnapshots,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::weather_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeatherSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
