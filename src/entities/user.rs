//! User entity - A farmer's profile document, keyed by e-mail.
//!
//! Sign-in is a local mock: the e-mail is the whole identity and no credential is
//! stored. The active farm id is the persisted half of the session.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// E-mail address, doubles as the document key
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Contact phone number
    pub phone: String,
    /// Village name
    pub village: String,
    /// District name
    pub district: String,
    /// State name
    pub state: String,
    /// Farm currently selected in the dashboard, if any
    pub active_farm_id: Option<String>,
    /// When the user signed up
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many farms
    #[sea_orm(has_many = "super::farm::Entity")]
    Farms,
}

impl Related<super::farm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
