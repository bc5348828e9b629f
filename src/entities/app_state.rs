//! App state entity - Stores key-value documents.
//! Used as the backing store for per-farm zone lock lists, where the key is
//! derived from the farm's document key and the value is the serialized list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// App state database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_state")]
pub struct Model {
    /// Storage key (e.g. `"zone_locks_alice@example.com_farm_1"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Stored value, usually JSON
    pub value: String,
    /// When this entry was last written
    pub updated_at: DateTimeUtc,
}

/// `AppState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
