//! Session state - who is calling and which farm they are working on.
//!
//! The session is resolved from the database on every request and handed to the
//! code that needs it. Only the active farm id is persisted (on the user row).

use crate::{
    core::{farm, user},
    entities::{farm as farm_entity, user as user_entity},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, instrument};

/// The caller's user record, their farms, and the farm currently in focus.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// The signed-in user
    pub user: user_entity::Model,
    /// Farm in focus. `None` only if the user owns no farms.
    pub active_farm: Option<farm_entity::Model>,
    /// All farms owned by the user, oldest first
    pub farms: Vec<farm_entity::Model>,
}

/// Loads the session for a user.
///
/// A stale active farm id (pointing at a farm that no longer exists) resolves to
/// the oldest farm without rewriting the user row.
#[instrument(skip(db))]
pub async fn load_session(db: &DatabaseConnection, email: &str) -> Result<Session> {
    let user = user::get_user(db, email).await?;
    let farms = farm::list_farms(db, email).await?;
    let active_farm = user
        .active_farm_id
        .as_deref()
        .and_then(|id| farms.iter().find(|f| f.farm_id == id))
        .or_else(|| farms.first())
        .cloned();
    debug!(
        active_farm = active_farm.as_ref().map(|f| f.farm_id.as_str()),
        farms = farms.len(),
        "Session loaded"
    );
    Ok(Session {
        user,
        active_farm,
        farms,
    })
}

/// Moves the session to another of the user's farms.
#[instrument(skip(db))]
pub async fn switch_active_farm(
    db: &DatabaseConnection,
    email: &str,
    farm_id: &str,
) -> Result<Session> {
    let target = farm::get_farm(db, email, farm_id).await?;
    user::set_active_farm(db, email, Some(target.farm_id)).await?;
    load_session(db, email).await
}
