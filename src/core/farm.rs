//! Farm business logic - Handles all farm document operations.
//!
//! Farms are stored under the document key `{email}_{farm_id}`. A user always keeps
//! at least one farm: deleting the last one is rejected. Deleting a farm does not
//! touch its zone locks; they stay in storage under the old key.

use crate::{
    core::{user, weather::Coordinates, zones::ZoneInput},
    entities::{Farm, farm},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Fields for a new farm.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmInput {
    /// Display name
    pub name: String,
    /// Free-text location
    #[serde(default)]
    pub location: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Area in acres
    pub area_acres: f64,
    /// Crop currently grown
    #[serde(default)]
    pub crop_type: Option<String>,
    /// Soil type name
    #[serde(default)]
    pub soil_type: Option<String>,
    /// Average moisture in percent (0-100)
    #[serde(default)]
    pub avg_moisture: Option<f64>,
}

/// Partial edit of a farm. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FarmUpdate {
    /// New display name
    pub name: Option<String>,
    /// New free-text location
    pub location: Option<String>,
    /// New latitude
    pub latitude: Option<f64>,
    /// New longitude
    pub longitude: Option<f64>,
    /// New area in acres
    pub area_acres: Option<f64>,
    /// New crop
    pub crop_type: Option<String>,
    /// New soil type
    pub soil_type: Option<String>,
    /// New average moisture in percent
    pub avg_moisture: Option<f64>,
}

fn validate_fields(
    name: &str,
    latitude: f64,
    longitude: f64,
    area_acres: f64,
    avg_moisture: Option<f64>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Farm name cannot be empty"));
    }
    Coordinates::new(latitude, longitude)?;
    if !area_acres.is_finite() || area_acres < 0.0 {
        return Err(Error::validation(format!(
            "Area must be a non-negative number of acres, got {area_acres}"
        )));
    }
    if let Some(moisture) = avg_moisture
        && (!moisture.is_finite() || !(0.0..=100.0).contains(&moisture))
    {
        return Err(Error::validation(format!(
            "Average moisture must be between 0 and 100, got {moisture}"
        )));
    }
    Ok(())
}

impl FarmInput {
    /// Checks name, coordinates, area and moisture ranges.
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            self.latitude,
            self.longitude,
            self.area_acres,
            self.avg_moisture,
        )
    }
}

/// Document key of a farm.
#[must_use]
pub fn farm_key(owner_email: &str, farm_id: &str) -> String {
    format!("{owner_email}_{farm_id}")
}

fn new_farm_id() -> String {
    format!("farm_{}", uuid::Uuid::new_v4().simple())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Inserts a farm without touching the owner's session.
pub(crate) async fn insert_farm<C>(db: &C, owner_email: &str, input: FarmInput) -> Result<farm::Model>
where
    C: ConnectionTrait,
{
    input.validate()?;
    let farm_id = new_farm_id();
    let now = chrono::Utc::now();
    let model = farm::ActiveModel {
        id: Set(farm_key(owner_email, &farm_id)),
        farm_id: Set(farm_id),
        owner_email: Set(owner_email.to_string()),
        name: Set(input.name.trim().to_string()),
        location: Set(input.location.trim().to_string()),
        latitude: Set(input.latitude),
        longitude: Set(input.longitude),
        area_acres: Set(input.area_acres),
        crop_type: Set(blank_to_none(input.crop_type)),
        soil_type: Set(blank_to_none(input.soil_type)),
        avg_moisture: Set(input.avg_moisture),
        created_at: Set(now),
        updated_at: Set(now),
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates a farm for an existing user. If the user has no active farm yet, the
/// new farm becomes active.
#[instrument(skip(db, input))]
pub async fn create_farm(
    db: &DatabaseConnection,
    owner_email: &str,
    input: FarmInput,
) -> Result<farm::Model> {
    let txn = db.begin().await?;
    let owner = user::get_user(&txn, owner_email).await?;
    let created = insert_farm(&txn, owner_email, input).await?;
    if owner.active_farm_id.is_none() {
        user::set_active_farm(&txn, owner_email, Some(created.farm_id.clone())).await?;
    }
    txn.commit().await?;
    info!(farm_id = %created.farm_id, owner_email, "Farm created");
    Ok(created)
}

/// Lists a user's farms, oldest first.
pub async fn list_farms<C>(db: &C, owner_email: &str) -> Result<Vec<farm::Model>>
where
    C: ConnectionTrait,
{
    Farm::find()
        .filter(farm::Column::OwnerEmail.eq(owner_email))
        .order_by_asc(farm::Column::CreatedAt)
        .order_by_asc(farm::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Gets one of the user's farms, failing with [`Error::FarmNotFound`] if it does
/// not exist or belongs to someone else.
pub async fn get_farm<C>(db: &C, owner_email: &str, farm_id: &str) -> Result<farm::Model>
where
    C: ConnectionTrait,
{
    Farm::find_by_id(farm_key(owner_email, farm_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::FarmNotFound {
            farm_id: farm_id.to_string(),
        })
}

/// Applies a partial edit to a farm.
#[instrument(skip(db, update))]
pub async fn update_farm(
    db: &DatabaseConnection,
    owner_email: &str,
    farm_id: &str,
    update: FarmUpdate,
) -> Result<farm::Model> {
    let existing = get_farm(db, owner_email, farm_id).await?;

    let name = update.name.unwrap_or_else(|| existing.name.clone());
    let latitude = update.latitude.unwrap_or(existing.latitude);
    let longitude = update.longitude.unwrap_or(existing.longitude);
    let area_acres = update.area_acres.unwrap_or(existing.area_acres);
    let avg_moisture = update.avg_moisture.or(existing.avg_moisture);
    validate_fields(&name, latitude, longitude, area_acres, avg_moisture)?;

    let mut active: farm::ActiveModel = existing.into();
    active.name = Set(name.trim().to_string());
    active.latitude = Set(latitude);
    active.longitude = Set(longitude);
    active.area_acres = Set(area_acres);
    active.avg_moisture = Set(avg_moisture);
    if let Some(location) = update.location {
        active.location = Set(location.trim().to_string());
    }
    if update.crop_type.is_some() {
        active.crop_type = Set(blank_to_none(update.crop_type));
    }
    if update.soil_type.is_some() {
        active.soil_type = Set(blank_to_none(update.soil_type));
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(db).await?;
    info!(farm_id, "Farm updated");
    Ok(updated)
}

/// Deletes a farm unless it is the owner's last one.
///
/// If the deleted farm was active, the oldest remaining farm becomes active.
/// The farm's zone locks are left in storage.
#[instrument(skip(db))]
pub async fn delete_farm(db: &DatabaseConnection, owner_email: &str, farm_id: &str) -> Result<()> {
    let txn = db.begin().await?;

    let target = get_farm(&txn, owner_email, farm_id).await?;
    let farms = list_farms(&txn, owner_email).await?;
    let Some(successor) = farms.iter().find(|f| f.id != target.id) else {
        return Err(Error::LastFarm {
            farm_id: farm_id.to_string(),
        });
    };
    let successor_id = successor.farm_id.clone();

    Farm::delete_by_id(target.id).exec(&txn).await?;

    let owner = user::get_user(&txn, owner_email).await?;
    if owner.active_farm_id.as_deref() == Some(farm_id) {
        user::set_active_farm(&txn, owner_email, Some(successor_id)).await?;
    }

    txn.commit().await?;
    info!(farm_id, owner_email, "Farm deleted");
    Ok(())
}

/// Zone generator input for a farm's stored soil data.
#[must_use]
pub fn zone_input(farm: &farm::Model) -> ZoneInput {
    ZoneInput::from_percent(
        Some(farm.area_acres),
        farm.soil_type.clone(),
        farm.avg_moisture,
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_list_farms() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let (_, first) = create_test_user(&db, "asha@example.com").await?;
        let second = create_farm(&db, "asha@example.com", test_farm_input("River plot", 4.0)).await?;

        assert_ne!(first.farm_id, second.farm_id);
        assert!(second.farm_id.starts_with("farm_"));

        let farms = list_farms(&db, "asha@example.com").await?;
        assert_eq!(farms.len(), 2);

        // Creating a second farm does not steal the session
        let owner = user::get_user(&db, "asha@example.com").await?;
        assert_eq!(owner.active_farm_id.as_deref(), Some(first.farm_id.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_farm_for_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_farm(&db, "ghost@example.com", test_farm_input("Nowhere", 1.0)).await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_farm_validation() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "asha@example.com").await?;

        let mut input = test_farm_input("Bad", 1.0);
        input.latitude = 95.0;
        assert!(matches!(
            create_farm(&db, "asha@example.com", input).await,
            Err(Error::Validation { .. })
        ));

        let mut input = test_farm_input("Bad", 1.0);
        input.avg_moisture = Some(140.0);
        assert!(matches!(
            create_farm(&db, "asha@example.com", input).await,
            Err(Error::Validation { .. })
        ));

        let input = test_farm_input("  ", 1.0);
        assert!(matches!(
            create_farm(&db, "asha@example.com", input).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_farms_are_scoped_to_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, asha_farm) = create_test_user(&db, "asha@example.com").await?;
        create_test_user(&db, "ravi@example.com").await?;

        let result = get_farm(&db, "ravi@example.com", &asha_farm.farm_id).await;
        assert!(matches!(result, Err(Error::FarmNotFound { .. })));
        assert_eq!(list_farms(&db, "ravi@example.com").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_farm_partial() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, farm) = create_test_user(&db, "asha@example.com").await?;

        let update = FarmUpdate {
            area_acres: Some(22.5),
            soil_type: Some("Black".to_string()),
            avg_moisture: Some(35.0),
            ..FarmUpdate::default()
        };
        let updated = update_farm(&db, "asha@example.com", &farm.farm_id, update).await?;
        assert_eq!(updated.area_acres, 22.5);
        assert_eq!(updated.soil_type.as_deref(), Some("Black"));
        assert_eq!(updated.avg_moisture, Some(35.0));
        assert_eq!(updated.name, farm.name);
        assert_eq!(updated.latitude, farm.latitude);

        let bad = FarmUpdate {
            area_acres: Some(-1.0),
            ..FarmUpdate::default()
        };
        assert!(matches!(
            update_farm(&db, "asha@example.com", &farm.farm_id, bad).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_last_farm_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, farm) = create_test_user(&db, "asha@example.com").await?;

        let result = delete_farm(&db, "asha@example.com", &farm.farm_id).await;
        assert!(matches!(result, Err(Error::LastFarm { .. })));
        assert_eq!(list_farms(&db, "asha@example.com").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_active_farm_hands_session_to_survivor() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, first) = create_test_user(&db, "asha@example.com").await?;
        let second = create_farm(&db, "asha@example.com", test_farm_input("River plot", 4.0)).await?;

        delete_farm(&db, "asha@example.com", &first.farm_id).await?;

        let farms = list_farms(&db, "asha@example.com").await?;
        assert_eq!(farms.len(), 1);
        assert_eq!(farms[0].farm_id, second.farm_id);

        let owner = user::get_user(&db, "asha@example.com").await?;
        assert_eq!(owner.active_farm_id.as_deref(), Some(second.farm_id.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unknown_farm() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "asha@example.com").await?;
        let result = delete_farm(&db, "asha@example.com", "farm_missing").await;
        assert!(matches!(result, Err(Error::FarmNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_zone_input_from_farm() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, farm) = create_test_user(&db, "asha@example.com").await?;
        let input = zone_input(&farm);
        assert_eq!(input.area_acres, Some(farm.area_acres));
        assert_eq!(input.moisture, Some(0.45));
        Ok(())
    }
}
