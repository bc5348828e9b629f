//! User business logic - signup and profile documents.
//!
//! Signup is a local mock: the e-mail address is the identity and nothing is
//! verified. A signup always creates the first farm alongside the profile so a new
//! user lands on a usable dashboard.

use crate::{
    core::farm::{self, FarmInput},
    entities::{User, farm as farm_entity, user},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Descriptive profile fields. Missing fields are stored as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
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
}

/// Trims and lowercases an e-mail, rejecting anything without an `@`.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation(format!("Invalid e-mail address: '{email}'")));
    }
    Ok(email)
}

/// Finds a user by e-mail.
pub async fn find_user<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(email.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Gets a user by e-mail, failing with [`Error::UserNotFound`] if absent.
pub async fn get_user<C>(db: &C, email: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    find_user(db, email)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            email: email.to_string(),
        })
}

/// Creates a user together with their first farm, which becomes the active farm.
///
/// Fails with [`Error::UserExists`] if the e-mail is already registered.
#[instrument(skip(db, profile, first_farm))]
pub async fn signup(
    db: &DatabaseConnection,
    email: &str,
    profile: ProfileInput,
    first_farm: FarmInput,
) -> Result<(user::Model, farm_entity::Model)> {
    let email = normalize_email(email)?;
    first_farm.validate()?;

    let txn = db.begin().await?;

    if find_user(&txn, &email).await?.is_some() {
        return Err(Error::UserExists { email });
    }

    let now = chrono::Utc::now();
    user::ActiveModel {
        email: Set(email.clone()),
        full_name: Set(profile.full_name.trim().to_string()),
        phone: Set(profile.phone.trim().to_string()),
        village: Set(profile.village.trim().to_string()),
        district: Set(profile.district.trim().to_string()),
        state: Set(profile.state.trim().to_string()),
        active_farm_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let farm = farm::insert_farm(&txn, &email, first_farm).await?;
    let user = set_active_farm(&txn, &email, Some(farm.farm_id.clone())).await?;

    txn.commit().await?;
    info!(email = %user.email, farm_id = %farm.farm_id, "User signed up");
    Ok((user, farm))
}

/// Overwrites the descriptive profile fields of an existing user.
#[instrument(skip(db, profile))]
pub async fn update_profile(
    db: &DatabaseConnection,
    email: &str,
    profile: ProfileInput,
) -> Result<user::Model> {
    let existing = get_user(db, email).await?;
    let mut active: user::ActiveModel = existing.into();
    active.full_name = Set(profile.full_name.trim().to_string());
    active.phone = Set(profile.phone.trim().to_string());
    active.village = Set(profile.village.trim().to_string());
    active.district = Set(profile.district.trim().to_string());
    active.state = Set(profile.state.trim().to_string());
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    info!(email, "Profile updated");
    Ok(updated)
}

/// Stores which farm the user is working on.
pub async fn set_active_farm<C>(
    db: &C,
    email: &str,
    farm_id: Option<String>,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let existing = get_user(db, email).await?;
    let mut active: user::ActiveModel = existing.into();
    active.active_farm_id = Set(farm_id);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}
