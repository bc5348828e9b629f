//! Zone lock business logic.
//!
//! A lock is a user's commitment to one generated zone: the crop they plan to grow
//! there and the assumed economics. Locks live in one list per (user, farm), stored
//! as a single JSON document behind the [`LockStorage`] port. Every mutation
//! rewrites the whole list.
//!
//! There is no locking around the read-modify-write: two writers on the same farm
//! race and the last write wins.
//!
//! Locks are keyed by the zone's ordinal id. After the zones are regenerated (for
//! example with a different moisture reading) `zone_2` may no longer describe the
//! same slice of land it did when it was locked.

use crate::{
    config::AppConfig,
    entities::{AppState, app_state},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A locked zone with its assumed per-acre economics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneLock {
    /// Id of the generated zone this lock refers to
    #[serde(rename = "id")]
    pub zone_id: String,
    /// Crop planned for the zone
    pub crop: String,
    /// Zone area in acres
    pub area: f64,
    /// Assumed input cost per acre
    pub estimated_cost_per_acre: f64,
    /// Assumed revenue per acre
    pub expected_revenue_per_acre: f64,
}

impl ZoneLock {
    /// Checks ids are present and amounts are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if self.zone_id.trim().is_empty() {
            return Err(Error::validation("Zone id cannot be empty"));
        }
        if self.crop.trim().is_empty() {
            return Err(Error::validation("Crop cannot be empty"));
        }
        for (field, value) in [
            ("area", self.area),
            ("estimatedCostPerAcre", self.estimated_cost_per_acre),
            ("expectedRevenuePerAcre", self.expected_revenue_per_acre),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::validation(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A lock as submitted by a client. Missing economics are filled in from the
/// configured crop table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    /// Id of the generated zone
    #[serde(rename = "id")]
    pub zone_id: String,
    /// Crop planned for the zone
    pub crop: String,
    /// Zone area in acres
    pub area: f64,
    /// Overrides the configured cost per acre
    #[serde(default)]
    pub estimated_cost_per_acre: Option<f64>,
    /// Overrides the configured revenue per acre
    #[serde(default)]
    pub expected_revenue_per_acre: Option<f64>,
}

impl LockRequest {
    /// Resolves the request into a lock priced with `config`'s crop economics.
    #[must_use]
    pub fn into_lock(self, config: &AppConfig) -> ZoneLock {
        let (cost, revenue) = config.economics_for(&self.crop);
        ZoneLock {
            zone_id: self.zone_id.trim().to_string(),
            crop: self.crop.trim().to_string(),
            area: self.area,
            estimated_cost_per_acre: self.estimated_cost_per_acre.unwrap_or(cost),
            expected_revenue_per_acre: self.expected_revenue_per_acre.unwrap_or(revenue),
        }
    }
}

/// Storage port for lock lists: a text document per key.
#[async_trait]
pub trait LockStorage: Send + Sync {
    /// Reads the document stored under `key`, `None` if nothing was written yet.
    async fn load(&self, key: &str) -> Result<Option<String>>;
    /// Replaces the document stored under `key`.
    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Lock storage backed by the `app_state` table.
#[derive(Debug, Clone)]
pub struct DbLockStorage {
    db: DatabaseConnection,
}

impl DbLockStorage {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LockStorage for DbLockStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let entry = AppState::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(entry.map(|e| e.value))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let entry = app_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(chrono::Utc::now()),
        };
        AppState::insert(entry)
            .on_conflict(
                OnConflict::column(app_state::Column::Key)
                    .update_columns([app_state::Column::Value, app_state::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}

/// In-process lock storage. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryLockStorage {
    entries: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl LockStorage for MemoryLockStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage key for a farm's lock list, derived from the farm's document key.
#[must_use]
pub fn lock_key(farm_key: &str) -> String {
    format!("zone_locks_{farm_key}")
}

/// The lock list of one farm.
pub struct ZoneLockStore<'a> {
    storage: &'a dyn LockStorage,
    key: String,
}

impl<'a> ZoneLockStore<'a> {
    /// Opens the lock list of the farm with document key `farm_key`.
    #[must_use]
    pub fn for_farm(storage: &'a dyn LockStorage, farm_key: &str) -> Self {
        Self {
            storage,
            key: lock_key(farm_key),
        }
    }

    /// Current locks. Missing, unreadable or corrupt storage reads as no locks.
    pub async fn list(&self) -> Vec<ZoneLock> {
        let raw = match self.storage.load(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Lock storage unreadable, treating as empty");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "Stored lock list is corrupt, treating as empty");
            Vec::new()
        })
    }

    /// Locks a zone. An existing lock with the same zone id is overwritten in
    /// place, otherwise the lock is appended. Returns the new list.
    pub async fn add_or_replace(&self, lock: ZoneLock) -> Result<Vec<ZoneLock>> {
        lock.validate()?;
        let mut locks = self.list().await;
        if let Some(existing) = locks.iter_mut().find(|l| l.zone_id == lock.zone_id) {
            debug!(zone_id = %lock.zone_id, "Replacing existing lock");
            *existing = lock;
        } else {
            info!(zone_id = %lock.zone_id, crop = %lock.crop, "Locking zone");
            locks.push(lock);
        }
        self.write(&locks).await?;
        Ok(locks)
    }

    /// Unlocks a zone. Unknown ids are a no-op. Returns the new list.
    pub async fn remove(&self, zone_id: &str) -> Result<Vec<ZoneLock>> {
        let mut locks = self.list().await;
        let before = locks.len();
        locks.retain(|l| l.zone_id != zone_id);
        if locks.len() == before {
            debug!(zone_id, "No lock to remove");
            return Ok(locks);
        }
        info!(zone_id, "Unlocked zone");
        self.write(&locks).await?;
        Ok(locks)
    }

    async fn write(&self, locks: &[ZoneLock]) -> Result<()> {
        let raw = serde_json::to_string(locks)?;
        self.storage.save(&self.key, &raw).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    struct BrokenStorage;

    #[async_trait]
    impl LockStorage for BrokenStorage {
        async fn load(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Config {
                message: "storage offline".to_string(),
            })
        }

        async fn save(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Config {
                message: "storage offline".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_list_is_empty_for_new_farm() {
        let storage = MemoryLockStorage::default();
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_appends_in_order() -> Result<()> {
        let storage = MemoryLockStorage::default();
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        store.add_or_replace(test_lock("zone_2", "Rice", 2.0)).await?;
        store.add_or_replace(test_lock("zone_1", "Wheat", 3.0)).await?;

        let ids: Vec<String> = store.list().await.into_iter().map(|l| l.zone_id).collect();
        assert_eq!(ids, vec!["zone_2", "zone_1"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_with_existing_id_overwrites_in_place() -> Result<()> {
        let storage = MemoryLockStorage::default();
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        store.add_or_replace(test_lock("zone_1", "Wheat", 2.0)).await?;
        store.add_or_replace(test_lock("zone_2", "Rice", 2.0)).await?;
        let locks = store.add_or_replace(test_lock("zone_1", "Cotton", 4.5)).await?;

        assert_eq!(locks.len(), 2);
        assert_eq!(locks[0].zone_id, "zone_1");
        assert_eq!(locks[0].crop, "Cotton");
        assert_eq!(locks[0].area, 4.5);
        assert_eq!(store.list().await, locks);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_missing_id_is_noop() -> Result<()> {
        let storage = MemoryLockStorage::default();
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        store.add_or_replace(test_lock("zone_1", "Wheat", 2.0)).await?;

        let locks = store.remove("zone_9").await?;
        assert_eq!(locks.len(), 1);

        let locks = store.remove("zone_1").await?;
        assert!(locks.is_empty());
        assert!(store.list().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_farms_do_not_share_locks() -> Result<()> {
        let storage = MemoryLockStorage::default();
        let first = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        let second = ZoneLockStore::for_farm(&storage, "a@b.c_farm_2");
        first.add_or_replace(test_lock("zone_1", "Wheat", 2.0)).await?;

        assert_eq!(first.list().await.len(), 1);
        assert!(second.list().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_empty() -> Result<()> {
        let storage = MemoryLockStorage::default();
        storage.save(&lock_key("a@b.c_farm_1"), "{not json").await?;
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        assert!(store.list().await.is_empty());

        // The next write replaces the corrupt document
        store.add_or_replace(test_lock("zone_1", "Wheat", 2.0)).await?;
        assert_eq!(store.list().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_storage_reads_as_empty_but_writes_fail() {
        let storage = BrokenStorage;
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        assert!(store.list().await.is_empty());
        assert!(
            store
                .add_or_replace(test_lock("zone_1", "Wheat", 2.0))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_invalid_lock_is_rejected() {
        let storage = MemoryLockStorage::default();
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");

        let negative = test_lock("zone_1", "Wheat", -1.0);
        assert!(matches!(
            store.add_or_replace(negative).await,
            Err(Error::Validation { .. })
        ));

        let unnamed = test_lock(" ", "Wheat", 1.0);
        assert!(matches!(
            store.add_or_replace(unnamed).await,
            Err(Error::Validation { .. })
        ));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_db_storage_round_trip() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let storage = DbLockStorage::new(db);
        let store = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");

        store.add_or_replace(test_lock("zone_1", "Wheat", 2.0)).await?;
        store.add_or_replace(test_lock("zone_2", "Rice", 3.0)).await?;
        store.add_or_replace(test_lock("zone_1", "Cotton", 2.0)).await?;

        let reopened = ZoneLockStore::for_farm(&storage, "a@b.c_farm_1");
        let locks = reopened.list().await;
        assert_eq!(locks.len(), 2);
        assert_eq!(locks[0].crop, "Cotton");
        assert_eq!(locks[1].crop, "Rice");
        Ok(())
    }

    #[test]
    fn test_lock_request_uses_configured_economics() {
        let config = AppConfig::default();
        let request: LockRequest =
            serde_json::from_str(r#"{"id": "zone_1", "crop": "wheat", "area": 2.0}"#).unwrap();
        let lock = request.into_lock(&config);
        assert_eq!(lock.estimated_cost_per_acre, 18_000.0);
        assert_eq!(lock.expected_revenue_per_acre, 42_000.0);

        let request: LockRequest = serde_json::from_str(
            r#"{"id": "zone_1", "crop": "Wheat", "area": 2.0, "estimatedCostPerAcre": 100.0}"#,
        )
        .unwrap();
        let lock = request.into_lock(&config);
        assert_eq!(lock.estimated_cost_per_acre, 100.0);
        assert_eq!(lock.expected_revenue_per_acre, 42_000.0);
    }

    #[test]
    fn test_lock_serializes_with_dashboard_field_names() {
        let json = serde_json::to_value(test_lock("zone_3", "Rice", 1.5)).unwrap();
        assert_eq!(json["id"], "zone_3");
        assert!(json.get("estimatedCostPerAcre").is_some());
        assert!(json.get("expectedRevenuePerAcre").is_some());
    }
}
