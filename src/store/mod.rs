//! # Gear Store
//!
//! Data access layer for the armor and weapon collections.
//!
//! `GearStore` is the capability the request handlers depend on. Two
//! implementations satisfy the same contract:
//! - `MongoGearStore`: backed by a MongoDB deployment
//! - `InMemoryGearStore`: process-local, used for tests and local runs

pub mod errors;
pub mod filter;
pub mod memory;
pub mod mongo;
pub mod query;

use async_trait::async_trait;

use crate::model::{Armor, GearId, Weapon};

pub use errors::{StoreError, StoreResult};
pub use filter::{FilterExpr, FilterSet};
pub use memory::InMemoryGearStore;
pub use mongo::MongoGearStore;
pub use query::{build_filter, build_query, GearQuery, QueryParams};

/// Server-side execution bound applied to list queries
pub const LIST_QUERY_MAX_TIME: std::time::Duration = std::time::Duration::from_secs(30);

/// Persistence operations for both gear collections
///
/// Implementations must be safe to share between concurrent requests.
/// No operation retries; failures surface immediately.
#[async_trait]
pub trait GearStore: Send + Sync {
    /// Insert an armor record; its id must already be assigned
    async fn insert_armor(&self, armor: &Armor) -> StoreResult<()>;

    /// List armor matching the query parameters
    async fn get_armor(&self, params: &QueryParams) -> StoreResult<Vec<Armor>>;

    async fn get_armor_by_id(&self, id: GearId) -> StoreResult<Armor>;

    /// Replace the armor at `id`; exactly one document must match and change
    async fn update_armor_by_id(&self, armor: Armor, id: GearId) -> StoreResult<()>;

    /// Delete the armor at `id`; deleting a missing record is not an error
    async fn delete_armor_by_id(&self, id: GearId) -> StoreResult<()>;

    /// Insert a weapon record; its id must already be assigned
    async fn insert_weapon(&self, weapon: &Weapon) -> StoreResult<()>;

    /// List weapons matching the query parameters
    async fn get_weapon(&self, params: &QueryParams) -> StoreResult<Vec<Weapon>>;

    async fn get_weapon_by_id(&self, id: GearId) -> StoreResult<Weapon>;

    /// Replace the weapon at `id`; exactly one document must match and change
    async fn update_weapon_by_id(&self, weapon: Weapon, id: GearId) -> StoreResult<()>;

    /// Delete the weapon at `id`; deleting a missing record is not an error
    async fn delete_weapon_by_id(&self, id: GearId) -> StoreResult<()>;

    /// Liveness check against the backing store
    async fn ping(&self) -> StoreResult<()>;
}

/// Turn update counts into the update outcome
///
/// Anything but one match and one modification is a conflict, including
/// re-submitting a record unchanged.
pub(crate) fn check_update_counts(
    kind: &'static str,
    id: GearId,
    matched: u64,
    modified: u64,
) -> StoreResult<()> {
    if matched != 1 || modified != 1 {
        return Err(StoreError::Conflict {
            kind,
            id,
            matched,
            modified,
        });
    }
    Ok(())
}
