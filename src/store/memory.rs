//! # In-Memory Gear Store
//!
//! Process-local implementation of `GearStore` with the same filter,
//! sort, paging and update-count semantics as the document store.
//!
//! A failure can be injected with `fail_with`, after which every
//! operation returns that error until `clear_failure` is called.

use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::errors::{StoreError, StoreResult};
use super::filter::compare_json_values;
use super::query::{build_filter, build_query, QueryParams};
use super::{check_update_counts, GearStore};
use crate::model::{Armor, GearId, GearRecord, Weapon};

/// In-memory gear store
pub struct InMemoryGearStore {
    armor: RwLock<Vec<Armor>>,
    weapons: RwLock<Vec<Weapon>>,
    failure: RwLock<Option<StoreError>>,
}

impl InMemoryGearStore {
    pub fn new() -> Self {
        Self {
            armor: RwLock::new(Vec::new()),
            weapons: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
        }
    }

    /// Make every subsequent operation fail with `err`
    pub fn fail_with(&self, err: StoreError) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some(err);
        }
    }

    pub fn clear_failure(&self) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = None;
        }
    }

    fn check_failure(&self) -> StoreResult<()> {
        let failure = self.failure.read().map_err(|_| poisoned())?;
        match failure.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryGearStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::persistence("lock poisoned")
}

fn to_document<R: GearRecord>(record: &R) -> StoreResult<Value> {
    serde_json::to_value(record).map_err(|e| StoreError::persistence(e.to_string()))
}

fn insert<R: GearRecord>(collection: &RwLock<Vec<R>>, record: &R) -> StoreResult<()> {
    let mut records = collection.write().map_err(|_| poisoned())?;

    if records.iter().any(|r| r.id() == record.id()) {
        return Err(StoreError::persistence(format!(
            "duplicate key error: {} {} already exists",
            R::KIND,
            record.id()
        )));
    }

    records.push(record.clone());
    Ok(())
}

fn list<R: GearRecord>(collection: &RwLock<Vec<R>>, params: &QueryParams) -> StoreResult<Vec<R>> {
    let query = build_filter::<R>(params);
    let records = collection.read().map_err(|_| poisoned())?;

    let mut matches = Vec::new();
    for record in records.iter() {
        let doc = to_document(record)?;
        if query.filter.matches(&doc) {
            matches.push((doc, record.clone()));
        }
    }

    matches.sort_by(|(a, _), (b, _)| {
        compare_json_values(a.get(&query.sort_field), b.get(&query.sort_field))
    });

    let skip = usize::try_from(query.skip()).unwrap_or(usize::MAX);
    let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);

    Ok(matches
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|(_, record)| record)
        .collect())
}

fn get_by_id<R: GearRecord>(collection: &RwLock<Vec<R>>, id: GearId) -> StoreResult<R> {
    let query = build_query(Some(id), None);
    let records = collection.read().map_err(|_| poisoned())?;

    for record in records.iter() {
        if query.matches(&to_document(record)?) {
            return Ok(record.clone());
        }
    }

    Err(StoreError::NotFound { kind: R::KIND, id })
}

fn update_by_id<R: GearRecord>(
    collection: &RwLock<Vec<R>>,
    mut record: R,
    id: GearId,
) -> StoreResult<()> {
    record.set_id(id);
    let mut records = collection.write().map_err(|_| poisoned())?;

    let (matched, modified) = match records.iter_mut().find(|r| r.id() == id) {
        Some(existing) if *existing == record => (1, 0),
        Some(existing) => {
            *existing = record;
            (1, 1)
        }
        None => (0, 0),
    };

    check_update_counts(R::KIND, id, matched, modified)
}

fn delete_by_id<R: GearRecord>(collection: &RwLock<Vec<R>>, id: GearId) -> StoreResult<()> {
    let mut records = collection.write().map_err(|_| poisoned())?;
    if let Some(idx) = records.iter().position(|r| r.id() == id) {
        records.remove(idx);
    }
    Ok(())
}

#[async_trait]
impl GearStore for InMemoryGearStore {
    async fn insert_armor(&self, armor: &Armor) -> StoreResult<()> {
        debug!("BEGIN - InsertArmor");
        self.check_failure()?;
        insert(&self.armor, armor)
    }

    async fn get_armor(&self, params: &QueryParams) -> StoreResult<Vec<Armor>> {
        debug!("BEGIN - GetArmor");
        self.check_failure()?;
        list(&self.armor, params)
    }

    async fn get_armor_by_id(&self, id: GearId) -> StoreResult<Armor> {
        debug!(%id, "BEGIN - GetArmorByID");
        self.check_failure()?;
        get_by_id(&self.armor, id)
    }

    async fn update_armor_by_id(&self, armor: Armor, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - UpdateArmorByID");
        self.check_failure()?;
        update_by_id(&self.armor, armor, id)
    }

    async fn delete_armor_by_id(&self, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - DeleteArmorByID");
        self.check_failure()?;
        delete_by_id(&self.armor, id)
    }

    async fn insert_weapon(&self, weapon: &Weapon) -> StoreResult<()> {
        debug!("BEGIN - InsertWeapon");
        self.check_failure()?;
        insert(&self.weapons, weapon)
    }

    async fn get_weapon(&self, params: &QueryParams) -> StoreResult<Vec<Weapon>> {
        debug!("BEGIN - GetWeapon");
        self.check_failure()?;
        list(&self.weapons, params)
    }

    async fn get_weapon_by_id(&self, id: GearId) -> StoreResult<Weapon> {
        debug!(%id, "BEGIN - GetWeaponByID");
        self.check_failure()?;
        get_by_id(&self.weapons, id)
    }

    async fn update_weapon_by_id(&self, weapon: Weapon, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - UpdateWeaponByID");
        self.check_failure()?;
        update_by_id(&self.weapons, weapon, id)
    }

    async fn delete_weapon_by_id(&self, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - DeleteWeaponByID");
        self.check_failure()?;
        delete_by_id(&self.weapons, id)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_failure()
    }
}
