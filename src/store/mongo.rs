//! # MongoDB Gear Store
//!
//! `GearStore` backed by a MongoDB deployment. The client handle is
//! pooled by the driver and shared by every in-flight request.
//!
//! Records travel as JSON-shaped values; `_id` is converted to and from
//! the native `ObjectId` only here.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::options::{ClientOptions, FindOptions, ReadPreference, SelectionCriteria};
use mongodb::{Client, Collection};
use serde_json::Value;
use tracing::{debug, error, info};

use super::errors::{StoreError, StoreResult};
use super::filter::FilterSet;
use super::query::{build_filter, build_query, GearQuery, QueryParams, ID_FIELD};
use super::{check_update_counts, GearStore, LIST_QUERY_MAX_TIME};
use crate::model::{Armor, GearId, GearRecord, Weapon};

/// Database and collection names the store operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
    pub armor_collection: String,
    pub weapon_collection: String,
}

/// MongoDB-backed gear store
pub struct MongoGearStore {
    client: Client,
    database: String,
    armor_collection: String,
    weapon_collection: String,
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl MongoGearStore {
    /// Connect to the deployment and verify it answers a ping
    pub async fn connect(settings: &MongoSettings) -> StoreResult<Self> {
        let options = ClientOptions::parse(&settings.uri).await?;
        let client = Client::with_options(options)?;

        let store = Self::with_client(client, settings);
        store.ping().await?;

        info!(database = %store.database, "connected to gear database");
        Ok(store)
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, settings: &MongoSettings) -> Self {
        Self {
            client,
            database: settings.database.clone(),
            armor_collection: settings.armor_collection.clone(),
            weapon_collection: settings.weapon_collection.clone(),
        }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.database).collection(name)
    }

    async fn insert<R: GearRecord>(&self, collection: &str, record: &R) -> StoreResult<()> {
        let document = to_bson_document(record)?;
        self.collection(collection).insert_one(document, None).await?;
        Ok(())
    }

    async fn list<R: GearRecord>(
        &self,
        collection: &str,
        params: &QueryParams,
    ) -> StoreResult<Vec<R>> {
        let query = build_filter::<R>(params);

        let mut cursor = self
            .collection(collection)
            .find(to_bson_filter(&query.filter)?, find_options(&query))
            .await?;

        let mut matches = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            matches.push(from_bson_document(document)?);
        }

        Ok(matches)
    }

    async fn get_by_id<R: GearRecord>(&self, collection: &str, id: GearId) -> StoreResult<R> {
        let filter = to_bson_filter(&build_query(Some(id), None))?;

        match self.collection(collection).find_one(filter, None).await? {
            Some(document) => from_bson_document(document),
            None => Err(StoreError::NotFound { kind: R::KIND, id }),
        }
    }

    async fn update_by_id<R: GearRecord>(
        &self,
        collection: &str,
        mut record: R,
        id: GearId,
    ) -> StoreResult<()> {
        record.set_id(id);
        let filter = to_bson_filter(&build_query(Some(id), None))?;
        let update = doc! { "$set": to_bson_document(&record)? };

        let result = self
            .collection(collection)
            .update_one(filter, update, None)
            .await?;

        check_update_counts(R::KIND, id, result.matched_count, result.modified_count)
    }

    async fn delete_by_id(&self, collection: &str, id: GearId) -> StoreResult<()> {
        let filter = to_bson_filter(&build_query(Some(id), None))?;
        self.collection(collection).delete_one(filter, None).await?;
        Ok(())
    }
}

#[async_trait]
impl GearStore for MongoGearStore {
    async fn insert_armor(&self, armor: &Armor) -> StoreResult<()> {
        debug!("BEGIN - InsertArmor");
        self.insert(&self.armor_collection, armor).await
    }

    async fn get_armor(&self, params: &QueryParams) -> StoreResult<Vec<Armor>> {
        debug!("BEGIN - GetArmor");
        self.list(&self.armor_collection, params).await
    }

    async fn get_armor_by_id(&self, id: GearId) -> StoreResult<Armor> {
        debug!(%id, "BEGIN - GetArmorByID");
        self.get_by_id(&self.armor_collection, id).await
    }

    async fn update_armor_by_id(&self, armor: Armor, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - UpdateArmorByID");
        self.update_by_id(&self.armor_collection, armor, id).await
    }

    async fn delete_armor_by_id(&self, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - DeleteArmorByID");
        self.delete_by_id(&self.armor_collection, id).await
    }

    async fn insert_weapon(&self, weapon: &Weapon) -> StoreResult<()> {
        debug!("BEGIN - InsertWeapon");
        self.insert(&self.weapon_collection, weapon).await
    }

    async fn get_weapon(&self, params: &QueryParams) -> StoreResult<Vec<Weapon>> {
        debug!("BEGIN - GetWeapon");
        self.list(&self.weapon_collection, params).await
    }

    async fn get_weapon_by_id(&self, id: GearId) -> StoreResult<Weapon> {
        debug!(%id, "BEGIN - GetWeaponByID");
        self.get_by_id(&self.weapon_collection, id).await
    }

    async fn update_weapon_by_id(&self, weapon: Weapon, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - UpdateWeaponByID");
        self.update_by_id(&self.weapon_collection, weapon, id).await
    }

    async fn delete_weapon_by_id(&self, id: GearId) -> StoreResult<()> {
        debug!(%id, "BEGIN - DeleteWeaponByID");
        self.delete_by_id(&self.weapon_collection, id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let primary = SelectionCriteria::ReadPreference(ReadPreference::Primary);
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 }, primary)
            .await
            .map_err(|e| {
                error!(error = %e, "ERROR connecting to database");
                StoreError::from(e)
            })?;
        Ok(())
    }
}

fn to_object_id(id: GearId) -> ObjectId {
    ObjectId::from_bytes(id.bytes())
}

fn from_object_id(oid: ObjectId) -> GearId {
    GearId::from_bytes(oid.bytes())
}

/// Serialize a record, storing its id as a native `ObjectId`
fn to_bson_document<R: GearRecord>(record: &R) -> StoreResult<Document> {
    let mut document =
        bson::to_document(record).map_err(|e| StoreError::persistence(e.to_string()))?;
    document.insert(ID_FIELD, to_object_id(record.id()));
    Ok(document)
}

/// Decode a stored document, accepting `_id` as `ObjectId` or hex string
fn from_bson_document<R: GearRecord>(mut document: Document) -> StoreResult<R> {
    if let Some(Bson::ObjectId(oid)) = document.get(ID_FIELD) {
        let id = from_object_id(*oid);
        document.insert(ID_FIELD, id.to_hex());
    }
    bson::from_document(document).map_err(|e| StoreError::persistence(e.to_string()))
}

/// Paging, ascending sort and the server-side time bound for a list query
fn find_options(query: &GearQuery) -> FindOptions {
    let mut sort = Document::new();
    sort.insert(query.sort_field.clone(), 1);

    FindOptions::builder()
        .max_time(LIST_QUERY_MAX_TIME)
        .skip(query.skip())
        .limit(query.limit())
        .sort(sort)
        .build()
}

/// Translate an equality filter into a query document
fn to_bson_filter(filter: &FilterSet) -> StoreResult<Document> {
    let mut document = Document::new();

    for expr in &filter.filters {
        let value = if expr.field == ID_FIELD {
            let hex = expr.value.as_str().unwrap_or_default();
            Bson::ObjectId(to_object_id(GearId::parse(hex)?))
        } else {
            json_to_bson(&expr.value)?
        };
        document.insert(expr.field.clone(), value);
    }

    Ok(document)
}

fn json_to_bson(value: &Value) -> StoreResult<Bson> {
    match value {
        Value::Null => Ok(Bson::Null),
        Value::Bool(b) => Ok(Bson::Boolean(*b)),
        Value::String(s) => Ok(Bson::String(s.clone())),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Bson::Int64(i)),
            (None, Some(f)) => Ok(Bson::Double(f)),
            _ => Err(StoreError::Validation(format!("unsupported filter value {}", n))),
        },
        other => Err(StoreError::Validation(format!(
            "unsupported filter value {}",
            other
        ))),
    }
}
