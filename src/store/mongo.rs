//! MongoDB-backed store.
//!
//! One collection per entity kind plus `version_markers`, all keyed by a
//! unique `external_id` index. Batch applies run inside a single session
//! transaction so a failed write leaves the collection untouched; the
//! caller sees that as a `WriteConflict`. Requires a replica-set deployment
//! for transactions, which is the supported production topology.

use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use mongodb::options::IndexOptions;
use mongodb::{Client, ClientSession, Collection, IndexModel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::model::{
    ChampionRecord, EntityKind, ExternalId, ItemRecord, RunePathRecord, SummonerSpellRecord,
    VersionMarker,
};
use crate::store::{GameStore, UpsertResult, WritePlan};
use crate::types::{DragonholdError, Result};

const CHAMPIONS: &str = "champions";
const ITEMS: &str = "items";
const RUNE_PATHS: &str = "rune_paths";
const SUMMONER_SPELLS: &str = "summoner_spells";
const VERSION_MARKERS: &str = "version_markers";

/// Records that know their MongoDB identity filters
trait MongoRecord:
    ExternalId + Serialize + DeserializeOwned + Unpin + Send + Sync
{
    fn id_filter(&self) -> Document;
    fn remove_filter(ids: &[String]) -> Document;
}

impl MongoRecord for ChampionRecord {
    fn id_filter(&self) -> Document {
        doc! { "external_id": &self.external_id }
    }

    fn remove_filter(ids: &[String]) -> Document {
        doc! { "external_id": { "$in": ids } }
    }
}

impl MongoRecord for ItemRecord {
    fn id_filter(&self) -> Document {
        doc! { "external_id": &self.external_id }
    }

    fn remove_filter(ids: &[String]) -> Document {
        doc! { "external_id": { "$in": ids } }
    }
}

impl MongoRecord for RunePathRecord {
    fn id_filter(&self) -> Document {
        doc! { "external_id": self.external_id }
    }

    fn remove_filter(ids: &[String]) -> Document {
        let numeric: Vec<i64> = ids.iter().filter_map(|id| id.parse().ok()).collect();
        doc! { "external_id": { "$in": numeric } }
    }
}

impl MongoRecord for SummonerSpellRecord {
    fn id_filter(&self) -> Document {
        doc! { "external_id": &self.external_id }
    }

    fn remove_filter(ids: &[String]) -> Document {
        doc! { "external_id": { "$in": ids } }
    }
}

/// Marker row as persisted; timestamps kept as RFC 3339 strings
#[derive(Debug, Serialize, Deserialize)]
struct MarkerDoc {
    entity_kind: String,
    current_version: String,
    last_synced_at: String,
}

impl From<&VersionMarker> for MarkerDoc {
    fn from(marker: &VersionMarker) -> Self {
        Self {
            entity_kind: marker.entity_kind.as_str().to_string(),
            current_version: marker.current_version.clone(),
            last_synced_at: marker.last_synced_at.to_rfc3339(),
        }
    }
}

impl MarkerDoc {
    fn into_marker(self) -> Option<VersionMarker> {
        let entity_kind = self.entity_kind.parse().ok()?;
        let last_synced_at = DateTime::parse_from_rfc3339(&self.last_synced_at)
            .ok()?
            .with_timezone(&Utc);

        Some(VersionMarker {
            entity_kind,
            current_version: self.current_version,
            last_synced_at,
        })
    }
}

/// MongoDB client wrapper for the game-data store
pub struct MongoStore {
    client: Client,
    db_name: String,
}

impl MongoStore {
    /// Connect, verify with a ping, and ensure indexes
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // serverSelectionTimeoutMS keeps startup from hanging on an
        // unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        } else {
            format!("{uri}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| DragonholdError::Database(format!("failed to connect to MongoDB: {e}")))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DragonholdError::Database(format!("MongoDB ping failed: {e}")))?;

        info!("Connected to MongoDB database '{}'", db_name);

        let store = Self {
            client,
            db_name: db_name.to_string(),
        };
        store.ensure_indexes().await?;

        Ok(store)
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.client.database(&self.db_name).collection(name)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        for name in [CHAMPIONS, ITEMS, RUNE_PATHS, SUMMONER_SPELLS] {
            self.unique_index::<Document>(name, "external_id").await?;
        }
        self.unique_index::<Document>(VERSION_MARKERS, "entity_kind")
            .await?;
        Ok(())
    }

    async fn unique_index<T: Send + Sync>(&self, collection: &str, field: &str) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection::<T>(collection)
            .create_index(index)
            .await
            .map_err(|e| {
                DragonholdError::Database(format!("failed to create index on {collection}: {e}"))
            })?;

        Ok(())
    }

    /// Apply one entity kind's plan inside a single transaction
    async fn apply_plan<T: MongoRecord>(
        &self,
        collection_name: &str,
        plan: WritePlan<T>,
    ) -> Result<UpsertResult> {
        let result = UpsertResult::from_plan(&plan);
        if result.is_noop() {
            return Ok(result);
        }

        let collection = self.collection::<T>(collection_name);

        let mut session = self
            .client
            .start_session()
            .await
            .map_err(|e| DragonholdError::Database(format!("failed to start session: {e}")))?;

        session.start_transaction().await.map_err(|e| {
            DragonholdError::WriteConflict(format!("{collection_name}: failed to open transaction: {e}"))
        })?;

        match Self::run_plan(&collection, &plan, &mut session).await {
            Ok(()) => {
                session.commit_transaction().await.map_err(|e| {
                    DragonholdError::WriteConflict(format!("{collection_name}: commit failed: {e}"))
                })?;
                Ok(result)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    warn!(
                        collection = %collection_name,
                        error = %abort_err,
                        "Transaction abort failed after write error"
                    );
                }
                Err(e)
            }
        }
    }

    async fn run_plan<T: MongoRecord>(
        collection: &Collection<T>,
        plan: &WritePlan<T>,
        session: &mut ClientSession,
    ) -> Result<()> {
        let conflict =
            |e: mongodb::error::Error| DragonholdError::WriteConflict(e.to_string());

        if !plan.insert.is_empty() {
            collection
                .insert_many(&plan.insert)
                .session(&mut *session)
                .await
                .map_err(conflict)?;
        }

        for record in &plan.update {
            collection
                .replace_one(record.id_filter(), record)
                .session(&mut *session)
                .await
                .map_err(conflict)?;
        }

        if !plan.remove.is_empty() {
            collection
                .delete_many(T::remove_filter(&plan.remove))
                .session(&mut *session)
                .await
                .map_err(conflict)?;
        }

        Ok(())
    }

    async fn find_all<T>(&self, collection_name: &str, sort: Document) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let cursor = self
            .collection::<T>(collection_name)
            .find(doc! {})
            .sort(sort)
            .await
            .map_err(|e| DragonholdError::Database(format!("{collection_name}: find failed: {e}")))?;

        let records: Vec<T> = cursor
            .filter_map(|record| async {
                match record {
                    Ok(r) => Some(r),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(records)
    }

    async fn find_one<T>(&self, collection_name: &str, filter: Document) -> Result<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.collection::<T>(collection_name)
            .find_one(filter)
            .await
            .map_err(|e| DragonholdError::Database(format!("{collection_name}: find failed: {e}")))
    }
}

#[async_trait]
impl GameStore for MongoStore {
    async fn apply_champions(&self, plan: WritePlan<ChampionRecord>) -> Result<UpsertResult> {
        self.apply_plan(CHAMPIONS, plan).await
    }

    async fn apply_items(&self, plan: WritePlan<ItemRecord>) -> Result<UpsertResult> {
        self.apply_plan(ITEMS, plan).await
    }

    async fn apply_rune_paths(&self, plan: WritePlan<RunePathRecord>) -> Result<UpsertResult> {
        self.apply_plan(RUNE_PATHS, plan).await
    }

    async fn apply_summoner_spells(
        &self,
        plan: WritePlan<SummonerSpellRecord>,
    ) -> Result<UpsertResult> {
        self.apply_plan(SUMMONER_SPELLS, plan).await
    }

    async fn champions(&self) -> Result<Vec<ChampionRecord>> {
        self.find_all(CHAMPIONS, doc! { "external_id": 1 }).await
    }

    async fn champion(&self, external_id: &str) -> Result<Option<ChampionRecord>> {
        self.find_one(CHAMPIONS, doc! { "external_id": external_id })
            .await
    }

    async fn items(&self) -> Result<Vec<ItemRecord>> {
        self.find_all(ITEMS, doc! { "external_id": 1 }).await
    }

    async fn item(&self, external_id: &str) -> Result<Option<ItemRecord>> {
        self.find_one(ITEMS, doc! { "external_id": external_id })
            .await
    }

    async fn rune_paths(&self) -> Result<Vec<RunePathRecord>> {
        self.find_all(RUNE_PATHS, doc! { "external_id": 1 }).await
    }

    async fn rune_path(&self, external_id: i64) -> Result<Option<RunePathRecord>> {
        self.find_one(RUNE_PATHS, doc! { "external_id": external_id })
            .await
    }

    async fn summoner_spells(&self) -> Result<Vec<SummonerSpellRecord>> {
        self.find_all(SUMMONER_SPELLS, doc! { "external_id": 1 })
            .await
    }

    async fn version_marker(&self, kind: EntityKind) -> Result<Option<VersionMarker>> {
        let doc: Option<MarkerDoc> = self
            .find_one(VERSION_MARKERS, doc! { "entity_kind": kind.as_str() })
            .await?;

        Ok(doc.and_then(MarkerDoc::into_marker))
    }

    async fn version_markers(&self) -> Result<Vec<VersionMarker>> {
        let docs: Vec<MarkerDoc> = self
            .find_all(VERSION_MARKERS, doc! { "entity_kind": 1 })
            .await?;

        Ok(docs.into_iter().filter_map(MarkerDoc::into_marker).collect())
    }

    async fn put_version_marker(&self, marker: VersionMarker) -> Result<()> {
        let doc = MarkerDoc::from(&marker);

        self.collection::<MarkerDoc>(VERSION_MARKERS)
            .replace_one(doc! { "entity_kind": marker.entity_kind.as_str() }, &doc)
            .upsert(true)
            .await
            .map_err(|e| DragonholdError::Database(format!("failed to store version marker: {e}")))?;

        Ok(())
    }
}
