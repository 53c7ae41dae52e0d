//! Persistent storage behind the sync engine and the read routes.
//!
//! [`GameStore`] abstracts the backend: `MongoStore` in production,
//! `MemoryStore` in dev mode and tests. Writes go through precomputed
//! [`WritePlan`]s (see [`reconcile`]) and each `apply_*` call is one
//! transaction for one entity kind - entity kinds never share a transaction.

pub mod memory;
pub mod mongo;
pub mod reconcile;

use async_trait::async_trait;

use crate::model::{
    ChampionRecord, EntityKind, ItemRecord, RunePathRecord, SummonerSpellRecord, VersionMarker,
};
use crate::types::Result;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use reconcile::reconcile;

/// Reconciled changes for one entity kind, ready to apply atomically
#[derive(Debug, Clone)]
pub struct WritePlan<T> {
    pub insert: Vec<T>,
    pub update: Vec<T>,
    /// External ids present in storage but absent from the new batch
    pub remove: Vec<String>,
}

impl<T> WritePlan<T> {
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }
}

/// Counts from one applied write plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct UpsertResult {
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
}

impl UpsertResult {
    pub fn from_plan<T>(plan: &WritePlan<T>) -> Self {
        Self {
            inserted: plan.insert.len(),
            updated: plan.update.len(),
            removed: plan.remove.len(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.removed == 0
    }
}

/// Storage backend for mirrored game data and version markers
#[async_trait]
pub trait GameStore: Send + Sync {
    // ------------------------------------------------------------------
    // Transactional batch writes, one entity kind per call
    // ------------------------------------------------------------------

    async fn apply_champions(&self, plan: WritePlan<ChampionRecord>) -> Result<UpsertResult>;
    async fn apply_items(&self, plan: WritePlan<ItemRecord>) -> Result<UpsertResult>;
    async fn apply_rune_paths(&self, plan: WritePlan<RunePathRecord>) -> Result<UpsertResult>;
    async fn apply_summoner_spells(
        &self,
        plan: WritePlan<SummonerSpellRecord>,
    ) -> Result<UpsertResult>;

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    async fn champions(&self) -> Result<Vec<ChampionRecord>>;
    async fn champion(&self, external_id: &str) -> Result<Option<ChampionRecord>>;
    async fn items(&self) -> Result<Vec<ItemRecord>>;
    async fn item(&self, external_id: &str) -> Result<Option<ItemRecord>>;
    async fn rune_paths(&self) -> Result<Vec<RunePathRecord>>;
    async fn rune_path(&self, external_id: i64) -> Result<Option<RunePathRecord>>;
    async fn summoner_spells(&self) -> Result<Vec<SummonerSpellRecord>>;

    // ------------------------------------------------------------------
    // Version markers
    // ------------------------------------------------------------------

    async fn version_marker(&self, kind: EntityKind) -> Result<Option<VersionMarker>>;
    async fn version_markers(&self) -> Result<Vec<VersionMarker>>;
    /// Upsert the marker for its kind; called only after a committed write
    async fn put_version_marker(&self, marker: VersionMarker) -> Result<()>;
}
