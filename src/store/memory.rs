//! In-memory store for dev mode and tests.
//!
//! Each apply happens under a single write lock, so a plan is all-or-nothing
//! from any reader's point of view - the same contract the MongoDB backend
//! gives through transactions.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{
    ChampionRecord, EntityKind, ItemRecord, RunePathRecord, SummonerSpellRecord, VersionMarker,
};
use crate::store::{GameStore, UpsertResult, WritePlan};
use crate::types::Result;

#[derive(Default)]
pub struct MemoryStore {
    champions: RwLock<BTreeMap<String, ChampionRecord>>,
    items: RwLock<BTreeMap<String, ItemRecord>>,
    rune_paths: RwLock<BTreeMap<i64, RunePathRecord>>,
    summoner_spells: RwLock<BTreeMap<String, SummonerSpellRecord>>,
    markers: RwLock<HashMap<EntityKind, VersionMarker>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Apply a plan to a string-keyed map, returning the counts
fn apply_to_map<T, K, F>(map: &mut BTreeMap<K, T>, plan: WritePlan<T>, key_of: F) -> UpsertResult
where
    K: Ord,
    F: Fn(&str) -> Option<K>,
    T: crate::model::ExternalId,
{
    let result = UpsertResult::from_plan(&plan);

    for record in plan.insert.into_iter().chain(plan.update) {
        if let Some(key) = key_of(&record.external_id()) {
            map.insert(key, record);
        }
    }

    for id in &plan.remove {
        if let Some(key) = key_of(id) {
            map.remove(&key);
        }
    }

    result
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn apply_champions(&self, plan: WritePlan<ChampionRecord>) -> Result<UpsertResult> {
        let mut map = self.champions.write().await;
        Ok(apply_to_map(&mut map, plan, |id| Some(id.to_string())))
    }

    async fn apply_items(&self, plan: WritePlan<ItemRecord>) -> Result<UpsertResult> {
        let mut map = self.items.write().await;
        Ok(apply_to_map(&mut map, plan, |id| Some(id.to_string())))
    }

    async fn apply_rune_paths(&self, plan: WritePlan<RunePathRecord>) -> Result<UpsertResult> {
        let mut map = self.rune_paths.write().await;
        Ok(apply_to_map(&mut map, plan, |id| id.parse().ok()))
    }

    async fn apply_summoner_spells(
        &self,
        plan: WritePlan<SummonerSpellRecord>,
    ) -> Result<UpsertResult> {
        let mut map = self.summoner_spells.write().await;
        Ok(apply_to_map(&mut map, plan, |id| Some(id.to_string())))
    }

    async fn champions(&self) -> Result<Vec<ChampionRecord>> {
        Ok(self.champions.read().await.values().cloned().collect())
    }

    async fn champion(&self, external_id: &str) -> Result<Option<ChampionRecord>> {
        Ok(self.champions.read().await.get(external_id).cloned())
    }

    async fn items(&self) -> Result<Vec<ItemRecord>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn item(&self, external_id: &str) -> Result<Option<ItemRecord>> {
        Ok(self.items.read().await.get(external_id).cloned())
    }

    async fn rune_paths(&self) -> Result<Vec<RunePathRecord>> {
        Ok(self.rune_paths.read().await.values().cloned().collect())
    }

    async fn rune_path(&self, external_id: i64) -> Result<Option<RunePathRecord>> {
        Ok(self.rune_paths.read().await.get(&external_id).cloned())
    }

    async fn summoner_spells(&self) -> Result<Vec<SummonerSpellRecord>> {
        Ok(self.summoner_spells.read().await.values().cloned().collect())
    }

    async fn version_marker(&self, kind: EntityKind) -> Result<Option<VersionMarker>> {
        Ok(self.markers.read().await.get(&kind).cloned())
    }

    async fn version_markers(&self) -> Result<Vec<VersionMarker>> {
        let markers = self.markers.read().await;
        let mut all: Vec<VersionMarker> = markers.values().cloned().collect();
        all.sort_by_key(|m| m.entity_kind.as_str());
        Ok(all)
    }

    async fn put_version_marker(&self, marker: VersionMarker) -> Result<()> {
        self.markers.write().await.insert(marker.entity_kind, marker);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::reconcile;
    use chrono::Utc;
    use std::collections::BTreeMap as Map;

    fn item(id: &str, total: i64) -> ItemRecord {
        ItemRecord {
            external_id: id.to_string(),
            name: format!("Item {id}"),
            description: String::new(),
            plaintext: String::new(),
            tier: crate::model::Tier::Basic,
            gold: crate::model::ItemGold {
                base: 0,
                total,
                sell: 0,
                purchasable: true,
            },
            stat_modifiers: Map::new(),
            build_from: Vec::new(),
            build_into: Vec::new(),
            tags: Vec::new(),
            maps: Map::new(),
            consumed: false,
            in_store: true,
            hide_from_all: false,
            required_champion: None,
            image_full: String::new(),
        }
    }

    #[tokio::test]
    async fn apply_then_reapply_is_idempotent() {
        let store = MemoryStore::new();
        let batch = vec![item("1001", 300), item("1036", 350)];

        let existing = store.items().await.unwrap();
        let first = store
            .apply_items(reconcile(&existing, batch.clone()))
            .await
            .unwrap();
        assert_eq!(first.inserted, 2);

        let existing = store.items().await.unwrap();
        let second = store
            .apply_items(reconcile(&existing, batch))
            .await
            .unwrap();
        assert!(second.is_noop());
    }

    #[tokio::test]
    async fn removed_records_disappear() {
        let store = MemoryStore::new();
        let existing = store.items().await.unwrap();
        store
            .apply_items(reconcile(&existing, vec![item("1001", 300), item("1036", 350)]))
            .await
            .unwrap();

        let existing = store.items().await.unwrap();
        let result = store
            .apply_items(reconcile(&existing, vec![item("1001", 300)]))
            .await
            .unwrap();

        assert_eq!(result.removed, 1);
        assert!(store.item("1036").await.unwrap().is_none());
        assert!(store.item("1001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn version_markers_upsert_by_kind() {
        let store = MemoryStore::new();

        store
            .put_version_marker(VersionMarker {
                entity_kind: EntityKind::Items,
                current_version: "13.9.1".to_string(),
                last_synced_at: Utc::now(),
            })
            .await
            .unwrap();
        store
            .put_version_marker(VersionMarker {
                entity_kind: EntityKind::Items,
                current_version: "13.10.1".to_string(),
                last_synced_at: Utc::now(),
            })
            .await
            .unwrap();

        let marker = store.version_marker(EntityKind::Items).await.unwrap().unwrap();
        assert_eq!(marker.current_version, "13.10.1");
        assert_eq!(store.version_markers().await.unwrap().len(), 1);
    }
}
