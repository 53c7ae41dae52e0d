//! Sync orchestrator.
//!
//! Drives one pass per entity kind: resolve version, fetch, normalize,
//! reconcile, write, then move the version marker. The marker update is the
//! last step so a crash mid-sync leaves it at the last known-good version.
//!
//! Failure isolation is the core contract here:
//! - a rejected record costs only that record (counted in the report)
//! - a failed entity kind costs only that kind; `sync_all` carries on and
//!   surfaces the failure in the aggregate report
//!
//! Per-kind mutexes serialize writes for the same kind, so a background
//! sync and a manually triggered one can never interleave. Distinct kinds
//! share no mutable state and run concurrently.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::ddragon::{needs_sync, DataDragonApi, VersionResolver};
use crate::model::{EntityKind, VersionMarker};
use crate::normalize;
use crate::store::{reconcile, GameStore, UpsertResult};
use crate::types::{DragonholdError, Result};

// ============================================================================
// Types
// ============================================================================

/// Execution phase of one sync run, for logging and progress inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Pending,
    ResolvingVersion,
    Fetching,
    Normalizing,
    Writing,
    Done,
    PartialFailure,
}

/// Terminal outcome of a sync request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Data written and marker moved
    Success,
    /// Already at the latest version and not forced
    Skipped,
    /// Background run submitted; result only observable via /sync/status
    Scheduled,
    /// This kind's sync aborted; storage and marker untouched
    Failed,
    /// Aggregate only: some kinds succeeded, some failed
    PartialFailure,
}

/// Outcome of a sync request, per kind or aggregated over all kinds
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub status: SyncStatus,
    pub message: String,
    /// Kind label, or "all" for aggregates
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    pub failed_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsert: Option<UpsertResult>,
    /// Per-kind reports on aggregate runs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<SyncReport>,
}

impl SyncReport {
    fn scheduled(entity_type: &str) -> Self {
        Self {
            status: SyncStatus::Scheduled,
            message: format!("{entity_type} sync started in background"),
            entity_type: entity_type.to_string(),
            previous_version: None,
            current_version: None,
            failed_records: 0,
            upsert: None,
            details: Vec::new(),
        }
    }

    fn skipped(kind: EntityKind, version: &str) -> Self {
        Self {
            status: SyncStatus::Skipped,
            message: format!("{kind} already at latest version {version}"),
            entity_type: kind.as_str().to_string(),
            previous_version: Some(version.to_string()),
            current_version: Some(version.to_string()),
            failed_records: 0,
            upsert: None,
            details: Vec::new(),
        }
    }

    fn failed(entity_type: &str, previous: Option<String>, error: &DragonholdError) -> Self {
        Self {
            status: SyncStatus::Failed,
            message: error.to_string(),
            entity_type: entity_type.to_string(),
            previous_version: previous,
            current_version: None,
            failed_records: 0,
            upsert: None,
            details: Vec::new(),
        }
    }
}

/// Executor abstraction for fire-and-forget work.
///
/// The orchestrator only depends on the ability to submit a task; the
/// runtime wiring stays outside.
pub trait TaskExecutor: Send + Sync {
    fn submit(&self, task: Pin<Box<dyn Future<Output = ()> + Send>>);
}

/// Tokio-backed executor used in production
pub struct TokioExecutor;

impl TaskExecutor for TokioExecutor {
    fn submit(&self, task: Pin<Box<dyn Future<Output = ()> + Send>>) {
        tokio::spawn(task);
    }
}

// ============================================================================
// Sync engine
// ============================================================================

/// Top-level sync coordinator.
///
/// Cloning is cheap (everything is behind an Arc) and clones share the
/// per-kind locks, which is what lets a background run and an inline run
/// contend on the same guard.
pub struct SyncEngine<A: DataDragonApi + ?Sized, S: GameStore + ?Sized> {
    api: Arc<A>,
    store: Arc<S>,
    executor: Arc<dyn TaskExecutor>,
    /// At-most-one-in-flight guard per entity kind
    locks: Arc<DashMap<EntityKind, Arc<Mutex<()>>>>,
}

impl<A: DataDragonApi + ?Sized, S: GameStore + ?Sized> Clone for SyncEngine<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            executor: Arc::clone(&self.executor),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<A, S> SyncEngine<A, S>
where
    A: DataDragonApi + ?Sized + 'static,
    S: GameStore + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, store: Arc<S>, executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            api,
            store,
            executor,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    pub fn resolver(&self) -> VersionResolver<A> {
        VersionResolver::new(Arc::clone(&self.api))
    }

    fn lock_for(&self, kind: EntityKind) -> Arc<Mutex<()>> {
        self.locks
            .entry(kind)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Sync one entity kind.
    ///
    /// `background` submits the run to the executor and returns immediately
    /// with a `scheduled` report; otherwise the completed report is returned
    /// inline.
    pub async fn sync_one(&self, kind: EntityKind, force: bool, background: bool) -> SyncReport {
        if background {
            let engine = self.clone();
            let run_id = Uuid::new_v4();

            self.executor.submit(Box::pin(async move {
                let report = engine.run_sync(kind, force, None).await;
                info!(
                    run_id = %run_id,
                    entity = %kind,
                    status = ?report.status,
                    failed_records = report.failed_records,
                    "Background sync finished"
                );
            }));

            return SyncReport::scheduled(kind.as_str());
        }

        self.run_sync(kind, force, None).await
    }

    /// Sync every entity kind.
    ///
    /// Kinds run concurrently; a kind that fails is reported in the
    /// aggregate but never blocks the others.
    pub async fn sync_all(&self, force: bool, background: bool) -> SyncReport {
        if background {
            let engine = self.clone();
            let run_id = Uuid::new_v4();

            self.executor.submit(Box::pin(async move {
                let report = engine.run_sync_all(force).await;
                info!(
                    run_id = %run_id,
                    status = ?report.status,
                    "Background full sync finished"
                );
            }));

            return SyncReport::scheduled("all");
        }

        self.run_sync_all(force).await
    }

    async fn run_sync_all(&self, force: bool) -> SyncReport {
        // Resolve once for the whole pass; each kind still decides
        // independently whether it needs the new version
        let latest = match self.resolver().latest_version().await {
            Ok(version) => version,
            Err(e) => {
                error!(error = %e, "Full sync aborted: could not resolve latest version");
                return SyncReport::failed("all", None, &e);
            }
        };

        let runs = EntityKind::ALL
            .map(|kind| self.run_sync(kind, force, Some(latest.clone())));
        let details = futures::future::join_all(runs).await;

        let failed: Vec<&SyncReport> = details
            .iter()
            .filter(|r| r.status == SyncStatus::Failed)
            .collect();
        let succeeded = details
            .iter()
            .filter(|r| r.status == SyncStatus::Success)
            .count();
        let failed_records = details.iter().map(|r| r.failed_records).sum();

        let (status, message) = if failed.is_empty() && succeeded == 0 {
            (
                SyncStatus::Skipped,
                format!("all data already at latest version {latest}"),
            )
        } else if failed.is_empty() {
            (
                SyncStatus::Success,
                format!("all data updated to version {latest}"),
            )
        } else if failed.len() == details.len() {
            (
                SyncStatus::Failed,
                format!("every entity kind failed to sync to {latest}"),
            )
        } else {
            let names: Vec<&str> = failed.iter().map(|r| r.entity_type.as_str()).collect();
            (
                SyncStatus::PartialFailure,
                format!("sync to {latest} failed for: {}", names.join(", ")),
            )
        };

        SyncReport {
            status,
            message,
            entity_type: "all".to_string(),
            previous_version: None,
            current_version: Some(latest),
            failed_records,
            upsert: None,
            details,
        }
    }

    /// One complete pass for one kind. Never propagates errors: failures
    /// become `Failed` reports so aggregate runs stay isolated.
    async fn run_sync(
        &self,
        kind: EntityKind,
        force: bool,
        resolved_latest: Option<String>,
    ) -> SyncReport {
        let lock = self.lock_for(kind);
        let _guard = lock.lock().await;

        let mut phase = SyncPhase::ResolvingVersion;
        debug!(entity = %kind, phase = ?phase, "Sync starting");

        let latest = match resolved_latest {
            Some(version) => version,
            None => match self.resolver().latest_version().await {
                Ok(version) => version,
                Err(e) => {
                    error!(entity = %kind, error = %e, "Version resolution failed");
                    return SyncReport::failed(kind.as_str(), None, &e);
                }
            },
        };

        let marker = match self.store.version_marker(kind).await {
            Ok(marker) => marker,
            Err(e) => {
                error!(entity = %kind, error = %e, "Could not read version marker");
                return SyncReport::failed(kind.as_str(), None, &e);
            }
        };
        let previous = marker.as_ref().map(|m| m.current_version.clone());

        if !needs_sync(marker.as_ref(), &latest, force) {
            debug!(entity = %kind, version = %latest, "Sync not needed");
            return SyncReport::skipped(kind, &latest);
        }

        info!(
            entity = %kind,
            previous = previous.as_deref().unwrap_or("none"),
            latest = %latest,
            "Syncing"
        );

        phase = SyncPhase::Fetching;
        debug!(entity = %kind, phase = ?phase, "Fetching payload");
        let payload = match self.api.fetch(kind, &latest).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(entity = %kind, error = %e, "Fetch failed");
                return SyncReport::failed(kind.as_str(), previous, &e);
            }
        };

        phase = SyncPhase::Normalizing;
        debug!(entity = %kind, phase = ?phase, "Normalizing payload");

        // Normalize + write; per-record failures surface only as a count
        let outcome = match kind {
            EntityKind::Champions => self.write_champions(&payload).await,
            EntityKind::Items => self.write_items(&payload).await,
            EntityKind::Runes => self.write_rune_paths(&payload).await,
            EntityKind::SummonerSpells => self.write_summoner_spells(&payload).await,
        };

        let (upsert, failed_records) = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!(entity = %kind, error = %e, "Sync failed");
                return SyncReport::failed(kind.as_str(), previous, &e);
            }
        };

        // Marker moves only after the committed write
        let marker = VersionMarker {
            entity_kind: kind,
            current_version: latest.clone(),
            last_synced_at: chrono::Utc::now(),
        };
        if let Err(e) = self.store.put_version_marker(marker).await {
            error!(entity = %kind, error = %e, "Marker update failed after committed write");
            return SyncReport::failed(kind.as_str(), previous, &e);
        }

        phase = SyncPhase::Done;
        info!(
            entity = %kind,
            phase = ?phase,
            version = %latest,
            inserted = upsert.inserted,
            updated = upsert.updated,
            removed = upsert.removed,
            failed_records = failed_records,
            "Sync complete"
        );

        SyncReport {
            status: SyncStatus::Success,
            message: format!("{kind} updated to version {latest}"),
            entity_type: kind.as_str().to_string(),
            previous_version: previous,
            current_version: Some(latest),
            failed_records,
            upsert: Some(upsert),
            details: Vec::new(),
        }
    }

    async fn write_champions(&self, payload: &Value) -> Result<(UpsertResult, usize)> {
        let batch = normalize::champion::normalize_payload(payload)?;
        let failed = Self::check_batch("champions", batch.records.len(), batch.failed)?;

        let existing = self.store.champions().await?;
        let plan = reconcile(&existing, batch.records);
        debug!(phase = ?SyncPhase::Writing, "Applying champion write plan");
        let result = self.store.apply_champions(plan).await?;
        Ok((result, failed))
    }

    async fn write_items(&self, payload: &Value) -> Result<(UpsertResult, usize)> {
        let batch = normalize::item::normalize_payload(payload)?;
        let failed = Self::check_batch("items", batch.records.len(), batch.failed)?;

        let existing = self.store.items().await?;
        let plan = reconcile(&existing, batch.records);
        debug!(phase = ?SyncPhase::Writing, "Applying item write plan");
        let result = self.store.apply_items(plan).await?;
        Ok((result, failed))
    }

    async fn write_rune_paths(&self, payload: &Value) -> Result<(UpsertResult, usize)> {
        let batch = normalize::rune::normalize_payload(payload)?;
        let failed = Self::check_batch("rune paths", batch.records.len(), batch.failed)?;

        let existing = self.store.rune_paths().await?;
        let plan = reconcile(&existing, batch.records);
        debug!(phase = ?SyncPhase::Writing, "Applying rune path write plan");
        let result = self.store.apply_rune_paths(plan).await?;
        Ok((result, failed))
    }

    async fn write_summoner_spells(&self, payload: &Value) -> Result<(UpsertResult, usize)> {
        let batch = normalize::summoner_spell::normalize_payload(payload)?;
        let failed = Self::check_batch("summoner spells", batch.records.len(), batch.failed)?;

        let existing = self.store.summoner_spells().await?;
        let plan = reconcile(&existing, batch.records);
        debug!(phase = ?SyncPhase::Writing, "Applying summoner spell write plan");
        let result = self.store.apply_summoner_spells(plan).await?;
        Ok((result, failed))
    }

    /// A batch where every record failed normalization is a payload-level
    /// failure, not a legitimate "replace everything with nothing"
    fn check_batch(
        label: &str,
        surviving: usize,
        failed: Vec<crate::normalize::RecordFailure>,
    ) -> Result<usize> {
        for failure in &failed {
            warn!(
                record = %failure.record_id,
                reason = %failure.reason,
                "Record failed normalization, continuing"
            );
        }

        if surviving == 0 && !failed.is_empty() {
            return Err(DragonholdError::MalformedUpstreamData(format!(
                "{label}: every record failed normalization ({} rejects)",
                failed.len()
            )));
        }

        Ok(failed.len())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Upstream stub: canned payloads per kind, canned version list
    struct StubUpstream {
        versions: Vec<String>,
        payloads: HashMap<EntityKind, Value>,
    }

    impl StubUpstream {
        fn new(version: &str) -> Self {
            Self {
                versions: vec![version.to_string()],
                payloads: HashMap::new(),
            }
        }

        fn with_payload(mut self, kind: EntityKind, payload: Value) -> Self {
            self.payloads.insert(kind, payload);
            self
        }
    }

    #[async_trait]
    impl DataDragonApi for StubUpstream {
        async fn versions(&self) -> Result<Vec<String>> {
            Ok(self.versions.clone())
        }

        async fn fetch(&self, kind: EntityKind, _version: &str) -> Result<Value> {
            self.payloads.get(&kind).cloned().ok_or_else(|| {
                DragonholdError::UpstreamUnavailable(format!("no stub payload for {kind}"))
            })
        }
    }

    fn champion(key: i64, name: &str) -> Value {
        json!({
            "key": key.to_string(),
            "name": name,
            "title": "the Test Subject",
            "tags": ["Fighter"],
            "stats": { "hp": 600.0 },
            "passive": { "name": "Passive", "description": "..." },
            "spells": [],
            "allytips": ["a tip"],
            "skins": []
        })
    }

    fn item(total: i64) -> Value {
        json!({
            "name": "Test Item",
            "description": "",
            "gold": { "base": 0, "total": total, "sell": 0, "purchasable": true },
            "tags": []
        })
    }

    fn items_payload(count: usize, malformed: usize) -> Value {
        let mut data = serde_json::Map::new();
        for i in 0..count {
            data.insert(format!("{}", 1000 + i), item(300 + i as i64));
        }
        for i in 0..malformed {
            // No name: rejected by the normalizer
            data.insert(format!("{}", 9000 + i), json!({ "gold": { "total": 1 } }));
        }
        json!({ "data": Value::Object(data) })
    }

    fn runes_payload() -> Value {
        json!([
            {
                "id": 8100, "key": "Domination", "icon": "d.png", "name": "Domination",
                "slots": [
                    { "runes": [ { "id": 8112, "key": "Electrocute", "icon": "e.png",
                                   "name": "Electrocute", "shortDesc": "", "longDesc": "" } ] }
                ]
            }
        ])
    }

    fn spells_payload() -> Value {
        json!({
            "data": {
                "SummonerFlash": {
                    "key": "4", "name": "Flash", "description": "",
                    "cooldown": [300.0], "summonerLevel": 7, "modes": ["CLASSIC"]
                }
            }
        })
    }

    fn full_upstream(version: &str) -> StubUpstream {
        StubUpstream::new(version)
            .with_payload(
                EntityKind::Champions,
                json!({ "data": { "Aatrox": champion(266, "Aatrox") } }),
            )
            .with_payload(EntityKind::Items, items_payload(3, 0))
            .with_payload(EntityKind::Runes, runes_payload())
            .with_payload(EntityKind::SummonerSpells, spells_payload())
    }

    fn engine<A: DataDragonApi + 'static>(
        api: A,
        store: Arc<MemoryStore>,
    ) -> Arc<SyncEngine<A, MemoryStore>> {
        Arc::new(SyncEngine::new(Arc::new(api), store, Arc::new(TokioExecutor)))
    }

    #[tokio::test]
    async fn first_sync_writes_and_moves_the_marker() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(full_upstream("13.10.1"), Arc::clone(&store));

        let report = engine.sync_one(EntityKind::Items, false, false).await;

        assert_eq!(report.status, SyncStatus::Success);
        assert_eq!(report.previous_version, None);
        assert_eq!(report.current_version.as_deref(), Some("13.10.1"));
        assert_eq!(report.upsert.unwrap().inserted, 3);

        let marker = store
            .version_marker(EntityKind::Items)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(marker.current_version, "13.10.1");
    }

    #[tokio::test]
    async fn second_sync_at_same_version_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(full_upstream("13.10.1"), Arc::clone(&store));

        engine.sync_one(EntityKind::Items, false, false).await;
        let report = engine.sync_one(EntityKind::Items, false, false).await;

        assert_eq!(report.status, SyncStatus::Skipped);
        assert_eq!(report.previous_version.as_deref(), Some("13.10.1"));
        assert_eq!(report.current_version.as_deref(), Some("13.10.1"));
    }

    #[tokio::test]
    async fn forced_resync_of_identical_data_touches_nothing() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(full_upstream("13.10.1"), Arc::clone(&store));

        engine.sync_one(EntityKind::Items, false, false).await;
        let report = engine.sync_one(EntityKind::Items, true, false).await;

        assert_eq!(report.status, SyncStatus::Success);
        assert!(report.upsert.unwrap().is_noop());
    }

    #[tokio::test]
    async fn malformed_records_are_counted_but_do_not_abort() {
        let store = Arc::new(MemoryStore::new());
        let upstream =
            StubUpstream::new("13.10.1").with_payload(EntityKind::Items, items_payload(4, 2));
        let engine = engine(upstream, Arc::clone(&store));

        let report = engine.sync_one(EntityKind::Items, false, false).await;

        assert_eq!(report.status, SyncStatus::Success);
        assert_eq!(report.failed_records, 2);
        assert_eq!(store.items().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn batch_where_everything_fails_is_a_kind_failure() {
        let store = Arc::new(MemoryStore::new());
        let upstream =
            StubUpstream::new("13.10.1").with_payload(EntityKind::Items, items_payload(0, 3));
        let engine = engine(upstream, Arc::clone(&store));

        let report = engine.sync_one(EntityKind::Items, false, false).await;

        assert_eq!(report.status, SyncStatus::Failed);
        assert!(store.version_marker(EntityKind::Items).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sync_all_isolates_a_failing_kind() {
        let store = Arc::new(MemoryStore::new());
        // Items payload missing: that kind fails, the others succeed
        let upstream = StubUpstream::new("13.10.1")
            .with_payload(
                EntityKind::Champions,
                json!({ "data": { "Aatrox": champion(266, "Aatrox") } }),
            )
            .with_payload(EntityKind::Runes, runes_payload())
            .with_payload(EntityKind::SummonerSpells, spells_payload());
        let engine = engine(upstream, Arc::clone(&store));

        let report = engine.sync_all(false, false).await;

        assert_eq!(report.status, SyncStatus::PartialFailure);
        assert_eq!(report.details.len(), 4);

        let items = report
            .details
            .iter()
            .find(|r| r.entity_type == "items")
            .unwrap();
        assert_eq!(items.status, SyncStatus::Failed);

        let champions = report
            .details
            .iter()
            .find(|r| r.entity_type == "champions")
            .unwrap();
        assert_eq!(champions.status, SyncStatus::Success);
        assert!(store.champion("Aatrox").await.unwrap().is_some());
        assert!(store
            .version_marker(EntityKind::Champions)
            .await
            .unwrap()
            .is_some());
        assert!(store.version_marker(EntityKind::Items).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sync_all_twice_is_fully_skipped() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(full_upstream("13.10.1"), Arc::clone(&store));

        let first = engine.sync_all(false, false).await;
        assert_eq!(first.status, SyncStatus::Success);

        let second = engine.sync_all(false, false).await;
        assert_eq!(second.status, SyncStatus::Skipped);
    }

    #[tokio::test]
    async fn background_sync_returns_scheduled_and_completes() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(full_upstream("13.10.1"), Arc::clone(&store));

        let report = engine.sync_one(EntityKind::Runes, false, true).await;
        assert_eq!(report.status, SyncStatus::Scheduled);

        // Fire-and-forget: give the spawned task a moment to land
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.rune_paths().await.unwrap().len(), 1);
        assert!(store.version_marker(EntityKind::Runes).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn version_bump_syncs_again_with_previous_version_reported() {
        let store = Arc::new(MemoryStore::new());

        let engine_v1 = engine(full_upstream("13.9.1"), Arc::clone(&store));
        engine_v1.sync_one(EntityKind::Items, false, false).await;

        // Upstream moves on; two records now malformed
        let upstream =
            StubUpstream::new("13.10.1").with_payload(EntityKind::Items, items_payload(4, 2));
        let engine_v2 = engine(upstream, Arc::clone(&store));

        let report = engine_v2.sync_one(EntityKind::Items, false, false).await;

        assert_eq!(report.status, SyncStatus::Success);
        assert_eq!(report.previous_version.as_deref(), Some("13.9.1"));
        assert_eq!(report.current_version.as_deref(), Some("13.10.1"));
        assert_eq!(report.failed_records, 2);

        let marker = store
            .version_marker(EntityKind::Items)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(marker.current_version, "13.10.1");
    }

    #[tokio::test]
    async fn unresolvable_version_fails_the_whole_aggregate() {
        struct NoVersions;

        #[async_trait]
        impl DataDragonApi for NoVersions {
            async fn versions(&self) -> Result<Vec<String>> {
                Err(DragonholdError::UpstreamUnavailable("down".to_string()))
            }

            async fn fetch(&self, _: EntityKind, _: &str) -> Result<Value> {
                unreachable!()
            }
        }

        let engine = engine(NoVersions, Arc::new(MemoryStore::new()));
        let report = engine.sync_all(false, false).await;

        assert_eq!(report.status, SyncStatus::Failed);
        assert!(report.details.is_empty());
    }
}
