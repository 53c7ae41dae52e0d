//! Status reporting: what version is live vs latest, without syncing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ddragon::{version::update_available, DataDragonApi, VersionResolver};
use crate::model::EntityKind;
use crate::store::GameStore;
use crate::types::Result;

/// Freshness of one entity kind
#[derive(Debug, Clone, Serialize)]
pub struct EntityStatus {
    pub current_version: Option<String>,
    pub latest_version: String,
    pub update_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Full status answer for GET /sync/status
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatusResponse {
    pub latest_version: String,
    pub status: BTreeMap<String, EntityStatus>,
}

/// Read-only reporter over version markers and the upstream version list.
///
/// Never fetches payloads and never writes; safe to call from any route.
pub struct StatusReporter<A: DataDragonApi + ?Sized, S: GameStore + ?Sized> {
    api: Arc<A>,
    store: Arc<S>,
}

impl<A: DataDragonApi + ?Sized, S: GameStore + ?Sized> StatusReporter<A, S> {
    pub fn new(api: Arc<A>, store: Arc<S>) -> Self {
        Self { api, store }
    }

    pub async fn status(&self) -> Result<SyncStatusResponse> {
        let latest = VersionResolver::new(Arc::clone(&self.api))
            .latest_version()
            .await?;

        let mut status = BTreeMap::new();

        for kind in EntityKind::ALL {
            let marker = self.store.version_marker(kind).await?;

            status.insert(
                kind.as_str().to_string(),
                EntityStatus {
                    current_version: marker.as_ref().map(|m| m.current_version.clone()),
                    latest_version: latest.clone(),
                    update_available: update_available(marker.as_ref(), &latest),
                    last_synced_at: marker.map(|m| m.last_synced_at),
                },
            );
        }

        Ok(SyncStatusResponse {
            latest_version: latest,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VersionMarker;
    use crate::store::MemoryStore;
    use crate::types::{DragonholdError, Result};
    use async_trait::async_trait;
    use serde_json::Value;

    struct FixedVersions(Vec<String>);

    #[async_trait]
    impl DataDragonApi for FixedVersions {
        async fn versions(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }

        async fn fetch(&self, _: EntityKind, _: &str) -> Result<Value> {
            Err(DragonholdError::UpstreamUnavailable(
                "status reporter must never fetch".to_string(),
            ))
        }
    }

    #[tokio::test]
    async fn unsynced_kinds_report_update_available() {
        let store = Arc::new(MemoryStore::new());
        let reporter = StatusReporter::new(
            Arc::new(FixedVersions(vec!["13.10.1".to_string()])),
            store,
        );

        let response = reporter.status().await.unwrap();

        assert_eq!(response.latest_version, "13.10.1");
        assert_eq!(response.status.len(), 4);
        for entity in response.status.values() {
            assert!(entity.update_available);
            assert!(entity.current_version.is_none());
        }
    }

    #[tokio::test]
    async fn synced_kind_reports_current() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_version_marker(VersionMarker {
                entity_kind: EntityKind::Items,
                current_version: "13.10.1".to_string(),
                last_synced_at: Utc::now(),
            })
            .await
            .unwrap();

        let reporter = StatusReporter::new(
            Arc::new(FixedVersions(vec!["13.10.1".to_string()])),
            store,
        );

        let response = reporter.status().await.unwrap();
        let items = &response.status["items"];

        assert!(!items.update_available);
        assert_eq!(items.current_version.as_deref(), Some("13.10.1"));

        let champions = &response.status["champions"];
        assert!(champions.update_available);
    }

    #[tokio::test]
    async fn stale_kind_reports_update_available() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_version_marker(VersionMarker {
                entity_kind: EntityKind::Runes,
                current_version: "13.9.1".to_string(),
                last_synced_at: Utc::now(),
            })
            .await
            .unwrap();

        let reporter = StatusReporter::new(
            Arc::new(FixedVersions(vec!["13.10.1".to_string()])),
            store,
        );

        let response = reporter.status().await.unwrap();
        let runes = &response.status["runes"];

        assert!(runes.update_available);
        assert_eq!(runes.current_version.as_deref(), Some("13.9.1"));
    }
}
