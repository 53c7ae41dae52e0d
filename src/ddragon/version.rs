//! Version resolution: what is live upstream, and is a sync warranted.

use std::sync::Arc;

use tracing::debug;

use crate::ddragon::client::DataDragonApi;
use crate::model::VersionMarker;
use crate::types::{DragonholdError, Result};

/// Resolves the newest published Data Dragon version
pub struct VersionResolver<A: DataDragonApi + ?Sized> {
    api: Arc<A>,
}

impl<A: DataDragonApi + ?Sized> VersionResolver<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Newest published version string (the version list is newest-first)
    pub async fn latest_version(&self) -> Result<String> {
        let versions = self.api.versions().await?;

        versions.into_iter().next().ok_or_else(|| {
            DragonholdError::UpstreamUnavailable("upstream version list is empty".to_string())
        })
    }
}

/// Pure sync decision: forced, never synced, or behind the latest version.
pub fn needs_sync(marker: Option<&VersionMarker>, latest_version: &str, force: bool) -> bool {
    if force {
        return true;
    }

    let decision = match marker {
        None => true,
        Some(marker) => marker.current_version != latest_version,
    };

    if let Some(marker) = marker {
        debug!(
            entity = %marker.entity_kind,
            current = %marker.current_version,
            latest = %latest_version,
            needs_sync = decision,
            "Sync decision"
        );
    }

    decision
}

/// Convenience used by status reporting: same decision, no force path
pub fn update_available(marker: Option<&VersionMarker>, latest_version: &str) -> bool {
    needs_sync(marker, latest_version, false)
}
