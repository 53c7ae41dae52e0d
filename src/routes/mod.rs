//! HTTP route handlers.

pub mod champions;
pub mod health;
pub mod items;
pub mod runes;
pub mod sync;

pub use champions::{champion_detail, list_champions};
pub use health::{health_check, readiness_check, version_info};
pub use items::{item_detail, item_recipe, list_items};
pub use runes::{rune_path_detail, rune_tree, search_runes};
pub use sync::{sync_all, sync_kind, sync_status};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use crate::server::http::json_response;
use crate::types::DragonholdError;

/// Map a service error onto an HTTP response.
///
/// Upstream-facing failures surface as 502 so callers can tell "the mirror
/// is broken" from "the CDN is broken"; everything else is a plain 500.
pub(crate) fn error_response(error: &DragonholdError) -> Response<Full<Bytes>> {
    let status = match error {
        DragonholdError::UpstreamUnavailable(_)
        | DragonholdError::VersionNotFound { .. }
        | DragonholdError::MalformedUpstreamData(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    json_response(
        status,
        &serde_json::json!({
            "error": error.to_string(),
        }),
    )
}
