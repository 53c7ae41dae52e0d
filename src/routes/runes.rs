//! Rune read routes: full tree, single path, and search.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::model::{EntityKind, RunePathRecord, RuneRecord};
use crate::routes::error_response;
use crate::server::http::{bad_request_response, json_response, not_found_response};
use crate::server::AppState;

const SEARCH_LIMIT: usize = 50;
const MIN_QUERY_LEN: usize = 2;

#[derive(Serialize)]
struct RuneTreeResponse {
    paths: Vec<RunePathRecord>,
    version: String,
}

/// GET /runes
pub async fn rune_tree(state: &AppState) -> Response<Full<Bytes>> {
    let version = match state.store.version_marker(EntityKind::Runes).await {
        Ok(marker) => marker
            .map(|m| m.current_version)
            .unwrap_or_else(|| "unknown".to_string()),
        Err(e) => return error_response(&e),
    };

    match state.store.rune_paths().await {
        Ok(mut paths) => {
            paths.sort_by_key(|p| p.external_id);
            json_response(StatusCode::OK, &RuneTreeResponse { paths, version })
        }
        Err(e) => error_response(&e),
    }
}

/// GET /runes/paths/{id}
pub async fn rune_path_detail(state: &AppState, raw_id: &str) -> Response<Full<Bytes>> {
    let Ok(path_id) = raw_id.parse::<i64>() else {
        return bad_request_response(&format!("'{raw_id}' is not a numeric rune path id"));
    };

    match state.store.rune_path(path_id).await {
        Ok(Some(path)) => json_response(StatusCode::OK, &path),
        Ok(None) => not_found_response(&format!("/runes/paths/{path_id}")),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuneSearchQuery {
    pub query: String,
    pub path_key: Option<String>,
}

/// Case-insensitive match over name and both description fields
fn rune_matches(rune: &RuneRecord, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    rune.name.to_lowercase().contains(&needle)
        || rune.short_desc.to_lowercase().contains(&needle)
        || rune.long_desc.to_lowercase().contains(&needle)
}

fn search(paths: &[RunePathRecord], query: &RuneSearchQuery) -> Vec<RuneRecord> {
    paths
        .iter()
        .filter(|path| {
            query
                .path_key
                .as_ref()
                .map(|key| path.key.eq_ignore_ascii_case(key))
                .unwrap_or(true)
        })
        .flat_map(|path| path.slots.iter())
        .flat_map(|slot| slot.runes.iter())
        .filter(|rune| rune_matches(rune, &query.query))
        .take(SEARCH_LIMIT)
        .cloned()
        .collect()
}

/// GET /runes/search?query&path_key
pub async fn search_runes(state: &AppState, raw_query: Option<&str>) -> Response<Full<Bytes>> {
    let query: RuneSearchQuery = match serde_urlencoded::from_str(raw_query.unwrap_or_default()) {
        Ok(query) => query,
        Err(e) => return bad_request_response(&format!("invalid rune search query: {e}")),
    };

    if query.query.len() < MIN_QUERY_LEN {
        return bad_request_response("search query must be at least 2 characters");
    }

    match state.store.rune_paths().await {
        Ok(paths) => json_response(StatusCode::OK, &search(&paths, &query)),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RuneSlot;

    fn rune(id: i64, key: &str, name: &str, path_id: i64, slot: i64) -> RuneRecord {
        RuneRecord {
            external_id: id,
            key: key.to_string(),
            name: name.to_string(),
            short_desc: format!("{name} deals adaptive damage"),
            long_desc: String::new(),
            icon_path: String::new(),
            owning_path_id: path_id,
            slot_index: slot,
        }
    }

    fn paths() -> Vec<RunePathRecord> {
        vec![
            RunePathRecord {
                external_id: 8100,
                key: "Domination".to_string(),
                name: "Domination".to_string(),
                icon_path: String::new(),
                slots: vec![RuneSlot {
                    slot_index: 0,
                    runes: vec![
                        rune(8112, "Electrocute", "Electrocute", 8100, 0),
                        rune(8128, "DarkHarvest", "Dark Harvest", 8100, 0),
                    ],
                }],
            },
            RunePathRecord {
                external_id: 8200,
                key: "Sorcery".to_string(),
                name: "Sorcery".to_string(),
                icon_path: String::new(),
                slots: vec![RuneSlot {
                    slot_index: 0,
                    runes: vec![rune(8214, "SummonAery", "Summon Aery", 8200, 0)],
                }],
            },
        ]
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let query = RuneSearchQuery {
            query: "electro".to_string(),
            path_key: None,
        };
        let results = search(&paths(), &query);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "Electrocute");
    }

    #[test]
    fn search_matches_descriptions_too() {
        let query = RuneSearchQuery {
            query: "adaptive damage".to_string(),
            path_key: None,
        };
        let results = search(&paths(), &query);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn path_key_filter_narrows_results() {
        let query = RuneSearchQuery {
            query: "adaptive".to_string(),
            path_key: Some("sorcery".to_string()),
        };
        let results = search(&paths(), &query);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].owning_path_id, 8200);
    }

    #[test]
    fn no_match_returns_empty() {
        let query = RuneSearchQuery {
            query: "glacial".to_string(),
            path_key: None,
        };
        assert!(search(&paths(), &query).is_empty());
    }
}
