//! Champion read routes.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::model::ChampionRecord;
use crate::routes::error_response;
use crate::server::http::{json_response, not_found_response};
use crate::server::AppState;

/// Listing projection; the full record is behind /champions/{id}
#[derive(Serialize)]
struct ChampionSummary {
    id: String,
    key: i64,
    name: String,
    title: String,
    tags: Vec<String>,
    image_full: String,
}

impl From<&ChampionRecord> for ChampionSummary {
    fn from(record: &ChampionRecord) -> Self {
        Self {
            id: record.external_id.clone(),
            key: record.numeric_key,
            name: record.name.clone(),
            title: record.title.clone(),
            tags: record.tags.clone(),
            image_full: record.image_full.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChampionListResponse {
    champions: Vec<ChampionSummary>,
    total: usize,
}

/// GET /champions
pub async fn list_champions(state: &AppState) -> Response<Full<Bytes>> {
    match state.store.champions().await {
        Ok(mut records) => {
            records.sort_by(|a, b| a.name.cmp(&b.name));
            let champions: Vec<ChampionSummary> =
                records.iter().map(ChampionSummary::from).collect();
            let total = champions.len();

            json_response(StatusCode::OK, &ChampionListResponse { champions, total })
        }
        Err(e) => error_response(&e),
    }
}

/// GET /champions/{id}
pub async fn champion_detail(state: &AppState, external_id: &str) -> Response<Full<Bytes>> {
    match state.store.champion(external_id).await {
        Ok(Some(record)) => json_response(StatusCode::OK, &record),
        Ok(None) => not_found_response(&format!("/champions/{external_id}")),
        Err(e) => error_response(&e),
    }
}
