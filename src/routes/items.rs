//! Item read routes: tier-grouped listing, detail, and the recipe tree.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::model::{ItemGold, ItemRecord, Tier};
use crate::routes::error_response;
use crate::server::http::{bad_request_response, json_response, not_found_response};
use crate::server::AppState;

const MAX_PAGE_SIZE: usize = 100;
const MAX_RECIPE_DEPTH: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ItemsQuery {
    pub tag: Option<String>,
    pub purchasable_only: bool,
    pub limit: usize,
    pub page: usize,
}

impl Default for ItemsQuery {
    fn default() -> Self {
        Self {
            tag: None,
            purchasable_only: false,
            limit: 20,
            page: 1,
        }
    }
}

impl ItemsQuery {
    fn clamped(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self.page = self.page.max(1);
        self
    }
}

/// Listing projection
#[derive(Serialize)]
struct ItemSummary {
    id: String,
    name: String,
    plaintext: String,
    tier: Tier,
    gold: ItemGold,
    tags: Vec<String>,
    image_full: String,
}

impl From<&ItemRecord> for ItemSummary {
    fn from(record: &ItemRecord) -> Self {
        Self {
            id: record.external_id.clone(),
            name: record.name.clone(),
            plaintext: record.plaintext.clone(),
            tier: record.tier,
            gold: record.gold.clone(),
            tags: record.tags.clone(),
            image_full: record.image_full.clone(),
        }
    }
}

#[derive(Serialize)]
struct ItemTierGroup {
    tier: Tier,
    items: Vec<ItemSummary>,
}

#[derive(Serialize)]
struct ItemListResponse {
    tiers: Vec<ItemTierGroup>,
    total: usize,
    page: usize,
    limit: usize,
}

/// Filter, paginate and group one page of items by tier
fn project_items(records: &[ItemRecord], query: &ItemsQuery) -> ItemListResponse {
    let mut filtered: Vec<&ItemRecord> = records
        .iter()
        .filter(|item| {
            query
                .tag
                .as_ref()
                .map(|tag| item.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
                .unwrap_or(true)
        })
        .filter(|item| !query.purchasable_only || item.gold.purchasable)
        .collect();

    filtered.sort_by(|a, b| a.external_id.cmp(&b.external_id));

    let total = filtered.len();
    let offset = (query.page - 1) * query.limit;
    let page: Vec<&ItemRecord> = filtered.into_iter().skip(offset).take(query.limit).collect();

    let mut groups: BTreeMap<Tier, Vec<ItemSummary>> = BTreeMap::new();
    for item in page {
        groups.entry(item.tier).or_default().push(item.into());
    }

    ItemListResponse {
        tiers: groups
            .into_iter()
            .map(|(tier, items)| ItemTierGroup { tier, items })
            .collect(),
        total,
        page: query.page,
        limit: query.limit,
    }
}

/// GET /items?tag&purchasable_only&limit&page
pub async fn list_items(state: &AppState, query: Option<&str>) -> Response<Full<Bytes>> {
    let query: ItemsQuery = match serde_urlencoded::from_str(query.unwrap_or_default()) {
        Ok(query) => query,
        Err(e) => return bad_request_response(&format!("invalid item query: {e}")),
    };
    let query = query.clamped();

    match state.store.items().await {
        Ok(records) => json_response(StatusCode::OK, &project_items(&records, &query)),
        Err(e) => error_response(&e),
    }
}

/// GET /items/{id}
pub async fn item_detail(state: &AppState, external_id: &str) -> Response<Full<Bytes>> {
    match state.store.item(external_id).await {
        Ok(Some(record)) => json_response(StatusCode::OK, &record),
        Ok(None) => not_found_response(&format!("/items/{external_id}")),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecipeQuery {
    pub depth: usize,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self { depth: 2 }
    }
}

/// One node of a recipe tree. An unresolved node is an id the synced batch
/// referenced but never shipped - upstream inconsistency, degraded rather
/// than failed.
#[derive(Serialize)]
struct RecipeNode {
    id: String,
    unresolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    item: Option<ItemSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<RecipeNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    builds_into: Vec<RecipeNode>,
}

fn build_recipe_tree(
    items: &HashMap<&str, &ItemRecord>,
    external_id: &str,
    depth: usize,
) -> RecipeNode {
    let Some(item) = items.get(external_id) else {
        return RecipeNode {
            id: external_id.to_string(),
            unresolved: true,
            item: None,
            components: Vec::new(),
            builds_into: Vec::new(),
        };
    };

    let (components, builds_into) = if depth == 0 {
        (Vec::new(), Vec::new())
    } else {
        (
            item.build_from
                .iter()
                .map(|id| build_recipe_tree(items, id, depth - 1))
                .collect(),
            item.build_into
                .iter()
                .map(|id| build_recipe_tree(items, id, depth - 1))
                .collect(),
        )
    };

    RecipeNode {
        id: external_id.to_string(),
        unresolved: false,
        item: Some((*item).into()),
        components,
        builds_into,
    }
}

/// GET /items/{id}/recipe?depth
pub async fn item_recipe(
    state: &AppState,
    external_id: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let query: RecipeQuery = match serde_urlencoded::from_str(query.unwrap_or_default()) {
        Ok(query) => query,
        Err(e) => return bad_request_response(&format!("invalid recipe query: {e}")),
    };
    let depth = query.depth.clamp(1, MAX_RECIPE_DEPTH);

    let records = match state.store.items().await {
        Ok(records) => records,
        Err(e) => return error_response(&e),
    };

    let by_id: HashMap<&str, &ItemRecord> = records
        .iter()
        .map(|item| (item.external_id.as_str(), item))
        .collect();

    if !by_id.contains_key(external_id) {
        return not_found_response(&format!("/items/{external_id}/recipe"));
    }

    let tree = build_recipe_tree(&by_id, external_id, depth);
    json_response(StatusCode::OK, &tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn item(id: &str, tier: Tier, tags: &[&str], purchasable: bool) -> ItemRecord {
        ItemRecord {
            external_id: id.to_string(),
            name: format!("Item {id}"),
            description: String::new(),
            plaintext: String::new(),
            tier,
            gold: ItemGold {
                base: 0,
                total: 0,
                sell: 0,
                purchasable,
            },
            stat_modifiers: Map::new(),
            build_from: Vec::new(),
            build_into: Vec::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            maps: Map::new(),
            consumed: false,
            in_store: true,
            hide_from_all: false,
            required_champion: None,
            image_full: String::new(),
        }
    }

    #[test]
    fn query_parsing_fills_defaults() {
        let query: ItemsQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(query.limit, 20);
        assert_eq!(query.page, 1);
        assert!(query.tag.is_none());

        let query: ItemsQuery =
            serde_urlencoded::from_str("tag=Armor&purchasable_only=true&limit=50&page=2").unwrap();
        assert_eq!(query.tag.as_deref(), Some("Armor"));
        assert!(query.purchasable_only);
        assert_eq!(query.limit, 50);
        assert_eq!(query.page, 2);
    }

    #[test]
    fn clamping_bounds_limit_and_page() {
        let query = ItemsQuery {
            limit: 10_000,
            page: 0,
            ..ItemsQuery::default()
        }
        .clamped();
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn projection_filters_by_tag_and_purchasable() {
        let records = vec![
            item("1001", Tier::Basic, &["Armor"], true),
            item("1002", Tier::Basic, &["Damage"], true),
            item("1003", Tier::Basic, &["Armor"], false),
        ];

        let query = ItemsQuery {
            tag: Some("Armor".to_string()),
            purchasable_only: true,
            ..ItemsQuery::default()
        };
        let response = project_items(&records, &query);

        assert_eq!(response.total, 1);
        assert_eq!(response.tiers[0].items[0].id, "1001");
    }

    #[test]
    fn projection_groups_by_tier_in_order() {
        let records = vec![
            item("3001", Tier::Mythic, &[], true),
            item("1001", Tier::Starter, &[], true),
            item("2001", Tier::Legendary, &[], true),
        ];

        let response = project_items(&records, &ItemsQuery::default());
        let tiers: Vec<Tier> = response.tiers.iter().map(|g| g.tier).collect();
        assert_eq!(tiers, vec![Tier::Starter, Tier::Legendary, Tier::Mythic]);
    }

    #[test]
    fn pagination_windows_the_sorted_ids() {
        let records: Vec<ItemRecord> = (0..30)
            .map(|i| item(&format!("{}", 1000 + i), Tier::Basic, &[], true))
            .collect();

        let query = ItemsQuery {
            limit: 10,
            page: 2,
            ..ItemsQuery::default()
        };
        let response = project_items(&records, &query);

        assert_eq!(response.total, 30);
        let ids: Vec<&str> = response.tiers[0]
            .items
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids.first(), Some(&"1010"));
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn recipe_tree_marks_dangling_references() {
        let mut sword = item("3031", Tier::Mythic, &[], true);
        sword.build_from = vec!["1036".to_string(), "9999".to_string()];
        let component = item("1036", Tier::Basic, &[], true);

        let records = vec![sword, component];
        let by_id: HashMap<&str, &ItemRecord> = records
            .iter()
            .map(|item| (item.external_id.as_str(), item))
            .collect();

        let tree = build_recipe_tree(&by_id, "3031", 2);

        assert!(!tree.unresolved);
        assert_eq!(tree.components.len(), 2);
        assert!(!tree.components[0].unresolved);
        assert!(tree.components[1].unresolved);
        assert_eq!(tree.components[1].id, "9999");
    }

    #[test]
    fn recipe_depth_bounds_recursion() {
        let mut a = item("1", Tier::Epic, &[], true);
        a.build_from = vec!["2".to_string()];
        let mut b = item("2", Tier::Basic, &[], true);
        b.build_from = vec!["3".to_string()];
        let c = item("3", Tier::Basic, &[], true);

        let records = vec![a, b, c];
        let by_id: HashMap<&str, &ItemRecord> = records
            .iter()
            .map(|item| (item.external_id.as_str(), item))
            .collect();

        let tree = build_recipe_tree(&by_id, "1", 1);
        assert_eq!(tree.components.len(), 1);
        assert!(tree.components[0].components.is_empty());
    }
}
