//! Item normalizer and tier derivation.
//!
//! Upstream does not carry a reliable tier field, so tier falls out of a
//! cascade: explicit field when recognized, gold inference otherwise, with
//! a description keyword scan as the last-resort override. The override can
//! only promote a tier (a "Mythic passive" blurb on a cheap component must
//! not demote anything).

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::warn;

use crate::model::{ItemGold, ItemRecord, Tier};
use crate::normalize::{pick_string_list, require_str, str_or_empty, NormalizedBatch, RecordFailure};
use crate::types::{DragonholdError, Result};

/// Normalize the whole item payload, collecting per-record failures.
///
/// After the per-record pass, build references are checked across the batch:
/// a `build_from`/`build_into` id with no matching item is upstream
/// inconsistency - logged, kept as-is, never fatal (the recipe route
/// degrades it to a placeholder).
pub fn normalize_payload(payload: &Value) -> Result<NormalizedBatch<ItemRecord>> {
    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            DragonholdError::MalformedUpstreamData("item payload has no 'data' object".to_string())
        })?;

    let mut batch = NormalizedBatch::new();

    for (item_id, raw) in data {
        match normalize_item(item_id, raw) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                warn!(item = %item_id, reason = %reason, "Item rejected");
                batch.failed.push(RecordFailure {
                    record_id: item_id.clone(),
                    reason,
                });
            }
        }
    }

    log_dangling_references(&batch.records);

    Ok(batch)
}

/// Normalize one item record
pub fn normalize_item(item_id: &str, raw: &Value) -> std::result::Result<ItemRecord, String> {
    if !raw.is_object() {
        return Err("item entry is not an object".to_string());
    }

    let name = require_str(raw, "name")?;
    let description = str_or_empty(raw, "description");
    let gold = gold(raw);

    let stat_modifiers: BTreeMap<String, f64> = raw
        .get("stats")
        .and_then(Value::as_object)
        .map(|stats| {
            stats
                .iter()
                .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                .collect()
        })
        .unwrap_or_default();

    let maps: BTreeMap<String, bool> = raw
        .get("maps")
        .and_then(Value::as_object)
        .map(|maps| {
            maps.iter()
                .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                .collect()
        })
        .unwrap_or_default();

    let tier = derive_tier(raw, &gold, &description);

    Ok(ItemRecord {
        external_id: item_id.to_string(),
        name,
        description,
        plaintext: str_or_empty(raw, "plaintext"),
        tier,
        gold,
        stat_modifiers,
        build_from: pick_string_list(raw, &["from"]),
        build_into: pick_string_list(raw, &["into"]),
        tags: pick_string_list(raw, &["tags"]),
        maps,
        consumed: raw.get("consumed").and_then(Value::as_bool).unwrap_or(false),
        in_store: raw.get("inStore").and_then(Value::as_bool).unwrap_or(true),
        hide_from_all: raw
            .get("hideFromAll")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        required_champion: raw
            .get("requiredChampion")
            .and_then(Value::as_str)
            .map(str::to_string),
        image_full: raw
            .get("image")
            .map(|image| str_or_empty(image, "full"))
            .unwrap_or_default(),
    })
}

fn gold(raw: &Value) -> ItemGold {
    raw.get("gold")
        .map(|gold| ItemGold {
            base: gold.get("base").and_then(Value::as_i64).unwrap_or(0),
            total: gold.get("total").and_then(Value::as_i64).unwrap_or(0),
            sell: gold.get("sell").and_then(Value::as_i64).unwrap_or(0),
            purchasable: gold
                .get("purchasable")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
        .unwrap_or_default()
}

/// Tier cascade: explicit field, gold inference, keyword override (upward only)
fn derive_tier(raw: &Value, gold: &ItemGold, description: &str) -> Tier {
    if let Some(explicit) = raw
        .get("tier")
        .and_then(Value::as_str)
        .and_then(Tier::parse)
    {
        return explicit;
    }

    let inferred = if gold.total <= 500 && gold.purchasable {
        Tier::Starter
    } else if gold.total >= 3000 {
        Tier::Mythic
    } else if gold.total >= 2000 {
        Tier::Legendary
    } else if gold.total >= 1000 {
        Tier::Epic
    } else {
        Tier::Basic
    };

    let lowered = description.to_ascii_lowercase();
    let keyword = if lowered.contains("mythic") {
        Some(Tier::Mythic)
    } else if lowered.contains("legendary") {
        Some(Tier::Legendary)
    } else {
        None
    };

    match keyword {
        Some(promoted) if promoted > inferred => promoted,
        _ => inferred,
    }
}

fn log_dangling_references(records: &[ItemRecord]) {
    let known: BTreeSet<&str> = records.iter().map(|r| r.external_id.as_str()).collect();

    for record in records {
        for reference in record.build_from.iter().chain(&record.build_into) {
            if !known.contains(reference.as_str()) {
                warn!(
                    item = %record.external_id,
                    reference = %reference,
                    "Build reference does not resolve within this batch"
                );
            }
        }
    }
}
