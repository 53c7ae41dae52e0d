//! Rune normalizer: flattens the path -> slot -> rune tree.
//!
//! Order is semantically meaningful: slot 0 is the keystone row, and in-slot
//! rune order is the display order. Slot position comes from an explicit
//! slot index field when the payload carries one, falling back to array
//! position, so a reordered upstream array still lands keystones in slot 0.

use serde_json::Value;
use tracing::warn;

use crate::model::{RunePathRecord, RuneRecord, RuneSlot};
use crate::normalize::{str_or_empty, NormalizedBatch, RecordFailure};
use crate::types::{DragonholdError, Result};

const SLOT_INDEX_KEYS: [&str; 2] = ["slotNumber", "slot_number"];

/// Normalize the rune payload (a top-level array of paths)
pub fn normalize_payload(payload: &Value) -> Result<NormalizedBatch<RunePathRecord>> {
    let paths = payload.as_array().ok_or_else(|| {
        DragonholdError::MalformedUpstreamData("rune payload is not an array".to_string())
    })?;

    let mut batch = NormalizedBatch::new();

    for (position, raw) in paths.iter().enumerate() {
        let fallback_id = raw
            .get("id")
            .map(|id| id.to_string())
            .unwrap_or_else(|| format!("path[{position}]"));

        match normalize_path(raw) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                warn!(path = %fallback_id, reason = %reason, "Rune path rejected");
                batch.failed.push(RecordFailure {
                    record_id: fallback_id,
                    reason,
                });
            }
        }
    }

    Ok(batch)
}

/// Normalize one rune path with its slots and runes
pub fn normalize_path(raw: &Value) -> std::result::Result<RunePathRecord, String> {
    let path_id = raw
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| "missing numeric 'id'".to_string())?;

    let raw_slots = raw
        .get("slots")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing 'slots' array".to_string())?;

    let mut slots: Vec<RuneSlot> = Vec::with_capacity(raw_slots.len());

    for (position, raw_slot) in raw_slots.iter().enumerate() {
        // Explicit index wins over array position so upstream reordering
        // cannot displace the keystone row
        let slot_index = SLOT_INDEX_KEYS
            .iter()
            .find_map(|key| raw_slot.get(*key).and_then(Value::as_i64))
            .unwrap_or(position as i64);

        let runes = raw_slot
            .get("runes")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|rune| normalize_rune(rune, path_id, slot_index))
                    .collect()
            })
            .unwrap_or_default();

        slots.push(RuneSlot { slot_index, runes });
    }

    slots.sort_by_key(|slot| slot.slot_index);

    Ok(RunePathRecord {
        external_id: path_id,
        key: str_or_empty(raw, "key"),
        name: str_or_empty(raw, "name"),
        icon_path: str_or_empty(raw, "icon"),
        slots,
    })
}

fn normalize_rune(raw: &Value, path_id: i64, slot_index: i64) -> Option<RuneRecord> {
    Some(RuneRecord {
        external_id: raw.get("id")?.as_i64()?,
        key: str_or_empty(raw, "key"),
        name: str_or_empty(raw, "name"),
        short_desc: str_or_empty(raw, "shortDesc"),
        long_desc: str_or_empty(raw, "longDesc"),
        icon_path: str_or_empty(raw, "icon"),
        owning_path_id: path_id,
        slot_index,
    })
}
