//! Champion normalizer.
//!
//! Consumes the consolidated `championFull.json` payload: a `data` map of
//! champion id to full record (summary fields, passive, spells, tips,
//! skins). Tip fields go through the prioritized variant lists; spell
//! cooldown/cost/range prefer the per-rank array and fall back to the burn
//! string.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::model::{AbilitySlot, ChampionRatings, ChampionRecord, ChampionSkin};
use crate::normalize::{
    numeric_key, per_rank_values, pick_string_list, require_str, str_or_empty, NormalizedBatch,
    RecordFailure,
};
use crate::types::{DragonholdError, Result};

const ALLY_TIP_KEYS: [&str; 3] = ["allytips", "allyTips", "ally_tips"];
const ENEMY_TIP_KEYS: [&str; 3] = ["enemytips", "enemyTips", "enemy_tips"];
const SPELL_SLOT_KEYS: [&str; 4] = ["Q", "W", "E", "R"];

/// Normalize the whole champion payload, collecting per-record failures
pub fn normalize_payload(payload: &Value) -> Result<NormalizedBatch<ChampionRecord>> {
    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            DragonholdError::MalformedUpstreamData(
                "champion payload has no 'data' object".to_string(),
            )
        })?;

    let mut batch = NormalizedBatch::new();

    for (champion_id, raw) in data {
        match normalize_champion(champion_id, raw) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                warn!(champion = %champion_id, reason = %reason, "Champion rejected");
                batch.failed.push(RecordFailure {
                    record_id: champion_id.clone(),
                    reason,
                });
            }
        }
    }

    Ok(batch)
}

/// Normalize one champion record
pub fn normalize_champion(champion_id: &str, raw: &Value) -> std::result::Result<ChampionRecord, String> {
    if !raw.is_object() {
        return Err("champion entry is not an object".to_string());
    }

    let name = require_str(raw, "name")?;
    let numeric_key = numeric_key(raw.get("key"))
        .ok_or_else(|| "missing or non-numeric 'key'".to_string())?;

    let ratings = raw
        .get("info")
        .map(|info| ChampionRatings {
            attack: info.get("attack").and_then(Value::as_i64).unwrap_or(0),
            defense: info.get("defense").and_then(Value::as_i64).unwrap_or(0),
            magic: info.get("magic").and_then(Value::as_i64).unwrap_or(0),
            difficulty: info.get("difficulty").and_then(Value::as_i64).unwrap_or(0),
        })
        .unwrap_or_default();

    let base_stats: BTreeMap<String, f64> = raw
        .get("stats")
        .and_then(Value::as_object)
        .map(|stats| {
            stats
                .iter()
                .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                .collect()
        })
        .unwrap_or_default();

    Ok(ChampionRecord {
        external_id: champion_id.to_string(),
        numeric_key,
        name,
        title: str_or_empty(raw, "title"),
        blurb: str_or_empty(raw, "blurb"),
        lore: str_or_empty(raw, "lore"),
        partype: str_or_empty(raw, "partype"),
        tags: pick_string_list(raw, &["tags"]),
        ratings,
        base_stats,
        ability_slots: ability_slots(raw),
        ally_tips: pick_string_list(raw, &ALLY_TIP_KEYS),
        enemy_tips: pick_string_list(raw, &ENEMY_TIP_KEYS),
        skins: skins(raw),
        image_full: raw
            .get("image")
            .map(|image| str_or_empty(image, "full"))
            .unwrap_or_default(),
    })
}

/// Passive first, then the first four spells as Q/W/E/R
fn ability_slots(raw: &Value) -> Vec<AbilitySlot> {
    let mut slots = Vec::with_capacity(5);

    if let Some(passive) = raw.get("passive") {
        slots.push(AbilitySlot {
            slot_key: "P".to_string(),
            name: str_or_empty(passive, "name"),
            description: str_or_empty(passive, "description"),
            cooldowns: Vec::new(),
            costs: Vec::new(),
            ranges: Vec::new(),
        });
    }

    let spells = raw
        .get("spells")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (spell, slot_key) in spells.iter().zip(SPELL_SLOT_KEYS) {
        slots.push(AbilitySlot {
            slot_key: slot_key.to_string(),
            name: str_or_empty(spell, "name"),
            description: str_or_empty(spell, "description"),
            cooldowns: per_rank_values(spell.get("cooldown"), spell.get("cooldownBurn")),
            costs: per_rank_values(spell.get("cost"), spell.get("costBurn")),
            ranges: per_rank_values(spell.get("range"), spell.get("rangeBurn")),
        });
    }

    slots
}

fn skins(raw: &Value) -> Vec<ChampionSkin> {
    raw.get("skins")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|skin| {
                    Some(ChampionSkin {
                        skin_index: skin.get("num")?.as_i64()?,
                        name: str_or_empty(skin, "name"),
                        has_chromas: skin.get("chromas").and_then(Value::as_bool).unwrap_or(false),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
