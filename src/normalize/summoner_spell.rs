//! Summoner spell normalizer.

use serde_json::Value;
use tracing::warn;

use crate::model::SummonerSpellRecord;
use crate::normalize::{
    numeric_key, per_rank_values, pick_string_list, require_str, str_or_empty, NormalizedBatch,
    RecordFailure,
};
use crate::types::{DragonholdError, Result};

/// Normalize the summoner spell payload, collecting per-record failures
pub fn normalize_payload(payload: &Value) -> Result<NormalizedBatch<SummonerSpellRecord>> {
    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            DragonholdError::MalformedUpstreamData(
                "summoner spell payload has no 'data' object".to_string(),
            )
        })?;

    let mut batch = NormalizedBatch::new();

    for (spell_id, raw) in data {
        match normalize_spell(spell_id, raw) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                warn!(spell = %spell_id, reason = %reason, "Summoner spell rejected");
                batch.failed.push(RecordFailure {
                    record_id: spell_id.clone(),
                    reason,
                });
            }
        }
    }

    Ok(batch)
}

/// Normalize one summoner spell record
pub fn normalize_spell(
    spell_id: &str,
    raw: &Value,
) -> std::result::Result<SummonerSpellRecord, String> {
    if !raw.is_object() {
        return Err("summoner spell entry is not an object".to_string());
    }

    let name = require_str(raw, "name")?;
    let numeric_key = numeric_key(raw.get("key"))
        .ok_or_else(|| "missing or non-numeric 'key'".to_string())?;

    Ok(SummonerSpellRecord {
        external_id: spell_id.to_string(),
        numeric_key,
        name,
        description: str_or_empty(raw, "description"),
        cooldowns: per_rank_values(raw.get("cooldown"), raw.get("cooldownBurn")),
        summoner_level: raw
            .get("summonerLevel")
            .and_then(Value::as_i64)
            .unwrap_or(1),
        modes: pick_string_list(raw, &["modes"]),
        image_full: raw
            .get("image")
            .map(|image| str_or_empty(image, "full"))
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_flash() {
        let raw = json!({
            "id": "SummonerFlash",
            "key": "4",
            "name": "Flash",
            "description": "Teleports your champion...",
            "cooldown": [300.0],
            "summonerLevel": 7,
            "modes": ["CLASSIC", "ARAM"],
            "image": { "full": "SummonerFlash.png" }
        });

        let record = normalize_spell("SummonerFlash", &raw).unwrap();
        assert_eq!(record.numeric_key, 4);
        assert_eq!(record.cooldowns, vec![300.0]);
        assert_eq!(record.summoner_level, 7);
        assert_eq!(record.modes.len(), 2);
    }

    #[test]
    fn cooldown_burn_fallback_applies() {
        let raw = json!({
            "key": "6",
            "name": "Ghost",
            "cooldownBurn": "210"
        });

        let record = normalize_spell("SummonerHaste", &raw).unwrap();
        assert_eq!(record.cooldowns, vec![210.0]);
    }

    #[test]
    fn nameless_spell_is_rejected() {
        let payload = json!({ "data": { "Bad": { "key": "9" } } });
        let batch = normalize_payload(&payload).unwrap();
        assert!(batch.records.is_empty());
        assert_eq!(batch.failed.len(), 1);
    }
}
