//! Entity normalizers: raw Data Dragon payloads to canonical records.
//!
//! Each normalizer walks the whole payload once and converts one record at a
//! time. A record that cannot be normalized becomes a [`RecordFailure`] in
//! the batch; the remaining records are unaffected. Upstream has shipped
//! inconsistent field names historically, so every ambiguous field goes
//! through [`pick_first_key`] with an explicit, ordered variant list - the
//! resolution order is part of the contract, not an accident.

pub mod champion;
pub mod item;
pub mod rune;
pub mod summoner_spell;

use serde_json::Value;

/// One record the normalizer rejected; the batch carries on without it
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub record_id: String,
    pub reason: String,
}

/// Output of normalizing one payload: surviving records plus counted rejects
#[derive(Debug)]
pub struct NormalizedBatch<T> {
    pub records: Vec<T>,
    pub failed: Vec<RecordFailure>,
}

impl<T> NormalizedBatch<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> Default for NormalizedBatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Look a field up under a prioritized list of key variants.
///
/// Returns the value under the first present variant. Upstream drifts
/// between casings ("allytips" / "allyTips" / "ally_tips"); the caller's
/// variant order decides which wins when several are present.
pub fn pick_first_key<'a>(record: &'a Value, variants: &[&str]) -> Option<&'a Value> {
    variants.iter().find_map(|key| record.get(*key))
}

/// Resolve a string-list field across key variants.
///
/// The first variant holding a non-empty list wins; anything else (absent,
/// empty, wrong type) yields an empty list - never null.
pub fn pick_string_list(record: &Value, variants: &[&str]) -> Vec<String> {
    for key in variants {
        if let Some(Value::Array(entries)) = record.get(*key) {
            let list: Vec<String> = entries
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if !list.is_empty() {
                return list;
            }
        }
    }
    Vec::new()
}

/// Required string field, rejecting absent or empty values
pub fn require_str(record: &Value, key: &str) -> Result<String, String> {
    match record.get(key).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(format!("missing required field '{key}'")),
    }
}

/// Optional string field, defaulting to empty
pub fn str_or_empty(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numeric id that may arrive as a JSON number or a stringified number
pub fn numeric_key(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Per-rank numeric values: array when present, scalar, or a "burn" string.
///
/// The per-rank array is authoritative; the pre-joined burn form
/// ("12/11/10/9/8") is only parsed when no array arrived. Non-numeric burn
/// segments are dropped rather than failing the record.
pub fn per_rank_values(primary: Option<&Value>, burn: Option<&Value>) -> Vec<f64> {
    match primary {
        Some(Value::Array(entries)) if !entries.is_empty() => {
            return entries.iter().filter_map(Value::as_f64).collect();
        }
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_f64() {
                return vec![v];
            }
        }
        _ => {}
    }

    match burn {
        Some(Value::String(s)) if !s.is_empty() => s
            .split('/')
            .filter_map(|part| part.trim().parse::<f64>().ok())
            .collect(),
        _ => Vec::new(),
    }
}
