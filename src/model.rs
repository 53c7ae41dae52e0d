//! Canonical record shapes for mirrored game data.
//!
//! Records are the normalized form of Data Dragon payloads: one shape per
//! entity kind, versioned as a whole batch through [`VersionMarker`] (there
//! is no per-record version). `PartialEq` on records is what makes the
//! upsert reconcile idempotent - a record only counts as "updated" when its
//! content actually changed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The unit of independent sync and versioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Champions,
    Items,
    Runes,
    SummonerSpells,
}

impl EntityKind {
    /// Every kind, in the order `sync_all` processes them
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Champions,
        EntityKind::Items,
        EntityKind::Runes,
        EntityKind::SummonerSpells,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Champions => "champions",
            Self::Items => "items",
            Self::Runes => "runes",
            Self::SummonerSpells => "summoner-spells",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "champions" => Ok(Self::Champions),
            "items" => Ok(Self::Items),
            "runes" => Ok(Self::Runes),
            "summoner-spells" => Ok(Self::SummonerSpells),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

/// Per-entity-kind staleness marker, mutated only after a committed write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionMarker {
    pub entity_kind: EntityKind,
    pub current_version: String,
    pub last_synced_at: DateTime<Utc>,
}

/// Records that reconcile by a stable upstream identifier
pub trait ExternalId {
    fn external_id(&self) -> String;
}

// ============================================================================
// Champions
// ============================================================================

/// Attack/defense/magic/difficulty ratings from the champion info block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChampionRatings {
    pub attack: i64,
    pub defense: i64,
    pub magic: i64,
    pub difficulty: i64,
}

/// One ability: the passive or one of Q/W/E/R
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySlot {
    /// "P", "Q", "W", "E" or "R"
    pub slot_key: String,
    pub name: String,
    pub description: String,
    /// Per-rank values; empty for the passive
    pub cooldowns: Vec<f64>,
    pub costs: Vec<f64>,
    pub ranges: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionSkin {
    pub skin_index: i64,
    pub name: String,
    pub has_chromas: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionRecord {
    /// Stable upstream id, e.g. "Aatrox"
    pub external_id: String,
    pub numeric_key: i64,
    pub name: String,
    pub title: String,
    pub blurb: String,
    pub lore: String,
    /// Resource type, e.g. "Blood Well"
    pub partype: String,
    /// Role tags in upstream order, e.g. ["Fighter", "Tank"]
    pub tags: Vec<String>,
    pub ratings: ChampionRatings,
    /// Flat numeric base stats keyed by upstream stat name
    pub base_stats: BTreeMap<String, f64>,
    /// Ordered: passive first, then Q/W/E/R
    pub ability_slots: Vec<AbilitySlot>,
    /// Never null; empty when upstream ships none
    pub ally_tips: Vec<String>,
    pub enemy_tips: Vec<String>,
    pub skins: Vec<ChampionSkin>,
    pub image_full: String,
}

impl ExternalId for ChampionRecord {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }
}

// ============================================================================
// Items
// ============================================================================

/// Coarse item cost category used for UI grouping.
///
/// Ordered cheapest-to-priciest so the description-keyword override can only
/// promote a tier, never demote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Starter,
    Basic,
    Epic,
    Legendary,
    Mythic,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Basic => "basic",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
            Self::Mythic => "mythic",
        }
    }

    /// Parse an explicit upstream tier field; unrecognized values are None
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "starter" => Some(Self::Starter),
            "basic" => Some(Self::Basic),
            "epic" => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            "mythic" => Some(Self::Mythic),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemGold {
    pub base: i64,
    pub total: i64,
    pub sell: i64,
    pub purchasable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Stable upstream id, e.g. "3153"
    pub external_id: String,
    pub name: String,
    /// Raw markup as shipped upstream
    pub description: String,
    pub plaintext: String,
    pub tier: Tier,
    pub gold: ItemGold,
    /// Sparse stat map keyed by upstream stat name
    pub stat_modifiers: BTreeMap<String, f64>,
    /// Component item ids, upstream order. May reference ids missing from
    /// the batch; the recipe route degrades those to placeholders.
    pub build_from: Vec<String>,
    pub build_into: Vec<String>,
    pub tags: Vec<String>,
    /// Map id -> availability
    pub maps: BTreeMap<String, bool>,
    pub consumed: bool,
    pub in_store: bool,
    pub hide_from_all: bool,
    pub required_champion: Option<String>,
    pub image_full: String,
}

impl ExternalId for ItemRecord {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }
}

// ============================================================================
// Runes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuneRecord {
    pub external_id: i64,
    pub key: String,
    pub name: String,
    pub short_desc: String,
    pub long_desc: String,
    pub icon_path: String,
    pub owning_path_id: i64,
    /// 0 = keystones
    pub slot_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuneSlot {
    pub slot_index: i64,
    /// In-slot order is significant and preserved
    pub runes: Vec<RuneRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunePathRecord {
    pub external_id: i64,
    pub key: String,
    pub name: String,
    pub icon_path: String,
    /// Ordered by slot index; slot 0 holds the keystones
    pub slots: Vec<RuneSlot>,
}

impl ExternalId for RunePathRecord {
    fn external_id(&self) -> String {
        self.external_id.to_string()
    }
}

// ============================================================================
// Summoner spells
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummonerSpellRecord {
    /// Stable upstream id, e.g. "SummonerFlash"
    pub external_id: String,
    pub numeric_key: i64,
    pub name: String,
    pub description: String,
    pub cooldowns: Vec<f64>,
    pub summoner_level: i64,
    pub modes: Vec<String>,
    pub image_full: String,
}

impl ExternalId for SummonerSpellRecord {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_round_trips_through_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn tier_ordering_promotes_only_upward() {
        assert!(Tier::Starter < Tier::Basic);
        assert!(Tier::Epic < Tier::Legendary);
        assert!(Tier::Legendary < Tier::Mythic);
    }

    #[test]
    fn tier_parses_known_labels_case_insensitively() {
        assert_eq!(Tier::parse("Mythic"), Some(Tier::Mythic));
        assert_eq!(Tier::parse("LEGENDARY"), Some(Tier::Legendary));
        assert_eq!(Tier::parse("ornn-upgrade"), None);
    }
}
