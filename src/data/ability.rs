//! Ability metadata: the remote skill catalog and the curated ability-info overlay.
//!
//! Both tables are keyed by the ability id as a string, exactly as it appears in
//! the JSON files. The overlay is layered on top of the catalog at load time.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::loader::read_json_file;
use crate::error::Result;

pub const DEFAULT_CATALOG_PATH: &str = "./allSkills.json";
pub const DEFAULT_ABILITY_INFO_PATHS: &[&str] = &[
    "../DanceDanceRotationModule/ref/abilityInfoApi.json",
    "../DanceDanceRotationModule/ref/abilityInfoCustom.json",
];

/// Slot value the catalog uses for equippable utility skills.
pub const UTILITY_SLOT: &str = "Utility";

/// One entry of the skill catalog fetched from the game API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSkill {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub professions: Vec<String>,
}

pub type SkillCatalog = HashMap<String, CatalogSkill>;

/// One entry of an ability-info overlay file (`abilityInfoApi.json`, `abilityInfoCustom.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityInfoEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "assetId", default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<u64>,
}

pub type AbilityInfoTable = HashMap<String, AbilityInfoEntry>;

/// Combined view of an ability after merging catalog and overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ability {
    pub id: String,
    pub name: Option<String>,
    /// Equip slot from the catalog; `None` means the ability cannot be slotted by the player.
    pub slot: Option<String>,
    pub asset_id: Option<u64>,
    pub professions: Vec<String>,
}

impl Ability {
    fn from_catalog(id: &str, skill: &CatalogSkill) -> Self {
        Ability {
            id: id.to_string(),
            name: skill.name.clone(),
            slot: skill.slot.clone(),
            asset_id: skill.icon.as_deref().and_then(asset_id_from_icon_url),
            professions: skill.professions.clone(),
        }
    }

    fn apply_overlay(&mut self, entry: &AbilityInfoEntry) {
        if let Some(name) = &entry.name {
            self.name = Some(name.clone());
        }
        if let Some(asset_id) = entry.asset_id {
            self.asset_id = Some(asset_id);
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn is_utility(&self) -> bool {
        self.slot.as_deref() == Some(UTILITY_SLOT)
    }
}

pub fn load_skill_catalog(path: impl AsRef<Path>) -> Result<SkillCatalog> {
    let path = path.as_ref();
    let catalog: SkillCatalog = read_json_file(path)?;
    info!("loaded {} catalog skills from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Load overlay files left to right; later files overwrite earlier ones on id collision.
pub fn load_ability_info<P: AsRef<Path>>(paths: &[P]) -> Result<AbilityInfoTable> {
    let mut merged = AbilityInfoTable::new();
    for path in paths {
        let path = path.as_ref();
        let table: AbilityInfoTable = read_json_file(path)?;
        info!("loaded {} ability info entries from {}", table.len(), path.display());
        merged.extend(table);
    }
    Ok(merged)
}

/// Merge catalog and overlay into a single id -> ability mapping.
///
/// Overlay fields win over catalog fields for the same id. Overlay-only ids are
/// added without a slot, since only the catalog knows about slots.
pub fn merge_abilities(catalog: &SkillCatalog, overlay: &AbilityInfoTable) -> HashMap<String, Ability> {
    let mut abilities: HashMap<String, Ability> = catalog
        .iter()
        .map(|(id, skill)| (id.clone(), Ability::from_catalog(id, skill)))
        .collect();

    for (id, entry) in overlay {
        abilities
            .entry(id.clone())
            .or_insert_with(|| Ability {
                id: id.clone(),
                ..Ability::default()
            })
            .apply_overlay(entry);
    }
    debug!(
        "merged ability table: {} catalog + {} overlay -> {} abilities",
        catalog.len(),
        overlay.len(),
        abilities.len()
    );
    abilities
}

/// Convert a catalog icon URL into the numeric asset id used by the module's asset cache.
///
/// The asset id is the stem of the last path segment, e.g.
/// `https://render.guildwars2.com/file/6F3E.../103442.png` -> `103442`.
pub fn asset_id_from_icon_url(icon_url: &str) -> Option<u64> {
    let segment = icon_url.rsplit('/').next()?;
    // Percent-encoded slashes show up in a handful of catalog entries.
    let segment = segment
        .rsplit("%2F")
        .next()
        .and_then(|s| s.rsplit("%2f").next())
        .unwrap_or(segment);
    let stem = segment.split('.').next()?;
    stem.parse().ok()
}

/// Build the generated overlay (`abilityInfoApi.json`) from a catalog: name plus asset id.
pub fn ability_info_from_catalog(catalog: &SkillCatalog) -> BTreeMap<String, AbilityInfoEntry> {
    catalog
        .iter()
        .map(|(id, skill)| {
            let entry = AbilityInfoEntry {
                name: skill.name.clone(),
                asset_id: skill.icon.as_deref().and_then(asset_id_from_icon_url),
            };
            (id.clone(), entry)
        })
        .collect()
}
