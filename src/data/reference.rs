//! Reference store: the read-only lookup tables every song is checked against.
//! Built once at startup and passed by reference to the parser and the reporters.

use std::collections::HashMap;
use std::path::Path;

use crate::data::ability::{
    load_ability_info, load_skill_catalog, merge_abilities, Ability, AbilityInfoTable,
    SkillCatalog,
};
use crate::data::palette::{load_palette_lookup, PaletteLookup};
use crate::data::song::WEAPON_SWAP_ABILITY_ID;
use crate::error::Result;

/// Display name used for the weapon swap pseudo-ability.
pub const WEAPON_SWAP_NAME: &str = "<Weapon Swap>";

#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    /// Catalog merged with the ability-info overlay, keyed by stringified ability id.
    abilities: HashMap<String, Ability>,
    /// Palette id (stringified) -> ability id.
    palette: PaletteLookup,
}

/// Resolution of one build-template utility slot against the palette lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteSlot<'a> {
    /// Id at or below zero: nothing equipped or a flex slot.
    Flex,
    /// Palette id resolves to an ability the ability table knows.
    Resolved { ability_id: i64, ability: &'a Ability },
    /// Palette id resolves, but the resulting ability id has no ability entry.
    ResolvedUnknownAbility { ability_id: i64 },
    /// Palette id is not in the palette lookup.
    Unresolved,
}

impl ReferenceStore {
    pub fn new(abilities: HashMap<String, Ability>, palette: PaletteLookup) -> Self {
        ReferenceStore { abilities, palette }
    }

    /// Build from already-parsed tables.
    pub fn from_tables(catalog: &SkillCatalog, overlay: &AbilityInfoTable, palette: PaletteLookup) -> Self {
        Self::new(merge_abilities(catalog, overlay), palette)
    }

    /// Load every table from disk. Any read or parse failure aborts the load.
    pub fn load<P: AsRef<Path>>(
        catalog_path: impl AsRef<Path>,
        ability_info_paths: &[P],
        palette_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let catalog = load_skill_catalog(catalog_path)?;
        let overlay = load_ability_info(ability_info_paths)?;
        let palette = load_palette_lookup(palette_path)?;
        Ok(Self::from_tables(&catalog, &overlay, palette))
    }

    pub fn ability(&self, ability_id: i64) -> Option<&Ability> {
        self.abilities.get(&ability_id.to_string())
    }

    pub fn has_ability(&self, ability_id: i64) -> bool {
        self.abilities.contains_key(&ability_id.to_string())
    }

    pub fn palette_ability_id(&self, palette_id: i64) -> Option<i64> {
        self.palette.get(&palette_id.to_string()).copied()
    }

    pub fn has_palette_id(&self, palette_id: i64) -> bool {
        self.palette.contains_key(&palette_id.to_string())
    }

    pub fn resolve_palette_slot(&self, palette_id: i64) -> PaletteSlot<'_> {
        if palette_id <= 0 {
            return PaletteSlot::Flex;
        }
        match self.palette_ability_id(palette_id) {
            None => PaletteSlot::Unresolved,
            Some(ability_id) => match self.ability(ability_id) {
                Some(ability) => PaletteSlot::Resolved { ability_id, ability },
                None => PaletteSlot::ResolvedUnknownAbility { ability_id },
            },
        }
    }

    /// Name shown next to a note: the table's name, else the weapon swap sentinel, else "unknown".
    pub fn note_display_name(&self, ability_id: i64) -> &str {
        if let Some(name) = self.ability(ability_id).and_then(|ability| ability.name.as_deref()) {
            return name;
        }
        if ability_id == WEAPON_SWAP_ABILITY_ID {
            return WEAPON_SWAP_NAME;
        }
        "unknown"
    }

    pub fn ability_count(&self) -> usize {
        self.abilities.len()
    }

    pub fn palette_count(&self) -> usize {
        self.palette.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ReferenceStore {
        let mut abilities = HashMap::new();
        abilities.insert(
            "9153".to_string(),
            Ability {
                id: "9153".to_string(),
                name: Some("Stand Your Ground!".to_string()),
                slot: Some("Utility".to_string()),
                ..Ability::default()
            },
        );
        let mut palette = PaletteLookup::new();
        palette.insert("254".to_string(), 9153);
        palette.insert("300".to_string(), 77);
        ReferenceStore::new(abilities, palette)
    }

    #[test]
    fn resolve_palette_slot_covers_every_outcome() {
        let refs = store();
        assert_eq!(refs.resolve_palette_slot(0), PaletteSlot::Flex);
        assert_eq!(refs.resolve_palette_slot(-1), PaletteSlot::Flex);
        assert!(matches!(
            refs.resolve_palette_slot(254),
            PaletteSlot::Resolved { ability_id: 9153, .. }
        ));
        assert_eq!(
            refs.resolve_palette_slot(300),
            PaletteSlot::ResolvedUnknownAbility { ability_id: 77 }
        );
        assert_eq!(refs.resolve_palette_slot(999), PaletteSlot::Unresolved);
    }

    #[test]
    fn note_display_name_uses_weapon_swap_sentinel() {
        let refs = store();
        assert_eq!(refs.note_display_name(-2), "<Weapon Swap>");
        assert_eq!(refs.note_display_name(9153), "Stand Your Ground!");
        assert_eq!(refs.note_display_name(1), "unknown");
    }

    #[test]
    fn note_display_name_prefers_the_ability_table_over_the_sentinel() {
        let mut abilities = HashMap::new();
        abilities.insert(
            "-2".to_string(),
            Ability {
                id: "-2".to_string(),
                name: Some("Weapon Swap".to_string()),
                ..Ability::default()
            },
        );
        let refs = ReferenceStore::new(abilities, PaletteLookup::new());
        assert_eq!(refs.note_display_name(-2), "Weapon Swap");
    }
}
