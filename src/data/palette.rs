//! Palette lookup: build-template palette ids -> ability ids.
//! Build chat codes only carry palette ids, which must be resolved through this table.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::data::loader::read_json_file;
use crate::error::Result;

pub const DEFAULT_PALETTE_LOOKUP_PATH: &str =
    "../DanceDanceRotationModule/ref/paletteSkillLookup.json";

pub type PaletteLookup = HashMap<String, i64>;

pub fn load_palette_lookup(path: impl AsRef<Path>) -> Result<PaletteLookup> {
    let path = path.as_ref();
    let lookup: PaletteLookup = read_json_file(path)?;
    info!("loaded {} palette entries from {}", lookup.len(), path.display());
    Ok(lookup)
}

/// Palette ids at or below zero mark an empty or flex slot and are never looked up.
pub fn is_assigned_palette_id(palette_id: i64) -> bool {
    palette_id > 0
}
