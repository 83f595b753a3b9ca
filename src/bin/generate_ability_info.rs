//! Regenerate abilityInfoApi.json (id -> name, assetId) from a local copy of the skill catalog.
//! Run: cargo run --bin generate_ability_info [-- <allSkills.json> <output_file>]

use std::fs;
use std::path::PathBuf;

use songlint::cli::init_tracing;
use songlint::data::ability::{
    ability_info_from_catalog, load_skill_catalog, DEFAULT_ABILITY_INFO_PATHS,
    DEFAULT_CATALOG_PATH,
};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let mut args = std::env::args().skip(1);
    let catalog_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string()));
    // The generated overlay is the first (lowest precedence) ability-info file.
    let output = PathBuf::from(
        args.next()
            .unwrap_or_else(|| DEFAULT_ABILITY_INFO_PATHS[0].to_string()),
    );

    let catalog = load_skill_catalog(&catalog_path)?;
    let table = ability_info_from_catalog(&catalog);
    let json = serde_json::to_string_pretty(&table)?;
    fs::write(&output, json)?;
    println!("Wrote {} ({} abilities)", output.display(), table.len());
    Ok(())
}
