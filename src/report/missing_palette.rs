use std::collections::HashSet;
use std::io::{self, Write};

use crate::data::reference::{PaletteSlot, ReferenceStore};
use crate::data::validate::{DefectCategory, SongDiagnosis};

use super::{write_section_header, write_song_identity};

const PALETTE_SOURCES: &[&str] = &[
    "https://api.guildwars2.com/v2/professions?ids=all  (see \"skills_by_palette\")",
    "https://wiki.guildwars2.com/wiki/Chat_link_format",
];

/// Utility palette ids that the palette lookup cannot resolve.
pub fn report_missing_palette_skills(
    diagnoses: &[SongDiagnosis],
    refs: &ReferenceStore,
    out: &mut dyn Write,
) -> io::Result<bool> {
    if diagnoses.iter().all(|d| d.unknown_palette_ids.is_empty()) {
        return Ok(false);
    }

    write_section_header(out, DefectCategory::MissingPaletteSkills)?;
    writeln!(
        out,
        "Build templates reference palette ids that are missing from paletteSkillLookup.json."
    )?;
    writeln!(
        out,
        "Add each palette id -> ability id mapping to the lookup table. Sources for the mapping:"
    )?;
    for source in PALETTE_SOURCES {
        writeln!(out, "    {source}")?;
    }

    let mut seen = HashSet::new();
    for diagnosis in diagnoses {
        for &palette_id in &diagnosis.unknown_palette_ids {
            if !seen.insert(palette_id) {
                continue;
            }
            writeln!(out)?;
            writeln!(out, "paletteId {palette_id} is not in the palette lookup")?;
            write_song_identity(out, diagnosis)?;
            write_palette_breakdown(out, diagnosis, refs)?;
        }
    }
    Ok(true)
}

fn write_palette_breakdown(
    out: &mut dyn Write,
    diagnosis: &SongDiagnosis,
    refs: &ReferenceStore,
) -> io::Result<()> {
    writeln!(out, "  utility palette:")?;
    for (slot, &palette_id) in diagnosis.song.utility_palette_ids().iter().enumerate() {
        let description = match refs.resolve_palette_slot(palette_id) {
            PaletteSlot::Flex => "empty / flex slot".to_string(),
            PaletteSlot::Resolved { ability_id, ability } => {
                format!("ability {ability_id} ({})", ability.display_name())
            }
            PaletteSlot::ResolvedUnknownAbility { ability_id } => {
                format!("ability {ability_id} (not in ability table)")
            }
            PaletteSlot::Unresolved => "UNRESOLVED".to_string(),
        };
        writeln!(
            out,
            "    utility {} : paletteId {palette_id:<6} -> {description}",
            slot + 1
        )?;
    }
    Ok(())
}
