use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::data::reference::ReferenceStore;
use crate::data::validate::{DefectCategory, FlaggedNote, SongDiagnosis};

use super::{override_skeleton, write_flagged_note, write_section_header, write_song_identity};

struct UnknownAbility<'a> {
    representative: &'a SongDiagnosis,
    note: &'a FlaggedNote,
    songs: usize,
    occurrences: usize,
}

/// Note ability ids that neither the catalog nor the overlay know about.
pub fn report_unknown_abilities(
    diagnoses: &[SongDiagnosis],
    refs: &ReferenceStore,
    out: &mut dyn Write,
) -> io::Result<bool> {
    // Ascending ability id; the first song (in scan order) is the representative.
    let mut unknown: BTreeMap<i64, UnknownAbility<'_>> = BTreeMap::new();
    for diagnosis in diagnoses {
        for flagged in diagnosis.unknown_abilities.iter() {
            let entry = unknown
                .entry(flagged.ability_id)
                .or_insert_with(|| UnknownAbility {
                    representative: diagnosis,
                    note: flagged,
                    songs: 0,
                    occurrences: 0,
                });
            entry.songs += 1;
            entry.occurrences += flagged.count;
        }
    }
    if unknown.is_empty() {
        return Ok(false);
    }

    write_section_header(out, DefectCategory::UnknownAbilities)?;
    writeln!(
        out,
        "{} ability id(s) used by notes are not in the ability table.",
        unknown.len()
    )?;
    writeln!(
        out,
        "For each one, decide whether it is a real playable action (a note) or a passive,"
    )?;
    writeln!(
        out,
        "relic or instant effect (not a note), and add an override entry for it."
    )?;
    writeln!(
        out,
        "If it is a note, also add its name and assetId to abilityInfoCustom.json"
    )?;
    writeln!(out, "(https://search.gw2dat.com/ finds the assetId).")?;

    for (ability_id, entry) in &unknown {
        writeln!(out)?;
        writeln!(
            out,
            "abilityId {ability_id}: {} occurrence(s) in {} song(s)",
            entry.occurrences, entry.songs
        )?;
        write_song_identity(out, entry.representative)?;
        write_flagged_note(out, entry.note, &entry.representative.song.notes, refs)?;
    }

    let ids: Vec<i64> = unknown.keys().copied().collect();
    writeln!(out)?;
    writeln!(out, "Override skeleton (every id defaults to \"not a note\"):")?;
    writeln!(out, "{}", override_skeleton(&ids))?;
    Ok(true)
}
