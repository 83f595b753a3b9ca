use std::io::{self, Write};
use std::path::PathBuf;

use crate::data::ability::Ability;
use crate::data::profession::profession_name;
use crate::data::reference::{PaletteSlot, ReferenceStore};
use crate::data::validate::{DefectCategory, FlaggedNote, SongDiagnosis};

use super::{override_skeleton, write_flagged_note, write_section_header, write_song_identity};

const WIKI_BASE_URL: &str = "https://wiki.guildwars2.com/wiki/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownNotesOutcome {
    pub found: bool,
    /// Distinct song files judged to be build code / log mismatches, first-seen order.
    pub mismatch_candidates: Vec<PathBuf>,
}

/// Likely cause of a utility ability showing up with an `Unknown` note type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtilityVerdict {
    /// The song's palette has unresolved ids, so its equipped utilities are not fully known.
    PaletteGap { unresolved: Vec<i64> },
    /// The ability is not one of the build's utilities: the build code does not match the log.
    BuildMismatch { equipped: Vec<String> },
    /// The ability is equipped, yet the composer did not map it to a utility slot.
    Equipped,
    /// The ability or one of the equipped utilities has no name, so nothing can be compared.
    Inconclusive,
    /// Revenant palettes are never resolved.
    Unsupported,
}

/// Compare a utility ability against the utilities the song's build actually equips.
pub fn classify_utility(
    diagnosis: &SongDiagnosis,
    ability: &Ability,
    refs: &ReferenceStore,
) -> UtilityVerdict {
    if diagnosis.song.is_revenant() {
        return UtilityVerdict::Unsupported;
    }
    if !diagnosis.unknown_palette_ids.is_empty() {
        return UtilityVerdict::PaletteGap {
            unresolved: diagnosis.unknown_palette_ids.clone(),
        };
    }
    let Some(name) = &ability.name else {
        return UtilityVerdict::Inconclusive;
    };
    let mut equipped: Vec<String> = Vec::new();
    for &palette_id in diagnosis.song.utility_palette_ids() {
        match refs.resolve_palette_slot(palette_id) {
            PaletteSlot::Flex => {}
            PaletteSlot::Resolved { ability, .. } => match &ability.name {
                Some(equipped_name) => equipped.push(equipped_name.clone()),
                None => return UtilityVerdict::Inconclusive,
            },
            PaletteSlot::ResolvedUnknownAbility { .. } | PaletteSlot::Unresolved => {
                return UtilityVerdict::Inconclusive;
            }
        }
    }
    if equipped.contains(name) {
        UtilityVerdict::Equipped
    } else {
        UtilityVerdict::BuildMismatch { equipped }
    }
}

/// Known abilities whose note type the composer left as `Unknown`.
pub fn report_unknown_notes(
    diagnoses: &[SongDiagnosis],
    refs: &ReferenceStore,
    out: &mut dyn Write,
) -> io::Result<UnknownNotesOutcome> {
    let affected: Vec<&SongDiagnosis> = diagnoses
        .iter()
        .filter(|d| !d.unknown_notes.is_empty())
        .collect();
    if affected.is_empty() {
        return Ok(UnknownNotesOutcome::default());
    }

    write_section_header(out, DefectCategory::UnknownNotes)?;
    writeln!(
        out,
        "{} song(s) contain notes whose ability is known but whose noteType is \"Unknown\".",
        affected.len()
    )?;
    writeln!(
        out,
        "This is often a build chat code that does not match the log the song was made from."
    )?;
    writeln!(out, "Affected songs:")?;
    for diagnosis in &affected {
        writeln!(
            out,
            "    {} ({}): {} ability id(s), {} note(s)",
            diagnosis.song.name,
            diagnosis.file_name,
            diagnosis.unknown_notes.len(),
            diagnosis.unknown_notes.total_count()
        )?;
    }

    // Group owners by ability id, in first-seen order.
    let mut groups: Vec<(i64, Vec<(&SongDiagnosis, &FlaggedNote)>)> = Vec::new();
    for &diagnosis in &affected {
        for flagged in diagnosis.unknown_notes.iter() {
            match groups.iter_mut().find(|(id, _)| *id == flagged.ability_id) {
                Some((_, owners)) => owners.push((diagnosis, flagged)),
                None => groups.push((flagged.ability_id, vec![(diagnosis, flagged)])),
            }
        }
    }

    let mut mismatch_candidates: Vec<PathBuf> = Vec::new();
    for (ability_id, owners) in &groups {
        let occurrences: usize = owners.iter().map(|(_, flagged)| flagged.count).sum();
        writeln!(out)?;
        let Some(ability) = refs.ability(*ability_id) else {
            writeln!(
                out,
                "abilityId {ability_id}: not in ability table, {occurrences} occurrence(s)"
            )?;
            continue;
        };
        writeln!(
            out,
            "abilityId {ability_id} ({}), slot {}: {occurrences} occurrence(s) in {} song(s)",
            ability.display_name(),
            ability.slot.as_deref().unwrap_or("<none>"),
            owners.len()
        )?;

        for (diagnosis, flagged) in owners {
            write_song_identity(out, diagnosis)?;
            write_flagged_note(out, flagged, &diagnosis.song.notes, refs)?;
            if ability.is_utility() {
                let verdict = classify_utility(diagnosis, ability, refs);
                write_utility_verdict(out, ability, &verdict)?;
                if matches!(verdict, UtilityVerdict::BuildMismatch { .. })
                    && !mismatch_candidates.contains(&diagnosis.file_path)
                {
                    mismatch_candidates.push(diagnosis.file_path.clone());
                }
            }
        }

        match ability.slot.as_deref() {
            None => {
                let profession_code = owners[0].0.song.profession_code();
                write_slotless_hint(out, *ability_id, ability, profession_code)?;
            }
            Some(slot) if !ability.is_utility() => {
                writeln!(out, "  slot '{slot}': no heuristic available for this slot.")?;
            }
            Some(_) => {}
        }
    }

    Ok(UnknownNotesOutcome {
        found: true,
        mismatch_candidates,
    })
}

fn write_utility_verdict(
    out: &mut dyn Write,
    ability: &Ability,
    verdict: &UtilityVerdict,
) -> io::Result<()> {
    let name = ability.display_name();
    match verdict {
        UtilityVerdict::PaletteGap { unresolved } => {
            writeln!(
                out,
                "  > Likely a palette lookup gap: palette id(s) {unresolved:?} of this build are unresolved,"
            )?;
            writeln!(
                out,
                "    so '{name}' cannot be matched to a utility slot. Fix paletteSkillLookup.json first."
            )
        }
        UtilityVerdict::BuildMismatch { equipped } => {
            writeln!(
                out,
                "  > Likely a build code / log mismatch: '{name}' is not among the build's utilities {equipped:?}."
            )?;
            writeln!(
                out,
                "    The build chat code probably does not match the log. Song queued for deletion review."
            )
        }
        UtilityVerdict::Equipped => {
            writeln!(
                out,
                "  > '{name}' is equipped by this build, so the composer should have mapped it to a utility slot."
            )
        }
        UtilityVerdict::Inconclusive => {
            writeln!(
                out,
                "  > Cannot compare '{name}' with this build: a utility or the ability itself has no name."
            )
        }
        UtilityVerdict::Unsupported => {
            writeln!(out, "  > Revenant builds are not checked against the palette.")
        }
    }
}

fn write_slotless_hint(
    out: &mut dyn Write,
    ability_id: i64,
    ability: &Ability,
    profession_code: u8,
) -> io::Result<()> {
    let name = ability.display_name();
    writeln!(
        out,
        "  > No equip slot: probably a trait, relic or passive effect rather than a note."
    )?;
    writeln!(out, "    wiki    : {}", wiki_url(name))?;
    writeln!(out, "    hint    : {}: {name}", profession_name(profession_code))?;
    if !ability.professions.is_empty() {
        writeln!(out, "    catalog : {}", ability.professions.join(", "))?;
    }
    writeln!(out, "    override snippet:")?;
    writeln!(out, "{}", override_skeleton(&[ability_id]))
}

fn wiki_url(name: &str) -> String {
    format!("{WIKI_BASE_URL}{}", name.replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::data::palette::PaletteLookup;
    use crate::data::validate::parse_song;

    fn utility(id: &str, name: Option<&str>) -> (String, Ability) {
        (
            id.to_string(),
            Ability {
                id: id.to_string(),
                name: name.map(str::to_string),
                slot: Some("Utility".to_string()),
                ..Ability::default()
            },
        )
    }

    fn diagnose(utilities: &[i64], refs: &ReferenceStore) -> SongDiagnosis {
        let song = serde_json::from_value(json!({
            "name": "Heuristic Song",
            "decodedBuildTemplate": {
                "profession": 2,
                "skills": { "terrestrial": { "utilities": utilities } }
            },
            "notes": [{ "time": 0, "duration": 0, "noteType": "Unknown", "abilityId": 30 }]
        }))
        .unwrap();
        parse_song(song, refs).expect("unknown note is a defect")
    }

    fn store(abilities: Vec<(String, Ability)>, palette: &[(&str, i64)]) -> ReferenceStore {
        let palette: PaletteLookup = palette
            .iter()
            .map(|(palette_id, ability_id)| (palette_id.to_string(), *ability_id))
            .collect();
        ReferenceStore::new(abilities.into_iter().collect::<HashMap<_, _>>(), palette)
    }

    #[test]
    fn unnamed_ability_is_inconclusive() {
        let refs = store(
            vec![utility("10", Some("Shake It Off!")), utility("30", None)],
            &[("100", 10)],
        );
        let diagnosis = diagnose(&[100, 0, 0], &refs);
        let ability = refs.ability(30).unwrap();
        assert_eq!(classify_utility(&diagnosis, ability, &refs), UtilityVerdict::Inconclusive);
    }

    #[test]
    fn equipped_utility_missing_from_ability_table_is_inconclusive() {
        let refs = store(
            vec![utility("30", Some("Signet of Fury"))],
            &[("100", 77), ("101", 78)],
        );
        let diagnosis = diagnose(&[100, 101, 0], &refs);
        let ability = refs.ability(30).unwrap();
        assert_eq!(classify_utility(&diagnosis, ability, &refs), UtilityVerdict::Inconclusive);
    }

    #[test]
    fn named_utilities_that_differ_are_a_mismatch() {
        let refs = store(
            vec![utility("10", Some("Shake It Off!")), utility("30", Some("Signet of Fury"))],
            &[("100", 10)],
        );
        let diagnosis = diagnose(&[100, 0, 0], &refs);
        let ability = refs.ability(30).unwrap();
        assert_eq!(
            classify_utility(&diagnosis, ability, &refs),
            UtilityVerdict::BuildMismatch {
                equipped: vec!["Shake It Off!".to_string()]
            }
        );

        let mut out = Vec::new();
        let outcome = report_unknown_notes(&[diagnosis], &refs, &mut out).unwrap();
        assert_eq!(outcome.mismatch_candidates.len(), 1);
    }

    #[test]
    fn inconclusive_songs_are_not_queued_for_deletion() {
        let refs = store(vec![utility("30", None)], &[]);
        let diagnosis = diagnose(&[0, 0, 0], &refs);

        let mut out = Vec::new();
        let outcome = report_unknown_notes(&[diagnosis], &refs, &mut out).unwrap();
        assert!(outcome.found);
        assert!(outcome.mismatch_candidates.is_empty());
        assert!(String::from_utf8(out).unwrap().contains("Cannot compare"));
    }

    #[test]
    fn wiki_url_replaces_spaces() {
        assert_eq!(
            wiki_url("Mantra of Solace"),
            "https://wiki.guildwars2.com/wiki/Mantra_of_Solace"
        );
    }
}
