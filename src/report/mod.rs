//! Category reporters: one pass per defect category over all song diagnoses.
//!
//! Each reporter writes a human-directed section to `out` and returns whether it
//! found anything. [run_reports] runs them in severity order and, when the
//! unknown-notes pass flags build/log mismatches, offers to delete those songs.

mod delete;
mod export_csv;
mod invalid_notes;
mod missing_palette;
mod nearby;
mod unknown_abilities;
mod unknown_notes;

use std::io::{self, Write};
use std::path::PathBuf;

use crate::data::reference::ReferenceStore;
use crate::data::validate::{DefectCategory, SongDiagnosis};

pub use delete::{delete_files, is_affirmative, propose_deletion, Confirm, StdinConfirm};
pub use export_csv::{defect_rows, write_defects_csv, DefectRow};
pub use invalid_notes::report_invalid_notes;
pub use missing_palette::report_missing_palette_skills;
pub use nearby::{format_time, write_flagged_note, write_nearby_notes, write_song_identity};
pub use unknown_abilities::report_unknown_abilities;
pub use unknown_notes::{classify_utility, report_unknown_notes, UnknownNotesOutcome, UtilityVerdict};

pub const ALL_VALID_MESSAGE: &str = "All Data is Valid!";

/// Result of a full reporting run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub had_errors: bool,
    /// Categories that reported at least one defect, in report order.
    pub categories: Vec<DefectCategory>,
    /// Songs the unknown-notes heuristic judged to be build/log mismatches.
    pub mismatch_candidates: Vec<PathBuf>,
    /// Files actually removed after confirmation.
    pub deleted: Vec<PathBuf>,
}

/// Run every reporter over `diagnoses`. Deletion is only offered when `confirm` is given.
pub fn run_reports(
    diagnoses: &[SongDiagnosis],
    refs: &ReferenceStore,
    confirm: Option<&mut dyn Confirm>,
    out: &mut dyn Write,
) -> io::Result<ReportSummary> {
    let mut summary = ReportSummary::default();
    if diagnoses.is_empty() {
        writeln!(out, "{ALL_VALID_MESSAGE}")?;
        return Ok(summary);
    }

    if report_invalid_notes(diagnoses, out)? {
        summary.categories.push(DefectCategory::InvalidNotes);
    }
    if report_missing_palette_skills(diagnoses, refs, out)? {
        summary.categories.push(DefectCategory::MissingPaletteSkills);
    }
    if report_unknown_abilities(diagnoses, refs, out)? {
        summary.categories.push(DefectCategory::UnknownAbilities);
    }
    let unknown_notes = report_unknown_notes(diagnoses, refs, out)?;
    if unknown_notes.found {
        summary.categories.push(DefectCategory::UnknownNotes);
    }
    summary.had_errors = !summary.categories.is_empty();
    summary.mismatch_candidates = unknown_notes.mismatch_candidates;

    if let Some(confirm) = confirm {
        if !summary.mismatch_candidates.is_empty() {
            summary.deleted = propose_deletion(&summary.mismatch_candidates, confirm, out)?;
        }
    }
    out.flush()?;
    Ok(summary)
}

fn write_section_header(out: &mut dyn Write, category: DefectCategory) -> io::Result<()> {
    let rule = "=".repeat(72);
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "[{}] {}", category.severity(), category.title())?;
    writeln!(out, "{rule}")
}

/// JSON override entries marking every id as "not a note", ready to paste and edit.
fn override_skeleton(ability_ids: &[i64]) -> String {
    let mut skeleton = String::from("{\n");
    for (i, ability_id) in ability_ids.iter().enumerate() {
        let separator = if i + 1 < ability_ids.len() { "," } else { "" };
        skeleton.push_str(&format!("    \"{ability_id}\": {{ \"isNote\": false }}{separator}\n"));
    }
    skeleton.push('}');
    skeleton
}
