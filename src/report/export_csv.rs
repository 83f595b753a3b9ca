//! Flat CSV export of every defect, one row each, for spreadsheet triage.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::data::reference::ReferenceStore;
use crate::data::validate::{DefectCategory, SongDiagnosis};
use crate::error::{Result, VerifyError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefectRow {
    pub file: String,
    pub song: String,
    pub category: String,
    pub severity: String,
    /// Ability id or palette id the defect is keyed on; empty for invalid notes.
    pub id: String,
    pub note_index: Option<usize>,
    pub count: usize,
    pub detail: String,
}

impl DefectRow {
    fn new(diagnosis: &SongDiagnosis, category: DefectCategory) -> Self {
        DefectRow {
            file: diagnosis.file_name.clone(),
            song: diagnosis.song.name.clone(),
            category: category.as_str().to_string(),
            severity: category.severity().as_str().to_string(),
            id: String::new(),
            note_index: None,
            count: 1,
            detail: String::new(),
        }
    }
}

/// Flatten diagnoses into rows, in report order within each song.
pub fn defect_rows(diagnoses: &[SongDiagnosis], refs: &ReferenceStore) -> Vec<DefectRow> {
    let mut rows = Vec::new();
    for diagnosis in diagnoses {
        for invalid in &diagnosis.invalid_notes {
            rows.push(DefectRow {
                note_index: Some(invalid.index),
                detail: invalid.reason.to_string(),
                ..DefectRow::new(diagnosis, DefectCategory::InvalidNotes)
            });
        }
        for palette_id in &diagnosis.unknown_palette_ids {
            rows.push(DefectRow {
                id: palette_id.to_string(),
                detail: "palette id not in palette lookup".to_string(),
                ..DefectRow::new(diagnosis, DefectCategory::MissingPaletteSkills)
            });
        }
        for flagged in diagnosis.unknown_abilities.iter() {
            rows.push(DefectRow {
                id: flagged.ability_id.to_string(),
                note_index: Some(flagged.index),
                count: flagged.count,
                detail: "ability id not in ability table".to_string(),
                ..DefectRow::new(diagnosis, DefectCategory::UnknownAbilities)
            });
        }
        for flagged in diagnosis.unknown_notes.iter() {
            rows.push(DefectRow {
                id: flagged.ability_id.to_string(),
                note_index: Some(flagged.index),
                count: flagged.count,
                detail: refs.note_display_name(flagged.ability_id).to_string(),
                ..DefectRow::new(diagnosis, DefectCategory::UnknownNotes)
            });
        }
    }
    rows
}

/// Write every defect to a CSV file. Returns the number of rows written.
pub fn write_defects_csv(
    diagnoses: &[SongDiagnosis],
    refs: &ReferenceStore,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let path = path.as_ref();
    let rows = defect_rows(diagnoses, refs);
    let mut writer = csv::Writer::from_path(path).map_err(|err| VerifyError::csv(path, err))?;
    for row in &rows {
        writer
            .serialize(row)
            .map_err(|err| VerifyError::csv(path, err))?;
    }
    writer
        .flush()
        .map_err(|err| VerifyError::csv(path, err.into()))?;
    info!("wrote {} defect rows to {}", rows.len(), path.display());
    Ok(rows.len())
}
