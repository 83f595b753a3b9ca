use std::io::{self, Write};

use crate::data::validate::{DefectCategory, SongDiagnosis};

use super::write_section_header;

/// Structurally broken notes: missing keys or out-of-order times.
pub fn report_invalid_notes(diagnoses: &[SongDiagnosis], out: &mut dyn Write) -> io::Result<bool> {
    let affected: Vec<&SongDiagnosis> = diagnoses
        .iter()
        .filter(|d| !d.invalid_notes.is_empty())
        .collect();
    if affected.is_empty() {
        return Ok(false);
    }
    let note_count: usize = affected.iter().map(|d| d.invalid_notes.len()).sum();

    write_section_header(out, DefectCategory::InvalidNotes)?;
    writeln!(
        out,
        "{} song(s) contain {} invalid note(s).",
        affected.len(),
        note_count
    )?;
    writeln!(
        out,
        "There is no mechanical fix for these. The song data is malformed, which most likely"
    )?;
    writeln!(
        out,
        "points to a bug in the tool that produced it. Regenerate the song or fix it by hand."
    )?;

    for diagnosis in affected {
        writeln!(out)?;
        writeln!(out, "{{")?;
        writeln!(out, "  song: {}", diagnosis.song.name)?;
        writeln!(out, "  file: {}", diagnosis.file_path.display())?;
        writeln!(out, "  log : {}", diagnosis.song.log_url)?;
        for invalid in &diagnosis.invalid_notes {
            writeln!(out, "  - index: {}", invalid.index)?;
            writeln!(out, "    invalidReason: {}", invalid.reason)?;
            for (key, value) in invalid.note.fields() {
                writeln!(out, "    {key}: {value}")?;
            }
        }
        writeln!(out, "}}")?;
    }
    Ok(true)
}
