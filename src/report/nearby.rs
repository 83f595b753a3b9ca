//! Shared formatting for flagged notes and the notes around them.

use std::io::{self, Write};

use crate::data::reference::ReferenceStore;
use crate::data::song::Note;
use crate::data::validate::{FlaggedNote, SongDiagnosis};

/// Notes shown before the flagged note; one fewer is shown after it.
const NEARBY_BEFORE: usize = 2;
const NEARBY_AFTER: usize = 2;

/// `12345` ms -> `12.345s`. Fractional milliseconds are rounded.
pub fn format_time(time_ms: f64) -> String {
    let rounded = time_ms.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    let abs = rounded.unsigned_abs();
    format!("{sign}{}.{:03}s", abs / 1000, abs % 1000)
}

fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Write the notes at indices `[index - 2, index + 2)` that exist in `notes`.
pub fn write_nearby_notes(
    out: &mut dyn Write,
    notes: &[Note],
    index: usize,
    refs: &ReferenceStore,
) -> io::Result<()> {
    let start = index.saturating_sub(NEARBY_BEFORE);
    let end = (index + NEARBY_AFTER).min(notes.len());
    writeln!(out, "        nearby notes [")?;
    for (i, note) in notes.iter().enumerate().take(end).skip(start) {
        let marker = if i == index { ">" } else { " " };
        let name = note
            .ability_id()
            .map_or("unknown", |id| refs.note_display_name(id));
        let time = note
            .time()
            .map_or_else(|| "-".to_string(), |t| format!("{} ({t} ms)", format_time(t)));
        writeln!(
            out,
            "          {marker} index {i:<5} abilityId {:<8} {:<32} time {:<22} duration {}",
            format_optional(note.ability_id()),
            name,
            time,
            format_optional(note.duration()),
        )?;
    }
    writeln!(out, "        ]")
}

/// Write the first occurrence of a flagged ability along with its surroundings.
pub fn write_flagged_note(
    out: &mut dyn Write,
    flagged: &FlaggedNote,
    notes: &[Note],
    refs: &ReferenceStore,
) -> io::Result<()> {
    writeln!(out, "    abilityId: {}", flagged.ability_id)?;
    writeln!(out, "        index   : {}", flagged.index)?;
    if let Some(time) = flagged.note.time() {
        writeln!(out, "        time    : {time} ({})", format_time(time))?;
    }
    writeln!(out, "        duration: {}", format_optional(flagged.note.duration()))?;
    writeln!(out, "        total # : {}", flagged.count)?;
    match refs.ability(flagged.ability_id) {
        Some(ability) => {
            writeln!(out, "        name    : {}", ability.display_name())?;
            writeln!(
                out,
                "        slot    : {}",
                ability.slot.as_deref().unwrap_or("<none>")
            )?;
        }
        None => writeln!(out, "        name    : <not in ability table>")?,
    }
    write_nearby_notes(out, notes, flagged.index, refs)
}

/// Name, file and build links identifying the song a defect belongs to.
pub fn write_song_identity(out: &mut dyn Write, diagnosis: &SongDiagnosis) -> io::Result<()> {
    let song = &diagnosis.song;
    writeln!(out, "  song         : {}", song.name)?;
    writeln!(out, "  file         : {}", diagnosis.file_path.display())?;
    writeln!(
        out,
        "  profession   : {} ({})",
        song.profession().map_or("Unknown", |p| p.as_str()),
        song.profession_code()
    )?;
    writeln!(out, "  logUrl       : {}", song.log_url)?;
    writeln!(out, "  buildUrl     : {}", song.build_url)?;
    writeln!(out, "  buildChatCode: {}", song.build_chat_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_milliseconds() {
        assert_eq!(format_time(12345.0), "12.345s");
        assert_eq!(format_time(1005.0), "1.005s");
        assert_eq!(format_time(0.0), "0.000s");
        assert_eq!(format_time(-50.0), "-0.050s");
        assert_eq!(format_time(333.5), "0.334s");
    }

    fn note(ability_id: i64, time: i64) -> Note {
        serde_json::from_value(serde_json::json!({
            "time": time,
            "duration": 100,
            "noteType": "Weapon1",
            "abilityId": ability_id
        }))
        .unwrap()
    }

    #[test]
    fn nearby_window_is_clipped_to_the_sequence() {
        let notes: Vec<Note> = (0..6).map(|i| note(-2, i * 1000)).collect();
        let refs = ReferenceStore::default();

        let mut out = Vec::new();
        write_nearby_notes(&mut out, &notes, 0, &refs).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("index 0 "));
        assert!(text.contains("index 1 "));
        assert!(!text.contains("index 2 "));
        assert!(text.contains("<Weapon Swap>"));

        let mut out = Vec::new();
        write_nearby_notes(&mut out, &notes, 3, &refs).unwrap();
        let text = String::from_utf8(out).unwrap();
        for shown in ["index 1 ", "index 2 ", "index 3 ", "index 4 "] {
            assert!(text.contains(shown), "missing {shown}");
        }
        assert!(!text.contains("index 0 "));
        assert!(!text.contains("index 5 "));
    }
}
