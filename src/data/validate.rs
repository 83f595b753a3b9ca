//! Per-song validation: note structure, ability resolution and palette resolution.
//!
//! [parse_song] walks one song and returns a [SongDiagnosis] when anything is wrong
//! with it. Clean songs produce `None` and are dropped before reporting.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::data::palette::is_assigned_palette_id;
use crate::data::reference::ReferenceStore;
use crate::data::song::{Note, Song};

/// Report severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DefectSeverity {
    Highest,
    High,
    Medium,
}

impl DefectSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Highest => "HIGHEST",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
        }
    }
}

impl fmt::Display for DefectSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four defect categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DefectCategory {
    InvalidNotes,
    MissingPaletteSkills,
    UnknownAbilities,
    UnknownNotes,
}

impl DefectCategory {
    pub const ALL: [DefectCategory; 4] = [
        Self::InvalidNotes,
        Self::MissingPaletteSkills,
        Self::UnknownAbilities,
        Self::UnknownNotes,
    ];

    pub fn severity(&self) -> DefectSeverity {
        match self {
            Self::InvalidNotes => DefectSeverity::Highest,
            Self::MissingPaletteSkills | Self::UnknownAbilities => DefectSeverity::High,
            Self::UnknownNotes => DefectSeverity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidNotes => "invalid_notes",
            Self::MissingPaletteSkills => "missing_palette_skills",
            Self::UnknownAbilities => "unknown_abilities",
            Self::UnknownNotes => "unknown_notes",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidNotes => "Invalid Notes",
            Self::MissingPaletteSkills => "Missing Palette Skills",
            Self::UnknownAbilities => "Unknown Abilities",
            Self::UnknownNotes => "Unknown Notes",
        }
    }
}

impl fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvalidReason {
    MissingKey(&'static str),
    MalformedKey(&'static str),
    /// Carries the time of the last accepted note.
    TimeBeforePrevious(f64),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "MISSING EXPECTED KEY: {key}"),
            Self::MalformedKey(key) => write!(f, "MALFORMED VALUE FOR KEY: {key}"),
            Self::TimeBeforePrevious(time) => write!(f, "TIME IS BEFORE PREVIOUS NOTE: {time}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidNote {
    pub index: usize,
    pub note: Note,
    pub reason: InvalidReason,
}

/// First occurrence of a flagged ability within a song, plus how often it occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedNote {
    pub ability_id: i64,
    pub index: usize,
    pub count: usize,
    pub note: Note,
}

/// Ability id -> first flagged note, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FlaggedNotes {
    entries: Vec<FlaggedNote>,
    positions: HashMap<i64, usize>,
}

impl FlaggedNotes {
    /// Insert the first occurrence of `ability_id` or bump the count of an existing entry.
    pub fn record(&mut self, ability_id: i64, index: usize, note: &Note) {
        if let Some(&position) = self.positions.get(&ability_id) {
            self.entries[position].count += 1;
            return;
        }
        self.positions.insert(ability_id, self.entries.len());
        self.entries.push(FlaggedNote {
            ability_id,
            index,
            count: 1,
            note: note.clone(),
        });
    }

    pub fn get(&self, ability_id: i64) -> Option<&FlaggedNote> {
        self.positions
            .get(&ability_id)
            .map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlaggedNote> {
        self.entries.iter()
    }

    pub fn ability_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|entry| entry.ability_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of occurrences across every flagged ability.
    pub fn total_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}

/// Everything wrong with one song. Only built for songs with at least one defect.
#[derive(Debug, Clone)]
pub struct SongDiagnosis {
    pub file_name: String,
    pub file_path: PathBuf,
    pub song: Song,
    pub invalid_notes: Vec<InvalidNote>,
    /// Assigned utility palette ids missing from the palette lookup, first-seen order, no repeats.
    pub unknown_palette_ids: Vec<i64>,
    /// Notes whose ability id is not in the ability table.
    pub unknown_abilities: FlaggedNotes,
    /// Notes with a known ability but an `Unknown` note type.
    pub unknown_notes: FlaggedNotes,
}

impl SongDiagnosis {
    pub fn has_defects(&self) -> bool {
        !self.invalid_notes.is_empty()
            || !self.unknown_palette_ids.is_empty()
            || !self.unknown_abilities.is_empty()
            || !self.unknown_notes.is_empty()
    }

    /// Record which file the song came from.
    pub fn with_source(mut self, path: &Path) -> Self {
        self.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.file_path = path.to_path_buf();
        self
    }
}

/// Palette ids of a non-revenant build that the palette lookup cannot resolve.
pub fn unresolved_palette_ids(song: &Song, refs: &ReferenceStore) -> Vec<i64> {
    if song.is_revenant() {
        return Vec::new();
    }
    let mut unresolved = Vec::new();
    for &palette_id in song.utility_palette_ids() {
        if is_assigned_palette_id(palette_id)
            && !refs.has_palette_id(palette_id)
            && !unresolved.contains(&palette_id)
        {
            unresolved.push(palette_id);
        }
    }
    unresolved
}

/// Validate one song against the reference tables. Returns `None` for a clean song.
pub fn parse_song(song: Song, refs: &ReferenceStore) -> Option<SongDiagnosis> {
    let unknown_palette_ids = unresolved_palette_ids(&song, refs);

    let mut invalid_notes = Vec::new();
    let mut unknown_abilities = FlaggedNotes::default();
    let mut unknown_notes = FlaggedNotes::default();

    let mut running_time = 0.0f64;
    for (index, note) in song.notes.iter().enumerate() {
        if let Some(key) = note.first_missing_key() {
            invalid_notes.push(InvalidNote {
                index,
                note: note.clone(),
                reason: InvalidReason::MissingKey(key),
            });
            continue;
        }
        if let Some(key) = note.first_malformed_key() {
            invalid_notes.push(InvalidNote {
                index,
                note: note.clone(),
                reason: InvalidReason::MalformedKey(key),
            });
            continue;
        }
        let (Some(time), Some(ability_id)) = (note.time(), note.ability_id()) else {
            continue;
        };

        if time < running_time {
            invalid_notes.push(InvalidNote {
                index,
                note: note.clone(),
                reason: InvalidReason::TimeBeforePrevious(running_time),
            });
            continue;
        }
        running_time = time;

        // An unknown note type only matters once the ability itself is known.
        if !refs.has_ability(ability_id) {
            unknown_abilities.record(ability_id, index, note);
        } else if note.is_unknown_type() {
            unknown_notes.record(ability_id, index, note);
        }
    }

    let diagnosis = SongDiagnosis {
        file_name: String::new(),
        file_path: PathBuf::new(),
        song,
        invalid_notes,
        unknown_palette_ids,
        unknown_abilities,
        unknown_notes,
    };
    diagnosis.has_defects().then_some(diagnosis)
}
