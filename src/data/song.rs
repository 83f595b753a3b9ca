//! Song files: one JSON object per file, produced by the rotation composer from a combat log.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::data::loader::read_json_file;
use crate::data::profession::Profession;
use crate::error::{Result, VerifyError};

pub const DEFAULT_SONGS_DIR: &str = "../defaultSongs";

/// Placeholder note type for notes whose role the composer could not determine.
pub const NOTE_TYPE_UNKNOWN: &str = "Unknown";

/// Ability id the composer emits for a weapon swap; it has no catalog entry.
pub const WEAPON_SWAP_ABILITY_ID: i64 = -2;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub log_url: String,
    #[serde(default)]
    pub build_url: String,
    #[serde(default)]
    pub build_chat_code: String,
    pub decoded_build_template: BuildTemplate,
    pub notes: Vec<Note>,
}

impl Song {
    pub fn profession_code(&self) -> u8 {
        self.decoded_build_template.profession
    }

    pub fn profession(&self) -> Option<Profession> {
        Profession::from_code(self.profession_code())
    }

    /// Revenant templates do not carry usable utility palette ids.
    pub fn is_revenant(&self) -> bool {
        self.profession_code() == Profession::REVENANT_CODE
    }

    pub fn utility_palette_ids(&self) -> &[i64] {
        &self.decoded_build_template.skills.terrestrial.utilities
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildTemplate {
    pub profession: u8,
    #[serde(default)]
    pub skills: BuildSkills,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSkills {
    #[serde(default)]
    pub terrestrial: SkillBar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillBar {
    #[serde(default)]
    pub heal: Option<i64>,
    #[serde(default)]
    pub utilities: Vec<i64>,
    #[serde(default)]
    pub elite: Option<i64>,
}

/// Keys every note must carry, in the order they are checked.
pub const REQUIRED_NOTE_KEYS: [&str; 4] = ["time", "duration", "noteType", "abilityId"];

/// A single timestamped ability use, kept as the raw JSON object so that
/// missing or oddly typed keys can be reported instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Note {
    fields: Map<String, Value>,
}

impl Note {
    /// Value of `key`; an explicit `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    /// Milliseconds since the start of the song. Fractional times are accepted.
    pub fn time(&self) -> Option<f64> {
        self.get("time").and_then(Value::as_f64)
    }

    /// Only ever dumped, so any JSON value is accepted.
    pub fn duration(&self) -> Option<&Value> {
        self.get("duration")
    }

    pub fn note_type(&self) -> Option<&str> {
        self.get("noteType").and_then(Value::as_str)
    }

    pub fn ability_id(&self) -> Option<i64> {
        self.get("abilityId").and_then(Value::as_i64)
    }

    pub fn first_missing_key(&self) -> Option<&'static str> {
        REQUIRED_NOTE_KEYS
            .into_iter()
            .find(|key| self.get(key).is_none())
    }

    /// First required key whose value has the wrong JSON type.
    pub fn first_malformed_key(&self) -> Option<&'static str> {
        if self.time().is_none() {
            Some("time")
        } else if self.note_type().is_none() {
            Some("noteType")
        } else if self.ability_id().is_none() {
            Some("abilityId")
        } else {
            None
        }
    }

    pub fn is_unknown_type(&self) -> bool {
        self.note_type() == Some(NOTE_TYPE_UNKNOWN)
    }

    /// Every key of the note as `(key, JSON value)`, in file order.
    pub fn fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }
}

pub fn load_song(path: impl AsRef<Path>) -> Result<Song> {
    read_json_file(path)
}

/// Every regular file in `dir`, sorted by file name. Sub-directories are skipped.
pub fn list_song_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| VerifyError::io(dir, err))? {
        let entry = entry.map_err(|err| VerifyError::io(dir, err))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Collect every `*.json` song in `dir` as raw JSON, in file-name order.
/// Used to build the bundled default-songs array shipped with the module.
pub fn collect_song_values(dir: impl AsRef<Path>) -> Result<Vec<Value>> {
    let mut songs = Vec::new();
    for path in list_song_files(dir)? {
        if path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        if let Some(name) = path.file_name() {
            info!("adding '{}'", name.to_string_lossy());
        }
        songs.push(read_json_file(&path)?);
    }
    Ok(songs)
}
