//! Shared JSON file loading for reference tables and song files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Result, VerifyError};

const UTF8_BOM: char = '\u{feff}';

/// Read and deserialize a JSON file. A leading UTF-8 byte-order mark is ignored,
/// since the hand-edited overlay files are saved with one by some editors.
pub fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| VerifyError::io(path, err))?;
    parse_json(&raw).map_err(|err| VerifyError::json(path, err))
}

/// Deserialize JSON text, ignoring a leading byte-order mark.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str(raw.strip_prefix(UTF8_BOM).unwrap_or(raw))
}
