//! Corpus scan: run the song parser over every file in the songs folder.

use std::path::Path;

use tracing::{debug, info};

use crate::data::reference::ReferenceStore;
use crate::data::song::{list_song_files, load_song};
use crate::data::validate::{parse_song, SongDiagnosis};
use crate::error::Result;

/// Parse every file in `dir` as a song and keep the diagnoses of songs with defects.
///
/// Every file in the folder is treated as a song; a file that cannot be read or
/// parsed aborts the scan.
pub fn scan_song_folder(dir: impl AsRef<Path>, refs: &ReferenceStore) -> Result<Vec<SongDiagnosis>> {
    let dir = dir.as_ref();
    let files = list_song_files(dir)?;
    info!("scanning {} song files in {}", files.len(), dir.display());

    let mut diagnoses = Vec::new();
    for path in &files {
        let song = load_song(path)?;
        match parse_song(song, refs) {
            Some(diagnosis) => {
                debug!("{}: defects found", path.display());
                diagnoses.push(diagnosis.with_source(path));
            }
            None => debug!("{}: clean", path.display()),
        }
    }
    info!(
        "{} of {} songs have defects",
        diagnoses.len(),
        files.len()
    );
    Ok(diagnoses)
}
