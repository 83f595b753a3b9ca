//! End-to-end verification run: load references, scan songs, report.

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::data::ability::{DEFAULT_ABILITY_INFO_PATHS, DEFAULT_CATALOG_PATH};
use crate::data::corpus::scan_song_folder;
use crate::data::palette::DEFAULT_PALETTE_LOOKUP_PATH;
use crate::data::reference::ReferenceStore;
use crate::data::song::DEFAULT_SONGS_DIR;
use crate::error::{Result, VerifyError};
use crate::report::{run_reports, write_defects_csv, Confirm, ReportSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyConfig {
    pub songs_dir: PathBuf,
    pub catalog_path: PathBuf,
    /// Overlay files, merged left to right.
    pub ability_info_paths: Vec<PathBuf>,
    pub palette_path: PathBuf,
    pub csv_path: Option<PathBuf>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        VerifyConfig {
            songs_dir: PathBuf::from(DEFAULT_SONGS_DIR),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            ability_info_paths: DEFAULT_ABILITY_INFO_PATHS
                .iter()
                .map(PathBuf::from)
                .collect(),
            palette_path: PathBuf::from(DEFAULT_PALETTE_LOOKUP_PATH),
            csv_path: None,
        }
    }
}

/// Run the whole verification. Load failures abort before anything is reported.
pub fn run_verify(
    config: &VerifyConfig,
    confirm: Option<&mut dyn Confirm>,
    out: &mut dyn Write,
) -> Result<ReportSummary> {
    let refs = ReferenceStore::load(
        &config.catalog_path,
        &config.ability_info_paths,
        &config.palette_path,
    )?;
    info!(
        "reference store ready: {} abilities, {} palette entries",
        refs.ability_count(),
        refs.palette_count()
    );

    let diagnoses = scan_song_folder(&config.songs_dir, &refs)?;
    if let Some(csv_path) = &config.csv_path {
        write_defects_csv(&diagnoses, &refs, csv_path)?;
    }
    run_reports(&diagnoses, &refs, confirm, out).map_err(VerifyError::Report)
}
