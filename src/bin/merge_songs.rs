//! One-off: merge every *.json song in the songs folder into the bundled default-songs array.
//! Run from the scripts folder: cargo run --bin merge_songs [-- <songs_dir> <output_file>]

use std::fs;
use std::path::PathBuf;

use songlint::cli::init_tracing;
use songlint::data::song::{collect_song_values, DEFAULT_SONGS_DIR};

const DEFAULT_OUTPUT_FILE: &str = "../DanceDanceRotationModule/ref/defaultSongs.json";

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let mut args = std::env::args().skip(1);
    let songs_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_SONGS_DIR.to_string()));
    let output = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()));

    let songs = collect_song_values(&songs_dir)?;
    let json = serde_json::to_string_pretty(&songs)?;
    fs::write(&output, json)?;
    println!("Wrote {} ({} songs)", output.display(), songs.len());
    Ok(())
}
