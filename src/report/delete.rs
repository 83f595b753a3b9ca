//! Confirmation-gated deletion of songs judged unrecoverable.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{info, warn};

/// Decides whether the proposed files may be deleted.
pub trait Confirm {
    fn confirm(&mut self, files: &[PathBuf]) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&[PathBuf]) -> bool,
{
    fn confirm(&mut self, files: &[PathBuf]) -> bool {
        self(files)
    }
}

/// Reads one answer line from standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, _files: &[PathBuf]) -> bool {
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                warn!("could not read confirmation: {err}");
                false
            }
        }
    }
}

/// Only an exact, case-sensitive `y` or `yes` (line ending aside) counts as consent.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim_end_matches(&['\r', '\n'][..]), "y" | "yes")
}

/// List the distinct candidate files, ask for confirmation and delete them if granted.
/// Returns the files that were removed.
pub fn propose_deletion(
    candidates: &[PathBuf],
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !files.contains(candidate) {
            files.push(candidate.clone());
        }
    }
    if files.is_empty() {
        return Ok(Vec::new());
    }

    writeln!(out)?;
    writeln!(
        out,
        "The following {} song file(s) look like build code / log mismatches:",
        files.len()
    )?;
    for file in &files {
        writeln!(out, "    {}", file.display())?;
    }
    write!(out, "Delete these files? Type 'y' or 'yes' to confirm: ")?;
    out.flush()?;

    if !confirm.confirm(&files) {
        writeln!(out)?;
        writeln!(out, "Nothing deleted.")?;
        return Ok(Vec::new());
    }
    writeln!(out)?;
    delete_files(&files, out)
}

/// Delete each file once, continuing past failures.
pub fn delete_files(files: &[PathBuf], out: &mut dyn Write) -> io::Result<Vec<PathBuf>> {
    let mut deleted = Vec::new();
    for file in files {
        if deleted.contains(file) {
            continue;
        }
        match fs::remove_file(file) {
            Ok(()) => {
                info!("deleted {}", file.display());
                writeln!(out, "Deleted {}", file.display())?;
                deleted.push(file.clone());
            }
            Err(err) => {
                warn!("failed to delete {}: {err}", file.display());
                writeln!(out, "Failed to delete {}: {err}", file.display())?;
            }
        }
    }
    Ok(deleted)
}
