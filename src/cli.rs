use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::report::{Confirm, StdinConfirm};
use crate::verify::{run_verify, VerifyConfig};

#[derive(Debug, Parser)]
#[command(name = "songlint", about = "Find and explain defects in rotation song data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check every song against the ability and palette reference tables.
    Verify(VerifyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// Folder of song JSON files.
    #[arg(long, env = "SONGLINT_SONGS_DIR")]
    pub songs: Option<PathBuf>,

    /// Skill catalog fetched from the game API (allSkills.json).
    #[arg(long, env = "SONGLINT_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Ability-info overlay file; repeat or comma-separate, later files win.
    #[arg(long = "ability-info", env = "SONGLINT_ABILITY_INFO", value_delimiter = ',')]
    pub ability_info: Vec<PathBuf>,

    /// Palette id -> ability id lookup.
    #[arg(long, env = "SONGLINT_PALETTE")]
    pub palette: Option<PathBuf>,

    /// Also write every defect to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Never offer to delete mismatched songs.
    #[arg(long)]
    pub no_delete: bool,
}

impl VerifyArgs {
    pub fn to_config(&self) -> VerifyConfig {
        let defaults = VerifyConfig::default();
        VerifyConfig {
            songs_dir: self.songs.clone().unwrap_or(defaults.songs_dir),
            catalog_path: self.catalog.clone().unwrap_or(defaults.catalog_path),
            ability_info_paths: if self.ability_info.is_empty() {
                defaults.ability_info_paths
            } else {
                self.ability_info.clone()
            },
            palette_path: self.palette.clone().unwrap_or(defaults.palette_path),
            csv_path: self.csv.clone(),
        }
    }
}

/// Log to stderr so the report on stdout stays clean. Level comes from `RUST_LOG`, default `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Parse `args` (program name first) and run the command. Returns the process exit code.
pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return code;
        }
    };
    match cli.command {
        Command::Verify(args) => handle_verify(&args),
    }
}

fn handle_verify(args: &VerifyArgs) -> i32 {
    let config = args.to_config();
    let mut stdin_confirm = StdinConfirm;
    let confirm: Option<&mut dyn Confirm> = if args.no_delete {
        None
    } else {
        Some(&mut stdin_confirm as &mut dyn Confirm)
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run_verify(&config, confirm, &mut out) {
        // Defects are reported, not signaled through the exit code.
        Ok(_) => 0,
        Err(err) => {
            eprintln!("verification failed: {err}");
            1
        }
    }
}
