use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use objc_xref::{import_command, init_db_command, list_runs_command, run_command};
use objc_xref_core::logging::{init_tracing, init_tracing_json};

/// Objective-C selector cross-reference recovery for ARM binaries.
///
/// This CLI is a thin wrapper around `objc-xref-core` (exposed in code as
/// `objc_xref_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "objc-xref",
    version,
    about = "Recover method cross-references through Objective-C selector references",
    long_about = None
)]
struct Cli {
    /// Emit logs as JSON instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty analysis database (or migrate an existing one).
    Init {
        /// Path to the analysis database file.
        #[arg(long)]
        db: PathBuf,
    },

    /// Load an analysis snapshot (JSON if the extension is `.json`, YAML otherwise).
    Import {
        /// Path to the analysis database file.
        #[arg(long)]
        db: PathBuf,

        /// Snapshot file exported from the analysis engine.
        #[arg(long)]
        snapshot: PathBuf,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Recover cross-references and write them into the analysis database.
    ///
    /// Segment names are fixed by convention (`__objc_methname`,
    /// `__objc_const`, `__objc_selrefs`, `__text`). Exits non-zero if a
    /// segment is missing or a method name has more than one selector reference.
    Run {
        /// Path to the analysis database file.
        #[arg(long)]
        db: PathBuf,

        /// Emit a JSON report instead of per-method lines.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List previous runs recorded in the analysis database.
    Runs {
        /// Path to the analysis database file.
        #[arg(long)]
        db: PathBuf,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        init_tracing_json();
    } else {
        init_tracing();
    }

    match cli.command {
        Command::Init { db } => init_db_command(&db)?,
        Command::Import { db, snapshot, json } => import_command(&db, &snapshot, json)?,
        Command::Run { db, json } => run_command(&db, json)?,
        Command::Runs { db, json } => list_runs_command(&db, json)?,
    }

    Ok(())
}
