//! objvers CLI
//!
//! Command-line interface for recording and querying object history

use clap::{Parser, Subcommand};
use objvers_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "objvers")]
#[command(about = "objvers - Object graph version control", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    /// Log to stderr: `text` or `json`. Silent when omitted.
    #[arg(long, global = true)]
    log_format: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two object documents without recording anything
    Diff(commands::diff::DiffArgs),
    /// Record the changes of an object document
    Commit(commands::commit::CommitArgs),
    /// Record the deletion of an object
    Delete(commands::commit::DeleteArgs),
    /// Recorded snapshots, newest first
    History(commands::history::HistoryArgs),
    /// Recorded changes, newest first
    Changes(commands::history::ChangesArgs),
    /// Latest recorded state of an object
    Latest(commands::history::LatestArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Some(profile) = cli.log_format {
        logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(&cli.global, args),
        Commands::Commit(args) => commands::commit::execute_commit(&cli.global, args),
        Commands::Delete(args) => commands::commit::execute_delete(&cli.global, args),
        Commands::History(args) => commands::history::execute_history(&cli.global, args),
        Commands::Changes(args) => commands::history::execute_changes(&cli.global, args),
        Commands::Latest(args) => commands::history::execute_latest(&cli.global, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
