//! `objvers diff`

use super::{CommandResult, GlobalArgs};
use clap::Args;
use objvers_core::diff::ListCompareAlgorithm;
use objvers_store::document::parse_object_file;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Object document before the change
    pub old: PathBuf,

    /// Object document after the change
    pub new: PathBuf,

    /// Compare lists index by index instead of aligning them
    #[arg(long)]
    pub positional: bool,

    /// Print the changes as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(global: &GlobalArgs, args: DiffArgs) -> CommandResult {
    let algorithm = if args.positional {
        ListCompareAlgorithm::Positional
    } else {
        ListCompareAlgorithm::AsAlignedList
    };
    let objvers = global.scratch_engine(|b| b.list_compare(algorithm))?;

    let old = parse_object_file(&args.old)?;
    let new = parse_object_file(&args.new)?;
    let diff = objvers.compare(&old, &new)?;

    if args.json {
        println!("{}", objvers.to_json(&diff)?);
    } else if diff.is_empty() {
        println!("No changes");
    } else {
        print!("{}", objvers.render_change_log(diff.changes()));
    }
    Ok(())
}
