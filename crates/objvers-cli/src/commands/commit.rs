//! `objvers commit` and `objvers delete`

use super::{CommandResult, GlobalArgs};
use clap::Args;
use objvers_core::commit::{Commit, CommitOutcome};
use objvers_core::graph::GlobalId;
use objvers_store::document::parse_object_file;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CommitArgs {
    /// Object document to record
    pub document: PathBuf,

    #[arg(long)]
    pub author: String,

    /// Record every node as INITIAL, regardless of history
    #[arg(long)]
    pub initial: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Global id of the object, e.g. `Person/1` or `Tag/'7'` for a numeric-looking text id
    #[arg(required_unless_present = "document", conflicts_with = "document")]
    pub id: Option<GlobalId>,

    /// Object document whose root is deleted
    #[arg(long)]
    pub document: Option<PathBuf>,

    #[arg(long)]
    pub author: String,
}

pub fn execute_commit(global: &GlobalArgs, args: CommitArgs) -> CommandResult {
    let objvers = global.engine()?;
    let graph = parse_object_file(&args.document)?;

    let outcome = if args.initial {
        CommitOutcome::Committed(objvers.commit_initial(&args.author, &graph)?)
    } else {
        objvers.commit(&args.author, &graph)?
    };

    match outcome {
        CommitOutcome::Committed(commit) => print_commit(&commit),
        CommitOutcome::Unchanged => println!("No changes"),
    }
    Ok(())
}

pub fn execute_delete(global: &GlobalArgs, args: DeleteArgs) -> CommandResult {
    let objvers = global.engine()?;

    let commit = match (args.id, args.document) {
        (Some(id), _) => objvers.commit_terminal_by_id(&args.author, &id)?,
        (None, Some(path)) => objvers.commit_terminal(&args.author, &parse_object_file(&path)?)?,
        (None, None) => return Err("Must specify either an id or --document".into()),
    };
    print_commit(&commit);
    Ok(())
}

fn print_commit(commit: &Commit) {
    println!(
        "Committed {} ({} snapshot{}, {} change{})",
        commit.id(),
        commit.snapshots.len(),
        if commit.snapshots.len() == 1 { "" } else { "s" },
        commit.diff.len(),
        if commit.diff.len() == 1 { "" } else { "s" },
    );
    for snapshot in &commit.snapshots {
        println!(
            "  {} v{} {}",
            snapshot.global_id(),
            snapshot.version,
            snapshot.snapshot_type.as_str()
        );
    }
}
