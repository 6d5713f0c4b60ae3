//! `objvers history`, `objvers changes` and `objvers latest`

use super::{CommandResult, GlobalArgs};
use clap::Args;
use objvers_core::commit::CommitId;
use objvers_core::graph::GlobalId;
use objvers_core::repository::{QueryFilter, DEFAULT_QUERY_LIMIT};

/// Snapshot selection shared by `history` and `changes`
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Global id, e.g. `Person/1`
    pub id: Option<GlobalId>,

    /// Only objects of this type
    #[arg(long = "type")]
    pub type_name: Option<String>,

    /// First commit to include, e.g. `2.0`
    #[arg(long)]
    pub from: Option<CommitId>,

    /// Last commit to include
    #[arg(long)]
    pub to: Option<CommitId>,

    #[arg(long, default_value_t = DEFAULT_QUERY_LIMIT)]
    pub limit: usize,

    #[arg(long)]
    pub json: bool,
}

impl FilterArgs {
    fn to_filter(&self) -> QueryFilter {
        QueryFilter {
            global_id: self.id.clone(),
            type_name: self.type_name.clone(),
            from_commit: self.from,
            to_commit: self.to,
            version: None,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args)]
pub struct LatestArgs {
    pub id: GlobalId,
}

pub fn execute_history(global: &GlobalArgs, args: HistoryArgs) -> CommandResult {
    let objvers = global.engine()?;
    let snapshots = objvers.state_history(&args.filter.to_filter())?;

    if args.filter.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }
    for snapshot in &snapshots {
        println!(
            "{} {} v{} {} by {} at {}",
            snapshot.commit_id(),
            snapshot.global_id(),
            snapshot.version,
            snapshot.snapshot_type.as_str(),
            snapshot.commit.author,
            snapshot.commit.committed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

pub fn execute_changes(global: &GlobalArgs, args: ChangesArgs) -> CommandResult {
    let objvers = global.engine()?;
    let changes = objvers.change_history(&args.filter.to_filter())?;

    if args.filter.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else {
        print!("{}", objvers.render_change_log(&changes));
    }
    Ok(())
}

pub fn execute_latest(global: &GlobalArgs, args: LatestArgs) -> CommandResult {
    let objvers = global.engine()?;
    let snapshot = objvers
        .latest(&args.id)?
        .ok_or_else(|| format!("No history for {}", args.id))?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    if objvers.is_terminated(&args.id)? {
        eprintln!("{} is deleted; showing its last state", args.id);
    }
    Ok(())
}
