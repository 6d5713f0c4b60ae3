//! Subcommand implementations

pub mod commit;
pub mod diff;
pub mod history;

use clap::Args;
use objvers_core::errors::ExError;
use objvers_engine::{Objvers, ObjversBuilder};
use std::path::PathBuf;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Options shared by every subcommand
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Type schema file (YAML)
    #[arg(long, global = true, default_value = "objvers.yaml")]
    pub schema: PathBuf,

    /// History database
    #[arg(long, global = true, default_value = ".objvers/store.db")]
    pub db: PathBuf,
}

impl GlobalArgs {
    fn builder(&self) -> ObjversBuilder {
        Objvers::builder().schema_file(&self.schema)
    }

    /// Engine backed by the history database
    pub fn engine(&self) -> Result<Objvers, ExError> {
        self.builder().sqlite(&self.db).build()
    }

    /// Engine that records nothing to disk
    pub fn scratch_engine(&self, builder: impl FnOnce(ObjversBuilder) -> ObjversBuilder) -> Result<Objvers, ExError> {
        builder(self.builder()).build()
    }
}
