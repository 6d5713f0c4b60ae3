//! Engine construction

#![allow(clippy::result_large_err)]

use crate::objvers::Objvers;
use objvers_core::diff::{DiffOptions, ListCompareAlgorithm};
use objvers_core::errors::{validation, ExResult};
use objvers_core::metamodel::{PropertyScanner, TypeMapping, TypeRegistry};
use objvers_core::repository::{InMemoryRepository, Repository};
use objvers_core_types::TraceId;
use objvers_store::schema::parse_schema_file;
use objvers_store::SqliteRepository;
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for [`Objvers`]
///
/// Exactly one type source is required: a scanner or a schema file.
/// Without a repository the engine keeps history in memory.
#[derive(Default)]
pub struct ObjversBuilder {
    scanner: Option<Arc<dyn PropertyScanner>>,
    schema_path: Option<PathBuf>,
    mappings: Vec<(String, TypeMapping)>,
    options: DiffOptions,
    repository: Option<Arc<dyn Repository>>,
    sqlite_path: Option<PathBuf>,
    trace_id: Option<TraceId>,
}

impl ObjversBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scanner(mut self, scanner: impl PropertyScanner + 'static) -> Self {
        self.scanner = Some(Arc::new(scanner));
        self
    }

    /// Load types and mappings from a YAML schema file at build time
    pub fn schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }

    /// Explicit classification. Overrides mappings from a schema file.
    pub fn mapping(mut self, type_name: impl Into<String>, mapping: TypeMapping) -> Self {
        self.mappings.push((type_name.into(), mapping));
        self
    }

    pub fn diff_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    pub fn list_compare(mut self, algorithm: ListCompareAlgorithm) -> Self {
        self.options.list_compare = algorithm;
        self
    }

    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Persist history in a SQLite database file, created on demand
    pub fn sqlite(mut self, path: impl Into<PathBuf>) -> Self {
        self.sqlite_path = Some(path.into());
        self
    }

    /// Trace id shared by every operation of the built engine
    pub fn trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// # Errors
    ///
    /// `Validation` when no type source, or two type sources or two
    /// repositories, are configured. Schema and database errors propagate.
    pub fn build(self) -> ExResult<Objvers> {
        let (scanner, mut mappings) = match (self.scanner, self.schema_path) {
            (Some(_), Some(_)) => {
                return Err(validation(
                    "build",
                    "configure either a scanner or a schema file, not both",
                ))
            }
            (Some(scanner), None) => (scanner, Vec::new()),
            (None, Some(path)) => {
                let loaded = parse_schema_file(&path)?;
                let scanner: Arc<dyn PropertyScanner> = Arc::new(loaded.scanner);
                (scanner, loaded.mappings)
            }
            (None, None) => {
                return Err(validation(
                    "build",
                    "a scanner or a schema file is required",
                ))
            }
        };
        mappings.extend(self.mappings);

        let mut registry = TypeRegistry::new(scanner);
        for (type_name, mapping) in mappings {
            registry.register_mapping(type_name, mapping);
        }

        let repository: Arc<dyn Repository> = match (self.repository, self.sqlite_path) {
            (Some(_), Some(_)) => {
                return Err(validation(
                    "build",
                    "configure either a repository or a sqlite path, not both",
                ))
            }
            (Some(repository), None) => repository,
            (None, Some(path)) => Arc::new(SqliteRepository::open(path)?),
            (None, None) => Arc::new(InMemoryRepository::new()),
        };

        tracing::debug!(
            list_compare = ?self.options.list_compare,
            "objvers engine built"
        );
        Ok(Objvers::new(registry, repository, self.options, self.trace_id))
    }
}

impl std::fmt::Debug for ObjversBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjversBuilder")
            .field("schema_path", &self.schema_path)
            .field("mappings", &self.mappings)
            .field("options", &self.options)
            .field("sqlite_path", &self.sqlite_path)
            .field("trace_id", &self.trace_id)
            .finish_non_exhaustive()
    }
}
