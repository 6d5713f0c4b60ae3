//! The engine facade

#![allow(clippy::result_large_err)]

use crate::builder::ObjversBuilder;
use objvers_core::commit::{CdoSnapshot, Commit, CommitBuilder, CommitOutcome};
use objvers_core::diff::{render_change_log, Change, Diff, DiffEngine, DiffOptions};
use objvers_core::errors::{ExError, ExErrorKind, ExResult};
use objvers_core::graph::{GlobalId, GraphBuilder};
use objvers_core::metamodel::TypeRegistry;
use objvers_core::object::Object;
use objvers_core::query::QueryRunner;
use objvers_core::repository::{QueryFilter, Repository};
use objvers_core::{log_op_end, log_op_error, log_op_start};
use objvers_core_types::{RequestContext, TraceId};
use std::sync::Arc;
use std::time::Instant;

/// Object version-control engine
///
/// Owns the type registry and its caches; cheap to share behind an `Arc`.
pub struct Objvers {
    registry: TypeRegistry,
    repository: Arc<dyn Repository>,
    options: DiffOptions,
    trace_id: Option<TraceId>,
}

impl Objvers {
    pub fn builder() -> ObjversBuilder {
        ObjversBuilder::new()
    }

    pub(crate) fn new(
        registry: TypeRegistry,
        repository: Arc<dyn Repository>,
        options: DiffOptions,
        trace_id: Option<TraceId>,
    ) -> Self {
        Self {
            registry,
            repository,
            options,
            trace_id,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }

    pub fn options(&self) -> DiffOptions {
        self.options
    }

    // ========== Diff ==========

    /// Changes that turn the `old` graph into the `new` graph
    pub fn compare(&self, old: &Object, new: &Object) -> ExResult<Diff> {
        self.observe(
            "compare",
            || {
                let graphs = GraphBuilder::new(&self.registry);
                let left = graphs.build(old)?;
                let right = graphs.build(new)?;
                Ok(self.diff_engine().compare(Some(&left), Some(&right))?)
            },
            Diff::len,
        )
    }

    /// Changes that create the graph from nothing
    pub fn initial(&self, graph: &Object) -> ExResult<Diff> {
        self.observe(
            "initial",
            || {
                let graph = GraphBuilder::new(&self.registry).build(graph)?;
                Ok(self.diff_engine().initial(&graph)?)
            },
            Diff::len,
        )
    }

    // ========== Commits ==========

    /// Record every node of the graph that changed since its latest snapshot
    pub fn commit(&self, author: &str, graph: &Object) -> ExResult<CommitOutcome> {
        self.observe(
            "commit",
            || self.commit_builder().create(author, graph),
            |outcome| outcome.commit().map_or(0, |c| c.snapshots.len()),
        )
    }

    /// Record an INITIAL snapshot of every node of the graph
    pub fn commit_initial(&self, author: &str, graph: &Object) -> ExResult<Commit> {
        self.observe(
            "commit_initial",
            || self.commit_builder().create_initial(author, graph),
            |commit| commit.snapshots.len(),
        )
    }

    /// Record the deletion of the graph root
    pub fn commit_terminal(&self, author: &str, graph: &Object) -> ExResult<Commit> {
        self.observe(
            "commit_terminal",
            || self.commit_builder().create_terminal(author, graph),
            |commit| commit.snapshots.len(),
        )
    }

    /// Record the deletion of an object known only by its global id
    pub fn commit_terminal_by_id(&self, author: &str, id: &GlobalId) -> ExResult<Commit> {
        self.observe(
            "commit_terminal",
            || self.commit_builder().create_terminal_by_id(author, id),
            |commit| commit.snapshots.len(),
        )
    }

    // ========== Queries ==========

    /// Snapshots matching the filter, newest commit first
    pub fn state_history(&self, filter: &QueryFilter) -> ExResult<Vec<CdoSnapshot>> {
        self.observe(
            "state_history",
            || self.query_runner().run_state_query(filter),
            Vec::len,
        )
    }

    /// Changes recorded by the matching snapshots, newest commit first
    pub fn change_history(&self, filter: &QueryFilter) -> ExResult<Vec<Change>> {
        self.observe(
            "change_history",
            || self.query_runner().run_change_query(filter),
            Vec::len,
        )
    }

    /// Latest recorded state. A deleted object answers with its state
    /// before deletion.
    pub fn latest(&self, id: &GlobalId) -> ExResult<Option<CdoSnapshot>> {
        self.observe(
            "latest",
            || self.query_runner().latest_snapshot(id),
            |found| usize::from(found.is_some()),
        )
    }

    pub fn is_terminated(&self, id: &GlobalId) -> ExResult<bool> {
        self.observe(
            "is_terminated",
            || self.query_runner().is_terminated(id),
            |terminated| usize::from(*terminated),
        )
    }

    // ========== Output ==========

    /// JSON array, one object per change
    pub fn to_json(&self, diff: &Diff) -> ExResult<String> {
        serde_json::to_string_pretty(diff).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("to_json")
                .with_message(e.to_string())
        })
    }

    /// Human-readable change log grouped by commit
    pub fn render_change_log(&self, changes: &[Change]) -> String {
        render_change_log(changes)
    }

    fn diff_engine(&self) -> DiffEngine<'_> {
        DiffEngine::new(&self.registry, self.options)
    }

    fn commit_builder(&self) -> CommitBuilder<'_> {
        CommitBuilder::new(&self.registry, self.repository.as_ref(), self.options)
    }

    fn query_runner(&self) -> QueryRunner<'_> {
        QueryRunner::new(&self.registry, self.repository.as_ref(), self.options)
    }

    /// Run one operation under a fresh request context with lifecycle
    /// logging. Errors leave stamped with the operation and correlation ids.
    fn observe<T>(
        &self,
        op: &'static str,
        run: impl FnOnce() -> ExResult<T>,
        count: impl FnOnce(&T) -> usize,
    ) -> ExResult<T> {
        let ctx = RequestContext::traced(self.trace_id.as_ref());
        let trace_id = ctx.trace_id.as_ref().map(TraceId::as_str);
        log_op_start!(op, request_id = ctx.request_id.as_str(), trace_id = trace_id);
        let start = Instant::now();

        match run() {
            Ok(value) => {
                log_op_end!(
                    op,
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = ctx.request_id.as_str(),
                    result_count = count(&value) as u64
                );
                Ok(value)
            }
            Err(err) => {
                let err = stamp(err, op, &ctx);
                log_op_error!(
                    op,
                    err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = ctx.request_id.as_str()
                );
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Objvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Objvers")
            .field("options", &self.options)
            .field("trace_id", &self.trace_id)
            .finish_non_exhaustive()
    }
}

fn stamp(err: ExError, op: &str, ctx: &RequestContext) -> ExError {
    let err = if err.op().is_none() { err.with_op(op) } else { err };
    err.with_context(ctx)
}
