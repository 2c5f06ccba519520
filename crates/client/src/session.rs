use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use relq_common::{RelqError, Result, SessionConfig, SessionId, StagingId};
use relq_planner::{Analyzer, ColumnCatalog, PlanNode};
use relq_sql::{compile, Compiled, DeterministicNamer, SqliteDialect, TempNamer};

use crate::engine::Engine;
use crate::rows::{RowSet, Value};

pub type SharedSession = Arc<Session>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Cancellation signal for a materialization in flight.
///
/// Raising the token before completion makes the call return
/// [`RelqError::Cancelled`] after cleaning up any staged tables it created.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StagedState {
    Staging,
    Present,
}

#[derive(Debug)]
struct StagedTable {
    state: StagedState,
    fingerprint: u64,
}

/// A staged table the session failed to remove during `close()`.
#[derive(Debug)]
pub struct CleanupFailure {
    pub table: String,
    pub message: String,
}

/// One open connection to an engine.
///
/// Owns every staged temporary table it creates; the engine is never
/// trusted to clean transient artifacts up on disconnect, so [`Session::close`]
/// attempts removal of all of them and reports residual failures instead of
/// raising.
pub struct Session {
    engine: Box<dyn Engine>,
    config: SessionConfig,
    id: SessionId,
    analyzer: Analyzer,
    dialect: SqliteDialect,
    staged: Mutex<HashMap<String, StagedTable>>,
    staging_seq: AtomicU64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let staged = self
            .staged
            .lock()
            .map(|m| m.len())
            .unwrap_or_default();
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("staged", &staged)
            .finish()
    }
}

impl Session {
    /// Open a session over an engine handle.
    pub fn open(engine: Box<dyn Engine>, config: SessionConfig) -> SharedSession {
        Arc::new(Self {
            engine,
            config,
            id: SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::SeqCst)),
            analyzer: Analyzer::new(),
            dialect: SqliteDialect,
            staged: Mutex::new(HashMap::new()),
            staging_seq: AtomicU64::new(0),
        })
    }

    /// Open a session over a fresh in-memory SQLite engine.
    pub fn open_in_memory(config: SessionConfig) -> Result<SharedSession> {
        Ok(Self::open(
            Box::new(crate::sqlite::SqliteEngine::open_in_memory()?),
            config,
        ))
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a pipeline reading an engine-resident table.
    pub fn table(self: &Arc<Self>, name: impl Into<String>) -> crate::DataFrame {
        crate::DataFrame::new(Arc::clone(self), PlanNode::source(name.into()))
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.engine.list_tables()
    }

    /// Stage host-held rows as an engine-side table named `name`.
    ///
    /// Re-staging identical contents is a no-op; differing contents fail
    /// with `StagingConflict`. Overwriting is [`Session::stage_overwrite`],
    /// never implicit.
    pub fn stage(&self, name: &str, rows: &RowSet) -> Result<()> {
        self.stage_inner(name, rows, false)
    }

    /// Stage, replacing an existing table of the same name.
    pub fn stage_overwrite(&self, name: &str, rows: &RowSet) -> Result<()> {
        self.stage_inner(name, rows, true)
    }

    fn stage_inner(&self, name: &str, rows: &RowSet, overwrite: bool) -> Result<()> {
        let fingerprint = rows.fingerprint();
        let mut registry = self.staged.lock().expect("staging registry lock poisoned");

        match registry.get(name) {
            Some(t) if t.state == StagedState::Present => {
                if t.fingerprint == fingerprint {
                    return Ok(());
                }
                if !overwrite {
                    return Err(RelqError::StagingConflict(format!(
                        "table `{name}` is already staged with different contents"
                    )));
                }
                self.engine.drop_table(name)?;
            }
            _ => {
                if self.engine.table_columns(name)?.is_some() {
                    if !overwrite {
                        return Err(RelqError::StagingConflict(format!(
                            "table `{name}` already exists on the engine"
                        )));
                    }
                    self.engine.drop_table(name)?;
                }
            }
        }

        registry.insert(
            name.to_string(),
            StagedTable {
                state: StagedState::Staging,
                fingerprint,
            },
        );
        debug!(table = name, rows = rows.len(), "staging table");

        match self.engine.create_table(name, rows) {
            Ok(()) => {
                if let Some(t) = registry.get_mut(name) {
                    t.state = StagedState::Present;
                }
                Ok(())
            }
            Err(e) => {
                // A failed staging attempt must not leave a partial table.
                if let Err(drop_err) = self.engine.drop_table(name) {
                    warn!(table = name, error = %drop_err, "failed to remove partial staged table");
                }
                registry.remove(name);
                Err(e)
            }
        }
    }

    /// Remove a staged table. Idempotent: unstaging an absent or already
    /// dropped table is a no-op. Dropped tables leave the registry entirely
    /// so it never accumulates tombstones across materializations.
    pub fn unstage(&self, name: &str) -> Result<()> {
        let mut registry = self.staged.lock().expect("staging registry lock poisoned");
        if registry.contains_key(name) {
            self.engine.drop_table(name)?;
            registry.remove(name);
            debug!(table = name, "unstaged table");
        }
        Ok(())
    }

    /// Compile a plan without touching the engine, using the deterministic
    /// temp-name allocator.
    pub fn compile_only(&self, plan: &PlanNode) -> Result<Compiled> {
        self.analyzer
            .validate(plan, &EngineCatalog(self.engine.as_ref()), &self.config)?;
        let mut namer = DeterministicNamer::new(&self.config.temp_table_prefix);
        compile(plan, &self.config, &self.dialect, &mut namer)
    }

    /// Compile, stage any required temporaries, execute, and return rows.
    ///
    /// Per-call staged tables are removed before returning, on success,
    /// failure, and cancellation alike.
    pub fn materialize(&self, plan: &PlanNode, cancel: &CancelToken) -> Result<RowSet> {
        self.analyzer
            .validate(plan, &EngineCatalog(self.engine.as_ref()), &self.config)?;
        let mut namer = SessionNamer {
            prefix: &self.config.temp_table_prefix,
            session: self.id,
            seq: &self.staging_seq,
        };
        let compiled = compile(plan, &self.config, &self.dialect, &mut namer)?;

        let mut created: Vec<String> = vec![];
        let result = self.run_compiled(&compiled, cancel, &mut created);
        for table in &created {
            if let Err(e) = self.unstage(table) {
                warn!(table = %table, error = %e, "failed to drop per-call staged table");
            }
        }
        result
    }

    fn run_compiled(
        &self,
        compiled: &Compiled,
        cancel: &CancelToken,
        created: &mut Vec<String>,
    ) -> Result<RowSet> {
        for req in &compiled.staging {
            if cancel.is_raised() {
                return Err(RelqError::Cancelled);
            }
            let rows = RowSet::from_rows(
                vec![req.column.clone()],
                req.values.iter().map(|v| vec![Value::from(v)]),
            )?;
            self.stage(&req.table, &rows)?;
            created.push(req.table.clone());
        }
        if cancel.is_raised() {
            return Err(RelqError::Cancelled);
        }
        debug!(sql = %compiled.sql, "executing compiled statement");
        self.engine.execute(&compiled.sql)
    }

    /// Attempt removal of every tracked staged table.
    ///
    /// Failures are reported, not raised: the engine does not guarantee
    /// cleanup of transient artifacts on abrupt session end, so the caller
    /// should know which tables may linger.
    pub fn close(&self) -> Vec<CleanupFailure> {
        let mut registry = self.staged.lock().expect("staging registry lock poisoned");
        let mut failures = vec![];
        registry.retain(|name, _| match self.engine.drop_table(name) {
            Ok(()) => {
                debug!(table = %name, "dropped staged table on close");
                false
            }
            Err(e) => {
                warn!(table = %name, error = %e, "failed to drop staged table on close");
                failures.push(CleanupFailure {
                    table: name.clone(),
                    message: e.to_string(),
                });
                true
            }
        });
        failures
    }
}

/// Column catalog backed by engine introspection.
struct EngineCatalog<'a>(&'a dyn Engine);

impl ColumnCatalog for EngineCatalog<'_> {
    fn table_columns(&self, table: &str) -> Result<Option<Vec<String>>> {
        self.0.table_columns(table)
    }
}

/// Temp-name allocator seeded with session identity and a monotone counter,
/// so names never collide across interleaved materializations.
struct SessionNamer<'a> {
    prefix: &'a str,
    session: SessionId,
    seq: &'a AtomicU64,
}

impl TempNamer for SessionNamer<'_> {
    fn next_name(&mut self) -> String {
        let seq = StagingId(self.seq.fetch_add(1, Ordering::SeqCst));
        format!("{}_{}_{}", self.prefix, self.session, seq)
    }
}
