use relq_common::Result;

use crate::rows::RowSet;

/// Narrow interface to a SQL-speaking engine.
///
/// The core makes no assumptions about the engine beyond this trait and
/// "one statement execution in flight per session at a time". Errors are
/// surfaced opaquely as [`relq_common::RelqError::Engine`], wrapped with the
/// statement text that produced them, and are never retried.
pub trait Engine: Send + Sync {
    /// Run one statement and return its rows (empty for non-queries).
    fn execute(&self, sql: &str) -> Result<RowSet>;

    /// Create a table named `name` holding `rows`. Fails when the table
    /// already exists; overwriting is the caller's explicit decision.
    fn create_table(&self, name: &str, rows: &RowSet) -> Result<()>;

    /// Drop a table if it exists.
    fn drop_table(&self, name: &str) -> Result<()>;

    /// Column names of a table, or `None` when it does not exist.
    fn table_columns(&self, name: &str) -> Result<Option<Vec<String>>>;

    /// Names of user tables currently on the engine.
    fn list_tables(&self) -> Result<Vec<String>>;
}
