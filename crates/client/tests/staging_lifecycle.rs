use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use relq_client::{
    col, eq, Engine, JoinKind, RelqError, Result, RowSet, Session, SessionConfig, SqliteEngine,
    Value,
};

fn dim_rows(values: &[(i64, &str)]) -> RowSet {
    RowSet::from_rows(
        vec!["k".to_string(), "label".to_string()],
        values
            .iter()
            .map(|(k, l)| vec![Value::Integer(*k), Value::Text(l.to_string())]),
    )
    .unwrap()
}

fn fact_rows(values: &[(i64, i64)]) -> RowSet {
    RowSet::from_rows(
        vec!["k".to_string(), "x".to_string()],
        values
            .iter()
            .map(|(k, x)| vec![Value::Integer(*k), Value::Integer(*x)]),
    )
    .unwrap()
}

#[test]
fn stage_join_unstage_leaves_engine_clean() {
    let session = Session::open_in_memory(SessionConfig::default()).unwrap();
    session
        .stage("facts", &fact_rows(&[(1, 10), (2, 20), (3, 30)]))
        .unwrap();
    session
        .stage("dim", &dim_rows(&[(1, "one"), (2, "two")]))
        .unwrap();

    let joined = session
        .table("facts")
        .join(
            &session.table("dim"),
            JoinKind::Inner,
            vec![("k".to_string(), "k".to_string())],
        )
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(joined.len(), 2);

    session.unstage("facts").unwrap();
    session.unstage("dim").unwrap();
    assert!(session.list_tables().unwrap().is_empty());

    // Unstaging an absent or already dropped table is a no-op.
    session.unstage("facts").unwrap();
    session.unstage("never_staged").unwrap();
}

#[test]
fn restaging_same_contents_is_noop_differing_contents_conflict() {
    let session = Session::open_in_memory(SessionConfig::default()).unwrap();
    let rows = dim_rows(&[(1, "one")]);
    session.stage("dim", &rows).unwrap();
    session.stage("dim", &rows).unwrap();

    let err = session
        .stage("dim", &dim_rows(&[(1, "uno")]))
        .unwrap_err();
    assert!(matches!(err, RelqError::StagingConflict(_)), "{err}");
}

#[test]
fn stage_overwrite_replaces_contents() {
    let session = Session::open_in_memory(SessionConfig::default()).unwrap();
    session.stage("dim", &dim_rows(&[(1, "one")])).unwrap();
    session
        .stage_overwrite("dim", &dim_rows(&[(1, "uno"), (2, "dos")]))
        .unwrap();

    let out = session
        .table("dim")
        .filter(eq(col("k"), relq_client::lit_i64(1)))
        .collect()
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.value(0, "label"), Some(&Value::Text("uno".to_string())));
}

#[test]
fn stage_refuses_to_clobber_untracked_engine_table() {
    let engine = SqliteEngine::open_in_memory().unwrap();
    engine.create_table("pre", &dim_rows(&[(9, "nine")])).unwrap();
    let session = Session::open(Box::new(engine), SessionConfig::default());

    let err = session.stage("pre", &dim_rows(&[(1, "one")])).unwrap_err();
    assert!(matches!(err, RelqError::StagingConflict(_)), "{err}");

    // Explicit overwrite is allowed.
    session
        .stage_overwrite("pre", &dim_rows(&[(1, "one")]))
        .unwrap();
    let out = session.table("pre").collect().unwrap();
    assert_eq!(out.len(), 1);
}

/// Engine double counting `drop_table` calls.
struct CountingEngine {
    drops: Arc<AtomicUsize>,
}

impl Engine for CountingEngine {
    fn execute(&self, _sql: &str) -> Result<RowSet> {
        Ok(RowSet::new(vec![]))
    }

    fn create_table(&self, _name: &str, _rows: &RowSet) -> Result<()> {
        Ok(())
    }

    fn drop_table(&self, _name: &str) -> Result<()> {
        self.drops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn table_columns(&self, _name: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

#[test]
fn close_does_not_revisit_already_dropped_tables() {
    let drops = Arc::new(AtomicUsize::new(0));
    let session = Session::open(
        Box::new(CountingEngine {
            drops: Arc::clone(&drops),
        }),
        SessionConfig::default(),
    );
    session.stage("a", &dim_rows(&[(1, "one")])).unwrap();
    session.stage("b", &dim_rows(&[(2, "two")])).unwrap();
    session.unstage("a").unwrap();
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    // Only the still-present table gets dropped; "a" left the registry when
    // it was unstaged.
    let failures = session.close();
    assert!(failures.is_empty());
    assert_eq!(drops.load(Ordering::SeqCst), 2);

    // A second close finds nothing left to drop.
    assert!(session.close().is_empty());
    assert_eq!(drops.load(Ordering::SeqCst), 2);
}

/// Engine double whose `drop_table` always fails, to observe close() behavior.
struct UndroppableEngine;

impl Engine for UndroppableEngine {
    fn execute(&self, _sql: &str) -> Result<RowSet> {
        Ok(RowSet::new(vec![]))
    }

    fn create_table(&self, _name: &str, _rows: &RowSet) -> Result<()> {
        Ok(())
    }

    fn drop_table(&self, name: &str) -> Result<()> {
        Err(RelqError::engine(
            "cannot drop",
            format!("DROP TABLE {name}"),
        ))
    }

    fn table_columns(&self, _name: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

#[test]
fn close_reports_cleanup_failures_instead_of_raising() {
    let session = Session::open(Box::new(UndroppableEngine), SessionConfig::default());
    session.stage("stuck", &dim_rows(&[(1, "one")])).unwrap();

    let failures = session.close();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].table, "stuck");
    assert!(failures[0].message.contains("cannot drop"));
}
