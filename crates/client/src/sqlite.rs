use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use relq_common::{RelqError, Result};

use crate::engine::Engine;
use crate::rows::{RowSet, Value};

/// Embedded SQLite engine backend.
///
/// The connection is serialized behind a mutex: the session model permits
/// one statement execution in flight at a time, so contention is the
/// caller's concern, not ours.
pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEngine").finish_non_exhaustive()
    }
}

impl SqliteEngine {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RelqError::engine(e.to_string(), "<open in-memory>"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| RelqError::engine(e.to_string(), "<open>"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn query(&self, sql: &str) -> Result<RowSet> {
        let conn = self.conn.lock().expect("sqlite connection lock poisoned");
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| RelqError::engine(e.to_string(), sql))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let ncols = columns.len();

        let mut out = RowSet::new(columns);
        let mut rows = stmt
            .query([])
            .map_err(|e| RelqError::engine(e.to_string(), sql))?;
        while let Some(row) = rows
            .next()
            .map_err(|e| RelqError::engine(e.to_string(), sql))?
        {
            let mut values = Vec::with_capacity(ncols);
            for i in 0..ncols {
                let v = row
                    .get_ref(i)
                    .map_err(|e| RelqError::engine(e.to_string(), sql))?;
                values.push(match v {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(i) => Value::Integer(i),
                    ValueRef::Real(f) => Value::Real(f),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(_) => {
                        return Err(RelqError::engine("BLOB values are not supported", sql))
                    }
                });
            }
            out.push_row(values)?;
        }
        Ok(out)
    }
}

impl Engine for SqliteEngine {
    fn execute(&self, sql: &str) -> Result<RowSet> {
        self.query(sql)
    }

    fn create_table(&self, name: &str, rows: &RowSet) -> Result<()> {
        let cols: Vec<String> = rows
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} {}", quote_ident(c), infer_affinity(rows, i)))
            .collect();
        let create = format!("CREATE TABLE {} ({})", quote_ident(name), cols.join(", "));

        let conn = self.conn.lock().expect("sqlite connection lock poisoned");
        conn.execute(&create, [])
            .map_err(|e| RelqError::engine(e.to_string(), &create))?;

        let placeholders: Vec<String> = (1..=rows.columns.len()).map(|i| format!("?{i}")).collect();
        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(name),
            placeholders.join(", ")
        );
        let mut stmt = conn
            .prepare(&insert)
            .map_err(|e| RelqError::engine(e.to_string(), &insert))?;
        for row in &rows.rows {
            let params = rusqlite::params_from_iter(row.0.iter().map(to_sqlite_value));
            stmt.execute(params)
                .map_err(|e| RelqError::engine(e.to_string(), &insert))?;
        }
        Ok(())
    }

    fn drop_table(&self, name: &str) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(name));
        let conn = self.conn.lock().expect("sqlite connection lock poisoned");
        conn.execute(&sql, [])
            .map_err(|e| RelqError::engine(e.to_string(), &sql))?;
        Ok(())
    }

    fn table_columns(&self, name: &str) -> Result<Option<Vec<String>>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(name));
        let info = self.query(&sql)?;
        if info.is_empty() {
            return Ok(None);
        }
        let mut cols = Vec::with_capacity(info.len());
        for i in 0..info.len() {
            match info.value(i, "name").and_then(|v| v.as_str()) {
                Some(c) => cols.push(c.to_string()),
                None => {
                    return Err(RelqError::engine("malformed table_info pragma output", &sql))
                }
            }
        }
        Ok(Some(cols))
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self.query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        Ok(rows
            .rows
            .iter()
            .filter_map(|r| r.0.first().and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn to_sqlite_value(v: &Value) -> rusqlite::types::Value {
    match v {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Real(f) => rusqlite::types::Value::Real(*f),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
    }
}

/// Column affinity from the first non-null value; TEXT when all null.
fn infer_affinity(rows: &RowSet, col: usize) -> &'static str {
    for row in &rows.rows {
        match row.0.get(col) {
            Some(Value::Integer(_)) => return "INTEGER",
            Some(Value::Real(_)) => return "REAL",
            Some(Value::Text(_)) => return "TEXT",
            Some(Value::Null) | None => continue,
        }
    }
    "TEXT"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> RowSet {
        RowSet::from_rows(
            vec!["k".to_string(), "label".to_string()],
            vec![
                vec![Value::Integer(1), Value::Text("one".to_string())],
                vec![Value::Integer(2), Value::Text("two".to_string())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn create_query_drop_round_trip() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        engine.create_table("dim", &sample_rows()).unwrap();

        assert_eq!(
            engine.table_columns("dim").unwrap(),
            Some(vec!["k".to_string(), "label".to_string()])
        );
        assert_eq!(engine.list_tables().unwrap(), vec!["dim".to_string()]);

        let out = engine.execute("SELECT \"k\" FROM \"dim\" ORDER BY \"k\"").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.value(1, "k"), Some(&Value::Integer(2)));

        engine.drop_table("dim").unwrap();
        assert_eq!(engine.table_columns("dim").unwrap(), None);
        assert!(engine.list_tables().unwrap().is_empty());
    }

    #[test]
    fn execute_wraps_engine_errors_with_statement() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let err = engine.execute("SELECT * FROM \"missing\"").unwrap_err();
        match err {
            RelqError::Engine { sql, .. } => assert!(sql.contains("missing")),
            other => panic!("expected engine error, got {other}"),
        }
    }
}
