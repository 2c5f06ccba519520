use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use relq_common::{RelqError, Result};
use relq_planner::LiteralValue;

/// Engine value model, mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view: integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn hash_into(&self, hasher: &mut impl Hasher) {
        match self {
            Value::Null => 0u8.hash(hasher),
            Value::Integer(v) => {
                1u8.hash(hasher);
                v.hash(hasher);
            }
            Value::Real(v) => {
                2u8.hash(hasher);
                v.to_bits().hash(hasher);
            }
            Value::Text(s) => {
                3u8.hash(hasher);
                s.hash(hasher);
            }
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(v: &LiteralValue) -> Self {
        match v {
            LiteralValue::Int64(i) => Value::Integer(*i),
            LiteralValue::Float64(f) => Value::Real(*f),
            LiteralValue::Utf8(s) | LiteralValue::Date(s) => Value::Text(s.clone()),
            LiteralValue::Boolean(b) => Value::Integer(*b as i64),
            LiteralValue::Null => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row(pub Vec<Value>);

/// Fully in-memory query result or staging input.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    /// Build a row set from column names and value rows, checking arity.
    pub fn from_rows(
        columns: Vec<String>,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Self> {
        let mut out = Self::new(columns);
        for row in rows {
            out.push_row(row)?;
        }
        Ok(out)
    }

    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(RelqError::InvalidConfig(format!(
                "row arity {} does not match {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(Row(values));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (row, column name), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.0.get(idx))
    }

    /// Content fingerprint over column names and all values, used to detect
    /// staging conflicts (same name, different contents).
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.columns.hash(&mut hasher);
        for row in &self.rows {
            for v in &row.0 {
                v.hash_into(&mut hasher);
            }
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_distinguishes_contents() {
        let a = RowSet::from_rows(
            vec!["x".to_string()],
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
        )
        .unwrap();
        let b = RowSet::from_rows(
            vec!["x".to_string()],
            vec![vec![Value::Integer(1)], vec![Value::Integer(3)]],
        )
        .unwrap();
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn push_row_checks_arity() {
        let mut rs = RowSet::new(vec!["a".to_string(), "b".to_string()]);
        assert!(rs.push_row(vec![Value::Null]).is_err());
        assert!(rs.push_row(vec![Value::Null, Value::Integer(1)]).is_ok());
    }
}
