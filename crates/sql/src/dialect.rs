use relq_planner::LiteralValue;

/// Engine-specific SQL surface: quoting, escaping, and idioms the compiler
/// cannot assume to be portable.
///
/// Literal escaping here is the value-interpolation guard: every immediate
/// value embedded into statement text goes through [`Dialect::quote_literal`].
pub trait Dialect {
    /// Dialect name for diagnostics.
    fn name(&self) -> &str;

    /// Quote a single identifier segment.
    fn quote_ident(&self, ident: &str) -> String;

    /// Render an immediate value as a SQL literal, escaped per the
    /// dialect's quoting rules.
    fn quote_literal(&self, value: &LiteralValue) -> String;

    /// Difference of two date-typed operands, in canonical seconds.
    fn date_diff_seconds(&self, lhs_sql: &str, rhs_sql: &str) -> String;

    /// Shift a date-typed operand by a duration in canonical seconds.
    /// `negate` subtracts the duration instead of adding it.
    fn date_add_seconds(&self, date_sql: &str, secs_sql: &str, negate: bool) -> String;

    /// Whether a scalar function name has a translation in this dialect.
    fn known_function(&self, name: &str) -> bool;
}

/// SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

const SQLITE_FUNCTIONS: &[&str] = &[
    "abs", "round", "coalesce", "ifnull", "nullif", "lower", "upper", "length", "substr",
    "trim", "date", "julianday", "strftime", "min", "max",
];

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn quote_literal(&self, value: &LiteralValue) -> String {
        match value {
            LiteralValue::Int64(v) => v.to_string(),
            // `{:?}` keeps the decimal point on round floats (`1.0`, not `1`).
            LiteralValue::Float64(v) => format!("{v:?}"),
            LiteralValue::Utf8(s) | LiteralValue::Date(s) => {
                format!("'{}'", s.replace('\'', "''"))
            }
            LiteralValue::Boolean(true) => "1".to_string(),
            LiteralValue::Boolean(false) => "0".to_string(),
            LiteralValue::Null => "NULL".to_string(),
        }
    }

    fn date_diff_seconds(&self, lhs_sql: &str, rhs_sql: &str) -> String {
        // julianday is in days; canonical internal unit is seconds.
        format!("((julianday({lhs_sql}) - julianday({rhs_sql})) * 86400.0)")
    }

    fn date_add_seconds(&self, date_sql: &str, secs_sql: &str, negate: bool) -> String {
        if negate {
            format!("datetime({date_sql}, (-({secs_sql})) || ' seconds')")
        } else {
            format!("datetime({date_sql}, ({secs_sql}) || ' seconds')")
        }
    }

    fn known_function(&self, name: &str) -> bool {
        SQLITE_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literals_double_embedded_quotes() {
        let d = SqliteDialect;
        assert_eq!(
            d.quote_literal(&LiteralValue::Utf8("O'Brien".to_string())),
            "'O''Brien'"
        );
    }

    #[test]
    fn null_and_bool_literals() {
        let d = SqliteDialect;
        assert_eq!(d.quote_literal(&LiteralValue::Null), "NULL");
        assert_eq!(d.quote_literal(&LiteralValue::Boolean(true)), "1");
        assert_eq!(d.quote_literal(&LiteralValue::Boolean(false)), "0");
    }

    #[test]
    fn float_literals_keep_decimal_point() {
        let d = SqliteDialect;
        assert_eq!(d.quote_literal(&LiteralValue::Float64(1.0)), "1.0");
        assert_eq!(d.quote_literal(&LiteralValue::Float64(2.5)), "2.5");
    }

    #[test]
    fn idents_double_embedded_quotes() {
        let d = SqliteDialect;
        assert_eq!(d.quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn date_diff_uses_julianday_seconds() {
        let d = SqliteDialect;
        assert_eq!(
            d.date_diff_seconds("x", "y"),
            "((julianday(x) - julianday(y)) * 86400.0)"
        );
    }

    #[test]
    fn date_shift_builds_seconds_modifier() {
        let d = SqliteDialect;
        assert_eq!(
            d.date_add_seconds("x", "60", false),
            "datetime(x, (60) || ' seconds')"
        );
        assert_eq!(
            d.date_add_seconds("x", "60", true),
            "datetime(x, (-(60)) || ' seconds')"
        );
    }
}
