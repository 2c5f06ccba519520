//! Free-function builders for the expression tree.
//!
//! These exist so pipelines read close to their intent:
//! `df.filter(gt(col("y"), lit_i64(1)))` rather than spelled-out enum
//! construction at every call site.

use relq_common::{RelqError, Result};
use relq_planner::{AggExpr, BinaryOp, Expr, LiteralValue, ScalarType, SortKey, WindowFunc};

pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

pub fn lit_i64(v: i64) -> Expr {
    Expr::Literal(LiteralValue::Int64(v))
}

pub fn lit_f64(v: f64) -> Expr {
    Expr::Literal(LiteralValue::Float64(v))
}

pub fn lit_str(v: impl Into<String>) -> Expr {
    Expr::Literal(LiteralValue::Utf8(v.into()))
}

pub fn lit_bool(v: bool) -> Expr {
    Expr::Literal(LiteralValue::Boolean(v))
}

/// ISO-8601 calendar date literal (`YYYY-MM-DD`).
pub fn lit_date(v: impl Into<String>) -> Expr {
    Expr::Literal(LiteralValue::Date(v.into()))
}

pub fn lit_null() -> Expr {
    Expr::Literal(LiteralValue::Null)
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Eq, right)
}

pub fn neq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::NotEq, right)
}

pub fn lt(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Lt, right)
}

pub fn lt_eq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::LtEq, right)
}

pub fn gt(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Gt, right)
}

pub fn gt_eq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::GtEq, right)
}

pub fn and(left: Expr, right: Expr) -> Expr {
    Expr::And(Box::new(left), Box::new(right))
}

pub fn or(left: Expr, right: Expr) -> Expr {
    Expr::Or(Box::new(left), Box::new(right))
}

pub fn not_(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

pub fn add(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Plus, right)
}

pub fn sub(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Minus, right)
}

pub fn mul(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Multiply, right)
}

pub fn div(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::Divide, right)
}

pub fn cast(expr: Expr, to_type: ScalarType) -> Expr {
    Expr::Cast {
        expr: Box::new(expr),
        to_type,
    }
}

/// Scalar function call; the name is checked against the dialect at
/// compile time.
pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::ScalarFn {
        name: name.into(),
        args,
    }
}

fn window(func: WindowFunc) -> Expr {
    Expr::Window {
        func,
        partition_by: vec![],
        order_by: vec![],
    }
}

/// Value of `expr` from `offset` rows earlier in the window frame.
/// Partitioning and ordering come from pending `group_by`/`order_by`
/// steps unless set explicitly via [`over`].
pub fn lag(expr: Expr, offset: u32) -> Expr {
    window(WindowFunc::Lag {
        expr: Box::new(expr),
        offset,
    })
}

/// Value of `expr` from `offset` rows later in the window frame.
pub fn lead(expr: Expr, offset: u32) -> Expr {
    window(WindowFunc::Lead {
        expr: Box::new(expr),
        offset,
    })
}

pub fn row_number() -> Expr {
    window(WindowFunc::RowNumber)
}

pub fn rank() -> Expr {
    window(WindowFunc::Rank)
}

pub fn cum_sum(expr: Expr) -> Expr {
    window(WindowFunc::CumSum(Box::new(expr)))
}

/// Set an explicit partition/order frame on a window expression, overriding
/// any pending plan tags. Applying it to a non-window expression is an
/// error; the frame would otherwise be lost without a signal.
pub fn over(
    expr: Expr,
    partition_by: Vec<impl Into<String>>,
    order_by: Vec<SortKey>,
) -> Result<Expr> {
    match expr {
        Expr::Window { func, .. } => Ok(Expr::Window {
            func,
            partition_by: partition_by.into_iter().map(Into::into).collect(),
            order_by,
        }),
        _ => Err(RelqError::Unsupported(
            "over applies only to window expressions".to_string(),
        )),
    }
}

pub fn in_list(expr: Expr, list: Vec<LiteralValue>) -> Expr {
    Expr::InList {
        expr: Box::new(expr),
        list,
        negated: false,
    }
}

pub fn not_in_list(expr: Expr, list: Vec<LiteralValue>) -> Expr {
    Expr::InList {
        expr: Box::new(expr),
        list,
        negated: true,
    }
}

/// Membership test against a column of an engine-resident table.
pub fn in_table(expr: Expr, table: impl Into<String>, column: impl Into<String>) -> Expr {
    Expr::InTable {
        expr: Box::new(expr),
        table: table.into(),
        column: column.into(),
        negated: false,
    }
}

pub fn count(expr: Expr) -> AggExpr {
    AggExpr::Count(expr)
}

/// `COUNT(*)`.
pub fn count_rows() -> AggExpr {
    AggExpr::Count(lit_i64(1))
}

pub fn sum(expr: Expr) -> AggExpr {
    AggExpr::Sum(expr)
}

pub fn min_(expr: Expr) -> AggExpr {
    AggExpr::Min(expr)
}

pub fn max_(expr: Expr) -> AggExpr {
    AggExpr::Max(expr)
}

pub fn avg(expr: Expr) -> AggExpr {
    AggExpr::Avg(expr)
}

pub fn asc(column: impl Into<String>) -> SortKey {
    SortKey::asc(column)
}

pub fn desc(column: impl Into<String>) -> SortKey {
    SortKey::desc(column)
}
