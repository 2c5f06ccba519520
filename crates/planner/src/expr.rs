use serde::{Deserialize, Serialize};

/// Immediate value captured at expression-build time.
///
/// Anything that is not a [`Expr::Column`] reference is escaped by the
/// dialect when the plan compiles; there is no runtime marker deciding
/// which values are "live" data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Boolean(bool),
    /// ISO-8601 calendar date (`YYYY-MM-DD`), kept as text until the
    /// dialect lowers date arithmetic.
    Date(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Multiply,
    Divide,
}

/// Target of an explicit cast.
///
/// `Date` doubles as the date-like marker: a `Minus` whose operand is
/// date-typed lowers to the dialect's differencing idiom in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    Integer,
    Real,
    Text,
    Date,
}

/// Sort key for ORDER BY clauses and window order lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Window function kinds supported by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WindowFunc {
    Lag { expr: Box<Expr>, offset: u32 },
    Lead { expr: Box<Expr>, offset: u32 },
    RowNumber,
    Rank,
    CumSum(Box<Expr>),
}

/// Aggregate calls; these appear only inside `Summarize` nodes, so aggregate
/// placement is enforced by construction rather than checked at validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggExpr {
    Count(Expr),
    Sum(Expr),
    Min(Expr),
    Max(Expr),
    Avg(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Deferred reference to a named attribute; may be qualified with a
    /// table alias as `"alias.name"`.
    Column(String),
    /// Immediate value, escaped at compile time.
    Literal(LiteralValue),
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Cast {
        expr: Box<Expr>,
        to_type: ScalarType,
    },
    /// Dialect-validated scalar function call.
    ScalarFn { name: String, args: Vec<Expr> },
    /// Window expression. Empty partition/order lists mean "use the plan's
    /// pending GroupBy/OrderBy tags"; non-empty lists win over tags.
    Window {
        func: WindowFunc,
        partition_by: Vec<String>,
        order_by: Vec<SortKey>,
    },
    /// Membership test against immediate values. Compiles to an inline
    /// literal list below the configured threshold, and to a staged-table
    /// subquery at or above it.
    InList {
        expr: Box<Expr>,
        list: Vec<LiteralValue>,
        negated: bool,
    },
    /// Membership test against an engine-resident (possibly staged) table.
    InTable {
        expr: Box<Expr>,
        table: String,
        column: String,
        negated: bool,
    },
}

impl Expr {
    /// True when any window expression occurs in this tree.
    pub fn contains_window(&self) -> bool {
        match self {
            Expr::Window { .. } => true,
            Expr::Column(_) | Expr::Literal(_) => false,
            Expr::BinaryOp { left, right, .. } => {
                left.contains_window() || right.contains_window()
            }
            Expr::And(a, b) | Expr::Or(a, b) => a.contains_window() || b.contains_window(),
            Expr::Not(e) => e.contains_window(),
            Expr::Cast { expr, .. } => expr.contains_window(),
            Expr::ScalarFn { args, .. } => args.iter().any(Expr::contains_window),
            Expr::InList { expr, .. } => expr.contains_window(),
            Expr::InTable { expr, .. } => expr.contains_window(),
        }
    }

    /// Unqualified column names referenced by this tree.
    ///
    /// Qualified references (`alias.name`) are excluded: they can never
    /// refer to a column introduced by the current projection stage.
    pub fn unqualified_refs(&self, out: &mut std::collections::HashSet<String>) {
        match self {
            Expr::Column(name) => {
                if !name.contains('.') {
                    out.insert(name.clone());
                }
            }
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.unqualified_refs(out);
                right.unqualified_refs(out);
            }
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.unqualified_refs(out);
                b.unqualified_refs(out);
            }
            Expr::Not(e) => e.unqualified_refs(out),
            Expr::Cast { expr, .. } => expr.unqualified_refs(out),
            Expr::ScalarFn { args, .. } => {
                for a in args {
                    a.unqualified_refs(out);
                }
            }
            Expr::Window {
                func,
                partition_by,
                order_by,
            } => {
                match func {
                    WindowFunc::Lag { expr, .. }
                    | WindowFunc::Lead { expr, .. }
                    | WindowFunc::CumSum(expr) => expr.unqualified_refs(out),
                    WindowFunc::RowNumber | WindowFunc::Rank => {}
                }
                for p in partition_by {
                    if !p.contains('.') {
                        out.insert(p.clone());
                    }
                }
                for k in order_by {
                    if !k.column.contains('.') {
                        out.insert(k.column.clone());
                    }
                }
            }
            Expr::InList { expr, .. } => expr.unqualified_refs(out),
            Expr::InTable { expr, .. } => expr.unqualified_refs(out),
        }
    }
}

impl AggExpr {
    pub fn arg(&self) -> &Expr {
        match self {
            AggExpr::Count(e)
            | AggExpr::Sum(e)
            | AggExpr::Min(e)
            | AggExpr::Max(e)
            | AggExpr::Avg(e) => e,
        }
    }
}
