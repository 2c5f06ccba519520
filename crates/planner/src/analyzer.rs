use std::collections::HashSet;
use std::sync::RwLock;

use relq_common::{RelqError, Result, SessionConfig, WindowOrderPolicy};

use crate::expr::{AggExpr, Expr, SortKey, WindowFunc};
use crate::plan::PlanNode;

/// The analyzer needs column lists to resolve references.
/// The client (Session) provides this from engine introspection.
pub trait ColumnCatalog {
    /// Columns of a table by name, or `None` when the table is opaque to
    /// the catalog (validation then falls back to the engine's own checks).
    fn table_columns(&self, table: &str) -> Result<Option<Vec<String>>>;
}

/// Pre-engine plan validator.
///
/// Guarantees, all raised before any engine statement runs:
/// - unqualified references resolving to more than one alias in scope fail
///   with `AmbiguousReference`, as do qualifications naming an absent alias;
/// - scalar function names are checked against the registry
///   (`UnknownFunction`);
/// - window expressions are rejected outside mutate stages (`Unsupported`);
/// - a window stage with no ordering honors the configured
///   [`WindowOrderPolicy`] (`PartitionOrderRequired` under `Require`).
///
/// Columns unknown to the catalog are not flagged here; the engine reports
/// those itself when the statement runs.
pub struct Analyzer {
    functions: RwLock<HashSet<String>>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.functions.read().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("Analyzer").field("functions", &count).finish()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

const DEFAULT_FUNCTIONS: &[&str] = &[
    "abs", "round", "coalesce", "ifnull", "nullif", "lower", "upper", "length", "substr",
    "trim", "date", "julianday", "strftime", "min", "max",
];

impl Analyzer {
    /// Create an analyzer with the default scalar function registry.
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(DEFAULT_FUNCTIONS.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Register a scalar function name as known.
    ///
    /// Returns `true` when the name was already registered.
    pub fn register_function(&self, name: impl Into<String>) -> bool {
        !self
            .functions
            .write()
            .expect("function registry lock poisoned")
            .insert(name.into().to_ascii_lowercase())
    }

    /// Deregister a scalar function name.
    ///
    /// Returns `true` when an existing name was removed.
    pub fn deregister_function(&self, name: &str) -> bool {
        self.functions
            .write()
            .expect("function registry lock poisoned")
            .remove(&name.to_ascii_lowercase())
    }

    /// Validate a plan against a catalog and session configuration.
    pub fn validate(
        &self,
        plan: &PlanNode,
        catalog: &dyn ColumnCatalog,
        config: &SessionConfig,
    ) -> Result<()> {
        self.check_plan(plan, catalog, config)?;
        Ok(())
    }

    // -------------------------
    // Internal analysis plumbing
    // -------------------------

    fn check_plan(
        &self,
        plan: &PlanNode,
        catalog: &dyn ColumnCatalog,
        config: &SessionConfig,
    ) -> Result<StageInfo> {
        match plan {
            PlanNode::Source { table, alias } => {
                let cols = catalog.table_columns(table)?;
                let alias = alias.clone().unwrap_or_else(|| table.clone());
                Ok(StageInfo {
                    scope: Scope {
                        aliases: vec![(alias, cols)],
                        derived: HashSet::new(),
                    },
                    group_tags: vec![],
                    has_order_tag: false,
                })
            }
            PlanNode::Filter { predicate, input } => {
                let info = self.check_plan(input, catalog, config)?;
                if predicate.contains_window() {
                    return Err(RelqError::Unsupported(
                        "window functions are only allowed in mutate stages".to_string(),
                    ));
                }
                self.check_expr(predicate, &info.scope)?;
                Ok(info)
            }
            PlanNode::Mutate { exprs, input } => {
                let mut info = self.check_plan(input, catalog, config)?;
                for (name, expr) in exprs {
                    self.check_expr(expr, &info.scope)?;
                    self.check_window_order(name, expr, &info, config)?;
                }
                for (name, _) in exprs {
                    info.scope.derived.insert(name.clone());
                }
                Ok(info)
            }
            PlanNode::Summarize { aggs, input } => {
                let info = self.check_plan(input, catalog, config)?;
                let mut derived: HashSet<String> =
                    info.group_tags.iter().cloned().collect();
                for (name, agg) in aggs {
                    if agg.arg().contains_window() {
                        return Err(RelqError::Unsupported(
                            "window functions are only allowed in mutate stages".to_string(),
                        ));
                    }
                    self.check_agg(agg, &info.scope)?;
                    derived.insert(name.clone());
                }
                // Aggregation collapses the scope to keys + aggregate names.
                Ok(StageInfo {
                    scope: Scope {
                        aliases: vec![],
                        derived,
                    },
                    group_tags: vec![],
                    has_order_tag: false,
                })
            }
            PlanNode::GroupBy { keys, input } => {
                let mut info = self.check_plan(input, catalog, config)?;
                for k in keys {
                    self.check_column(k, &info.scope)?;
                }
                info.group_tags = keys.clone();
                Ok(info)
            }
            PlanNode::OrderBy { keys, input } => {
                let mut info = self.check_plan(input, catalog, config)?;
                for k in keys {
                    self.check_column(&k.column, &info.scope)?;
                }
                info.has_order_tag = true;
                Ok(info)
            }
            PlanNode::Join {
                left, right, on, ..
            } => {
                let left_info = self.check_plan(left, catalog, config)?;
                let right_info = self.check_plan(right, catalog, config)?;
                for (lk, rk) in on {
                    self.check_column(lk, &left_info.scope)?;
                    self.check_column(rk, &right_info.scope)?;
                }
                let mut aliases = left_info.scope.aliases;
                for (alias, cols) in right_info.scope.aliases {
                    // Mirrors the compiler's self-join disambiguation: a
                    // colliding bare right side is exposed as `{alias}_rhs`.
                    if aliases.iter().any(|(a, _)| *a == alias) {
                        aliases.push((format!("{alias}_rhs"), cols));
                    } else {
                        aliases.push((alias, cols));
                    }
                }
                let mut derived = left_info.scope.derived;
                derived.extend(right_info.scope.derived);
                // Group/order tags do not survive a join.
                Ok(StageInfo {
                    scope: Scope { aliases, derived },
                    group_tags: vec![],
                    has_order_tag: false,
                })
            }
            PlanNode::Limit { input, .. } => self.check_plan(input, catalog, config),
            // Raw fragments are explicitly unchecked.
            PlanNode::RawClause { input, .. } => self.check_plan(input, catalog, config),
        }
    }

    fn check_window_order(
        &self,
        name: &str,
        expr: &Expr,
        info: &StageInfo,
        config: &SessionConfig,
    ) -> Result<()> {
        for (order_by, _) in collect_windows(expr) {
            let has_order = !order_by.is_empty() || info.has_order_tag;
            if !has_order && config.window_order == WindowOrderPolicy::Require {
                return Err(RelqError::PartitionOrderRequired(format!(
                    "window column `{name}` has no order list and no pending order tag"
                )));
            }
        }
        Ok(())
    }

    fn check_agg(&self, agg: &AggExpr, scope: &Scope) -> Result<()> {
        self.check_expr(agg.arg(), scope)
    }

    fn check_expr(&self, expr: &Expr, scope: &Scope) -> Result<()> {
        match expr {
            Expr::Column(name) => self.check_column(name, scope),
            Expr::Literal(_) => Ok(()),
            Expr::BinaryOp { left, right, .. } => {
                self.check_expr(left, scope)?;
                self.check_expr(right, scope)
            }
            Expr::And(a, b) | Expr::Or(a, b) => {
                self.check_expr(a, scope)?;
                self.check_expr(b, scope)
            }
            Expr::Not(e) => self.check_expr(e, scope),
            Expr::Cast { expr, .. } => self.check_expr(expr, scope),
            Expr::ScalarFn { name, args } => {
                if !self
                    .functions
                    .read()
                    .expect("function registry lock poisoned")
                    .contains(&name.to_ascii_lowercase())
                {
                    return Err(RelqError::UnknownFunction(name.clone()));
                }
                for a in args {
                    self.check_expr(a, scope)?;
                }
                Ok(())
            }
            Expr::Window {
                func,
                partition_by,
                order_by,
            } => {
                match func {
                    WindowFunc::Lag { expr, .. }
                    | WindowFunc::Lead { expr, .. }
                    | WindowFunc::CumSum(expr) => self.check_expr(expr, scope)?,
                    WindowFunc::RowNumber | WindowFunc::Rank => {}
                }
                for p in partition_by {
                    self.check_column(p, scope)?;
                }
                for k in order_by {
                    self.check_column(&k.column, scope)?;
                }
                Ok(())
            }
            Expr::InList { expr, .. } => self.check_expr(expr, scope),
            Expr::InTable { expr, .. } => self.check_expr(expr, scope),
        }
    }

    fn check_column(&self, name: &str, scope: &Scope) -> Result<()> {
        if let Some((alias, col)) = name.split_once('.') {
            if !scope.aliases.iter().any(|(a, _)| a == alias) {
                return Err(RelqError::AmbiguousReference(format!(
                    "`{alias}.{col}`: alias `{alias}` is not in scope"
                )));
            }
            return Ok(());
        }
        if scope.derived.contains(name) {
            return Ok(());
        }
        let matches = scope
            .aliases
            .iter()
            .filter(|(_, cols)| match cols {
                Some(cols) => cols.iter().any(|c| c == name),
                None => false,
            })
            .count();
        if matches > 1 {
            return Err(RelqError::AmbiguousReference(format!(
                "column `{name}` resolves to more than one alias in scope; qualify it"
            )));
        }
        Ok(())
    }
}

/// Per-stage resolution state carried up the plan walk.
struct StageInfo {
    scope: Scope,
    group_tags: Vec<String>,
    has_order_tag: bool,
}

struct Scope {
    /// (alias, known columns) per table in scope; `None` columns mean the
    /// catalog could not describe the table.
    aliases: Vec<(String, Option<Vec<String>>)>,
    /// Names introduced by mutate/summarize stages.
    derived: HashSet<String>,
}

fn collect_windows(expr: &Expr) -> Vec<(&[SortKey], &[String])> {
    let mut out = vec![];
    collect_windows_into(expr, &mut out);
    out
}

fn collect_windows_into<'a>(expr: &'a Expr, out: &mut Vec<(&'a [SortKey], &'a [String])>) {
    match expr {
        Expr::Window {
            func,
            partition_by,
            order_by,
        } => {
            out.push((order_by.as_slice(), partition_by.as_slice()));
            match func {
                WindowFunc::Lag { expr, .. }
                | WindowFunc::Lead { expr, .. }
                | WindowFunc::CumSum(expr) => collect_windows_into(expr, out),
                WindowFunc::RowNumber | WindowFunc::Rank => {}
            }
        }
        Expr::Column(_) | Expr::Literal(_) => {}
        Expr::BinaryOp { left, right, .. } => {
            collect_windows_into(left, out);
            collect_windows_into(right, out);
        }
        Expr::And(a, b) | Expr::Or(a, b) => {
            collect_windows_into(a, out);
            collect_windows_into(b, out);
        }
        Expr::Not(e) => collect_windows_into(e, out),
        Expr::Cast { expr, .. } => collect_windows_into(expr, out),
        Expr::ScalarFn { args, .. } => {
            for a in args {
                collect_windows_into(a, out);
            }
        }
        Expr::InList { expr, .. } => collect_windows_into(expr, out),
        Expr::InTable { expr, .. } => collect_windows_into(expr, out),
    }
}
