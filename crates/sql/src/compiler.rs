use std::collections::HashSet;

use relq_common::{RelqError, Result, SessionConfig, WindowOrderPolicy};
use relq_planner::{
    AggExpr, BinaryOp, Expr, JoinKind, LiteralValue, PlanNode, RawClauseKind, ScalarType,
    SortKey, WindowFunc,
};

use crate::dialect::Dialect;

/// A temporary table the session must create before the compiled statement
/// can run. Only produced by over-threshold membership tests.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingRequest {
    pub table: String,
    pub column: String,
    pub values: Vec<LiteralValue>,
}

/// Output of compilation: one SELECT statement plus its staging prelude.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub staging: Vec<StagingRequest>,
}

/// Allocates names for compiler-created temporaries.
///
/// The default [`DeterministicNamer`] restarts per compile call, which keeps
/// compilation a pure function of the plan; sessions substitute an allocator
/// seeded with session identity and a monotone counter so names stay unique
/// across interleaved materializations.
pub trait TempNamer {
    fn next_name(&mut self) -> String;
}

#[derive(Debug, Clone)]
pub struct DeterministicNamer {
    prefix: String,
    counter: u64,
}

impl DeterministicNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }
}

impl TempNamer for DeterministicNamer {
    fn next_name(&mut self) -> String {
        let name = format!("{}_{}", self.prefix, self.counter);
        self.counter += 1;
        name
    }
}

/// Lower a plan chain into a single SELECT statement.
///
/// The walk folds operators into a [`SelectStage`] builder and wraps the
/// stage as a FROM-subquery whenever the next operator cannot legally merge:
/// - consecutive scalar mutates collapse into one projection list unless a
///   later expression references a name introduced in the same stage;
/// - a filter merges into the current WHERE when its predicate references no
///   column introduced by the stage's projection (filter pushdown; disabled
///   by `enable_filter_pushdown = false`, which then only merges filters
///   into projection-free stages);
/// - window mutates take PARTITION BY from the pending GroupBy tag and
///   ORDER BY from the pending OrderBy tag, and never collapse into an
///   aggregate stage.
pub fn compile(
    plan: &PlanNode,
    config: &SessionConfig,
    dialect: &dyn Dialect,
    namer: &mut dyn TempNamer,
) -> Result<Compiled> {
    let mut ctx = Ctx {
        config,
        dialect,
        namer,
        staging: vec![],
        subquery_seq: 0,
        group_tags: vec![],
        order_tags: vec![],
    };
    let stage = ctx.compile_node(plan)?;
    let sql = ctx.render(&stage);
    Ok(Compiled {
        sql,
        staging: ctx.staging,
    })
}

struct Ctx<'a> {
    config: &'a SessionConfig,
    dialect: &'a dyn Dialect,
    namer: &'a mut dyn TempNamer,
    staging: Vec<StagingRequest>,
    subquery_seq: u32,
    /// Pending PARTITION BY columns from the nearest preceding GroupBy.
    group_tags: Vec<String>,
    /// Pending window ORDER BY keys from the nearest preceding OrderBy.
    order_tags: Vec<SortKey>,
}

/// One SELECT under construction.
#[derive(Debug, Default)]
struct SelectStage {
    /// When true the projection starts with `*` and `select` holds extras.
    wildcard: bool,
    select: Vec<String>,
    raw_select: Vec<String>,
    from_item: String,
    /// Alias a bare FROM item is addressable by (table name or explicit
    /// alias); `None` once the stage stops being bare.
    base_alias: Option<String>,
    joins: Vec<String>,
    wheres: Vec<String>,
    raw_where: Vec<String>,
    group_by: Vec<String>,
    raw_group: Vec<String>,
    raw_having: Vec<String>,
    order_by: Vec<SortKey>,
    raw_order: Vec<String>,
    limit: Option<u64>,
    /// Column names introduced by this stage's projection.
    introduced: HashSet<String>,
    has_window: bool,
    is_aggregate: bool,
}

impl SelectStage {
    fn bare(from_item: String, base_alias: String) -> Self {
        Self {
            wildcard: true,
            from_item,
            base_alias: Some(base_alias),
            ..Default::default()
        }
    }

    /// A stage that is nothing but a FROM item; such a stage can be used
    /// directly as a join side without wrapping.
    fn is_bare(&self) -> bool {
        self.wildcard
            && self.select.is_empty()
            && self.raw_select.is_empty()
            && self.joins.is_empty()
            && self.wheres.is_empty()
            && self.raw_where.is_empty()
            && self.group_by.is_empty()
            && self.raw_group.is_empty()
            && self.raw_having.is_empty()
            && self.order_by.is_empty()
            && self.raw_order.is_empty()
            && self.limit.is_none()
    }
}

impl<'a> Ctx<'a> {
    fn compile_node(&mut self, plan: &PlanNode) -> Result<SelectStage> {
        match plan {
            PlanNode::Source { table, alias } => Ok(match alias {
                Some(a) => SelectStage::bare(
                    format!(
                        "{} AS {}",
                        self.dialect.quote_ident(table),
                        self.dialect.quote_ident(a)
                    ),
                    a.clone(),
                ),
                None => SelectStage::bare(self.dialect.quote_ident(table), table.clone()),
            }),

            PlanNode::Filter { predicate, input } => {
                let mut stage = self.compile_node(input)?;
                if predicate.contains_window() {
                    return Err(RelqError::Unsupported(
                        "window functions are only allowed in mutate stages".to_string(),
                    ));
                }
                let mut refs = HashSet::new();
                predicate.unqualified_refs(&mut refs);
                let can_merge = stage.limit.is_none()
                    && stage.group_by.is_empty()
                    && stage.raw_group.is_empty()
                    && !stage.has_window
                    && !stage.is_aggregate
                    && refs.is_disjoint(&stage.introduced)
                    && (self.config.enable_filter_pushdown || stage.introduced.is_empty());
                if !can_merge {
                    stage = self.wrap(stage);
                }
                let sql = self.expr_sql(predicate)?;
                stage.wheres.push(sql);
                Ok(stage)
            }

            PlanNode::Mutate { exprs, input } => {
                let mut stage = self.compile_node(input)?;
                let has_window = exprs.iter().any(|(_, e)| e.contains_window());
                let mut refs = HashSet::new();
                for (_, e) in exprs {
                    e.unqualified_refs(&mut refs);
                }
                if has_window {
                    // Tag columns become part of the stage's references.
                    refs.extend(self.group_tags.iter().cloned());
                    refs.extend(self.order_tags.iter().map(|k| k.column.clone()));
                }
                let can_merge = stage.limit.is_none()
                    && !stage.has_window
                    && !stage.is_aggregate
                    && stage.group_by.is_empty()
                    && stage.raw_group.is_empty()
                    && refs.is_disjoint(&stage.introduced);
                if !can_merge {
                    stage = self.wrap(stage);
                }
                for (name, expr) in exprs {
                    let sql = self.expr_sql(expr)?;
                    stage
                        .select
                        .push(format!("{sql} AS {}", self.dialect.quote_ident(name)));
                    stage.introduced.insert(name.clone());
                }
                stage.has_window |= has_window;
                Ok(stage)
            }

            PlanNode::Summarize { aggs, input } => {
                let mut stage = self.compile_node(input)?;
                let keys = std::mem::take(&mut self.group_tags);
                self.order_tags.clear();
                let mut refs: HashSet<String> = keys
                    .iter()
                    .filter(|k| !k.contains('.'))
                    .cloned()
                    .collect();
                for (_, agg) in aggs {
                    agg.arg().unqualified_refs(&mut refs);
                }
                let can_merge = stage.limit.is_none()
                    && !stage.has_window
                    && !stage.is_aggregate
                    && stage.group_by.is_empty()
                    && stage.raw_group.is_empty()
                    && stage.order_by.is_empty()
                    && stage.raw_order.is_empty()
                    && stage.select.is_empty()
                    && stage.raw_select.is_empty()
                    && refs.is_disjoint(&stage.introduced);
                if !can_merge {
                    stage = self.wrap(stage);
                }
                // Row order feeding an aggregation is not observable in its
                // output; a hoisted ORDER BY would reference pre-aggregate
                // columns, so it is dropped here.
                stage.order_by.clear();
                stage.wildcard = false;
                let mut introduced = HashSet::new();
                for k in &keys {
                    stage.select.push(self.quote_qualified(k));
                    stage.group_by.push(self.quote_qualified(k));
                    let plain = k.rsplit('.').next().unwrap_or(k);
                    introduced.insert(plain.to_string());
                }
                for (name, agg) in aggs {
                    let sql = self.agg_sql(agg)?;
                    stage
                        .select
                        .push(format!("{sql} AS {}", self.dialect.quote_ident(name)));
                    introduced.insert(name.clone());
                }
                stage.introduced = introduced;
                stage.is_aggregate = true;
                Ok(stage)
            }

            PlanNode::GroupBy { keys, input } => {
                let stage = self.compile_node(input)?;
                self.group_tags = keys.clone();
                Ok(stage)
            }

            PlanNode::OrderBy { keys, input } => {
                let mut stage = self.compile_node(input)?;
                if stage.limit.is_some() {
                    stage = self.wrap(stage);
                }
                self.order_tags = keys.clone();
                // A later OrderBy replaces the pending output order.
                stage.order_by = keys.clone();
                Ok(stage)
            }

            PlanNode::Join {
                kind,
                left,
                right,
                on,
            } => {
                if on.is_empty() {
                    return Err(RelqError::Unsupported(
                        "join requires at least one key pair".to_string(),
                    ));
                }
                let left_stage = self.compile_node(left)?;
                self.group_tags.clear();
                self.order_tags.clear();
                let right_stage = self.compile_node(right)?;
                self.group_tags.clear();
                self.order_tags.clear();

                let (left_item, left_alias) = self.join_side(left_stage, None)?;
                let (right_item, right_alias) =
                    self.join_side(right_stage, Some(&left_alias))?;

                let conds: Vec<String> = on
                    .iter()
                    .map(|(lk, rk)| {
                        format!(
                            "{}.{} = {}.{}",
                            self.dialect.quote_ident(&left_alias),
                            self.dialect.quote_ident(lk),
                            self.dialect.quote_ident(&right_alias),
                            self.dialect.quote_ident(rk)
                        )
                    })
                    .collect();

                let mut stage = SelectStage::bare(left_item, left_alias);
                stage.base_alias = None;
                stage.joins.push(format!(
                    "{} JOIN {right_item} ON {}",
                    join_kind_sql(*kind),
                    conds.join(" AND ")
                ));
                Ok(stage)
            }

            PlanNode::Limit { n, input } => {
                let mut stage = self.compile_node(input)?;
                if stage.limit.is_some() {
                    stage = self.wrap(stage);
                }
                stage.limit = Some(*n);
                Ok(stage)
            }

            PlanNode::RawClause {
                clause,
                fragment,
                input,
            } => {
                let mut stage = self.compile_node(input)?;
                // Inserted verbatim; callers own correctness and safety.
                match clause {
                    RawClauseKind::Select => stage.raw_select.push(fragment.clone()),
                    RawClauseKind::Where => stage.raw_where.push(fragment.clone()),
                    RawClauseKind::GroupBy => stage.raw_group.push(fragment.clone()),
                    RawClauseKind::Having => stage.raw_having.push(fragment.clone()),
                    RawClauseKind::OrderBy => stage.raw_order.push(fragment.clone()),
                }
                Ok(stage)
            }
        }
    }

    /// Close the current stage and continue building on top of it as a
    /// FROM-subquery.
    ///
    /// An ORDER BY inside a subquery without a LIMIT is not load-bearing and
    /// engines are free to ignore it, so it is hoisted onto the outer stage
    /// instead; the wildcard projection keeps the sort columns visible there.
    /// When a LIMIT makes the inner ordering meaningful it stays put.
    fn wrap(&mut self, mut stage: SelectStage) -> SelectStage {
        let hoisted = if stage.limit.is_none() {
            std::mem::take(&mut stage.order_by)
        } else {
            vec![]
        };
        let alias = format!("t{}", self.subquery_seq);
        self.subquery_seq += 1;
        let mut outer = SelectStage::bare(
            format!(
                "({}) AS {}",
                self.render(&stage),
                self.dialect.quote_ident(&alias)
            ),
            alias,
        );
        // The subquery exposes its columns unqualified.
        outer.order_by = hoisted
            .into_iter()
            .map(|k| SortKey {
                column: k
                    .column
                    .rsplit('.')
                    .next()
                    .unwrap_or(k.column.as_str())
                    .to_string(),
                descending: k.descending,
            })
            .collect();
        outer
    }

    /// Render a compiled side as a FROM/JOIN item, wrapping non-bare stages
    /// and disambiguating self-join aliases.
    fn join_side(
        &mut self,
        stage: SelectStage,
        taken_alias: Option<&str>,
    ) -> Result<(String, String)> {
        if stage.is_bare() {
            let alias = stage
                .base_alias
                .clone()
                .unwrap_or_else(|| "t".to_string());
            if Some(alias.as_str()) == taken_alias {
                // Self-referential join: each side needs a distinct alias.
                let renamed = format!("{alias}_rhs");
                return Ok((
                    format!(
                        "{} AS {}",
                        stage.from_item,
                        self.dialect.quote_ident(&renamed)
                    ),
                    renamed,
                ));
            }
            return Ok((stage.from_item, alias));
        }
        let wrapped = self.wrap(stage);
        let alias = wrapped
            .base_alias
            .clone()
            .unwrap_or_else(|| "t".to_string());
        Ok((wrapped.from_item, alias))
    }

    // -----------------------------
    // Expression lowering
    // -----------------------------

    fn expr_sql(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Column(name) => Ok(self.quote_qualified(name)),
            Expr::Literal(v) => Ok(self.dialect.quote_literal(v)),
            Expr::BinaryOp { left, op, right } => self.binary_sql(left, *op, right),
            Expr::And(a, b) => Ok(format!(
                "({} AND {})",
                self.expr_sql(a)?,
                self.expr_sql(b)?
            )),
            Expr::Or(a, b) => Ok(format!(
                "({} OR {})",
                self.expr_sql(a)?,
                self.expr_sql(b)?
            )),
            Expr::Not(e) => Ok(format!("(NOT {})", self.expr_sql(e)?)),
            Expr::Cast { expr, to_type } => {
                let inner = self.expr_sql(expr)?;
                Ok(match to_type {
                    ScalarType::Integer => format!("CAST({inner} AS INTEGER)"),
                    ScalarType::Real => format!("CAST({inner} AS REAL)"),
                    ScalarType::Text => format!("CAST({inner} AS TEXT)"),
                    // Normalizes ISO text; also the date-like marker.
                    ScalarType::Date => format!("date({inner})"),
                })
            }
            Expr::ScalarFn { name, args } => {
                if !self.dialect.known_function(name) {
                    return Err(RelqError::UnknownFunction(name.clone()));
                }
                let args = args
                    .iter()
                    .map(|a| self.expr_sql(a))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{}({})", name.to_ascii_lowercase(), args.join(", ")))
            }
            Expr::Window {
                func,
                partition_by,
                order_by,
            } => self.window_sql(func, partition_by, order_by),
            Expr::InList {
                expr,
                list,
                negated,
            } => self.in_list_sql(expr, list, *negated),
            Expr::InTable {
                expr,
                table,
                column,
                negated,
            } => {
                let e = self.expr_sql(expr)?;
                Ok(format!(
                    "({e} {}IN (SELECT {} FROM {}))",
                    if *negated { "NOT " } else { "" },
                    self.dialect.quote_ident(column),
                    self.dialect.quote_ident(table)
                ))
            }
        }
    }

    fn binary_sql(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<String> {
        // NULL-safe comparisons: `= NULL` never matches in SQL, so equality
        // against a NULL literal lowers to IS [NOT] NULL.
        if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
            let is_null = |e: &Expr| matches!(e, Expr::Literal(LiteralValue::Null));
            if is_null(right) || is_null(left) {
                let side = if is_null(right) { left } else { right };
                let side_sql = self.expr_sql(side)?;
                return Ok(match op {
                    BinaryOp::Eq => format!("({side_sql} IS NULL)"),
                    _ => format!("({side_sql} IS NOT NULL)"),
                });
            }
        }

        // Date arithmetic lowers to the dialect's differencing/shift idioms,
        // canonical unit seconds.
        let (ld, rd) = (is_date_typed(left), is_date_typed(right));
        if op == BinaryOp::Minus && ld && rd {
            let l = self.expr_sql(left)?;
            let r = self.expr_sql(right)?;
            return Ok(self.dialect.date_diff_seconds(&l, &r));
        }
        if (op == BinaryOp::Minus || op == BinaryOp::Plus) && (ld ^ rd) {
            let (date, secs) = if ld { (left, right) } else { (right, left) };
            let date_sql = self.expr_sql(date)?;
            let secs_sql = self.expr_sql(secs)?;
            let negate = op == BinaryOp::Minus;
            return Ok(self.dialect.date_add_seconds(&date_sql, &secs_sql, negate));
        }

        let l = self.expr_sql(left)?;
        let r = self.expr_sql(right)?;
        Ok(format!("({l} {} {r})", binary_op_sql(op)))
    }

    fn window_sql(
        &mut self,
        func: &WindowFunc,
        partition_by: &[String],
        order_by: &[SortKey],
    ) -> Result<String> {
        let call = match func {
            WindowFunc::Lag { expr, offset } => {
                format!("LAG({}, {offset})", self.expr_sql(expr)?)
            }
            WindowFunc::Lead { expr, offset } => {
                format!("LEAD({}, {offset})", self.expr_sql(expr)?)
            }
            WindowFunc::RowNumber => "ROW_NUMBER()".to_string(),
            WindowFunc::Rank => "RANK()".to_string(),
            WindowFunc::CumSum(e) => format!("SUM({})", self.expr_sql(e)?),
        };

        // Explicit node lists win over plan tags.
        let partitions: Vec<String> = if partition_by.is_empty() {
            self.group_tags
                .iter()
                .map(|c| self.quote_qualified(c))
                .collect()
        } else {
            partition_by.iter().map(|c| self.quote_qualified(c)).collect()
        };
        let orders: Vec<String> = if order_by.is_empty() {
            self.order_tags
                .iter()
                .map(|k| self.sort_key_sql(k))
                .collect()
        } else {
            order_by.iter().map(|k| self.sort_key_sql(k)).collect()
        };

        if orders.is_empty() && self.config.window_order == WindowOrderPolicy::Require {
            return Err(RelqError::PartitionOrderRequired(
                "window expression has no order list and no pending order tag".to_string(),
            ));
        }

        let mut over = String::new();
        if !partitions.is_empty() {
            over.push_str(&format!("PARTITION BY {}", partitions.join(", ")));
        }
        if !orders.is_empty() {
            if !over.is_empty() {
                over.push(' ');
            }
            over.push_str(&format!("ORDER BY {}", orders.join(", ")));
        }
        Ok(format!("{call} OVER ({over})"))
    }

    fn in_list_sql(
        &mut self,
        expr: &Expr,
        list: &[LiteralValue],
        negated: bool,
    ) -> Result<String> {
        let e = self.expr_sql(expr)?;
        if list.is_empty() {
            // IN () is not valid SQL; the empty set matches nothing.
            return Ok(if negated { "1 = 1" } else { "1 = 0" }.to_string());
        }
        if list.len() < self.config.inline_list_max_len {
            let lits: Vec<String> =
                list.iter().map(|v| self.dialect.quote_literal(v)).collect();
            return Ok(format!(
                "({e} {}IN ({}))",
                if negated { "NOT " } else { "" },
                lits.join(", ")
            ));
        }
        // At or above the threshold the value set is staged as an engine-side
        // table and the test becomes an IN-subquery, keeping statement size
        // bounded.
        let table = self.namer.next_name();
        self.staging.push(StagingRequest {
            table: table.clone(),
            column: "v".to_string(),
            values: list.to_vec(),
        });
        Ok(format!(
            "({e} {}IN (SELECT {} FROM {}))",
            if negated { "NOT " } else { "" },
            self.dialect.quote_ident("v"),
            self.dialect.quote_ident(&table)
        ))
    }

    fn agg_sql(&mut self, agg: &AggExpr) -> Result<String> {
        Ok(match agg {
            // COUNT of a literal means "count rows".
            AggExpr::Count(Expr::Literal(_)) => "COUNT(*)".to_string(),
            AggExpr::Count(e) => format!("COUNT({})", self.expr_sql(e)?),
            AggExpr::Sum(e) => format!("SUM({})", self.expr_sql(e)?),
            AggExpr::Min(e) => format!("MIN({})", self.expr_sql(e)?),
            AggExpr::Max(e) => format!("MAX({})", self.expr_sql(e)?),
            AggExpr::Avg(e) => format!("AVG({})", self.expr_sql(e)?),
        })
    }

    fn quote_qualified(&self, name: &str) -> String {
        match name.split_once('.') {
            Some((alias, col)) => format!(
                "{}.{}",
                self.dialect.quote_ident(alias),
                self.dialect.quote_ident(col)
            ),
            None => self.dialect.quote_ident(name),
        }
    }

    fn sort_key_sql(&self, key: &SortKey) -> String {
        if key.descending {
            format!("{} DESC", self.quote_qualified(&key.column))
        } else {
            self.quote_qualified(&key.column)
        }
    }

    fn render(&self, stage: &SelectStage) -> String {
        let mut parts: Vec<String> = vec![];
        if stage.wildcard {
            parts.push("*".to_string());
        }
        parts.extend(stage.select.iter().cloned());
        parts.extend(stage.raw_select.iter().cloned());

        let mut sql = format!("SELECT {} FROM {}", parts.join(", "), stage.from_item);
        for j in &stage.joins {
            sql.push(' ');
            sql.push_str(j);
        }

        let wheres: Vec<&String> = stage.wheres.iter().chain(&stage.raw_where).collect();
        if !wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(
                &wheres
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(" AND "),
            );
        }

        let groups: Vec<&String> = stage.group_by.iter().chain(&stage.raw_group).collect();
        if !groups.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(
                &groups
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }

        if !stage.raw_having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(
                &stage
                    .raw_having
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(" AND "),
            );
        }

        let mut orders: Vec<String> =
            stage.order_by.iter().map(|k| self.sort_key_sql(k)).collect();
        orders.extend(stage.raw_order.iter().cloned());
        if !orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }

        if let Some(n) = stage.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }
        sql
    }
}

fn binary_op_sql(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "=",
        BinaryOp::NotEq => "<>",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::Plus => "+",
        BinaryOp::Minus => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
    }
}

fn join_kind_sql(kind: JoinKind) -> &'static str {
    match kind {
        JoinKind::Inner => "INNER",
        JoinKind::Left => "LEFT",
        JoinKind::Right => "RIGHT",
        JoinKind::Full => "FULL",
    }
}

/// Date-typed means the differencing idiom applies when subtracted.
fn is_date_typed(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(LiteralValue::Date(_)) => true,
        Expr::Cast { to_type, .. } => *to_type == ScalarType::Date,
        Expr::ScalarFn { name, .. } => name.eq_ignore_ascii_case("date"),
        Expr::Window { func, .. } => match func {
            WindowFunc::Lag { expr, .. }
            | WindowFunc::Lead { expr, .. }
            | WindowFunc::CumSum(expr) => is_date_typed(expr),
            WindowFunc::RowNumber | WindowFunc::Rank => false,
        },
        _ => false,
    }
}

