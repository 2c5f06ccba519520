use crate::expr::{AggExpr, Expr, LiteralValue, SortKey, WindowFunc};
use crate::plan::{JoinKind, PlanNode, RawClauseKind};

/// Render a plan chain as human-readable multiline text.
pub fn explain_plan(plan: &PlanNode) -> String {
    let mut s = String::new();
    fmt_plan(plan, 0, &mut s);
    s
}

fn fmt_plan(plan: &PlanNode, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match plan {
        PlanNode::Source { table, alias } => match alias {
            Some(a) => out.push_str(&format!("{pad}Source table={table} alias={a}\n")),
            None => out.push_str(&format!("{pad}Source table={table}\n")),
        },
        PlanNode::Filter { predicate, input } => {
            out.push_str(&format!("{pad}Filter {}\n", fmt_expr(predicate)));
            fmt_plan(input, indent + 1, out);
        }
        PlanNode::Mutate { exprs, input } => {
            out.push_str(&format!("{pad}Mutate\n"));
            for (name, e) in exprs {
                out.push_str(&format!("{pad}  {name} := {}\n", fmt_expr(e)));
            }
            fmt_plan(input, indent + 1, out);
        }
        PlanNode::Summarize { aggs, input } => {
            out.push_str(&format!("{pad}Summarize\n"));
            for (name, a) in aggs {
                out.push_str(&format!("{pad}  {name} := {}\n", fmt_agg(a)));
            }
            fmt_plan(input, indent + 1, out);
        }
        PlanNode::GroupBy { keys, input } => {
            out.push_str(&format!("{pad}GroupBy keys={keys:?}\n"));
            fmt_plan(input, indent + 1, out);
        }
        PlanNode::OrderBy { keys, input } => {
            let keys: Vec<String> = keys.iter().map(fmt_sort_key).collect();
            out.push_str(&format!("{pad}OrderBy keys={keys:?}\n"));
            fmt_plan(input, indent + 1, out);
        }
        PlanNode::Join {
            kind,
            left,
            right,
            on,
        } => {
            out.push_str(&format!("{pad}Join kind={}\n", fmt_join_kind(*kind)));
            out.push_str(&format!("{pad}  on={on:?}\n"));
            out.push_str(&format!("{pad}  left:\n"));
            fmt_plan(left, indent + 2, out);
            out.push_str(&format!("{pad}  right:\n"));
            fmt_plan(right, indent + 2, out);
        }
        PlanNode::Limit { n, input } => {
            out.push_str(&format!("{pad}Limit n={n}\n"));
            fmt_plan(input, indent + 1, out);
        }
        PlanNode::RawClause {
            clause,
            fragment,
            input,
        } => {
            out.push_str(&format!(
                "{pad}RawClause clause={} fragment={fragment:?} unchecked\n",
                fmt_clause(*clause)
            ));
            fmt_plan(input, indent + 1, out);
        }
    }
}

fn fmt_join_kind(k: JoinKind) -> &'static str {
    match k {
        JoinKind::Inner => "inner",
        JoinKind::Left => "left",
        JoinKind::Right => "right",
        JoinKind::Full => "full",
    }
}

fn fmt_clause(c: RawClauseKind) -> &'static str {
    match c {
        RawClauseKind::Select => "select",
        RawClauseKind::Where => "where",
        RawClauseKind::GroupBy => "group_by",
        RawClauseKind::Having => "having",
        RawClauseKind::OrderBy => "order_by",
    }
}

fn fmt_sort_key(k: &SortKey) -> String {
    if k.descending {
        format!("{} desc", k.column)
    } else {
        k.column.clone()
    }
}

fn fmt_agg(a: &AggExpr) -> String {
    match a {
        AggExpr::Count(e) => format!("count({})", fmt_expr(e)),
        AggExpr::Sum(e) => format!("sum({})", fmt_expr(e)),
        AggExpr::Min(e) => format!("min({})", fmt_expr(e)),
        AggExpr::Max(e) => format!("max({})", fmt_expr(e)),
        AggExpr::Avg(e) => format!("avg({})", fmt_expr(e)),
    }
}

fn fmt_expr(e: &Expr) -> String {
    match e {
        Expr::Column(c) => c.clone(),
        Expr::Literal(v) => fmt_literal(v),
        Expr::BinaryOp { left, op, right } => {
            format!("({}) {:?} ({})", fmt_expr(left), op, fmt_expr(right))
        }
        Expr::And(a, b) => format!("({}) AND ({})", fmt_expr(a), fmt_expr(b)),
        Expr::Or(a, b) => format!("({}) OR ({})", fmt_expr(a), fmt_expr(b)),
        Expr::Not(x) => format!("NOT ({})", fmt_expr(x)),
        Expr::Cast { expr, to_type } => format!("cast({} as {to_type:?})", fmt_expr(expr)),
        Expr::ScalarFn { name, args } => format!(
            "{}({})",
            name,
            args.iter().map(fmt_expr).collect::<Vec<_>>().join(", ")
        ),
        Expr::Window {
            func,
            partition_by,
            order_by,
        } => {
            let order: Vec<String> = order_by.iter().map(fmt_sort_key).collect();
            format!(
                "{} over partition={partition_by:?} order={order:?}",
                fmt_window_func(func)
            )
        }
        Expr::InList {
            expr,
            list,
            negated,
        } => format!(
            "({}) {}in [{}]",
            fmt_expr(expr),
            if *negated { "not " } else { "" },
            list.iter().map(fmt_literal).collect::<Vec<_>>().join(", ")
        ),
        Expr::InTable {
            expr,
            table,
            column,
            negated,
        } => format!(
            "({}) {}in {table}.{column}",
            fmt_expr(expr),
            if *negated { "not " } else { "" }
        ),
    }
}

fn fmt_window_func(f: &WindowFunc) -> String {
    match f {
        WindowFunc::Lag { expr, offset } => format!("lag({}, {offset})", fmt_expr(expr)),
        WindowFunc::Lead { expr, offset } => format!("lead({}, {offset})", fmt_expr(expr)),
        WindowFunc::RowNumber => "row_number()".to_string(),
        WindowFunc::Rank => "rank()".to_string(),
        WindowFunc::CumSum(e) => format!("cum_sum({})", fmt_expr(e)),
    }
}

fn fmt_literal(v: &LiteralValue) -> String {
    match v {
        LiteralValue::Int64(i) => i.to_string(),
        LiteralValue::Float64(f) => format!("{f:?}"),
        LiteralValue::Utf8(s) => format!("{s:?}"),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::Date(d) => format!("date {d}"),
        LiteralValue::Null => "null".to_string(),
    }
}
