use serde::{Deserialize, Serialize};

use crate::expr::{AggExpr, Expr, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

/// Clause a raw SQL fragment is inserted into, verbatim and unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawClauseKind {
    Select,
    Where,
    GroupBy,
    Having,
    OrderBy,
}

/// Closed set of relational operator nodes.
///
/// Nodes are immutable once created: every pipeline verb wraps its input in
/// a fresh node, so earlier stages are never mutated in place. The terminal
/// node identifies the whole query by walking upstream to the `Source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanNode {
    Source {
        table: String,
        alias: Option<String>,
    },
    Filter {
        predicate: Expr,
        input: Box<PlanNode>,
    },
    /// Adds named columns computed from scalar or window expressions; all
    /// upstream columns are kept.
    Mutate {
        exprs: Vec<(String, Expr)>,
        input: Box<PlanNode>,
    },
    /// Aggregates per the pending `GroupBy` tag, consuming it. Output
    /// columns are the group keys followed by the aggregate names.
    Summarize {
        aggs: Vec<(String, AggExpr)>,
        input: Box<PlanNode>,
    },
    /// Tag only: emits no SQL of its own. A later window mutate picks the
    /// keys up as its PARTITION BY; a later `Summarize` consumes them as
    /// its GROUP BY.
    GroupBy {
        keys: Vec<String>,
        input: Box<PlanNode>,
    },
    /// Orders the output and tags the pending window ORDER BY.
    OrderBy {
        keys: Vec<SortKey>,
        input: Box<PlanNode>,
    },
    Join {
        kind: JoinKind,
        left: Box<PlanNode>,
        right: Box<PlanNode>,
        /// Pairs of (left column, right column) equated by the join.
        on: Vec<(String, String)>,
    },
    Limit {
        n: u64,
        input: Box<PlanNode>,
    },
    /// Unchecked passthrough: the fragment lands verbatim in the designated
    /// clause of the stage being built. Callers own its correctness.
    RawClause {
        clause: RawClauseKind,
        fragment: String,
        input: Box<PlanNode>,
    },
}

impl PlanNode {
    pub fn source(table: impl Into<String>) -> Self {
        PlanNode::Source {
            table: table.into(),
            alias: None,
        }
    }

    /// The source table names this plan reads, left to right.
    pub fn source_tables(&self) -> Vec<&str> {
        let mut out = vec![];
        self.collect_sources(&mut out);
        out
    }

    fn collect_sources<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            PlanNode::Source { table, .. } => out.push(table.as_str()),
            PlanNode::Filter { input, .. }
            | PlanNode::Mutate { input, .. }
            | PlanNode::Summarize { input, .. }
            | PlanNode::GroupBy { input, .. }
            | PlanNode::OrderBy { input, .. }
            | PlanNode::Limit { input, .. }
            | PlanNode::RawClause { input, .. } => input.collect_sources(out),
            PlanNode::Join { left, right, .. } => {
                left.collect_sources(out);
                right.collect_sources(out);
            }
        }
    }
}
