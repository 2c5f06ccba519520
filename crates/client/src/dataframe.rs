use std::sync::Arc;

use relq_common::{RelqError, Result};
use relq_planner::{
    explain_plan, AggExpr, Expr, JoinKind, PlanNode, RawClauseKind, SortKey,
};

use crate::rows::RowSet;
use crate::session::{CancelToken, SharedSession};

/// A lazy pipeline over one session.
///
/// Every verb returns a new frame wrapping an extended plan; the receiver
/// is untouched and remains usable, so pipelines branch freely. Nothing
/// reaches the engine until [`DataFrame::collect`].
#[derive(Debug, Clone)]
pub struct DataFrame {
    session: SharedSession,
    plan: PlanNode,
}

impl DataFrame {
    pub(crate) fn new(session: SharedSession, plan: PlanNode) -> Self {
        Self { session, plan }
    }

    pub fn plan(&self) -> &PlanNode {
        &self.plan
    }

    fn extend(&self, node: PlanNode) -> Self {
        Self {
            session: Arc::clone(&self.session),
            plan: node,
        }
    }

    /// Keep rows where `predicate` evaluates true.
    pub fn filter(&self, predicate: Expr) -> Self {
        self.extend(PlanNode::Filter {
            input: Box::new(self.plan.clone()),
            predicate,
        })
    }

    /// Add or replace one derived column.
    pub fn mutate(&self, name: impl Into<String>, expr: Expr) -> Self {
        self.mutate_many(vec![(name.into(), expr)])
    }

    /// Add or replace several derived columns in one step. Expressions see
    /// the input relation, not each other.
    pub fn mutate_many(&self, exprs: Vec<(String, Expr)>) -> Self {
        self.extend(PlanNode::Mutate {
            input: Box::new(self.plan.clone()),
            exprs,
        })
    }

    /// Tag subsequent window and summarize steps with grouping keys.
    pub fn group_by(&self, keys: Vec<impl Into<String>>) -> Self {
        self.extend(PlanNode::GroupBy {
            input: Box::new(self.plan.clone()),
            keys: keys.into_iter().map(Into::into).collect(),
        })
    }

    /// Collapse to one row per group (or one row overall when ungrouped).
    pub fn summarize(&self, aggs: Vec<(String, AggExpr)>) -> Self {
        self.extend(PlanNode::Summarize {
            input: Box::new(self.plan.clone()),
            aggs,
        })
    }

    /// Order output rows; also supplies the frame ordering for window
    /// functions downstream.
    pub fn order_by(&self, keys: Vec<SortKey>) -> Self {
        self.extend(PlanNode::OrderBy {
            input: Box::new(self.plan.clone()),
            keys,
        })
    }

    /// Join against another frame of the same session on column-name pairs
    /// `(left, right)`.
    pub fn join(
        &self,
        other: &DataFrame,
        kind: JoinKind,
        on: Vec<(String, String)>,
    ) -> Result<Self> {
        if !Arc::ptr_eq(&self.session, &other.session) {
            return Err(RelqError::Unsupported(
                "cannot join frames from different sessions".to_string(),
            ));
        }
        if on.is_empty() {
            return Err(RelqError::Unsupported(
                "join requires at least one key pair".to_string(),
            ));
        }
        Ok(self.extend(PlanNode::Join {
            kind,
            left: Box::new(self.plan.clone()),
            right: Box::new(other.plan.clone()),
            on,
        }))
    }

    pub fn limit(&self, n: u64) -> Self {
        self.extend(PlanNode::Limit {
            input: Box::new(self.plan.clone()),
            n,
        })
    }

    /// Splice a raw SQL fragment into the named clause of the current
    /// stage. The fragment is emitted verbatim; the caller vouches for it.
    pub fn raw_sql(&self, clause: RawClauseKind, fragment: impl Into<String>) -> Self {
        self.extend(PlanNode::RawClause {
            input: Box::new(self.plan.clone()),
            clause,
            fragment: fragment.into(),
        })
    }

    /// Execute the pipeline and return all rows.
    pub fn collect(&self) -> Result<RowSet> {
        self.session.materialize(&self.plan, &CancelToken::new())
    }

    /// Execute with a cancellation token checked between engine calls.
    pub fn collect_with_cancel(&self, cancel: &CancelToken) -> Result<RowSet> {
        self.session.materialize(&self.plan, cancel)
    }

    /// The single SQL statement this pipeline compiles to, without touching
    /// the engine. Temp-table names are allocated deterministically, so the
    /// text is stable across calls.
    pub fn to_sql(&self) -> Result<String> {
        Ok(self.session.compile_only(&self.plan)?.sql)
    }

    /// Human-readable rendering of the logical plan.
    pub fn explain(&self) -> String {
        explain_plan(&self.plan)
    }
}
