//! Session, staging lifecycle, engine backends, and the lazy pipeline API.
//!
//! Architecture role:
//! - [`engine`] defines the narrow engine interface the core consumes
//! - [`sqlite`] implements it over an embedded SQLite connection
//! - [`session`] owns staged temporary tables and materialization
//! - [`dataframe`] exposes the pipeline verbs; nothing executes until
//!   `collect`
//! - [`expr`] holds the expression builder helpers

pub mod dataframe;
pub mod engine;
pub mod expr;
pub mod rows;
pub mod session;
pub mod sqlite;

pub use dataframe::DataFrame;
pub use engine::Engine;
pub use expr::*;
pub use rows::{Row, RowSet, Value};
pub use session::{CancelToken, CleanupFailure, Session, SharedSession};
pub use sqlite::SqliteEngine;

pub use relq_common::{RelqError, Result, SessionConfig, WindowOrderPolicy};
pub use relq_planner::{
    AggExpr, BinaryOp, Expr, JoinKind, LiteralValue, PlanNode, RawClauseKind, ScalarType,
    SortKey, WindowFunc,
};
