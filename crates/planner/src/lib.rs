//! Expression model, relational plan IR, and plan validation.
//!
//! Architecture role:
//! - [`expr`] holds the scalar/window expression tree; column references and
//!   literals are distinct constructors, decided at build time
//! - [`plan`] holds the closed set of relational operator nodes; pipelines
//!   build immutable chains, one new node per verb
//! - [`analyzer`] validates a plan against a column catalog before any SQL
//!   is emitted or any engine statement runs
//! - [`explain`] renders a plan chain as indented text

pub mod analyzer;
pub mod explain;
pub mod expr;
pub mod plan;

pub use analyzer::*;
pub use explain::*;
pub use expr::*;
pub use plan::*;
