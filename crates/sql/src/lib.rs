//! Plan-to-SQL compiler for relq.
//!
//! Architecture role:
//! - [`dialect`] owns identifier/literal quoting (the value-interpolation
//!   guard) and engine-specific idioms such as date differencing
//! - [`compiler`] lowers an immutable plan chain into one SELECT statement
//!   plus the staging requests needed before it can run
//!
//! Compilation is a pure function of the plan, the configuration, and the
//! temp-name allocator; with the default deterministic allocator, compiling
//! the same plan twice yields byte-identical SQL.

pub mod compiler;
pub mod dialect;

pub use compiler::*;
pub use dialect::*;
