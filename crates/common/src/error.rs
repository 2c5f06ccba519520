use thiserror::Error;

/// Canonical relq error taxonomy used across crates.
///
/// Classification guidance:
/// - [`RelqError::AmbiguousReference`], [`RelqError::UnknownFunction`],
///   [`RelqError::PartitionOrderRequired`], [`RelqError::Unsupported`]:
///   compile-time failures, raised before any engine statement runs
/// - [`RelqError::StagingConflict`]: staged-table name collision with
///   differing contents and no explicit overwrite
/// - [`RelqError::Engine`]: opaque failure surfaced from the engine,
///   wrapped with the statement text that produced it
/// - [`RelqError::InvalidConfig`]: configuration contract violations
/// - [`RelqError::Cancelled`]: materialization observed a raised cancel
///   signal; per-call staged tables were cleaned up first
#[derive(Debug, Error)]
pub enum RelqError {
    /// A column reference resolves to more than one alias in scope.
    #[error("ambiguous reference: {0}")]
    AmbiguousReference(String),

    /// A scalar or window function name the dialect does not know.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A window expression has no ordering and the session policy requires one.
    #[error("window expression requires an order: {0}")]
    PartitionOrderRequired(String),

    /// Valid pipeline shape with no dialect translation.
    ///
    /// The escape hatch for such cases is the raw-clause passthrough verb,
    /// which inserts caller-supplied SQL verbatim and unchecked.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Staged table already exists with different contents and overwrite
    /// was not requested.
    #[error("staging conflict: {0}")]
    StagingConflict(String),

    /// Engine-side failure during execute/create/drop.
    ///
    /// Never retried: statement execution is not assumed idempotent because
    /// of side-effecting temp-table writes.
    #[error("engine error: {message} (statement: {sql})")]
    Engine { message: String, sql: String },

    /// Invalid or inconsistent configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Materialization was cancelled before completion.
    #[error("materialization cancelled")]
    Cancelled,
}

impl RelqError {
    /// Wrap an engine-side message with the statement that produced it.
    pub fn engine(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            sql: sql.into(),
        }
    }
}

/// Standard relq result alias.
pub type Result<T> = std::result::Result<T, RelqError>;
