//! Typed identifiers used for staged-table naming.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable session identifier, unique per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(
    /// Raw numeric id value.
    pub u64,
);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotone staging counter value within a session.
///
/// Combined with [`SessionId`] this makes staged-table names unique across
/// interleaved materializations on the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StagingId(
    /// Raw numeric id value.
    pub u64,
);

impl fmt::Display for StagingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
