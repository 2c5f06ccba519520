use serde::{Deserialize, Serialize};

/// Behavior when a window expression has a partition but no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowOrderPolicy {
    /// Fail compilation with `PartitionOrderRequired`.
    Require,
    /// Compile without an ORDER BY in the OVER clause; row order within a
    /// partition is then engine-defined and non-deterministic.
    EngineOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Membership-test value sets strictly below this length are inlined as
    /// literal lists; sets at or above it are staged as engine-side tables
    /// and rewritten as an IN-subquery.
    pub inline_list_max_len: usize,
    /// Policy for window expressions lacking an order list.
    pub window_order: WindowOrderPolicy,
    /// When false, filters are never merged past a projection stage, even
    /// when doing so is semantically valid.
    pub enable_filter_pushdown: bool,
    /// Prefix for staged temporary table names created by a session.
    pub temp_table_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inline_list_max_len: 100,
            window_order: WindowOrderPolicy::Require,
            enable_filter_pushdown: true,
            temp_table_prefix: "relq_tmp".to_string(),
        }
    }
}
