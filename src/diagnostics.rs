//! Diagnostic snapshots: a scope's debug view and the tick dispatcher's
//! counters (the latter lives in [`crate::tick::TickDebugInfo`]).

use std::time::Instant;

/// Point-in-time snapshot of one scope, for debugging and tests.
#[derive(Debug, Clone)]
pub struct ScopeDebug {
    pub scope_id: String,
    pub created_at: Instant,
    pub parent_scope_id: Option<String>,
    pub service_count: usize,
    pub child_scope_count: usize,
}
