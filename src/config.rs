//! Container tunables.
//!
//! The host has no filesystem or environment access (see external
//! interfaces), so configuration is a plain `Copy`, `Default`-backed struct
//! handed to the container at construction.

/// Tunables for one [`crate::Container`].
#[derive(Debug, Clone, Copy)]
pub struct ContainerConfig {
    /// Upper bound on resolution recursion depth, guarding against a
    /// degenerate registration graph that isn't a simple A→B→A cycle.
    pub max_resolution_depth: usize,
    /// Initial capacity reserved for each tick-dispatcher subscriber list.
    pub initial_tick_capacity: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self { max_resolution_depth: 1024, initial_tick_capacity: 16 }
    }
}
