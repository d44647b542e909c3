//! Engine configuration
//!
//! A small knob set shared by every controller through the navigation
//! context. Verbosity only toggles whether runtime diagnostics are logged;
//! it never changes which outcomes are fatal.

/// Configuration for the delegation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavConfig {
    /// Log non-fatal diagnostics (unknown state, unhandled state, missing
    /// default) via `tracing::warn!`. Events are recorded either way.
    pub verbose: bool,
    /// Upper bound on delegation recursion over the controller tree.
    /// Exceeding it is reported as a non-fatal unhandled state.
    pub max_delegation_depth: usize,
}

impl NavConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_delegation_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
