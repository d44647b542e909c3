//! The external authority owning the globally current state
//!
//! Exactly one authority holds "the" current descriptor for the whole
//! tree and knows which full names exist. Controllers consume it through
//! the [`StateAuthority`] trait; [`MemoryAuthority`] is the in-crate
//! reference implementation used by tests and stand-alone embeddings.

pub mod memory;

pub use memory::MemoryAuthority;

use crate::domain::descriptor::{SharedDescriptor, StateParams};

/// Options for installing a new current descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetCurrentOptions {
    /// Hint that the new state replaces the previous history entry rather
    /// than stacking on it. URL/history mechanics are the authority's
    /// business; the engine only forwards the flag.
    pub replace: bool,
}

/// Contract of the shared authority every controller consults
///
/// Methods take `&self`; implementations keep their mutable state behind
/// interior mutability since the engine is single-threaded.
pub trait StateAuthority {
    /// Renders a URL for a full state name and params
    fn generate_url(&self, full_name: &str, params: &StateParams, absolute: bool) -> String;

    /// Whether the authority knows the given full name
    fn is_registered(&self, full_name: &str) -> bool;

    /// Installs a new current descriptor (optimistic)
    ///
    /// # Returns
    /// true iff the globally current descriptor actually changed. On
    /// false, callers must resume with the equal descriptor already in
    /// place (via [`StateAuthority::get_current`]) instead of creating a
    /// redundant instance.
    fn set_current(&self, full_name: &str, params: &StateParams, options: SetCurrentOptions)
    -> bool;

    /// Handle to the globally current descriptor, if any
    fn get_current(&self) -> Option<SharedDescriptor>;

    /// Creates a detached descriptor when no global match exists yet
    fn create_descriptor(&self, name: &str, params: &StateParams) -> SharedDescriptor;
}
