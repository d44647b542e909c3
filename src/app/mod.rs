//! Application orchestration layer
//!
//! This module wires the domain logic into a live controller tree: the
//! shared navigation context, the controller nodes, name resolution, and
//! the recursive delegation protocol.

pub mod context;
pub mod controller;
pub mod delegate;
pub mod resolve;

pub use context::{DiagnosticEvent, DiagnosticKind, Diagnostics, NavContext};
pub use controller::Controller;
pub use delegate::{DelegateInput, PendingTransition};
pub use resolve::{ResolveError, ResolvedState};
