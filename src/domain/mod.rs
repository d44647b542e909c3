//! Domain logic and core data structures
//!
//! This module contains the pure state-naming logic: name grammar,
//! descriptors, and declarative state tables. Nothing here knows about
//! the controller tree or the external authority.

pub mod descriptor;
pub mod name;
pub mod table;
