//! navtree: hierarchical state resolution and delegation
//!
//! A tree of cooperating controllers agrees on "where the application
//! currently is" and routes a navigation request to the single controller
//! responsible for handling it. Each controller declares its states in a
//! table (`name`, `name(p1, p2)`, `name(*)`), optionally names a default
//! state, and shares one injected [`app::NavContext`] holding the external
//! authority that owns the globally current descriptor.
//!
//! ```
//! use std::rc::Rc;
//!
//! use navtree::app::{Controller, NavContext};
//! use navtree::authority::MemoryAuthority;
//! use navtree::config::NavConfig;
//! use navtree::domain::descriptor::StateParams;
//! use navtree::domain::table::{HandlerBinding, HandlerRegistry, StateDeclarations};
//!
//! let authority = MemoryAuthority::new();
//! authority.register("home").unwrap();
//! let context = NavContext::new(authority, NavConfig::default());
//!
//! let shell = Controller::new(
//!     "shell",
//!     StateDeclarations::new()
//!         .declare("home", HandlerBinding::callable(|_| println!("home")))
//!         .declare("edit(id)", HandlerBinding::callable(|change| {
//!             println!("editing {:?}", change.params.get("id"));
//!         })),
//!     &HandlerRegistry::new(),
//!     Some("home"),
//!     context,
//! )
//! .unwrap();
//!
//! shell.set_state("", &StateParams::new()).unwrap();
//! assert_eq!(shell.current_state().unwrap().name(), "home");
//! ```

pub mod app;
pub mod authority;
pub mod config;
pub mod domain;

pub use app::{Controller, DelegateInput, NavContext, PendingTransition, ResolveError};
pub use authority::{MemoryAuthority, SetCurrentOptions, StateAuthority};
pub use config::NavConfig;
pub use domain::descriptor::{SharedDescriptor, StateDescriptor, StateParams};
pub use domain::table::{
    DefaultState, HandlerBinding, HandlerRegistry, ParamRule, StateChange, StateDeclarations,
    StateHandler, StateTable, StateTableEntry, TableError,
};
