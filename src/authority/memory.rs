//! In-memory reference authority
//!
//! Keeps the registered full names and the current descriptor in plain
//! cells. URL generation maps `a.b.c` to `/a/b/c` with params as a query
//! string; history integration is deliberately absent.

use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::authority::{SetCurrentOptions, StateAuthority};
use crate::domain::descriptor::{SharedDescriptor, StateDescriptor, StateParams};
use crate::domain::name::{NameError, SEPARATOR, split_full_name, validate_local_name};

/// Authority backed by an explicit registry of known full names
#[derive(Default)]
pub struct MemoryAuthority {
    routes: RefCell<BTreeSet<String>>,
    current: RefCell<Option<SharedDescriptor>>,
    /// Origin prepended when an absolute URL is requested
    base: Option<String>,
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }

    /// Registers a full state name, validating every segment
    ///
    /// The authority enforces the same segment grammar controllers do, so
    /// a name that passes here always round-trips through a state table.
    pub fn register(&self, full_name: &str) -> Result<(), NameError> {
        let segments = split_full_name(full_name);
        if segments.is_empty() {
            return Err(NameError::Empty);
        }
        for segment in &segments {
            validate_local_name(segment)?;
        }
        self.routes.borrow_mut().insert(full_name.to_string());
        Ok(())
    }
}

impl StateAuthority for MemoryAuthority {
    fn generate_url(&self, full_name: &str, params: &StateParams, absolute: bool) -> String {
        let mut url = String::new();
        if absolute {
            if let Some(base) = &self.base {
                url.push_str(base);
            }
        }
        url.push('/');
        url.push_str(&full_name.replace(SEPARATOR, "/"));
        if !params.is_empty() {
            let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    fn is_registered(&self, full_name: &str) -> bool {
        self.routes.borrow().contains(full_name)
    }

    fn set_current(
        &self,
        full_name: &str,
        params: &StateParams,
        _options: SetCurrentOptions,
    ) -> bool {
        if let Some(current) = self.current.borrow().as_ref() {
            let existing = current.snapshot();
            if existing.full_name() == full_name && existing.params() == params {
                // unchanged; the caller resumes with the descriptor in place
                return false;
            }
        }

        let descriptor = SharedDescriptor::new(StateDescriptor::new(full_name, params.clone()));
        *self.current.borrow_mut() = Some(descriptor);
        true
    }

    fn get_current(&self) -> Option<SharedDescriptor> {
        self.current.borrow().clone()
    }

    fn create_descriptor(&self, name: &str, params: &StateParams) -> SharedDescriptor {
        SharedDescriptor::new(StateDescriptor::new(name, params.clone()))
    }
}
