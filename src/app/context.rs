//! Shared navigation context and runtime diagnostics
//!
//! Every controller holds a reference to one `NavContext`: the injected
//! authority, the engine configuration, and the diagnostics recorder. The
//! context is explicitly passed at construction; nothing is process-global.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use crate::authority::StateAuthority;
use crate::config::NavConfig;

/// Non-fatal runtime outcomes the engine reports instead of failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An empty state was delegated to a controller that declares states
    /// but no default
    UnconfiguredDefaultState,
    /// A delegated local name is not declared in the controller's table
    UnknownState,
    /// No child could continue propagation of a named state (also used
    /// when the delegation depth bound is exceeded)
    UnhandledState,
}

/// One recorded diagnostic: which controller, which name, what happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub controller: String,
    pub name: String,
    pub kind: DiagnosticKind,
}

/// Records diagnostic events; logs them only in verbose configurations
#[derive(Default)]
pub struct Diagnostics {
    events: RefCell<Vec<DiagnosticEvent>>,
}

impl Diagnostics {
    fn record(&self, event: DiagnosticEvent, verbose: bool) {
        if verbose {
            match event.kind {
                DiagnosticKind::UnconfiguredDefaultState => warn!(
                    controller = %event.controller,
                    "empty state delegated but no default state is configured"
                ),
                DiagnosticKind::UnknownState => warn!(
                    controller = %event.controller,
                    state = %event.name,
                    "delegated state is not declared"
                ),
                DiagnosticKind::UnhandledState => warn!(
                    controller = %event.controller,
                    state = %event.name,
                    "no child controller handles the remaining state"
                ),
            }
        }
        self.events.borrow_mut().push(event);
    }

    /// Removes and returns every recorded event
    pub fn take(&self) -> Vec<DiagnosticEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

/// The injected service bundle shared by a controller tree
pub struct NavContext {
    authority: Box<dyn StateAuthority>,
    config: NavConfig,
    diagnostics: Diagnostics,
}

impl NavContext {
    pub fn new(authority: impl StateAuthority + 'static, config: NavConfig) -> Rc<Self> {
        Rc::new(Self {
            authority: Box::new(authority),
            config,
            diagnostics: Diagnostics::default(),
        })
    }

    pub fn authority(&self) -> &dyn StateAuthority {
        self.authority.as_ref()
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn report(&self, kind: DiagnosticKind, controller: &str, name: &str) {
        self.diagnostics.record(
            DiagnosticEvent {
                controller: controller.to_string(),
                name: name.to_string(),
                kind,
            },
            self.config.verbose,
        );
    }
}
