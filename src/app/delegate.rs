//! The delegation engine
//!
//! One `delegate_state` call is one unbroken synchronous descent over the
//! controller tree. At each node: fill the default state into the shared
//! descriptor when needed, decide same-vs-different against the node's
//! current state, commit current/previous and advance the cursor, then
//! either run the local handler (different: terminal) or hand the
//! descriptor to the first child that can continue (same: propagation).
//! After the descent returns, the node reconciles its committed full name
//! with any default substitution a descendant performed.

use tracing::debug;

use crate::app::context::DiagnosticKind;
use crate::app::controller::Controller;
use crate::domain::descriptor::SharedDescriptor;
use crate::domain::name::SEPARATOR;
use crate::domain::table::StateChange;

/// Envelope for a descriptor a controller created itself, before the
/// authority recognizes its full name as current
pub struct PendingTransition {
    descriptor: SharedDescriptor,
}

impl PendingTransition {
    pub fn new(descriptor: SharedDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &SharedDescriptor {
        &self.descriptor
    }

    pub fn into_descriptor(self) -> SharedDescriptor {
        self.descriptor
    }
}

/// Input accepted by [`Controller::delegate_state`]
pub enum DelegateInput {
    Descriptor(SharedDescriptor),
    Pending(PendingTransition),
}

impl DelegateInput {
    pub fn pending(descriptor: SharedDescriptor) -> Self {
        DelegateInput::Pending(PendingTransition::new(descriptor))
    }

    pub fn descriptor(&self) -> &SharedDescriptor {
        match self {
            DelegateInput::Descriptor(descriptor) => descriptor,
            DelegateInput::Pending(pending) => pending.descriptor(),
        }
    }

    fn into_descriptor(self) -> SharedDescriptor {
        match self {
            DelegateInput::Descriptor(descriptor) => descriptor,
            DelegateInput::Pending(pending) => pending.into_descriptor(),
        }
    }
}

impl Controller {
    /// Routes a descriptor to the controller responsible for it
    ///
    /// `None` fetches the authority's current descriptor; no current
    /// descriptor is a silent no-op. Runtime misconfigurations (unknown
    /// name, no default, no child to continue) never raise: they are
    /// recorded as diagnostics and leave every node's state unchanged.
    ///
    /// Handlers run after this node's commit, with owned snapshots; a
    /// handler must not mutate the same shared descriptor by triggering a
    /// nested delegation of it.
    pub fn delegate_state(&self, input: Option<DelegateInput>) {
        let descriptor = match input {
            Some(input) => input.into_descriptor(),
            None => match self.context().authority().get_current() {
                Some(descriptor) => {
                    // a previous delegation may have exhausted the cursor
                    descriptor.rewind();
                    descriptor
                }
                None => return,
            },
        };
        self.delegate_at(&descriptor, 0);
    }

    fn delegate_at(&self, descriptor: &SharedDescriptor, depth: usize) {
        if depth >= self.context().config().max_delegation_depth {
            self.context().report(
                DiagnosticKind::UnhandledState,
                self.label(),
                &descriptor.name(),
            );
            return;
        }

        // default-state filling: a matching name gets missing params; an
        // empty name gets the default appended as the final path segment
        if let Some(default) = self.default_state() {
            let name = descriptor.name();
            if name == default.name {
                descriptor.fill_params(&default.params);
            } else if name.is_empty() {
                descriptor.append_segment(&default.name);
                descriptor.fill_params(&default.params);
            }
        }

        let local_name = descriptor.name();
        if local_name.is_empty() {
            // stateless container controllers are legal; a controller
            // with states but no default is a misconfiguration
            if !self.table().is_empty() {
                self.context().report(
                    DiagnosticKind::UnconfiguredDefaultState,
                    self.label(),
                    &local_name,
                );
            }
            return;
        }

        if !self.table().contains(&local_name) {
            self.context()
                .report(DiagnosticKind::UnknownState, self.label(), &local_name);
            return;
        }

        let same = self.is_same(descriptor);

        // commit before anything observes this node: children never see a
        // parent's in-flight state
        let committed_position = descriptor.cursor();
        self.commit(descriptor.snapshot());
        descriptor.advance_cursor();

        if same {
            self.propagate(descriptor, depth);
        } else {
            self.execute(&local_name, descriptor);
        }

        self.reconcile(descriptor, committed_position);
    }

    /// Own handling: the terminal step of a delegation branch
    fn execute(&self, local_name: &str, descriptor: &SharedDescriptor) {
        debug!(controller = %self.label(), state = %local_name, "executing state handler");

        let handler = match self.table().get(local_name) {
            Some(entry) => entry.handler.clone(),
            None => return,
        };

        // owned snapshots; all RefCell borrows are released before dispatch
        let params = descriptor.params();
        let current = match self.current_state() {
            Some(current) => current,
            None => descriptor.snapshot(),
        };
        let previous = self.previous_state();

        (*handler)(&StateChange {
            params: &params,
            current: &current,
            previous: previous.as_ref(),
        });
    }

    /// Propagation: the state is unchanged here, hand it further down
    fn propagate(&self, descriptor: &SharedDescriptor, depth: usize) {
        let remaining = descriptor.name();

        let child = if remaining.is_empty() {
            // no name left: the first child whose default state's full
            // path the authority recognizes continues the chain
            self.children().into_iter().find(|child| {
                child.default_state().is_some_and(|default| {
                    let full = format!(
                        "{}{}{}",
                        descriptor.full_name(),
                        SEPARATOR,
                        default.name
                    );
                    self.context().authority().is_registered(&full)
                })
            })
        } else {
            self.children()
                .into_iter()
                .find(|child| child.table().contains(&remaining))
        };

        match child {
            Some(child) => child.delegate_at(descriptor, depth + 1),
            None if !remaining.is_empty() => {
                self.context()
                    .report(DiagnosticKind::UnhandledState, self.label(), &remaining);
            }
            // no remaining name and no default anywhere below: acceptable
            None => {}
        }
    }

    /// Copies a descendant-refined full name back onto this node's copy
    ///
    /// Runs only when the shared descriptor is still the one the authority
    /// considers current and the segment this node committed is intact.
    fn reconcile(&self, descriptor: &SharedDescriptor, committed_position: usize) {
        let authority_holds_it = self
            .context()
            .authority()
            .get_current()
            .is_some_and(|current| current.ptr_eq(descriptor));
        if !authority_holds_it {
            return;
        }

        let committed_name = match self.current_state() {
            Some(current) => current.name().to_string(),
            None => return,
        };
        if descriptor.segment_at(committed_position).as_deref() != Some(committed_name.as_str()) {
            return;
        }

        let full_name = descriptor.full_name();
        if self
            .current_state()
            .is_some_and(|current| current.full_name() != full_name)
        {
            self.reconcile_full_name(&full_name);
        }
    }
}
