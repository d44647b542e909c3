//! Controller nodes of the navigation tree
//!
//! A controller owns a validated state table, an optional default state,
//! and its own current/previous descriptors. Controllers are wired into a
//! tree (weak uplink, ordered downlinks) and always used through `Rc`.
//! Construction validates everything eagerly: a declaration error fails
//! the whole controller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::app::context::NavContext;
use crate::app::delegate::DelegateInput;
use crate::app::resolve::ResolveError;
use crate::authority::SetCurrentOptions;
use crate::domain::descriptor::{SharedDescriptor, StateDescriptor, StateParams};
use crate::domain::table::{
    DefaultState, HandlerRegistry, ParamRule, StateDeclarations, StateTable, TableError,
};

/// One node of the controller tree
pub struct Controller {
    /// Debug label used in diagnostics
    label: String,
    table: StateTable,
    default_state: Option<DefaultState>,
    context: Rc<NavContext>,
    parent: RefCell<Weak<Controller>>,
    children: RefCell<Vec<Rc<Controller>>>,
    /// Independent copy of the last state this node committed
    current: RefCell<Option<StateDescriptor>>,
    /// The state before that, for transition inspection by handlers
    previous: RefCell<Option<StateDescriptor>>,
}

impl Controller {
    /// Builds a controller from its declarative state table
    ///
    /// # Arguments
    /// * `label` - Debug label for diagnostics
    /// * `declarations` - Ordered `key -> handler` state declarations
    /// * `registry` - Named handler registrations for `Method` bindings
    /// * `default_state` - Bare name of the state assumed for an empty
    ///   delegation, validated against the built table
    /// * `context` - Injected authority/config/diagnostics bundle
    ///
    /// # Returns
    /// The wired node, or the first fatal declaration error
    pub fn new(
        label: impl Into<String>,
        declarations: StateDeclarations,
        registry: &HandlerRegistry,
        default_state: Option<&str>,
        context: Rc<NavContext>,
    ) -> Result<Rc<Self>, TableError> {
        let table = StateTable::build(declarations, registry)?;
        let default_state = match default_state {
            Some(name) => Some(DefaultState::new(name, &table)?),
            None => None,
        };

        Ok(Rc::new(Self {
            label: label.into(),
            table,
            default_state,
            context,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            current: RefCell::new(None),
            previous: RefCell::new(None),
        }))
    }

    /// Appends a child, wiring its uplink to this node
    pub fn attach_child(self: &Rc<Self>, child: &Rc<Controller>) {
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child.clone());
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<Rc<Controller>> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<Rc<Controller>> {
        self.children.borrow().clone()
    }

    /// Root of the tree this node belongs to
    pub fn root(self: &Rc<Self>) -> Rc<Controller> {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Copy of the state this node currently holds, if any
    pub fn current_state(&self) -> Option<StateDescriptor> {
        self.current.borrow().clone()
    }

    /// Copy of the state this node held before the current one
    pub fn previous_state(&self) -> Option<StateDescriptor> {
        self.previous.borrow().clone()
    }

    pub fn default_state(&self) -> Option<&DefaultState> {
        self.default_state.as_ref()
    }

    pub(crate) fn table(&self) -> &StateTable {
        &self.table
    }

    pub(crate) fn context(&self) -> &NavContext {
        &self.context
    }

    pub(crate) fn commit(&self, snapshot: StateDescriptor) {
        let mut current = self.current.borrow_mut();
        *self.previous.borrow_mut() = current.take();
        *current = Some(snapshot);
    }

    pub(crate) fn reconcile_full_name(&self, full_name: &str) {
        if let Some(current) = self.current.borrow_mut().as_mut() {
            current.set_full_name(full_name);
        }
    }

    /// Decides whether `candidate` is the same state this node holds
    ///
    /// No current state means always different. A candidate name missing
    /// from the table is compared by name only; a wildcard declaration is
    /// never the same; otherwise equality is restricted to the declared
    /// relevant parameter keys.
    pub fn is_same(&self, candidate: &SharedDescriptor) -> bool {
        match self.current.borrow().as_ref() {
            Some(base) => self.is_same_as(candidate, base),
            None => false,
        }
    }

    /// Same decision as [`Controller::is_same`], against an explicit base
    pub fn is_same_as(&self, candidate: &SharedDescriptor, base: &StateDescriptor) -> bool {
        match self.table.get(&candidate.name()) {
            None => candidate.is_equal(base, &[]),
            Some(entry) => match &entry.rule {
                ParamRule::Wildcard => false,
                ParamRule::Relevant(keys) => candidate.is_equal(base, keys),
            },
        }
    }

    /// Resolves a request and routes it through the authority and the tree
    ///
    /// When the resolved full name is registered, the authority installs
    /// it optimistically: if it reports "no change", the descriptor
    /// already in place is reused instead of creating a redundant one.
    /// Unregistered names get a fresh detached descriptor delegated as a
    /// pending transition.
    pub fn set_state(
        self: &Rc<Self>,
        raw_name: &str,
        explicit_params: &StateParams,
    ) -> Result<(), ResolveError> {
        let resolved = self.resolve(raw_name, explicit_params)?;
        let authority = self.context.authority();

        let (descriptor, pending) = if authority.is_registered(&resolved.full_name) {
            authority.set_current(
                &resolved.full_name,
                &resolved.params,
                SetCurrentOptions::default(),
            );
            match authority.get_current() {
                Some(descriptor) => (descriptor, false),
                None => return Ok(()),
            }
        } else {
            let descriptor = authority.create_descriptor(&resolved.full_name, &resolved.params);
            (descriptor, true)
        };

        let sought = match &resolved.local_name {
            Some(local) => descriptor.seek_to(local),
            None => false,
        };

        let input = if pending {
            DelegateInput::pending(descriptor)
        } else {
            DelegateInput::Descriptor(descriptor)
        };

        if sought {
            self.delegate_state(Some(input));
        } else {
            // not addressable as a local segment: restart from the root
            input.descriptor().rewind();
            self.root().delegate_state(Some(input));
        }
        Ok(())
    }

    /// Resolves a request and renders it as a URL via the authority
    pub fn state_url(
        &self,
        raw_name: &str,
        explicit_params: &StateParams,
        absolute: bool,
    ) -> Result<String, ResolveError> {
        let resolved = self.resolve(raw_name, explicit_params)?;
        Ok(self
            .context
            .authority()
            .generate_url(&resolved.full_name, &resolved.params, absolute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::MemoryAuthority;
    use crate::config::NavConfig;
    use crate::domain::table::HandlerBinding;

    fn context() -> Rc<NavContext> {
        NavContext::new(MemoryAuthority::new(), NavConfig::default())
    }

    fn noop() -> HandlerBinding {
        HandlerBinding::callable(|_| {})
    }

    #[test]
    fn construction_fails_on_bad_declarations() {
        let result = Controller::new(
            "shell",
            StateDeclarations::new().declare("bad name", noop()),
            &HandlerRegistry::new(),
            None,
            context(),
        );
        assert!(matches!(result, Err(TableError::InvalidKey { .. })));
    }

    #[test]
    fn construction_fails_on_unknown_default() {
        let result = Controller::new(
            "shell",
            StateDeclarations::new().declare("list", noop()),
            &HandlerRegistry::new(),
            Some("missing"),
            context(),
        );
        assert!(matches!(
            result,
            Err(TableError::UnknownDefaultState { .. })
        ));
    }

    #[test]
    fn attach_child_wires_both_directions_in_order() {
        let ctx = context();
        let parent = Controller::new(
            "parent",
            StateDeclarations::new(),
            &HandlerRegistry::new(),
            None,
            ctx.clone(),
        )
        .unwrap();
        let first = Controller::new(
            "first",
            StateDeclarations::new(),
            &HandlerRegistry::new(),
            None,
            ctx.clone(),
        )
        .unwrap();
        let second = Controller::new(
            "second",
            StateDeclarations::new(),
            &HandlerRegistry::new(),
            None,
            ctx,
        )
        .unwrap();

        parent.attach_child(&first);
        parent.attach_child(&second);

        let children = parent.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].label(), "first");
        assert_eq!(children[1].label(), "second");
        assert!(Rc::ptr_eq(&first.parent().unwrap(), &parent));
        assert!(Rc::ptr_eq(&first.root(), &parent));
        assert!(parent.parent().is_none());
    }

    #[test]
    fn is_same_without_current_state_is_always_false() {
        let ctrl = Controller::new(
            "shell",
            StateDeclarations::new().declare("list", noop()),
            &HandlerRegistry::new(),
            None,
            context(),
        )
        .unwrap();

        let candidate = SharedDescriptor::new(StateDescriptor::new("list", StateParams::new()));
        assert!(!ctrl.is_same(&candidate));
    }

    #[test]
    fn wildcard_state_never_equals_itself() {
        let ctrl = Controller::new(
            "shell",
            StateDeclarations::new()
                .declare("edit(*)", noop())
                .declare("list", noop()),
            &HandlerRegistry::new(),
            None,
            context(),
        )
        .unwrap();

        let edit = StateDescriptor::new("edit", StateParams::new());
        let edit_candidate = SharedDescriptor::new(edit.clone());
        assert!(!ctrl.is_same_as(&edit_candidate, &edit));

        // a plain declaration is the same regardless of param differences
        let list_a = StateDescriptor::new(
            "list",
            [("page".to_string(), "1".to_string())].into_iter().collect(),
        );
        let list_b = SharedDescriptor::new(StateDescriptor::new(
            "list",
            [("page".to_string(), "9".to_string())].into_iter().collect(),
        ));
        assert!(ctrl.is_same_as(&list_b, &list_a));
    }

    #[test]
    fn undeclared_candidate_compares_by_name_only() {
        let ctrl = Controller::new(
            "shell",
            StateDeclarations::new().declare("list", noop()),
            &HandlerRegistry::new(),
            None,
            context(),
        )
        .unwrap();

        let base = StateDescriptor::new(
            "ghost",
            [("id".to_string(), "1".to_string())].into_iter().collect(),
        );
        let candidate = SharedDescriptor::new(StateDescriptor::new(
            "ghost",
            [("id".to_string(), "2".to_string())].into_iter().collect(),
        ));
        assert!(ctrl.is_same_as(&candidate, &base));
    }
}
