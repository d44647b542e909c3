//! Declarative state tables and handler resolution
//!
//! A controller declares its states as `key -> handler` pairs. Keys follow
//! the grammar `name`, `name(p1, p2, ...)`, or `name(*)`; the parenthesized
//! group selects which parameters matter when deciding whether two
//! descriptors of that state are "the same" (`*` means never the same).
//! Parsing and handler resolution happen eagerly at construction and any
//! failure is fatal to the whole controller.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::domain::descriptor::{StateDescriptor, StateParams};
use crate::domain::name::{NameError, validate_local_name};

/// View of a committed state transition passed to a state handler
///
/// `previous` is the state the controller held before this transition, for
/// handlers that want to inspect where the application came from.
pub struct StateChange<'a> {
    pub params: &'a StateParams,
    pub current: &'a StateDescriptor,
    pub previous: Option<&'a StateDescriptor>,
}

/// Callable executed when a controller takes ownership of a state
pub type StateHandler = Rc<dyn Fn(&StateChange<'_>)>;

/// How a declared state binds to its handler
///
/// `Method` references a named callable in the controller's
/// [`HandlerRegistry`]; an unresolvable name fails construction.
pub enum HandlerBinding {
    Callable(StateHandler),
    Method(String),
}

impl HandlerBinding {
    /// Convenience wrapper for a closure binding
    pub fn callable(handler: impl Fn(&StateChange<'_>) + 'static) -> Self {
        HandlerBinding::Callable(Rc::new(handler))
    }

    pub fn method(name: impl Into<String>) -> Self {
        HandlerBinding::Method(name.into())
    }
}

/// Named handler registrations, built once before the state table
///
/// Replaces dynamic method-name lookup: every name a declaration may
/// reference must be registered here up front.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, StateHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl Fn(&StateChange<'_>) + 'static) {
        self.handlers.insert(name.into(), Rc::new(handler));
    }

    pub fn resolve(&self, name: &str) -> Option<StateHandler> {
        self.handlers.get(name).cloned()
    }
}

/// Parameter-equality rule for one declared state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamRule {
    /// Only the listed parameter keys matter for equality; an empty list
    /// means the state is the same whenever the name matches.
    Relevant(Vec<String>),
    /// The state is never considered the same; its handler always re-runs.
    Wildcard,
}

/// Errors that make a controller's state declarations fatal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("state key '{key}' has an invalid local name: {source}")]
    InvalidKey { key: String, source: NameError },

    #[error("state key '{key}' has an unterminated parameter group")]
    UnterminatedGroup { key: String },

    #[error("state '{name}' references unresolvable handler '{handler}'")]
    UnresolvableHandler { name: String, handler: String },

    #[error("default state '{name}' is not declared in the state table")]
    UnknownDefaultState { name: String },

    #[error("default state name is empty")]
    EmptyDefaultState,
}

/// Ordered `key -> handler` declarations, before parsing
///
/// Kept separate from the built table so derived controller types can merge
/// their declarations with a base type's (see [`StateDeclarations::merge`]).
#[derive(Default)]
pub struct StateDeclarations {
    entries: Vec<(String, HandlerBinding)>,
}

impl StateDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a state; later declarations of the same local name win
    pub fn declare(mut self, key: impl Into<String>, binding: HandlerBinding) -> Self {
        self.entries.push((key.into(), binding));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combines a base type's declarations with an override set
    ///
    /// Override entries win on local-name collision; non-conflicting base
    /// entries keep their declared order ahead of override entries. This is
    /// the one inheritance-time behavior the engine requires: it runs once
    /// when a derived controller type is composed, not per instance.
    pub fn merge(base: StateDeclarations, overrides: StateDeclarations) -> StateDeclarations {
        let override_names: Vec<String> = overrides
            .entries
            .iter()
            .map(|(key, _)| local_name_of(key).to_string())
            .collect();

        let mut entries: Vec<(String, HandlerBinding)> = base
            .entries
            .into_iter()
            .filter(|(key, _)| !override_names.iter().any(|n| n == local_name_of(key)))
            .collect();
        entries.extend(overrides.entries);

        StateDeclarations { entries }
    }
}

/// Local-name part of a declaration key (the substring before any group)
fn local_name_of(key: &str) -> &str {
    match key.find('(') {
        Some(open) => &key[..open],
        None => key,
    }
}

/// Parses one declaration key into its local name and parameter rule
///
/// # Returns
/// `(local_name, rule)` or a fatal TableError when the grammar is violated
fn parse_key(key: &str) -> Result<(String, ParamRule), TableError> {
    let (name, rule) = match key.find('(') {
        Some(open) => {
            let Some(group) = key[open + 1..].strip_suffix(')') else {
                return Err(TableError::UnterminatedGroup {
                    key: key.to_string(),
                });
            };
            let rule = if group.trim() == "*" {
                ParamRule::Wildcard
            } else {
                ParamRule::Relevant(
                    group
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect(),
                )
            };
            (&key[..open], rule)
        }
        None => (key, ParamRule::Relevant(Vec::new())),
    };

    validate_local_name(name).map_err(|source| TableError::InvalidKey {
        key: key.to_string(),
        source,
    })?;

    Ok((name.to_string(), rule))
}

/// One validated state: its parameter rule and resolved handler
pub struct StateTableEntry {
    pub rule: ParamRule,
    pub handler: StateHandler,
}

/// Finalized lookup from local name to table entry
pub struct StateTable {
    entries: HashMap<String, StateTableEntry>,
}

impl StateTable {
    /// Parses and validates declarations against a handler registry
    ///
    /// Fatal when a key fails the grammar or a `Method` binding does not
    /// resolve. Later declarations of the same local name replace earlier
    /// ones, matching [`StateDeclarations::merge`] semantics.
    pub fn build(
        declarations: StateDeclarations,
        registry: &HandlerRegistry,
    ) -> Result<Self, TableError> {
        let mut entries = HashMap::new();

        for (key, binding) in declarations.entries {
            let (name, rule) = parse_key(&key)?;
            let handler = match binding {
                HandlerBinding::Callable(handler) => handler,
                HandlerBinding::Method(method) => registry.resolve(&method).ok_or_else(|| {
                    TableError::UnresolvableHandler {
                        name: name.clone(),
                        handler: method,
                    }
                })?,
            };
            entries.insert(name, StateTableEntry { rule, handler });
        }

        Ok(Self { entries })
    }

    pub fn get(&self, local_name: &str) -> Option<&StateTableEntry> {
        self.entries.get(local_name)
    }

    pub fn contains(&self, local_name: &str) -> bool {
        self.entries.contains_key(local_name)
    }

    /// Count of declared states, used to tell a deliberately stateless
    /// controller apart from a misconfigured one in diagnostics
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The `{name, params}` descriptor a controller assumes for an empty name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultState {
    pub name: String,
    pub params: StateParams,
}

impl DefaultState {
    /// Normalizes a bare default-state name into `{name, params: {}}`
    ///
    /// Fatal when the name is empty or not declared in the table.
    pub fn new(name: &str, table: &StateTable) -> Result<Self, TableError> {
        Self::with_params(name, StateParams::new(), table)
    }

    pub fn with_params(
        name: &str,
        params: StateParams,
        table: &StateTable,
    ) -> Result<Self, TableError> {
        if name.is_empty() {
            return Err(TableError::EmptyDefaultState);
        }
        if !table.contains(name) {
            return Err(TableError::UnknownDefaultState {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> HandlerBinding {
        HandlerBinding::callable(|_| {})
    }

    fn build(declarations: StateDeclarations) -> Result<StateTable, TableError> {
        StateTable::build(declarations, &HandlerRegistry::new())
    }

    #[test]
    fn plain_key_gets_empty_relevant_list() {
        let table = build(StateDeclarations::new().declare("list", noop())).unwrap();
        let entry = table.get("list").unwrap();
        assert_eq!(entry.rule, ParamRule::Relevant(Vec::new()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn param_group_is_split_and_trimmed() {
        let table = build(StateDeclarations::new().declare("edit( id , tab )", noop())).unwrap();
        let entry = table.get("edit").unwrap();
        assert_eq!(
            entry.rule,
            ParamRule::Relevant(vec!["id".to_string(), "tab".to_string()])
        );
    }

    #[test]
    fn star_group_sets_wildcard() {
        let table = build(StateDeclarations::new().declare("edit(*)", noop())).unwrap();
        assert_eq!(table.get("edit").unwrap().rule, ParamRule::Wildcard);
    }

    #[test]
    fn empty_group_means_name_only() {
        let table = build(StateDeclarations::new().declare("view()", noop())).unwrap();
        assert_eq!(
            table.get("view").unwrap().rule,
            ParamRule::Relevant(Vec::new())
        );
    }

    #[test]
    fn invalid_local_name_is_fatal() {
        assert!(matches!(
            build(StateDeclarations::new().declare("bad name", noop())),
            Err(TableError::InvalidKey { .. })
        ));
        assert!(matches!(
            build(StateDeclarations::new().declare("a.b", noop())),
            Err(TableError::InvalidKey {
                source: NameError::ContainsSeparator { .. },
                ..
            })
        ));
    }

    #[test]
    fn unterminated_group_is_fatal() {
        assert!(matches!(
            build(StateDeclarations::new().declare("edit(id", noop())),
            Err(TableError::UnterminatedGroup { .. })
        ));
    }

    #[test]
    fn method_binding_resolves_through_registry() {
        let mut registry = HandlerRegistry::new();
        registry.register("on_list", |_| {});

        let table = StateTable::build(
            StateDeclarations::new().declare("list", HandlerBinding::method("on_list")),
            &registry,
        )
        .unwrap();
        assert!(table.contains("list"));
    }

    #[test]
    fn unresolvable_method_is_fatal() {
        let result = StateTable::build(
            StateDeclarations::new().declare("list", HandlerBinding::method("missing")),
            &HandlerRegistry::new(),
        );
        assert_eq!(
            result.err(),
            Some(TableError::UnresolvableHandler {
                name: "list".to_string(),
                handler: "missing".to_string(),
            })
        );
    }

    #[test]
    fn merge_prefers_override_entries_on_collision() {
        let hit = std::rc::Rc::new(std::cell::RefCell::new(String::new()));
        let base_hit = hit.clone();
        let override_hit = hit.clone();

        let base = StateDeclarations::new()
            .declare("list", HandlerBinding::callable(move |_| {
                *base_hit.borrow_mut() = "base".to_string();
            }))
            .declare("view", noop());
        let overrides = StateDeclarations::new()
            .declare("list(id)", HandlerBinding::callable(move |_| {
                *override_hit.borrow_mut() = "override".to_string();
            }))
            .declare("edit", noop());

        let table = build(StateDeclarations::merge(base, overrides)).unwrap();
        assert_eq!(table.len(), 3);
        // the override's rule replaced the base declaration for "list"
        assert_eq!(
            table.get("list").unwrap().rule,
            ParamRule::Relevant(vec!["id".to_string()])
        );
        assert!(table.contains("view"));
        assert!(table.contains("edit"));

        let desc = StateDescriptor::new("list", StateParams::new());
        let params = StateParams::new();
        (*table.get("list").unwrap().handler)(&StateChange {
            params: &params,
            current: &desc,
            previous: None,
        });
        assert_eq!(*hit.borrow(), "override");
    }

    #[test]
    fn default_state_must_exist_in_table() {
        let table = build(StateDeclarations::new().declare("home", noop())).unwrap();

        let default = DefaultState::new("home", &table).unwrap();
        assert_eq!(default.name, "home");
        assert!(default.params.is_empty());

        assert_eq!(
            DefaultState::new("missing", &table),
            Err(TableError::UnknownDefaultState {
                name: "missing".to_string()
            })
        );
        assert_eq!(
            DefaultState::new("", &table),
            Err(TableError::EmptyDefaultState)
        );
    }
}
