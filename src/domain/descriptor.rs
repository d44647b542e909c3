//! State descriptors and the shared handle passed through a delegation
//!
//! A descriptor names one state of the application: the full dotted path
//! from the tree root, a parameter mapping, and a segment cursor marking
//! which controller in the chain currently owns the descriptor. One mutable
//! descriptor object is shared by an entire delegation chain; each node
//! keeps independent snapshot copies as its own current/previous state.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::domain::name::{join_segments, split_full_name};

/// Parameter mapping carried by a state descriptor
///
/// Keys are unique; values are opaque to the engine. A `BTreeMap` keeps
/// iteration deterministic for URL generation and diagnostics.
pub type StateParams = BTreeMap<String, String>;

/// One state of the application: dotted path, params, and a segment cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDescriptor {
    /// Local segments of the full name, root first
    segments: Vec<String>,
    /// Index of the segment currently owned during delegation
    cursor: usize,
    /// Parameter mapping (keys unique, values opaque)
    params: StateParams,
}

impl StateDescriptor {
    /// Creates a descriptor from a (possibly dotted) name and params
    ///
    /// The cursor starts at the first segment.
    pub fn new(name: &str, params: StateParams) -> Self {
        Self {
            segments: split_full_name(name),
            cursor: 0,
            params,
        }
    }

    /// Local name at the cursor, or `""` when the cursor is exhausted
    pub fn name(&self) -> &str {
        self.segments
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Full dot-joined path from the tree root
    pub fn full_name(&self) -> String {
        join_segments(&self.segments)
    }

    /// Rewrites the full name, keeping the cursor position (clamped)
    ///
    /// Used by the reconciliation step: a descendant's default-state
    /// substitution may refine the canonical path after an ancestor has
    /// already committed its copy.
    pub fn set_full_name(&mut self, full_name: &str) {
        self.segments = split_full_name(full_name);
        self.cursor = self.cursor.min(self.segments.len());
    }

    pub fn params(&self) -> &StateParams {
        &self.params
    }

    /// Merges `other` into the params; existing keys are overwritten
    pub fn merge_params(&mut self, other: &StateParams) {
        for (key, value) in other {
            self.params.insert(key.clone(), value.clone());
        }
    }

    /// Fills params from `other` without overwriting existing keys
    pub fn fill_params(&mut self, other: &StateParams) {
        for (key, value) in other {
            self.params
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Appends a new final segment to the full name
    pub fn append_segment(&mut self, segment: &str) {
        self.segments.push(segment.to_string());
    }

    /// Segment index the cursor currently points at
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Segment at an absolute index, independent of the cursor
    pub fn segment_at(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// Advances the cursor by one segment (saturating at the end)
    pub fn advance_cursor(&mut self) {
        self.cursor = (self.cursor + 1).min(self.segments.len());
    }

    /// Moves the cursor back to the first segment
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Seeks the cursor to the first segment equal to `local_name`
    ///
    /// # Returns
    /// true if the segment was found and the cursor moved, false otherwise
    pub fn seek_to(&mut self, local_name: &str) -> bool {
        match self.segments.iter().position(|s| s == local_name) {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    /// Equality restricted to the cursor name and the given parameter keys
    ///
    /// An empty key list is a deliberate "don't care about params"
    /// declaration: only the local names are compared.
    pub fn is_equal(&self, other: &StateDescriptor, relevant_keys: &[String]) -> bool {
        if self.name() != other.name() {
            return false;
        }
        relevant_keys
            .iter()
            .all(|key| self.params.get(key) == other.params.get(key))
    }
}

/// Shared handle to the one descriptor a delegation chain mutates
///
/// Cloning the handle clones the `Rc`, not the descriptor; `ptr_eq` is the
/// "same object the authority considers current" identity test. Use
/// [`SharedDescriptor::snapshot`] for the independent copies a controller
/// stores as its own current/previous state.
#[derive(Debug, Clone)]
pub struct SharedDescriptor(Rc<RefCell<StateDescriptor>>);

impl SharedDescriptor {
    pub fn new(descriptor: StateDescriptor) -> Self {
        Self(Rc::new(RefCell::new(descriptor)))
    }

    /// Independent copy, never aliased with the shared object
    pub fn snapshot(&self) -> StateDescriptor {
        self.0.borrow().clone()
    }

    /// Object identity: do both handles point at the same descriptor?
    pub fn ptr_eq(&self, other: &SharedDescriptor) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> String {
        self.0.borrow().name().to_string()
    }

    pub fn full_name(&self) -> String {
        self.0.borrow().full_name()
    }

    pub fn set_full_name(&self, full_name: &str) {
        self.0.borrow_mut().set_full_name(full_name);
    }

    pub fn params(&self) -> StateParams {
        self.0.borrow().params().clone()
    }

    pub fn merge_params(&self, other: &StateParams) {
        self.0.borrow_mut().merge_params(other);
    }

    pub fn fill_params(&self, other: &StateParams) {
        self.0.borrow_mut().fill_params(other);
    }

    pub fn append_segment(&self, segment: &str) {
        self.0.borrow_mut().append_segment(segment);
    }

    pub fn cursor(&self) -> usize {
        self.0.borrow().cursor()
    }

    pub fn segment_at(&self, index: usize) -> Option<String> {
        self.0.borrow().segment_at(index).map(str::to_string)
    }

    pub fn advance_cursor(&self) {
        self.0.borrow_mut().advance_cursor();
    }

    pub fn rewind(&self) {
        self.0.borrow_mut().rewind();
    }

    pub fn seek_to(&self, local_name: &str) -> bool {
        self.0.borrow_mut().seek_to(local_name)
    }

    pub fn is_equal(&self, other: &StateDescriptor, relevant_keys: &[String]) -> bool {
        self.0.borrow().is_equal(other, relevant_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> StateParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn cursor_walks_segments_and_exhausts() {
        let mut desc = StateDescriptor::new("app.list.item", StateParams::new());
        assert_eq!(desc.name(), "app");
        desc.advance_cursor();
        assert_eq!(desc.name(), "list");
        desc.advance_cursor();
        desc.advance_cursor();
        assert_eq!(desc.name(), "");
        // advancing past the end stays exhausted
        desc.advance_cursor();
        assert_eq!(desc.name(), "");
        assert_eq!(desc.full_name(), "app.list.item");
    }

    #[test]
    fn seek_positions_cursor_at_named_segment() {
        let mut desc = StateDescriptor::new("app.list.item", StateParams::new());
        assert!(desc.seek_to("list"));
        assert_eq!(desc.name(), "list");
        assert!(!desc.seek_to("missing"));
        assert_eq!(desc.name(), "list");
    }

    #[test]
    fn set_full_name_keeps_cursor_position() {
        let mut desc = StateDescriptor::new("app.list", StateParams::new());
        desc.advance_cursor();
        desc.set_full_name("app.list.active");
        assert_eq!(desc.name(), "list");
        assert_eq!(desc.full_name(), "app.list.active");
    }

    #[test]
    fn set_full_name_clamps_exhausted_cursor() {
        let mut desc = StateDescriptor::new("app.list", StateParams::new());
        desc.advance_cursor();
        desc.advance_cursor();
        desc.set_full_name("app");
        assert_eq!(desc.cursor(), 1);
        assert_eq!(desc.name(), "");
    }

    #[test]
    fn append_segment_extends_path_at_exhausted_cursor() {
        let mut desc = StateDescriptor::new("app", StateParams::new());
        desc.advance_cursor();
        assert_eq!(desc.name(), "");
        desc.append_segment("home");
        assert_eq!(desc.name(), "home");
        assert_eq!(desc.full_name(), "app.home");
    }

    #[test]
    fn fill_does_not_overwrite_merge_does() {
        let mut desc = StateDescriptor::new("a", params(&[("id", "1")]));
        desc.fill_params(&params(&[("id", "2"), ("tab", "x")]));
        assert_eq!(desc.params().get("id").map(String::as_str), Some("1"));
        assert_eq!(desc.params().get("tab").map(String::as_str), Some("x"));

        desc.merge_params(&params(&[("id", "2")]));
        assert_eq!(desc.params().get("id").map(String::as_str), Some("2"));
    }

    #[test]
    fn equality_is_scoped_to_relevant_keys() {
        let a = StateDescriptor::new("edit", params(&[("id", "1"), ("tab", "x")]));
        let b = StateDescriptor::new("edit", params(&[("id", "1"), ("tab", "y")]));

        // name-only comparison ignores every param
        assert!(a.is_equal(&b, &[]));
        // restricted to a key that matches
        assert!(a.is_equal(&b, &["id".to_string()]));
        // restricted to a key that differs
        assert!(!a.is_equal(&b, &["tab".to_string()]));

        let c = StateDescriptor::new("view", params(&[("id", "1")]));
        assert!(!a.is_equal(&c, &[]));
    }

    #[test]
    fn snapshot_is_independent_of_shared_object() {
        let shared = SharedDescriptor::new(StateDescriptor::new("app.list", StateParams::new()));
        let copy = shared.snapshot();
        shared.append_segment("active");
        assert_eq!(copy.full_name(), "app.list");
        assert_eq!(shared.full_name(), "app.list.active");
    }

    #[test]
    fn handle_clones_share_identity() {
        let shared = SharedDescriptor::new(StateDescriptor::new("app", StateParams::new()));
        let other = shared.clone();
        assert!(shared.ptr_eq(&other));
        let unrelated = SharedDescriptor::new(StateDescriptor::new("app", StateParams::new()));
        assert!(!shared.ptr_eq(&unrelated));
    }
}
