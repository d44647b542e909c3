//! Name resolution: raw requests to fully-qualified descriptors
//!
//! A raw request is absolute (`/` prefix), relative (`../` prefix, handed
//! to the parent), or local. Local resolution reconstructs the full path
//! from whatever is "live" above this controller: each ancestor that holds
//! a current state contributes its local name as a prefix and fills in the
//! parameters the request did not supply. Explicit caller params always
//! win over inherited and default ones.

use thiserror::Error;

use crate::app::controller::Controller;
use crate::domain::descriptor::StateParams;
use crate::domain::name::{PARENT_MARKER, ROOT_MARKER, SEPARATOR};

/// Result of resolving a raw state request
///
/// `local_name` is present only when the result names a state local to
/// the resolving controller; absolute and relative results have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedState {
    pub local_name: Option<String>,
    pub full_name: String,
    pub params: StateParams,
}

/// Fatal resolution failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A `../` request reached a controller with no parent. There is no
    /// safe fallback position for the remainder.
    #[error("controller '{controller}' cannot resolve relative state '{name}': no parent")]
    InvalidRelativeState { controller: String, name: String },
}

impl Controller {
    /// Turns a raw request into a full dotted name plus merged params
    ///
    /// # Arguments
    /// * `raw_name` - Absolute (`/a.b`), relative (`../x`), or local name;
    ///   may be empty to target this controller's default state
    /// * `explicit_params` - Caller-supplied params; highest precedence
    pub fn resolve(
        &self,
        raw_name: &str,
        explicit_params: &StateParams,
    ) -> Result<ResolvedState, ResolveError> {
        // absolute: strip the marker, no inheritance, no local name
        if let Some(rest) = raw_name.strip_prefix(ROOT_MARKER) {
            return Ok(ResolvedState {
                local_name: None,
                full_name: rest.to_string(),
                params: explicit_params.clone(),
            });
        }

        // relative: the parent resolves the remainder; the result is not
        // local to this controller, so its local name is stripped
        if let Some(rest) = raw_name.strip_prefix(PARENT_MARKER) {
            let Some(parent) = self.parent() else {
                return Err(ResolveError::InvalidRelativeState {
                    controller: self.label().to_string(),
                    name: raw_name.to_string(),
                });
            };
            let mut resolved = parent.resolve(rest, explicit_params)?;
            resolved.local_name = None;
            return Ok(resolved);
        }

        self.resolve_local(raw_name, explicit_params)
    }

    fn resolve_local(
        &self,
        raw_name: &str,
        explicit_params: &StateParams,
    ) -> Result<ResolvedState, ResolveError> {
        let mut params = match self.current_state() {
            Some(current) => current.params().clone(),
            None => StateParams::new(),
        };
        for (key, value) in explicit_params {
            params.insert(key.clone(), value.clone());
        }

        let mut local_name = raw_name.to_string();
        let mut full_name = raw_name.to_string();

        // walk upward: every live ancestor prefixes its local name and
        // fills params; stop at the first ancestor without a current state
        let mut node = self.parent();
        while let Some(ancestor) = node {
            let Some(current) = ancestor.current_state() else {
                break;
            };
            full_name = if full_name.is_empty() {
                current.name().to_string()
            } else {
                format!("{}{}{}", current.name(), SEPARATOR, full_name)
            };
            for (key, value) in current.params() {
                params.entry(key.clone()).or_insert_with(|| value.clone());
            }
            node = ancestor.parent();
        }

        // default substitution for an empty local name
        if local_name.is_empty() {
            if let Some(default) = self.default_state() {
                local_name = default.name.clone();
                full_name = if full_name.is_empty() {
                    default.name.clone()
                } else {
                    format!("{full_name}{SEPARATOR}{}", default.name)
                };
                for (key, value) in &default.params {
                    params.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }

        Ok(ResolvedState {
            local_name: (!local_name.is_empty()).then_some(local_name),
            full_name,
            params,
        })
    }
}
