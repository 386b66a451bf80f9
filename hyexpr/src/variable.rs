//! Named symbolic leaves and the registry that keeps their names unique.
//!
//! Role
//! - A [`Variable`] is a shared handle: cloning it yields the same variable, and a
//!   value bound through any handle is immediately visible to every expression
//!   that references it.
//! - Identity is a [`VariableId`]. Equality, hashing and ordering of variables
//!   only look at that id, so renaming or rebinding a variable never changes its
//!   membership in sets or maps.
//! - A [`VariableRegistry`] maps ids to names and rejects duplicate names. The
//!   entry of a variable is released once its last handle is dropped.
//!
//! Example
//! ```
//! use hyexpr::prelude::*;
//!
//! let registry = VariableRegistry::new();
//! let x = Variable::new_in(&registry, "x", None).unwrap();
//! assert!(Variable::new_in(&registry, "x", None).is_err());
//!
//! x.set_value(3);
//! assert_eq!(x.value(), Some(Value::Int(3)));
//! ```
use std::{collections::BTreeMap, hash::Hash, sync::Arc};

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ExprError, ExprResult},
    value::Value,
};

/// Stable identity of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariableId(Uuid);

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct Entries {
    names: BTreeMap<VariableId, String>,
    inverse_lookup: BTreeMap<String, VariableId>,
}

/// Bookkeeping of variable names, keyed by identity.
///
/// Registration and renaming perform their check-then-insert sequence under a
/// single write guard, so two concurrent registrations of the same name can
/// never both succeed.
///
/// Most code uses [`VariableRegistry::global`]; tests and embedders can create
/// isolated registries and pass them to [`Variable::new_in`].
#[derive(Default)]
pub struct VariableRegistry {
    entries: RwLock<Entries>,
}

static GLOBAL_REGISTRY: Lazy<Arc<VariableRegistry>> = Lazy::new(VariableRegistry::new);

impl VariableRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide registry used by [`Variable::new`].
    pub fn global() -> &'static Arc<VariableRegistry> {
        &GLOBAL_REGISTRY
    }

    /// Number of live variables.
    pub fn len(&self) -> usize {
        self.entries.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current name of the variable identified by `id`, if it is still registered.
    pub fn name_of(&self, id: VariableId) -> Option<String> {
        self.entries.read().names.get(&id).cloned()
    }

    /// Identity of the live variable currently named `name`.
    pub fn lookup(&self, name: &str) -> Option<VariableId> {
        self.entries.read().inverse_lookup.get(name).copied()
    }

    fn register(&self, name: String) -> ExprResult<VariableId> {
        let mut entries = self.entries.write();
        if entries.inverse_lookup.contains_key(&name) {
            return Err(ExprError::DuplicateName { name });
        }

        let id = VariableId(Uuid::new_v4());
        debug!("Registered variable `{}` with id {}.", name, id);
        entries.inverse_lookup.insert(name.clone(), id);
        entries.names.insert(id, name);
        Ok(id)
    }

    fn rename(&self, id: VariableId, name: String) -> ExprResult<()> {
        let mut entries = self.entries.write();
        match entries.inverse_lookup.get(&name) {
            Some(owner) if *owner == id => return Ok(()),
            Some(_) => return Err(ExprError::DuplicateName { name }),
            None => {}
        }

        if let Some(previous) = entries.names.insert(id, name.clone()) {
            entries.inverse_lookup.remove(&previous);
            debug!("Renamed variable `{}` to `{}` (id {}).", previous, name, id);
        }
        entries.inverse_lookup.insert(name, id);
        Ok(())
    }

    fn release(&self, id: VariableId) {
        let mut entries = self.entries.write();
        if let Some(name) = entries.names.remove(&id) {
            entries.inverse_lookup.remove(&name);
            debug!("Released variable `{}` (id {}).", name, id);
        }
    }
}

/// `None` stands for the absent value, so it never counts as a binding.
fn bound_value(value: Value) -> Option<Value> {
    (!value.is_none()).then_some(value)
}

struct VariableSlot {
    id: VariableId,
    registry: Arc<VariableRegistry>,
    value: RwLock<Option<Value>>,
}

impl Drop for VariableSlot {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// A named symbolic leaf with an optional bound value.
#[derive(Clone)]
pub struct Variable {
    slot: Arc<VariableSlot>,
}

impl Variable {
    /// Create a free variable in the global registry.
    pub fn new(name: impl Into<String>) -> ExprResult<Self> {
        Self::new_in(VariableRegistry::global(), name, None)
    }

    /// Create a variable bound to `value` in the global registry.
    pub fn bound(name: impl Into<String>, value: impl Into<Value>) -> ExprResult<Self> {
        Self::new_in(VariableRegistry::global(), name, Some(value.into()))
    }

    /// Create a variable in `registry`.
    ///
    /// Fails with [`ExprError::DuplicateName`] if a live variable of that
    /// registry already uses `name`.
    pub fn new_in(
        registry: &Arc<VariableRegistry>,
        name: impl Into<String>,
        value: Option<Value>,
    ) -> ExprResult<Self> {
        let id = registry.register(name.into())?;
        Ok(Self {
            slot: Arc::new(VariableSlot {
                id,
                registry: Arc::clone(registry),
                value: RwLock::new(value.and_then(bound_value)),
            }),
        })
    }

    pub fn id(&self) -> VariableId {
        self.slot.id
    }

    /// Registry this variable's name lives in.
    pub fn registry(&self) -> &Arc<VariableRegistry> {
        &self.slot.registry
    }

    pub fn name(&self) -> String {
        self.slot
            .registry
            .name_of(self.slot.id)
            .unwrap_or_else(|| format!("<unnamed {}>", self.slot.id))
    }

    /// Rename the variable. Renaming to its own current name is a no-op.
    pub fn rename(&self, name: impl Into<String>) -> ExprResult<()> {
        self.slot.registry.rename(self.slot.id, name.into())
    }

    /// Snapshot of the bound value.
    pub fn value(&self) -> Option<Value> {
        self.slot.value.read().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.slot.value.read().is_some()
    }

    /// Bind a value. Binding [`Value::None`] leaves the variable free.
    pub fn set_value(&self, value: impl Into<Value>) {
        *self.slot.value.write() = bound_value(value.into());
    }

    /// Make the variable free again.
    pub fn clear_value(&self) {
        *self.slot.value.write() = None;
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.slot.id == other.slot.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.slot.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.slot.id.cmp(&other.slot.id)
    }
}

impl std::fmt::Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variable")
            .field("id", &self.slot.id)
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
