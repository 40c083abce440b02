//! Scope chain implementation
//!
//! This module provides the name environments the evaluator runs in:
//! - [`ScopeArena`]: every live scope, pushed and popped in LIFO order
//! - [`Scope`]: one environment's bindings plus a handle to its parent
//! - [`ScopeId`]: a non-owning handle to a scope in the arena
//!
//! # Ownership
//!
//! The arena owns every scope. A scope refers to its parent only through a
//! [`ScopeId`], and a parent never refers to its children. Block statements and
//! function calls nest dynamically, so the arena behaves like a call stack:
//! a new scope is always pushed on top and the top scope is always the next to
//! go. Function-call scopes are parented at the global scope, not at the
//! scope below them in the arena.
//!
//! Every scope gets a fresh serial number. A handle keeps the serial it was
//! created with, so a handle that outlives its scope is detected instead of
//! silently aliasing whatever scope later reuses the same slot.

use rustc_hash::FxHashMap;

use super::value::Value;
use crate::interpreter::errors::RuntimeError;

/// Handle to a scope in a [`ScopeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: usize,
    serial: u64,
}

impl ScopeId {
    /// Creation order of the scope; later scopes have larger serials
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

/// A single name environment
#[derive(Debug, Clone)]
pub struct Scope {
    serial: u64,
    parent: Option<ScopeId>,
    bindings: FxHashMap<String, Value>,
}

impl Scope {
    fn new(serial: u64, parent: Option<ScopeId>) -> Self {
        Scope {
            serial,
            parent,
            bindings: FxHashMap::default(),
        }
    }

    /// Binding declared directly in this scope
    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

/// All live scopes, global first
#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    next_serial: u64,
}

impl ScopeArena {
    /// Create an arena holding only the global scope
    pub fn new() -> Self {
        ScopeArena {
            scopes: vec![Scope::new(0, None)],
            next_serial: 1,
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId {
            index: 0,
            serial: 0,
        }
    }

    /// Serial the next pushed scope will receive
    pub fn next_serial(&self) -> u64 {
        self.next_serial
    }

    /// Push a new, empty scope enclosed by `parent`
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId {
            index: self.scopes.len(),
            serial: self.next_serial,
        };
        self.next_serial += 1;
        self.scopes.push(Scope::new(id.serial, Some(parent)));
        id
    }

    /// Discard the top scope, which must be `id`
    pub fn pop(&mut self, id: ScopeId) {
        debug_assert!(id.index > 0, "the global scope is never popped");
        debug_assert_eq!(
            self.scopes.len(),
            id.index + 1,
            "scopes must be popped in LIFO order"
        );
        self.scopes.truncate(id.index);
    }

    /// Discard every scope except the global one
    pub fn truncate_to_global(&mut self) {
        self.scopes.truncate(1);
    }

    /// Whether `id` still refers to a live scope
    pub fn contains(&self, id: ScopeId) -> bool {
        self.scope(id).is_some()
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index).filter(|s| s.serial == id.serial)
    }

    fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope, RuntimeError> {
        self.scopes
            .get_mut(id.index)
            .filter(|s| s.serial == id.serial)
            .ok_or(RuntimeError::StaleScope { serial: id.serial })
    }

    fn live(&self, id: ScopeId) -> Result<&Scope, RuntimeError> {
        self.scope(id)
            .ok_or(RuntimeError::StaleScope { serial: id.serial })
    }

    /// Innermost scope, starting at `from` and walking to the root, that owns `name`
    pub fn get_scope(&self, from: ScopeId, name: &str) -> Result<Option<ScopeId>, RuntimeError> {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let scope = self.live(id)?;
            if scope.bindings.contains_key(name) {
                return Ok(Some(id));
            }
            cursor = scope.parent;
        }
        Ok(None)
    }

    /// Look `name` up starting at `from`
    pub fn get(&self, from: ScopeId, name: &str) -> Result<Value, RuntimeError> {
        let owner = self.owner(from, name)?;
        Ok(self.live(owner)?.bindings[name].clone())
    }

    /// Binding declared directly in `id`, without walking to the parents
    pub fn get_local(&self, id: ScopeId, name: &str) -> Result<Option<Value>, RuntimeError> {
        Ok(self.live(id)?.get_local(name).cloned())
    }

    /// Mutate the first scope from `from` up that owns `name`.
    /// Assignment never creates a binding.
    pub fn set(&mut self, from: ScopeId, name: &str, value: Value) -> Result<(), RuntimeError> {
        let owner = self.owner(from, name)?;
        if let Some(slot) = self.scope_mut(owner)?.bindings.get_mut(name) {
            *slot = value;
        }
        Ok(())
    }

    /// Bind `name` in `id` itself, shadowing any outer binding
    pub fn define(&mut self, id: ScopeId, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.scope_mut(id)?.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Bind `name` in the global scope, which always exists
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.scopes[0].bindings.insert(name.to_string(), value);
    }

    fn owner(&self, from: ScopeId, name: &str) -> Result<ScopeId, RuntimeError> {
        self.get_scope(from, name)?
            .ok_or_else(|| RuntimeError::UndefinedName {
                name: name.to_string(),
            })
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
