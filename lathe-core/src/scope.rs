//! Lexical scopes of procedure-local names.
//!
//! Passes that treat top-level procedure names specially need to know when a
//! formal argument or a local bind shadows one. The stack holds one frame per
//! enclosing procedure or lambda on top of a global frame that is never popped
//! and never receives bindings.

use crate::ast::{Name, Tuple};
use crate::types::Type;
use indexmap::IndexMap;

/// Names bound by one procedure or lambda, with their source types.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: IndexMap<String, Type>,
}

impl Scope {
    pub fn get(&self, id: &str) -> Option<&Type> {
        self.bindings.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }

    /// Bound names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![Scope::default()],
        }
    }

    /// Open a frame for a procedure or lambda and bind its formal arguments.
    /// Arguments that are not plain names bind nothing.
    pub fn enter_frame(&mut self, params: &Tuple) {
        self.scopes.push(Scope::default());
        for param in params.iter().filter_map(|p| p.as_name()) {
            self.bind(param);
        }
    }

    /// Close the innermost frame. The global frame stays.
    pub fn exit_frame(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 { self.scopes.pop() } else { None }
    }

    /// Bind `name` in the innermost frame. Outside any procedure this is a
    /// no-op: top-level binds never shadow procedure names.
    pub fn bind(&mut self, name: &Name) {
        if self.depth() == 0 {
            return;
        }
        if let Some(current) = self.scopes.last_mut() {
            current.bindings.insert(name.id.clone(), name.ty.clone());
        }
    }

    /// Source type of the innermost local named `id`.
    pub fn type_of(&self, id: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(id))
    }

    pub fn is_local(&self, id: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(id))
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }
}
