//! The runtime environment: a scope chain keyed by symbol id.
//!
//! The binder guarantees every name resolves, so a missing id here is a
//! defect in the toolchain, not a user error.

use crate::value::Value;
use rill_binder::SymbolId;
use rustc_hash::FxHashMap;

pub struct Environment {
    scopes: Vec<FxHashMap<SymbolId, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// An environment whose outermost scope is a capture snapshot.
    pub fn from_snapshot(snapshot: FxHashMap<SymbolId, Value>) -> Self {
        Self {
            scopes: vec![snapshot, FxHashMap::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    pub fn define(&mut self, id: SymbolId, value: Value) {
        self.scopes.last_mut().unwrap().insert(id, value);
    }

    pub fn assign(&mut self, id: SymbolId, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(&id) {
                *slot = value;
                return;
            }
        }
        unreachable!("assignment to undefined symbol {}", id);
    }

    pub fn get(&self, id: SymbolId) -> Value {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(&id) {
                return value.clone();
            }
        }
        unreachable!("read of undefined symbol {}", id);
    }

    /// Flatten every reachable binding into one map, inner scopes
    /// shadowing outer ones. This is what closures capture.
    pub fn snapshot(&self) -> FxHashMap<SymbolId, Value> {
        let mut flat = FxHashMap::default();
        for scope in &self.scopes {
            for (id, value) in scope {
                flat.insert(*id, value.clone());
            }
        }
        flat
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::equals;

    #[test]
    fn inner_scopes_shadow_and_pop_restores() {
        let mut env = Environment::new();
        env.define(1, Value::Int(1));
        env.push_scope();
        env.define(2, Value::Int(2));
        assert!(equals(&env.get(1), &Value::Int(1)));
        assert!(equals(&env.get(2), &Value::Int(2)));
        env.pop_scope();
        assert!(equals(&env.get(1), &Value::Int(1)));
    }

    #[test]
    fn snapshot_flattens_with_inner_priority() {
        let mut env = Environment::new();
        env.define(1, Value::Int(1));
        env.push_scope();
        env.define(1, Value::Int(10));
        env.define(2, Value::Int(2));
        let snapshot = env.snapshot();
        assert!(equals(&snapshot[&1], &Value::Int(10)));
        assert!(equals(&snapshot[&2], &Value::Int(2)));
    }
}
