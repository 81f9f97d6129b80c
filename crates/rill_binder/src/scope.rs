//! The lexical scope chain and its four namespaces.
//!
//! Plain symbols, record declarations and type names are first-hit
//! lookups walking outward. Methods are different: overload candidates
//! accumulate across every enclosing scope and the binder resolves
//! ambiguity, so `get_methods` returns all matches in the chain.

use crate::symbol::{Symbol, SymbolId};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use rill_types::TypeRef;
use std::rc::Rc;

#[derive(Default)]
struct Scope {
    symbols: FxHashMap<String, Rc<Symbol>>,
    records: FxHashMap<String, Rc<Symbol>>,
    types: FxHashMap<String, TypeRef>,
    /// Method tables keyed by declared receiver type. Receiver types are
    /// compared structurally and there are few per scope, so a vector
    /// scan beats hashing types. Insertion order is user-visible in
    /// overload ambiguity listings.
    methods: Vec<(TypeRef, IndexMap<String, Rc<Symbol>>)>,
}

pub struct SymbolTable {
    scopes: Vec<Scope>,
    next_id: SymbolId,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            next_id: 0,
        }
    }

    pub fn fresh_id(&mut self) -> SymbolId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    fn current(&mut self) -> &mut Scope {
        self.scopes.last_mut().unwrap()
    }

    // ------------------------------------------------------------------
    // Declarations: duplicates are only checked in the current scope,
    // shadowing an outer scope is legal and silent.
    // ------------------------------------------------------------------

    pub fn has_symbol(&self, name: &str) -> bool {
        self.scopes.last().unwrap().symbols.contains_key(name)
    }

    pub fn put_symbol(&mut self, symbol: Rc<Symbol>) {
        let previous = self.current().symbols.insert(symbol.name.clone(), symbol);
        debug_assert!(previous.is_none(), "duplicate symbol in scope");
    }

    pub fn get_symbol(&self, name: &str) -> Option<Rc<Symbol>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name).cloned())
    }

    pub fn has_record(&self, name: &str) -> bool {
        self.scopes.last().unwrap().records.contains_key(name)
    }

    pub fn put_record(&mut self, symbol: Rc<Symbol>) {
        self.current().records.insert(symbol.name.clone(), symbol);
    }

    pub fn get_record(&self, name: &str) -> Option<Rc<Symbol>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.records.get(name).cloned())
    }

    pub fn put_type(&mut self, name: impl Into<String>, ty: TypeRef) {
        self.current().types.insert(name.into(), ty);
    }

    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(name).cloned())
    }

    /// Whether the current scope already declares `name` on exactly this
    /// receiver type.
    pub fn has_method(&self, receiver: &TypeRef, name: &str) -> bool {
        self.scopes
            .last()
            .unwrap()
            .methods
            .iter()
            .any(|(declared, table)| **declared == **receiver && table.contains_key(name))
    }

    pub fn put_method(&mut self, receiver: TypeRef, symbol: Rc<Symbol>) {
        let scope = self.current();
        if let Some((_, table)) = scope.methods.iter_mut().find(|(d, _)| **d == *receiver) {
            table.insert(symbol.name.clone(), symbol);
            return;
        }
        let mut table = IndexMap::new();
        table.insert(symbol.name.clone(), symbol);
        scope.methods.push((receiver, table));
    }

    /// All method candidates named `name` visible on a value of type
    /// `receiver`, from every enclosing scope. Each entry pairs the
    /// declared receiver type with the method symbol; the caller
    /// disambiguates.
    pub fn get_methods(&self, receiver: &TypeRef, name: &str) -> Vec<(TypeRef, Rc<Symbol>)> {
        let mut candidates = Vec::new();
        for scope in self.scopes.iter().rev() {
            for (declared, table) in &scope.methods {
                if receiver.assignable_to(declared) {
                    if let Some(symbol) = table.get(name) {
                        candidates.push((declared.clone(), symbol.clone()));
                    }
                }
            }
        }
        candidates
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;
    use rill_types::TypeStore;

    fn variable(table: &mut SymbolTable, store: &TypeStore, name: &str) -> Rc<Symbol> {
        let id = table.fresh_id();
        Symbol::new(
            id,
            name,
            store.int.clone(),
            SymbolKind::Variable { read_only: false },
        )
    }

    #[test]
    fn shadowing_is_silent_and_lookup_walks_outward() {
        let store = TypeStore::new();
        let mut table = SymbolTable::new();
        let outer = variable(&mut table, &store, "x");
        table.put_symbol(outer.clone());
        table.push_scope();
        assert!(!table.has_symbol("x"));
        assert_eq!(table.get_symbol("x").unwrap().id, outer.id);
        let inner = variable(&mut table, &store, "x");
        table.put_symbol(inner.clone());
        assert_eq!(table.get_symbol("x").unwrap().id, inner.id);
        table.pop_scope();
        assert_eq!(table.get_symbol("x").unwrap().id, outer.id);
    }

    #[test]
    fn method_candidates_accumulate_across_scopes() {
        let store = TypeStore::new();
        let mut table = SymbolTable::new();
        let fn_ty = store.function_of(vec![], store.int.clone());
        let id = table.fresh_id();
        let on_any = Symbol::method(id, "m", store.any.clone(), fn_ty.clone());
        table.put_method(store.any.clone(), on_any);
        table.push_scope();
        let id = table.fresh_id();
        let on_int = Symbol::method(id, "m", store.int.clone(), fn_ty);
        table.put_method(store.int.clone(), on_int);

        // An Int receiver sees both; candidates are not shadowed.
        let candidates = table.get_methods(&store.int, "m");
        assert_eq!(candidates.len(), 2);
        // An Any receiver is not assignable to the Int entry.
        let candidates = table.get_methods(&store.any, "m");
        assert_eq!(candidates.len(), 1);
    }
}
