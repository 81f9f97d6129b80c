//! Construction and caching of types.

use crate::ty::{RecordType, Type, TypeRef};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Owns the singleton primitive types and caches the list/set types built
/// over them, so `Int[]` is one shared allocation no matter how many
/// literals produce it.
pub struct TypeStore {
    pub int: TypeRef,
    pub long: TypeRef,
    pub float: TypeRef,
    pub double: TypeRef,
    pub boolean: TypeRef,
    pub string: TypeRef,
    pub char_type: TypeRef,
    pub unit: TypeRef,
    pub any: TypeRef,
    pub nothing: TypeRef,
    pub none: TypeRef,
    pub error: TypeRef,
    /// `Any | None`, the widest value type; used as inference fallback.
    pub any_none: TypeRef,
    list_cache: RefCell<FxHashMap<*const Type, TypeRef>>,
    set_cache: RefCell<FxHashMap<*const Type, TypeRef>>,
}

impl TypeStore {
    pub fn new() -> Self {
        let int = Rc::new(Type::Int);
        let long = Rc::new(Type::Long);
        let float = Rc::new(Type::Float);
        let double = Rc::new(Type::Double);
        let boolean = Rc::new(Type::Boolean);
        let string = Rc::new(Type::String);
        let char_ty = Rc::new(Type::Char);
        let unit = Rc::new(Type::Unit);
        let any = Rc::new(Type::Any);
        let nothing = Rc::new(Type::Nothing);
        let none = Rc::new(Type::None);
        let error = Rc::new(Type::Error);
        let any_none = Rc::new(Type::Union(vec![any.clone(), none.clone()]));
        Self {
            int,
            long,
            float,
            double,
            boolean,
            string,
            char_type: char_ty,
            unit,
            any,
            nothing,
            none,
            error,
            any_none,
            list_cache: RefCell::new(FxHashMap::default()),
            set_cache: RefCell::new(FxHashMap::default()),
        }
    }

    fn cached(
        cache: &RefCell<FxHashMap<*const Type, TypeRef>>,
        element: &TypeRef,
        build: impl FnOnce() -> TypeRef,
    ) -> TypeRef {
        let key = Rc::as_ptr(element);
        if let Some(ty) = cache.borrow().get(&key) {
            return ty.clone();
        }
        let ty = build();
        cache.borrow_mut().insert(key, ty.clone());
        ty
    }

    pub fn list_of(&self, element: &TypeRef) -> TypeRef {
        if self.is_primitive_singleton(element) {
            return Self::cached(&self.list_cache, element, || {
                Rc::new(Type::List(element.clone()))
            });
        }
        Rc::new(Type::List(element.clone()))
    }

    pub fn set_of(&self, element: &TypeRef) -> TypeRef {
        if self.is_primitive_singleton(element) {
            return Self::cached(&self.set_cache, element, || {
                Rc::new(Type::Set(element.clone()))
            });
        }
        Rc::new(Type::Set(element.clone()))
    }

    pub fn map_of(&self, key: TypeRef, value: TypeRef) -> TypeRef {
        Rc::new(Type::Map(key, value))
    }

    pub fn tuple_of(&self, members: Vec<TypeRef>) -> TypeRef {
        Rc::new(Type::Tuple(members))
    }

    pub fn function_of(&self, params: Vec<TypeRef>, ret: TypeRef) -> TypeRef {
        Rc::new(Type::Function(params, ret))
    }

    pub fn union_of(&self, members: Vec<TypeRef>) -> TypeRef {
        Rc::new(Type::Union(members))
    }

    pub fn record_of(&self, name: &str, fields: Vec<(String, TypeRef)>) -> TypeRef {
        Rc::new(Type::Record(RecordType {
            name: name.to_string(),
            fields: RefCell::new(fields.into_iter().collect::<IndexMap<_, _>>()),
        }))
    }

    /// `T | None`, collapsing when T already admits none.
    pub fn optional_of(&self, ty: TypeRef) -> TypeRef {
        if ty.is_noneable() {
            return ty;
        }
        self.union_of(vec![ty, self.none.clone()])
    }

    fn is_primitive_singleton(&self, ty: &TypeRef) -> bool {
        [
            &self.boolean,
            &self.nothing,
            &self.double,
            &self.string,
            &self.error,
            &self.float,
            &self.long,
            &self.unit,
            &self.any,
            &self.int,
        ]
        .iter()
        .any(|p| Rc::ptr_eq(p, ty))
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_collections_are_cached() {
        let store = TypeStore::new();
        let a = store.list_of(&store.int);
        let b = store.list_of(&store.int);
        assert!(Rc::ptr_eq(&a, &b));
        let s1 = store.set_of(&store.string);
        let s2 = store.set_of(&store.string);
        assert!(Rc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn composite_collections_are_not_cached() {
        let store = TypeStore::new();
        let elem = store.tuple_of(vec![store.int.clone()]);
        let a = store.list_of(&elem);
        let b = store.list_of(&elem);
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn optional_collapses_noneable() {
        let store = TypeStore::new();
        let opt = store.optional_of(store.int.clone());
        assert_eq!(opt.to_string(), "Int | None");
        let same = store.optional_of(opt.clone());
        assert!(Rc::ptr_eq(&opt, &same));
    }
}
