//! The type variants, assignability and castability.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type TypeRef = Rc<Type>;

/// A nominal record type: identity is the name, the fields are carried
/// for member lookup and construction checking. Field order is the
/// declaration order. Fields sit behind a RefCell because the type is
/// registered before its fields bind, so a field may name the record
/// itself.
#[derive(Debug, Clone)]
pub struct RecordType {
    pub name: String,
    pub fields: RefCell<IndexMap<String, TypeRef>>,
}

#[derive(Debug, Clone)]
pub enum Type {
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Char,
    Unit,
    Any,
    /// Bottom type of expressions that never produce a value.
    Nothing,
    None,
    /// Sentinel for failed binding, assignable to and from everything.
    Error,
    List(TypeRef),
    Set(TypeRef),
    Map(TypeRef, TypeRef),
    Tuple(Vec<TypeRef>),
    Function(Vec<TypeRef>, TypeRef),
    Record(RecordType),
    Union(Vec<TypeRef>),
}

impl PartialEq for Type {
    fn eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int)
            | (Type::Long, Type::Long)
            | (Type::Float, Type::Float)
            | (Type::Double, Type::Double)
            | (Type::Boolean, Type::Boolean)
            | (Type::String, Type::String)
            | (Type::Char, Type::Char)
            | (Type::Unit, Type::Unit)
            | (Type::Any, Type::Any)
            | (Type::Nothing, Type::Nothing)
            | (Type::None, Type::None)
            | (Type::Error, Type::Error) => true,
            (Type::List(a), Type::List(b)) | (Type::Set(a), Type::Set(b)) => a == b,
            (Type::Map(ka, va), Type::Map(kb, vb)) => ka == kb && va == vb,
            (Type::Tuple(a), Type::Tuple(b)) => a == b,
            (Type::Function(pa, ra), Type::Function(pb, rb)) => pa == pb && ra == rb,
            (Type::Record(a), Type::Record(b)) => a.name == b.name,
            (Type::Union(a), Type::Union(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Type {
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Type::Nothing)
    }

    /// Whether a value of this type may be `none`.
    pub fn is_noneable(&self) -> bool {
        match self {
            Type::None => true,
            Type::Union(members) => members.iter().any(|m| m.is_noneable()),
            _ => false,
        }
    }

    /// One-directional "can a value of this type be used where `target`
    /// is expected". Not symmetric. Dispatches on the source variant:
    /// a union source must satisfy the target with every member, while a
    /// union target is satisfied by any single matching member.
    pub fn assignable_to(&self, target: &Type) -> bool {
        match self {
            Type::Union(members) => {
                target.is_error() || members.iter().all(|m| m.assignable_to(target))
            }
            Type::Int
            | Type::Long
            | Type::Float
            | Type::Double
            | Type::Boolean
            | Type::String
            | Type::Char
            | Type::Unit
            | Type::Any
            | Type::Nothing
            | Type::Error => {
                if let Type::Union(targets) = target {
                    return targets.iter().any(|t| self.assignable_to(t));
                }
                if matches!(self, Type::Nothing | Type::Error) {
                    return true;
                }
                matches!(target, Type::Error | Type::Any) || self == target
            }
            Type::List(elem) => match target {
                Type::Union(targets) => targets.iter().any(|t| self.assignable_to(t)),
                Type::List(target_elem) => elem.assignable_to(target_elem),
                _ => matches!(target, Type::Error | Type::Any),
            },
            Type::Set(elem) => match target {
                Type::Union(targets) => targets.iter().any(|t| self.assignable_to(t)),
                Type::Set(target_elem) => elem.assignable_to(target_elem),
                _ => matches!(target, Type::Error | Type::Any),
            },
            Type::Map(key, value) => match target {
                Type::Union(targets) => targets.iter().any(|t| self.assignable_to(t)),
                Type::Map(target_key, target_value) => {
                    key.assignable_to(target_key) && value.assignable_to(target_value)
                }
                _ => matches!(target, Type::Error | Type::Any),
            },
            Type::Tuple(members) => match target {
                Type::Union(targets) => targets.iter().any(|t| self.assignable_to(t)),
                Type::Tuple(target_members) => {
                    members.len() == target_members.len()
                        && members
                            .iter()
                            .zip(target_members)
                            .all(|(m, t)| m.assignable_to(t))
                }
                _ => matches!(target, Type::Error | Type::Any),
            },
            Type::Function(params, ret) => match target {
                Type::Union(targets) => targets.iter().any(|t| self.assignable_to(t)),
                // Parameters are deliberately covariant, like the return.
                Type::Function(target_params, target_ret) => {
                    params.len() == target_params.len()
                        && params
                            .iter()
                            .zip(target_params)
                            .all(|(p, t)| p.assignable_to(t))
                        && ret.assignable_to(target_ret)
                }
                _ => matches!(target, Type::Error | Type::Any),
            },
            Type::Record(record) => match target {
                Type::Union(targets) => targets.iter().any(|t| self.assignable_to(t)),
                Type::Record(target_record) => record.name == target_record.name,
                _ => matches!(target, Type::Error | Type::Any),
            },
            Type::None => match target {
                Type::Union(targets) => targets.iter().any(|t| self.assignable_to(t)),
                Type::Error | Type::None => true,
                _ => false,
            },
        }
    }

    /// The looser relation behind `as`: false only when a cast can never
    /// succeed. Permissive on purpose; a cast this reports impossible must
    /// truly be impossible.
    pub fn castable_to(&self, target: &Type) -> bool {
        if matches!(self, Type::Error | Type::Any | Type::Nothing)
            || matches!(target, Type::Error | Type::Any | Type::Nothing)
        {
            return true;
        }
        if self.assignable_to(target) || target.assignable_to(self) {
            return true;
        }
        if self.is_numeric() && target.is_numeric() {
            return true;
        }
        if let Type::Union(members) = self {
            return members.iter().any(|m| m.castable_to(target));
        }
        if let Type::Union(targets) = target {
            return targets.iter().any(|t| self.castable_to(t));
        }
        false
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Long | Type::Float | Type::Double)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("Int"),
            Type::Long => f.write_str("Long"),
            Type::Float => f.write_str("Float"),
            Type::Double => f.write_str("Double"),
            Type::Boolean => f.write_str("Boolean"),
            Type::String => f.write_str("String"),
            Type::Char => f.write_str("Char"),
            Type::Unit => f.write_str("Unit"),
            Type::Any => f.write_str("Any"),
            Type::Nothing => f.write_str("Nothing"),
            Type::None => f.write_str("None"),
            Type::Error => f.write_str("???"),
            Type::List(elem) => {
                if matches!(**elem, Type::Function(_, _)) {
                    write!(f, "({})[]", elem)
                } else {
                    write!(f, "{}[]", elem)
                }
            }
            Type::Set(elem) => {
                if matches!(**elem, Type::Function(_, _)) {
                    write!(f, "({}){{}}", elem)
                } else {
                    write!(f, "{}{{}}", elem)
                }
            }
            Type::Map(key, value) => write!(f, "{}{{{}}}", key, value),
            Type::Tuple(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                f.write_str(")")
            }
            Type::Function(params, ret) => {
                f.write_str("(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Record(record) => f.write_str(&record.name),
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStore;

    #[test]
    fn union_target_accepts_any_member() {
        let store = TypeStore::new();
        assert!(store.int.assignable_to(&store.any_none));
        assert!(store.none.assignable_to(&store.any_none));
    }

    #[test]
    fn union_source_requires_all_members() {
        let store = TypeStore::new();
        let int_or_none = store.union_of(vec![store.int.clone(), store.none.clone()]);
        // Int | None is not assignable to Int: None is not.
        assert!(!int_or_none.assignable_to(&store.int));
        assert!(int_or_none.assignable_to(&store.any_none));
    }

    #[test]
    fn sentinels_absorb() {
        let store = TypeStore::new();
        assert!(store.error.assignable_to(&store.int));
        assert!(store.int.assignable_to(&store.error));
        assert!(store.nothing.assignable_to(&store.string));
        assert!(!store.string.assignable_to(&store.nothing));
        assert!(store.string.assignable_to(&store.any));
    }

    #[test]
    fn list_is_covariant() {
        let store = TypeStore::new();
        let ints = store.list_of(&store.int);
        let anys = store.list_of(&store.any);
        assert!(ints.assignable_to(&anys));
        assert!(!anys.assignable_to(&ints));
        assert!(!ints.assignable_to(&store.set_of(&store.int)));
    }

    #[test]
    fn tuple_requires_equal_arity() {
        let store = TypeStore::new();
        let pair = store.tuple_of(vec![store.int.clone(), store.string.clone()]);
        let wide = store.tuple_of(vec![store.any.clone(), store.any.clone()]);
        let triple = store.tuple_of(vec![
            store.int.clone(),
            store.string.clone(),
            store.int.clone(),
        ]);
        assert!(pair.assignable_to(&wide));
        assert!(!pair.assignable_to(&triple));
    }

    #[test]
    fn function_params_are_covariant() {
        let store = TypeStore::new();
        let takes_int = store.function_of(vec![store.int.clone()], store.unit.clone());
        let takes_any = store.function_of(vec![store.any.clone()], store.unit.clone());
        // Deliberate simplification: (Int) -> Unit counts as (Any) -> Unit.
        assert!(takes_int.assignable_to(&takes_any));
        assert!(!takes_any.assignable_to(&takes_int));
    }

    #[test]
    fn records_are_nominal() {
        let store = TypeStore::new();
        let a = store.record_of("P", vec![("x".to_string(), store.int.clone())]);
        let b = store.record_of("P", vec![("y".to_string(), store.string.clone())]);
        let c = store.record_of("Q", vec![("x".to_string(), store.int.clone())]);
        assert!(a.assignable_to(&b));
        assert!(!a.assignable_to(&c));
    }

    #[test]
    fn none_only_matches_none_or_unions() {
        let store = TypeStore::new();
        assert!(store.none.assignable_to(&store.none));
        assert!(!store.none.assignable_to(&store.any));
        assert!(store.none.assignable_to(&store.any_none));
    }

    #[test]
    fn castability_is_permissive() {
        let store = TypeStore::new();
        assert!(store.int.castable_to(&store.double));
        assert!(store.any.castable_to(&store.int));
        assert!(store
            .union_of(vec![store.int.clone(), store.none.clone()])
            .castable_to(&store.int));
        // Structurally disjoint pairs are truly impossible.
        assert!(!store.int.castable_to(&store.string));
        assert!(!store.list_of(&store.int).castable_to(&store.string));
    }

    #[test]
    fn display_names() {
        let store = TypeStore::new();
        assert_eq!(store.list_of(&store.int).to_string(), "Int[]");
        assert_eq!(store.set_of(&store.string).to_string(), "String{}");
        assert_eq!(
            store
                .map_of(store.string.clone(), store.int.clone())
                .to_string(),
            "String{Int}"
        );
        assert_eq!(
            store
                .function_of(vec![store.int.clone()], store.unit.clone())
                .to_string(),
            "(Int) -> Unit"
        );
        assert_eq!(store.any_none.to_string(), "Any | None");
        assert_eq!(store.error.to_string(), "???");
    }
}
