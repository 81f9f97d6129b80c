//! Runtime values.
//!
//! Composite values carry the static type of the expression that built
//! them, so `typeOf` and the runtime checks behind `as` and `add` work
//! without re-deriving types. Collections share their storage through Rc
//! with interior mutability: two bindings to the same list see each
//! other's writes.

use indexmap::IndexMap;
use rill_binder::{BoundStmt, Symbol, SymbolId};
use rill_types::{TypeRef, TypeStore};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(Rc<String>),
    Unit,
    None,
    List(Rc<ListValue>),
    Set(Rc<SetValue>),
    Map(Rc<MapValue>),
    Tuple(Rc<TupleValue>),
    Record(Rc<RecordValue>),
    Function(Rc<FunctionValue>),
    Builtin(Rc<BuiltinValue>),
    /// A method reference with its receiver already evaluated.
    Method(Rc<MethodValue>),
}

#[derive(Debug)]
pub struct ListValue {
    pub ty: TypeRef,
    pub elem: TypeRef,
    pub values: RefCell<Vec<Value>>,
}

/// Insertion-ordered and deduplicated by value equality.
#[derive(Debug)]
pub struct SetValue {
    pub ty: TypeRef,
    pub elem: TypeRef,
    pub values: RefCell<Vec<Value>>,
}

/// Insertion-ordered entries with linear lookup. Keys are compared by
/// value equality, so any value type can key a map.
#[derive(Debug)]
pub struct MapValue {
    pub ty: TypeRef,
    pub entries: RefCell<Vec<(Value, Value)>>,
}

#[derive(Debug)]
pub struct TupleValue {
    pub ty: TypeRef,
    pub values: Vec<Value>,
}

#[derive(Debug)]
pub struct RecordValue {
    pub ty: TypeRef,
    pub fields: RefCell<IndexMap<String, Value>>,
}

/// A user function or method. Captures are a flat snapshot of every
/// binding reachable at creation; a declared function backpatches its
/// own entry so it can recurse.
#[derive(Debug)]
pub struct FunctionValue {
    pub ty: TypeRef,
    /// The `self` symbol for methods.
    pub self_symbol: Option<Rc<Symbol>>,
    pub params: Vec<Rc<Symbol>>,
    pub body: Rc<Vec<BoundStmt>>,
    pub captures: RefCell<FxHashMap<SymbolId, Value>>,
}

#[derive(Debug)]
pub struct BuiltinValue {
    pub ty: TypeRef,
    pub function: BuiltinFn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFn {
    Println,
    Print,
    TypeOf,
    ToString,
    Add,
    Input,
    Time,
    Len,
    ParseInt,
    ParseLong,
    ParseFloat,
    ParseDouble,
}

#[derive(Debug)]
pub struct MethodValue {
    pub receiver: Value,
    pub target: Value,
}

impl Value {
    pub fn string(text: impl Into<String>) -> Value {
        Value::String(Rc::new(text.into()))
    }

    /// The runtime type of this value.
    pub fn type_of(&self, store: &TypeStore) -> TypeRef {
        match self {
            Value::Int(_) => store.int.clone(),
            Value::Long(_) => store.long.clone(),
            Value::Float(_) => store.float.clone(),
            Value::Double(_) => store.double.clone(),
            Value::Boolean(_) => store.boolean.clone(),
            Value::Char(_) => store.char_type.clone(),
            Value::String(_) => store.string.clone(),
            Value::Unit => store.unit.clone(),
            Value::None => store.none.clone(),
            Value::List(list) => list.ty.clone(),
            Value::Set(set) => set.ty.clone(),
            Value::Map(map) => map.ty.clone(),
            Value::Tuple(tuple) => tuple.ty.clone(),
            Value::Record(record) => record.ty.clone(),
            Value::Function(function) => function.ty.clone(),
            Value::Builtin(builtin) => builtin.ty.clone(),
            Value::Method(method) => method.target.type_of(store),
        }
    }

    pub fn as_boolean(&self) -> bool {
        match self {
            Value::Boolean(value) => *value,
            other => unreachable!("expected a boolean, got {:?}", other),
        }
    }
}

impl SetValue {
    /// Insert keeping set semantics; duplicates are dropped.
    pub fn insert(&self, value: Value) {
        let mut values = self.values.borrow_mut();
        if !values.iter().any(|existing| equals(existing, &value)) {
            values.push(value);
        }
    }
}

impl MapValue {
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries
            .borrow()
            .iter()
            .find(|(existing, _)| equals(existing, key))
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: Value, value: Value) {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|(existing, _)| equals(existing, &key)) {
            Some(entry) => entry.1 = value,
            Option::None => entries.push((key, value)),
        }
    }
}

/// Value equality behind `==`. Defined per variant: numbers never equal
/// across variants, `none` equals only `none`, lists and tuples compare
/// pointwise, and identity-flavored values (sets, maps, records,
/// callables) are never equal.
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Long(a), Value::Long(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Double(a), Value::Double(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Char(a), Value::Char(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Unit, Value::Unit) => true,
        (Value::None, Value::None) => true,
        (Value::Tuple(a), Value::Tuple(b)) => {
            a.values.len() == b.values.len()
                && a.values.iter().zip(&b.values).all(|(x, y)| equals(x, y))
        }
        (Value::List(a), Value::List(b)) => {
            let a = a.values.borrow();
            let b = b.values.borrow();
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| equals(x, y))
        }
        _ => false,
    }
}

/// Floats print with a decimal point even when whole, so `1.0 + 1.0`
/// shows as `2.0` rather than `2`.
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Long(value) => write!(f, "{}", value),
            Value::Float(value) => write_float(f, f64::from(*value)),
            Value::Double(value) => write_float(f, *value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Char(value) => write!(f, "{}", value),
            Value::String(value) => f.write_str(value),
            Value::Unit => f.write_str("unit"),
            Value::None => f.write_str("none"),
            Value::List(list) => {
                f.write_str("[")?;
                for (i, value) in list.values.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            Value::Set(set) => {
                f.write_str("{")?;
                for (i, value) in set.values.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("}")
            }
            Value::Tuple(tuple) => {
                f.write_str("(")?;
                for (i, value) in tuple.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str(")")
            }
            // Opaque values print as their type.
            Value::Map(map) => write!(f, "{}", map.ty),
            Value::Record(record) => write!(f, "{}", record.ty),
            Value::Function(function) => write!(f, "{}", function.ty),
            Value::Builtin(builtin) => write!(f, "{}", builtin.ty),
            Value::Method(method) => write!(f, "{}", method.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_types::TypeStore;

    #[test]
    fn numbers_never_equal_across_variants() {
        assert!(equals(&Value::Int(1), &Value::Int(1)));
        assert!(!equals(&Value::Int(1), &Value::Long(1)));
        assert!(!equals(&Value::Double(1.0), &Value::Float(1.0)));
    }

    #[test]
    fn none_equals_only_none() {
        assert!(equals(&Value::None, &Value::None));
        assert!(!equals(&Value::None, &Value::Unit));
        assert!(!equals(&Value::None, &Value::Int(0)));
    }

    #[test]
    fn float_display_keeps_a_decimal() {
        assert_eq!(Value::Double(2.0).to_string(), "2.0");
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Int(2).to_string(), "2");
    }

    #[test]
    fn collection_display() {
        let store = TypeStore::new();
        let list = Value::List(Rc::new(ListValue {
            ty: store.list_of(&store.int),
            elem: store.int.clone(),
            values: RefCell::new(vec![Value::Int(1), Value::Int(2)]),
        }));
        assert_eq!(list.to_string(), "[1, 2]");
    }

    #[test]
    fn sets_deduplicate_by_value() {
        let store = TypeStore::new();
        let set = SetValue {
            ty: store.set_of(&store.int),
            elem: store.int.clone(),
            values: RefCell::new(Vec::new()),
        };
        set.insert(Value::Int(1));
        set.insert(Value::Int(2));
        set.insert(Value::Int(1));
        assert_eq!(set.values.borrow().len(), 2);
    }
}
