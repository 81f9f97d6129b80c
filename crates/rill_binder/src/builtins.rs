//! The global scope: built-in functions, methods and type names.
//!
//! Seeded once into the outermost scope before any user code binds. The
//! evaluator keys its global environment by these same symbols, so the
//! set is carried on the bound program.

use crate::scope::SymbolTable;
use crate::symbol::{Symbol, SymbolKind};
use rill_types::{TypeRef, TypeStore};
use std::rc::Rc;

/// The built-in symbols, in the order they are seeded.
#[derive(Debug, PartialEq)]
pub struct Builtins {
    pub println: Rc<Symbol>,
    pub print: Rc<Symbol>,
    pub type_of: Rc<Symbol>,
    pub string: Rc<Symbol>,
    pub add: Rc<Symbol>,
    pub input: Rc<Symbol>,
    pub time: Rc<Symbol>,
    pub len: Rc<Symbol>,
    /// String-receiver parsing methods, yielding `T | None`.
    pub str_int: Rc<Symbol>,
    pub str_long: Rc<Symbol>,
    pub str_float: Rc<Symbol>,
    pub str_double: Rc<Symbol>,
}

impl Builtins {
    /// Create the built-in symbols and register them, along with the
    /// nameable primitive types, into the global scope.
    pub fn seed(table: &mut SymbolTable, store: &TypeStore) -> Rc<Builtins> {
        let any_none = store.any_none.clone();

        let mut function = |name: &str, params: Vec<TypeRef>, ret: TypeRef| {
            let ty = store.function_of(params, ret);
            let symbol = Symbol::new(table.fresh_id(), name, ty, SymbolKind::Function);
            table.put_symbol(symbol.clone());
            symbol
        };

        let println = function("println", vec![any_none.clone()], store.unit.clone());
        let print = function("print", vec![any_none.clone()], store.unit.clone());
        let type_of = function("typeOf", vec![any_none.clone()], store.string.clone());
        let string = function("string", vec![any_none.clone()], store.string.clone());
        let collection = store.union_of(vec![
            store.set_of(&any_none),
            store.list_of(&any_none),
        ]);
        let add = function(
            "add",
            vec![collection, any_none.clone()],
            store.unit.clone(),
        );
        let input = function("input", vec![], store.string.clone());
        let time = function("time", vec![], store.long.clone());
        let sized = store.union_of(vec![
            store.list_of(&any_none),
            store.set_of(&any_none),
            store.map_of(any_none.clone(), any_none.clone()),
            store.string.clone(),
        ]);
        let len = function("len", vec![sized], store.int.clone());

        let mut string_method = |name: &str, ret: &TypeRef| {
            let ty = store.function_of(vec![], store.optional_of(ret.clone()));
            let symbol = Symbol::method(table.fresh_id(), name, store.string.clone(), ty);
            table.put_method(store.string.clone(), symbol.clone());
            symbol
        };
        let str_int = string_method("int", &store.int);
        let str_long = string_method("long", &store.long);
        let str_float = string_method("float", &store.float);
        let str_double = string_method("double", &store.double);

        // Nameable types. Char is deliberately absent: char literals have
        // the type but it cannot be written in an annotation.
        table.put_type("Boolean", store.boolean.clone());
        table.put_type("Nothing", store.nothing.clone());
        table.put_type("Double", store.double.clone());
        table.put_type("String", store.string.clone());
        table.put_type("Float", store.float.clone());
        table.put_type("None", store.none.clone());
        table.put_type("Long", store.long.clone());
        table.put_type("Unit", store.unit.clone());
        table.put_type("Any", store.any.clone());
        table.put_type("Int", store.int.clone());

        Rc::new(Builtins {
            println,
            print,
            type_of,
            string,
            add,
            input,
            time,
            len,
            str_int,
            str_long,
            str_float,
            str_double,
        })
    }
}
