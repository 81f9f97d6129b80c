//! The tree-walking evaluator.
//!
//! Control flow travels as a [`Completion`]: loops absorb break and
//! continue, invocations absorb return, `try` absorbs panic, and
//! everything else passes the signal through. A `defer` written as a
//! direct child of a statement list registers onto that list and its
//! body runs, in reverse registration order, whenever the list is
//! left; a `defer` reached in any other position runs in place.
//!
//! The evaluator runs only programs that bound without diagnostics, so
//! type mismatches here are toolchain defects and fail fast.

use crate::environment::Environment;
use crate::value::{
    equals, BuiltinFn, BuiltinValue, FunctionValue, ListValue, MapValue, MethodValue, RecordValue,
    SetValue, TupleValue, Value,
};
use indexmap::IndexMap;
use rill_binder::{
    BinaryOperator, BoundExpr, BoundExprKind, BoundFunction, BoundProgram, BoundStmt, Builtins,
    Constant, Symbol, UnaryOperator,
};
use rill_types::{Type, TypeRef, TypeStore};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// An uncaught panic that terminated evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RuntimePanic {
    pub message: String,
}

/// How a statement or expression finished.
#[derive(Debug, Clone)]
pub enum Completion {
    Normal(Value),
    Return(Value),
    Break,
    Continue,
    Panic(String),
}

/// Unwrap a normal completion's value, propagating any control signal.
macro_rules! value_of {
    ($completion:expr) => {
        match $completion {
            Completion::Normal(value) => value,
            other => return other,
        }
    };
}

/// Run a bound program, writing builtin output to `out`. A return at
/// the top level ends the script silently; an uncaught panic is the
/// only error.
pub fn evaluate(program: &BoundProgram, out: &mut dyn Write) -> Result<(), RuntimePanic> {
    let mut evaluator = Evaluator::new(out);
    evaluator.seed(&program.builtins);
    match evaluator.run_block(&program.statements) {
        Completion::Panic(message) => Err(RuntimePanic { message }),
        _ => Ok(()),
    }
}

pub struct Evaluator<'w> {
    store: TypeStore,
    env: Environment,
    out: &'w mut dyn Write,
}

impl<'w> Evaluator<'w> {
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self {
            store: TypeStore::new(),
            env: Environment::new(),
            out,
        }
    }

    /// Bind the builtin symbols in the global environment. Ids must be
    /// the ones the binder resolved against.
    pub fn seed(&mut self, builtins: &Builtins) {
        let entries: [(&Rc<Symbol>, BuiltinFn); 12] = [
            (&builtins.println, BuiltinFn::Println),
            (&builtins.print, BuiltinFn::Print),
            (&builtins.type_of, BuiltinFn::TypeOf),
            (&builtins.string, BuiltinFn::ToString),
            (&builtins.add, BuiltinFn::Add),
            (&builtins.input, BuiltinFn::Input),
            (&builtins.time, BuiltinFn::Time),
            (&builtins.len, BuiltinFn::Len),
            (&builtins.str_int, BuiltinFn::ParseInt),
            (&builtins.str_long, BuiltinFn::ParseLong),
            (&builtins.str_float, BuiltinFn::ParseFloat),
            (&builtins.str_double, BuiltinFn::ParseDouble),
        ];
        for (symbol, function) in entries {
            self.env.define(
                symbol.id,
                Value::Builtin(Rc::new(BuiltinValue {
                    ty: symbol.ty.clone(),
                    function,
                })),
            );
        }
    }

    // --------------------------------------------------------------------
    // Statements
    // --------------------------------------------------------------------

    /// Run a statement list with its own defer list. Only direct
    /// children of the list register onto it; their bodies run in
    /// reverse order on the way out, and a signal raised by one of
    /// them replaces whatever completion was in flight.
    pub fn run_block(&mut self, statements: &[BoundStmt]) -> Completion {
        let mut deferred: Vec<&BoundStmt> = Vec::new();
        let mut completion = Completion::Normal(Value::Unit);
        for stmt in statements {
            let result = match stmt {
                BoundStmt::Defer(stmt) => {
                    deferred.push(&stmt.body);
                    Completion::Normal(Value::Unit)
                }
                other => self.execute(other),
            };
            if !matches!(result, Completion::Normal(_)) {
                completion = result;
                break;
            }
        }
        for body in deferred.iter().rev() {
            let result = self.execute(body);
            if !matches!(result, Completion::Normal(_)) {
                completion = result;
            }
        }
        completion
    }

    fn execute(&mut self, stmt: &BoundStmt) -> Completion {
        match stmt {
            BoundStmt::Variable(decl) => {
                let value = value_of!(self.eval(&decl.value));
                self.env.define(decl.symbol.id, value);
                Completion::Normal(Value::Unit)
            }
            BoundStmt::Function(decl) => {
                self.declare_function(decl);
                Completion::Normal(Value::Unit)
            }
            // Record shape lives in the type; nothing to do at runtime.
            BoundStmt::Record(_) => Completion::Normal(Value::Unit),
            BoundStmt::Expression(expr) => {
                value_of!(self.eval(expr));
                Completion::Normal(Value::Unit)
            }
            BoundStmt::Block(block) => {
                self.env.push_scope();
                let result = self.run_block(&block.statements);
                self.env.pop_scope();
                result
            }
            BoundStmt::If(stmt) => {
                let condition = value_of!(self.eval(&stmt.condition));
                if condition.as_boolean() {
                    self.execute(&stmt.then_branch)
                } else if let Some(else_branch) = &stmt.else_branch {
                    self.execute(else_branch)
                } else {
                    Completion::Normal(Value::Unit)
                }
            }
            BoundStmt::While(stmt) => {
                loop {
                    let condition = value_of!(self.eval(&stmt.condition));
                    if !condition.as_boolean() {
                        break;
                    }
                    match self.execute(&stmt.body) {
                        Completion::Normal(_) | Completion::Continue => {}
                        Completion::Break => break,
                        other => return other,
                    }
                }
                Completion::Normal(Value::Unit)
            }
            BoundStmt::DoWhile(stmt) => {
                loop {
                    match self.execute(&stmt.body) {
                        Completion::Normal(_) | Completion::Continue => {}
                        Completion::Break => break,
                        other => return other,
                    }
                    let condition = value_of!(self.eval(&stmt.condition));
                    if !condition.as_boolean() {
                        break;
                    }
                }
                Completion::Normal(Value::Unit)
            }
            // A defer that is a direct child of a statement list is
            // picked up by `run_block`; reached any other way it runs
            // its body on the spot.
            BoundStmt::Defer(stmt) => self.execute(&stmt.body),
        }
    }

    fn declare_function(&mut self, decl: &BoundFunction) {
        let function = Rc::new(FunctionValue {
            ty: decl.symbol.ty.clone(),
            self_symbol: decl.receiver.clone(),
            params: decl.params.clone(),
            body: Rc::new(decl.body.clone()),
            captures: RefCell::new(FxHashMap::default()),
        });
        // Defined before the snapshot is taken so the function captures
        // itself and can recurse.
        self.env
            .define(decl.symbol.id, Value::Function(function.clone()));
        *function.captures.borrow_mut() = self.env.snapshot();
    }

    // --------------------------------------------------------------------
    // Expressions
    // --------------------------------------------------------------------

    fn eval(&mut self, expr: &BoundExpr) -> Completion {
        match &expr.kind {
            BoundExprKind::Literal(constant) => Completion::Normal(match constant {
                Constant::Int(value) => Value::Int(*value),
                Constant::Long(value) => Value::Long(*value),
                Constant::Float(value) => Value::Float(*value),
                Constant::Double(value) => Value::Double(*value),
                Constant::Boolean(value) => Value::Boolean(*value),
                Constant::String(value) => Value::string(value.clone()),
                Constant::Char(value) => Value::Char(*value),
            }),
            BoundExprKind::Variable(symbol) => Completion::Normal(self.env.get(symbol.id)),
            BoundExprKind::None => Completion::Normal(Value::None),
            BoundExprKind::Unary { op, operand } => {
                let value = value_of!(self.eval(operand));
                Completion::Normal(match op {
                    UnaryOperator::Identity => value,
                    UnaryOperator::Negation => match value {
                        Value::Int(v) => Value::Int(v.wrapping_neg()),
                        Value::Long(v) => Value::Long(v.wrapping_neg()),
                        Value::Float(v) => Value::Float(-v),
                        Value::Double(v) => Value::Double(-v),
                        other => unreachable!("negation of {:?}", other),
                    },
                    UnaryOperator::LogicalNegation => Value::Boolean(!value.as_boolean()),
                })
            }
            BoundExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right),
            BoundExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                let condition = value_of!(self.eval(condition));
                if condition.as_boolean() {
                    self.eval(then_expr)
                } else {
                    self.eval(else_expr)
                }
            }
            BoundExprKind::Assignment { symbol, value } => {
                let value = value_of!(self.eval(value));
                self.env.assign(symbol.id, value);
                Completion::Normal(Value::Unit)
            }
            BoundExprKind::SetIndexed {
                target,
                index,
                value,
            } => {
                let target = value_of!(self.eval(target));
                let index = value_of!(self.eval(index));
                let value = value_of!(self.eval(value));
                match target {
                    Value::List(list) => {
                        let len = list.values.borrow().len();
                        let position = match list_index(&index, len) {
                            Ok(position) => position,
                            Err(panic) => return panic,
                        };
                        list.values.borrow_mut()[position] = value;
                        Completion::Normal(Value::Unit)
                    }
                    Value::Map(map) => {
                        map.insert(index, value);
                        Completion::Normal(Value::Unit)
                    }
                    other => unreachable!("indexed write to {:?}", other),
                }
            }
            BoundExprKind::SetField {
                target,
                field,
                value,
            } => {
                let target = value_of!(self.eval(target));
                let value = value_of!(self.eval(value));
                match target {
                    Value::Record(record) => {
                        record.fields.borrow_mut().insert(field.clone(), value);
                        Completion::Normal(Value::Unit)
                    }
                    other => unreachable!("field write to {:?}", other),
                }
            }
            BoundExprKind::GetField { target, field } => {
                let target = value_of!(self.eval(target));
                match target {
                    Value::Record(record) => {
                        let value = record.fields.borrow().get(field).cloned();
                        match value {
                            Some(value) => Completion::Normal(value),
                            None => unreachable!("missing field {}", field),
                        }
                    }
                    other => unreachable!("field read from {:?}", other),
                }
            }
            BoundExprKind::GetMethod { target, method } => {
                let receiver = value_of!(self.eval(target));
                let target = self.env.get(method.id);
                Completion::Normal(Value::Method(Rc::new(MethodValue { receiver, target })))
            }
            BoundExprKind::Call { target, arguments } => {
                let callee = value_of!(self.eval(target));
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(value_of!(self.eval(argument)));
                }
                self.invoke(callee, values)
            }
            BoundExprKind::Indexed { target, index } => {
                let target = value_of!(self.eval(target));
                let index = value_of!(self.eval(index));
                self.eval_indexed(target, index)
            }
            BoundExprKind::RecordInit { record, arguments } => {
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(value_of!(self.eval(argument)));
                }
                let fields = match &*record.ty {
                    Type::Record(ty) => {
                        let names = ty.fields.borrow();
                        names
                            .keys()
                            .cloned()
                            .zip(values)
                            .collect::<IndexMap<String, Value>>()
                    }
                    other => unreachable!("record construction of {:?}", other),
                };
                Completion::Normal(Value::Record(Rc::new(RecordValue {
                    ty: record.ty.clone(),
                    fields: RefCell::new(fields),
                })))
            }
            BoundExprKind::FunctionExpr { params, body } => {
                Completion::Normal(Value::Function(Rc::new(FunctionValue {
                    ty: expr.ty.clone(),
                    self_symbol: None,
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    captures: RefCell::new(self.env.snapshot()),
                })))
            }
            BoundExprKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(value_of!(self.eval(element)));
                }
                let elem = match &*expr.ty {
                    Type::List(elem) => elem.clone(),
                    _ => self.store.any.clone(),
                };
                Completion::Normal(Value::List(Rc::new(ListValue {
                    ty: expr.ty.clone(),
                    elem,
                    values: RefCell::new(values),
                })))
            }
            BoundExprKind::SetLiteral(elements) => {
                let elem = match &*expr.ty {
                    Type::Set(elem) => elem.clone(),
                    _ => self.store.any.clone(),
                };
                let set = SetValue {
                    ty: expr.ty.clone(),
                    elem,
                    values: RefCell::new(Vec::new()),
                };
                for element in elements {
                    set.insert(value_of!(self.eval(element)));
                }
                Completion::Normal(Value::Set(Rc::new(set)))
            }
            BoundExprKind::MapLiteral(entries) => {
                let map = MapValue {
                    ty: expr.ty.clone(),
                    entries: RefCell::new(Vec::new()),
                };
                for (key, value) in entries {
                    let key = value_of!(self.eval(key));
                    let value = value_of!(self.eval(value));
                    map.insert(key, value);
                }
                Completion::Normal(Value::Map(Rc::new(map)))
            }
            BoundExprKind::Tuple(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(value_of!(self.eval(element)));
                }
                Completion::Normal(Value::Tuple(Rc::new(TupleValue {
                    ty: expr.ty.clone(),
                    values,
                })))
            }
            BoundExprKind::Paren(inner) => self.eval(inner),
            BoundExprKind::Cast { value } => {
                let value = value_of!(self.eval(value));
                self.cast(value, &expr.ty)
            }
            BoundExprKind::Try(inner) => match self.eval(inner) {
                Completion::Panic(_) => Completion::Normal(Value::None),
                other => other,
            },
            BoundExprKind::Panic(message) => {
                let message = value_of!(self.eval(message));
                Completion::Panic(message.to_string())
            }
            BoundExprKind::Return(value) => {
                let value = match value {
                    Some(value) => value_of!(self.eval(value)),
                    None => Value::Unit,
                };
                Completion::Return(value)
            }
            BoundExprKind::Break => Completion::Break,
            BoundExprKind::Continue => Completion::Continue,
            BoundExprKind::Error => unreachable!("error nodes are never evaluated"),
        }
    }

    fn eval_indexed(&mut self, target: Value, index: Value) -> Completion {
        match target {
            Value::String(text) => {
                let chars: Vec<char> = text.chars().collect();
                let position = match list_index(&index, chars.len()) {
                    Ok(position) => position,
                    Err(panic) => return panic,
                };
                Completion::Normal(Value::Char(chars[position]))
            }
            Value::List(list) => {
                let values = list.values.borrow();
                let position = match list_index(&index, values.len()) {
                    Ok(position) => position,
                    Err(panic) => return panic,
                };
                Completion::Normal(values[position].clone())
            }
            Value::Map(map) => Completion::Normal(map.get(&index).unwrap_or(Value::None)),
            Value::Tuple(tuple) => {
                // The binder proved the index is a constant in bounds.
                let position = match index {
                    Value::Int(position) => position as usize,
                    other => unreachable!("tuple index {:?}", other),
                };
                Completion::Normal(tuple.values[position].clone())
            }
            other => unreachable!("indexed read from {:?}", other),
        }
    }

    // --------------------------------------------------------------------
    // Calls
    // --------------------------------------------------------------------

    fn invoke(&mut self, callee: Value, arguments: Vec<Value>) -> Completion {
        match callee {
            Value::Function(function) => self.invoke_function(&function, None, arguments),
            Value::Builtin(builtin) => self.call_builtin(builtin.function, None, arguments),
            Value::Method(method) => match &method.target {
                Value::Function(function) => {
                    self.invoke_function(function, Some(method.receiver.clone()), arguments)
                }
                Value::Builtin(builtin) => {
                    self.call_builtin(builtin.function, Some(method.receiver.clone()), arguments)
                }
                other => unreachable!("uncallable method target {:?}", other),
            },
            other => unreachable!("uncallable value {:?}", other),
        }
    }

    fn invoke_function(
        &mut self,
        function: &FunctionValue,
        receiver: Option<Value>,
        arguments: Vec<Value>,
    ) -> Completion {
        let mut env = Environment::from_snapshot(function.captures.borrow().clone());
        if let (Some(symbol), Some(receiver)) = (&function.self_symbol, receiver) {
            env.define(symbol.id, receiver);
        }
        for (param, argument) in function.params.iter().zip(arguments) {
            env.define(param.id, argument);
        }
        let saved = std::mem::replace(&mut self.env, env);
        let body = function.body.clone();
        let result = self.run_block(&body);
        self.env = saved;
        match result {
            Completion::Return(value) => Completion::Normal(value),
            Completion::Normal(_) => Completion::Normal(Value::Unit),
            Completion::Panic(message) => Completion::Panic(message),
            Completion::Break | Completion::Continue => {
                unreachable!("loop jump escaped a function body")
            }
        }
    }

    fn call_builtin(
        &mut self,
        function: BuiltinFn,
        receiver: Option<Value>,
        mut arguments: Vec<Value>,
    ) -> Completion {
        match function {
            BuiltinFn::Println => {
                let Some(argument) = arguments.into_iter().next() else {
                    unreachable!("println takes one argument");
                };
                let _ = writeln!(self.out, "{}", argument);
                Completion::Normal(Value::Unit)
            }
            BuiltinFn::Print => {
                let Some(argument) = arguments.into_iter().next() else {
                    unreachable!("print takes one argument");
                };
                let _ = write!(self.out, "{}", argument);
                Completion::Normal(Value::Unit)
            }
            BuiltinFn::TypeOf => {
                let Some(argument) = arguments.into_iter().next() else {
                    unreachable!("typeOf takes one argument");
                };
                Completion::Normal(Value::string(argument.type_of(&self.store).to_string()))
            }
            BuiltinFn::ToString => {
                let Some(argument) = arguments.into_iter().next() else {
                    unreachable!("string takes one argument");
                };
                Completion::Normal(Value::string(argument.to_string()))
            }
            BuiltinFn::Add => {
                let element = arguments.pop();
                let collection = arguments.pop();
                let (Some(collection), Some(element)) = (collection, element) else {
                    unreachable!("add takes two arguments");
                };
                self.add_to_collection(collection, element)
            }
            BuiltinFn::Input => {
                let mut line = String::new();
                let _ = std::io::stdin().read_line(&mut line);
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Completion::Normal(Value::string(line))
            }
            BuiltinFn::Time => {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|elapsed| elapsed.as_millis() as i64)
                    .unwrap_or(0);
                Completion::Normal(Value::Long(millis))
            }
            BuiltinFn::Len => {
                let Some(argument) = arguments.into_iter().next() else {
                    unreachable!("len takes one argument");
                };
                let len = match &argument {
                    Value::List(list) => list.values.borrow().len(),
                    Value::Set(set) => set.values.borrow().len(),
                    Value::Map(map) => map.entries.borrow().len(),
                    Value::String(text) => text.chars().count(),
                    other => unreachable!("len of {:?}", other),
                };
                Completion::Normal(Value::Int(len as i32))
            }
            BuiltinFn::ParseInt => Completion::Normal(
                self.receiver_text(receiver)
                    .parse::<i32>()
                    .map(Value::Int)
                    .unwrap_or(Value::None),
            ),
            BuiltinFn::ParseLong => Completion::Normal(
                self.receiver_text(receiver)
                    .parse::<i64>()
                    .map(Value::Long)
                    .unwrap_or(Value::None),
            ),
            BuiltinFn::ParseFloat => Completion::Normal(
                self.receiver_text(receiver)
                    .parse::<f32>()
                    .map(Value::Float)
                    .unwrap_or(Value::None),
            ),
            BuiltinFn::ParseDouble => Completion::Normal(
                self.receiver_text(receiver)
                    .parse::<f64>()
                    .map(Value::Double)
                    .unwrap_or(Value::None),
            ),
        }
    }

    fn receiver_text(&self, receiver: Option<Value>) -> Rc<String> {
        match receiver {
            Some(Value::String(text)) => text,
            other => unreachable!("string method on {:?}", other),
        }
    }

    /// `add` is typed loosely as taking any collection, so the element
    /// type is enforced here against the collection's runtime type.
    fn add_to_collection(&mut self, collection: Value, element: Value) -> Completion {
        match collection {
            Value::List(list) => {
                if !element.type_of(&self.store).assignable_to(&list.elem) {
                    return Completion::Panic(format!(
                        "A value of type '{}' cannot be added to '{}'",
                        element.type_of(&self.store),
                        list.ty
                    ));
                }
                list.values.borrow_mut().push(element);
                Completion::Normal(Value::Unit)
            }
            Value::Set(set) => {
                if !element.type_of(&self.store).assignable_to(&set.elem) {
                    return Completion::Panic(format!(
                        "A value of type '{}' cannot be added to '{}'",
                        element.type_of(&self.store),
                        set.ty
                    ));
                }
                set.insert(element);
                Completion::Normal(Value::Unit)
            }
            other => unreachable!("add to {:?}", other),
        }
    }

    // --------------------------------------------------------------------
    // Operators
    // --------------------------------------------------------------------

    fn eval_binary(
        &mut self,
        op: BinaryOperator,
        left: &BoundExpr,
        right: &BoundExpr,
    ) -> Completion {
        match op {
            BinaryOperator::LogicalAnd => {
                let left = value_of!(self.eval(left));
                if !left.as_boolean() {
                    return Completion::Normal(Value::Boolean(false));
                }
                self.eval(right)
            }
            BinaryOperator::LogicalOr => {
                let left = value_of!(self.eval(left));
                if left.as_boolean() {
                    return Completion::Normal(Value::Boolean(true));
                }
                self.eval(right)
            }
            _ => {
                let left = value_of!(self.eval(left));
                let right = value_of!(self.eval(right));
                match op {
                    BinaryOperator::Equals => {
                        Completion::Normal(Value::Boolean(equals(&left, &right)))
                    }
                    BinaryOperator::NotEquals => {
                        Completion::Normal(Value::Boolean(!equals(&left, &right)))
                    }
                    BinaryOperator::Concat => match (&left, &right) {
                        (Value::String(a), Value::String(b)) => {
                            Completion::Normal(Value::string(format!("{}{}", a, b)))
                        }
                        other => unreachable!("concat of {:?}", other),
                    },
                    _ => numeric_binary(op, &left, &right),
                }
            }
        }
    }

    fn cast(&mut self, value: Value, target: &TypeRef) -> Completion {
        if let Some(converted) = numeric_cast(&value, target) {
            return Completion::Normal(converted);
        }
        let actual = value.type_of(&self.store);
        if actual.assignable_to(target) {
            return Completion::Normal(value);
        }
        Completion::Panic(format!(
            "CastError: {} cannot be cast to {}",
            actual, target
        ))
    }
}

fn list_index(index: &Value, len: usize) -> Result<usize, Completion> {
    let position = match index {
        Value::Int(position) => *position,
        other => unreachable!("index {:?}", other),
    };
    if position < 0 || position as usize >= len {
        return Err(Completion::Panic("Index out of bounds".to_string()));
    }
    Ok(position as usize)
}

/// A numeric operand pair promoted to its result domain. Mirrors the
/// binder's pair table exactly, so the value a program computes always
/// inhabits the type the binder gave the expression.
enum Pair {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

fn promote(left: &Value, right: &Value) -> Pair {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Pair::Int(*a, *b),
        (Value::Int(a), Value::Long(b)) => Pair::Long(i64::from(*a), *b),
        (Value::Int(a), Value::Float(b)) => Pair::Float(*a as f32, *b),
        (Value::Int(a), Value::Double(b)) => Pair::Double(f64::from(*a), *b),
        (Value::Long(a), Value::Int(b)) => Pair::Long(*a, i64::from(*b)),
        (Value::Long(a), Value::Long(b)) => Pair::Long(*a, *b),
        (Value::Long(a), Value::Float(b)) => Pair::Long(*a, *b as i64),
        (Value::Long(a), Value::Double(b)) => Pair::Double(*a as f64, *b),
        (Value::Float(a), Value::Int(b)) => Pair::Float(*a, *b as f32),
        (Value::Float(a), Value::Long(b)) => Pair::Long(*a as i64, *b),
        (Value::Float(a), Value::Float(b)) => Pair::Float(*a, *b),
        (Value::Float(a), Value::Double(b)) => Pair::Double(f64::from(*a), *b),
        (Value::Double(a), Value::Int(b)) => Pair::Double(*a, f64::from(*b)),
        (Value::Double(a), Value::Long(b)) => Pair::Double(*a, *b as f64),
        (Value::Double(a), Value::Float(b)) => Pair::Double(*a, f64::from(*b)),
        (Value::Double(a), Value::Double(b)) => Pair::Double(*a, *b),
        other => unreachable!("non-numeric operands {:?}", other),
    }
}

fn numeric_binary(op: BinaryOperator, left: &Value, right: &Value) -> Completion {
    use BinaryOperator::*;
    let value = match promote(left, right) {
        Pair::Int(a, b) => match op {
            Addition => Value::Int(a.wrapping_add(b)),
            Subtraction => Value::Int(a.wrapping_sub(b)),
            Multiplication => Value::Int(a.wrapping_mul(b)),
            Division => {
                if b == 0 {
                    return Completion::Panic("Division by zero".to_string());
                }
                Value::Int(a.wrapping_div(b))
            }
            GreaterThan => Value::Boolean(a > b),
            GreaterThanEqual => Value::Boolean(a >= b),
            LessThan => Value::Boolean(a < b),
            LessThanEqual => Value::Boolean(a <= b),
            other => unreachable!("numeric operator {:?}", other),
        },
        Pair::Long(a, b) => match op {
            Addition => Value::Long(a.wrapping_add(b)),
            Subtraction => Value::Long(a.wrapping_sub(b)),
            Multiplication => Value::Long(a.wrapping_mul(b)),
            Division => {
                if b == 0 {
                    return Completion::Panic("Division by zero".to_string());
                }
                Value::Long(a.wrapping_div(b))
            }
            GreaterThan => Value::Boolean(a > b),
            GreaterThanEqual => Value::Boolean(a >= b),
            LessThan => Value::Boolean(a < b),
            LessThanEqual => Value::Boolean(a <= b),
            other => unreachable!("numeric operator {:?}", other),
        },
        Pair::Float(a, b) => match op {
            Addition => Value::Float(a + b),
            Subtraction => Value::Float(a - b),
            Multiplication => Value::Float(a * b),
            Division => Value::Float(a / b),
            GreaterThan => Value::Boolean(a > b),
            GreaterThanEqual => Value::Boolean(a >= b),
            LessThan => Value::Boolean(a < b),
            LessThanEqual => Value::Boolean(a <= b),
            other => unreachable!("numeric operator {:?}", other),
        },
        Pair::Double(a, b) => match op {
            Addition => Value::Double(a + b),
            Subtraction => Value::Double(a - b),
            Multiplication => Value::Double(a * b),
            Division => Value::Double(a / b),
            GreaterThan => Value::Boolean(a > b),
            GreaterThanEqual => Value::Boolean(a >= b),
            LessThan => Value::Boolean(a < b),
            LessThanEqual => Value::Boolean(a <= b),
            other => unreachable!("numeric operator {:?}", other),
        },
    };
    Completion::Normal(value)
}

fn numeric_cast(value: &Value, target: &TypeRef) -> Option<Value> {
    let converted = match (&**target, value) {
        (Type::Int, Value::Int(v)) => Value::Int(*v),
        (Type::Int, Value::Long(v)) => Value::Int(*v as i32),
        (Type::Int, Value::Float(v)) => Value::Int(*v as i32),
        (Type::Int, Value::Double(v)) => Value::Int(*v as i32),
        (Type::Long, Value::Int(v)) => Value::Long(i64::from(*v)),
        (Type::Long, Value::Long(v)) => Value::Long(*v),
        (Type::Long, Value::Float(v)) => Value::Long(*v as i64),
        (Type::Long, Value::Double(v)) => Value::Long(*v as i64),
        (Type::Float, Value::Int(v)) => Value::Float(*v as f32),
        (Type::Float, Value::Long(v)) => Value::Float(*v as f32),
        (Type::Float, Value::Float(v)) => Value::Float(*v),
        (Type::Float, Value::Double(v)) => Value::Float(*v as f32),
        (Type::Double, Value::Int(v)) => Value::Double(f64::from(*v)),
        (Type::Double, Value::Long(v)) => Value::Double(*v as f64),
        (Type::Double, Value::Float(v)) => Value::Double(f64::from(*v)),
        (Type::Double, Value::Double(v)) => Value::Double(*v),
        _ => return None,
    };
    Some(converted)
}
