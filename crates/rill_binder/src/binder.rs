//! The binder: name resolution and type checking over the syntax tree.
//!
//! Binding is a single pass. Declarations register their symbol before
//! their body binds, so functions and records may refer to themselves.
//! Failed binding produces an error node with the error type, which
//! absorbs every downstream check so one mistake reports once.
//!
//! After a statement list binds, a second walk checks return paths and
//! reports unreachable statements. That walk needs the enclosing return
//! type, which is why it runs per function body rather than globally.

use crate::bound::{
    BoundBlock, BoundDefer, BoundExpr, BoundExprKind, BoundFunction, BoundIf, BoundProgram,
    BoundRecord, BoundStmt, BoundVariable, BoundWhile, Constant,
};
use crate::builtins::Builtins;
use crate::operators::{resolve_binary, resolve_unary};
use crate::scope::SymbolTable;
use crate::symbol::{Symbol, SymbolKind};
use indexmap::IndexMap;
use rill_ast::token::{Token, TokenKind, TokenValue};
use rill_ast::tree::{
    AssignmentExpr, Block, BraceLiteral, Expr, FunctionDecl, Param, Program, RecordDecl, Stmt,
    TypeSyntax, VariableDecl,
};
use rill_core::text::TextSpan;
use rill_diagnostics::{messages, DiagnosticCollection};
use rill_types::{Type, TypeRef, TypeStore};
use std::rc::Rc;

/// What kind of construct encloses the statement being bound. Break,
/// continue and return legality is decided by looking at this stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeTag {
    Function,
    Defer,
    Loop,
}

/// Bind a parsed program. Always produces a bound tree, even in the
/// presence of errors; the caller decides whether it is evaluable by
/// inspecting the diagnostics.
pub fn bind(program: &Program) -> (BoundProgram, DiagnosticCollection) {
    let mut binder = Binder::new();
    let statements: Vec<BoundStmt> = program
        .statements
        .iter()
        .map(|stmt| binder.bind_statement(stmt))
        .collect();
    // The top level behaves like a Unit function body: no return value
    // is required but unreachable statements still report.
    let unit = binder.store.unit.clone();
    binder.check_return_paths(&statements, &unit);
    let Binder {
        builtins,
        diagnostics,
        ..
    } = binder;
    (
        BoundProgram {
            statements,
            builtins,
        },
        diagnostics,
    )
}

struct Binder {
    store: TypeStore,
    table: SymbolTable,
    builtins: Rc<Builtins>,
    diagnostics: DiagnosticCollection,
    scope_tags: Vec<ScopeTag>,
    return_types: Vec<TypeRef>,
}

impl Binder {
    fn new() -> Self {
        let store = TypeStore::new();
        let mut table = SymbolTable::new();
        let builtins = Builtins::seed(&mut table, &store);
        let return_types = vec![store.unit.clone()];
        Self {
            store,
            table,
            builtins,
            diagnostics: DiagnosticCollection::new(),
            scope_tags: Vec::new(),
            return_types,
        }
    }

    // --------------------------------------------------------------------
    // Statements
    // --------------------------------------------------------------------

    fn bind_statement(&mut self, stmt: &Stmt) -> BoundStmt {
        match stmt {
            Stmt::Function(decl) => self.bind_function_decl(decl),
            Stmt::Record(decl) => self.bind_record_decl(decl),
            Stmt::Variable(decl) => self.bind_variable_decl(decl),
            Stmt::If(stmt) => {
                let condition = self.bind_expression(&stmt.condition, None);
                self.check_condition(&condition);
                let then_branch = Box::new(self.bind_statement(&stmt.then_branch));
                let else_branch = stmt
                    .else_branch
                    .as_ref()
                    .map(|branch| Box::new(self.bind_statement(branch)));
                BoundStmt::If(BoundIf {
                    condition,
                    then_branch,
                    else_branch,
                    span: stmt.span,
                })
            }
            Stmt::While(stmt) => {
                let condition = self.bind_expression(&stmt.condition, None);
                self.check_condition(&condition);
                self.scope_tags.push(ScopeTag::Loop);
                let body = Box::new(self.bind_statement(&stmt.body));
                self.scope_tags.pop();
                BoundStmt::While(BoundWhile {
                    condition,
                    body,
                    span: stmt.span,
                })
            }
            Stmt::DoWhile(stmt) => {
                self.scope_tags.push(ScopeTag::Loop);
                let body = Box::new(self.bind_statement(&stmt.body));
                self.scope_tags.pop();
                let condition = self.bind_expression(&stmt.condition, None);
                self.check_condition(&condition);
                BoundStmt::DoWhile(BoundWhile {
                    condition,
                    body,
                    span: stmt.span,
                })
            }
            Stmt::Defer(stmt) => {
                self.scope_tags.push(ScopeTag::Defer);
                let body = Box::new(self.bind_statement(&stmt.body));
                self.scope_tags.pop();
                BoundStmt::Defer(BoundDefer {
                    body,
                    span: stmt.span,
                })
            }
            Stmt::Block(block) => {
                self.table.push_scope();
                let statements = block
                    .statements
                    .iter()
                    .map(|stmt| self.bind_statement(stmt))
                    .collect();
                self.table.pop_scope();
                BoundStmt::Block(BoundBlock {
                    statements,
                    span: block.span,
                })
            }
            Stmt::Expression(expr) => {
                let bound = self.bind_expression(expr, None);
                if !bound.is_valid_statement() {
                    self.diagnostics
                        .report(bound.span, &messages::INVALID_STATEMENT, &[]);
                }
                BoundStmt::Expression(bound)
            }
        }
    }

    fn bind_function_decl(&mut self, decl: &FunctionDecl) -> BoundStmt {
        let param_types: Vec<TypeRef> = decl
            .params
            .iter()
            .map(|param| self.bind_type(&param.ty))
            .collect();
        let ret = decl
            .return_type
            .as_ref()
            .map(|ty| self.bind_type(ty))
            .unwrap_or_else(|| self.store.unit.clone());
        let fn_ty = self.store.function_of(param_types.clone(), ret.clone());
        let name = &decl.name.text;

        if let Some(receiver_syntax) = &decl.receiver {
            let receiver_ty = self.bind_type(receiver_syntax);
            let symbol = Symbol::method(self.table.fresh_id(), name, receiver_ty.clone(), fn_ty);
            if self.table.has_method(&receiver_ty, name) {
                self.diagnostics
                    .report(decl.name.span, &messages::ALREADY_EXISTENT_SYMBOL, &[name]);
            } else {
                // Registered before the body binds so the method can
                // call itself.
                self.table.put_method(receiver_ty.clone(), symbol.clone());
            }
            let (receiver, params, body) = self.bind_callable(
                Some(receiver_ty),
                &decl.params,
                param_types,
                &decl.body,
                &ret,
                decl.close_paren_span,
            );
            BoundStmt::Function(BoundFunction {
                symbol,
                receiver,
                params,
                body,
                span: decl.span,
            })
        } else {
            let symbol = Symbol::new(self.table.fresh_id(), name, fn_ty, SymbolKind::Function);
            if self.table.has_symbol(name) {
                self.diagnostics
                    .report(decl.name.span, &messages::ALREADY_EXISTENT_SYMBOL, &[name]);
            } else {
                self.table.put_symbol(symbol.clone());
            }
            let (_, params, body) = self.bind_callable(
                None,
                &decl.params,
                param_types,
                &decl.body,
                &ret,
                decl.close_paren_span,
            );
            BoundStmt::Function(BoundFunction {
                symbol,
                receiver: None,
                params,
                body,
                span: decl.span,
            })
        }
    }

    /// Bind a function, method or function-expression body in a fresh
    /// scope holding the receiver and parameters, then verify its return
    /// paths.
    fn bind_callable(
        &mut self,
        receiver: Option<TypeRef>,
        params: &[Param],
        param_types: Vec<TypeRef>,
        body: &Block,
        ret: &TypeRef,
        close_paren_span: TextSpan,
    ) -> (Option<Rc<Symbol>>, Vec<Rc<Symbol>>, Vec<BoundStmt>) {
        self.table.push_scope();
        self.scope_tags.push(ScopeTag::Function);
        self.return_types.push(ret.clone());

        let receiver_symbol = receiver.map(|ty| {
            let symbol = Symbol::new(self.table.fresh_id(), "self", ty, SymbolKind::Receiver);
            self.table.put_symbol(symbol.clone());
            symbol
        });

        let mut symbols = Vec::with_capacity(params.len());
        for (param, ty) in params.iter().zip(param_types) {
            let symbol = Symbol::new(
                self.table.fresh_id(),
                &param.name.text,
                ty,
                SymbolKind::Parameter,
            );
            if self.table.has_symbol(&param.name.text) {
                self.diagnostics.report(
                    param.name.span,
                    &messages::ALREADY_USED_PARAMETER_NAME,
                    &[&param.name.text],
                );
            } else {
                self.table.put_symbol(symbol.clone());
            }
            symbols.push(symbol);
        }

        let statements: Vec<BoundStmt> = body
            .statements
            .iter()
            .map(|stmt| self.bind_statement(stmt))
            .collect();
        if !self.check_return_paths(&statements, ret) {
            self.diagnostics.report(
                close_paren_span,
                &messages::REQUIRED_RETURN_VALUE,
                &[&ret.to_string()],
            );
        }

        self.return_types.pop();
        self.scope_tags.pop();
        self.table.pop_scope();
        (receiver_symbol, symbols, statements)
    }

    fn bind_record_decl(&mut self, decl: &RecordDecl) -> BoundStmt {
        let name = &decl.name.text;
        let duplicate = self.table.has_record(name);
        if duplicate {
            self.diagnostics
                .report(decl.name.span, &messages::ALREADY_EXISTENT_SYMBOL, &[name]);
        }
        // The type name is registered before the fields bind, so a field
        // may refer to the record itself.
        let ty = self.store.record_of(name, Vec::new());
        if !duplicate {
            self.table.put_type(name.clone(), ty.clone());
        }

        let mut fields: IndexMap<String, TypeRef> = IndexMap::new();
        for field in &decl.fields {
            let field_ty = self.bind_type(&field.ty);
            if fields.contains_key(&field.name.text) {
                self.diagnostics.report(
                    field.name.span,
                    &messages::ALREADY_USED_FIELD_NAME,
                    &[&field.name.text],
                );
            }
            fields.insert(field.name.text.clone(), field_ty);
        }
        if let Type::Record(record) = &*ty {
            *record.fields.borrow_mut() = fields;
        }

        let symbol = Symbol::new(self.table.fresh_id(), name, ty, SymbolKind::Record);
        if !duplicate {
            self.table.put_record(symbol.clone());
        }
        BoundStmt::Record(BoundRecord {
            symbol,
            span: decl.span,
        })
    }

    fn bind_variable_decl(&mut self, decl: &VariableDecl) -> BoundStmt {
        let explicit = decl.ty.as_ref().map(|ty| self.bind_type(ty));
        let value = self.bind_expression(&decl.value, explicit.as_ref());
        let ty = explicit.unwrap_or_else(|| value.ty.clone());

        if value.ty.is_nothing() {
            self.diagnostics.report(
                decl.keyword_span.union(&decl.equal_span),
                &messages::UNREACHED_STATEMENT,
                &[],
            );
        } else if !value.ty.assignable_to(&ty) {
            self.diagnostics.report(
                value.span,
                &messages::WRONG_ASSIGNMENT,
                &[&value.ty.to_string(), &decl.name.text],
            );
        }

        let duplicate = self.table.has_symbol(&decl.name.text);
        if duplicate {
            self.diagnostics.report(
                decl.name.span,
                &messages::ALREADY_EXISTENT_SYMBOL,
                &[&decl.name.text],
            );
        }
        let symbol = Symbol::new(
            self.table.fresh_id(),
            &decl.name.text,
            ty,
            SymbolKind::Variable {
                read_only: decl.read_only,
            },
        );
        if !duplicate {
            self.table.put_symbol(symbol.clone());
        }
        BoundStmt::Variable(BoundVariable {
            symbol,
            value,
            span: decl.span,
        })
    }

    fn check_condition(&mut self, condition: &BoundExpr) {
        if !condition.ty.is_error() && *condition.ty != Type::Boolean {
            self.diagnostics
                .report(condition.span, &messages::INVALID_CONDITION, &[]);
        }
    }

    // --------------------------------------------------------------------
    // Expressions
    // --------------------------------------------------------------------

    fn bind_expression(&mut self, expr: &Expr, expected: Option<&TypeRef>) -> BoundExpr {
        match expr {
            Expr::Literal(lit) => self.bind_literal(&lit.token),
            Expr::Variable(var) => self.bind_variable_expr(&var.name),
            Expr::SelfExpr(expr) => match self.table.get_symbol("self") {
                Some(symbol) => {
                    let ty = symbol.ty.clone();
                    BoundExpr::new(BoundExprKind::Variable(symbol), ty, expr.span)
                }
                None => {
                    self.diagnostics
                        .report(expr.span, &messages::SELF_REFERENCE_NOT_FOUND, &[]);
                    BoundExpr::error(self.store.error.clone(), expr.span)
                }
            },
            Expr::NoneLiteral(expr) => {
                BoundExpr::new(BoundExprKind::None, self.store.none.clone(), expr.span)
            }
            Expr::Unary(unary) => {
                let operand = self.bind_expression(&unary.operand, None);
                if operand.ty.is_error() {
                    return BoundExpr::error(self.store.error.clone(), unary.span);
                }
                match resolve_unary(unary.operator.kind, &operand.ty) {
                    Some((op, ty)) => BoundExpr::new(
                        BoundExprKind::Unary {
                            op,
                            operand: Box::new(operand),
                        },
                        ty,
                        unary.span,
                    ),
                    None => {
                        self.diagnostics.report(
                            unary.operator.span,
                            &messages::INVALID_UNARY_OPERATION,
                            &[unary.operator.kind.description(), &operand.ty.to_string()],
                        );
                        BoundExpr::error(self.store.error.clone(), unary.span)
                    }
                }
            }
            Expr::Binary(binary) => {
                let left = self.bind_expression(&binary.left, None);
                let right = self.bind_expression(&binary.right, None);
                if left.ty.is_error() || right.ty.is_error() {
                    return BoundExpr::error(self.store.error.clone(), binary.span);
                }
                match resolve_binary(binary.operator.kind, &left.ty, &right.ty, &self.store) {
                    Some((op, ty)) => BoundExpr::new(
                        BoundExprKind::Binary {
                            op,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        ty,
                        binary.span,
                    ),
                    None => {
                        self.diagnostics.report(
                            binary.operator.span,
                            &messages::INVALID_BINARY_OPERATION,
                            &[
                                binary.operator.kind.description(),
                                &left.ty.to_string(),
                                &right.ty.to_string(),
                            ],
                        );
                        BoundExpr::error(self.store.error.clone(), binary.span)
                    }
                }
            }
            Expr::Ternary(ternary) => {
                let condition = self.bind_expression(&ternary.condition, expected);
                let then_expr = self.bind_expression(&ternary.then_expr, expected);
                let else_expr = self.bind_expression(&ternary.else_expr, expected);
                let ty = if then_expr.ty == else_expr.ty {
                    then_expr.ty.clone()
                } else if then_expr.ty.is_noneable() || else_expr.ty.is_noneable() {
                    self.store.any_none.clone()
                } else {
                    self.store.any.clone()
                };
                BoundExpr::new(
                    BoundExprKind::Ternary {
                        condition: Box::new(condition),
                        then_expr: Box::new(then_expr),
                        else_expr: Box::new(else_expr),
                    },
                    ty,
                    ternary.span,
                )
            }
            Expr::Assignment(assign) => self.bind_assignment(assign),
            Expr::Call(call) => {
                let target = self.bind_expression(&call.target, expected);
                let target_ty = target.ty.clone();
                match &*target_ty {
                    Type::Function(params, ret) => {
                        let arguments =
                            self.bind_arguments(&call.arguments, params, call.args_span);
                        let ty = if self.report_unreached_around_nothing(&arguments, call.span) {
                            self.store.nothing.clone()
                        } else {
                            ret.clone()
                        };
                        BoundExpr::new(
                            BoundExprKind::Call {
                                target: Box::new(target),
                                arguments,
                            },
                            ty,
                            call.span,
                        )
                    }
                    Type::Error => {
                        for argument in &call.arguments {
                            self.bind_expression(argument, None);
                        }
                        BoundExpr::error(self.store.error.clone(), call.span)
                    }
                    _ => {
                        for argument in &call.arguments {
                            self.bind_expression(argument, None);
                        }
                        self.diagnostics
                            .report(target.span, &messages::INVALID_CALLING_TARGET, &[]);
                        BoundExpr::error(self.store.error.clone(), call.span)
                    }
                }
            }
            Expr::Index(index) => self.bind_index(index),
            Expr::Get(get) => {
                let target = self.bind_expression(&get.target, None);
                self.bind_get(target, &get.name, get.span, true)
                    .unwrap_or_else(|| BoundExpr::error(self.store.error.clone(), get.span))
            }
            Expr::Cast(cast) => {
                let value = self.bind_expression(&cast.expr, None);
                let target = self.bind_type(&cast.ty);
                if !value.ty.castable_to(&target) {
                    self.diagnostics
                        .report(cast.span, &messages::IMPOSSIBLE_CAST, &[]);
                }
                BoundExpr::new(
                    BoundExprKind::Cast {
                        value: Box::new(value),
                    },
                    target,
                    cast.span,
                )
            }
            Expr::List(list) => {
                let expected_elem = expected.and_then(|ty| match &**ty {
                    Type::List(elem) => Some(elem.clone()),
                    _ => None,
                });
                let elements: Vec<BoundExpr> = list
                    .elements
                    .iter()
                    .map(|element| self.bind_expression(element, expected_elem.as_ref()))
                    .collect();
                let elem = self.element_type(&elements, expected_elem, list.span);
                let ty = self.store.list_of(&elem);
                BoundExpr::new(BoundExprKind::List(elements), ty, list.span)
            }
            Expr::Brace(brace) => self.bind_brace(&brace.literal, brace.span, expected),
            Expr::Tuple(tuple) => {
                let expected_members = match expected.map(|ty| &**ty) {
                    Some(Type::Tuple(members)) if members.len() == tuple.elements.len() => {
                        Some(members.clone())
                    }
                    _ => None,
                };
                let elements: Vec<BoundExpr> = tuple
                    .elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| {
                        self.bind_expression(
                            element,
                            expected_members.as_ref().map(|members| &members[i]),
                        )
                    })
                    .collect();
                let ty = self
                    .store
                    .tuple_of(elements.iter().map(|element| element.ty.clone()).collect());
                BoundExpr::new(BoundExprKind::Tuple(elements), ty, tuple.span)
            }
            Expr::Paren(paren) => {
                let inner = self.bind_expression(&paren.inner, expected);
                let ty = inner.ty.clone();
                BoundExpr::new(BoundExprKind::Paren(Box::new(inner)), ty, paren.span)
            }
            Expr::FunctionExpr(decl) => {
                let param_types: Vec<TypeRef> = decl
                    .params
                    .iter()
                    .map(|param| self.bind_type(&param.ty))
                    .collect();
                let ret = decl
                    .return_type
                    .as_ref()
                    .map(|ty| self.bind_type(ty))
                    .unwrap_or_else(|| self.store.unit.clone());
                let fn_ty = self.store.function_of(param_types.clone(), ret.clone());
                let (_, params, body) = self.bind_callable(
                    None,
                    &decl.params,
                    param_types,
                    &decl.body,
                    &ret,
                    decl.close_paren_span,
                );
                BoundExpr::new(
                    BoundExprKind::FunctionExpr { params, body },
                    fn_ty,
                    decl.span,
                )
            }
            Expr::RecordInit(init) => {
                let Some(symbol) = self.table.get_record(&init.name.text) else {
                    self.diagnostics.report(
                        init.name.span,
                        &messages::UNKNOWN_SYMBOL,
                        &[&init.name.text],
                    );
                    for argument in &init.arguments {
                        self.bind_expression(argument, None);
                    }
                    return BoundExpr::error(self.store.error.clone(), init.span);
                };
                let field_types: Vec<TypeRef> = match &*symbol.ty {
                    Type::Record(record) => record.fields.borrow().values().cloned().collect(),
                    _ => Vec::new(),
                };
                let arguments =
                    self.bind_arguments(&init.arguments, &field_types, init.args_span);
                let ty = if self.report_unreached_around_nothing(&arguments, init.span) {
                    self.store.nothing.clone()
                } else {
                    symbol.ty.clone()
                };
                BoundExpr::new(
                    BoundExprKind::RecordInit {
                        record: symbol,
                        arguments,
                    },
                    ty,
                    init.span,
                )
            }
            Expr::Return(ret) => {
                if self.scope_tags.contains(&ScopeTag::Function)
                    && self.scope_tags.last() == Some(&ScopeTag::Defer)
                {
                    self.diagnostics.report(
                        ret.keyword_span,
                        &messages::JUMP_THROUGH_DEFER,
                        &["return"],
                    );
                }
                let expected_ret = self
                    .return_types
                    .last()
                    .cloned()
                    .unwrap_or_else(|| self.store.unit.clone());
                let value = ret
                    .value
                    .as_ref()
                    .map(|value| Box::new(self.bind_expression(value, Some(&expected_ret))));
                BoundExpr::new(
                    BoundExprKind::Return(value),
                    self.store.nothing.clone(),
                    ret.span,
                )
            }
            Expr::Panic(panic) => {
                let message = self.bind_expression(&panic.message, None);
                if !message.ty.is_error() && *message.ty != Type::String {
                    self.diagnostics.report(
                        message.span,
                        &messages::INVALID_PANIC_MESSAGE_TYPE,
                        &[],
                    );
                }
                BoundExpr::new(
                    BoundExprKind::Panic(Box::new(message)),
                    self.store.nothing.clone(),
                    panic.span,
                )
            }
            Expr::Try(try_expr) => {
                let inner = self.bind_expression(&try_expr.expr, None);
                if inner.ty.is_nothing() {
                    self.diagnostics.report(
                        try_expr.keyword_span,
                        &messages::UNREACHED_STATEMENT,
                        &[],
                    );
                    return BoundExpr::new(
                        BoundExprKind::Try(Box::new(inner)),
                        self.store.nothing.clone(),
                        try_expr.span,
                    );
                }
                let ty = self.store.optional_of(inner.ty.clone());
                BoundExpr::new(BoundExprKind::Try(Box::new(inner)), ty, try_expr.span)
            }
            Expr::Break(expr) => {
                self.check_jump("break", expr.span);
                BoundExpr::new(BoundExprKind::Break, self.store.nothing.clone(), expr.span)
            }
            Expr::Continue(expr) => {
                self.check_jump("continue", expr.span);
                BoundExpr::new(
                    BoundExprKind::Continue,
                    self.store.nothing.clone(),
                    expr.span,
                )
            }
        }
    }

    fn bind_literal(&mut self, token: &Token) -> BoundExpr {
        let (constant, ty) = match (token.kind, &token.value) {
            (TokenKind::True, _) => (Constant::Boolean(true), self.store.boolean.clone()),
            (TokenKind::False, _) => (Constant::Boolean(false), self.store.boolean.clone()),
            (_, TokenValue::Int(value)) => (Constant::Int(*value), self.store.int.clone()),
            (_, TokenValue::Long(value)) => (Constant::Long(*value), self.store.long.clone()),
            (_, TokenValue::Float(value)) => (Constant::Float(*value), self.store.float.clone()),
            (_, TokenValue::Double(value)) => {
                (Constant::Double(*value), self.store.double.clone())
            }
            (_, TokenValue::String(value)) => {
                (Constant::String(value.clone()), self.store.string.clone())
            }
            (_, TokenValue::Char(value)) => {
                (Constant::Char(*value), self.store.char_type.clone())
            }
            _ => return BoundExpr::error(self.store.error.clone(), token.span),
        };
        BoundExpr::new(BoundExprKind::Literal(constant), ty, token.span)
    }

    fn bind_variable_expr(&mut self, name: &Token) -> BoundExpr {
        // A recovery placeholder; the parser already reported.
        if name.text.is_empty() {
            return BoundExpr::error(self.store.error.clone(), name.span);
        }
        // Inside a method an unqualified name may be a member of the
        // receiver; the implicit self wins over enclosing bindings.
        if let Some(receiver) = self.table.get_symbol("self") {
            let ty = receiver.ty.clone();
            let self_node = BoundExpr::new(BoundExprKind::Variable(receiver), ty, name.span);
            if let Some(bound) = self.bind_get(self_node, name, name.span, false) {
                return bound;
            }
        }
        match self.table.get_symbol(&name.text) {
            Some(symbol) => {
                let ty = symbol.ty.clone();
                BoundExpr::new(BoundExprKind::Variable(symbol), ty, name.span)
            }
            None => {
                self.diagnostics
                    .report(name.span, &messages::UNKNOWN_SYMBOL, &[&name.text]);
                BoundExpr::error(self.store.error.clone(), name.span)
            }
        }
    }

    /// Resolve `target.name` to a field access or a method reference.
    /// Returns None only when `report_absence` is false and nothing
    /// matched, so the caller can fall back to another namespace.
    fn bind_get(
        &mut self,
        target: BoundExpr,
        name: &Token,
        span: TextSpan,
        report_absence: bool,
    ) -> Option<BoundExpr> {
        let target_ty = target.ty.clone();
        if target_ty.is_error() {
            return Some(BoundExpr::error(self.store.error.clone(), span));
        }
        if let Type::Record(record) = &*target_ty {
            let field_ty = record.fields.borrow().get(&name.text).cloned();
            if let Some(field_ty) = field_ty {
                return Some(BoundExpr::new(
                    BoundExprKind::GetField {
                        target: Box::new(target),
                        field: name.text.clone(),
                    },
                    field_ty,
                    span,
                ));
            }
        }
        let candidates = self.table.get_methods(&target_ty, &name.text);
        let method = match candidates.len() {
            0 => {
                if report_absence {
                    self.diagnostics
                        .report(name.span, &messages::UNKNOWN_SYMBOL, &[&name.text]);
                    return Some(BoundExpr::error(self.store.error.clone(), span));
                }
                return None;
            }
            1 => candidates[0].1.clone(),
            _ => {
                // Several receivers admit this value; an exact match on
                // the declared receiver type breaks the tie.
                let exact = candidates
                    .iter()
                    .find(|(declared, _)| **declared == *target_ty);
                match exact {
                    Some((_, method)) => method.clone(),
                    None => {
                        let mut list = String::new();
                        for (declared, method) in &candidates {
                            if let Type::Function(params, ret) = &*method.ty {
                                let params = params
                                    .iter()
                                    .map(ToString::to_string)
                                    .collect::<Vec<_>>()
                                    .join(", ");
                                list.push_str(&format!(
                                    "\n\t- fun ({}).{}({}): {}",
                                    declared, name.text, params, ret
                                ));
                            }
                        }
                        self.diagnostics.report(
                            name.span,
                            &messages::OVERLOAD_RESOLUTION_AMBIGUITY,
                            &[&list],
                        );
                        return Some(BoundExpr::error(self.store.error.clone(), span));
                    }
                }
            }
        };
        let ty = method.ty.clone();
        Some(BoundExpr::new(
            BoundExprKind::GetMethod {
                target: Box::new(target),
                method,
            },
            ty,
            span,
        ))
    }

    fn bind_index(&mut self, index_expr: &rill_ast::tree::IndexExpr) -> BoundExpr {
        let target = self.bind_expression(&index_expr.target, None);
        let target_ty = target.ty.clone();
        let (index, ty) = match &*target_ty {
            Type::String => {
                let int = self.store.int.clone();
                let index = self.bind_expression(&index_expr.index, Some(&int));
                self.check_index(&index, &int);
                (index, self.store.char_type.clone())
            }
            Type::List(elem) => {
                let int = self.store.int.clone();
                let index = self.bind_expression(&index_expr.index, Some(&int));
                self.check_index(&index, &int);
                (index, elem.clone())
            }
            Type::Map(key, value) => {
                let index = self.bind_expression(&index_expr.index, Some(key));
                self.check_index(&index, key);
                // A key may be absent, so lookups produce `V | None`.
                (index, self.store.optional_of(value.clone()))
            }
            Type::Tuple(members) => {
                let index = self.bind_expression(&index_expr.index, None);
                let ty = match &*index_expr.index {
                    Expr::Literal(lit) => match lit.token.value {
                        TokenValue::Int(position) => {
                            if position >= 0 && (position as usize) < members.len() {
                                members[position as usize].clone()
                            } else {
                                self.diagnostics.report(
                                    index.span,
                                    &messages::INDEX_OUT_OF_BOUNDS,
                                    &[],
                                );
                                self.store.error.clone()
                            }
                        }
                        _ => {
                            self.diagnostics.report(
                                index.span,
                                &messages::WRONG_TUPLE_INDEX_FORMAT,
                                &[],
                            );
                            self.store.error.clone()
                        }
                    },
                    _ => {
                        self.diagnostics.report(
                            index.span,
                            &messages::WRONG_TUPLE_INDEX_FORMAT,
                            &[],
                        );
                        self.store.error.clone()
                    }
                };
                (index, ty)
            }
            Type::Error => {
                let index = self.bind_expression(&index_expr.index, None);
                (index, self.store.error.clone())
            }
            _ => {
                let index = self.bind_expression(&index_expr.index, None);
                self.diagnostics
                    .report(target.span, &messages::INVALID_INDEXED_TARGET, &[]);
                (index, self.store.error.clone())
            }
        };
        BoundExpr::new(
            BoundExprKind::Indexed {
                target: Box::new(target),
                index: Box::new(index),
            },
            ty,
            index_expr.span,
        )
    }

    fn check_index(&mut self, index: &BoundExpr, expected: &TypeRef) {
        if !index.ty.assignable_to(expected) {
            self.diagnostics.report(
                index.span,
                &messages::WRONG_INDEX_TYPE,
                &[&expected.to_string()],
            );
        }
    }

    fn bind_assignment(&mut self, assign: &AssignmentExpr) -> BoundExpr {
        match &*assign.target {
            Expr::Variable(var) => {
                let Some(symbol) = self.table.get_symbol(&var.name.text) else {
                    if !var.name.text.is_empty() {
                        self.diagnostics.report(
                            var.name.span,
                            &messages::UNKNOWN_SYMBOL,
                            &[&var.name.text],
                        );
                    }
                    self.bind_expression(&assign.value, None);
                    return BoundExpr::error(self.store.error.clone(), assign.span);
                };
                if !symbol.is_assignable_variable() {
                    self.diagnostics.report(
                        var.name.span,
                        &messages::INVALID_ASSIGNMENT_TARGET,
                        &[],
                    );
                    self.bind_expression(&assign.value, None);
                    return BoundExpr::error(self.store.error.clone(), assign.span);
                }
                if symbol.is_read_only() {
                    self.diagnostics.report(
                        var.name.span,
                        &messages::FINAL_SYMBOL,
                        &[&var.name.text],
                    );
                }
                let value = self.bind_expression(&assign.value, Some(&symbol.ty));
                if !value.ty.assignable_to(&symbol.ty) {
                    self.diagnostics.report(
                        value.span,
                        &messages::WRONG_ASSIGNMENT,
                        &[&value.ty.to_string(), &var.name.text],
                    );
                }
                BoundExpr::new(
                    BoundExprKind::Assignment {
                        symbol,
                        value: Box::new(value),
                    },
                    self.store.unit.clone(),
                    assign.span,
                )
            }
            Expr::Index(index_expr) => {
                let target = self.bind_expression(&index_expr.target, None);
                let target_ty = target.ty.clone();
                match &*target_ty {
                    Type::List(elem) => {
                        let int = self.store.int.clone();
                        let index = self.bind_expression(&index_expr.index, Some(&int));
                        self.check_index(&index, &int);
                        let value = self.bind_set_value(&assign.value, elem);
                        self.set_indexed(target, index, value, assign.span)
                    }
                    Type::Map(key, map_value) => {
                        let index = self.bind_expression(&index_expr.index, Some(key));
                        self.check_index(&index, key);
                        let value = self.bind_set_value(&assign.value, map_value);
                        self.set_indexed(target, index, value, assign.span)
                    }
                    Type::Error => {
                        self.bind_expression(&index_expr.index, None);
                        self.bind_expression(&assign.value, None);
                        BoundExpr::error(self.store.error.clone(), assign.span)
                    }
                    _ => {
                        self.bind_expression(&index_expr.index, None);
                        self.bind_expression(&assign.value, None);
                        self.diagnostics.report(
                            target.span,
                            &messages::INVALID_ASSIGNMENT_TARGET,
                            &[],
                        );
                        BoundExpr::error(self.store.error.clone(), assign.span)
                    }
                }
            }
            Expr::Get(get) => {
                let target = self.bind_expression(&get.target, None);
                let target_ty = target.ty.clone();
                if let Type::Record(record) = &*target_ty {
                    let field_ty = record.fields.borrow().get(&get.name.text).cloned();
                    match field_ty {
                        Some(field_ty) => {
                            let value = self.bind_expression(&assign.value, Some(&field_ty));
                            if !value.ty.assignable_to(&field_ty) {
                                self.diagnostics.report(
                                    value.span,
                                    &messages::WRONG_ASSIGNMENT,
                                    &[&value.ty.to_string(), &get.name.text],
                                );
                            }
                            BoundExpr::new(
                                BoundExprKind::SetField {
                                    target: Box::new(target),
                                    field: get.name.text.clone(),
                                    value: Box::new(value),
                                },
                                self.store.unit.clone(),
                                assign.span,
                            )
                        }
                        None => {
                            self.diagnostics.report(
                                get.name.span,
                                &messages::UNKNOWN_SYMBOL,
                                &[&get.name.text],
                            );
                            self.bind_expression(&assign.value, None);
                            BoundExpr::error(self.store.error.clone(), assign.span)
                        }
                    }
                } else if target_ty.is_error() {
                    self.bind_expression(&assign.value, None);
                    BoundExpr::error(self.store.error.clone(), assign.span)
                } else {
                    self.bind_expression(&assign.value, None);
                    self.diagnostics.report(
                        target.span,
                        &messages::INVALID_ASSIGNMENT_TARGET,
                        &[],
                    );
                    BoundExpr::error(self.store.error.clone(), assign.span)
                }
            }
            other => {
                let target = self.bind_expression(other, None);
                self.bind_expression(&assign.value, None);
                if !target.ty.is_error() {
                    self.diagnostics.report(
                        target.span,
                        &messages::INVALID_ASSIGNMENT_TARGET,
                        &[],
                    );
                }
                BoundExpr::error(self.store.error.clone(), assign.span)
            }
        }
    }

    fn bind_set_value(&mut self, value: &Expr, expected: &TypeRef) -> BoundExpr {
        let value = self.bind_expression(value, Some(expected));
        if !value.ty.assignable_to(expected) {
            self.diagnostics.report(
                value.span,
                &messages::WRONG_ASSIGNMENT,
                &[&value.ty.to_string(), &expected.to_string()],
            );
        }
        value
    }

    fn set_indexed(
        &mut self,
        target: BoundExpr,
        index: BoundExpr,
        value: BoundExpr,
        span: TextSpan,
    ) -> BoundExpr {
        BoundExpr::new(
            BoundExprKind::SetIndexed {
                target: Box::new(target),
                index: Box::new(index),
                value: Box::new(value),
            },
            self.store.unit.clone(),
            span,
        )
    }

    fn bind_brace(
        &mut self,
        literal: &BraceLiteral,
        span: TextSpan,
        expected: Option<&TypeRef>,
    ) -> BoundExpr {
        match literal {
            BraceLiteral::Set(elements) => {
                let expected_elem = expected.and_then(|ty| match &**ty {
                    Type::Set(elem) => Some(elem.clone()),
                    _ => None,
                });
                let elements: Vec<BoundExpr> = elements
                    .iter()
                    .map(|element| self.bind_expression(element, expected_elem.as_ref()))
                    .collect();
                let elem = self.element_type(&elements, expected_elem, span);
                let ty = self.store.set_of(&elem);
                BoundExpr::new(BoundExprKind::SetLiteral(elements), ty, span)
            }
            BraceLiteral::Map(pairs) => {
                let (expected_key, expected_value) = match expected.map(|ty| &**ty) {
                    Some(Type::Map(key, value)) => (Some(key.clone()), Some(value.clone())),
                    _ => (None, None),
                };
                let mut keys = Vec::with_capacity(pairs.len());
                let mut values = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    keys.push(self.bind_expression(key, expected_key.as_ref()));
                    values.push(self.bind_expression(value, expected_value.as_ref()));
                }
                let key_ty = self.element_type(&keys, expected_key, span);
                let value_ty = self.element_type(&values, expected_value, span);
                let ty = self.store.map_of(key_ty, value_ty);
                let entries = keys.into_iter().zip(values).collect();
                BoundExpr::new(BoundExprKind::MapLiteral(entries), ty, span)
            }
            BraceLiteral::Empty => match expected.map(|ty| &**ty) {
                Some(Type::Set(_)) => BoundExpr::new(
                    BoundExprKind::SetLiteral(Vec::new()),
                    expected.cloned().unwrap_or_else(|| self.store.error.clone()),
                    span,
                ),
                Some(Type::Map(_, _)) => BoundExpr::new(
                    BoundExprKind::MapLiteral(Vec::new()),
                    expected.cloned().unwrap_or_else(|| self.store.error.clone()),
                    span,
                ),
                _ => {
                    self.diagnostics
                        .report(span, &messages::CANNOT_INFER_TYPE, &[]);
                    BoundExpr::error(self.store.error.clone(), span)
                }
            },
        }
    }

    /// The element type of a collection literal. With an expected type
    /// the elements are checked against it; otherwise the first element
    /// decides if everything agrees, falling back to the widest type.
    fn element_type(
        &mut self,
        elements: &[BoundExpr],
        expected: Option<TypeRef>,
        span: TextSpan,
    ) -> TypeRef {
        if let Some(expected) = expected {
            for element in elements {
                if !element.ty.assignable_to(&expected) {
                    self.diagnostics.report(
                        element.span,
                        &messages::UNEXPECTED_VALUE_TYPE,
                        &[&expected.to_string(), &element.ty.to_string()],
                    );
                }
            }
            return expected;
        }
        if elements.is_empty() {
            self.diagnostics
                .report(span, &messages::CANNOT_INFER_TYPE, &[]);
            return self.store.error.clone();
        }
        let first = elements[0].ty.clone();
        if elements.iter().all(|element| element.ty.assignable_to(&first)) {
            first
        } else if elements.iter().any(|element| element.ty.is_noneable()) {
            self.store.any_none.clone()
        } else {
            self.store.any.clone()
        }
    }

    fn bind_arguments(
        &mut self,
        arguments: &[Expr],
        params: &[TypeRef],
        args_span: TextSpan,
    ) -> Vec<BoundExpr> {
        if arguments.len() != params.len() {
            self.diagnostics.report(
                args_span,
                &messages::UNEXPECTED_ARGUMENTS_SIZE,
                &[&params.len().to_string(), &arguments.len().to_string()],
            );
            return arguments
                .iter()
                .map(|argument| self.bind_expression(argument, None))
                .collect();
        }
        arguments
            .iter()
            .zip(params)
            .map(|(argument, param)| {
                let bound = self.bind_expression(argument, Some(param));
                if !bound.ty.assignable_to(param) {
                    self.diagnostics.report(
                        bound.span,
                        &messages::UNEXPECTED_ARGUMENT_TYPE,
                        &[&param.to_string(), &bound.ty.to_string()],
                    );
                }
                bound
            })
            .collect()
    }

    /// A Nothing-typed argument never produces a value, so everything
    /// around it in the call is unreachable. Reports flag the stretches
    /// before and after the diverging argument.
    fn report_unreached_around_nothing(
        &mut self,
        arguments: &[BoundExpr],
        span: TextSpan,
    ) -> bool {
        let Some(argument) = arguments.iter().find(|argument| argument.ty.is_nothing()) else {
            return false;
        };
        self.diagnostics.report(
            TextSpan::from_bounds(span.start, argument.span.start),
            &messages::UNREACHED_STATEMENT,
            &[],
        );
        self.diagnostics.report(
            TextSpan::from_bounds(argument.span.end(), span.end()),
            &messages::UNREACHED_STATEMENT,
            &[],
        );
        true
    }

    fn check_jump(&mut self, keyword: &str, span: TextSpan) {
        if self.scope_tags.contains(&ScopeTag::Loop) {
            match self.scope_tags.last() {
                Some(ScopeTag::Function) => {
                    self.diagnostics
                        .report(span, &messages::JUMP_THROUGH_FUNCTION, &[keyword]);
                }
                Some(ScopeTag::Defer) => {
                    self.diagnostics
                        .report(span, &messages::JUMP_THROUGH_DEFER, &[keyword]);
                }
                _ => {}
            }
        } else {
            self.diagnostics
                .report(span, &messages::OUT_OF_LOOP_JUMP, &[keyword]);
        }
    }

    // --------------------------------------------------------------------
    // Type annotations
    // --------------------------------------------------------------------

    fn bind_type(&mut self, syntax: &TypeSyntax) -> TypeRef {
        match syntax {
            TypeSyntax::Normal(token) => {
                // Recovery placeholder; the parser already reported.
                if token.text.is_empty() {
                    return self.store.error.clone();
                }
                match self.table.get_type(&token.text) {
                    Some(ty) => ty,
                    None => {
                        self.diagnostics.report(
                            token.span,
                            &messages::UNDEFINED_TYPE,
                            &[&token.text],
                        );
                        self.store.error.clone()
                    }
                }
            }
            TypeSyntax::List(inner, _) => {
                let elem = self.bind_type(inner);
                self.store.list_of(&elem)
            }
            TypeSyntax::Set(inner, _) => {
                let elem = self.bind_type(inner);
                self.store.set_of(&elem)
            }
            TypeSyntax::Map(key, value, _) => {
                let key = self.bind_type(key);
                let value = self.bind_type(value);
                self.store.map_of(key, value)
            }
            TypeSyntax::Tuple(members, _) => {
                let members = members.iter().map(|member| self.bind_type(member)).collect();
                self.store.tuple_of(members)
            }
            TypeSyntax::Function(params, ret, _) => {
                let params = params.iter().map(|param| self.bind_type(param)).collect();
                let ret = self.bind_type(ret);
                self.store.function_of(params, ret)
            }
            TypeSyntax::Union(members, _) => {
                let members = members.iter().map(|member| self.bind_type(member)).collect();
                self.store.union_of(members)
            }
            TypeSyntax::Paren(inner, _) => self.bind_type(inner),
        }
    }

    // --------------------------------------------------------------------
    // Return paths and reachability
    // --------------------------------------------------------------------

    /// Whether every path through `statements` produces a value, or the
    /// return type does not require one. Reports unreachable statements
    /// along the way.
    fn check_return_paths(&mut self, statements: &[BoundStmt], ret: &TypeRef) -> bool {
        self.check_statement_list(statements, ret) || ret.is_error() || **ret == Type::Unit
    }

    fn check_statement_list(&mut self, statements: &[BoundStmt], ret: &TypeRef) -> bool {
        let mut iter = statements.iter();
        while let Some(stmt) = iter.next() {
            if self.check_statement(stmt, ret) {
                for unreached in iter.by_ref() {
                    // Still walked, so nested bodies report their own
                    // problems before the statement itself is flagged.
                    self.check_statement(unreached, ret);
                    self.diagnostics.report(
                        unreached.span(),
                        &messages::UNREACHED_STATEMENT,
                        &[],
                    );
                }
                return true;
            }
        }
        false
    }

    /// Whether this statement diverges, meaning control never reaches
    /// whatever follows it.
    fn check_statement(&mut self, stmt: &BoundStmt, ret: &TypeRef) -> bool {
        match stmt {
            BoundStmt::Expression(expr) => self.check_expression(expr, ret),
            BoundStmt::Variable(decl) => decl.value.ty.is_nothing(),
            BoundStmt::Block(block) => self.check_statement_list(&block.statements, ret),
            BoundStmt::If(stmt) => match &stmt.else_branch {
                Some(else_branch) => {
                    // Bitwise and: both branches must be walked.
                    self.check_statement(&stmt.then_branch, ret)
                        & self.check_statement(else_branch, ret)
                }
                None => {
                    self.check_statement(&stmt.then_branch, ret);
                    false
                }
            },
            BoundStmt::While(stmt) | BoundStmt::DoWhile(stmt) => {
                self.check_statement(&stmt.body, ret);
                false
            }
            BoundStmt::Defer(stmt) => {
                self.check_statement(&stmt.body, ret);
                false
            }
            // Nested bodies already ran their own return-path check.
            BoundStmt::Function(_) | BoundStmt::Record(_) => false,
        }
    }

    fn check_expression(&mut self, expr: &BoundExpr, ret: &TypeRef) -> bool {
        match &expr.kind {
            BoundExprKind::Return(value) => {
                match value {
                    Some(value) => {
                        if !value.ty.assignable_to(ret) {
                            self.diagnostics.report(
                                expr.span,
                                &messages::WRONG_RETURN_VALUE_TYPE,
                                &[&value.ty.to_string(), &ret.to_string()],
                            );
                        }
                    }
                    None => {
                        if !ret.is_error() && **ret != Type::Unit {
                            self.diagnostics.report(
                                expr.span,
                                &messages::MISSING_RETURN_VALUE,
                                &[&ret.to_string()],
                            );
                        }
                    }
                }
                true
            }
            BoundExprKind::Call { arguments, .. }
            | BoundExprKind::RecordInit { arguments, .. } => arguments
                .iter()
                .any(|argument| argument.ty.is_nothing() || self.check_expression(argument, ret)),
            BoundExprKind::Assignment { value, .. }
            | BoundExprKind::SetIndexed { value, .. }
            | BoundExprKind::SetField { value, .. } => value.ty.is_nothing(),
            BoundExprKind::Try(inner) => inner.ty.is_nothing(),
            _ => expr.ty.is_nothing(),
        }
    }
}
