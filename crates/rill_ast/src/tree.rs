//! The untyped syntax tree produced by the parser.
//!
//! Every node carries the spans the binder needs for diagnostics: besides
//! the node's own span, a few nodes keep the span of an individual token
//! (the `=` of a declaration, the closing `)` of a function body) because
//! specific diagnostics point at exactly those tokens.

use crate::token::Token;
use rill_core::text::TextSpan;

/// A whole source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Function(FunctionDecl),
    Record(RecordDecl),
    Variable(VariableDecl),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    Defer(DeferStmt),
    Block(Block),
    Expression(Expr),
}

impl Stmt {
    pub fn span(&self) -> TextSpan {
        match self {
            Stmt::Function(decl) => decl.span,
            Stmt::Record(decl) => decl.span,
            Stmt::Variable(decl) => decl.span,
            Stmt::If(stmt) => stmt.span,
            Stmt::While(stmt) => stmt.span,
            Stmt::DoWhile(stmt) => stmt.span,
            Stmt::Defer(stmt) => stmt.span,
            Stmt::Block(block) => block.span,
            Stmt::Expression(expr) => expr.span(),
        }
    }
}

/// `fun name(params): T { ... }` or `fun (Receiver).name(params): T { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub receiver: Option<TypeSyntax>,
    pub name: Token,
    pub params: Vec<Param>,
    pub return_type: Option<TypeSyntax>,
    pub body: Block,
    /// Span of the parameter list's closing `)`, where a missing-return
    /// diagnostic points.
    pub close_paren_span: TextSpan,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Token,
    pub ty: TypeSyntax,
}

/// `record Name(field: T, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    pub name: Token,
    pub fields: Vec<Param>,
    pub span: TextSpan,
}

/// `let name: T = value` or `def name: T = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    /// Span of the `let`/`def` keyword.
    pub keyword_span: TextSpan,
    /// `def` bindings are read-only.
    pub read_only: bool,
    pub name: Token,
    pub ty: Option<TypeSyntax>,
    pub equal_span: TextSpan,
    pub value: Expr,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub condition: Expr,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferStmt {
    pub body: Box<Stmt>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: TextSpan,
}

/// A `{ ... }` literal. Whether it is a map or a set is decided by the
/// first `:`; an empty `{}` stays unresolved until the binder sees the
/// expected type.
#[derive(Debug, Clone, PartialEq)]
pub enum BraceLiteral {
    Map(Vec<(Expr, Expr)>),
    Set(Vec<Expr>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Variable(VariableExpr),
    SelfExpr(SelfExpr),
    NoneLiteral(NoneExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Ternary(TernaryExpr),
    Assignment(AssignmentExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Get(GetExpr),
    Cast(CastExpr),
    List(ListExpr),
    Brace(BraceExpr),
    Tuple(TupleExpr),
    Paren(ParenExpr),
    FunctionExpr(FunctionExpr),
    RecordInit(RecordInitExpr),
    Return(ReturnExpr),
    Panic(PanicExpr),
    Try(TryExpr),
    Break(BreakExpr),
    Continue(ContinueExpr),
}

impl Expr {
    pub fn span(&self) -> TextSpan {
        match self {
            Expr::Literal(e) => e.token.span,
            Expr::Variable(e) => e.name.span,
            Expr::SelfExpr(e) => e.span,
            Expr::NoneLiteral(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Ternary(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Get(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::List(e) => e.span,
            Expr::Brace(e) => e.span,
            Expr::Tuple(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::FunctionExpr(e) => e.span,
            Expr::RecordInit(e) => e.span,
            Expr::Return(e) => e.span,
            Expr::Panic(e) => e.span,
            Expr::Try(e) => e.span,
            Expr::Break(e) => e.span,
            Expr::Continue(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfExpr {
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoneExpr {
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: Token,
    pub operand: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub target: Box<Expr>,
    pub equal_span: TextSpan,
    pub value: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub target: Box<Expr>,
    pub arguments: Vec<Expr>,
    /// Span of `(args)`, where arity diagnostics point.
    pub args_span: TextSpan,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetExpr {
    pub target: Box<Expr>,
    pub name: Token,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub ty: TypeSyntax,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BraceExpr {
    pub literal: BraceLiteral,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpr {
    pub elements: Vec<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub params: Vec<Param>,
    pub return_type: Option<TypeSyntax>,
    pub body: Block,
    pub close_paren_span: TextSpan,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordInitExpr {
    pub name: Token,
    pub arguments: Vec<Expr>,
    pub args_span: TextSpan,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnExpr {
    pub keyword_span: TextSpan,
    pub value: Option<Box<Expr>>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanicExpr {
    pub keyword_span: TextSpan,
    pub message: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryExpr {
    pub keyword_span: TextSpan,
    pub expr: Box<Expr>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakExpr {
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueExpr {
    pub span: TextSpan,
}

/// Type annotation syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSyntax {
    /// A bare type name. An empty name is a recovery placeholder the
    /// binder resolves to the error type without reporting again.
    Normal(Token),
    List(Box<TypeSyntax>, TextSpan),
    Set(Box<TypeSyntax>, TextSpan),
    Map(Box<TypeSyntax>, Box<TypeSyntax>, TextSpan),
    Tuple(Vec<TypeSyntax>, TextSpan),
    Function(Vec<TypeSyntax>, Box<TypeSyntax>, TextSpan),
    Union(Vec<TypeSyntax>, TextSpan),
    Paren(Box<TypeSyntax>, TextSpan),
}

impl TypeSyntax {
    pub fn span(&self) -> TextSpan {
        match self {
            TypeSyntax::Normal(token) => token.span,
            TypeSyntax::List(_, span)
            | TypeSyntax::Set(_, span)
            | TypeSyntax::Map(_, _, span)
            | TypeSyntax::Tuple(_, span)
            | TypeSyntax::Function(_, _, span)
            | TypeSyntax::Union(_, span)
            | TypeSyntax::Paren(_, span) => *span,
        }
    }
}
