//! The bound tree: every expression carries its resolved type and every
//! node is immutable once built. Diagnostics produced after binding (the
//! return-path walk) still need source positions, so nodes keep their
//! spans.

use crate::builtins::Builtins;
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::symbol::Symbol;
use rill_core::text::TextSpan;
use rill_types::TypeRef;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundProgram {
    pub statements: Vec<BoundStmt>,
    pub builtins: Rc<Builtins>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundStmt {
    Function(BoundFunction),
    Record(BoundRecord),
    Variable(BoundVariable),
    If(BoundIf),
    While(BoundWhile),
    DoWhile(BoundWhile),
    Defer(BoundDefer),
    Block(BoundBlock),
    Expression(BoundExpr),
}

impl BoundStmt {
    pub fn span(&self) -> TextSpan {
        match self {
            BoundStmt::Function(stmt) => stmt.span,
            BoundStmt::Record(stmt) => stmt.span,
            BoundStmt::Variable(stmt) => stmt.span,
            BoundStmt::If(stmt) => stmt.span,
            BoundStmt::While(stmt) | BoundStmt::DoWhile(stmt) => stmt.span,
            BoundStmt::Defer(stmt) => stmt.span,
            BoundStmt::Block(stmt) => stmt.span,
            BoundStmt::Expression(expr) => expr.span,
        }
    }
}

/// A function or method declaration. Methods carry the `self` receiver
/// symbol bound into their body scope.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFunction {
    pub symbol: Rc<Symbol>,
    pub receiver: Option<Rc<Symbol>>,
    pub params: Vec<Rc<Symbol>>,
    pub body: Vec<BoundStmt>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundRecord {
    pub symbol: Rc<Symbol>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundVariable {
    pub symbol: Rc<Symbol>,
    pub value: BoundExpr,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundIf {
    pub condition: BoundExpr,
    pub then_branch: Box<BoundStmt>,
    pub else_branch: Option<Box<BoundStmt>>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundWhile {
    pub condition: BoundExpr,
    pub body: Box<BoundStmt>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundDefer {
    pub body: Box<BoundStmt>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundBlock {
    pub statements: Vec<BoundStmt>,
    pub span: TextSpan,
}

/// A compile-time literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Char(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpr {
    pub kind: BoundExprKind,
    pub ty: TypeRef,
    pub span: TextSpan,
}

impl BoundExpr {
    pub fn new(kind: BoundExprKind, ty: TypeRef, span: TextSpan) -> Self {
        Self { kind, ty, span }
    }

    pub fn error(ty: TypeRef, span: TextSpan) -> Self {
        Self {
            kind: BoundExprKind::Error,
            ty,
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, BoundExprKind::Error)
    }

    /// Whether this expression is legal as a free-standing statement.
    pub fn is_valid_statement(&self) -> bool {
        matches!(
            self.kind,
            BoundExprKind::Call { .. }
                | BoundExprKind::Assignment { .. }
                | BoundExprKind::SetIndexed { .. }
                | BoundExprKind::SetField { .. }
                | BoundExprKind::Indexed { .. }
                | BoundExprKind::Return(_)
                | BoundExprKind::Break
                | BoundExprKind::Continue
                | BoundExprKind::Panic(_)
                | BoundExprKind::Try(_)
                | BoundExprKind::Error
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundExprKind {
    Literal(Constant),
    Variable(Rc<Symbol>),
    None,
    Unary {
        op: UnaryOperator,
        operand: Box<BoundExpr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    Ternary {
        condition: Box<BoundExpr>,
        then_expr: Box<BoundExpr>,
        else_expr: Box<BoundExpr>,
    },
    /// Assignment to a plain variable.
    Assignment {
        symbol: Rc<Symbol>,
        value: Box<BoundExpr>,
    },
    /// `target[index] = value` on a list or map.
    SetIndexed {
        target: Box<BoundExpr>,
        index: Box<BoundExpr>,
        value: Box<BoundExpr>,
    },
    /// `target.field = value` on a record.
    SetField {
        target: Box<BoundExpr>,
        field: String,
        value: Box<BoundExpr>,
    },
    GetField {
        target: Box<BoundExpr>,
        field: String,
    },
    /// A method reference with its receiver expression; the node type is
    /// the method's function type.
    GetMethod {
        target: Box<BoundExpr>,
        method: Rc<Symbol>,
    },
    Call {
        target: Box<BoundExpr>,
        arguments: Vec<BoundExpr>,
    },
    Indexed {
        target: Box<BoundExpr>,
        index: Box<BoundExpr>,
    },
    RecordInit {
        record: Rc<Symbol>,
        arguments: Vec<BoundExpr>,
    },
    FunctionExpr {
        params: Vec<Rc<Symbol>>,
        body: Vec<BoundStmt>,
    },
    List(Vec<BoundExpr>),
    SetLiteral(Vec<BoundExpr>),
    MapLiteral(Vec<(BoundExpr, BoundExpr)>),
    Tuple(Vec<BoundExpr>),
    Paren(Box<BoundExpr>),
    Cast {
        value: Box<BoundExpr>,
    },
    Try(Box<BoundExpr>),
    Panic(Box<BoundExpr>),
    Return(Option<Box<BoundExpr>>),
    Break,
    Continue,
    /// Placeholder for failed binding; absorbs downstream checks.
    Error,
}
