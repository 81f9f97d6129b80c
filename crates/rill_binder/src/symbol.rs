//! Named entities created during binding.
//!
//! Symbol identity is the numeric id, never the name: two variables named
//! `x` in different scopes are distinct symbols, and the runtime
//! environment is keyed by id.

use rill_types::TypeRef;
use std::rc::Rc;

pub type SymbolId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable { read_only: bool },
    Parameter,
    Function,
    Method,
    Field,
    /// The implicit `self` binding inside a method body.
    Receiver,
    Record,
}

#[derive(Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    /// For functions and methods this is the full function type.
    pub ty: TypeRef,
    pub kind: SymbolKind,
    /// The declared receiver type, for methods only.
    pub receiver: Option<TypeRef>,
}

impl Symbol {
    pub fn new(id: SymbolId, name: impl Into<String>, ty: TypeRef, kind: SymbolKind) -> Rc<Self> {
        Rc::new(Self {
            id,
            name: name.into(),
            ty,
            kind,
            receiver: None,
        })
    }

    pub fn method(
        id: SymbolId,
        name: impl Into<String>,
        receiver: TypeRef,
        ty: TypeRef,
    ) -> Rc<Self> {
        Rc::new(Self {
            id,
            name: name.into(),
            ty,
            kind: SymbolKind::Method,
            receiver: Some(receiver),
        })
    }

    pub fn is_assignable_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { .. })
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { read_only: true })
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Symbol) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}
