//! Binary and unary operator resolution.
//!
//! Operators are resolved by exact match on the operand types. The
//! numeric promotion pairs are hand-enumerated on purpose: promotion is
//! not a total order and the result per pair is the contract the runtime
//! has to reproduce, so the table is the specification, not a derivation.

use rill_ast::token::TokenKind;
use rill_types::{Type, TypeRef, TypeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Concat,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Identity,
    Negation,
    LogicalNegation,
}

/// Resolve a binary operator against its operand types. Returns the
/// operation and the result type, or None when no rule matches.
pub fn resolve_binary(
    token: TokenKind,
    left: &TypeRef,
    right: &TypeRef,
    store: &TypeStore,
) -> Option<(BinaryOperator, TypeRef)> {
    use BinaryOperator::*;
    match token {
        TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
            let op = match token {
                TokenKind::Plus => Addition,
                TokenKind::Minus => Subtraction,
                TokenKind::Star => Multiplication,
                _ => Division,
            };
            if token == TokenKind::Plus {
                if let (Type::String, Type::String) = (&**left, &**right) {
                    return Some((Concat, store.string.clone()));
                }
            }
            let result = promote_numeric(left, right, store)?;
            Some((op, result))
        }
        TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
            // All 16 numeric pairs compare; the result is always Boolean.
            promote_numeric(left, right, store)?;
            let op = match token {
                TokenKind::Greater => GreaterThan,
                TokenKind::GreaterEqual => GreaterThanEqual,
                TokenKind::Less => LessThan,
                _ => LessThanEqual,
            };
            Some((op, store.boolean.clone()))
        }
        TokenKind::AmpersandAmpersand => match (&**left, &**right) {
            (Type::Boolean, Type::Boolean) => Some((LogicalAnd, store.boolean.clone())),
            _ => None,
        },
        TokenKind::PipePipe => match (&**left, &**right) {
            (Type::Boolean, Type::Boolean) => Some((LogicalOr, store.boolean.clone())),
            _ => None,
        },
        TokenKind::EqualEqual | TokenKind::BangEqual => {
            let op = if token == TokenKind::EqualEqual {
                Equals
            } else {
                NotEquals
            };
            if equality_defined(left, right) {
                Some((op, store.boolean.clone()))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Resolve a unary operator against its operand type.
pub fn resolve_unary(
    token: TokenKind,
    operand: &TypeRef,
) -> Option<(UnaryOperator, TypeRef)> {
    match token {
        TokenKind::Plus if operand.is_numeric() => {
            Some((UnaryOperator::Identity, operand.clone()))
        }
        TokenKind::Minus if operand.is_numeric() => {
            Some((UnaryOperator::Negation, operand.clone()))
        }
        TokenKind::Bang if matches!(**operand, Type::Boolean) => {
            Some((UnaryOperator::LogicalNegation, operand.clone()))
        }
        _ => None,
    }
}

/// The pairwise numeric result-type table. Asymmetric by design; do not
/// collapse it into a ranking.
fn promote_numeric(left: &TypeRef, right: &TypeRef, store: &TypeStore) -> Option<TypeRef> {
    let result = match (&**left, &**right) {
        (Type::Int, Type::Int) => &store.int,
        (Type::Int, Type::Float) => &store.float,
        (Type::Int, Type::Long) => &store.long,
        (Type::Int, Type::Double) => &store.double,

        (Type::Float, Type::Int) => &store.float,
        (Type::Float, Type::Float) => &store.float,
        (Type::Float, Type::Long) => &store.long,
        (Type::Float, Type::Double) => &store.double,

        (Type::Long, Type::Int) => &store.long,
        (Type::Long, Type::Float) => &store.long,
        (Type::Long, Type::Long) => &store.long,
        (Type::Long, Type::Double) => &store.double,

        (Type::Double, Type::Int) => &store.double,
        (Type::Double, Type::Float) => &store.double,
        (Type::Double, Type::Long) => &store.double,
        (Type::Double, Type::Double) => &store.double,

        _ => return None,
    };
    Some(result.clone())
}

/// `==`/`!=` rules: exact-type equality on the comparable primitives,
/// then the structural fallbacks (None against a noneable type, tuples
/// of identical shape).
fn equality_defined(left: &TypeRef, right: &TypeRef) -> bool {
    match (&**left, &**right) {
        (Type::Int, Type::Int)
        | (Type::Double, Type::Double)
        | (Type::Boolean, Type::Boolean)
        | (Type::Float, Type::Float)
        | (Type::Long, Type::Long)
        | (Type::String, Type::String)
        | (Type::Char, Type::Char) => true,
        // Exactly one side may be `none`, and the other must admit it.
        (Type::None, Type::None) => false,
        (Type::None, _) => left.assignable_to(right),
        (_, Type::None) => right.assignable_to(left),
        (Type::Tuple(a), Type::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
        }
        _ => false,
    }
}
