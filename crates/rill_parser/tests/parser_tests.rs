//! Parser integration tests.

use rill_ast::token::TokenKind;
use rill_ast::tree::*;
use rill_parser::parse;

fn parse_clean(source: &str) -> Program {
    let (program, diagnostics) = parse(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        diagnostics.diagnostics()
    );
    program
}

fn single_expr(source: &str) -> Expr {
    let mut program = parse_clean(source);
    assert_eq!(program.statements.len(), 1);
    match program.statements.pop().unwrap() {
        Stmt::Expression(expr) => expr,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn parses_let_declaration() {
    let program = parse_clean("let x: Int = 1 + 2");
    match &program.statements[0] {
        Stmt::Variable(decl) => {
            assert_eq!(decl.name.text, "x");
            assert!(!decl.read_only);
            assert!(matches!(decl.ty, Some(TypeSyntax::Normal(_))));
            assert!(matches!(decl.value, Expr::Binary(_)));
        }
        other => panic!("expected variable declaration, got {:?}", other),
    }
}

#[test]
fn parses_def_as_read_only() {
    let program = parse_clean("def pi = 3.14");
    match &program.statements[0] {
        Stmt::Variable(decl) => assert!(decl.read_only),
        other => panic!("expected variable declaration, got {:?}", other),
    }
}

#[test]
fn parses_function_declaration() {
    let program = parse_clean("fun add(a: Int, b: Int): Int { return a + b }");
    match &program.statements[0] {
        Stmt::Function(decl) => {
            assert!(decl.receiver.is_none());
            assert_eq!(decl.name.text, "add");
            assert_eq!(decl.params.len(), 2);
            assert!(decl.return_type.is_some());
        }
        other => panic!("expected function declaration, got {:?}", other),
    }
}

#[test]
fn parses_method_declaration_with_paren_receiver() {
    let program = parse_clean("fun (Int).twice(): Int { return self * 2 }");
    match &program.statements[0] {
        Stmt::Function(decl) => {
            assert!(matches!(decl.receiver, Some(TypeSyntax::Paren(_, _))));
            assert_eq!(decl.name.text, "twice");
        }
        other => panic!("expected method declaration, got {:?}", other),
    }
}

#[test]
fn parses_method_declaration_with_bare_receiver() {
    let program = parse_clean("fun String.shout(): String { return self }");
    match &program.statements[0] {
        Stmt::Function(decl) => {
            assert!(matches!(decl.receiver, Some(TypeSyntax::Normal(_))));
        }
        other => panic!("expected method declaration, got {:?}", other),
    }
}

#[test]
fn parses_record_declaration() {
    let program = parse_clean("record Point(x: Int, y: Int)");
    match &program.statements[0] {
        Stmt::Record(decl) => {
            assert_eq!(decl.name.text, "Point");
            assert_eq!(decl.fields.len(), 2);
        }
        other => panic!("expected record declaration, got {:?}", other),
    }
}

#[test]
fn binary_precedence() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    match single_expr("1 + 2 * 3") {
        Expr::Binary(add) => {
            assert_eq!(add.operator.kind, TokenKind::Plus);
            assert!(matches!(*add.right, Expr::Binary(ref mul)
                if mul.operator.kind == TokenKind::Star));
        }
        other => panic!("expected binary expression, got {:?}", other),
    }
}

#[test]
fn assignment_is_right_associative() {
    match single_expr("a = b = 1") {
        Expr::Assignment(outer) => {
            assert!(matches!(*outer.value, Expr::Assignment(_)));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn cast_is_left_iterative() {
    match single_expr("x as Int as Any") {
        Expr::Cast(outer) => assert!(matches!(*outer.expr, Expr::Cast(_))),
        other => panic!("expected cast, got {:?}", other),
    }
}

#[test]
fn postfix_chains_on_same_line() {
    match single_expr("f(1)[0].field") {
        Expr::Get(get) => {
            assert_eq!(get.name.text, "field");
            assert!(matches!(*get.target, Expr::Index(_)));
        }
        other => panic!("expected member access, got {:?}", other),
    }
}

#[test]
fn postfix_does_not_cross_lines() {
    // The second line is its own (parenthesized) statement, not a call.
    let program = parse_clean("f\n(1)");
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(program.statements[0], Stmt::Expression(Expr::Variable(_))));
    assert!(matches!(program.statements[1], Stmt::Expression(Expr::Paren(_))));
}

#[test]
fn return_value_only_on_same_line() {
    let program = parse_clean("fun f(): Unit { return\n1 }");
    match &program.statements[0] {
        Stmt::Function(decl) => {
            match &decl.body.statements[0] {
                Stmt::Expression(Expr::Return(ret)) => assert!(ret.value.is_none()),
                other => panic!("expected return, got {:?}", other),
            }
            assert_eq!(decl.body.statements.len(), 2);
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn brace_literal_flavors() {
    assert!(matches!(
        single_expr("{1: \"a\", 2: \"b\"}"),
        Expr::Brace(BraceExpr {
            literal: BraceLiteral::Map(ref entries),
            ..
        }) if entries.len() == 2
    ));
    assert!(matches!(
        single_expr("{1, 2, 3}"),
        Expr::Brace(BraceExpr {
            literal: BraceLiteral::Set(ref elements),
            ..
        }) if elements.len() == 3
    ));
    assert!(matches!(
        single_expr("{}"),
        Expr::Brace(BraceExpr {
            literal: BraceLiteral::Empty,
            ..
        })
    ));
}

#[test]
fn tuple_vs_paren() {
    assert!(matches!(single_expr("(1)"), Expr::Paren(_)));
    assert!(matches!(
        single_expr("(1, 2)"),
        Expr::Tuple(TupleExpr { ref elements, .. }) if elements.len() == 2
    ));
}

#[test]
fn type_grammar() {
    let program = parse_clean("let x: Int[] | (Int, String){Boolean} = none");
    match &program.statements[0] {
        Stmt::Variable(decl) => match decl.ty.as_ref().unwrap() {
            TypeSyntax::Union(members, _) => {
                assert!(matches!(members[0], TypeSyntax::List(_, _)));
                assert!(matches!(members[1], TypeSyntax::Map(_, _, _)));
            }
            other => panic!("expected union type, got {:?}", other),
        },
        other => panic!("expected variable, got {:?}", other),
    }
}

#[test]
fn function_type_requires_arrow_after_empty_parens() {
    let program = parse_clean("let f: () -> Int = fun (): Int { return 1 }");
    match &program.statements[0] {
        Stmt::Variable(decl) => {
            assert!(matches!(
                decl.ty,
                Some(TypeSyntax::Function(ref params, _, _)) if params.is_empty()
            ));
            assert!(matches!(decl.value, Expr::FunctionExpr(_)));
        }
        other => panic!("expected variable, got {:?}", other),
    }
}

#[test]
fn error_recovery_reports_once_and_continues() {
    let (program, diagnostics) = parse("let = 5\nlet y = 2");
    assert_eq!(
        diagnostics.diagnostics()[0].message_text,
        "Unexpected '=', expected 'identifier'"
    );
    // The second declaration still parses.
    assert!(program
        .statements
        .iter()
        .any(|s| matches!(s, Stmt::Variable(decl) if decl.name.text == "y")));
}

#[test]
fn do_while_and_defer() {
    let program = parse_clean("do { x = x + 1 } while (x < 10)\ndefer println(x)");
    assert!(matches!(program.statements[0], Stmt::DoWhile(_)));
    assert!(matches!(program.statements[1], Stmt::Defer(_)));
}

#[test]
fn new_and_try_and_panic() {
    assert!(matches!(single_expr("new Point(1, 2)"), Expr::RecordInit(_)));
    assert!(matches!(single_expr("try f()"), Expr::Try(_)));
    assert!(matches!(single_expr("panic \"boom\""), Expr::Panic(_)));
}
