use rill_binder::{bind, BoundProgram, BoundStmt};
use rill_diagnostics::Diagnostic;
use rill_parser::parse;

fn bind_source(source: &str) -> (BoundProgram, Vec<Diagnostic>) {
    let (program, parse_diagnostics) = parse(source);
    assert!(
        parse_diagnostics.is_empty(),
        "unexpected parse errors: {:?}",
        parse_diagnostics.diagnostics()
    );
    let (bound, diagnostics) = bind(&program);
    (bound, diagnostics.into_diagnostics())
}

fn codes(source: &str) -> Vec<u32> {
    bind_source(source).1.iter().map(|d| d.code).collect()
}

fn variable_type(bound: &BoundProgram, index: usize) -> String {
    match &bound.statements[index] {
        BoundStmt::Variable(decl) => decl.symbol.ty.to_string(),
        other => panic!("expected a variable declaration, got {:?}", other),
    }
}

#[test]
fn arithmetic_promotion_follows_the_pair_table() {
    let (bound, diagnostics) = bind_source("let x = 1\nlet y = x + 2.0\nlet z = 1.0f + 2l");
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 0), "Int");
    assert_eq!(variable_type(&bound, 1), "Double");
    // (Float, Long) promotes to Long, not to Float.
    assert_eq!(variable_type(&bound, 2), "Long");
}

#[test]
fn string_concatenation() {
    let (bound, diagnostics) = bind_source("let s = \"a\" + \"b\"");
    assert!(diagnostics.is_empty());
    assert_eq!(variable_type(&bound, 0), "String");
}

#[test]
fn mixing_int_and_string_is_an_invalid_binary_operation() {
    assert_eq!(codes("let x = 1 + \"a\""), vec![2002]);
}

#[test]
fn none_compares_against_a_noneable_side_only() {
    assert_eq!(codes("let x: Int | None = none\nlet y = x == none"), Vec::<u32>::new());
    assert_eq!(codes("let x = none == none"), vec![2002]);
}

#[test]
fn condition_must_be_boolean() {
    assert_eq!(codes("if (1) { println(\"x\") }"), vec![2009]);
    assert_eq!(codes("while (true) { }"), Vec::<u32>::new());
}

#[test]
fn unknown_symbol() {
    assert_eq!(codes("println(missing)"), vec![2004]);
}

#[test]
fn duplicate_declaration_in_same_scope() {
    assert_eq!(codes("let x = 1\nlet x = 2"), vec![2005]);
    // Shadowing in a nested scope is legal.
    assert_eq!(codes("let x = 1\n{\nlet x = 2\n}"), Vec::<u32>::new());
}

#[test]
fn def_bindings_are_final() {
    assert_eq!(codes("def x = 1\nx = 2"), vec![2007]);
}

#[test]
fn wrong_assignment_types() {
    assert_eq!(codes("let x: Int = \"s\""), vec![2006]);
    assert_eq!(codes("let y = 1\ny = \"s\""), vec![2006]);
}

#[test]
fn parameters_are_not_assignable() {
    assert_eq!(codes("fun f(a: Int) { a = 2 }"), vec![2008]);
}

#[test]
fn if_without_else_does_not_count_as_a_return_path() {
    assert_eq!(
        codes("fun f(): Int { if (true) { return 1 } }"),
        vec![2023]
    );
    assert_eq!(
        codes("fun f(): Int { if (true) { return 1 } else { return 2 } }"),
        Vec::<u32>::new()
    );
}

#[test]
fn return_value_type_is_checked() {
    assert_eq!(codes("fun f(): Int { return \"s\" }"), vec![2021]);
    assert_eq!(codes("fun f(): Int { return }"), vec![2022]);
    assert_eq!(codes("fun f() { return }"), Vec::<u32>::new());
}

#[test]
fn statements_after_a_return_are_unreached() {
    assert_eq!(
        codes("fun f(): Int {\nreturn 1\nprintln(\"x\")\n}"),
        vec![2020]
    );
}

#[test]
fn jump_legality() {
    assert_eq!(codes("break"), vec![2012]);
    assert_eq!(codes("while (true) { break }"), Vec::<u32>::new());
    assert_eq!(codes("do { continue } while (true)"), Vec::<u32>::new());
    // A function boundary hides the loop.
    assert_eq!(codes("while (true) { fun f() { break } }"), vec![2010]);
    // So does a defer boundary.
    assert_eq!(codes("while (true) { defer break }"), vec![2011]);
}

#[test]
fn return_through_defer() {
    assert_eq!(codes("fun f() { defer return }"), vec![2011]);
    // At the top level there is no function to jump out of.
    assert_eq!(codes("defer return"), Vec::<u32>::new());
}

#[test]
fn record_declaration_and_construction() {
    let source = "record Point(x: Int, y: Int)\n\
                  let p = new Point(1, 2)\n\
                  let x = p.x\n\
                  p.y = 5";
    let (bound, diagnostics) = bind_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 1), "Point");
    assert_eq!(variable_type(&bound, 2), "Int");
}

#[test]
fn record_construction_is_checked_like_a_call() {
    let prelude = "record Point(x: Int, y: Int)\n";
    assert_eq!(codes(&format!("{}let p = new Point(1)", prelude)), vec![2018]);
    assert_eq!(
        codes(&format!("{}let p = new Point(1, \"s\")", prelude)),
        vec![2019]
    );
    assert_eq!(
        codes(&format!("{}let p = new Point(1, 2)\nlet z = p.z", prelude)),
        vec![2004]
    );
}

#[test]
fn records_may_reference_themselves() {
    let source = "record Node(value: Int, next: Node | None)\n\
                  let n = new Node(1, none)\n\
                  let m = new Node(2, n)";
    let (_, diagnostics) = bind_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn duplicate_parameter_and_field_names() {
    assert_eq!(codes("fun f(a: Int, a: Int) { }"), vec![2013]);
    assert_eq!(codes("record R(a: Int, a: Int)"), vec![2014]);
}

#[test]
fn methods_resolve_by_receiver() {
    let source = "fun (String).twice(): String { return self + self }\n\
                  let s = \"ab\".twice()";
    let (bound, diagnostics) = bind_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 1), "String");
}

#[test]
fn method_bodies_see_receiver_members_unqualified() {
    let source = "record Counter(count: Int)\n\
                  fun (Counter).bump(): Int { return count + 1 }\n\
                  let c = new Counter(0)\n\
                  let n = c.bump()";
    let (bound, diagnostics) = bind_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 3), "Int");
}

#[test]
fn overload_resolution_ambiguity() {
    let source = "fun (Any).m(): Int { return 1 }\n\
                  fun (Int | Double).m(): Int { return 2 }\n\
                  let x = 3.m()";
    let (_, diagnostics) = bind_source(source);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, 2032);
    assert!(diagnostics[0].message_text.contains("fun (Any).m(): Int"));
    assert!(diagnostics[0]
        .message_text
        .contains("fun (Int | Double).m(): Int"));
}

#[test]
fn exact_receiver_type_wins_over_wider_candidates() {
    let source = "fun (Any).m(): Int { return 1 }\n\
                  fun (Int).m(): Int { return 2 }\n\
                  let x = 3.m()";
    let (_, diagnostics) = bind_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn self_outside_a_method() {
    assert_eq!(codes("let x = self"), vec![2025]);
}

#[test]
fn tuple_indexing_needs_a_constant_in_bounds() {
    let source = "let t = (1, \"s\")\nlet a = t[0]\nlet b = t[1]";
    let (bound, diagnostics) = bind_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 1), "Int");
    assert_eq!(variable_type(&bound, 2), "String");

    assert_eq!(codes("let t = (1, 2)\nlet a = t[2]"), vec![2028]);
    assert_eq!(codes("let t = (1, 2)\nlet i = 0\nlet a = t[i]"), vec![2027]);
}

#[test]
fn indexing_types() {
    let source = "let l = [1, 2]\n\
                  let e = l[0]\n\
                  let m = {\"a\": 1}\n\
                  let v = m[\"a\"]\n\
                  let s = \"abc\"[1]";
    let (bound, diagnostics) = bind_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 0), "Int[]");
    assert_eq!(variable_type(&bound, 1), "Int");
    assert_eq!(variable_type(&bound, 2), "String{Int}");
    // Map lookups may miss.
    assert_eq!(variable_type(&bound, 3), "Int | None");
    assert_eq!(variable_type(&bound, 4), "Char");

    assert_eq!(codes("let l = [1]\nlet x = l[\"a\"]"), vec![2026]);
    assert_eq!(codes("let x = true[0]"), vec![2017]);
}

#[test]
fn empty_collection_literals_need_context() {
    assert_eq!(codes("let e = []"), vec![2029]);
    assert_eq!(codes("let e = {}"), vec![2029]);
    assert_eq!(codes("let e: Int[] = []"), Vec::<u32>::new());
    assert_eq!(codes("let e: Int{} = {}"), Vec::<u32>::new());
    assert_eq!(codes("let e: String{Int} = {}"), Vec::<u32>::new());
}

#[test]
fn collection_literals_widen_mixed_elements() {
    let (bound, diagnostics) = bind_source("let a = [1, 2]\nlet b = [1, none]\nlet c = [1, \"s\"]");
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 0), "Int[]");
    assert_eq!(variable_type(&bound, 1), "Any | None[]");
    assert_eq!(variable_type(&bound, 2), "Any[]");
}

#[test]
fn context_typed_literal_elements_are_checked() {
    assert_eq!(codes("let l: Int[] = [1, \"s\"]"), vec![2030]);
}

#[test]
fn try_wraps_the_value_in_an_optional() {
    let (bound, diagnostics) = bind_source("let v = try 1 / 0");
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 0), "Int | None");
}

#[test]
fn panic_message_must_be_a_string() {
    assert_eq!(codes("panic 1"), vec![2024]);
    assert_eq!(codes("panic \"boom\""), Vec::<u32>::new());
}

#[test]
fn casts() {
    let (bound, diagnostics) = bind_source("let x = 1 as Double");
    assert!(diagnostics.is_empty());
    assert_eq!(variable_type(&bound, 0), "Double");
    assert_eq!(codes("let y = \"s\" as Int"), vec![2031]);
    // The node keeps the target type even when the cast is impossible.
    let (bound, _) = bind_source("let y = \"s\" as Int");
    assert_eq!(variable_type(&bound, 0), "Int");
}

#[test]
fn argument_arity_is_checked() {
    assert_eq!(codes("println(1, 2)"), vec![2018]);
}

#[test]
fn bare_value_expressions_are_not_statements() {
    assert_eq!(codes("1 + 2"), vec![2003]);
    assert_eq!(codes("println(1)"), Vec::<u32>::new());
}

#[test]
fn string_parsing_methods_are_builtin() {
    let (bound, diagnostics) = bind_source("let n = \"42\".int()");
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(variable_type(&bound, 0), "Int | None");
}

#[test]
fn undefined_type_annotation() {
    assert_eq!(codes("let x: Missing = 1"), vec![2015]);
    // Char is a value type but not a nameable one.
    assert_eq!(codes("let c: Char = 'a'"), vec![2015]);
}

#[test]
fn calling_a_non_function() {
    assert_eq!(codes("let x = 1\nx()"), vec![2016]);
}

#[test]
fn binding_is_deterministic() {
    let source = "record Point(x: Int, y: Int)\n\
                  fun dist(p: Point): Int { return p.x + p.y }\n\
                  let p = new Point(1, 2)\n\
                  println(dist(p))";
    let (first, first_diags) = bind_source(source);
    let (second, second_diags) = bind_source(source);
    assert!(first_diags.is_empty());
    assert!(second_diags.is_empty());
    assert_eq!(first, second);
}
