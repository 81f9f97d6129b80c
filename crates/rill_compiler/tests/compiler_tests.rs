use rill_compiler::Compilation;
use rill_evaluator::evaluate;

#[test]
fn clean_source_compiles_and_runs() {
    let source = "fun greet(name: String): String { return \"hi \" + name }\n\
                  println(greet(\"rill\"))";
    let compilation = Compilation::compile(source);
    assert!(!compilation.has_errors());
    let mut out = Vec::new();
    evaluate(&compilation.program, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "hi rill\n");
}

#[test]
fn diagnostics_merge_across_phases_in_source_order() {
    // An unknown symbol on line one, then a parse error at the end.
    let source = "let a = missing\nlet b = 1 +";
    let compilation = Compilation::compile(source);
    let codes: Vec<u32> = compilation.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![2004, 1101]);
}

#[test]
fn diagnostics_render_with_line_and_column() {
    let source = "let x = y";
    let compilation = Compilation::compile(source);
    assert!(compilation.has_errors());
    assert_eq!(
        compilation.render_diagnostics(source),
        "(1:9, 1:10) Unknown symbol 'y'.\n"
    );
}

#[test]
fn errors_keep_the_program_from_masking_later_ones() {
    // The bad operand binds to an error node, so only the first fault
    // and genuinely separate faults are reported.
    let source = "let x = 1 + \"a\"\nlet y = x + 2";
    let compilation = Compilation::compile(source);
    let codes: Vec<u32> = compilation.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![2002]);
}

#[test]
fn multiline_spans_render_both_ends() {
    let source = "let x: Int = 1\nlet x: Int = 2";
    let compilation = Compilation::compile(source);
    let rendered = compilation.render_diagnostics(source);
    assert_eq!(rendered, "(2:5, 2:6) Already existent symbol 'x'.\n");
}
