use rill_binder::bind;
use rill_evaluator::evaluate;
use rill_parser::parse;

fn run(source: &str) -> String {
    let (program, parse_diagnostics) = parse(source);
    assert!(
        parse_diagnostics.is_empty(),
        "parse diagnostics: {:?}",
        parse_diagnostics.diagnostics()
    );
    let (bound, diagnostics) = bind(&program);
    assert!(
        diagnostics.is_empty(),
        "binder diagnostics: {:?}",
        diagnostics.diagnostics()
    );
    let mut out = Vec::new();
    match evaluate(&bound, &mut out) {
        Ok(()) => String::from_utf8(out).unwrap(),
        Err(panic) => panic!("uncaught panic: {}", panic),
    }
}

fn run_panics(source: &str) -> String {
    let (program, parse_diagnostics) = parse(source);
    assert!(parse_diagnostics.is_empty());
    let (bound, diagnostics) = bind(&program);
    assert!(
        diagnostics.is_empty(),
        "binder diagnostics: {:?}",
        diagnostics.diagnostics()
    );
    let mut out = Vec::new();
    match evaluate(&bound, &mut out) {
        Ok(()) => panic!("expected a panic, got output {:?}", out),
        Err(panic) => panic.to_string(),
    }
}

#[test]
fn prints_literals_and_arithmetic() {
    assert_eq!(run("println(1 + 2 * 3)"), "7\n");
    assert_eq!(run("println(\"a\" + \"b\")"), "ab\n");
    assert_eq!(run("println(1.0 + 1.0)"), "2.0\n");
    assert_eq!(run("println(true && 2 > 1)"), "true\n");
}

#[test]
fn mixed_operands_promote_like_the_checker_says() {
    // Float against Long lands in the Long domain.
    assert_eq!(run("println(1.0f + 2l)"), "3\n");
    assert_eq!(run("println(typeOf(1.0f + 2l))"), "Long\n");
    assert_eq!(run("println(1 + 2.5)"), "3.5\n");
}

#[test]
fn variables_assign_and_shadow() {
    assert_eq!(run("let x = 1\nx = x + 1\nprintln(x)"), "2\n");
    assert_eq!(run("let x = 1\n{\nlet x = 9\nprintln(x)\n}\nprintln(x)"), "9\n1\n");
}

#[test]
fn ternary_picks_a_branch() {
    assert_eq!(run("println(1 < 2 ? \"yes\" : \"no\")"), "yes\n");
    assert_eq!(run("println(1 > 2 ? \"yes\" : \"no\")"), "no\n");
}

#[test]
fn while_loop_with_break_and_continue() {
    let source = "let i = 0\n\
                  while (i < 5) {\n\
                  i = i + 1\n\
                  if (i == 2) continue\n\
                  if (i == 4) break\n\
                  println(i)\n\
                  }";
    assert_eq!(run(source), "1\n3\n");
}

#[test]
fn do_while_runs_the_body_first() {
    let source = "let i = 0\n\
                  do {\n\
                  println(i)\n\
                  i = i + 1\n\
                  } while (i < 3)";
    assert_eq!(run(source), "0\n1\n2\n");
    assert_eq!(run("do println(\"once\") while (false)"), "once\n");
}

#[test]
fn defer_runs_on_every_exit_path() {
    let source = "while (true) {\n\
                  defer println(\"deferred\")\n\
                  println(\"body\")\n\
                  break\n\
                  }";
    assert_eq!(run(source), "body\ndeferred\n");
}

#[test]
fn defers_run_in_reverse_order() {
    let source = "{\n\
                  defer println(\"first\")\n\
                  defer println(\"second\")\n\
                  println(\"body\")\n\
                  }";
    assert_eq!(run(source), "body\nsecond\nfirst\n");
}

#[test]
fn defer_under_a_conditional_runs_in_place() {
    // Only direct children of a statement list register; a defer
    // sitting in a branch arm runs its body immediately.
    let source = "{\n\
                  if (true) defer println(\"a\")\n\
                  println(\"b\")\n\
                  }";
    assert_eq!(run(source), "a\nb\n");
}

#[test]
fn deferred_defer_runs_when_the_list_unwinds() {
    // The outer defer registers; its body is itself a defer, which
    // runs in place once the list is left.
    assert_eq!(run("defer defer println(\"a\")"), "a\n");
}

#[test]
fn top_level_return_ends_the_script_after_defers() {
    let source = "defer println(\"cleanup\")\n\
                  println(\"start\")\n\
                  return";
    assert_eq!(run(source), "start\ncleanup\n");
}

#[test]
fn functions_call_and_recurse() {
    let source = "fun fact(n: Int): Int {\n\
                  if (n <= 1) { return 1 }\n\
                  return n * fact(n - 1)\n\
                  }\n\
                  println(fact(5))";
    assert_eq!(run(source), "120\n");
}

#[test]
fn declared_functions_capture_a_snapshot() {
    let source = "let x = 1\n\
                  fun show() { println(x) }\n\
                  x = 2\n\
                  show()";
    assert_eq!(run(source), "1\n");
}

#[test]
fn function_expressions_are_values() {
    let source = "let inc = fun (x: Int): Int { return x + 1 }\n\
                  println(inc(2))";
    assert_eq!(run(source), "3\n");
}

#[test]
fn records_construct_and_mutate() {
    let source = "record Point(x: Int, y: Int)\n\
                  let p = new Point(1, 2)\n\
                  println(p.x)\n\
                  p.y = 5\n\
                  println(p.y)";
    assert_eq!(run(source), "1\n5\n");
}

#[test]
fn method_receivers_share_the_record() {
    let source = "record Counter(count: Int)\n\
                  fun (Counter).bump() { self.count = self.count + 1 }\n\
                  let c = new Counter(0)\n\
                  c.bump()\n\
                  c.bump()\n\
                  println(c.count)";
    assert_eq!(run(source), "2\n");
}

#[test]
fn string_parse_methods_yield_value_or_none() {
    assert_eq!(run("println(\"42\".int())"), "42\n");
    assert_eq!(run("println(\"oops\".int())"), "none\n");
    assert_eq!(run("println(\"2.5\".double())"), "2.5\n");
}

#[test]
fn lists_index_and_grow() {
    let source = "let l = [1, 2, 3]\n\
                  println(l[1])\n\
                  l[0] = 9\n\
                  add(l, 4)\n\
                  println(l)\n\
                  println(len(l))";
    assert_eq!(run(source), "2\n[9, 2, 3, 4]\n4\n");
}

#[test]
fn sets_deduplicate() {
    let source = "let s = {1, 2, 1}\n\
                  add(s, 2)\n\
                  add(s, 3)\n\
                  println(s)\n\
                  println(len(s))";
    assert_eq!(run(source), "{1, 2, 3}\n3\n");
}

#[test]
fn maps_read_write_and_miss_to_none() {
    let source = "let m = {\"a\": 1}\n\
                  println(m[\"a\"])\n\
                  println(m[\"b\"])\n\
                  m[\"b\"] = 2\n\
                  println(m[\"b\"])";
    assert_eq!(run(source), "1\nnone\n2\n");
}

#[test]
fn tuples_index_by_constant() {
    let source = "let t = (1, \"two\")\n\
                  println(t[0])\n\
                  println(t[1])";
    assert_eq!(run(source), "1\ntwo\n");
}

#[test]
fn strings_index_to_chars() {
    assert_eq!(run("println(\"abc\"[1])"), "b\n");
    assert_eq!(run("println(len(\"abc\"))"), "3\n");
}

#[test]
fn add_rechecks_the_element_type_at_runtime() {
    let source = "let l = [1]\n\
                  add(l, \"s\")";
    assert_eq!(
        run_panics(source),
        "A value of type 'String' cannot be added to 'Int[]'"
    );
}

#[test]
fn division_by_zero_panics() {
    assert_eq!(run_panics("println(1 / 0)"), "Division by zero");
    assert_eq!(run_panics("println(1l / 0l)"), "Division by zero");
    // Float division is IEEE and never panics.
    assert_eq!(run("println(1.0 / 0.0)"), "inf\n");
}

#[test]
fn index_out_of_bounds_panics() {
    assert_eq!(run_panics("println([1, 2][5])"), "Index out of bounds");
    assert_eq!(run_panics("let l = [1]\nl[3] = 0"), "Index out of bounds");
}

#[test]
fn try_absorbs_a_panic_into_none() {
    assert_eq!(run("println(try 1 / 0)"), "none\n");
    assert_eq!(run("println(try 4 / 2)"), "2\n");
}

#[test]
fn panic_unwinds_with_its_message() {
    assert_eq!(run_panics("panic \"boom\""), "boom");
    let source = "fun f() { panic \"inner\" }\n\
                  f()";
    assert_eq!(run_panics(source), "inner");
}

#[test]
fn numeric_casts_convert_the_representation() {
    assert_eq!(run("println(3.7 as Int)"), "3\n");
    assert_eq!(run("println(1 as Double)"), "1.0\n");
    assert_eq!(run("println(typeOf(1 as Long))"), "Long\n");
}

#[test]
fn failed_downcast_panics() {
    let source = "let a: Any = \"s\"\n\
                  let b = a as Int\n\
                  println(b)";
    assert_eq!(run_panics(source), "CastError: String cannot be cast to Int");
}

#[test]
fn type_of_reports_runtime_types() {
    assert_eq!(run("println(typeOf(1))"), "Int\n");
    assert_eq!(run("println(typeOf([1]))"), "Int[]\n");
    assert_eq!(run("println(typeOf(none))"), "None\n");
}

#[test]
fn string_builtin_formats_values() {
    assert_eq!(run("println(string(1) + \"!\")"), "1!\n");
    assert_eq!(run("print(\"no newline\")"), "no newline");
}

#[test]
fn equality_is_by_value() {
    assert_eq!(run("println((1, \"a\") == (1, \"a\"))"), "true\n");
    assert_eq!(run("println((1, \"a\") == (2, \"a\"))"), "false\n");
    assert_eq!(run("println(\"ab\" == \"a\" + \"b\")"), "true\n");
    assert_eq!(run("let x: Int | None = none\nprintln(x == none)"), "true\n");
}
