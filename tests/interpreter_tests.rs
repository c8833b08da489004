// tests/interpreter_tests.rs

use pseudo_lang::ast::Program;
use pseudo_lang::evaluator::{Evaluator, RuntimeError};
use pseudo_lang::lexer::Lexer;
use pseudo_lang::parser::Parser;
use std::io::Cursor;

fn parse(source: &str) -> Program {
    let mut parser = Parser::new(Lexer::new(source)).expect("lex error");
    parser.parse_program().expect("parse error")
}

/// Runs a program against captured output and canned input, with a fixed
/// RANDOM seed.
fn run_with_input(source: &str, input: &str) -> (Result<(), RuntimeError>, String) {
    let program = parse(source);
    let mut out = Vec::new();
    let result = {
        let mut evaluator = Evaluator::with_io(
            source,
            Box::new(&mut out),
            Box::new(Cursor::new(input.to_string())),
        )
        .with_seed(7);
        evaluator.run(&program).map(|_| ())
    };
    (result, String::from_utf8(out).expect("output is utf-8"))
}

fn run_ok(source: &str) -> String {
    let (result, output) = run_with_input(source, "");
    if let Err(e) = result {
        panic!("program failed: {} ({:?})\noutput so far: {}", e, e, output);
    }
    output
}

fn run_err(source: &str) -> RuntimeError {
    let (result, _) = run_with_input(source, "");
    match result {
        Ok(()) => panic!("expected a runtime error"),
        Err(e) => e,
    }
}

// ============================================================================
// End-to-end programs
// ============================================================================

#[test]
fn test_display_age() {
    let source = "age <- 23\nDISPLAY(\"You are\", age, \"years old.\")";
    assert_eq!(run_ok(source), "You are 23 years old.\n");
}

#[test]
fn test_procedure_add() {
    let source = "PROCEDURE add(a,b) { RETURN a + b }\nDISPLAY(add(2,3))";
    assert_eq!(run_ok(source), "5\n");
}

#[test]
fn test_determinism_with_fixed_seed_and_input() {
    let source = "DISPLAY(RANDOM(1, 1000), RANDOM(1, 1000))\nDISPLAY(INPUT())";
    let (first_result, first) = run_with_input(source, "hello\n");
    let (second_result, second) = run_with_input(source, "hello\n");
    first_result.unwrap();
    second_result.unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Arithmetic and operators
// ============================================================================

#[test]
fn test_precedence() {
    assert_eq!(run_ok("DISPLAY(1 + 2 * 3)"), "7\n");
    assert_eq!(run_ok("DISPLAY(2 * 3 + 1)"), "7\n");
}

#[test]
fn test_right_to_left_associativity() {
    // 10 - 3 - 2 evaluates as 10 - (3 - 2)
    assert_eq!(run_ok("DISPLAY(10 - 3 - 2)"), "9\n");
    assert_eq!(run_ok("DISPLAY(100 / 10 / 5)"), "50\n");
}

#[test]
fn test_parenthesized_literals_evaluate() {
    assert_eq!(run_ok("DISPLAY((42))"), "42\n");
    assert_eq!(run_ok("DISPLAY((\"a\"))"), "a\n");
    assert_eq!(run_ok("DISPLAY(((1)) + (2))"), "3\n");
}

#[test]
fn test_division() {
    assert_eq!(run_ok("DISPLAY(1 / 2)"), "0.5\n");
    assert!(matches!(
        run_err("DISPLAY(1 / 0)"),
        RuntimeError::DivisionByZero { .. }
    ));
}

#[test]
fn test_floored_modulo_sign_follows_divisor() {
    assert_eq!(run_ok("DISPLAY(-7 MOD 3)"), "2\n");
    assert_eq!(run_ok("DISPLAY(7 MOD -3)"), "-2\n");
    assert_eq!(run_ok("DISPLAY(7 % 3)"), "1\n");
    assert!(matches!(
        run_err("x <- 5\nDISPLAY(x MOD 0)"),
        RuntimeError::DivisionByZero { .. }
    ));
}

#[test]
fn test_unary_operators() {
    assert_eq!(run_ok("DISPLAY(-(2 + 3))"), "-5\n");
    assert_eq!(run_ok("DISPLAY(+4)"), "4\n");
    assert_eq!(run_ok("DISPLAY(NOT FALSE)"), "TRUE\n");
    assert!(matches!(
        run_err("DISPLAY(NOT 1)"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("DISPLAY(-\"abc\")"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_arithmetic_requires_numbers() {
    assert!(matches!(
        run_err("DISPLAY(\"a\" + 1)"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("DISPLAY(TRUE > FALSE)"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_short_circuit_logic() {
    // the right operand is never evaluated, so the undefined call is fine
    assert_eq!(run_ok("DISPLAY(FALSE AND missing())"), "FALSE\n");
    assert_eq!(run_ok("DISPLAY(TRUE OR missing())"), "TRUE\n");
    assert_eq!(run_ok("DISPLAY(TRUE AND FALSE)"), "FALSE\n");
    assert_eq!(run_ok("DISPLAY(FALSE OR TRUE)"), "TRUE\n");
    assert!(matches!(
        run_err("DISPLAY(TRUE AND 1)"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("DISPLAY(1 OR TRUE)"),
        RuntimeError::TypeError { .. }
    ));
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_array_equality_is_deep() {
    assert_eq!(run_ok("DISPLAY([1,2] = [1,2])"), "TRUE\n");
    assert_eq!(run_ok("DISPLAY([1,2] = [1,3])"), "FALSE\n");
    assert_eq!(run_ok("DISPLAY([1] = [1,2])"), "FALSE\n");
    assert_eq!(run_ok("DISPLAY([[1],[2]] != [[1],[3]])"), "TRUE\n");
}

#[test]
fn test_cross_type_equality_exceptions() {
    assert!(matches!(
        run_err("DISPLAY([1] = 1)"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("DISPLAY(\"1\" = 1)"),
        RuntimeError::TypeError { .. }
    ));
    // nested elements follow the same rules
    assert!(matches!(
        run_err("DISPLAY([\"a\"] = [1])"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_remaining_cross_type_equality_is_false() {
    assert_eq!(run_ok("DISPLAY(TRUE = 1)"), "FALSE\n");
    assert_eq!(run_ok("DISPLAY(TRUE != 1)"), "TRUE\n");
}

#[test]
fn test_string_equality() {
    assert_eq!(run_ok("DISPLAY(\"abc\" = \"abc\")"), "TRUE\n");
    assert_eq!(run_ok("DISPLAY(\"abc\" = 'abd')"), "FALSE\n");
}

#[test]
fn test_procedure_identity_equality() {
    let source = "PROCEDURE f() { RETURN 0 }\nPROCEDURE g() { RETURN 0 }\nDISPLAY(f = f, f = g)";
    assert_eq!(run_ok(source), "TRUE FALSE\n");
}

#[test]
fn test_builtin_identity_uppercase_and_lowercase_alias() {
    assert_eq!(run_ok("DISPLAY(DISPLAY = display)"), "TRUE\n");
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_escapes_are_verbatim() {
    assert_eq!(run_ok(r#"DISPLAY("a\"b")"#), "a\"b\n");
    // \n is a literal 'n', not a newline
    assert_eq!(run_ok(r#"DISPLAY("a\nb")"#), "anb\n");
}

#[test]
fn test_single_quoted_strings() {
    assert_eq!(run_ok("DISPLAY('hello')"), "hello\n");
}

// ============================================================================
// Statements and control flow
// ============================================================================

#[test]
fn test_if_else_if_selection() {
    let source = "x <- 2\n\
        IF (x = 1) { DISPLAY(\"one\") }\n\
        ELSE IF (x = 2) { DISPLAY(\"two\") }\n\
        ELSE { DISPLAY(\"many\") }";
    assert_eq!(run_ok(source), "two\n");
}

#[test]
fn test_if_condition_must_be_boolean() {
    assert!(matches!(
        run_err("IF (1) { DISPLAY(1) }"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_repeat_times_count_evaluated_once() {
    let source = "n <- 3\nREPEAT n TIMES { n <- n + 1 }\nDISPLAY(n)";
    assert_eq!(run_ok(source), "6\n");
}

#[test]
fn test_repeat_times_floors_count() {
    assert_eq!(run_ok("REPEAT 2.9 TIMES { DISPLAY(\"x\") }"), "x\nx\n");
}

#[test]
fn test_repeat_times_non_positive_runs_zero_iterations() {
    assert_eq!(run_ok("REPEAT -5 TIMES { DISPLAY(\"x\") }"), "");
    assert_eq!(run_ok("REPEAT 0.9 TIMES { DISPLAY(\"x\") }"), "");
}

#[test]
fn test_repeat_times_count_must_be_number() {
    assert!(matches!(
        run_err("REPEAT \"3\" TIMES { DISPLAY(1) }"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_repeat_until_checks_before_first_iteration() {
    assert_eq!(run_ok("REPEAT UNTIL (1 = 1) { DISPLAY(\"never\") }"), "");
}

#[test]
fn test_repeat_until_loops_until_true() {
    let source = "i <- 0\nREPEAT UNTIL (i = 3) { i <- i + 1 }\nDISPLAY(i)";
    assert_eq!(run_ok(source), "3\n");
}

#[test]
fn test_repeat_until_condition_must_be_boolean() {
    assert!(matches!(
        run_err("REPEAT UNTIL (1) { DISPLAY(1) }"),
        RuntimeError::TypeError { .. }
    ));
}

// ============================================================================
// Procedures and scoping
// ============================================================================

#[test]
fn test_parameter_binding_does_not_leak() {
    let source = "x <- 99\nPROCEDURE f(x) { x <- 1 }\nf(5)\nDISPLAY(x)";
    assert_eq!(run_ok(source), "99\n");
}

#[test]
fn test_parameter_restored_after_error_path() {
    // the failed call must not leave the parameter binding behind
    let source = "x <- 99\n\
        PROCEDURE f(x) { RETURN x MOD 0 }\n\
        f(5)";
    assert!(matches!(
        run_err(source),
        RuntimeError::DivisionByZero { .. }
    ));

    let source = "x <- 99\n\
        PROCEDURE f(x) { x <- 1 RETURN boom() }\n\
        PROCEDURE g() { RETURN x }\n\
        f(5)";
    assert!(matches!(
        run_err(source),
        RuntimeError::UndefinedIdentifier { .. }
    ));
}

#[test]
fn test_assignment_writes_through_to_globals() {
    let source = "g <- 1\nPROCEDURE bump() { g <- g + 1 }\nbump()\nbump()\nDISPLAY(g)";
    assert_eq!(run_ok(source), "3\n");
}

#[test]
fn test_new_names_inside_a_call_are_local() {
    let source = "PROCEDURE f() { t <- 41 RETURN t + 1 }\nDISPLAY(f())\nDISPLAY(t)";
    let (result, output) = run_with_input(source, "");
    assert_eq!(output, "42\n");
    assert!(matches!(
        result,
        Err(RuntimeError::UndefinedIdentifier { ref name, .. }) if name == "t"
    ));
}

#[test]
fn test_scope_completion_yields_zero() {
    let source = "PROCEDURE noop() { }\nDISPLAY(noop())";
    assert_eq!(run_ok(source), "0\n");
}

#[test]
fn test_return_unwinds_through_loops() {
    let source = "PROCEDURE find() { REPEAT 10 TIMES { RETURN 42 } RETURN 0 }\nDISPLAY(find())";
    assert_eq!(run_ok(source), "42\n");
}

#[test]
fn test_recursion() {
    let source = "PROCEDURE fact(n) {\n\
            IF (n <= 1) { RETURN 1 }\n\
            RETURN n * fact(n - 1)\n\
        }\n\
        DISPLAY(fact(6))";
    assert_eq!(run_ok(source), "720\n");
}

#[test]
fn test_arity_mismatch() {
    let source = "PROCEDURE add(a, b) { RETURN a + b }\nadd(1)";
    assert!(matches!(
        run_err(source),
        RuntimeError::ArityMismatch {
            expected: 2,
            got: 1,
            ..
        }
    ));
}

#[test]
fn test_call_target_errors() {
    assert!(matches!(
        run_err("boom()"),
        RuntimeError::UndefinedIdentifier { .. }
    ));
    assert!(matches!(
        run_err("x <- 1\nx(2)"),
        RuntimeError::NotCallable { .. }
    ));
}

#[test]
fn test_undefined_identifier() {
    assert!(matches!(
        run_err("DISPLAY(nope)"),
        RuntimeError::UndefinedIdentifier { .. }
    ));
}

#[test]
fn test_redefinition_errors() {
    assert!(matches!(
        run_err("PROCEDURE f() { }\nPROCEDURE f() { }"),
        RuntimeError::Redefinition { .. }
    ));
    assert!(matches!(
        run_err("x <- 1\nPROCEDURE x() { }"),
        RuntimeError::Redefinition { .. }
    ));
    assert!(matches!(
        run_err("PROCEDURE DISPLAY() { }"),
        RuntimeError::Redefinition { .. }
    ));
}

#[test]
fn test_assignment_to_callable_errors() {
    assert!(matches!(
        run_err("DISPLAY <- 1"),
        RuntimeError::AssignToCallable { .. }
    ));
    assert!(matches!(
        run_err("PROCEDURE f() { }\nf <- 1"),
        RuntimeError::AssignToCallable { .. }
    ));
}

#[test]
fn test_stack_depth_limit_is_a_runtime_error() {
    let source = "PROCEDURE f() { RETURN f() }\nf()";
    assert!(matches!(
        run_err(source),
        RuntimeError::StackDepthExceeded { .. }
    ));
}

#[test]
fn test_stack_depth_limit_is_configurable() {
    let source = "PROCEDURE down(n) { IF (n = 0) { RETURN 0 } RETURN down(n - 1) }\ndown(20)";
    let program = parse(source);
    let mut out = Vec::new();
    let result = {
        let mut evaluator = Evaluator::with_io(
            source,
            Box::new(&mut out),
            Box::new(Cursor::new(String::new())),
        )
        .with_max_depth(8);
        evaluator.run(&program).map(|_| ())
    };
    assert!(matches!(
        result,
        Err(RuntimeError::StackDepthExceeded { .. })
    ));
}

// ============================================================================
// Builtins
// ============================================================================

#[test]
fn test_display_formatting() {
    assert_eq!(run_ok("DISPLAY(TRUE, FALSE, 2.5, \"s\")"), "TRUE FALSE 2.5 s\n");
    assert_eq!(run_ok("DISPLAY([1, [TRUE, \"x\"]])"), "[1, [TRUE, x]]\n");
    assert_eq!(run_ok("PROCEDURE f() { }\nDISPLAY(f)"), "<proc f>\n");
    assert_eq!(run_ok("DISPLAY(APPEND)"), "<builtin APPEND>\n");
}

#[test]
fn test_display_returns_zero() {
    assert_eq!(run_ok("DISPLAY(DISPLAY(1))"), "1\n0\n");
}

#[test]
fn test_input_parses_numbers() {
    let (result, output) = run_with_input("DISPLAY(INPUT() + 1)", "41\n");
    result.unwrap();
    assert_eq!(output, "Input: 42\n");
}

#[test]
fn test_input_falls_back_to_string() {
    let (result, output) = run_with_input("DISPLAY(INPUT(\"Name?\"), \"!\")", "Ada\n");
    result.unwrap();
    assert_eq!(output, "Name?Ada !\n");
}

#[test]
fn test_input_on_end_of_input_returns_empty_string() {
    let (result, output) = run_with_input("ASSERT(INPUT() = \"\")", "");
    result.unwrap();
    assert_eq!(output, "Input: ");
}

#[test]
fn test_length() {
    assert_eq!(run_ok("DISPLAY(LENGTH([1,2,3]))"), "3\n");
    assert_eq!(run_ok("DISPLAY(length([]))"), "0\n");
    assert!(matches!(
        run_err("LENGTH(1)"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("LENGTH([1], [2])"),
        RuntimeError::ArityMismatch { .. }
    ));
    assert!(matches!(
        run_err("LENGTH()"),
        RuntimeError::ArityMismatch { .. }
    ));
}

#[test]
fn test_random_stays_in_inclusive_range() {
    let source = "REPEAT 50 TIMES {\n\
            r <- RANDOM(1, 6)\n\
            ASSERT(r >= 1 AND r <= 6)\n\
        }";
    run_ok(source);
}

#[test]
fn test_random_argument_checking() {
    assert!(matches!(
        run_err("RANDOM(1)"),
        RuntimeError::ArityMismatch { .. }
    ));
    assert!(matches!(
        run_err("RANDOM(\"a\", 2)"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("RANDOM(5, 1)"),
        RuntimeError::TypeError { .. }
    ));
}

#[test]
fn test_assert() {
    assert_eq!(run_ok("ASSERT(TRUE)"), "");
    assert!(matches!(
        run_err("ASSERT(FALSE)"),
        RuntimeError::AssertionFailed { .. }
    ));
    assert!(matches!(
        run_err("ASSERT(1)"),
        RuntimeError::AssertionFailed { .. }
    ));
    assert!(matches!(
        run_err("ASSERT()"),
        RuntimeError::AssertionFailed { .. }
    ));
}

#[test]
fn test_append_returns_new_array() {
    let source = "a <- [1]\nb <- APPEND(a, 2)\nDISPLAY(a, b)";
    assert_eq!(run_ok(source), "[1] [1, 2]\n");
}

#[test]
fn test_append_argument_checking() {
    assert!(matches!(
        run_err("APPEND(1, 2)"),
        RuntimeError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("APPEND([1])"),
        RuntimeError::ArityMismatch { .. }
    ));
}

#[test]
fn test_arrays_are_independent_snapshots() {
    let source = "a <- [1, 2]\nb <- a\nb <- APPEND(b, 3)\nDISPLAY(LENGTH(a), LENGTH(b))";
    assert_eq!(run_ok(source), "2 3\n");
}
