use std::rc::Rc;

use servo_code::{make, Instructions, Opcode};
use servo_compiler::{compile, Bytecode, Compiler};
use servo_object::Object;
use servo_vm::{is_truthy, new_globals, run, Vm};

/// Helper: run source through the whole pipeline and return the last-popped
/// value.
fn run_source(source: &str) -> Rc<Object> {
    let program = servo_parser::parse(source, None)
        .unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"));
    let bytecode =
        compile(&program).unwrap_or_else(|e| panic!("compile failed for {source:?}: {e}"));
    run(bytecode, None).unwrap_or_else(|e| panic!("run failed for {source:?}: {e}"))
}

/// Helper: run source and return the VM error it must produce.
fn run_source_err(source: &str) -> String {
    let program = servo_parser::parse(source, None).unwrap();
    let bytecode = compile(&program).unwrap();
    run(bytecode, None)
        .expect_err(&format!("expected a VM error for {source:?}"))
        .to_string()
}

fn assert_integer(source: &str, expected: i64) {
    let result = run_source(source);
    assert_eq!(
        result.as_ref(),
        &Object::Integer(expected),
        "wrong result for {source:?}"
    );
}

fn assert_boolean(source: &str, expected: bool) {
    let result = run_source(source);
    assert_eq!(
        result.as_ref(),
        &Object::Boolean(expected),
        "wrong result for {source:?}"
    );
}

fn assert_string(source: &str, expected: &str) {
    let result = run_source(source);
    assert_eq!(
        result.as_ref(),
        &Object::Str(expected.to_string()),
        "wrong result for {source:?}"
    );
}

// ── Integer arithmetic ──────────────────────────────────────────────────

#[test]
fn integer_arithmetic() {
    assert_integer("1;", 1);
    assert_integer("1 + 2;", 3);
    assert_integer("1 - 2;", -1);
    assert_integer("4 * 5;", 20);
    assert_integer("10 / 3;", 3);
    assert_integer("10 % 3;", 1);
    assert_integer("2 ^ 10;", 1024);
    assert_integer("5 + 5 + 5 + 5 - 10;", 10);
    assert_integer("50 / 2 * 2 + 10 - 5;", 55);
    assert_integer("5 * (2 + 10);", 60);
    assert_integer("-5;", -5);
    assert_integer("-5 + 10;", 5);
    assert_integer("-(5 + 5) + 20;", 10);
}

#[test]
fn the_last_popped_value_wins() {
    assert_integer("1 + 2; 3 * 4;", 12);
}

// ── Booleans and comparison ─────────────────────────────────────────────

#[test]
fn boolean_expressions() {
    assert_boolean("true;", true);
    assert_boolean("false;", false);
    assert_boolean("1 < 2;", true);
    assert_boolean("1 > 2;", false);
    assert_boolean("1 == 1;", true);
    assert_boolean("1 != 1;", false);
    assert_boolean("1 == 2;", false);
    assert_boolean("1 != 2;", true);
    assert_boolean("true == true;", true);
    assert_boolean("false == false;", true);
    assert_boolean("true == false;", false);
    assert_boolean("true != false;", true);
    assert_boolean("(1 < 2) == true;", true);
    assert_boolean("(1 > 2) == false;", true);
}

#[test]
fn mirrored_comparison_agrees() {
    // Both spellings of the same comparison evaluate alike.
    assert_boolean("1 < 2;", true);
    assert_boolean("2 > 1;", true);
}

#[test]
fn string_equality_is_identity() {
    // Two separate pool constants are distinct objects.
    assert_boolean(r#""one" == "one";"#, false);
    assert_boolean(r#""one" != "one";"#, true);
}

#[test]
fn bang_operator() {
    assert_boolean("!true;", false);
    assert_boolean("!false;", true);
    assert_boolean("!!true;", true);
    assert_boolean("!5;", false);
    assert_boolean("!!5;", true);
    assert_boolean("!0;", false);
}

// ── Conditionals ────────────────────────────────────────────────────────

#[test]
fn if_else_selects_the_branch() {
    assert_integer("if (1 == 1) { 10; } else { 20; };", 10);
    assert_integer("if (1 == 2) { 10; } else { 20; };", 20);
}

#[test]
fn if_variants() {
    assert_integer("if (true) { 10; };", 10);
    assert_integer("if (1 < 2) { 10; } else { 20; };", 10);
    assert_integer("if (1 > 2) { 10; } else { 20; };", 20);
    assert_integer("if (false) { 10; } else { 20; };", 20);
}

#[test]
fn if_without_else_yields_null_when_not_taken() {
    let result = run_source("if (false) { 10; };");
    assert_eq!(result.as_ref(), &Object::Null);
}

#[test]
fn conditions_follow_integer_truthiness() {
    // Zero and positive integers are truthy; negatives are not.
    assert_integer("if (0) { 10; } else { 20; };", 10);
    assert_integer("if (5) { 10; } else { 20; };", 10);
    assert_integer("if (0 - 1) { 10; } else { 20; };", 20);
}

#[test]
fn else_if_chains_run() {
    assert_integer(
        "let x = 3; if (x == 1) { 10; } else if (x == 3) { 30; } else { 50; };",
        30,
    );
}

#[test]
fn truthiness_law() {
    // `OpJumpNotTruthy` branches exactly when `is_truthy` says false.
    let cases: &[(&str, bool)] = &[
        ("true", true),
        ("false", false),
        ("0", true),
        ("7", true),
        ("0 - 7", false),
    ];
    for (source, truthy) in cases {
        assert_integer(
            &format!("if ({source}) {{ 1; }} else {{ 2; }};"),
            if *truthy { 1 } else { 2 },
        );
    }
    assert!(is_truthy(&Object::Boolean(true)));
    assert!(!is_truthy(&Object::Boolean(false)));
    assert!(is_truthy(&Object::Integer(0)));
    assert!(!is_truthy(&Object::Integer(-1)));
    assert!(!is_truthy(&Object::Null));
    assert!(is_truthy(&Object::Str("".into())));
    assert!(is_truthy(&Object::Array(Vec::new())));
}

// ── Globals ─────────────────────────────────────────────────────────────

#[test]
fn global_declarations_and_reads() {
    assert_integer("let one = 1; one;", 1);
    assert_integer("let one = 1; let two = 2; one + two;", 3);
    assert_integer("let one = 1; let two = one + one; one + two;", 3);
}

#[test]
fn type_only_declaration_reads_as_null() {
    let result = run_source("let x -> Number; x;");
    assert_eq!(result.as_ref(), &Object::Null);
}

#[test]
fn assignment_updates_and_yields_the_value() {
    assert_integer("let a = 1; a = a + 1; a;", 2);
    // The assignment itself is an expression with a value.
    assert_integer("let a = 1; a = 5;", 5);
}

#[test]
fn globals_persist_across_runs_through_a_shared_store() {
    // First turn: define a.
    let program = servo_parser::parse("let a = 40;", None).unwrap();
    let mut compiler = Compiler::new();
    compiler.compile(&program).unwrap();
    let bytecode = compiler.bytecode();
    let (symbols, constants) = compiler.into_state();

    let mut vm = Vm::with_global_store(bytecode, new_globals());
    vm.run().unwrap();
    let globals = vm.into_global_store();

    // Second turn: read it back with carried-over compiler state.
    let program = servo_parser::parse("a + 2;", None).unwrap();
    let mut compiler = Compiler::with_state(symbols, constants);
    compiler.compile(&program).unwrap();

    let result = run(compiler.bytecode(), Some(globals)).unwrap();
    assert_eq!(result.as_ref(), &Object::Integer(42));
}

// ── Composite values ────────────────────────────────────────────────────

#[test]
fn array_literals_build_arrays_in_order() {
    let result = run_source("let a = [1, 2, 3]; a;");
    let Object::Array(elements) = result.as_ref() else {
        panic!("expected an array, got {result:?}");
    };
    let values: Vec<_> = elements.iter().map(|e| e.as_ref().clone()).collect();
    assert_eq!(
        values,
        vec![Object::Integer(1), Object::Integer(2), Object::Integer(3)]
    );
}

#[test]
fn array_elements_may_be_expressions() {
    let result = run_source("[1 + 2, 3 * 4, 5 + 6];");
    assert_eq!(result.inspect(), "[3, 12, 11]");
}

#[test]
fn struct_instantiation_builds_a_hash() {
    let result = run_source("Point { x -> 1; y -> 2 + 3 };");
    let Object::Hash(pairs) = result.as_ref() else {
        panic!("expected a hash, got {result:?}");
    };
    assert_eq!(pairs.len(), 2);
    assert_eq!(result.inspect(), "{x: 1, y: 5}");
}

// ── Strings ─────────────────────────────────────────────────────────────

#[test]
fn string_concatenation_and_truncation() {
    assert_string(r#""ab" + 1;"#, "ab1");
    assert_string(r#""abcd" - 2;"#, "ab");
    let err = run_source_err(r#""ab" - 5;"#);
    assert_eq!(err, "cannot truncate 5 characters from a string of length 2");
}

#[test]
fn string_operations() {
    assert_string(r#""foo" + "bar";"#, "foobar");
    assert_string(r#""n = " + 42;"#, "n = 42");
    assert_string(r#""abcd" - 0;"#, "abcd");
    assert_string(r#""abcd" - 4;"#, "");
}

// ── Failure modes ───────────────────────────────────────────────────────

#[test]
fn type_errors_in_binary_operations() {
    assert_eq!(
        run_source_err("true + 1;"),
        "unsupported types for binary operation: BOOLEAN INTEGER"
    );
    assert_eq!(
        run_source_err(r#"1 + "s";"#),
        "unsupported types for binary operation: INTEGER STRING"
    );
    assert_eq!(
        run_source_err(r#""s" * 2;"#),
        "unsupported types for binary operation: STRING INTEGER"
    );
}

#[test]
fn negation_requires_an_integer() {
    assert_eq!(
        run_source_err("-true;"),
        "unsupported type for negation: BOOLEAN"
    );
}

#[test]
fn greater_than_requires_integers() {
    let err = run_source_err("true > false;");
    assert!(err.starts_with("unknown comparison operator"), "{err}");
}

#[test]
fn division_by_zero_is_an_error() {
    assert_eq!(run_source_err("1 / 0;"), "division by zero");
    assert_eq!(run_source_err("1 % 0;"), "division by zero");
}

#[test]
fn stack_overflow_is_detected() {
    // Push one constant past the stack limit without ever popping.
    let mut instructions = Instructions::new();
    for _ in 0..(servo_vm::STACK_SIZE + 1) {
        instructions.push(&make(Opcode::Constant, &[0]));
    }
    let bytecode = Bytecode {
        instructions,
        constants: vec![Rc::new(Object::Integer(1))],
    };
    let err = run(bytecode, None).unwrap_err();
    assert_eq!(err.to_string(), "stack overflow");
}

#[test]
fn unknown_opcode_is_an_error_not_a_silent_stop() {
    let bytecode = Bytecode {
        instructions: Instructions(vec![250]),
        constants: Vec::new(),
    };
    let err = run(bytecode, None).unwrap_err();
    assert_eq!(err.to_string(), "unknown opcode 250");
}

#[test]
fn unhashable_hash_keys_are_rejected() {
    // No source form produces a non-string key, so craft the bytecode:
    // push an array, push a value, build a hash.
    let mut instructions = Instructions::new();
    instructions.push(&make(Opcode::Array, &[0]));
    instructions.push(&make(Opcode::Constant, &[0]));
    instructions.push(&make(Opcode::Hash, &[2]));
    let bytecode = Bytecode {
        instructions,
        constants: vec![Rc::new(Object::Integer(1))],
    };
    let err = run(bytecode, None).unwrap_err();
    assert_eq!(err.to_string(), "unusable as hash key: ARRAY");
}

#[test]
fn stack_underflow_is_detected() {
    let bytecode = Bytecode {
        instructions: Instructions(vec![Opcode::Pop as u8]),
        constants: Vec::new(),
    };
    let err = run(bytecode, None).unwrap_err();
    assert_eq!(err.to_string(), "stack underflow");
}
