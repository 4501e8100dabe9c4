// tests/cli_tests.rs
#![cfg(feature = "cli")]

use serde_json::json;
use sprig_lang::cli::{
    CheckOptions, CheckResult, CliError, bindings_from_json, execute_check, json_to_value,
    list_tokens, translate_sql, value_to_json,
};
use sprig_lang::{CompileError, EvalError, Value};

fn run(expression: &str, bindings: Option<&str>) -> Result<CheckResult, CliError> {
    execute_check(&CheckOptions {
        expression: expression.to_string(),
        bindings: bindings.map(str::to_string),
        ..CheckOptions::default()
    })
}

fn output(result: Result<CheckResult, CliError>) -> serde_json::Value {
    match result.unwrap() {
        CheckResult::Success(value) => value,
        other => panic!("expected evaluation output, got {:?}", other),
    }
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_eval_with_bindings() {
    assert_eq!(output(run("foo + 1", Some(r#"{"foo": 2}"#))), json!(3));
    assert_eq!(output(run("price * 1.5", Some(r#"{"price": 3}"#))), json!(4.5));
}

#[test]
fn test_eval_without_bindings() {
    assert_eq!(output(run("'a' + 'b'", None)), json!("ab"));
    assert_eq!(output(run("[1, true, null]", Some(""))), json!([1, true, null]));
}

#[test]
fn test_nested_objects_bind_dotted_names() {
    let bindings = r#"{"user": {"age": 20, "tags": ["admin"]}}"#;
    assert_eq!(
        output(run("user.age >= 18 && 'admin' in user.tags", Some(bindings))),
        json!(true)
    );
}

#[test]
fn test_missing_variable() {
    assert!(matches!(
        run("foo", Some("{}")),
        Err(CliError::Eval(EvalError::Lookup { .. }))
    ));
}

#[test]
fn test_relaxed_type_checks() {
    let result = execute_check(&CheckOptions {
        expression: "1 + 'a'".to_string(),
        checks_types: false,
        ..CheckOptions::default()
    });
    assert!(matches!(
        result,
        Err(CliError::Eval(EvalError::Operation { .. }))
    ));
}

// ============================================================================
// Syntax check
// ============================================================================

#[test]
fn test_syntax_only_lists_variables() {
    let result = execute_check(&CheckOptions {
        expression: "a + b > a".to_string(),
        syntax_only: true,
        ..CheckOptions::default()
    })
    .unwrap();

    match result {
        CheckResult::SyntaxValid { variables } => assert_eq!(variables, vec!["a", "b"]),
        other => panic!("expected syntax result, got {:?}", other),
    }
}

#[test]
fn test_compile_error() {
    assert!(matches!(
        run("(1 + 2", None),
        Err(CliError::Compile(CompileError::Syntax(_)))
    ));
}

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_bindings_must_be_an_object() {
    assert!(matches!(run("1", Some("[1, 2]")), Err(CliError::InvalidBindings(_))));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(run("1", Some("{foo")), Err(CliError::Json(_))));
}

#[test]
fn test_objects_inside_arrays_are_rejected() {
    assert!(matches!(
        bindings_from_json(json!({"items": [{"a": 1}]})),
        Err(CliError::InvalidBindings(_))
    ));
}

#[test]
fn test_bindings_flatten() {
    let bindings = bindings_from_json(json!({"a": {"b": {"c": "deep"}}, "n": 1})).unwrap();
    assert_eq!(bindings.get("a.b.c"), Some(&Value::from("deep")));
    assert_eq!(bindings.get("n"), Some(&Value::Number(1.0)));
    assert_eq!(bindings.len(), 2);
}

#[test]
fn test_value_conversion() {
    assert_eq!(json_to_value(json!([1, "x"])).unwrap(), Value::from(vec![
        Value::Number(1.0),
        Value::from("x"),
    ]));
    assert_eq!(value_to_json(Value::Number(2.0)), json!(2));
    assert_eq!(value_to_json(Value::Number(2.5)), json!(2.5));
    assert_eq!(value_to_json(Value::Number(f64::NAN)), json!(null));
}

// ============================================================================
// Tokens and SQL
// ============================================================================

#[test]
fn test_list_tokens() {
    assert_eq!(
        list_tokens("1 + -a").unwrap(),
        vec!["Numeric\t1", "ModifierOp\t+", "PrefixOp\t-", "Variable\ta"]
    );
}

#[test]
fn test_translate_sql() {
    assert_eq!(translate_sql("a == 1", None).unwrap(), "[a] = 1");
    assert_eq!(
        translate_sql("d > '2014-01-02'", Some("%Y/%m/%d")).unwrap(),
        "[d] > '2014/01/02'"
    );
    assert!(matches!(
        translate_sql("a ? 1 : 2", None),
        Err(CliError::Sql(_))
    ));
}
