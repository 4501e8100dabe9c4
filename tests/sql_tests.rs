// tests/sql_tests.rs

use sprig_lang::{Compiler, Expression, SqlError, Value};

fn sql(text: &str) -> Result<String, SqlError> {
    Expression::new(text).unwrap().to_sql_query()
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(
        sql("age >= 18 && name != 'root'").unwrap(),
        "[age] >= 18 AND [name] <> 'root'"
    );
    assert_eq!(
        sql("a == 1 || !(b != 'x')").unwrap(),
        "[a] = 1 OR NOT ([b] <> 'x')"
    );
}

#[test]
fn test_membership_lists() {
    assert_eq!(sql("x in (1, 2, 3)").unwrap(), "[x] IN (1, 2, 3)");
    assert_eq!(sql("x in ['a', 'b']").unwrap(), "[x] IN ('a', 'b')");
}

#[test]
fn test_regex_operators() {
    assert_eq!(
        sql("name =~ '^a' && flag == true").unwrap(),
        "[name] RLIKE '^a' AND [flag] = 1"
    );
    assert_eq!(sql("name !~ 'z$'").unwrap(), "[name] NOT RLIKE 'z$'");
}

#[test]
fn test_prefix_minus_is_flush() {
    assert_eq!(sql("-x > 2").unwrap(), "-[x] > 2");
    assert_eq!(sql("-2 < x").unwrap(), "-2 < [x]");
}

#[test]
fn test_literals() {
    assert_eq!(sql("name == 'O\\'Brien'").unwrap(), "[name] = 'O''Brien'");
    assert_eq!(sql("a == null").unwrap(), "[a] = NULL");
    assert_eq!(sql("[total cost] * 2 > 10.5").unwrap(), "[total cost] * 2 > 10.5");
}

#[test]
fn test_dates_use_query_format() {
    assert_eq!(
        sql("created > '2014-01-02T15:04:05Z'").unwrap(),
        "[created] > '2014-01-02T15:04:05.000000000+00:00'"
    );

    let expr = Expression::new("created > '2014-01-02T15:04:05Z'")
        .unwrap()
        .with_date_query_format("%Y-%m-%d");
    assert_eq!(expr.to_sql_query().unwrap(), "[created] > '2014-01-02'");
}

#[test]
fn test_invalid_date_format() {
    let expr = Expression::new("created > '2014-01-02'")
        .unwrap()
        .with_date_query_format("%Q");
    assert_eq!(
        expr.to_sql_query(),
        Err(SqlError::InvalidDateFormat {
            format: "%Q".to_string()
        })
    );
}

#[test]
fn test_unsupported_constructs() {
    assert_eq!(
        sql("a ? b : c"),
        Err(SqlError::Unsupported {
            glyph: "?".to_string()
        })
    );
    assert_eq!(
        sql("a ?? b"),
        Err(SqlError::Unsupported {
            glyph: "??".to_string()
        })
    );
    assert_eq!(
        sql("a ** 2"),
        Err(SqlError::Unsupported {
            glyph: "**".to_string()
        })
    );
    assert_eq!(
        sql("user.name == 'x'"),
        Err(SqlError::Unsupported {
            glyph: "user.name".to_string()
        })
    );
}

#[test]
fn test_functions_are_unsupported() {
    let expr = Compiler::new()
        .function("now", |_: &[Value]| Ok(Value::Null))
        .compile("now() > 1")
        .unwrap();
    assert_eq!(
        expr.to_sql_query(),
        Err(SqlError::Unsupported {
            glyph: "now".to_string()
        })
    );
}

#[test]
fn test_empty_expression_renders_empty() {
    assert_eq!(sql("").unwrap(), "");
}
