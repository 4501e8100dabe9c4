//! JSON <-> Value conversion utilities

use std::collections::HashMap;

use super::CliError;
use crate::Value;

/// Convert a JSON scalar or array to a Value.
///
/// Objects have no `Value` counterpart; at the top level of the bindings
/// they are flattened by [`bindings_from_json`], anywhere else they are
/// rejected.
pub fn json_to_value(v: serde_json::Value) -> Result<Value, CliError> {
    let value = match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) => Value::Number(f),
            None => return Err(CliError::InvalidBindings(format!("number {} out of range", n))),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(
            arr.into_iter()
                .map(json_to_value)
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(_) => {
            return Err(CliError::InvalidBindings(
                "objects are only allowed as binding values, not inside arrays".to_string(),
            ));
        }
    };
    Ok(value)
}

/// Convert a Value to JSON. Integral numbers become JSON integers and
/// date-times become RFC 3339 strings.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            serde_json::Value::Number((n as i64).into())
        }
        Value::Number(n) => serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        dt @ Value::DateTime(_) => serde_json::Value::String(dt.to_string()),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
    }
}

/// Turn a JSON object into variable bindings.
///
/// Nested objects are flattened into dotted names, so `{"user": {"age": 3}}`
/// binds `user.age`, which is what an accessor looks up.
pub fn bindings_from_json(json: serde_json::Value) -> Result<HashMap<String, Value>, CliError> {
    let serde_json::Value::Object(map) = json else {
        return Err(CliError::InvalidBindings(
            "bindings must be a JSON object".to_string(),
        ));
    };

    let mut bindings = HashMap::new();
    flatten_into(&mut bindings, None, map)?;
    Ok(bindings)
}

fn flatten_into(
    bindings: &mut HashMap<String, Value>,
    prefix: Option<&str>,
    map: serde_json::Map<String, serde_json::Value>,
) -> Result<(), CliError> {
    for (key, value) in map {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key,
        };
        match value {
            serde_json::Value::Object(inner) => flatten_into(bindings, Some(&name), inner)?,
            other => {
                bindings.insert(name, json_to_value(other)?);
            }
        }
    }
    Ok(())
}
