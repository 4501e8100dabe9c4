//! Variable bindings supplied at evaluation time.
//!
//! The evaluator only ever asks a [`Parameters`] implementation for a value
//! by name. Plain maps are adapted through [`MapParameters`], which widens
//! every stored value into a [`Value`] (all integer widths become
//! `Value::Number`) before an operator sees it.

use std::collections::{BTreeMap, HashMap};

use crate::value::Value;

/// Source of variable values, queried by name.
pub trait Parameters {
    /// Returns the bound value, or `None` when the name is unbound.
    fn get(&self, name: &str) -> Option<Value>;
}

/// Bindings with no variables at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyParameters;

impl Parameters for EmptyParameters {
    fn get(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Adapts a name-to-value map into [`Parameters`].
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use sprig_lang::{MapParameters, Parameters, Value};
///
/// let mut bindings = HashMap::new();
/// bindings.insert("retries".to_string(), 3_u8);
///
/// let params = MapParameters::new(&bindings);
/// assert_eq!(params.get("retries"), Some(Value::Number(3.0)));
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MapParameters<'a, M: ?Sized> {
    map: &'a M,
}

impl<'a, M: ?Sized> MapParameters<'a, M> {
    pub fn new(map: &'a M) -> Self {
        MapParameters { map }
    }
}

impl<V> Parameters for MapParameters<'_, HashMap<String, V>>
where
    V: Clone + Into<Value>,
{
    fn get(&self, name: &str) -> Option<Value> {
        self.map.get(name).cloned().map(Into::into)
    }
}

impl<V> Parameters for MapParameters<'_, HashMap<&str, V>>
where
    V: Clone + Into<Value>,
{
    fn get(&self, name: &str) -> Option<Value> {
        self.map.get(name).cloned().map(Into::into)
    }
}

impl<V> Parameters for MapParameters<'_, BTreeMap<String, V>>
where
    V: Clone + Into<Value>,
{
    fn get(&self, name: &str) -> Option<Value> {
        self.map.get(name).cloned().map(Into::into)
    }
}

impl Parameters for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}

impl Parameters for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        BTreeMap::get(self, name).cloned()
    }
}

/// Any closure from name to optional value.
impl<F> Parameters for F
where
    F: Fn(&str) -> Option<Value>,
{
    fn get(&self, name: &str) -> Option<Value> {
        self(name)
    }
}
