//! Caller-supplied argument bag.
//!
//! `Args` maps logical parameter names to native values. Values keep enough
//! shape (list vs mapping vs scalar) for the engine to check them against
//! the declared descriptor; mappings preserve insertion order because
//! key/value flattening numbers entries in that order.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
/// One native argument value.
pub enum ArgValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    List(Vec<ArgValue>),
    Map(Vec<(String, ArgValue)>),
}

impl ArgValue {
    /// Build an ordered mapping from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ArgValue>,
    {
        ArgValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list from anything convertible into argument values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ArgValue>,
    {
        ArgValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    /// Short label used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::Null => "null",
            ArgValue::Bool(_) => "boolean",
            ArgValue::Number(_) => "number",
            ArgValue::String(_) => "string",
            ArgValue::Date(_) => "date",
            ArgValue::List(_) => "list",
            ArgValue::Map(_) => "map",
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::String(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Number(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Number(value as f64)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Number(f64::from(value))
    }
}

impl From<DateTime<Utc>> for ArgValue {
    fn from(value: DateTime<Utc>) -> Self {
        ArgValue::Date(value)
    }
}

impl<V: Into<ArgValue>> From<Vec<V>> for ArgValue {
    fn from(items: Vec<V>) -> Self {
        ArgValue::list(items)
    }
}

impl<V: Into<ArgValue>> From<Option<V>> for ArgValue {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(ArgValue::Null)
    }
}

impl From<Value> for ArgValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ArgValue::Null,
            Value::Bool(b) => ArgValue::Bool(b),
            // Every JSON number fits an f64 (possibly rounded).
            Value::Number(n) => n.as_f64().map(ArgValue::Number).unwrap_or(ArgValue::Null),
            Value::String(s) => ArgValue::String(s),
            Value::Array(items) => ArgValue::List(items.into_iter().map(ArgValue::from).collect()),
            Value::Object(map) => {
                ArgValue::Map(map.into_iter().map(|(k, v)| (k, ArgValue::from(v))).collect())
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Arguments for one invocation, keyed by logical parameter name.
pub struct Args {
    values: BTreeMap<String, ArgValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<ArgValue> {
        self.values.remove(name)
    }

    /// Present, non-null value for `name`.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Build arguments from a JSON object such as `{"MarketplaceId": "..."}`.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Ok(Self::default()),
            other => bail!(
                "arguments must be a JSON object, got {}",
                ArgValue::from(other).kind()
            ),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Args
where
    K: Into<String>,
    V: Into<ArgValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut args = Args::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}
