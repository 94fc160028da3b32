// ── Defensive record access ──
//
// Controller entities are untyped JSON objects whose field names drift
// between releases (`reachability` vs `status`, `controlConnections` vs
// `controlConnectionsUp`). Every read goes through an explicit fallback
// chain that ends in a caller-supplied default instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One controller entity: device, policy group, profile, parcel, ...
///
/// Non-object JSON viewed as a record behaves as an empty object. JSON
/// `null` is treated the same as a missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of `key`, treating `null` as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// First key in `keys` that is present: primary key, then fallbacks.
    pub fn resolve(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Display string of the first present key, or `default`.
    pub fn resolve_str(&self, keys: &[&str], default: &str) -> String {
        self.resolve(keys)
            .map_or_else(|| default.to_owned(), display_value)
    }

    /// Display string of `key`, or `default`.
    pub fn str(&self, key: &str, default: &str) -> String {
        self.resolve_str(&[key], default)
    }

    /// Display string of the first key whose value is non-empty.
    ///
    /// Unlike [`resolve`](Self::resolve), an empty string, `false`, `0` or
    /// an empty container falls through to the next key.
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| is_truthy(value))
            .map(display_value)
    }

    /// Raw value of the first non-empty key.
    pub fn first_non_empty_value(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| is_truthy(value))
    }

    /// Nested lookup along `path`. Missing levels yield `None`.
    pub fn at(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.get(first)?;
        for key in rest {
            current = current.get(*key).filter(|v| !v.is_null())?;
        }
        Some(current)
    }

    pub fn str_at(&self, path: &[&str], default: &str) -> String {
        self.at(path).map_or_else(|| default.to_owned(), display_value)
    }

    pub fn bool_at(&self, path: &[&str], default: bool) -> bool {
        self.at(path).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Array at `path`, or an empty slice.
    pub fn array_at(&self, path: &[&str]) -> &[Value] {
        self.at(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Object at `path` as a record, or an empty record.
    pub fn record_at(&self, path: &[&str]) -> Record {
        self.at(path).cloned().map(Self::from_value).unwrap_or_default()
    }

    /// Array of objects at `path` as records.
    pub fn records_at(&self, path: &[&str]) -> Vec<Record> {
        self.array_at(path)
            .iter()
            .cloned()
            .map(Self::from_value)
            .collect()
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// View a normalized list response as records.
pub fn records(values: Vec<Value>) -> Vec<Record> {
    values.into_iter().map(Record::from_value).collect()
}

/// Render a JSON value for a table cell.
///
/// Strings are shown verbatim, `null` as empty, numbers and booleans in
/// their JSON spelling, containers as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Truthiness of a JSON value for `a or b or default` style fallbacks.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
