// crates/podcast-feed/src/value.rs
//! Input field maps and escape-or-default resolution
//!
//! Channel headers, episodes and package defaults all arrive as a [`Fields`]
//! map. Every field is looked up once through [`resolve`]: the provided value
//! wins, then the default registered under the same name.

use crate::category::CategoryTree;
use crate::error::{FeedError, FeedResult};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A loosely typed field value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawValue")]
pub enum Value {
    /// Explicit null, treated the same as an absent field
    Null,
    /// Boolean flag
    Bool(bool),
    /// Whole number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Text(String),
    /// Nested category taxonomy
    Categories(CategoryTree),
}

/// Input shapes accepted for a [`Value`]
///
/// Native TOML datetimes are tried before categories, which would otherwise
/// take the datetime's internal wrapper table for a mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Datetime(toml::value::Datetime),
    Categories(CategoryTree),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Integer(n) => Value::Integer(n),
            RawValue::Float(f) => Value::Float(f),
            RawValue::Text(s) => Value::Text(s),
            RawValue::Datetime(dt) => Value::Text(dt.to_string()),
            RawValue::Categories(tree) => Value::Categories(tree),
        }
    }
}

impl Value {
    /// Returns true for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders a scalar value as text
    ///
    /// Booleans become `true`/`false`, numbers use their decimal form.
    pub fn to_text(&self, field: &str) -> FeedResult<String> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Err(FeedError::MissingField(field.to_string())),
            Value::Categories(_) => Err(FeedError::invalid_field(
                field,
                "expected a scalar, found a category mapping",
            )),
        }
    }

    /// Interprets the value as a strictly positive whole number
    ///
    /// Fractional, non-positive and non-numeric values yield `None`.
    pub fn as_positive_integer(&self) -> Option<u32> {
        let n = match self {
            Value::Integer(n) => *n,
            Value::Float(f) if f.fract() == 0.0 => *f as i64,
            Value::Text(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        u32::try_from(n).ok().filter(|n| *n > 0)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n)
            .map(Value::Integer)
            .unwrap_or(Value::Float(n as f64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<CategoryTree> for Value {
    fn from(tree: CategoryTree) -> Self {
        Value::Categories(tree)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A mapping of field names to values
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    /// Creates an empty field map
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value for a field, ignoring explicit nulls
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Removes a field
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns true if a non-null value is present
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Resolves one field against the provided map and the defaults
///
/// Fails with [`FeedError::MissingField`] when neither map holds a value.
pub fn resolve(field: &str, provided: &Fields, defaults: &Fields) -> FeedResult<Value> {
    provided
        .get(field)
        .or_else(|| defaults.get(field))
        .cloned()
        .ok_or_else(|| FeedError::MissingField(field.to_string()))
}

/// Escapes XML special characters (`&`, `<`, `>`, `"`, `'`)
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Field lookups for one record, bound to its defaults
pub(crate) struct Resolver<'a> {
    provided: &'a Fields,
    defaults: &'a Fields,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(provided: &'a Fields, defaults: &'a Fields) -> Self {
        Self { provided, defaults }
    }

    pub(crate) fn value(&self, field: &str) -> Option<Value> {
        resolve(field, self.provided, self.defaults).ok()
    }

    /// Required field, escaped
    pub(crate) fn text(&self, field: &str) -> FeedResult<String> {
        let value = resolve(field, self.provided, self.defaults)?;
        Ok(escape(&value.to_text(field)?))
    }

    /// Optional field, escaped
    pub(crate) fn optional_text(&self, field: &str) -> FeedResult<Option<String>> {
        self.value(field)
            .map(|v| v.to_text(field).map(|s| escape(&s)))
            .transpose()
    }

    /// Optional field, stored verbatim
    pub(crate) fn raw_text(&self, field: &str) -> FeedResult<Option<String>> {
        self.value(field).map(|v| v.to_text(field)).transpose()
    }

    /// Required category taxonomy, escaped recursively
    pub(crate) fn categories(&self, field: &str) -> FeedResult<CategoryTree> {
        match resolve(field, self.provided, self.defaults)? {
            Value::Categories(tree) => Ok(tree.escaped()),
            // A lone name is a single top-level leaf
            Value::Text(name) => Ok(CategoryTree::from_names([name.as_str()]).escaped()),
            _ => Err(FeedError::invalid_field(
                field,
                "expected a category mapping or list",
            )),
        }
    }
}
