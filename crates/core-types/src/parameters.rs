//! Typed, case-insensitive parameter storage for action construction.
//!
//! Configuration values arrive loosely typed (scalars and lists of mixed
//! scalars). `ParameterBag` keeps them as [`ParameterValue`]s and hands them to
//! action builders through [`FromParameter`], which is the single place where
//! an untyped list is coerced into a typed one.

use crate::error::CoreError;
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::hash_map;

/// A single parameter value as it comes out of configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// An ordered list whose elements carry no declared type.
    List(Vec<ParameterValue>),
}

impl ParameterValue {
    /// A short name for the stored shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParameterValue::Boolean(_) => "boolean",
            ParameterValue::Integer(_) => "integer",
            ParameterValue::Float(_) => "float",
            ParameterValue::Text(_) => "text",
            ParameterValue::List(_) => "list",
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Boolean(value)
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(values: Vec<T>) -> Self {
        ParameterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a stored [`ParameterValue`] into a concrete Rust type.
///
/// Scalars only convert on an exact shape match. `Vec<T>` converts from an
/// untyped list when every element converts through [`FromParameter::from_element`].
pub trait FromParameter: Sized {
    /// Human readable name of the requested shape.
    fn type_name() -> String;

    fn from_parameter(value: &ParameterValue) -> Option<Self>;

    /// Conversion applied to each element of an untyped list. Defaults to
    /// the exact rule; overridden where a lossless widening exists.
    fn from_element(value: &ParameterValue) -> Option<Self> {
        Self::from_parameter(value)
    }
}

impl FromParameter for ParameterValue {
    fn type_name() -> String {
        "any".to_string()
    }

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromParameter for String {
    fn type_name() -> String {
        "text".to_string()
    }

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Text(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl FromParameter for i64 {
    fn type_name() -> String {
        "integer".to_string()
    }

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Integer(number) => Some(*number),
            _ => None,
        }
    }
}

/// Largest integer magnitude an `f64` represents exactly.
const MAX_EXACT_F64_INT: u64 = 1 << 53;

impl FromParameter for f64 {
    fn type_name() -> String {
        "float".to_string()
    }

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Float(number) => Some(*number),
            _ => None,
        }
    }

    fn from_element(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Integer(number) if number.unsigned_abs() <= MAX_EXACT_F64_INT => {
                Some(*number as f64)
            }
            other => Self::from_parameter(other),
        }
    }
}

impl FromParameter for bool {
    fn type_name() -> String {
        "boolean".to_string()
    }

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl<T: FromParameter> FromParameter for Vec<T> {
    fn type_name() -> String {
        format!("list of {}", T::type_name())
    }

    fn from_parameter(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::List(items) => items.iter().map(T::from_element).collect(),
            _ => None,
        }
    }
}

/// An order-agnostic, case-insensitive key/value store of action parameters.
///
/// A bag is created per action build, populated from configuration and
/// consumed by exactly one builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    entries: HashMap<String, ParameterValue>,
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from key/value pairs, failing on the first invalid or
    /// duplicate key.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParameterValue>,
    {
        let mut bag = Self::new();
        bag.extend(entries)?;
        Ok(bag)
    }

    /// Adds a parameter. Keys are compared case-insensitively.
    pub fn add(&mut self, key: &str, value: impl Into<ParameterValue>) -> Result<(), CoreError> {
        if key.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "parameter key must not be empty".to_string(),
            ));
        }

        match self.entries.entry(normalize(key)) {
            hash_map::Entry::Occupied(_) => Err(CoreError::DuplicateParameter(key.to_string())),
            hash_map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                Ok(())
            }
        }
    }

    /// Adds every pair in `entries`. Stops at the first failure; pairs added
    /// before the failure stay in the bag.
    pub fn extend<I, K, V>(&mut self, entries: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParameterValue>,
    {
        for (key, value) in entries {
            self.add(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Reads a parameter as `T`.
    pub fn get<T: FromParameter>(&self, key: &str) -> Result<T, CoreError> {
        let value = self
            .entries
            .get(&normalize(key))
            .ok_or_else(|| CoreError::ParameterNotFound(key.to_string()))?;

        T::from_parameter(value).ok_or_else(|| CoreError::InvalidParameterType {
            key: key.to_string(),
            expected: T::type_name(),
            found: value.kind(),
        })
    }

    /// The raw stored value, if any.
    pub fn value(&self, key: &str) -> Option<&ParameterValue> {
        self.entries.get(&normalize(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize(key))
    }

    /// True when `key` exists and reads successfully as `T`.
    pub fn contains_typed<T: FromParameter>(&self, key: &str) -> bool {
        self.value(key)
            .is_some_and(|value| T::from_parameter(value).is_some())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParameterValue> {
        self.entries.remove(&normalize(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates the stored values in no particular order.
    pub fn values(&self) -> hash_map::Values<'_, String, ParameterValue> {
        self.entries.values()
    }
}

impl<'a> IntoIterator for &'a ParameterBag {
    type Item = &'a ParameterValue;
    type IntoIter = hash_map::Values<'a, String, ParameterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}
