//! Dynamic parameter values and their canonical forms.
//!
//! Declarations arrive from YAML or JSON with loosely typed values: a key may
//! be a string or a list, options may be any mapping. [`ParamValue`] holds the
//! raw value with mapping order preserved; the helpers here turn it into the
//! canonical types the command builders consume, or reject it with a
//! [`ValidationError`] naming the field.

use crate::error::ValidationError;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A raw declared value, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<ParamValue>),
    /// Mapping entries in declaration order.
    Hash(Vec<(String, ParamValue)>),
}

impl ParamValue {
    /// Short rendering of the value for error messages.
    pub fn summary(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Build a hash from `(key, value)` pairs, keeping their order.
    pub fn hash<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ParamValue)>,
    {
        ParamValue::Hash(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an array of strings.
    pub fn strings<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        ParamValue::Array(
            items
                .into_iter()
                .map(|s| ParamValue::String(s.into()))
                .collect(),
        )
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::Integer(i) => serializer.serialize_i64(*i),
            ParamValue::Float(f) => serializer.serialize_f64(*f),
            ParamValue::String(s) => serializer.serialize_str(s),
            ParamValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ParamValue::Hash(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

struct ParamValueVisitor;

impl<'de> Visitor<'de> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, number, string, sequence or mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ParamValue, E> {
        Ok(ParamValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ParamValue, E> {
        Ok(ParamValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ParamValue, E> {
        i64::try_from(v)
            .map(ParamValue::Integer)
            .map_err(|_| E::custom(format!("integer {} is out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ParamValue, E> {
        Ok(ParamValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ParamValue, E> {
        Ok(ParamValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ParamValue, E> {
        Ok(ParamValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ParamValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ParamValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ParamValue, A::Error> {
        let mut entries: Vec<(String, ParamValue)> = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, ParamValue>()? {
            if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
                existing.1 = value;
            } else {
                entries.push((key, value));
            }
        }
        Ok(ParamValue::Hash(entries))
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ParamValueVisitor)
    }
}

#[cfg(feature = "schema")]
impl schemars::JsonSchema for ParamValue {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "ParamValue".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "description": "Any declared value; shape is checked per parameter",
            "type": ["boolean", "integer", "number", "string", "array", "object"]
        })
    }
}

/// One signing key or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Check the shape of a raw `key`-style parameter.
    ///
    /// Unquoted all-digit ids parse as integers in YAML and are rejected as
    /// not a string rather than silently reformatted.
    pub fn from_param(field: &str, value: &ParamValue) -> Result<Self, ValidationError> {
        match value {
            ParamValue::Array(_) => Ok(OneOrMany::Many(string_array(field, value)?)),
            ParamValue::Hash(_) => Err(ValidationError::NotAnArray {
                field: field.to_string(),
                found: value.summary(),
            }),
            scalar => Ok(OneOrMany::One(string_value(field, scalar)?)),
        }
    }

    /// Normalise into a sequence. An empty scalar yields an empty sequence.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) if s.is_empty() => Vec::new(),
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(items) => items,
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(value: Vec<String>) -> Self {
        OneOrMany::Many(value)
    }
}

/// Require an array of strings.
pub fn string_array(field: &str, value: &ParamValue) -> Result<Vec<String>, ValidationError> {
    let ParamValue::Array(items) = value else {
        return Err(ValidationError::NotAnArray {
            field: field.to_string(),
            found: value.summary(),
        });
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| string_value(&format!("{}[{}]", field, i), item))
        .collect()
}

/// Require a string.
pub fn string_value(field: &str, value: &ParamValue) -> Result<String, ValidationError> {
    match value {
        ParamValue::String(s) => Ok(s.clone()),
        other => Err(ValidationError::NotAString {
            field: field.to_string(),
            found: other.summary(),
        }),
    }
}

/// Scalar value of a command-line flag.
///
/// Floats are not accepted: `1.10` would render as `1.1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CliValue {
    Bool(bool),
    Integer(i64),
    String(String),
}

impl fmt::Display for CliValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliValue::Bool(b) => write!(f, "{}", b),
            CliValue::Integer(i) => write!(f, "{}", i),
            CliValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CliValue {
    fn from(value: bool) -> Self {
        CliValue::Bool(value)
    }
}

impl From<&str> for CliValue {
    fn from(value: &str) -> Self {
        CliValue::String(value.to_string())
    }
}

/// Ordered flag list rendered as `-flag=value` tokens.
///
/// Flag names are stored without leading dashes, so `-config` and `config`
/// address the same entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions(Vec<(String, CliValue)>);

impl CliOptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(flag: &str) -> &str {
        flag.trim_start_matches('-')
    }

    /// Set a flag, replacing the value in place if it is already present.
    pub fn insert(&mut self, flag: &str, value: impl Into<CliValue>) {
        let name = Self::normalize(flag);
        let value = value.into();
        if let Some(existing) = self.0.iter_mut().find(|(k, _)| k == name) {
            existing.1 = value;
        } else {
            self.0.push((name.to_string(), value));
        }
    }

    pub fn get(&self, flag: &str) -> Option<&CliValue> {
        let name = Self::normalize(flag);
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CliValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Layer these options over `defaults`: defaults keep their position,
    /// matching flags take this set's value, new flags follow in order.
    pub fn merged_over(self, defaults: CliOptions) -> CliOptions {
        let mut merged = defaults;
        for (flag, value) in self.0 {
            merged.insert(&flag, value);
        }
        merged
    }

    /// `-flag=value` tokens in order.
    pub fn to_flags(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(k, v)| format!("-{}={}", k, v))
            .collect()
    }

    /// The single `-flag=value` token for one flag, if set.
    pub fn flag(&self, flag: &str) -> Option<String> {
        let name = Self::normalize(flag);
        self.get(name).map(|v| format!("-{}={}", name, v))
    }

    /// Check the shape of a raw options mapping.
    pub fn from_param(field: &str, value: &ParamValue) -> Result<Self, ValidationError> {
        let ParamValue::Hash(entries) = value else {
            return Err(ValidationError::NotAHash {
                field: field.to_string(),
                found: value.summary(),
            });
        };
        let mut options = CliOptions::new();
        for (flag, raw) in entries {
            let value = match raw {
                ParamValue::Bool(b) => CliValue::Bool(*b),
                ParamValue::Integer(i) => CliValue::Integer(*i),
                ParamValue::String(s) => CliValue::String(s.clone()),
                other => {
                    return Err(ValidationError::InvalidOptionValue {
                        field: field.to_string(),
                        flag: flag.clone(),
                        found: other.summary(),
                    });
                }
            };
            options.insert(flag, value);
        }
        Ok(options)
    }
}

impl<K: AsRef<str>, V: Into<CliValue>> FromIterator<(K, V)> for CliOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = CliOptions::new();
        for (k, v) in iter {
            options.insert(k.as_ref(), v);
        }
        options
    }
}

impl Serialize for CliOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(&format!("-{}", k), v)?;
        }
        map.end()
    }
}
