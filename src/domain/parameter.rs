//! Named analysis outputs.
//!
//! A [`Parameter`] is a value plus an open set of named metadata (uncertainty,
//! bounds, initial value, ...). Analyses return them grouped in a
//! [`ParameterSet`], keyed by unique name and kept in insertion order so reports
//! list them the way the analysis produced them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Any value an analysis may report.
///
/// Peak finders report plain numbers, fits report numbers with metadata, and
/// N-D analyses may report coordinate arrays, so no single numeric type fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(f64),
    Array(Vec<f64>),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            ParamValue::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Convert a JSON value.
    ///
    /// Arrays become `Array` only when every element is numeric; other arrays
    /// and objects are kept verbatim as JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(ParamValue::Null, ParamValue::Number),
            Value::String(s) => ParamValue::Text(s.clone()),
            Value::Array(items) => items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .map_or_else(|| ParamValue::Text(value.to_string()), ParamValue::Array),
            Value::Object(_) => ParamValue::Text(value.to_string()),
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(f64::from(value))
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(value: Vec<f64>) -> Self {
        ParamValue::Array(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// A named output value with optional metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value: ParamValue,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, ParamValue>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Look up a metadata attribute supplied at construction.
    pub fn attr(&self, key: &str) -> Result<&ParamValue, AnalysisError> {
        self.attributes
            .get(key)
            .ok_or_else(|| AnalysisError::UnknownAttribute {
                parameter: self.name.clone(),
                attribute: key.to_string(),
            })
    }

    /// Like [`Parameter::attr`], but the attribute must also be numeric.
    pub fn attr_f64(&self, key: &str) -> Result<f64, AnalysisError> {
        self.attr(key)?
            .as_f64()
            .ok_or_else(|| AnalysisError::UnknownAttribute {
                parameter: self.name.clone(),
                attribute: format!("{key} (numeric)"),
            })
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Standard error, when the producing analysis estimated one.
    pub fn stderr(&self) -> Option<f64> {
        self.attributes.get("stderr").and_then(ParamValue::as_f64)
    }
}

/// Ordered collection of uniquely named parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the entry at `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.insert(Parameter::new(name, value));
    }

    /// Create or overwrite the entry at `name`, with extra attributes.
    pub fn add_with<K, V>(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
        attrs: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let param = attrs
            .into_iter()
            .fold(Parameter::new(name, value), |p, (k, v)| p.with_attr(k, v));
        self.insert(param);
    }

    /// Insert a ready-made parameter. An existing entry with the same name is
    /// replaced in place, keeping its position.
    pub fn insert(&mut self, param: Parameter) {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(slot) => *slot = param,
            None => self.params.push(param),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param(&self, name: &str) -> Result<&Parameter, AnalysisError> {
        self.get(name)
            .ok_or_else(|| AnalysisError::UnknownParameter(name.to_string()))
    }

    /// Numeric value of `name`.
    pub fn value(&self, name: &str) -> Result<f64, AnalysisError> {
        let param = self.param(name)?;
        param.value.as_f64().ok_or_else(|| {
            AnalysisError::InvalidOutputs(format!("parameter '{name}' is not numeric"))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
