//! Core value and diagnostic types
//!
//! [`Dynamic`] models every value Terraform can hand a provider, including
//! the planning-time `Unknown` marker. [`DynamicValue`] wraps a root value
//! and provides path-addressed, type-checked access. The JSON bridge
//! ([`Dynamic::from_json`] / [`Dynamic::to_json`]) is the fixed contract for
//! moving free-form API payloads in and out of the typed attribute tree.

use crate::error::{Result, TfkitError};
use std::collections::HashMap;
use std::fmt;

/// A Terraform value of any type.
///
/// All numbers are `f64`, matching Terraform's number type. `Unknown`
/// appears only during planning, for values the provider has yet to compute.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Dynamic>),
    Map(HashMap<String, Dynamic>),
    Unknown,
}

impl Dynamic {
    /// Convert a JSON document into a dynamic value.
    ///
    /// Total: every JSON value has a dynamic representation. Numbers outside
    /// f64 precision lose precision the same way Terraform itself does.
    pub fn from_json(value: &serde_json::Value) -> Dynamic {
        match value {
            serde_json::Value::Null => Dynamic::Null,
            serde_json::Value::Bool(b) => Dynamic::Bool(*b),
            serde_json::Value::Number(n) => Dynamic::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Dynamic::String(s.clone()),
            serde_json::Value::Array(items) => {
                Dynamic::List(items.iter().map(Dynamic::from_json).collect())
            }
            serde_json::Value::Object(fields) => Dynamic::Map(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Dynamic::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a dynamic value into a JSON document.
    ///
    /// `Unknown` has no JSON representation; encoding one is a marshalling
    /// error the caller must surface as a diagnostic.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        match self {
            Dynamic::Null => Ok(serde_json::Value::Null),
            Dynamic::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Dynamic::Number(n) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    Ok(serde_json::Value::Number(serde_json::Number::from(
                        *n as i64,
                    )))
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| {
                            TfkitError::EncodingError(format!("number {} is not a valid JSON number", n))
                        })
                }
            }
            Dynamic::String(s) => Ok(serde_json::Value::String(s.clone())),
            Dynamic::List(items) => Ok(serde_json::Value::Array(
                items
                    .iter()
                    .map(Dynamic::to_json)
                    .collect::<Result<Vec<_>>>()?,
            )),
            Dynamic::Map(fields) => {
                let mut object = serde_json::Map::new();
                for (key, value) in fields {
                    object.insert(key.clone(), value.to_json()?);
                }
                Ok(serde_json::Value::Object(object))
            }
            Dynamic::Unknown => Err(TfkitError::EncodingError(
                "cannot encode an unknown value as JSON".to_string(),
            )),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }
}

/// Flatten a map of scalar dynamic values into string form.
///
/// Used for form-style API payloads. Nested lists/maps and unknown values
/// are marshalling errors.
pub fn dynamic_to_string_map(map: &HashMap<String, Dynamic>) -> Result<HashMap<String, String>> {
    let mut out = HashMap::with_capacity(map.len());
    for (key, value) in map {
        let rendered = match value {
            Dynamic::Null => continue,
            Dynamic::Bool(b) => b.to_string(),
            Dynamic::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Dynamic::String(s) => s.clone(),
            other => {
                return Err(TfkitError::EncodingError(format!(
                    "attribute '{}' is a {} and cannot be rendered as a string",
                    key,
                    other.type_name()
                )))
            }
        };
        out.insert(key.clone(), rendered);
    }
    Ok(out)
}

/// A root dynamic value with typed, path-addressed accessors.
///
/// Configuration, plan, and state all travel as `DynamicValue`s. Use the
/// typed accessors instead of matching on the enum directly.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    /// An empty object root, the shape of every resource state.
    pub fn empty_object() -> Self {
        Self {
            value: Dynamic::Map(HashMap::new()),
        }
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        match self.navigate(path)? {
            Dynamic::String(s) => Ok(s.clone()),
            other => Err(TfkitError::TypeMismatch {
                expected: "string".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        match self.navigate(path)? {
            Dynamic::Number(n) => Ok(*n),
            other => Err(TfkitError::TypeMismatch {
                expected: "number".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Fetch a number attribute as an integer identifier.
    pub fn get_i64(&self, path: &AttributePath) -> Result<i64> {
        Ok(self.get_number(path)? as i64)
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        match self.navigate(path)? {
            Dynamic::Bool(b) => Ok(*b),
            other => Err(TfkitError::TypeMismatch {
                expected: "bool".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        match self.navigate(path)? {
            Dynamic::List(items) => Ok(items.clone()),
            other => Err(TfkitError::TypeMismatch {
                expected: "list".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        match self.navigate(path)? {
            Dynamic::Map(fields) => Ok(fields.clone()),
            other => Err(TfkitError::TypeMismatch {
                expected: "map".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Fetch whatever sits at `path`, unknown and null included.
    pub fn get_dynamic(&self, path: &AttributePath) -> Result<Dynamic> {
        self.navigate(path).cloned()
    }

    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set(path, Dynamic::Number(value))
    }

    pub fn set_i64(&mut self, path: &AttributePath, value: i64) -> Result<()> {
        self.set(path, Dynamic::Number(value as f64))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set(path, Dynamic::List(value))
    }

    pub fn set_map(&mut self, path: &AttributePath, value: HashMap<String, Dynamic>) -> Result<()> {
        self.set(path, Dynamic::Map(value))
    }

    pub fn set_dynamic(&mut self, path: &AttributePath, value: Dynamic) -> Result<()> {
        self.set(path, value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.value, Dynamic::Unknown)
    }

    /// Mark a computed attribute as unknown during planning.
    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set(path, Dynamic::Unknown)
    }

    fn navigate<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(fields), AttributePathStep::AttributeName(name)) => fields
                    .get(name)
                    .ok_or_else(|| TfkitError::Custom(format!("attribute '{}' not found", name)))?,
                (Dynamic::Map(fields), AttributePathStep::ElementKeyString(key)) => fields
                    .get(key)
                    .ok_or_else(|| TfkitError::Custom(format!("map key '{}' not found", key)))?,
                (Dynamic::List(items), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    items.get(idx).ok_or_else(|| {
                        TfkitError::Custom(format!("list index {} out of bounds", idx))
                    })?
                }
                _ => {
                    return Err(TfkitError::Custom(format!(
                        "cannot navigate {} through a {}",
                        path,
                        current.type_name()
                    )))
                }
            };
        }

        Ok(current)
    }

    fn set(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        if path.steps.is_empty() {
            self.value = new_value;
            return Ok(());
        }

        // Non-empty paths imply an object root.
        if !matches!(self.value, Dynamic::Map(_)) {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut current = &mut self.value;
        let last = path.steps.len() - 1;

        for (idx, step) in path.steps.iter().enumerate() {
            if idx == last {
                return match (current, step) {
                    (Dynamic::Map(fields), AttributePathStep::AttributeName(name))
                    | (Dynamic::Map(fields), AttributePathStep::ElementKeyString(name)) => {
                        fields.insert(name.clone(), new_value);
                        Ok(())
                    }
                    (Dynamic::List(items), AttributePathStep::ElementKeyInt(i)) => {
                        let i = *i as usize;
                        if i < items.len() {
                            items[i] = new_value;
                            Ok(())
                        } else {
                            Err(TfkitError::Custom(format!(
                                "list index {} out of bounds",
                                i
                            )))
                        }
                    }
                    _ => Err(TfkitError::Custom(format!("cannot set through {}", path))),
                };
            }

            current = match (current, step) {
                (Dynamic::Map(fields), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(fields), AttributePathStep::ElementKeyString(name)) => {
                    fields.entry(name.clone()).or_insert_with(|| {
                        match path.steps.get(idx + 1) {
                            Some(AttributePathStep::ElementKeyInt(_)) => Dynamic::List(Vec::new()),
                            _ => Dynamic::Map(HashMap::new()),
                        }
                    })
                }
                (Dynamic::List(items), AttributePathStep::ElementKeyInt(i)) => {
                    let i = *i as usize;
                    if i >= items.len() {
                        return Err(TfkitError::Custom(format!(
                            "list index {} out of bounds",
                            i
                        )));
                    }
                    &mut items[i]
                }
                _ => return Err(TfkitError::Custom(format!("cannot set through {}", path))),
            };
        }

        unreachable!("loop returns on the final step")
    }
}

/// Path to an attribute inside a [`DynamicValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) => {
                    if idx > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                AttributePathStep::ElementKeyString(key) => write!(f, "[\"{}\"]", key)?,
                AttributePathStep::ElementKeyInt(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// One step of an [`AttributePath`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    AttributeName(String),
    ElementKeyString(String),
    ElementKeyInt(i64),
}

/// A warning or error produced by the provider, addressed to the user.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// True if any diagnostic in the slice is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|d| d.severity == DiagnosticSeverity::Error)
}

/// Configuration values, as handed to configure/validate/create.
pub type Config = DynamicValue;

/// Resource state values.
pub type State = DynamicValue;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_value_string_access() {
        let mut dv = DynamicValue::empty_object();
        dv.set_string(&AttributePath::new("name"), "test".to_string())
            .unwrap();

        assert_eq!(dv.get_string(&AttributePath::new("name")).unwrap(), "test");
    }

    #[test]
    fn dynamic_value_nested_access() {
        let mut dv = DynamicValue::empty_object();
        let path = AttributePath::new("config").attribute("endpoint");
        dv.set_string(&path, "https://example.com".to_string())
            .unwrap();

        assert_eq!(dv.get_string(&path).unwrap(), "https://example.com");
    }

    #[test]
    fn dynamic_value_type_mismatch_reports_both_types() {
        let mut dv = DynamicValue::empty_object();
        dv.set_bool(&AttributePath::new("flag"), true).unwrap();

        let err = dv.get_string(&AttributePath::new("flag")).unwrap_err();
        assert!(err.to_string().contains("expected string"));
        assert!(err.to_string().contains("bool"));
    }

    #[test]
    fn i64_helpers_round_trip_identifiers() {
        let mut dv = DynamicValue::empty_object();
        dv.set_i64(&AttributePath::new("id"), 9_007_199_254_740).unwrap();

        assert_eq!(
            dv.get_i64(&AttributePath::new("id")).unwrap(),
            9_007_199_254_740
        );
    }

    #[test]
    fn json_bridge_round_trips_nested_documents() {
        let json: serde_json::Value = serde_json::json!({
            "days": [1, 2, 5],
            "times": ["07:00", "19:00"],
            "enabled": true,
            "comment": null,
        });

        let dynamic = Dynamic::from_json(&json);
        assert_eq!(dynamic.to_json().unwrap(), json);
    }

    #[test]
    fn json_bridge_rejects_unknown() {
        let value = Dynamic::Map(HashMap::from([(
            "pending".to_string(),
            Dynamic::Unknown,
        )]));

        let err = value.to_json().unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn string_map_flattens_scalars_and_skips_nulls() {
        let map = HashMap::from([
            ("name".to_string(), Dynamic::String("backup".to_string())),
            ("port".to_string(), Dynamic::Number(22.0)),
            ("disabled".to_string(), Dynamic::Bool(false)),
            ("notes".to_string(), Dynamic::Null),
        ]);

        let flat = dynamic_to_string_map(&map).unwrap();
        assert_eq!(flat.get("name").map(String::as_str), Some("backup"));
        assert_eq!(flat.get("port").map(String::as_str), Some("22"));
        assert_eq!(flat.get("disabled").map(String::as_str), Some("false"));
        assert!(!flat.contains_key("notes"));
    }

    #[test]
    fn string_map_rejects_nested_values() {
        let map = HashMap::from([("members".to_string(), Dynamic::List(vec![]))]);
        assert!(dynamic_to_string_map(&map).is_err());
    }

    #[test]
    fn attribute_path_display() {
        let path = AttributePath::new("members").index(0).attribute("email");
        assert_eq!(path.to_string(), "members[0].email");
    }

    #[test]
    fn mark_unknown_then_read_back() {
        let mut dv = DynamicValue::empty_object();
        dv.mark_unknown(&AttributePath::new("uri")).unwrap();

        assert_eq!(
            dv.get_dynamic(&AttributePath::new("uri")).unwrap(),
            Dynamic::Unknown
        );
    }
}
