//! Flat key/value configuration snapshot
//!
//! Settings reach an effect as one flat map of dotted keys to scalars, vectors
//! and booleans. The snapshot is re-applied wholesale whenever settings change;
//! consumers only read the keys they know and leave everything else alone.

use crate::error::{PyroError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    Text(String),
}

impl ConfigValue {
    fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Vec2(_) => "vec2",
            ConfigValue::Vec4(_) => "vec4",
            ConfigValue::Text(_) => "text",
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(v as i64)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<f32> for ConfigValue {
    fn from(v: f32) -> Self {
        ConfigValue::Float(v as f64)
    }
}

impl From<[f32; 2]> for ConfigValue {
    fn from(v: [f32; 2]) -> Self {
        ConfigValue::Vec2(v)
    }
}

impl From<[f32; 4]> for ConfigValue {
    fn from(v: [f32; 4]) -> Self {
        ConfigValue::Vec4(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Text(v)
    }
}

/// Flat string-keyed settings map
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    values: BTreeMap<String, ConfigValue>,
}

impl ConfigSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Nested tables flatten to dotted keys, so
    /// `[wave] enabled = true` becomes `wave.enabled`.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let table: toml::value::Table = toml::from_str(source)?;
        Ok(Self::from_table(&table))
    }

    /// Read and parse a TOML settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Build a snapshot from an already-parsed TOML table
    pub fn from_table(table: &toml::value::Table) -> Self {
        let mut snapshot = Self::new();
        flatten_into(&mut snapshot.values, "", table);
        snapshot
    }

    /// Insert or replace a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style `set`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Overlay every value of `other` on top of this snapshot
    pub fn merge(&mut self, other: &ConfigSnapshot) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // ── Strict accessors: present-but-wrong-type is an error ──

    pub fn try_f32(&self, key: &str) -> Result<Option<f32>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Float(f)) => finite(key, *f as f32),
            Some(ConfigValue::Int(i)) => Ok(Some(*i as f32)),
            Some(other) => Err(mismatch(key, "number", other)),
        }
    }

    pub fn try_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Int(i)) => Ok(Some(*i)),
            Some(ConfigValue::Float(f)) if f.fract() == 0.0 => Ok(Some(*f as i64)),
            Some(other) => Err(mismatch(key, "integer", other)),
        }
    }

    pub fn try_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(key, "bool", other)),
        }
    }

    pub fn try_str(&self, key: &str) -> Result<Option<&str>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Text(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(key, "text", other)),
        }
    }

    pub fn try_vec2(&self, key: &str) -> Result<Option<[f32; 2]>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Vec2(v)) if v.iter().all(|c| c.is_finite()) => Ok(Some(*v)),
            Some(ConfigValue::Vec2(_)) => Err(not_finite(key)),
            Some(other) => Err(mismatch(key, "vec2", other)),
        }
    }

    pub fn try_vec4(&self, key: &str) -> Result<Option<[f32; 4]>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ConfigValue::Vec4(v)) if v.iter().all(|c| c.is_finite()) => Ok(Some(*v)),
            Some(ConfigValue::Vec4(_)) => Err(not_finite(key)),
            Some(other) => Err(mismatch(key, "vec4", other)),
        }
    }

    // ── Lenient accessors: wrong types read as missing ──

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.try_f32(key).ok().flatten()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.try_i64(key).ok().flatten()
    }

    /// Integer value clamped at zero
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get_i64(key).map(|i| i.max(0) as usize)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.try_bool(key).ok().flatten()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.try_str(key).ok().flatten()
    }

    pub fn get_vec2(&self, key: &str) -> Option<[f32; 2]> {
        self.try_vec2(key).ok().flatten()
    }

    pub fn get_vec4(&self, key: &str) -> Option<[f32; 4]> {
        self.try_vec4(key).ok().flatten()
    }
}

fn mismatch(key: &str, expected: &str, got: &ConfigValue) -> PyroError {
    PyroError::InvalidConfigValue {
        key: key.to_string(),
        expected: format!("{expected}, got {}", got.type_name()),
    }
}

fn not_finite(key: &str) -> PyroError {
    PyroError::InvalidConfigValue {
        key: key.to_string(),
        expected: "a finite number".to_string(),
    }
}

/// Floats that overflow `f32` (or are NaN/inf to begin with) are rejected
fn finite(key: &str, value: f32) -> Result<Option<f32>> {
    if value.is_finite() {
        Ok(Some(value))
    } else {
        Err(not_finite(key))
    }
}

fn flatten_into(out: &mut BTreeMap<String, ConfigValue>, prefix: &str, table: &toml::value::Table) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten_into(out, &key, inner),
            other => {
                if let Some(v) = convert(other) {
                    out.insert(key, v);
                }
            }
        }
    }
}

fn convert(value: &toml::Value) -> Option<ConfigValue> {
    match value {
        toml::Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
        toml::Value::Integer(i) => Some(ConfigValue::Int(*i)),
        toml::Value::Float(f) => Some(ConfigValue::Float(*f)),
        toml::Value::String(s) => Some(ConfigValue::Text(s.clone())),
        toml::Value::Array(arr) => convert_array(arr),
        _ => None,
    }
}

fn convert_array(arr: &[toml::Value]) -> Option<ConfigValue> {
    // A list of names reads as a comma-separated text value
    if !arr.is_empty() && arr.iter().all(|v| v.is_str()) {
        let names: Vec<&str> = arr.iter().filter_map(|v| v.as_str()).collect();
        return Some(ConfigValue::Text(names.join(",")));
    }

    let nums: Option<Vec<f32>> = arr.iter().map(toml_f32).collect();
    let nums = nums?;
    match nums.as_slice() {
        [x, y] => Some(ConfigValue::Vec2([*x, *y])),
        [r, g, b] => Some(ConfigValue::Vec4([*r, *g, *b, 1.0])),
        [r, g, b, a] => Some(ConfigValue::Vec4([*r, *g, *b, *a])),
        _ => None,
    }
}

fn toml_f32(v: &toml::Value) -> Option<f32> {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_tables_flatten_to_dotted_keys() {
        let toml_str = r#"
style = "willow"

[pool]
capacity = 2048

[wave]
enabled = true
duration = 12.5

[willow]
gravity = 180
"#;
        let config = ConfigSnapshot::from_toml_str(toml_str).unwrap();
        assert_eq!(config.get_str("style"), Some("willow"));
        assert_eq!(config.get_usize("pool.capacity"), Some(2048));
        assert_eq!(config.get_bool("wave.enabled"), Some(true));
        assert!((config.get_f32("wave.duration").unwrap() - 12.5).abs() < 1e-6);
        assert!((config.get_f32("willow.gravity").unwrap() - 180.0).abs() < 1e-6);
    }

    #[test]
    fn integer_float_coercion() {
        // `viewport = [1280, 720.0]` mixes integer and float literals
        let config = ConfigSnapshot::from_toml_str("viewport = [1280, 720.0]").unwrap();
        assert_eq!(config.get_vec2("viewport"), Some([1280.0, 720.0]));
    }

    #[test]
    fn colors_and_name_lists() {
        let toml_str = r#"
tint = [1.0, 0.5, 0.0]
styles = ["peony", "willow"]
"#;
        let config = ConfigSnapshot::from_toml_str(toml_str).unwrap();
        assert_eq!(config.get_vec4("tint"), Some([1.0, 0.5, 0.0, 1.0]));
        assert_eq!(config.get_str("styles"), Some("peony,willow"));
    }

    #[test]
    fn wrong_type_is_strict_error_but_lenient_none() {
        let config = ConfigSnapshot::new().with("wave.enabled", "yes");
        assert!(config.try_bool("wave.enabled").is_err());
        assert_eq!(config.get_bool("wave.enabled"), None);
        assert_eq!(config.try_bool("missing").unwrap(), None);
    }

    #[test]
    fn negative_integers_clamp_to_zero_usize() {
        let config = ConfigSnapshot::new().with("pool.capacity", -5);
        assert_eq!(config.get_usize("pool.capacity"), Some(0));
    }

    #[test]
    fn merge_overlays_values() {
        let mut base = ConfigSnapshot::new().with("a", 1.0f32).with("b", true);
        let overlay = ConfigSnapshot::new().with("a", 2.0f32);
        base.merge(&overlay);
        assert_eq!(base.get_f32("a"), Some(2.0));
        assert_eq!(base.get_bool("b"), Some(true));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let config = ConfigSnapshot::from_toml_str(
            "big = 1e40\nnan = nan\nneg = -inf\nok = 2.5\nviewport = [1e40, 720]",
        )
        .unwrap();
        assert!(config.try_f32("big").is_err());
        assert_eq!(config.get_f32("big"), None);
        assert_eq!(config.get_f32("nan"), None);
        assert_eq!(config.get_f32("neg"), None);
        assert_eq!(config.get_f32("ok"), Some(2.5));
        assert!(config.try_vec2("viewport").is_err());
        assert_eq!(config.get_vec2("viewport"), None);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = ConfigSnapshot::from_toml_str("this is = = not toml").unwrap_err();
        assert!(matches!(err, PyroError::ConfigParse(_)));
    }
}
