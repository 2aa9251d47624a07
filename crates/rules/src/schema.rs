//! Raw YAML shape of a rule definition file.
//!
//! ```yaml
//! condition:
//!   - car.damage == true
//! emit:
//!   signal: car.backup
//! ```
//!
//! Fields are kept as untyped YAML so that a malformed `condition` or `emit`
//! surfaces as a compile error naming the rule rather than a bare YAML error.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Keys the compiler understands inside `emit`.
pub const EMIT_KEYWORDS: &[&str] = &["signal", "value"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleDefinition {
    /// One boolean expression, as a one-element sequence or a plain string.
    #[serde(default)]
    pub condition: Option<serde_yaml::Value>,

    /// Mapping with `signal` (required) and `value` (optional).
    #[serde(default)]
    pub emit: Option<serde_yaml::Value>,

    /// Milliseconds to wait before emitting.
    #[serde(default)]
    pub delay: Option<serde_yaml::Value>,

    /// Anything else; reported as unrecognized keywords.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl RuleDefinition {
    /// Parse definition text. An empty document yields an empty definition.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
        if raw.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(raw)
    }

    /// Top-level and `emit.*` keys the compiler will ignore.
    pub fn unknown_keywords(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self.extra.keys().cloned().collect();
        if let Some(serde_yaml::Value::Mapping(emit)) = &self.emit {
            for key in emit.keys() {
                let name = yaml_key(key);
                if !EMIT_KEYWORDS.contains(&name.as_str()) {
                    unknown.push(format!("emit.{name}"));
                }
            }
        }
        unknown
    }
}

pub(crate) fn yaml_key(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
