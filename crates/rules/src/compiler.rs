//! Turns a [`RuleDefinition`] into an immutable, evaluable [`Rule`].

use std::time::Duration;

use tracing::warn;
use vsm_core::{validate_name, Snapshot, Value};

use crate::expr::{self, EvalError, Expr, ExprError};
use crate::schema::{yaml_key, RuleDefinition};

/// Why a definition could not be compiled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("missing `condition`")]
    MissingCondition,

    #[error("`condition` must hold exactly one expression, found {0}")]
    ConditionCount(usize),

    #[error("`condition` must be a string or a one-element sequence of strings")]
    ConditionShape,

    #[error("invalid condition {text:?}: {source}")]
    InvalidCondition {
        text: String,
        #[source]
        source: ExprError,
    },

    #[error("missing `emit`")]
    MissingEmit,

    #[error("`emit` must be a mapping")]
    EmitShape,

    #[error("`emit` is missing `signal`")]
    MissingEmitSignal,

    #[error("invalid emitted signal name {0:?}")]
    InvalidEmitSignal(String),

    #[error("`emit.value` must be a scalar")]
    EmitValueShape,

    #[error("`delay` must be a non-negative integer number of milliseconds")]
    InvalidDelay,

    #[error("invalid trigger name {0:?}")]
    InvalidTrigger(String),
}

/// What a rule emits when its condition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub signal: String,
    pub value: Value,
    pub delay: Option<Duration>,
}

/// A compiled rule: one trigger, one condition, one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    trigger: String,
    condition: Expr,
    source: String,
    action: Action,
}

impl Rule {
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn condition(&self) -> &Expr {
        &self.condition
    }

    /// Condition text as written in the definition.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Whether the condition holds against `state`.
    pub fn matches(&self, state: &Snapshot) -> Result<bool, EvalError> {
        self.condition.eval_condition(state)
    }
}

/// Compile `def` as the rule for `trigger`.
///
/// The trigger is supplied by the caller (the rule index derives it from
/// the file name). Unrecognized keywords are logged and ignored.
pub fn compile(trigger: &str, def: &RuleDefinition) -> Result<Rule, CompileError> {
    validate_name(trigger).map_err(|_| CompileError::InvalidTrigger(trigger.to_string()))?;

    for keyword in def.unknown_keywords() {
        warn!(trigger, keyword = %keyword, "unrecognized rule keyword, ignoring");
    }

    let source = condition_text(def.condition.as_ref())?;
    let condition = expr::parse(&source).map_err(|source_err| CompileError::InvalidCondition {
        text: source.clone(),
        source: source_err,
    })?;

    let emit = def.emit.as_ref().ok_or(CompileError::MissingEmit)?;
    let action = compile_action(emit, def.delay.as_ref())?;

    Ok(Rule {
        trigger: trigger.to_string(),
        condition,
        source,
        action,
    })
}

fn condition_text(raw: Option<&serde_yaml::Value>) -> Result<String, CompileError> {
    use serde_yaml::Value as Y;

    let raw = raw.ok_or(CompileError::MissingCondition)?;
    let single = match raw {
        Y::Null => return Err(CompileError::MissingCondition),
        Y::Sequence(items) if items.len() == 1 => &items[0],
        Y::Sequence(items) => return Err(CompileError::ConditionCount(items.len())),
        other => other,
    };

    match single {
        Y::String(s) => Ok(s.clone()),
        Y::Bool(b) => Ok(b.to_string()),
        Y::Number(n) => Ok(n.to_string()),
        _ => Err(CompileError::ConditionShape),
    }
}

fn compile_action(
    emit: &serde_yaml::Value,
    delay: Option<&serde_yaml::Value>,
) -> Result<Action, CompileError> {
    let map = match emit {
        serde_yaml::Value::Null => return Err(CompileError::MissingEmit),
        serde_yaml::Value::Mapping(map) => map,
        _ => return Err(CompileError::EmitShape),
    };

    let mut signal = None;
    let mut value = Value::Absent;
    for (key, val) in map {
        match yaml_key(key).as_str() {
            "signal" => signal = Some(val),
            "value" => value = scalar(val).ok_or(CompileError::EmitValueShape)?,
            _ => {}
        }
    }

    let signal = match signal {
        None | Some(serde_yaml::Value::Null) => return Err(CompileError::MissingEmitSignal),
        Some(serde_yaml::Value::String(s)) => s.trim().to_string(),
        Some(other) => return Err(CompileError::InvalidEmitSignal(yaml_key(other))),
    };
    validate_name(&signal).map_err(|_| CompileError::InvalidEmitSignal(signal.clone()))?;

    let delay = match delay {
        None | Some(serde_yaml::Value::Null) => None,
        Some(serde_yaml::Value::Number(n)) => {
            Some(Duration::from_millis(n.as_u64().ok_or(CompileError::InvalidDelay)?))
        }
        Some(_) => return Err(CompileError::InvalidDelay),
    };

    Ok(Action {
        signal,
        value,
        delay,
    })
}

fn scalar(raw: &serde_yaml::Value) -> Option<Value> {
    use serde_yaml::Value as Y;

    match raw {
        Y::Null => Some(Value::Absent),
        Y::Bool(b) => Some(Value::Bool(*b)),
        Y::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        Y::String(s) => Some(Value::Text(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use vsm_core::StateStore;

    use super::*;

    fn compile_yaml(trigger: &str, yaml: &str) -> Result<Rule, CompileError> {
        compile(trigger, &RuleDefinition::from_yaml(yaml).unwrap())
    }

    #[test]
    fn compiles_minimal_rule() {
        let rule = compile_yaml(
            "car.moving",
            "condition:\n  - car.damage == true\nemit:\n  signal: car.backup\n",
        )
        .unwrap();

        assert_eq!(rule.trigger(), "car.moving");
        assert_eq!(rule.source(), "car.damage == true");
        assert_eq!(rule.action().signal, "car.backup");
        assert_eq!(rule.action().value, Value::Absent);
        assert_eq!(rule.action().delay, None);
        assert_eq!(rule.condition().signals(), vec!["car.damage"]);
    }

    #[test]
    fn condition_as_plain_string() {
        let rule = compile_yaml("t", "condition: a > 1 || b\nemit: {signal: out}\n").unwrap();
        assert_eq!(rule.source(), "a > 1 || b");
    }

    #[test]
    fn missing_condition() {
        assert_eq!(
            compile_yaml("t", "emit: {signal: out}\n"),
            Err(CompileError::MissingCondition)
        );
        assert_eq!(
            compile_yaml("t", "condition:\nemit: {signal: out}\n"),
            Err(CompileError::MissingCondition)
        );
    }

    #[test]
    fn missing_emit() {
        assert_eq!(
            compile_yaml("t", "condition: [a]\n"),
            Err(CompileError::MissingEmit)
        );
    }

    #[test]
    fn emit_without_signal() {
        assert_eq!(
            compile_yaml("t", "condition: [a]\nemit: {value: 1}\n"),
            Err(CompileError::MissingEmitSignal)
        );
        assert_eq!(
            compile_yaml("t", "condition: [a]\nemit: car.stop\n"),
            Err(CompileError::EmitShape)
        );
    }

    #[test]
    fn condition_must_be_single() {
        assert_eq!(
            compile_yaml("t", "condition: [a, b]\nemit: {signal: out}\n"),
            Err(CompileError::ConditionCount(2))
        );
        assert_eq!(
            compile_yaml("t", "condition: []\nemit: {signal: out}\n"),
            Err(CompileError::ConditionCount(0))
        );
    }

    #[test]
    fn unparsable_condition() {
        let err = compile_yaml("t", "condition: ['a == ']\nemit: {signal: out}\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidCondition { .. }));
    }

    #[test]
    fn invalid_names() {
        assert_eq!(
            compile_yaml("t", "condition: [a]\nemit: {signal: 'car stop'}\n"),
            Err(CompileError::InvalidEmitSignal("car stop".into()))
        );
        assert_eq!(
            compile_yaml("bad trigger", "condition: [a]\nemit: {signal: out}\n"),
            Err(CompileError::InvalidTrigger("bad trigger".into()))
        );
    }

    #[test]
    fn emit_value_and_delay() {
        let rule = compile_yaml(
            "t",
            "condition: [a]\nemit:\n  signal: out\n  value: 2.5\ndelay: 250\n",
        )
        .unwrap();
        assert_eq!(rule.action().value, Value::Float(2.5));
        assert_eq!(rule.action().delay, Some(Duration::from_millis(250)));

        assert_eq!(
            compile_yaml("t", "condition: [a]\nemit: {signal: out}\ndelay: -5\n"),
            Err(CompileError::InvalidDelay)
        );
        assert_eq!(
            compile_yaml("t", "condition: [a]\nemit: {signal: out, value: [1]}\n"),
            Err(CompileError::EmitValueShape)
        );
    }

    #[test]
    fn unknown_keywords_do_not_fail() {
        let rule = compile_yaml("t", "condition: [a]\nemit: {signal: out}\npriority: high\n");
        assert!(rule.is_ok());
    }

    #[test]
    fn rule_matches_against_snapshot() {
        let rule = compile_yaml("car.gear", "condition: [car.moving == true]\nemit: {signal: car.stop}\n")
            .unwrap();
        let mut state = StateStore::new();
        state.set("car.moving", Value::Bool(true));
        assert!(rule.matches(&state.snapshot()).unwrap());
        state.set("car.moving", Value::Bool(false));
        assert!(!rule.matches(&state.snapshot()).unwrap());
    }
}
