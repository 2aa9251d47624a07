//! Live signal state: the latest value seen for every assigned name.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::value::Value;

static ABSENT: Value = Value::Absent;

/// Last-write-wins map from signal name to value.
///
/// Snapshots share the underlying map; the next `set` after a snapshot
/// copies it, so a snapshot never observes later writes.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    values: Arc<HashMap<String, Value>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `name`, or [`Value::Absent`] if it was never assigned.
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&ABSENT)
    }

    /// Overwrite `name`. Storing a value never evaluates rules.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        debug!(signal = %name, value = %value, "state updated");
        Arc::make_mut(&mut self.values).insert(name, value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Point-in-time view for one rule evaluation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            values: Arc::clone(&self.values),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for StateStore {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let values = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            values: Arc::new(values),
        }
    }
}

/// Immutable view of the state at the moment it was taken.
#[derive(Debug, Clone)]
pub struct Snapshot {
    values: Arc<HashMap<String, Value>>,
}

impl Snapshot {
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&ABSENT)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let mut state = StateStore::new();
        state.set("car.speed", Value::Int(30));
        assert_eq!(state.get("car.speed"), &Value::Int(30));
    }

    #[test]
    fn unassigned_reads_absent() {
        let state = StateStore::new();
        assert_eq!(state.get("car.speed"), &Value::Absent);
        assert!(!state.contains("car.speed"));
    }

    #[test]
    fn last_write_wins() {
        let mut state = StateStore::new();
        state.set("car.gear", Value::from("drive"));
        state.set("car.gear", Value::from("reverse"));
        assert_eq!(state.get("car.gear"), &Value::from("reverse"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let mut state = StateStore::new();
        state.set("car.moving", Value::Bool(true));
        let snap = state.snapshot();

        state.set("car.moving", Value::Bool(false));
        state.set("car.damage", Value::Bool(true));

        assert_eq!(snap.get("car.moving"), &Value::Bool(true));
        assert_eq!(snap.get("car.damage"), &Value::Absent);
        assert_eq!(state.get("car.moving"), &Value::Bool(false));
    }

    #[test]
    fn collect_from_pairs() {
        let state: StateStore = vec![("a", Value::Int(1)), ("b", Value::Int(2))]
            .into_iter()
            .collect();
        assert_eq!(state.len(), 2);
        assert_eq!(state.get("b"), &Value::Int(2));
    }
}
