//! Signal events and the `name` / `name=value` / `quit` line grammar.

use std::fmt;

use crate::error::CoreError;
use crate::value::Value;

/// Reserved line that terminates the dispatch loop.
pub const QUIT_SENTINEL: &str = "quit";

/// Check that `name` is usable as a signal identifier.
///
/// Names must be non-empty and contain neither whitespace nor `=`.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '=') {
        return Err(CoreError::InvalidSignalName(name.to_string()));
    }
    Ok(())
}

/// A signal occurrence: an assignment when `value` is present, a bare
/// trigger otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub value: Option<Value>,
}

impl Event {
    pub fn trigger(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn assign(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}={}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

/// One unit received from a transport, before dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Empty input; ignored by the dispatcher.
    Blank,
    /// The `quit` sentinel.
    Quit,
    Signal(Event),
}

impl Inbound {
    /// Parse one line of the text protocol.
    ///
    /// Surrounding whitespace is stripped, as is whitespace around the first
    /// `=`. A line that does not form a valid assignment is kept whole as a
    /// bare trigger, so it simply matches no rule.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Inbound::Blank;
        }
        if line == QUIT_SENTINEL {
            return Inbound::Quit;
        }
        match line.split_once('=') {
            Some((name, raw)) => {
                let name = name.trim();
                if validate_name(name).is_err() {
                    return Inbound::Signal(Event::trigger(line));
                }
                Inbound::Signal(Event::assign(name, Value::coerce(raw.trim())))
            }
            None => Inbound::Signal(Event::trigger(line)),
        }
    }

    /// Build from an already-split `(name, value)` pair, as delivered by
    /// message-oriented transports.
    pub fn from_parts(name: String, value: Value) -> Self {
        if name.is_empty() {
            return Inbound::Blank;
        }
        if value.is_absent() {
            if name == QUIT_SENTINEL {
                return Inbound::Quit;
            }
            return Inbound::Signal(Event::trigger(name));
        }
        Inbound::Signal(Event {
            name,
            value: Some(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_trigger() {
        assert_eq!(
            Inbound::parse("car.moving\n"),
            Inbound::Signal(Event::trigger("car.moving"))
        );
    }

    #[test]
    fn parse_assignment_coerces() {
        assert_eq!(
            Inbound::parse("car.speed = 30"),
            Inbound::Signal(Event::assign("car.speed", 30i64))
        );
        assert_eq!(
            Inbound::parse("car.gear=reverse"),
            Inbound::Signal(Event::assign("car.gear", "reverse"))
        );
    }

    #[test]
    fn parse_splits_on_first_equals_only() {
        assert_eq!(
            Inbound::parse("a=b=c"),
            Inbound::Signal(Event::assign("a", "b=c"))
        );
    }

    #[test]
    fn parse_blank_and_quit() {
        assert_eq!(Inbound::parse("   "), Inbound::Blank);
        assert_eq!(Inbound::parse(""), Inbound::Blank);
        assert_eq!(Inbound::parse(" quit \n"), Inbound::Quit);
    }

    #[test]
    fn malformed_assignment_becomes_unmatched_trigger() {
        assert_eq!(Inbound::parse("=5"), Inbound::Signal(Event::trigger("=5")));
        assert_eq!(
            Inbound::parse("car moving=1"),
            Inbound::Signal(Event::trigger("car moving=1"))
        );
    }

    #[test]
    fn from_parts_maps_sentinels() {
        assert_eq!(Inbound::from_parts("quit".into(), Value::Absent), Inbound::Quit);
        assert_eq!(Inbound::from_parts(String::new(), Value::Int(1)), Inbound::Blank);
        assert_eq!(
            Inbound::from_parts("quit".into(), Value::Int(1)),
            Inbound::Signal(Event::assign("quit", 1i64))
        );
    }

    #[test]
    fn validate_rejects_whitespace_and_equals() {
        assert!(validate_name("car.moving").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("a=b").is_err());
    }

    #[test]
    fn event_display() {
        assert_eq!(Event::trigger("car.stop").to_string(), "car.stop");
        assert_eq!(Event::assign("car.speed", 3i64).to_string(), "car.speed=3");
    }
}
