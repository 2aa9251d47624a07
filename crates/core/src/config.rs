use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{CoreError, Result};
use crate::signal::validate_name;
use crate::state::StateStore;
use crate::value::Value;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

// ── Initial configuration file ────────────────────────────────

/// `name=value` pairs seeded into the state store before dispatch starts.
///
/// One pair per line. Blank lines and `#` comments are skipped, and a
/// leading YAML list marker (`- `) is accepted so files written as a YAML
/// sequence of strings load unchanged.
#[derive(Debug, Clone, Default)]
pub struct InitialState {
    pub path: Option<PathBuf>,
    pub entries: Vec<(String, Value)>,
}

impl InitialState {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut state = Self::parse(&content, path)?;
        state.path = Some(path.to_path_buf());
        info!(path = %path.display(), entries = state.entries.len(), "loaded initial state");
        Ok(state)
    }

    /// Parse file content; `origin` only labels error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut entries = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            let line = line.strip_prefix("- ").map(str::trim).unwrap_or(line);
            if line.is_empty() || line.starts_with('#') || line == "---" {
                continue;
            }
            let line = unquote(line);

            let parse_err = |reason: String| CoreError::Parse {
                path: origin.to_path_buf(),
                line: idx + 1,
                reason,
            };

            let (name, raw_value) = line
                .split_once('=')
                .ok_or_else(|| parse_err(format!("expected name=value, got {line:?}")))?;
            let name = name.trim();
            validate_name(name).map_err(|e| parse_err(e.to_string()))?;

            entries.push((name.to_string(), Value::coerce(raw_value.trim())));
        }

        Ok(Self {
            path: None,
            entries,
        })
    }

    /// Build a state store holding every entry; later duplicates win.
    pub fn into_store(self) -> StateStore {
        self.entries.into_iter().collect()
    }
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<InitialState> {
        InitialState::parse(content, Path::new("test.conf"))
    }

    #[test]
    fn parses_plain_lines() {
        let state = parse("car.damage=true\ncar.speed = 30\n\n# comment\ncar.gear=reverse\n")
            .unwrap();
        assert_eq!(
            state.entries,
            vec![
                ("car.damage".to_string(), Value::Bool(true)),
                ("car.speed".to_string(), Value::Int(30)),
                ("car.gear".to_string(), Value::from("reverse")),
            ]
        );
    }

    #[test]
    fn accepts_yaml_sequence_of_strings() {
        let state = parse("---\n- car.moving=true\n- \"car.damage = false\"\n").unwrap();
        let store = state.into_store();
        assert_eq!(store.get("car.moving"), &Value::Bool(true));
        assert_eq!(store.get("car.damage"), &Value::Bool(false));
    }

    #[test]
    fn later_duplicates_win() {
        let store = parse("a=1\na=2\n").unwrap().into_store();
        assert_eq!(store.get("a"), &Value::Int(2));
    }

    #[test]
    fn missing_equals_is_parse_error() {
        let err = parse("a=1\njunk\n").unwrap_err();
        match err {
            CoreError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn invalid_name_is_parse_error() {
        assert!(matches!(parse("bad name=1"), Err(CoreError::Parse { .. })));
        assert!(matches!(parse("=1"), Err(CoreError::Parse { .. })));
    }

    #[test]
    fn from_file_records_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.conf");
        fs::write(&path, "car.moving=true\n").unwrap();

        let state = InitialState::from_file(&path).unwrap();
        assert_eq!(state.path.as_deref(), Some(path.as_path()));
        assert_eq!(state.entries.len(), 1);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = InitialState::from_file("/nonexistent/vsm/state.conf").unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
