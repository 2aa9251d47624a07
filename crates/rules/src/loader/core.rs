//! Core [`RuleIndex`] struct: directory-backed, immutable once loaded.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::compiler::{compile, Rule};
use crate::schema::RuleDefinition;

use super::error::{LoadResult, LoadStatus, Result, RuleError};

/// Map from trigger name to compiled rule.
///
/// Built once at startup and read-only afterwards; share it freely.
#[derive(Debug, Default)]
pub struct RuleIndex {
    /// Directory the rules were loaded from, if any.
    rules_dir: Option<PathBuf>,
    /// Compiled rules keyed by trigger name.
    rules: HashMap<String, Rule>,
    /// File each trigger was loaded from.
    origins: HashMap<String, PathBuf>,
    /// Per-entry outcome of the last directory scan.
    report: Vec<LoadResult>,
}

impl RuleIndex {
    /// Scan `rules_dir` and compile every rule definition in it.
    ///
    /// Dotfiles, subdirectories and non-YAML files are skipped. A YAML or
    /// compile error in any definition aborts the load.
    pub fn load(rules_dir: impl AsRef<Path>) -> Result<Self> {
        let rules_dir = rules_dir.as_ref();
        if !rules_dir.is_dir() {
            return Err(RuleError::Directory(rules_dir.to_path_buf()));
        }

        let mut paths = fs::read_dir(rules_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        let mut index = Self {
            rules_dir: Some(rules_dir.to_path_buf()),
            ..Self::default()
        };

        for path in paths {
            let status = index.load_entry(&path)?;
            index.report.push(LoadResult { path, status });
        }

        info!(
            path = %rules_dir.display(),
            rules = index.rules.len(),
            "rule index loaded"
        );
        Ok(index)
    }

    fn load_entry(&mut self, path: &Path) -> Result<LoadStatus> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        if file_name.starts_with('.') {
            return Ok(skipped(path, "dotfile"));
        }
        if path.is_dir() {
            return Ok(skipped(path, "subdirectory"));
        }
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false);
        if !is_yaml {
            return Ok(skipped(path, "not a YAML file"));
        }

        let rule = Self::load_file(path)?;
        let trigger = rule.trigger().to_string();
        info!(trigger = %trigger, emits = %rule.action().signal, path = %path.display(), "loaded rule");

        match self.insert_from(rule, path.to_path_buf()) {
            Some(previous) => {
                warn!(
                    trigger = %trigger,
                    path = %path.display(),
                    previous = %previous.display(),
                    "duplicate trigger, later file wins"
                );
                Ok(LoadStatus::Replaced { trigger, previous })
            }
            None => Ok(LoadStatus::Loaded { trigger }),
        }
    }

    /// Read and compile a single definition file.
    ///
    /// The trigger name is the file name with its extension stripped.
    pub fn load_file(path: &Path) -> Result<Rule> {
        let trigger = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let contents = fs::read_to_string(path)?;
        let def = RuleDefinition::from_yaml(&contents).map_err(|source| RuleError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        compile(&trigger, &def).map_err(|source| RuleError::Compile {
            trigger,
            path: path.to_path_buf(),
            source,
        })
    }

    fn insert_from(&mut self, rule: Rule, origin: PathBuf) -> Option<PathBuf> {
        let trigger = rule.trigger().to_string();
        self.rules.insert(trigger.clone(), rule);
        self.origins.insert(trigger, origin)
    }

    /// Add a compiled rule, replacing any rule with the same trigger.
    pub fn insert(&mut self, rule: Rule) -> Option<Rule> {
        let trigger = rule.trigger().to_string();
        self.origins.remove(&trigger);
        self.rules.insert(trigger, rule)
    }

    /// Rule triggered by `trigger`, matched by exact name.
    pub fn find(&self, trigger: &str) -> Option<&Rule> {
        self.rules.get(trigger)
    }

    /// File the rule for `trigger` was loaded from.
    pub fn origin(&self, trigger: &str) -> Option<&Path> {
        self.origins.get(trigger).map(PathBuf::as_path)
    }

    /// Trigger names in sorted order.
    pub fn triggers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules_dir(&self) -> Option<&Path> {
        self.rules_dir.as_deref()
    }

    /// Outcome for every entry seen by [`RuleIndex::load`].
    pub fn report(&self) -> &[LoadResult] {
        &self.report
    }
}

impl FromIterator<Rule> for RuleIndex {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut index = Self::default();
        for rule in iter {
            index.insert(rule);
        }
        index
    }
}

fn skipped(path: &Path, reason: &str) -> LoadStatus {
    debug!(path = %path.display(), reason, "skipping rules directory entry");
    LoadStatus::Skipped {
        reason: reason.to_string(),
    }
}
