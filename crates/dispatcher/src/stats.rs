use std::fmt;

/// Per-run counters kept by the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Assignment events stored into state.
    pub assignments: u64,
    /// Bare trigger events received.
    pub triggers: u64,
    /// Triggers with no rule.
    pub unmatched: u64,
    /// Actions sent.
    pub emitted: u64,
    /// Triggers whose condition was false.
    pub suppressed: u64,
    /// Triggers whose condition failed to evaluate.
    pub eval_errors: u64,
    /// Empty inputs ignored.
    pub blanks: u64,
    /// Received messages that could not be decoded, skipped.
    pub malformed: u64,
}

impl fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "assignments={} triggers={} unmatched={} emitted={} suppressed={} eval_errors={} blanks={} malformed={}",
            self.assignments,
            self.triggers,
            self.unmatched,
            self.emitted,
            self.suppressed,
            self.eval_errors,
            self.blanks,
            self.malformed
        )
    }
}
