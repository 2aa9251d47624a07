use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};
use vsm_core::{Event, Inbound, StateStore, Value};
use vsm_rules::RuleIndex;
use vsm_transport::{SignalTransport, TransportError};

use crate::error::DispatchError;
use crate::stats::DispatchStats;

/// Whether the loop keeps going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminate,
}

/// Single-writer event loop.
///
/// Owns the state store and the transport; the rule index is shared
/// read-only. Exactly one event is processed at a time, so an assignment is
/// always visible to every trigger received after it.
pub struct Dispatcher<T> {
    transport: T,
    rules: Arc<RuleIndex>,
    state: StateStore,
    stats: DispatchStats,
}

impl<T: SignalTransport> Dispatcher<T> {
    pub fn new(transport: T, rules: Arc<RuleIndex>, state: StateStore) -> Self {
        Self {
            transport,
            rules,
            state,
            stats: DispatchStats::default(),
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Receive and process events until `quit`, end of input, or `shutdown`
    /// resolves.
    ///
    /// A received message that fails to decode is logged and skipped. Any
    /// other transport failure ends the loop and is returned. The transport
    /// is closed on every exit path.
    pub async fn run<F>(mut self, shutdown: F) -> Result<DispatchStats, DispatchError>
    where
        F: Future<Output = ()>,
    {
        let backend = self.transport.backend();
        info!(backend, rules = self.rules.len(), signals = self.state.len(), "dispatcher running");

        let outcome = self.dispatch(shutdown).await;
        let closed = self
            .transport
            .close()
            .await
            .map_err(|e| self.transport_error(e));

        match (outcome, closed) {
            (Err(e), Err(close_err)) => {
                warn!(error = %close_err, "failed to close transport after error");
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => {
                info!(stats = %self.stats, "dispatcher stopped");
                Ok(self.stats)
            }
        }
    }

    async fn dispatch<F>(&mut self, shutdown: F) -> Result<(), DispatchError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let received = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("interrupt received, shutting down");
                    return Ok(());
                }
                received = self.transport.receive() => received,
            };

            let inbound = match received {
                Ok(Some(inbound)) => inbound,
                Ok(None) => {
                    info!("input closed, shutting down");
                    return Ok(());
                }
                Err(e) if e.is_malformed_input() => {
                    warn!(error = %e, "skipping malformed message");
                    self.stats.malformed += 1;
                    continue;
                }
                Err(e) => return Err(self.transport_error(e)),
            };
            if self.step(inbound).await? == Flow::Terminate {
                return Ok(());
            }
        }
    }

    /// Process one inbound unit.
    pub async fn step(&mut self, inbound: Inbound) -> Result<Flow, DispatchError> {
        match inbound {
            Inbound::Blank => {
                self.stats.blanks += 1;
                Ok(Flow::Continue)
            }
            Inbound::Quit => {
                info!("quit received");
                Ok(Flow::Terminate)
            }
            Inbound::Signal(Event {
                name,
                value: Some(value),
            }) => {
                self.assign(name, value);
                Ok(Flow::Continue)
            }
            Inbound::Signal(Event { name, value: None }) => {
                self.fire(&name).await?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Store an assignment. Never evaluates rules.
    fn assign(&mut self, name: String, value: Value) {
        debug!(signal = %name, value = %value, "assignment");
        self.state.set(name, value);
        self.stats.assignments += 1;
    }

    /// Evaluate the rule for a bare trigger and emit its action if it holds.
    async fn fire(&mut self, name: &str) -> Result<(), DispatchError> {
        self.stats.triggers += 1;

        let rules = Arc::clone(&self.rules);
        let Some(rule) = rules.find(name) else {
            debug!(signal = %name, "no rule for trigger");
            self.stats.unmatched += 1;
            return Ok(());
        };

        let snapshot = self.state.snapshot();
        match rule.matches(&snapshot) {
            Ok(true) => {
                let action = rule.action();
                debug!(signal = %name, emit = %action.signal, "condition held");
                if let Some(delay) = action.delay {
                    tokio::time::sleep(delay).await;
                }
                self.transport
                    .send(&action.signal, &action.value)
                    .await
                    .map_err(|e| self.transport_error(e))?;
                self.stats.emitted += 1;
            }
            Ok(false) => {
                debug!(signal = %name, condition = %rule.source(), "condition false");
                self.stats.suppressed += 1;
            }
            Err(e) => {
                warn!(signal = %name, condition = %rule.source(), error = %e, "rule evaluation failed");
                self.stats.eval_errors += 1;
            }
        }
        Ok(())
    }

    fn transport_error(&self, source: TransportError) -> DispatchError {
        DispatchError::Transport {
            backend: self.transport.backend(),
            source,
        }
    }
}
