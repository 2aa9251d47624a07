use thiserror::Error;
use vsm_transport::TransportError;

/// Failures that stop the dispatch loop.
///
/// Rule-evaluation faults are not here: they are logged and recovered per
/// event.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("transport ({backend}) failed: {source}")]
    Transport {
        backend: &'static str,
        #[source]
        source: TransportError,
    },
}
