use async_trait::async_trait;
use vsm_core::{Inbound, Value};

use crate::error::TransportError;

/// Two-operation boundary between the dispatcher and the outside world.
///
/// Backends are chosen at startup and handed to the dispatcher, which only
/// ever talks to this trait.
#[async_trait]
pub trait SignalTransport: Send {
    /// Block until the next inbound unit arrives.
    ///
    /// `Ok(None)` means the source is exhausted and no more input will come.
    async fn receive(&mut self) -> Result<Option<Inbound>, TransportError>;

    /// Deliver one emitted signal. An absent value is a bare trigger.
    async fn send(&mut self, name: &str, value: &Value) -> Result<(), TransportError>;

    /// Release sockets and files held by the backend.
    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Blanket implementation so `Box<dyn SignalTransport>` can be used directly.
#[async_trait]
impl<T: SignalTransport + ?Sized> SignalTransport for Box<T> {
    async fn receive(&mut self) -> Result<Option<Inbound>, TransportError> {
        (**self).receive().await
    }

    async fn send(&mut self, name: &str, value: &Value) -> Result<(), TransportError> {
        (**self).send(name, value).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        (**self).close().await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
