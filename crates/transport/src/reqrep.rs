//! Request/reply backend using ZeroMQ REQ/REP sockets.
//!
//! - [`SignalReceiver`] binds a REP socket and yields one `(name, value)`
//!   pair per request, acknowledging each with a single byte before the next
//!   receive.
//! - [`SignalSender`] connects a REQ socket, sends one pair and blocks until
//!   the acknowledgement byte arrives.
//! - [`ZmqTransport`] combines a receiver on the listen endpoint with a
//!   lazily connected sender on the emit endpoint.
//!
//! REP sockets allow one outstanding request at a time, so a peer is never
//! more than one message ahead of the receiver.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use vsm_core::{Inbound, Value};
use zeromq::{RepSocket, ReqSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::config::ZeromqConfig;
use crate::endpoint::Endpoint;
use crate::error::TransportError;
use crate::frame::{SignalFrame, ACK};
use crate::traits::SignalTransport;

/// Run `fut`, failing with [`TransportError::Timeout`] if a limit is set and
/// exceeded.
async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> Result<T, TransportError>
where
    F: std::future::Future<Output = Result<T, TransportError>>,
{
    match limit {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| TransportError::Timeout(d))?,
        None => fut.await,
    }
}

/// REP-socket server yielding one signal per request.
pub struct SignalReceiver {
    socket: Option<RepSocket>,
    endpoint: Endpoint,
}

impl SignalReceiver {
    /// Bind a REP socket on `endpoint`, clearing any stale IPC socket file.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn bind(endpoint: &Endpoint) -> Result<Self, TransportError> {
        endpoint.ensure_ipc_dir()?;
        endpoint.remove_stale_socket()?;
        let mut socket = RepSocket::new();
        info!(endpoint = %endpoint, "binding REP socket");
        socket.bind(&endpoint.endpoint()).await?;
        Ok(Self {
            socket: Some(socket),
            endpoint: endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Receive one signal and acknowledge it.
    ///
    /// The acknowledgement is sent even when the body fails to decode, so the
    /// peer is released before the decode error is returned. Such errors
    /// report [`TransportError::is_malformed_input`] and leave the socket
    /// ready for the next request.
    pub async fn recv_signal(&mut self) -> Result<Inbound, TransportError> {
        let socket = self.socket.as_mut().ok_or(TransportError::Closed)?;
        let request = socket.recv().await?;
        let decoded = decode_request(&request);

        socket.send(ZmqMessage::from(ACK.to_vec())).await?;

        let frame = decoded?;
        debug!(signal = %frame.name(), value = %frame.value(), "received signal");
        Ok(frame.into_inbound())
    }

    /// Drop the socket and remove the IPC socket file.
    pub fn close(&mut self) -> Result<(), TransportError> {
        if self.socket.take().is_some() {
            info!(endpoint = %self.endpoint, "closing REP socket");
            self.endpoint.remove_stale_socket()?;
        }
        Ok(())
    }
}

fn decode_request(request: &ZmqMessage) -> Result<SignalFrame, TransportError> {
    if request.len() != 1 {
        return Err(TransportError::Protocol(format!(
            "expected a single frame, got {}",
            request.len()
        )));
    }
    let body = request
        .get(0)
        .ok_or_else(|| TransportError::Protocol("empty request".into()))?;
    Ok(SignalFrame::from_bytes(body.as_ref())?)
}

/// REQ-socket client sending one signal per round trip.
pub struct SignalSender {
    socket: ReqSocket,
    endpoint: Endpoint,
    timeout: Option<Duration>,
}

impl SignalSender {
    /// Connect a REQ socket to `endpoint`.
    ///
    /// `timeout` bounds both the connect and every send/acknowledge round
    /// trip; `None` waits forever.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn connect(
        endpoint: &Endpoint,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut socket = ReqSocket::new();
        info!(endpoint = %endpoint, "connecting REQ socket");
        with_timeout(timeout, async {
            socket.connect(&endpoint.endpoint()).await?;
            Ok::<_, TransportError>(())
        })
        .await?;
        Ok(Self {
            socket,
            endpoint: endpoint.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send `(name, value)` and wait for the one-byte acknowledgement.
    pub async fn send_signal(&mut self, name: &str, value: &Value) -> Result<(), TransportError> {
        let body = SignalFrame::new(name, value.clone()).to_bytes()?;
        let socket = &mut self.socket;

        let reply = with_timeout(self.timeout, async {
            socket.send(ZmqMessage::from(body)).await?;
            Ok::<_, TransportError>(socket.recv().await?)
        })
        .await?;

        let ack = reply.get(0).map(|b| b.as_ref());
        if reply.len() != 1 || ack.map(<[u8]>::len) != Some(ACK.len()) {
            return Err(TransportError::Protocol(format!(
                "expected a {}-byte acknowledgement",
                ACK.len()
            )));
        }
        debug!(signal = name, value = %value, "signal acknowledged");
        Ok(())
    }
}

/// Socket backend: receive on the listen endpoint, emit to the emit endpoint.
pub struct ZmqTransport {
    receiver: SignalReceiver,
    emitter: Option<SignalSender>,
    emit_endpoint: Endpoint,
    send_timeout: Option<Duration>,
}

impl ZmqTransport {
    /// Bind the listen endpoint. The emit endpoint is connected on first send.
    pub async fn open(config: &ZeromqConfig) -> Result<Self, TransportError> {
        let listen = config.listen_endpoint()?;
        let emit_endpoint = config.emit_endpoint()?;
        if listen == emit_endpoint {
            return Err(TransportError::Config(format!(
                "listen and emit endpoints must differ, both are {listen}"
            )));
        }
        let receiver = SignalReceiver::bind(&listen).await?;
        Ok(Self {
            receiver,
            emitter: None,
            emit_endpoint,
            send_timeout: config.send_timeout(),
        })
    }

    pub fn listen_endpoint(&self) -> &Endpoint {
        self.receiver.endpoint()
    }

    pub fn emit_endpoint(&self) -> &Endpoint {
        &self.emit_endpoint
    }
}

#[async_trait]
impl SignalTransport for ZmqTransport {
    async fn receive(&mut self) -> Result<Option<Inbound>, TransportError> {
        self.receiver.recv_signal().await.map(Some)
    }

    async fn send(&mut self, name: &str, value: &Value) -> Result<(), TransportError> {
        if self.emitter.is_none() {
            let sender = SignalSender::connect(&self.emit_endpoint, self.send_timeout).await?;
            self.emitter = Some(sender);
        }
        let Some(emitter) = self.emitter.as_mut() else {
            return Err(TransportError::Closed);
        };

        let result = emitter.send_signal(name, value).await;
        if result.is_err() {
            // A REQ socket that missed its reply cannot send again.
            warn!(endpoint = %self.emit_endpoint, "dropping REQ socket after failed send");
            self.emitter = None;
        }
        result
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.emitter = None;
        self.receiver.close()
    }

    fn backend(&self) -> &'static str {
        "zeromq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_multipart() {
        let mut msg = ZmqMessage::from(vec![0x90u8]);
        msg.push_back(vec![0u8].into());
        assert!(matches!(
            decode_request(&msg),
            Err(TransportError::Protocol(_))
        ));
    }

    #[test]
    fn decode_single_frame() {
        let body = SignalFrame::new("car.moving", Value::Absent).to_bytes().unwrap();
        let frame = decode_request(&ZmqMessage::from(body)).unwrap();
        assert_eq!(frame.name(), "car.moving");
    }

    #[tokio::test]
    async fn timeout_helper_reports_limit() {
        let limit = Duration::from_millis(20);
        let result: Result<(), _> = with_timeout(Some(limit), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, TransportError>(())
        })
        .await;
        assert!(matches!(result, Err(TransportError::Timeout(d)) if d == limit));
    }
}
