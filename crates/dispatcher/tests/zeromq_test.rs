//! Dispatcher driven over the REQ/REP backend on loopback TCP.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use vsm_core::{Event, InitialState, Inbound, Value};
use vsm_dispatcher::Dispatcher;
use vsm_rules::{compile, RuleDefinition, RuleIndex};
use vsm_transport::{SignalFrame, SignalReceiver, ZeromqConfig, ZmqTransport, ACK};
use zeromq::{ReqSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

const SETTLE: Duration = Duration::from_millis(200);

async fn request(req: &mut ReqSocket, body: Vec<u8>) -> Vec<u8> {
    req.send(ZmqMessage::from(body)).await.unwrap();
    let reply = req.recv().await.unwrap();
    reply.get(0).unwrap().to_vec()
}

fn frame(name: &str) -> Vec<u8> {
    SignalFrame::new(name, Value::Absent).to_bytes().unwrap()
}

#[tokio::test]
async fn garbage_request_does_not_stop_the_loop() {
    let config = ZeromqConfig {
        listen: "tcp://127.0.0.1:17200".into(),
        emit: "tcp://127.0.0.1:17201".into(),
        send_timeout_ms: 5000,
    };

    let mut sink = SignalReceiver::bind(&config.emit_endpoint().unwrap())
        .await
        .unwrap();
    let sink_task = tokio::spawn(async move { sink.recv_signal().await.unwrap() });

    let rules = RuleIndex::from_iter([compile(
        "car.moving",
        &RuleDefinition::from_yaml("condition: car.damage == true\nemit:\n  signal: car.backup\n")
            .unwrap(),
    )
    .unwrap()]);
    let state = InitialState::parse("car.damage=true\n", Path::new("state.conf"))
        .unwrap()
        .into_store();

    let transport = ZmqTransport::open(&config).await.unwrap();
    let dispatcher = tokio::spawn(
        Dispatcher::new(transport, Arc::new(rules), state).run(std::future::pending::<()>()),
    );
    tokio::time::sleep(SETTLE).await;

    let mut req = ReqSocket::new();
    req.connect(&config.listen).await.unwrap();
    tokio::time::sleep(SETTLE).await;

    assert_eq!(request(&mut req, vec![0xff, 0x00]).await, ACK.to_vec());
    assert_eq!(request(&mut req, frame("car.moving")).await, ACK.to_vec());

    assert_eq!(
        sink_task.await.unwrap(),
        Inbound::Signal(Event::trigger("car.backup"))
    );

    assert_eq!(request(&mut req, frame("quit")).await, ACK.to_vec());
    let stats = dispatcher.await.unwrap().unwrap();
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.emitted, 1);
}
