use serde::{Deserialize, Serialize};
use vsm_core::{Inbound, Value};

/// Acknowledgement body a receiver returns for every request.
pub const ACK: [u8; 1] = [0];

/// Wire body of one socket request: the `(name, value)` pair.
///
/// Serialized with MessagePack as a two-element array. An absent value is
/// encoded as nil and denotes a bare trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame(pub String, pub Value);

impl SignalFrame {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self(name.into(), value)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> &Value {
        &self.1
    }

    /// Serialize this frame to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    /// Deserialize a frame from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }

    pub fn into_inbound(self) -> Inbound {
        Inbound::from_parts(self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use vsm_core::Event;

    use super::*;

    #[test]
    fn roundtrip_each_value_kind() {
        for value in [
            Value::Absent,
            Value::Bool(true),
            Value::Int(-9872),
            Value::Float(129.5),
            Value::Text("front_left".into()),
        ] {
            let frame = SignalFrame::new("car.door", value.clone());
            let decoded = SignalFrame::from_bytes(&frame.to_bytes().unwrap()).unwrap();
            assert_eq!(decoded.value(), &value);
        }
    }

    #[test]
    fn encodes_as_two_element_array() {
        let bytes = SignalFrame::new("a", Value::Absent).to_bytes().unwrap();
        // fixarray(2), fixstr(1) "a", nil
        assert_eq!(bytes, vec![0x92, 0xa1, b'a', 0xc0]);
    }

    #[test]
    fn absent_value_is_trigger() {
        let inbound = SignalFrame::new("car.moving", Value::Absent).into_inbound();
        assert_eq!(inbound, Inbound::Signal(Event::trigger("car.moving")));

        let quit = SignalFrame::new("quit", Value::Absent).into_inbound();
        assert_eq!(quit, Inbound::Quit);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(SignalFrame::from_bytes(&[0xff, 0x00]).is_err());
    }
}
