use chrono::{DateTime, Local};
use std::fmt;

use super::state::ConnectionState;

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttMessage {
    pub topic: String,
    pub text: String,
    pub received_at: DateTime<Local>,
}

impl MqttMessage {
    pub fn from_topic(topic: String, text: String) -> Self {
        MqttMessage {
            topic,
            text,
            received_at: Local::now(),
        }
    }
}

impl fmt::Display for MqttMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.received_at.format("%H:%M:%S"),
            self.topic,
            self.text
        )
    }
}

/// Notifications published by the connection wrapper to its single consumer.
///
/// `StateChanged` is emitted only when the status value actually changes.
/// `Connected` and `Disconnected` mirror every transport confirmation, even
/// when the status was already at that value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttNotification {
    StateChanged(ConnectionState),
    Connected,
    Disconnected,
    Message(MqttMessage),
}

/// Observational snapshot of the broker session, published on a watch channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MqttStatus {
    pub connection_state: ConnectionState,
    pub messages_received: usize,
    pub decode_failures: usize,
    pub last_activity: Option<DateTime<Local>>,
    pub last_error: Option<String>,
}
