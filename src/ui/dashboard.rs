//! Reaction logic of the display shell, kept free of egui so it can be tested.

use tracing::{debug, info};

use crate::mqtt::{ConnectionState, MqttNotification};

/// Something the shell must ask the connection wrapper to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    Subscribe(String),
}

/// Label column contents plus the last connection state seen by the shell.
#[derive(Debug, Clone)]
pub struct Dashboard {
    labels: Vec<String>,
    topic: String,
    state: ConnectionState,
}

impl Dashboard {
    /// Labels start out as their own index, "0", "1", ...
    pub fn new(topic: impl Into<String>, label_count: usize) -> Self {
        Self {
            labels: (0..label_count.max(1)).map(|i| i.to_string()).collect(),
            topic: topic.into(),
            state: ConnectionState::Disconnected,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Applies one notification and returns the request it triggers, if any.
    ///
    /// Reaching Connected asks for one subscription to the fixed topic. Each
    /// message replaces the first label verbatim.
    pub fn apply(&mut self, notification: MqttNotification) -> Option<ShellAction> {
        match notification {
            MqttNotification::StateChanged(state) => {
                self.state = state;
                if state == ConnectionState::Connected {
                    info!("Connected, subscribing to {}", self.topic);
                    return Some(ShellAction::Subscribe(self.topic.clone()));
                }
                None
            }
            MqttNotification::Message(message) => {
                debug!("Displaying {}", message);
                self.labels[0] = message.text;
                None
            }
            MqttNotification::Connected | MqttNotification::Disconnected => None,
        }
    }
}
