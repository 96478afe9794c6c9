use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::MqttError;

/// Broker connection parameters for the connection wrapper.
///
/// Every field has a default so that a missing or partial `[mqtt]` table in
/// the config file still yields a usable connection to a local broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name or address
    pub host: String,
    /// Broker TCP port
    pub port: u16,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// The single topic the dashboard subscribes to once connected
    pub topic: String,
    /// MQTT keep alive interval in seconds
    pub keep_alive_secs: u64,
    /// Capacity of the command and event channels
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 1883,
            client_id: "statusboard".to_owned(),
            topic: "topic/state".to_owned(),
            keep_alive_secs: 5,
            channel_capacity: 100,
        }
    }
}

impl MqttConfig {
    /// Rejects settings rumqttc cannot open a session with.
    pub fn validate(&self) -> Result<(), MqttError> {
        if self.client_id.trim().is_empty() {
            return Err(MqttError::InvalidConfig("client id must not be empty".into()));
        }
        if self.host.trim().is_empty() {
            return Err(MqttError::InvalidConfig("broker host must not be empty".into()));
        }
        if self.topic.trim().is_empty() {
            return Err(MqttError::InvalidConfig("topic must not be empty".into()));
        }
        Ok(())
    }
}

impl fmt::Display for MqttConfig {
    /// Formats the broker address as "host:port" for the status bar.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
