//! Error definitions for the MQTT module

use thiserror::Error;

/// Errors surfaced by the connection wrapper and its handle.
#[derive(Debug, Error)]
pub enum MqttError {
    /// The client library refused a request (subscribe, disconnect)
    #[error("Client request failed: {0}")]
    ClientError(#[from] rumqttc::ClientError),

    /// Broker settings that can never produce a session
    #[error("Invalid MQTT configuration: {0}")]
    InvalidConfig(String),

    /// A new broker session could not be opened
    #[error("Failed to open broker session: {0}")]
    SessionError(String),

    /// The handler task is not keeping up with commands
    #[error("Command queue is full")]
    CommandQueueFull,

    /// The handler task has terminated
    #[error("MQTT handler is no longer running")]
    HandlerGone,
}

impl<T> From<tokio::sync::mpsc::error::TrySendError<T>> for MqttError {
    fn from(e: tokio::sync::mpsc::error::TrySendError<T>) -> Self {
        match e {
            tokio::sync::mpsc::error::TrySendError::Full(_) => MqttError::CommandQueueFull,
            tokio::sync::mpsc::error::TrySendError::Closed(_) => MqttError::HandlerGone,
        }
    }
}
