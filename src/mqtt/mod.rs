//! # MQTT Connection Wrapper
//!
//! Presents a small state machine over an MQTT client so that the dashboard
//! never handles broker callbacks directly. The UI sends commands through an
//! [`MqttHandle`] and receives [`MqttNotification`]s; everything in between runs
//! on the tokio runtime.
//!
//! ## Module Architecture
//!
//! ```text
//! mqtt/
//! ├── config.rs           - Broker address, client id and topic
//! ├── error.rs            - Error types of the wrapper
//! ├── message_manager.rs  - Decoded messages, notifications, status snapshot
//! ├── mqtt_handler.rs     - Single-writer handler task and its handle
//! ├── payload.rs          - ASCII payload decoding
//! ├── state.rs            - Tri-state connection status tracker
//! └── transport.rs        - Connector seam and the rumqttc event pump
//! ```
//!
//! ## Connection Lifecycle
//!
//! - `connect()` moves Disconnected → Connecting immediately and starts the
//!   session's event pump.
//! - A broker acknowledgement moves Connecting → Connected.
//! - A confirmed disconnect or any transport error moves to Disconnected.
//! - `disconnect()` only asks for the session to end; the status follows once
//!   the transport confirms it.
//! - `subscribe()` reaches the broker only while Connected and is dropped
//!   otherwise.
//!
//! Nothing is retried. A dropped connection stays down until the next
//! `connect()`.

pub mod config;
pub mod error;
pub mod message_manager;
pub mod mqtt_handler;
pub mod payload;
pub mod state;
pub mod transport;

pub use error::MqttError;
pub use message_manager::{MqttMessage, MqttNotification, MqttStatus};
pub use mqtt_handler::MqttHandle;
pub use state::ConnectionState;
