//! MQTT Handler - single-writer owner of the connection status
//!
//! The handler runs as one tokio task. UI commands and transport events reach
//! it on two channels and are processed one at a time, so the connection
//! status has exactly one writer and needs no locking. Every change is
//! republished to the UI as an [`MqttNotification`] and mirrored into a
//! [`MqttStatus`] snapshot on a watch channel.
//!
//! ```text
//! MqttHandle ─[MqttCommand]──────┐
//!                                 ├→ MqttHandler ─[MqttNotification]→ UI
//! pump task ─[SessionEvent]──────┘        └─[watch: MqttStatus]→ any reader
//! ```

use statum::{machine, state};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::MqttError;
use super::message_manager::{MqttMessage, MqttNotification, MqttStatus};
use super::payload::decode_payload;
use super::state::{ConnectionState, StatusTracker};
use super::transport::{BrokerEvent, BrokerLink, Connector, EventSink, SessionEvent};

/// Requests from the UI to the handler task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttCommand {
    Connect,
    Disconnect,
    Subscribe(String),
}

// Handler lifecycle
#[state]
#[derive(Debug, Clone)]
pub enum HandlerState {
    Idle,
    Running,
}

#[machine]
pub struct MqttHandler<S: HandlerState> {
    // Opens a new broker session on connect
    connector: Box<dyn Connector>,

    // Link of the current session, if one is open
    link: Option<Box<dyn BrokerLink>>,

    // Number of the most recently opened session
    session: u64,

    tracker: StatusTracker,
    status: MqttStatus,

    commands: mpsc::Receiver<MqttCommand>,
    broker_tx: mpsc::Sender<SessionEvent>,
    broker_rx: mpsc::Receiver<SessionEvent>,
    // Unbounded so a UI that stops draining (minimized window) never stalls the pump
    notifications: mpsc::UnboundedSender<MqttNotification>,
    status_tx: watch::Sender<MqttStatus>,

    // Parent of every session's pump token
    shutdown: CancellationToken,
    session_cancel: Option<CancellationToken>,
}

impl MqttHandler<Idle> {
    /// Creates an idle handler together with its handle and notification receiver.
    pub fn create(
        connector: Box<dyn Connector>,
        capacity: usize,
    ) -> (Self, MqttHandle, mpsc::UnboundedReceiver<MqttNotification>) {
        let capacity = capacity.max(1);
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let (broker_tx, broker_rx) = mpsc::channel(capacity);
        let (notification_tx, notification_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(MqttStatus::default());

        let handler = Self::new(
            connector,
            None,
            0,
            StatusTracker::new(),
            MqttStatus::default(),
            command_rx,
            broker_tx,
            broker_rx,
            notification_tx,
            status_tx,
            CancellationToken::new(),
            None,
        );
        let handle = MqttHandle {
            commands: command_tx,
            status: status_rx,
        };
        (handler, handle, notification_rx)
    }

    pub fn start(self) -> MqttHandler<Running> {
        debug!("MQTT handler transitioning to Running state");
        self.transition()
    }
}

impl MqttHandler<Running> {
    /// Processes commands and transport events until every handle is dropped.
    pub async fn run(mut self) {
        info!("MQTT handler running");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.broker_rx.recv() => self.handle_broker_event(event),
            }
        }

        self.shutdown.cancel();
        info!("MQTT handler stopped, all handles dropped");
    }

    fn handle_command(&mut self, command: MqttCommand) {
        debug!("Handling MQTT command: {:?}", command);
        match command {
            MqttCommand::Connect => self.connect(),
            MqttCommand::Disconnect => self.disconnect(),
            MqttCommand::Subscribe(topic) => self.subscribe(&topic),
        }
    }

    fn connect(&mut self) {
        let current = self.tracker.current();
        if current != ConnectionState::Disconnected {
            debug!("Ignoring connect request while {}", current);
            return;
        }

        if let Some(previous) = self.session_cancel.take() {
            previous.cancel();
        }
        self.session += 1;
        let cancel = self.shutdown.child_token();
        let sink = EventSink::new(self.session, self.broker_tx.clone());

        match self.connector.open(sink, cancel.clone()) {
            Ok(link) => {
                self.link = Some(link);
                self.session_cancel = Some(cancel);
                self.set_state(ConnectionState::Connecting);
            }
            Err(e) => {
                error!("Failed to open MQTT session {}: {}", self.session, e);
                self.status.last_error = Some(e.to_string());
                self.publish_status();
            }
        }
    }

    fn disconnect(&mut self) {
        match &self.link {
            Some(link) => {
                info!("Requesting disconnect of MQTT session {}", self.session);
                if let Err(e) = link.disconnect() {
                    warn!("Disconnect request failed: {}", e);
                }
            }
            None => debug!("No open MQTT session to disconnect"),
        }
    }

    fn subscribe(&mut self, topic: &str) {
        if !self.tracker.current().is_connected() {
            debug!(
                "Not subscribing to {} while {}",
                topic,
                self.tracker.current()
            );
            return;
        }
        let Some(link) = &self.link else {
            return;
        };
        match link.subscribe(topic) {
            Ok(()) => info!("Subscribed to {}", topic),
            Err(e) => warn!("Subscription to {} failed: {}", topic, e),
        }
    }

    fn handle_broker_event(&mut self, event: SessionEvent) {
        if event.session != self.session {
            debug!(
                "Dropping event from superseded session {}: {:?}",
                event.session, event.event
            );
            return;
        }

        self.status.last_activity = Some(chrono::Local::now());
        match event.event {
            BrokerEvent::Connected => {
                self.set_state(ConnectionState::Connected);
                self.notify(MqttNotification::Connected);
            }
            BrokerEvent::Disconnected { reason } => {
                if let Some(reason) = reason {
                    self.status.last_error = Some(reason);
                }
                self.link = None;
                self.session_cancel = None;
                self.set_state(ConnectionState::Disconnected);
                self.notify(MqttNotification::Disconnected);
            }
            BrokerEvent::Message { topic, payload } => match decode_payload(&payload) {
                Ok(text) => {
                    debug!("Message on {}: {}", topic, text);
                    self.status.messages_received += 1;
                    self.publish_status();
                    self.notify(MqttNotification::Message(MqttMessage::from_topic(
                        topic, text,
                    )));
                }
                Err(e) => {
                    warn!("Dropping message on {}: {}", topic, e);
                    self.status.decode_failures += 1;
                    self.publish_status();
                }
            },
        }
    }

    fn set_state(&mut self, next: ConnectionState) {
        let Some(changed) = self.tracker.set(next) else {
            self.publish_status();
            return;
        };
        info!("MQTT: {}", changed);
        self.status.connection_state = changed;
        self.publish_status();
        self.notify(MqttNotification::StateChanged(changed));
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.status.clone());
    }

    fn notify(&self, notification: MqttNotification) {
        if self.notifications.send(notification).is_err() {
            debug!("Notification receiver dropped");
        }
    }
}

/// Cloneable, non-blocking interface to the handler task.
///
/// All requests are queued with `try_send`, so calling them from the UI thread
/// never waits on the network.
#[derive(Debug, Clone)]
pub struct MqttHandle {
    commands: mpsc::Sender<MqttCommand>,
    status: watch::Receiver<MqttStatus>,
}

impl MqttHandle {
    /// Spawns the handler task on the current tokio runtime.
    pub fn spawn(
        connector: Box<dyn Connector>,
        capacity: usize,
    ) -> (Self, mpsc::UnboundedReceiver<MqttNotification>) {
        let (handler, handle, notifications) = MqttHandler::create(connector, capacity);
        tokio::spawn(handler.start().run());
        (handle, notifications)
    }

    /// Starts a new session; status becomes Connecting right away.
    pub fn connect(&self) -> Result<(), MqttError> {
        self.commands.try_send(MqttCommand::Connect)?;
        Ok(())
    }

    /// Asks the broker to end the session. Status follows on confirmation.
    pub fn disconnect(&self) -> Result<(), MqttError> {
        self.commands.try_send(MqttCommand::Disconnect)?;
        Ok(())
    }

    /// Subscribes to `topic` if the session is connected when the request is processed.
    pub fn subscribe(&self, topic: impl Into<String>) -> Result<(), MqttError> {
        self.commands.try_send(MqttCommand::Subscribe(topic.into()))?;
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        self.status.borrow().connection_state
    }

    pub fn status(&self) -> MqttStatus {
        self.status.borrow().clone()
    }
}
