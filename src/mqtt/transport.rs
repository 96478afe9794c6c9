//! Transport seam between the connection wrapper and the MQTT client library.
//!
//! The handler only talks to a [`Connector`] and the [`BrokerLink`] it returns.
//! The rumqttc implementation spawns one pump task per session which polls
//! the client event loop and forwards the lifecycle-relevant events, in
//! arrival order, as [`BrokerEvent`]s tagged with their session number.

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::MqttConfig;
use super::error::MqttError;

/// Transport events the connection wrapper reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    /// The broker acknowledged the connection
    Connected,
    /// The session ended. `reason` is `None` for a requested disconnect.
    Disconnected { reason: Option<String> },
    /// An inbound publish with its raw payload
    Message { topic: String, payload: Vec<u8> },
}

/// A [`BrokerEvent`] tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: u64,
    pub event: BrokerEvent,
}

/// Sending half handed to a session's pump.
#[derive(Debug, Clone)]
pub struct EventSink {
    session: u64,
    tx: mpsc::Sender<SessionEvent>,
}

impl EventSink {
    pub(crate) fn new(session: u64, tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub async fn send(&self, event: BrokerEvent) -> Result<(), MqttError> {
        self.tx
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .await
            .map_err(|_| MqttError::HandlerGone)
    }
}

/// Requests the handler can make on an open session.
pub trait BrokerLink: Send + 'static {
    fn subscribe(&self, topic: &str) -> Result<(), MqttError>;
    fn disconnect(&self) -> Result<(), MqttError>;
}

/// Opens broker sessions.
///
/// `open` must not block. It starts whatever background work the session
/// needs and reports the outcome through `sink`; the pump stops when `cancel`
/// fires.
pub trait Connector: Send + 'static {
    fn open(
        &mut self,
        sink: EventSink,
        cancel: CancellationToken,
    ) -> Result<Box<dyn BrokerLink>, MqttError>;
}

/// [`Connector`] backed by rumqttc's async client.
pub struct RumqttConnector {
    config: MqttConfig,
}

impl RumqttConnector {
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> Result<MqttOptions, MqttError> {
        self.config.validate()?;
        let mut options = MqttOptions::new(
            self.config.client_id.trim(),
            self.config.host.trim(),
            self.config.port,
        );
        options.set_keep_alive(Duration::from_secs(self.config.keep_alive_secs.max(1)));
        Ok(options)
    }
}

impl Connector for RumqttConnector {
    fn open(
        &mut self,
        sink: EventSink,
        cancel: CancellationToken,
    ) -> Result<Box<dyn BrokerLink>, MqttError> {
        let options = self.options()?;
        info!(
            "Opening MQTT session {} to {}",
            sink.session(),
            self.config
        );

        let (client, eventloop) = AsyncClient::new(options, self.config.channel_capacity.max(1));
        tokio::spawn(pump_events(eventloop, sink, cancel));

        Ok(Box::new(RumqttLink { client }))
    }
}

struct RumqttLink {
    client: AsyncClient,
}

impl BrokerLink for RumqttLink {
    fn subscribe(&self, topic: &str) -> Result<(), MqttError> {
        self.client.try_subscribe(topic, QoS::AtMostOnce)?;
        Ok(())
    }

    fn disconnect(&self) -> Result<(), MqttError> {
        self.client.try_disconnect()?;
        Ok(())
    }
}

/// Polls the event loop until the session ends or `cancel` fires.
///
/// Any poll error is reported as a disconnect and ends the pump. Reconnecting
/// is left to the next `connect()`.
async fn pump_events(mut eventloop: EventLoop, sink: EventSink, cancel: CancellationToken) {
    debug!("MQTT pump for session {} started", sink.session());
    loop {
        let polled = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("MQTT pump for session {} cancelled", sink.session());
                break;
            }
            polled = eventloop.poll() => polled,
        };

        let event = match polled {
            Ok(event) => match translate(event) {
                Some(event) => event,
                None => continue,
            },
            Err(e) => {
                error!("MQTT connection error: {e}");
                BrokerEvent::Disconnected {
                    reason: Some(e.to_string()),
                }
            }
        };

        let finished = matches!(event, BrokerEvent::Disconnected { .. });
        if sink.send(event).await.is_err() {
            warn!("MQTT handler gone, stopping pump for session {}", sink.session());
            break;
        }
        if finished {
            break;
        }
    }
    debug!("MQTT pump for session {} finished", sink.session());
}

/// Maps a client event loop event to the transport event the wrapper cares about.
pub(crate) fn translate(event: Event) -> Option<BrokerEvent> {
    match event {
        Event::Incoming(Packet::ConnAck(ack)) => match ack.code {
            ConnectReturnCode::Success => Some(BrokerEvent::Connected),
            code => Some(BrokerEvent::Disconnected {
                reason: Some(format!("connection refused: {code:?}")),
            }),
        },
        Event::Incoming(Packet::Publish(publish)) => Some(BrokerEvent::Message {
            topic: publish.topic,
            payload: publish.payload.to_vec(),
        }),
        Event::Incoming(Packet::Disconnect) => Some(BrokerEvent::Disconnected {
            reason: Some("broker closed the session".to_owned()),
        }),
        Event::Outgoing(Outgoing::Disconnect) => Some(BrokerEvent::Disconnected { reason: None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rumqttc::{ConnAck, Publish};

    #[test]
    fn successful_connack_is_connected() {
        let event = Event::Incoming(Packet::ConnAck(ConnAck::new(ConnectReturnCode::Success, false)));
        assert_eq!(translate(event), Some(BrokerEvent::Connected));
    }

    #[test]
    fn refused_connack_is_disconnected_with_reason() {
        let event = Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::NotAuthorized,
            false,
        )));
        assert_eq!(
            translate(event),
            Some(BrokerEvent::Disconnected {
                reason: Some("connection refused: NotAuthorized".to_owned())
            })
        );
    }

    #[test]
    fn publish_keeps_topic_and_raw_payload() {
        let publish = Publish::new("topic/state", QoS::AtMostOnce, b"42".to_vec());
        assert_eq!(
            translate(Event::Incoming(Packet::Publish(publish))),
            Some(BrokerEvent::Message {
                topic: "topic/state".to_owned(),
                payload: b"42".to_vec(),
            })
        );
    }

    #[test]
    fn outgoing_disconnect_confirms_requested_disconnect() {
        assert_eq!(
            translate(Event::Outgoing(Outgoing::Disconnect)),
            Some(BrokerEvent::Disconnected { reason: None })
        );
    }

    #[test]
    fn housekeeping_packets_are_ignored() {
        assert_eq!(translate(Event::Incoming(Packet::PingResp)), None);
        assert_eq!(translate(Event::Outgoing(Outgoing::PingReq)), None);
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let connector = RumqttConnector::new(MqttConfig {
            client_id: "  ".to_owned(),
            ..MqttConfig::default()
        });
        assert!(matches!(connector.options(), Err(MqttError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn sink_tags_events_with_its_session() -> testresult::TestResult {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = EventSink::new(7, tx);
        sink.send(BrokerEvent::Connected).await?;

        assert_eq!(
            rx.recv().await,
            Some(SessionEvent {
                session: 7,
                event: BrokerEvent::Connected
            })
        );
        Ok(())
    }
}
