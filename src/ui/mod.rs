//! # Statusboard User Interface
//!
//! A single window with three areas:
//! - **Label column** (left): large labels, the first of which shows the most
//!   recent message received on the subscribed topic
//! - **Chart** (centre): a static reference line chart
//! - **Status bar** (bottom): broker address, connection state, message count
//!   and the last transport error
//!
//! ## Event Flow
//!
//! The UI owns the receiving end of the connection wrapper's notification
//! channel and drains it once per frame with `try_recv`, so the egui thread
//! never waits on the network. Reactions to notifications are decided by
//! [`Dashboard`]; this module only renders its state and forwards the
//! resulting requests to the [`MqttHandle`].
//!
//! Because notifications only arrive when a frame runs, the UI requests a
//! repaint at the configured interval even when idle.

pub mod chart;
pub mod common;
pub mod dashboard;

use eframe::egui::{self, Button, Frame, Label, Stroke};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::UiConfig;
use crate::mqtt::config::MqttConfig;
use crate::mqtt::{ConnectionState, MqttHandle, MqttNotification};

use self::chart::ReferenceChart;
use self::common::{label_text, state_indicator, UiColors};
use self::dashboard::{Dashboard, ShellAction};

/// Label column to chart width ratio is 1:40
const LABEL_COLUMN_SHARE: f32 = 1.0 / 41.0;

fn label_column_width(available_width: f32) -> f32 {
    available_width * LABEL_COLUMN_SHARE
}

pub struct StatusboardUI {
    /// Label contents and the shell's view of the connection state
    dashboard: Dashboard,

    /// Static chart next to the labels
    chart: ReferenceChart,

    /// Command side of the connection wrapper
    mqtt: MqttHandle,

    /// Notifications from the connection wrapper
    notifications: mpsc::UnboundedReceiver<MqttNotification>,

    /// Broker address shown in the status bar
    broker: String,

    repaint_interval: Duration,
}

impl StatusboardUI {
    /// Builds the window contents and immediately requests a connection.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mqtt: MqttHandle,
        notifications: mpsc::UnboundedReceiver<MqttNotification>,
        mqtt_config: &MqttConfig,
        ui_config: &UiConfig,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let ui = Self::from_parts(mqtt, notifications, mqtt_config, ui_config);
        ui.request_connect();
        ui
    }

    fn from_parts(
        mqtt: MqttHandle,
        notifications: mpsc::UnboundedReceiver<MqttNotification>,
        mqtt_config: &MqttConfig,
        ui_config: &UiConfig,
    ) -> Self {
        StatusboardUI {
            dashboard: Dashboard::new(mqtt_config.topic.clone(), ui_config.label_count),
            chart: ReferenceChart,
            mqtt,
            notifications,
            broker: mqtt_config.to_string(),
            repaint_interval: Duration::from_millis(ui_config.repaint_ms.max(1)),
        }
    }

    fn request_connect(&self) {
        info!("Connecting to MQTT broker at {}", self.broker);
        if let Err(e) = self.mqtt.connect() {
            error!("Connect request failed: {}", e);
        }
    }

    /// Applies every pending notification and forwards the resulting requests.
    fn drain_notifications(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            if let Some(action) = self.dashboard.apply(notification) {
                match action {
                    ShellAction::Subscribe(topic) => {
                        if let Err(e) = self.mqtt.subscribe(topic) {
                            warn!("Subscribe request failed: {}", e);
                        }
                    }
                }
            }
        }
    }

    fn render_labels(&self, ui: &mut egui::Ui) {
        Frame::new()
            .fill(UiColors::EXTREME_BG)
            .stroke(Stroke::new(1.0, UiColors::BORDER))
            .inner_margin(6)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    for text in self.dashboard.labels() {
                        ui.add(Label::new(label_text(text)).truncate());
                        ui.add_space(ui.available_height() / 10.0);
                    }
                });
            });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        let status = self.mqtt.status();
        let state = self.dashboard.state();

        ui.horizontal_centered(|ui| {
            ui.label(format!("{} {}", self.broker, self.dashboard.topic()));
            ui.label(state_indicator(state));
            ui.label(format!("Messages: {}", status.messages_received));
            if status.decode_failures > 0 {
                ui.label(format!("Undecodable: {}", status.decode_failures));
            }
            if let Some(err) = &status.last_error {
                ui.label(format!("Last error: {}", err));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match state {
                    ConnectionState::Disconnected => {
                        if ui.add(Button::new("Reconnect")).clicked() {
                            self.request_connect();
                        }
                    }
                    ConnectionState::Connected => {
                        if ui.add(Button::new("Disconnect")).clicked() {
                            if let Err(e) = self.mqtt.disconnect() {
                                error!("Disconnect request failed: {}", e);
                            }
                        }
                    }
                    ConnectionState::Connecting => {
                        ui.spinner();
                    }
                }
            });
        });
    }
}

impl eframe::App for StatusboardUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_notifications();
        ctx.request_repaint_after(self.repaint_interval);

        egui::CentralPanel::default().show(ctx, |ui| {
            let label_width = label_column_width(ui.available_width());

            egui::TopBottomPanel::bottom("status_bar")
                .show_separator_line(false)
                .show_inside(ui, |ui| self.render_status_bar(ui));

            egui::SidePanel::left("label_panel")
                .resizable(false)
                .show_separator_line(false)
                .exact_width(label_width)
                .show_inside(ui, |ui| self.render_labels(ui));

            egui::CentralPanel::default().show_inside(ui, |ui| self.chart.render(ui));
        });
    }
}
