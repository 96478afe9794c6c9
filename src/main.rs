pub mod config;
pub mod mqtt;
pub mod ui;

use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::mqtt::transport::RumqttConnector;
use crate::mqtt::MqttHandle;
use crate::ui::StatusboardUI;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = AppConfig::load_or_default().await;
    info!(
        "Using broker {} and topic {}",
        config.mqtt, config.mqtt.topic
    );

    // Connection wrapper runs on the tokio runtime, the UI on the main thread
    let connector = RumqttConnector::new(config.mqtt.clone());
    let (mqtt_handle, notifications) =
        MqttHandle::spawn(Box::new(connector), config.mqtt.channel_capacity);

    info!("Starting UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_title(config.ui.title.clone())
        .with_fullscreen(config.ui.fullscreen);

    let AppConfig {
        mqtt: mqtt_config,
        ui: ui_config,
    } = config;
    eframe::run_native(
        &ui_config.title.clone(),
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(StatusboardUI::new(
                cc,
                mqtt_handle,
                notifications,
                &mqtt_config,
                &ui_config,
            )))
        }),
    )
    .map_err(|e| eyre!("UI terminated with error: {}", e))?;

    info!("Window closed, shutting down");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(log_level())
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

/// Maximum level taken from `RUST_LOG`, `info` when unset or unrecognised.
fn log_level() -> Level {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(Level::INFO)
}
