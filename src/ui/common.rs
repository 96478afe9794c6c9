//! # UI Common Components
//!
//! Shared colours and small widgets used by the dashboard panels.

use eframe::egui::{Color32, FontId, RichText};

use crate::mqtt::ConnectionState;

/// Centralized color palette for the dashboard's dark theme.
///
/// Status colours follow the traffic light convention: green when the broker
/// session is up, amber while a connection attempt is pending and red when
/// disconnected.
pub struct UiColors;

impl UiColors {
    /// Deepest background color for the label column (RGB: 20, 20, 20)
    pub const EXTREME_BG: Color32 = Color32::from_rgb(20, 20, 20);

    /// Border color for component separation (RGB: 60, 60, 60)
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Connected status indicator color (RGB: 50, 200, 20) - Green
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    /// Connecting status indicator color (RGB: 220, 170, 20) - Amber
    pub const PENDING: Color32 = Color32::from_rgb(220, 170, 20);

    /// Disconnected status indicator color (RGB: 200, 50, 20) - Red
    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);
}

/// Point size of the status labels
pub const LABEL_FONT_SIZE: f32 = 48.0;

pub fn state_color(state: ConnectionState) -> Color32 {
    match state {
        ConnectionState::Connected => UiColors::ACTIVE,
        ConnectionState::Connecting => UiColors::PENDING,
        ConnectionState::Disconnected => UiColors::INACTIVE,
    }
}

/// Coloured "● State" text for the status bar.
pub fn state_indicator(state: ConnectionState) -> RichText {
    RichText::new(format!("● {}", state)).color(state_color(state))
}

/// Large bold text used for the status label column.
pub fn label_text(text: &str) -> RichText {
    RichText::new(text)
        .font(FontId::proportional(LABEL_FONT_SIZE))
        .strong()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_a_distinct_color() {
        let colors = [
            state_color(ConnectionState::Disconnected),
            state_color(ConnectionState::Connecting),
            state_color(ConnectionState::Connected),
        ];
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
    }
}
