use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

/// Fixed reference series shown next to the live labels.
pub const REFERENCE_POINTS: [[f64; 2]; 10] = [
    [0.0, 6.0],
    [2.0, 4.0],
    [3.0, 8.0],
    [7.0, 4.0],
    [10.0, 5.0],
    [11.0, 1.0],
    [13.0, 3.0],
    [17.0, 6.0],
    [18.0, 3.0],
    [20.0, 2.0],
];

const CHART_TITLE: &str = "Line Chart Example";

/// Static line chart. It is not bound to the live feed.
#[derive(Debug, Default)]
pub struct ReferenceChart;

impl ReferenceChart {
    pub fn render(&self, ui: &mut Ui) {
        ui.vertical_centered(|ui| ui.heading(CHART_TITLE));
        Plot::new("reference_chart")
            .legend(Legend::default())
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::from(REFERENCE_POINTS.to_vec())).name("Series 1"));
            });
    }
}
