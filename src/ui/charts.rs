use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

// ---------------------------------------------------------------------------
// Shared widgets for the dashboard pages
// ---------------------------------------------------------------------------

/// One bar of a categorical chart.
pub struct BarItem {
    pub label: String,
    pub value: f64,
    pub color: Color32,
}

/// Categorical bar chart; each bar gets its own legend entry so the labels
/// stay readable without custom axis ticks.
pub fn bar_chart(ui: &mut Ui, id: &str, title: &str, y_label: &str, items: &[BarItem]) {
    ui.strong(title);
    if items.is_empty() {
        ui.label(RichText::new("No data").weak());
        return;
    }

    Plot::new(id)
        .legend(Legend::default())
        .height(220.0)
        .y_axis_label(y_label)
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (i, item) in items.iter().enumerate() {
                let bar = Bar::new(i as f64, item.value)
                    .name(&item.label)
                    .fill(item.color)
                    .width(0.7);
                let chart = BarChart::new(vec![bar])
                    .name(&item.label)
                    .color(item.color);
                plot_ui.bar_chart(chart);
            }
        });
}

/// Coloured KPI tile: big value, small caption.
pub fn metric_card(ui: &mut Ui, value: &str, caption: &str, fill: Color32) {
    egui::Frame::group(ui.style())
        .fill(fill)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(value).size(22.0).strong().color(Color32::WHITE));
                ui.label(RichText::new(caption).color(Color32::WHITE));
            });
        });
}

pub const NAVY: Color32 = Color32::from_rgb(0x0A, 0x26, 0x47);
pub const BLUE: Color32 = Color32::from_rgb(0x20, 0x52, 0x95);

pub fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}%"))
}

pub fn number(value: Option<f64>, suffix: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}{suffix}"))
}
