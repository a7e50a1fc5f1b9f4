use eframe::egui;
use egui::{RichText, Ui};
use egui_phosphor::regular::{CHART_LINE, DOWNLOAD_SIMPLE};
use egui_plot::{Legend, Line, Plot};
use log::{info, warn};

use super::panel_trait::{Panel, PanelData, PanelState};
use crate::data::export;
use crate::data::parameters::ParameterCollection;
use crate::monitor::ParameterId;

/// Live line plot of one numeric parameter. The newest sample sits at x = 0.
pub struct LinePlotPanel {
    pub state: PanelState,
    pub id: ParameterId,
    /// Visible span in seconds; x runs from `-time_window` to 0.
    pub time_window: f64,
}

impl LinePlotPanel {
    pub fn new(id: ParameterId, time_window: f64) -> Self {
        Self {
            state: PanelState::new("Plot", CHART_LINE),
            id,
            time_window,
        }
    }
}

/// Y range covering the points with `x >= -window`, padded by 5 %.
pub fn visible_y_bounds(points: &[[f64; 2]], window: f64) -> Option<(f64, f64)> {
    let (lo, hi) = points
        .iter()
        .filter(|[x, y]| *x >= -window && y.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &[_, y]| {
            (lo.min(y), hi.max(y))
        });
    if !lo.is_finite() {
        return None;
    }
    let space = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    Some((lo - space, hi + space))
}

impl Panel for LinePlotPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn title(&self, params: &ParameterCollection) -> String {
        match params.get(self.id) {
            Some(p) => format!("{} {}", CHART_LINE, p.display_name),
            None => format!("{} Plot", CHART_LINE),
        }
    }

    fn parameter(&self) -> Option<ParameterId> {
        Some(self.id)
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut PanelData<'_>) {
        let start = data.params.start_time();
        let Some(p) = data.params.get(self.id) else {
            ui.label(RichText::new("Parameter was removed.").weak());
            return;
        };

        let mut export_failed = None;
        ui.horizontal(|ui| {
            ui.label("Window:");
            ui.add(
                egui::DragValue::new(&mut self.time_window)
                    .range(1.0..=3600.0)
                    .speed(0.5)
                    .suffix(" s"),
            );
            ui.label(RichText::new(format!("{} points", p.history.len())).weak());
            if ui
                .button(format!("{} Export CSV", DOWNLOAD_SIMPLE))
                .on_hover_text("Save the recorded history as CSV")
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .set_file_name(format!("{}.csv", p.display_name))
                    .add_filter("CSV", &["csv"])
                    .save_file()
                {
                    match export::save_history_csv(&path, p, start) {
                        Ok(()) => info!("exported '{}' to {}", p.pv_name, path.display()),
                        Err(e) => {
                            warn!("CSV export to {} failed: {}", path.display(), e);
                            export_failed = Some(format!("CSV export failed: {}", e));
                        }
                    }
                }
            }
        });

        let points = p.history.relative_points();
        let y_bounds = visible_y_bounds(&points, self.time_window);
        let window = self.time_window;
        Plot::new(("line_plot", self.id))
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_drag(false)
            .legend(Legend::default())
            .x_axis_label("Time (s)")
            .y_axis_label(p.axis_label())
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds_x(-window..=0.0);
                if let Some((lo, hi)) = y_bounds {
                    plot_ui.set_plot_bounds_y(lo..=hi);
                }
                plot_ui.line(Line::new(p.display_name.clone(), points));
            });

        if let Some(msg) = export_failed {
            data.set_status(msg);
        }
    }

    fn on_close(&mut self, data: &mut PanelData<'_>) {
        data.params.detach_plot(self.id);
    }
}
