use eframe::egui;
use egui::{RichText, Ui};
use egui_phosphor::regular::MAGNIFYING_GLASS;

use super::panel_trait::{Panel, PanelData, PanelState};
use crate::data::parameter::{Parameter, PlotUpdateMode};
use crate::data::parameters::ParameterCollection;
use crate::monitor::ParameterId;

/// Everything known about one parameter. Rows can be dropped onto it.
pub struct SpotlightPanel {
    pub state: PanelState,
    pub selected: Option<ParameterId>,
}

impl Default for SpotlightPanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Spotlight", MAGNIFYING_GLASS),
            selected: None,
        }
    }
}

/// Local wall-clock time for an epoch timestamp, with milliseconds.
pub fn format_timestamp(ts: f64) -> String {
    let secs = ts.floor();
    let nanos = ((ts - secs) * 1e9) as u32;
    match chrono::DateTime::from_timestamp(secs as i64, nanos) {
        Some(t) => t
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S%.3f")
            .to_string(),
        None => format!("{:.3}", ts),
    }
}

impl Panel for SpotlightPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn title(&self, params: &ParameterCollection) -> String {
        match self.selected.and_then(|id| params.get(id)) {
            Some(p) => format!("{} {}", MAGNIFYING_GLASS, p.display_name),
            None => format!("{} Spotlight", MAGNIFYING_GLASS),
        }
    }

    fn parameter(&self) -> Option<ParameterId> {
        self.selected
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut PanelData<'_>) {
        if self.selected.is_some_and(|id| data.params.get(id).is_none()) {
            self.selected = None;
        }
        let frame = egui::Frame::default().inner_margin(egui::Margin::symmetric(8, 6));
        let (_, dropped) = ui.dnd_drop_zone::<ParameterId, ()>(frame, |ui| {
            ui.set_min_size(ui.available_size());
            match self.selected.and_then(|id| data.params.get(id)) {
                Some(p) => details_ui(ui, p),
                None => {
                    ui.label(
                        RichText::new("Drop a parameter here, or use its Spotlight button.")
                            .weak(),
                    );
                }
            }
        });
        if let Some(id) = dropped {
            self.selected = Some(*id);
        }
    }
}

fn details_ui(ui: &mut Ui, p: &Parameter) {
    ui.heading(&p.display_name);
    ui.add_space(4.0);
    egui::Grid::new(("spotlight_grid", p.id))
        .num_columns(2)
        .striped(true)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            let field = |ui: &mut Ui, name: &str, value: String| {
                ui.label(name);
                ui.label(value);
                ui.end_row();
            };
            field(ui, "PV", p.pv_name.clone());
            field(ui, "Value", p.display_value());
            field(ui, "Kind", p.kind.to_string());
            field(ui, "Units", p.units.clone());
            field(ui, "Precision", p.precision.to_string());
            field(ui, "Writable", p.writable.to_string());
            field(ui, "Connected", p.connected.to_string());
            field(ui, "Updates", p.update_count.to_string());
            field(
                ui,
                "Last update",
                p.last_update.map(format_timestamp).unwrap_or_else(|| "-".into()),
            );
            let plot = match p.plot.as_ref().map(|a| a.mode) {
                None => "none".to_string(),
                Some(PlotUpdateMode::OnUpdate) => "on update".to_string(),
                Some(PlotUpdateMode::Timer { interval }) => {
                    format!("every {} ms", interval.as_millis())
                }
            };
            field(ui, "Plot", plot);
            if let Some(w) = p.image_width {
                field(ui, "Image width", w.to_string());
            }
            match p.history.stats() {
                Some(s) => {
                    field(ui, "Samples", format!("{} / {}", s.count, p.history.capacity()));
                    field(ui, "Min", format!("{:.*}", p.precision, s.min));
                    field(ui, "Max", format!("{:.*}", p.precision, s.max));
                    field(ui, "Mean", format!("{:.*}", p.precision, s.mean));
                }
                None => field(ui, "Samples", "0".into()),
            }
        });
}
