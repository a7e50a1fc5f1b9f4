use std::collections::HashMap;

use eframe::egui;
use egui::{Color32, Id, RichText, Ui};
use egui_dnd::dnd;
use egui_phosphor::regular::{
    CHART_LINE, CIRCLE, DOTS_SIX_VERTICAL, IMAGE, MAGNIFYING_GLASS, PLUS, TRASH,
};
use log::warn;

use super::add_dialog::ConnectForm;
use super::panel_trait::{Panel, PanelData, PanelRequest, PanelState};
use crate::channel::{ChannelClient, PvValue, ValueKind};
use crate::data::parameter::Parameter;
use crate::error::ChannelError;
use crate::monitor::ParameterId;

const CONNECTED: Color32 = Color32::from_rgb(40, 170, 60);
const DISCONNECTED: Color32 = Color32::from_rgb(210, 50, 50);

/// The parameter tree with its add form.
pub struct ParametersPanel {
    pub state: PanelState,
    form: ConnectForm,
    edits: PendingEdits,
}

impl Default for ParametersPanel {
    fn default() -> Self {
        Self {
            state: PanelState::new("Parameters", "🗂"),
            form: ConnectForm::default(),
            edits: PendingEdits::default(),
        }
    }
}

impl Panel for ParametersPanel {
    fn state(&self) -> &PanelState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut PanelState {
        &mut self.state
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut PanelData<'_>) {
        if ui
            .button(format!("{} Add Parameter…", PLUS))
            .on_hover_text("Open the add parameter dialog")
            .clicked()
        {
            data.request(PanelRequest::OpenAddDialog);
        }

        if data.config.features.inline_form {
            self.inline_form_ui(ui, data);
        }
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| self.tree_ui(ui, data));
    }
}

impl ParametersPanel {
    fn inline_form_ui(&mut self, ui: &mut Ui, data: &mut PanelData<'_>) {
        let timeout = data.config.connect_timeout();
        ui.horizontal_wrapped(|ui| {
            self.form.inputs_ui(ui, data.client, timeout);
            if ui.button("Add").clicked() {
                if !self.form.can_confirm() {
                    self.form.validate(data.client, timeout);
                }
                if let Some((name, info)) = self.form.confirm() {
                    if let Err(e) = data.params.add(data.client, &name, info) {
                        warn!("could not add parameter '{}': {}", name, e);
                        data.set_status(format!("Could not add '{}': {}", name, e));
                    }
                }
            }
            self.form.status_ui(ui);
        });
    }

    fn tree_ui(&mut self, ui: &mut Ui, data: &mut PanelData<'_>) {
        if data.params.is_empty() {
            ui.label(RichText::new("No parameters yet.").weak());
            return;
        }

        let drag = data.config.features.drag_and_drop;
        let client = data.client;
        let edits = &mut self.edits;
        let mut actions: Vec<PanelRequest> = Vec::new();
        let mut messages: Vec<String> = Vec::new();

        dnd(ui, Id::new("parameter_tree_dnd")).show_vec(
            data.params.rows_mut(),
            |ui, row, handle, _state| {
                ui.horizontal_top(|ui| {
                    if drag {
                        handle.ui(ui, |ui| {
                            ui.label(DOTS_SIX_VERTICAL);
                        });
                    }
                    ui.vertical(|ui| {
                        row_ui(ui, row, client, edits, drag, &mut actions, &mut messages);
                    });
                });
            },
        );

        for a in actions {
            data.request(a);
        }
        if let Some(last) = messages.pop() {
            data.set_status(last);
        }
    }
}

fn row_ui(
    ui: &mut Ui,
    row: &mut Parameter,
    client: &dyn ChannelClient,
    edits: &mut PendingEdits,
    drag: bool,
    actions: &mut Vec<PanelRequest>,
    messages: &mut Vec<String>,
) {
    let id = Id::new(("parameter_row", row.id));
    let state =
        egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, false);
    state
        .show_header(ui, |ui| {
            let dot = if row.connected { CONNECTED } else { DISCONNECTED };
            ui.label(RichText::new(CIRCLE).color(dot));
            if drag {
                let label = row.display_name.clone();
                ui.dnd_drag_source(id.with("drag"), row.id, |ui| {
                    ui.strong(label);
                })
                .response
                .on_hover_text("Drag onto the views area");
            } else {
                ui.strong(&row.display_name);
            }
            ui.label(row.display_value());
        })
        .body(|ui| {
            egui::Grid::new(id.with("details"))
                .num_columns(2)
                .spacing([10.0, 2.0])
                .show(ui, |ui| {
                    ui.label("PV");
                    ui.monospace(&row.pv_name);
                    ui.end_row();
                    ui.label("Kind");
                    ui.label(row.kind.to_string());
                    ui.end_row();
                    if !row.units.is_empty() {
                        ui.label("Units");
                        ui.label(&row.units);
                        ui.end_row();
                    }
                    ui.label("Writable");
                    ui.label(if row.writable { "yes" } else { "no" });
                    ui.end_row();
                    ui.label("Updates");
                    ui.label(row.update_count.to_string());
                    ui.end_row();
                    if row.writable {
                        ui.label("Set");
                        if let Err(msg) = editor_ui(ui, row, client, edits) {
                            messages.push(msg);
                        }
                        ui.end_row();
                    }
                });

            ui.horizontal(|ui| {
                let plot = egui::Button::new(format!("{} Plot", CHART_LINE));
                if ui.add_enabled(row.is_plottable(), plot).clicked()
                {
                    actions.push(PanelRequest::OpenPlot(row.id));
                }
                if ui
                    .add_enabled(row.is_image(), egui::Button::new(format!("{} Image", IMAGE)))
                    .clicked()
                {
                    actions.push(PanelRequest::OpenImage(row.id));
                }
                if ui.button(format!("{} Spotlight", MAGNIFYING_GLASS)).clicked() {
                    actions.push(PanelRequest::Spotlight(row.id));
                }
                if ui
                    .button(TRASH)
                    .on_hover_text("Remove parameter")
                    .clicked()
                {
                    actions.push(PanelRequest::Remove(row.id));
                }
            });
        });
}

/// Values being edited in the tree, keyed by row. A value is only written to
/// its channel when the edit is committed.
#[derive(Debug, Default)]
pub struct PendingEdits {
    values: HashMap<ParameterId, PvValue>,
}

impl PendingEdits {
    pub fn get(&self, id: ParameterId) -> Option<&PvValue> {
        self.values.get(&id)
    }

    /// Record the latest edited value without writing it.
    pub fn edit(&mut self, id: ParameterId, value: PvValue) {
        self.values.insert(id, value);
    }

    /// Drop the pending edit of `id`.
    pub fn cancel(&mut self, id: ParameterId) {
        self.values.remove(&id);
    }

    /// Write the pending edit of `row`, if it differs from the row's value.
    /// Returns whether a put was issued.
    pub fn commit(
        &mut self,
        row: &mut Parameter,
        client: &dyn ChannelClient,
    ) -> Result<bool, ChannelError> {
        match self.values.remove(&row.id) {
            Some(value) if value != row.value => row.write(client, value).map(|()| true),
            _ => Ok(false),
        }
    }

    /// End the edit of `row`: Escape drops it, anything else commits it.
    pub fn finish(
        &mut self,
        row: &mut Parameter,
        client: &dyn ChannelClient,
        escape: bool,
    ) -> Result<bool, ChannelError> {
        if escape {
            self.cancel(row.id);
            return Ok(false);
        }
        self.commit(row, client)
    }
}

/// Value editor for writable rows. Returns a status message when a write fails.
fn editor_ui(
    ui: &mut Ui,
    row: &mut Parameter,
    client: &dyn ChannelClient,
    edits: &mut PendingEdits,
) -> Result<(), String> {
    let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
    let finished = match row.kind {
        ValueKind::Numeric => {
            let mut v = edits
                .get(row.id)
                .and_then(PvValue::as_f64)
                .or_else(|| row.value.as_f64())
                .unwrap_or(0.0);
            let speed = 10f64.powi(-(row.precision.min(6) as i32));
            let resp = ui.add(
                egui::DragValue::new(&mut v)
                    .speed(speed)
                    .max_decimals(row.precision)
                    .suffix(if row.units.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", row.units)
                    }),
            );
            if resp.changed() {
                let value = match row.value {
                    PvValue::Int(_) => PvValue::Int(v.round() as i64),
                    _ => PvValue::Float(v),
                };
                edits.edit(row.id, value);
            }
            resp.drag_stopped() || resp.lost_focus()
        }
        ValueKind::Text => {
            let mut text = match edits.get(row.id) {
                Some(PvValue::Text(t)) => t.clone(),
                _ => row.value.display(row.precision),
            };
            let resp = ui.text_edit_singleline(&mut text);
            if resp.changed() {
                edits.edit(row.id, PvValue::Text(text));
            }
            resp.lost_focus()
        }
        ValueKind::Array | ValueKind::Unsupported => {
            ui.label(RichText::new("not editable").weak());
            false
        }
    };

    if !finished {
        return Ok(());
    }
    edits.finish(row, client, escape).map(|_| ()).map_err(|e| {
        warn!("write to '{}' failed: {}", row.pv_name, e);
        format!("Write to '{}' failed: {}", row.display_name, e)
    })
}
