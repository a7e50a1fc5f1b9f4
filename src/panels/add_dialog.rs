//! The "Add Parameter" form and its modal dialog.
//!
//! A parameter can only be added once its PV name has resolved. The form keeps
//! that gate: validation runs when PV name editing finishes, and confirming is
//! only possible while the last validation succeeded for the current name.

use std::time::Duration;

use eframe::egui;
use egui::{Color32, Id, RichText, Ui};
use log::{info, warn};

use crate::channel::{ChannelClient, ChannelInfo};

pub const NAME_PLACEHOLDER: &str = "Delta";
pub const PV_PLACEHOLDER: &str = "XXX:XX.XXX";

#[derive(Debug, Clone, PartialEq)]
pub enum DialogStatus {
    /// The PV name has not been checked since it last changed.
    Unchecked,
    Connected(ChannelInfo),
    /// Carries the reason shown on hover.
    NotConnected(String),
}

/// Display name and PV name inputs with the connect gate.
#[derive(Debug, Clone)]
pub struct ConnectForm {
    pub display_name: String,
    pv_name: String,
    status: DialogStatus,
}

impl Default for ConnectForm {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            pv_name: String::new(),
            status: DialogStatus::Unchecked,
        }
    }
}

impl ConnectForm {
    pub fn pv_name(&self) -> &str {
        &self.pv_name
    }

    pub fn status(&self) -> &DialogStatus {
        &self.status
    }

    /// Replace the PV name. Any previous validation result is discarded.
    pub fn set_pv_name(&mut self, pv_name: impl Into<String>) {
        let pv_name = pv_name.into();
        if pv_name != self.pv_name {
            self.pv_name = pv_name;
            self.status = DialogStatus::Unchecked;
        }
    }

    /// Try to resolve the current PV name.
    pub fn validate(&mut self, client: &dyn ChannelClient, timeout: Duration) -> &DialogStatus {
        let pv = self.pv_name.trim();
        self.status = if pv.is_empty() {
            DialogStatus::NotConnected("no PV name given".to_string())
        } else {
            match client.connect(pv, timeout) {
                Ok(info) => {
                    info!("'{}' resolved", info.pv_name);
                    DialogStatus::Connected(info)
                }
                Err(e) => {
                    warn!("'{}' did not resolve: {}", pv, e);
                    DialogStatus::NotConnected(e.to_string())
                }
            }
        };
        &self.status
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self.status, DialogStatus::Connected(_))
    }

    /// Take the validated `(display name, channel)` and reset the form.
    /// Returns `None` unless the current PV name resolved.
    pub fn confirm(&mut self) -> Option<(String, ChannelInfo)> {
        let status = std::mem::replace(&mut self.status, DialogStatus::Unchecked);
        let DialogStatus::Connected(info) = status else {
            return None;
        };
        let name = std::mem::take(&mut self.display_name);
        self.pv_name.clear();
        Some((name, info))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Name and PV inputs. Validation runs when the PV field loses focus
    /// (which includes pressing Enter).
    pub fn inputs_ui(&mut self, ui: &mut Ui, client: &dyn ChannelClient, timeout: Duration) {
        ui.add(
            egui::TextEdit::singleline(&mut self.display_name)
                .hint_text(NAME_PLACEHOLDER)
                .desired_width(160.0),
        );
        let mut pv = self.pv_name.clone();
        let resp = ui.add(
            egui::TextEdit::singleline(&mut pv)
                .hint_text(PV_PLACEHOLDER)
                .desired_width(200.0),
        );
        if resp.changed() {
            self.set_pv_name(pv);
        }
        if resp.lost_focus() && self.status == DialogStatus::Unchecked && !self.pv_name.is_empty() {
            self.validate(client, timeout);
        }
    }

    pub fn status_ui(&self, ui: &mut Ui) {
        match &self.status {
            DialogStatus::Unchecked => {
                ui.label(RichText::new("Not checked").weak());
            }
            DialogStatus::Connected(_) => {
                ui.label(RichText::new("Connected").color(Color32::from_rgb(40, 170, 60)));
            }
            DialogStatus::NotConnected(reason) => {
                ui.label(RichText::new("Not Connected").color(Color32::from_rgb(210, 50, 50)))
                    .on_hover_text(reason);
            }
        }
    }
}

/// Modal wrapper around [`ConnectForm`].
#[derive(Debug, Default)]
pub struct AddParameterDialog {
    pub form: ConnectForm,
    open: bool,
}

impl AddParameterDialog {
    pub fn open(&mut self) {
        self.form.clear();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cancel(&mut self) {
        self.form.clear();
        self.open = false;
    }

    /// Confirm and close. `None` (and the dialog stays open) unless connected.
    pub fn confirm(&mut self) -> Option<(String, ChannelInfo)> {
        let out = self.form.confirm()?;
        self.open = false;
        Some(out)
    }

    /// Render the dialog if open. Returns the confirmed parameter, if any.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        client: &dyn ChannelClient,
        timeout: Duration,
    ) -> Option<(String, ChannelInfo)> {
        if !self.open {
            return None;
        }
        let mut confirmed = None;
        let mut cancelled = false;
        let modal = egui::Modal::new(Id::new("add_parameter_dialog")).show(ctx, |ui| {
            ui.set_width(380.0);
            ui.heading("Add Parameter");
            ui.add_space(6.0);
            egui::Grid::new("add_parameter_grid")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Name:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.form.display_name)
                            .hint_text(NAME_PLACEHOLDER),
                    );
                    ui.end_row();

                    ui.label("PV:");
                    let mut pv = self.form.pv_name.clone();
                    let resp =
                        ui.add(egui::TextEdit::singleline(&mut pv).hint_text(PV_PLACEHOLDER));
                    if resp.changed() {
                        self.form.set_pv_name(pv);
                    }
                    if resp.lost_focus() && self.form.status == DialogStatus::Unchecked {
                        self.form.validate(client, timeout);
                    }
                    ui.end_row();

                    ui.label("Status:");
                    self.form.status_ui(ui);
                    ui.end_row();
                });
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
                let ok = ui.add_enabled(self.form.can_confirm(), egui::Button::new("OK"));
                if ok.clicked() {
                    confirmed = self.confirm();
                }
            });
        });
        if cancelled || (confirmed.is_none() && modal.should_close()) {
            self.cancel();
        }
        confirmed
    }
}
