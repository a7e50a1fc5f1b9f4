//! Per-frame update logic for [`MainApp`].
//!
//! Each frame drains pending monitor events, records due timer samples, draws
//! the menu bar, status bar, dock and dialog, then applies the requests panels
//! made while drawing. A repaint is scheduled one tick later so plots keep
//! moving without input.

use eframe::egui;
use egui::{RichText, Ui};
use egui_phosphor::regular::{FLOPPY_DISK, FOLDER_OPEN, PLUS};
use log::warn;

use crate::monitor::now_secs;
use crate::panels::panel_trait::PanelRequest;

use super::MainApp;

impl MainApp {
    fn menu_ui(&mut self, ui: &mut Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button(format!("{} Save Session…", FLOPPY_DISK)).clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_file_name("session.json")
                        .add_filter("JSON", &["json"])
                        .save_file()
                    {
                        if let Err(e) = self.save_session(&path) {
                            warn!("saving session failed: {}", e);
                            self.status = Some(format!("Saving session failed: {}", e));
                        }
                    }
                    ui.close();
                }
                if ui.button(format!("{} Load Session…", FOLDER_OPEN)).clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("JSON", &["json"])
                        .pick_file()
                    {
                        match self.load_session(&path) {
                            Ok(n) => self.status = Some(format!("Loaded {} parameters", n)),
                            Err(e) => {
                                warn!("loading session failed: {}", e);
                                self.status = Some(format!("Loading session failed: {}", e));
                            }
                        }
                    }
                    ui.close();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("Parameters", |ui| {
                if ui.button(format!("{} Add Parameter…", PLUS)).clicked() {
                    self.request(PanelRequest::OpenAddDialog);
                    ui.close();
                }
            });
        });
    }

    fn status_ui(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let connected = self.params.iter().filter(|p| p.connected).count();
            ui.label(format!(
                "{} parameters, {} connected",
                self.params.len(),
                connected
            ));
            if let Some(msg) = self.status.clone() {
                ui.separator();
                ui.label(RichText::new(msg).color(ui.visuals().warn_fg_color));
                if ui.small_button("×").on_hover_text("Dismiss").clicked() {
                    self.status = None;
                }
            }
        });
    }
}

impl eframe::App for MainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_data(now_secs());

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_ui(ui));
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_ui(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.dock_ui(ui));

        let timeout = self.config.connect_timeout();
        if let Some((name, info)) = self.dialog.show(ctx, &*self.client, timeout) {
            if let Err(e) = self.add_parameter(&name, info) {
                warn!("could not add parameter '{}': {}", name, e);
                self.status = Some(format!("Could not add '{}': {}", name, e));
            }
        }

        self.process_requests();
        ctx.request_repaint_after(self.config.plot.tick_interval());
    }
}
