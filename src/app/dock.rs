//! `egui_tiles` layout of the main window.
//!
//! Two resizable panes side by side: the parameter tree and the views dock.
//! The views dock draws its own tab strip over [`MainApp::views`](super::MainApp)
//! and accepts parameter rows dropped onto it.

use eframe::egui;
use egui::{RichText, Ui};
use egui_tiles::{Behavior, Container, Linear, LinearDir, TileId, Tiles, Tree, UiResponse};

use crate::monitor::ParameterId;
use crate::panels::panel_trait::{Panel, PanelData, PanelRequest};
use crate::panels::parameter_ui::ParametersPanel;

use super::MainApp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pane {
    Parameters,
    Views,
}

pub fn build_tree() -> Tree<Pane> {
    let mut tiles: Tiles<Pane> = Tiles::default();
    let left = tiles.insert_pane(Pane::Parameters);
    let right = tiles.insert_pane(Pane::Views);
    let mut linear = Linear::new(LinearDir::Horizontal, vec![left, right]);
    linear.shares.set_share(left, 1.0);
    linear.shares.set_share(right, 2.0);
    let root = tiles.insert_container(Container::Linear(linear));
    Tree::new("pvlive_dock", root, tiles)
}

struct DockBehavior<'a> {
    parameters: &'a mut ParametersPanel,
    views: &'a mut Vec<Box<dyn Panel>>,
    active: &'a mut usize,
    data: PanelData<'a>,
    close: Option<usize>,
}

impl<'a> DockBehavior<'a> {
    fn views_ui(&mut self, ui: &mut Ui) {
        if let Some(i) = self.views.iter().position(|v| v.state().request_focus) {
            *self.active = i;
        }
        for v in self.views.iter_mut() {
            v.state_mut().request_focus = false;
        }
        if *self.active >= self.views.len() {
            *self.active = self.views.len().saturating_sub(1);
        }

        ui.horizontal_wrapped(|ui| {
            for (i, v) in self.views.iter().enumerate() {
                let title = v.title(&*self.data.params);
                if ui.selectable_label(i == *self.active, title).clicked() {
                    *self.active = i;
                }
                if ui.small_button("×").on_hover_text("Close").clicked() {
                    self.close = Some(i);
                }
                ui.separator();
            }
        });
        ui.separator();

        let frame = egui::Frame::default().inner_margin(egui::Margin::symmetric(4, 4));
        let views = &mut *self.views;
        let active = *self.active;
        let data = &mut self.data;
        let (_, dropped) = ui.dnd_drop_zone::<ParameterId, ()>(frame, |ui| {
            ui.set_min_size(ui.available_size());
            match views.get_mut(active) {
                Some(view) => view.render_panel(ui, data),
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            RichText::new("Drag a parameter here to plot it.").weak(),
                        );
                    });
                }
            }
        });
        if let Some(id) = dropped {
            self.data.request(PanelRequest::Dropped(*id));
        }
    }
}

impl<'a> Behavior<Pane> for DockBehavior<'a> {
    fn tab_title_for_pane(&mut self, pane: &Pane) -> egui::WidgetText {
        match pane {
            Pane::Parameters => "Parameters".into(),
            Pane::Views => "Views".into(),
        }
    }

    fn pane_ui(&mut self, ui: &mut Ui, _tile_id: TileId, pane: &mut Pane) -> UiResponse {
        egui::Frame::default()
            .inner_margin(egui::Margin::symmetric(8, 6))
            .show(ui, |ui| {
                ui.set_min_size(ui.available_size());
                match pane {
                    Pane::Parameters => self.parameters.render_panel(ui, &mut self.data),
                    Pane::Views => self.views_ui(ui),
                }
            });
        UiResponse::None
    }
}

impl MainApp {
    pub(super) fn dock_ui(&mut self, ui: &mut Ui) {
        let mut behavior = DockBehavior {
            parameters: &mut self.parameters_panel,
            views: &mut self.views,
            active: &mut self.active_view,
            data: PanelData {
                params: &mut self.params,
                client: &*self.client,
                config: &self.config,
                requests: &mut self.requests,
                status: &mut self.status,
            },
            close: None,
        };
        self.tree.ui(&mut behavior, ui);
        let close = behavior.close;
        if let Some(i) = close {
            self.close_view(i);
        }
    }
}
