//! Main application module for pvlive.
//!
//! | Sub-module   | Responsibility |
//! | ------------ | -------------- |
//! | [`update`]   | Per-frame monitor ingestion, menu/status bars and the [`eframe::App`] impl |
//! | [`dock`]     | `egui_tiles` layout: parameter tree on the left, view tabs on the right |
//! | [`run`]      | Top-level [`run_app()`] entry point and icon loading |
//!
//! [`MainApp`] itself holds no egui state beyond the tile tree, so everything
//! that does not draw (adding, opening views, drops, sessions) can be driven
//! without a window.

mod dock;
mod run;
mod update;

pub use run::run_app;

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::channel::{ChannelClient, ChannelInfo};
use crate::config::AppConfig;
use crate::data::image;
use crate::data::parameters::ParameterCollection;
use crate::error::{ChannelError, ConfigError};
use crate::monitor::ParameterId;
use crate::panels::add_dialog::AddParameterDialog;
use crate::panels::image_ui::ImagePanel;
use crate::panels::line_plot_ui::LinePlotPanel;
use crate::panels::panel_trait::{Panel, PanelData, PanelRequest};
use crate::panels::parameter_ui::ParametersPanel;
use crate::panels::spotlight_ui::SpotlightPanel;
use crate::persistence;

pub struct MainApp {
    pub params: ParameterCollection,
    pub config: AppConfig,
    client: Arc<dyn ChannelClient>,
    parameters_panel: ParametersPanel,
    /// Tabs of the views dock, in tab order.
    views: Vec<Box<dyn Panel>>,
    active_view: usize,
    dialog: AddParameterDialog,
    requests: Vec<PanelRequest>,
    status: Option<String>,
    tree: egui_tiles::Tree<dock::Pane>,
}

impl MainApp {
    pub fn new(config: AppConfig, client: Arc<dyn ChannelClient>) -> Self {
        let mut views: Vec<Box<dyn Panel>> = Vec::new();
        if config.features.spotlight {
            views.push(Box::new(SpotlightPanel::default()));
        }
        Self {
            params: ParameterCollection::new(config.plot.max_points),
            client,
            parameters_panel: ParametersPanel::default(),
            views,
            active_view: 0,
            dialog: AddParameterDialog::default(),
            requests: Vec::new(),
            status: None,
            tree: dock::build_tree(),
            config,
        }
    }

    pub fn client(&self) -> &dyn ChannelClient {
        &*self.client
    }

    /// Register the parameters listed in the config. Entries that fail to
    /// connect are skipped with a warning.
    pub fn add_initial_parameters(&mut self) {
        let timeout = self.config.connect_timeout();
        let specs = self.config.parameters.clone();
        for spec in specs {
            match self
                .params
                .add_by_name(&*self.client, &spec.name, &spec.pv, timeout)
            {
                Ok(id) => {
                    if let Some(p) = self.params.get_mut(id) {
                        p.image_width = spec.image_width;
                    }
                    if spec.plot {
                        self.open_plot(id);
                    }
                }
                Err(e) => warn!("skipping initial parameter '{}': {}", spec.name, e),
            }
        }
    }

    /// Add one row for an already resolved channel.
    pub fn add_parameter(
        &mut self,
        display_name: &str,
        info: ChannelInfo,
    ) -> Result<ParameterId, ChannelError> {
        self.params.add(&*self.client, display_name, info)
    }

    pub fn views(&self) -> &[Box<dyn Panel>] {
        &self.views
    }

    pub fn active_view(&self) -> Option<&dyn Panel> {
        self.views.get(self.active_view).map(|v| v.as_ref())
    }

    fn focus_view(&mut self, index: usize) {
        if let Some(v) = self.views.get_mut(index) {
            v.state_mut().request_focus = true;
            self.active_view = index;
        }
    }

    fn find_view<T: Panel>(&self, id: ParameterId) -> Option<usize> {
        self.views
            .iter()
            .position(|v| v.downcast_ref::<T>().is_some() && v.parameter() == Some(id))
    }

    /// Show the line plot of a numeric parameter. An existing plot tab is
    /// focused instead of opening a second one. Returns `false` if the
    /// parameter cannot be plotted.
    pub fn open_plot(&mut self, id: ParameterId) -> bool {
        if let Some(i) = self.find_view::<LinePlotPanel>(id) {
            self.focus_view(i);
            return true;
        }
        if !self.params.attach_plot(id, self.config.plot.update_mode()) {
            return false;
        }
        self.views.push(Box::new(LinePlotPanel::new(
            id,
            self.config.plot.time_window_secs,
        )));
        self.focus_view(self.views.len() - 1);
        true
    }

    /// Show the image view of an array parameter.
    pub fn open_image(&mut self, id: ParameterId) -> bool {
        if let Some(i) = self.find_view::<ImagePanel>(id) {
            self.focus_view(i);
            return true;
        }
        let timeout = self.config.connect_timeout();
        let client = &*self.client;
        let Some(p) = self.params.get_mut(id) else {
            return false;
        };
        if !p.is_image() {
            return false;
        }
        if p.image_width.is_none() {
            p.image_width = image::resolve_width(client, &p.pv_name, timeout);
        }
        self.views.push(Box::new(ImagePanel::new(id)));
        self.focus_view(self.views.len() - 1);
        true
    }

    /// Point the spotlight at `id`, opening the spotlight tab if needed.
    pub fn spotlight(&mut self, id: ParameterId) {
        if self.params.get(id).is_none() {
            return;
        }
        let index = match self
            .views
            .iter()
            .position(|v| v.downcast_ref::<SpotlightPanel>().is_some())
        {
            Some(i) => i,
            None => {
                self.views.push(Box::new(SpotlightPanel::default()));
                self.views.len() - 1
            }
        };
        if let Some(s) = self.views[index].downcast_mut::<SpotlightPanel>() {
            s.selected = Some(id);
        }
        self.focus_view(index);
    }

    /// A row dropped onto the views area: numeric rows open their plot, array
    /// rows their image, anything else goes to the spotlight.
    pub fn handle_drop(&mut self, id: ParameterId) {
        let Some(p) = self.params.get(id) else {
            return;
        };
        if p.is_plottable() {
            self.open_plot(id);
        } else if p.is_image() {
            self.open_image(id);
        } else {
            self.spotlight(id);
        }
    }

    /// Close the view tab at `index`, letting it release its parameter.
    pub fn close_view(&mut self, index: usize) {
        if index >= self.views.len() {
            return;
        }
        let mut view = self.views.remove(index);
        let mut data = PanelData {
            params: &mut self.params,
            client: &*self.client,
            config: &self.config,
            requests: &mut self.requests,
            status: &mut self.status,
        };
        view.on_close(&mut data);
        if self.active_view >= index && self.active_view > 0 {
            self.active_view -= 1;
        }
    }

    /// Remove a parameter along with every view bound to it.
    pub fn remove_parameter(&mut self, id: ParameterId) {
        while let Some(i) = self.views.iter().position(|v| {
            v.parameter() == Some(id) && v.downcast_ref::<SpotlightPanel>().is_none()
        }) {
            self.close_view(i);
        }
        for v in self.views.iter_mut() {
            if let Some(s) = v.downcast_mut::<SpotlightPanel>() {
                if s.selected == Some(id) {
                    s.selected = None;
                }
            }
        }
        self.params.remove(id);
    }

    /// Apply everything panels asked for during the last frame.
    pub fn process_requests(&mut self) {
        for r in std::mem::take(&mut self.requests) {
            match r {
                PanelRequest::OpenAddDialog => self.dialog.open(),
                PanelRequest::OpenPlot(id) => {
                    self.open_plot(id);
                }
                PanelRequest::OpenImage(id) => {
                    self.open_image(id);
                }
                PanelRequest::Spotlight(id) => self.spotlight(id),
                PanelRequest::Remove(id) => self.remove_parameter(id),
                PanelRequest::Dropped(id) => self.handle_drop(id),
            }
        }
    }

    pub fn request(&mut self, r: PanelRequest) {
        self.requests.push(r);
    }

    /// Drain monitor events and record due timer samples.
    pub fn update_data(&mut self, now: f64) {
        self.params.ingest();
        self.params.tick(now);
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn save_session(&self, path: &Path) -> Result<(), ConfigError> {
        let session = persistence::capture_session(&self.params);
        persistence::save_session_to_path(&session, path)?;
        info!("saved session to {}", path.display());
        Ok(())
    }

    /// Add every parameter of a session file, opening plots that were open.
    pub fn load_session(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let session = persistence::load_session_from_path(path)?;
        let added = persistence::restore_session(
            &session,
            &mut self.params,
            &*self.client,
            self.config.connect_timeout(),
        );
        for &(id, plot) in &added {
            if plot {
                self.open_plot(id);
            }
        }
        info!(
            "loaded {} of {} parameters from {}",
            added.len(),
            session.parameters.len(),
            path.display()
        );
        Ok(added.len())
    }
}
