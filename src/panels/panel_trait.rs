use downcast_rs::{impl_downcast, Downcast};
use egui::Ui;

use crate::channel::ChannelClient;
use crate::config::AppConfig;
use crate::data::parameters::ParameterCollection;
use crate::monitor::ParameterId;

#[derive(Debug, Clone)]
pub struct PanelState {
    pub name: &'static str,
    pub icon: &'static str,
    /// Ask the dock to bring this panel's tab to the front.
    pub request_focus: bool,
}

impl PanelState {
    pub fn new(name: &'static str, icon: &'static str) -> Self {
        Self {
            name,
            icon,
            request_focus: false,
        }
    }
}

/// Things a panel asks the application to do after the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRequest {
    OpenAddDialog,
    OpenPlot(ParameterId),
    OpenImage(ParameterId),
    Spotlight(ParameterId),
    Remove(ParameterId),
    /// A row was dropped onto the views area.
    Dropped(ParameterId),
}

/// Everything a panel may read or change while it renders.
pub struct PanelData<'a> {
    pub params: &'a mut ParameterCollection,
    pub client: &'a dyn ChannelClient,
    pub config: &'a AppConfig,
    pub requests: &'a mut Vec<PanelRequest>,
    /// One-line message shown in the bottom status bar.
    pub status: &'a mut Option<String>,
}

impl<'a> PanelData<'a> {
    pub fn request(&mut self, r: PanelRequest) {
        if !self.requests.contains(&r) {
            self.requests.push(r);
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        *self.status = Some(msg.into());
    }
}

pub trait Panel: Downcast {
    fn state(&self) -> &PanelState;
    fn state_mut(&mut self) -> &mut PanelState;

    /// Tab title. Views bound to a parameter include its display name.
    fn title(&self, params: &ParameterCollection) -> String {
        let _ = params;
        format!("{} {}", self.state().icon, self.state().name)
    }

    /// The parameter this panel is bound to, if any.
    fn parameter(&self) -> Option<ParameterId> {
        None
    }

    fn render_panel(&mut self, ui: &mut Ui, data: &mut PanelData<'_>);

    /// Called once when the panel's tab is closed.
    fn on_close(&mut self, _data: &mut PanelData<'_>) {}
}
impl_downcast!(Panel);
