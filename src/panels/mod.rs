pub mod add_dialog;
pub mod image_ui;
pub mod line_plot_ui;
pub mod panel_trait;
pub mod parameter_ui;
pub mod spotlight_ui;

pub use add_dialog::{AddParameterDialog, ConnectForm, DialogStatus};
pub use image_ui::ImagePanel;
pub use line_plot_ui::LinePlotPanel;
pub use panel_trait::{Panel, PanelData, PanelRequest, PanelState};
pub use parameter_ui::{ParametersPanel, PendingEdits};
pub use spotlight_ui::SpotlightPanel;
