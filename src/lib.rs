//! pvlive crate root: re-exports and module wiring.
//!
//! A desktop monitor for beamline process variables (PVs):
//! - `channel`: the [`ChannelClient`] seam and the simulated control system
//! - `monitor`: events carrying channel updates to the UI thread
//! - `data`: parameter rows, history, images and CSV export
//! - `panels`: the parameter tree, add dialog and the views (plot, image, spotlight)
//! - `app`: main window, dock layout and [`run_app`]
//! - `config` / `persistence`: YAML config and JSON sessions

pub mod app;
pub mod channel;
pub mod config;
pub mod data;
pub mod error;
pub mod monitor;
pub mod panels;
pub mod persistence;

// Public re-exports for a compact external API
pub use app::{run_app, MainApp};
pub use channel::{ChannelClient, ChannelInfo, PvValue, SimClient, Subscription, ValueKind};
pub use config::AppConfig;
pub use data::parameter::{Parameter, PlotUpdateMode};
pub use data::parameters::ParameterCollection;
pub use error::{ChannelError, ConfigError};
pub use monitor::{channel_monitor, MonitorEvent, MonitorSink, ParameterId};
