//! Application configuration, loaded from YAML.
//!
//! Every field has a default, so a config file only needs to list what it
//! changes. The default location is `$HOME/.pvlive/config.yaml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::{PvValue, SimChannel, SimClient, SimSignal, DEFAULT_PRECISION};
use crate::data::history::DEFAULT_HISTORY_CAPACITY;
use crate::data::parameter::PlotUpdateMode;
use crate::error::ConfigError;

// ─────────────────────────────────────────────────────────────────────────────
// Plot settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateModeConfig {
    /// Sample the current value on a fixed tick.
    Timer,
    /// Sample on every channel update.
    OnUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Visible time span of line plots, in seconds.
    pub time_window_secs: f64,
    /// History capacity per parameter.
    pub max_points: usize,
    pub update: UpdateModeConfig,
    /// Timer tick and UI repaint interval, in milliseconds.
    pub tick_ms: u64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            time_window_secs: 10.0,
            max_points: DEFAULT_HISTORY_CAPACITY,
            update: UpdateModeConfig::Timer,
            tick_ms: 50,
        }
    }
}

impl PlotConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn update_mode(&self) -> PlotUpdateMode {
        match self.update {
            UpdateModeConfig::Timer => PlotUpdateMode::Timer {
                interval: self.tick_interval(),
            },
            UpdateModeConfig::OnUpdate => PlotUpdateMode::OnUpdate,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameters registered at startup
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub pv: String,
    /// Open a line plot right away.
    #[serde(default)]
    pub plot: bool,
    /// Row width for image channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<usize>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, pv: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pv: pv.into(),
            plot: false,
            image_width: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extra simulated channels
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialValue {
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<f64>),
}

impl From<InitialValue> for PvValue {
    fn from(v: InitialValue) -> Self {
        match v {
            InitialValue::Int(v) => PvValue::Int(v),
            InitialValue::Float(v) => PvValue::Float(v),
            InitialValue::Text(v) => PvValue::Text(v),
            InitialValue::Array(v) => PvValue::Array(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimSignalSpec {
    Sine {
        amplitude: f64,
        period_secs: f64,
        #[serde(default)]
        offset: f64,
    },
    Ramp {
        min: f64,
        max: f64,
        rate: f64,
    },
    Counter {
        step: i64,
    },
    Spot {
        width: usize,
        height: usize,
        period_secs: f64,
    },
}

impl From<SimSignalSpec> for SimSignal {
    fn from(s: SimSignalSpec) -> Self {
        match s {
            SimSignalSpec::Sine {
                amplitude,
                period_secs,
                offset,
            } => SimSignal::Sine {
                amplitude,
                period_secs,
                offset,
            },
            SimSignalSpec::Ramp { min, max, rate } => SimSignal::Ramp { min, max, rate },
            SimSignalSpec::Counter { step } => SimSignal::Counter { step },
            SimSignalSpec::Spot {
                width,
                height,
                period_secs,
            } => SimSignal::Spot {
                width,
                height,
                period_secs,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimChannelSpec {
    pub pv: String,
    #[serde(default)]
    pub value: Option<InitialValue>,
    #[serde(default)]
    pub signal: Option<SimSignalSpec>,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub precision: Option<usize>,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub period_ms: Option<u64>,
}

impl SimChannelSpec {
    pub fn to_channel(&self) -> SimChannel {
        let mut ch = match &self.signal {
            Some(sig) => SimChannel::signal(sig.clone().into()),
            None => SimChannel::constant(PvValue::Float(0.0)),
        };
        if let Some(v) = &self.value {
            ch.value = v.clone().into();
        }
        ch = ch
            .units(self.units.clone())
            .precision(self.precision.unwrap_or(DEFAULT_PRECISION))
            .writable(self.writable);
        if let Some(ms) = self.period_ms {
            ch = ch.period(Duration::from_millis(ms.max(1)));
        }
        ch
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feature flags
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle optional UI features. All default to enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Show the inline name/PV form above the tree.
    pub inline_form: bool,
    /// Show the spotlight tab in the views dock.
    pub spotlight: bool,
    /// Allow dragging rows to reorder them and onto the views dock.
    pub drag_and_drop: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            inline_form: true,
            spotlight: true,
            drag_and_drop: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Native window title.
    pub title: String,
    /// Initial inner window size in points.
    pub window_size: [f32; 2],
    pub connect_timeout_ms: u64,
    pub plot: PlotConfig,
    pub features: FeatureFlags,
    /// Parameters registered at startup.
    pub parameters: Vec<ParameterSpec>,
    /// Channels added to the simulated control system.
    pub sim_channels: Vec<SimChannelSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "6-ID-B Live".to_string(),
            window_size: [1024.0, 768.0],
            connect_timeout_ms: 1000,
            plot: PlotConfig::default(),
            features: FeatureFlags::default(),
            parameters: vec![
                ParameterSpec::new("Delta", "6idb1:m18.RBV"),
                ParameterSpec::new("Eta", "6idb1:m17.RBV"),
            ],
            sim_channels: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn from_yaml(s: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_yaml(&s)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// `$HOME/.pvlive/config.yaml`, if `HOME` is set.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(PathBuf::from(home).join(".pvlive").join("config.yaml"))
    }

    /// Load the default config file. `Ok(None)` when there is none.
    pub fn load_from_default_path() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plot.tick_ms == 0 {
            return Err(ConfigError::Invalid("plot.tick_ms must be > 0".into()));
        }
        if self.plot.max_points == 0 {
            return Err(ConfigError::Invalid("plot.max_points must be > 0".into()));
        }
        if !(self.plot.time_window_secs > 0.0) {
            return Err(ConfigError::Invalid(
                "plot.time_window_secs must be > 0".into(),
            ));
        }
        if let Some(p) = self.parameters.iter().find(|p| p.pv.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "parameter '{}' has an empty PV name",
                p.name
            )));
        }
        Ok(())
    }

    /// The beamline simulator plus any channels declared in this config.
    pub fn build_sim_client(&self) -> SimClient {
        let client = SimClient::beamline();
        for spec in &self.sim_channels {
            client.insert(spec.pv.clone(), spec.to_channel());
        }
        client
    }
}
