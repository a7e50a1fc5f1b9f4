//! One monitored channel as shown in the parameter tree.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::channel::{ChannelClient, ChannelInfo, PvValue, ValueKind};
use crate::data::history::History;
use crate::error::ChannelError;
use crate::monitor::ParameterId;

/// When an attached line plot records a new sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotUpdateMode {
    /// Record the current value once per elapsed interval.
    Timer { interval: Duration },
    /// Record once per accepted channel update.
    OnUpdate,
}

impl Default for PlotUpdateMode {
    fn default() -> Self {
        PlotUpdateMode::Timer {
            interval: Duration::from_millis(50),
        }
    }
}

/// Marker that a line plot view is bound to the parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotAttachment {
    pub mode: PlotUpdateMode,
    last_tick: Option<f64>,
}

impl PlotAttachment {
    pub fn new(mode: PlotUpdateMode) -> Self {
        Self {
            mode,
            last_tick: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub id: ParameterId,
    pub display_name: String,
    pub pv_name: String,
    pub value: PvValue,
    pub kind: ValueKind,
    pub units: String,
    pub precision: usize,
    pub writable: bool,
    pub connected: bool,
    /// Timestamp (seconds since the epoch) of the last accepted value.
    pub last_update: Option<f64>,
    pub update_count: u64,
    pub history: History,
    pub plot: Option<PlotAttachment>,
    /// Row width used to reshape array values into images.
    pub image_width: Option<usize>,
}

// Rows are identified by id alone (used by drag-and-drop reordering).
impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Parameter {
    /// Build a row from a freshly resolved channel. An empty display name
    /// falls back to the PV name.
    pub fn from_info(
        id: ParameterId,
        display_name: &str,
        info: ChannelInfo,
        history_capacity: usize,
    ) -> Self {
        let display_name = match display_name.trim() {
            "" => info.pv_name.clone(),
            name => name.to_string(),
        };
        Self {
            id,
            display_name,
            kind: info.value.kind(),
            pv_name: info.pv_name,
            value: info.value,
            units: info.units,
            precision: info.precision,
            writable: info.write_access,
            connected: true,
            last_update: None,
            update_count: 0,
            history: History::new(history_capacity),
            plot: None,
            image_width: None,
        }
    }

    pub fn display_value(&self) -> String {
        self.value.display_with_units(self.precision, &self.units)
    }

    /// Axis label: `name (units)`, or just the name when unitless.
    pub fn axis_label(&self) -> String {
        if self.units.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} ({})", self.display_name, self.units)
        }
    }

    pub fn is_plottable(&self) -> bool {
        self.kind == ValueKind::Numeric
    }

    pub fn is_image(&self) -> bool {
        self.kind == ValueKind::Array
    }

    pub fn is_plot_attached(&self) -> bool {
        self.plot.is_some()
    }

    /// Apply a monitor value. Returns `false` (and leaves the row untouched)
    /// when the value kind is unsupported or differs from the row's kind.
    ///
    /// `rel_t` is the sample time relative to the collection start.
    pub fn apply_value(&mut self, value: PvValue, timestamp: f64, rel_t: f64) -> bool {
        let kind = value.kind();
        if kind == ValueKind::Unsupported || kind != self.kind {
            return false;
        }
        self.value = value;
        self.last_update = Some(timestamp);
        self.update_count += 1;
        if let Some(PlotAttachment {
            mode: PlotUpdateMode::OnUpdate,
            ..
        }) = self.plot
        {
            if let Some(y) = self.value.as_f64() {
                self.history.push(rel_t, y);
            }
        }
        true
    }

    /// Timer-driven sampling. Returns `true` if a sample was recorded.
    pub fn tick(&mut self, rel_now: f64) -> bool {
        let Some(y) = self.value.as_f64() else {
            return false;
        };
        let Some(att) = self.plot.as_mut() else {
            return false;
        };
        let PlotUpdateMode::Timer { interval } = att.mode else {
            return false;
        };
        let due = match att.last_tick {
            None => true,
            // Small slack so a tick scheduled exactly one interval later counts.
            Some(last) => rel_now - last >= interval.as_secs_f64() - 1e-9,
        };
        if due {
            att.last_tick = Some(rel_now);
            self.history.push(rel_now, y);
        }
        due
    }

    /// Write `value` to the row's channel. On success the row shows the new
    /// value (in its own numeric type) until the monitor reports back.
    pub fn write(
        &mut self,
        client: &dyn ChannelClient,
        value: PvValue,
    ) -> Result<(), ChannelError> {
        if !self.writable {
            return Err(ChannelError::ReadOnly(self.pv_name.clone()));
        }
        client.put(&self.pv_name, value.clone())?;
        self.value = match (&self.value, value) {
            (PvValue::Int(_), PvValue::Float(v)) => PvValue::Int(v.round() as i64),
            (PvValue::Float(_), PvValue::Int(v)) => PvValue::Float(v as f64),
            (_, v) => v,
        };
        Ok(())
    }
}
