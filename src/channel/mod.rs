//! Control-system client seam.
//!
//! The GUI only needs four things from a control-system runtime: resolve a
//! channel by name, read its current value/units/write access, subscribe to
//! value changes, and write a new value. [`ChannelClient`] captures exactly
//! that. [`sim::SimClient`] is the bundled backend.

pub mod sim;

use std::fmt;
use std::time::Duration;

use crate::error::ChannelError;
use crate::monitor::{MonitorSink, ParameterId};

pub use sim::{SimChannel, SimClient, SimSignal};

/// Default number of decimals used when a channel does not report a precision.
pub const DEFAULT_PRECISION: usize = 3;

/// A value read from (or written to) a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PvValue {
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<f64>),
    /// A native type the GUI cannot display; carries the native type name.
    Unsupported(String),
}

/// Coarse value category used to pick widgets and views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Numeric,
    Text,
    Array,
    Unsupported,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Numeric => "numeric",
            ValueKind::Text => "text",
            ValueKind::Array => "array",
            ValueKind::Unsupported => "unsupported",
        };
        write!(f, "{}", s)
    }
}

impl PvValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PvValue::Int(_) | PvValue::Float(_) => ValueKind::Numeric,
            PvValue::Text(_) => ValueKind::Text,
            PvValue::Array(_) => ValueKind::Array,
            PvValue::Unsupported(_) => ValueKind::Unsupported,
        }
    }

    /// Scalar value as `f64`, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PvValue::Int(v) => Some(*v as f64),
            PvValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            PvValue::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Render the value for display, without units.
    pub fn display(&self, precision: usize) -> String {
        match self {
            PvValue::Int(v) => v.to_string(),
            PvValue::Float(v) => format!("{:.*}", precision, v),
            PvValue::Text(s) => s.clone(),
            PvValue::Array(v) => format!("[{} elements]", v.len()),
            PvValue::Unsupported(t) => format!("<{}>", t),
        }
    }

    /// Render the value followed by its unit suffix (if any).
    pub fn display_with_units(&self, precision: usize, units: &str) -> String {
        let v = self.display(precision);
        if units.is_empty() || !matches!(self.kind(), ValueKind::Numeric) {
            v
        } else {
            format!("{} {}", v, units)
        }
    }
}

/// Everything known about a channel right after it resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub pv_name: String,
    pub value: PvValue,
    pub units: String,
    pub precision: usize,
    pub write_access: bool,
}

/// Handle for an active channel monitor. Dropping it stops the monitor.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the monitor now instead of waiting for drop.
    pub fn cancel(mut self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.cancel.take() {
            f();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Connect-by-name, subscribe-to-changes and write access to control-system channels.
pub trait ChannelClient: Send + Sync {
    /// Resolve `pv_name` and read its current value, units and write access.
    fn connect(&self, pv_name: &str, timeout: Duration) -> Result<ChannelInfo, ChannelError>;

    /// Start monitoring `pv_name`; every change is sent to `sink` tagged with `id`.
    fn subscribe(
        &self,
        pv_name: &str,
        id: ParameterId,
        sink: MonitorSink,
    ) -> Result<Subscription, ChannelError>;

    /// Write `value` to `pv_name`.
    fn put(&self, pv_name: &str, value: PvValue) -> Result<(), ChannelError>;
}
