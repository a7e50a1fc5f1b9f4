//! Monitor events and the channel that carries them to the UI thread.
//!
//! Channel clients deliver value changes on their own threads. They never touch
//! UI state directly: every change is wrapped in a [`MonitorEvent`] and sent
//! through a [`MonitorSink`]. The application drains the matching receiver once
//! per frame (see
//! [`ParameterCollection::ingest`](crate::data::parameters::ParameterCollection::ingest)).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{Receiver, SendError, Sender};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::channel::PvValue;

/// Numeric identifier for a parameter row, assigned by [`MonitorSink::next_id`].
pub type ParameterId = u32;

/// Messages sent by channel monitors.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// A new value for the parameter's channel.
    Value {
        id: ParameterId,
        value: PvValue,
        /// Seconds since the Unix epoch.
        timestamp: f64,
    },
    /// The channel connection went up or down.
    Connection { id: ParameterId, connected: bool },
}

impl MonitorEvent {
    pub fn id(&self) -> ParameterId {
        match self {
            MonitorEvent::Value { id, .. } | MonitorEvent::Connection { id, .. } => *id,
        }
    }
}

/// Convenience sender handed to channel subscriptions.
#[derive(Clone)]
pub struct MonitorSink {
    tx: Sender<MonitorEvent>,
}

impl MonitorSink {
    /// Allocate a fresh, process-unique parameter id.
    pub fn next_id() -> ParameterId {
        static NEXT_ID: AtomicU32 = AtomicU32::new(1);
        NEXT_ID.fetch_add(1, Ordering::Relaxed)
    }

    /// Send a value update stamped with the current wall-clock time.
    pub fn send_value(
        &self,
        id: ParameterId,
        value: PvValue,
    ) -> Result<(), SendError<MonitorEvent>> {
        self.send_value_at(id, value, now_secs())
    }

    /// Send a value update with an explicit timestamp (seconds since the epoch).
    pub fn send_value_at(
        &self,
        id: ParameterId,
        value: PvValue,
        timestamp: f64,
    ) -> Result<(), SendError<MonitorEvent>> {
        self.tx.send(MonitorEvent::Value {
            id,
            value,
            timestamp,
        })
    }

    /// Report a connection state change.
    pub fn send_connection(
        &self,
        id: ParameterId,
        connected: bool,
    ) -> Result<(), SendError<MonitorEvent>> {
        self.tx.send(MonitorEvent::Connection { id, connected })
    }
}

/// Create a new monitor channel pair: `(MonitorSink, Receiver<MonitorEvent>)`.
pub fn channel_monitor() -> (MonitorSink, Receiver<MonitorEvent>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (MonitorSink { tx }, rx)
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
