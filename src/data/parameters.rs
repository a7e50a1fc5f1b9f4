//! The ordered set of parameter rows and the monitor channel feeding them.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use log::{debug, info};

use crate::channel::{ChannelClient, ChannelInfo, Subscription};
use crate::data::history::DEFAULT_HISTORY_CAPACITY;
use crate::data::parameter::{Parameter, PlotAttachment, PlotUpdateMode};
use crate::error::ChannelError;
use crate::monitor::{channel_monitor, now_secs, MonitorEvent, MonitorSink, ParameterId};

pub struct ParameterCollection {
    rows: Vec<Parameter>,
    subscriptions: HashMap<ParameterId, Subscription>,
    sink: MonitorSink,
    rx: Receiver<MonitorEvent>,
    /// Epoch seconds that history times are measured from.
    start: f64,
    /// Capacity given to the history of newly added rows.
    pub max_points: usize,
}

impl Default for ParameterCollection {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ParameterCollection {
    pub fn new(max_points: usize) -> Self {
        Self::with_start(max_points, now_secs())
    }

    /// Like [`new`](Self::new) but with an explicit time origin.
    pub fn with_start(max_points: usize, start: f64) -> Self {
        let (sink, rx) = channel_monitor();
        Self {
            rows: Vec::new(),
            subscriptions: HashMap::new(),
            sink,
            rx,
            start,
            max_points,
        }
    }

    /// Sender that feeds this collection; handed to every subscription.
    pub fn sink(&self) -> MonitorSink {
        self.sink.clone()
    }

    pub fn start_time(&self) -> f64 {
        self.start
    }

    /// Subscribe to an already-resolved channel and append one row for it.
    pub fn add(
        &mut self,
        client: &dyn ChannelClient,
        display_name: &str,
        info: ChannelInfo,
    ) -> Result<ParameterId, ChannelError> {
        let id = MonitorSink::next_id();
        let subscription = client.subscribe(&info.pv_name, id, self.sink.clone())?;
        let row = Parameter::from_info(id, display_name, info, self.max_points);
        info!(
            "added parameter '{}' ({}, {})",
            row.display_name, row.pv_name, row.kind
        );
        self.subscriptions.insert(id, subscription);
        self.rows.push(row);
        Ok(id)
    }

    /// Resolve `pv_name`, then [`add`](Self::add) it.
    pub fn add_by_name(
        &mut self,
        client: &dyn ChannelClient,
        display_name: &str,
        pv_name: &str,
        timeout: Duration,
    ) -> Result<ParameterId, ChannelError> {
        let info = client.connect(pv_name.trim(), timeout)?;
        self.add(client, display_name, info)
    }

    /// Remove a row and stop its monitor.
    pub fn remove(&mut self, id: ParameterId) -> Option<Parameter> {
        let idx = self.rows.iter().position(|p| p.id == id)?;
        if let Some(sub) = self.subscriptions.remove(&id) {
            sub.cancel();
        }
        let row = self.rows.remove(idx);
        info!("removed parameter '{}' ({})", row.display_name, row.pv_name);
        Some(row)
    }

    /// Drain pending monitor events and apply them. Returns the number applied.
    pub fn ingest(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply one event. Events for unknown rows and mismatched value kinds are dropped.
    pub fn apply(&mut self, event: MonitorEvent) -> bool {
        let id = event.id();
        let start = self.start;
        let Some(row) = self.get_mut(id) else {
            debug!("dropping monitor event for removed parameter {}", id);
            return false;
        };
        match event {
            MonitorEvent::Value {
                value, timestamp, ..
            } => {
                let kind = value.kind();
                let ok = row.apply_value(value, timestamp, timestamp - start);
                if !ok {
                    debug!(
                        "dropping {} update for '{}' (row holds {})",
                        kind, row.pv_name, row.kind
                    );
                }
                ok
            }
            MonitorEvent::Connection { connected, .. } => {
                if row.connected != connected {
                    info!(
                        "'{}' {}",
                        row.pv_name,
                        if connected { "connected" } else { "disconnected" }
                    );
                }
                row.connected = connected;
                true
            }
        }
    }

    /// Record one sample for every timer-mode plot that is due at `now` (epoch seconds).
    pub fn tick(&mut self, now: f64) -> usize {
        let rel = now - self.start;
        self.rows.iter_mut().map(|p| p.tick(rel)).filter(|&due| due).count()
    }

    /// Bind a plot to a numeric row. Returns `false` if the row is missing,
    /// not numeric, or already has a plot.
    pub fn attach_plot(&mut self, id: ParameterId, mode: PlotUpdateMode) -> bool {
        match self.get_mut(id) {
            Some(p) if p.is_plottable() && p.plot.is_none() => {
                p.plot = Some(PlotAttachment::new(mode));
                true
            }
            _ => false,
        }
    }

    /// Unbind the plot; the recorded history is kept.
    pub fn detach_plot(&mut self, id: ParameterId) {
        if let Some(p) = self.get_mut(id) {
            p.plot = None;
        }
    }

    pub fn get(&self, id: ParameterId) -> Option<&Parameter> {
        self.rows.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ParameterId) -> Option<&mut Parameter> {
        self.rows.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> + '_ {
        self.rows.iter()
    }

    /// Rows in display order, for in-place reordering and editing.
    pub fn rows_mut(&mut self) -> &mut [Parameter] {
        &mut self.rows
    }

    pub fn ids(&self) -> Vec<ParameterId> {
        self.rows.iter().map(|p| p.id).collect()
    }

    /// Move the row at `from` so it ends up at index `to`.
    pub fn move_row(&mut self, from: usize, to: usize) {
        if from >= self.rows.len() || from == to {
            return;
        }
        let row = self.rows.remove(from);
        let to = to.min(self.rows.len());
        self.rows.insert(to, row);
    }

    /// Current display order.
    pub fn order(&self) -> Vec<ParameterId> {
        self.ids()
    }

    /// Reorder rows to follow `order`. Unknown ids are ignored; rows missing
    /// from `order` keep their relative order after the listed ones.
    pub fn set_order(&mut self, order: &[ParameterId]) {
        let rank = |id: ParameterId| order.iter().position(|&o| o == id).unwrap_or(usize::MAX);
        self.rows.sort_by_key(|p| rank(p.id));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_subscribed(&self, id: ParameterId) -> bool {
        self.subscriptions.contains_key(&id)
    }
}
