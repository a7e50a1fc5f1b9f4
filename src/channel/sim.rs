//! Simulated IOC serving named channels from deterministic signal generators.
//!
//! Each subscription runs on its own thread, samples the channel's signal once
//! per period and publishes a value event whenever the value changed, the same
//! way a channel monitor only fires on change.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::{ChannelClient, ChannelInfo, PvValue, Subscription, ValueKind, DEFAULT_PRECISION};
use crate::error::ChannelError;
use crate::monitor::{MonitorSink, ParameterId};

/// How a simulated channel's value evolves over time (`t` in seconds since client start).
#[derive(Debug, Clone, PartialEq)]
pub enum SimSignal {
    /// Holds `SimChannel::value` until it is written.
    Constant,
    /// `offset + amplitude * sin(2πt / period)`.
    Sine {
        amplitude: f64,
        period_secs: f64,
        offset: f64,
    },
    /// Rises at `rate` units per second from `min`, wrapping at `max`.
    Ramp { min: f64, max: f64, rate: f64 },
    /// Integer that grows by `step` every channel period.
    Counter { step: i64 },
    /// Gaussian spot orbiting the centre of a `width` x `height` frame.
    Spot {
        width: usize,
        height: usize,
        period_secs: f64,
    },
}

/// A simulated channel definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SimChannel {
    pub value: PvValue,
    pub units: String,
    pub precision: usize,
    pub writable: bool,
    pub signal: SimSignal,
    /// Sampling period of monitors on this channel.
    pub period: Duration,
}

impl SimChannel {
    pub fn constant(value: PvValue) -> Self {
        Self {
            value,
            units: String::new(),
            precision: DEFAULT_PRECISION,
            writable: false,
            signal: SimSignal::Constant,
            period: Duration::from_millis(100),
        }
    }

    pub fn signal(signal: SimSignal) -> Self {
        let value = match &signal {
            SimSignal::Counter { .. } => PvValue::Int(0),
            SimSignal::Spot { .. } => PvValue::Array(Vec::new()),
            _ => PvValue::Float(0.0),
        };
        Self {
            signal,
            ..Self::constant(value)
        }
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Value of the channel at `t` seconds after client start.
    pub fn sample(&self, t: f64) -> PvValue {
        match &self.signal {
            SimSignal::Constant => self.value.clone(),
            SimSignal::Sine {
                amplitude,
                period_secs,
                offset,
            } => {
                let period = period_secs.max(1e-6);
                PvValue::Float(offset + amplitude * (2.0 * PI * t / period).sin())
            }
            SimSignal::Ramp { min, max, rate } => {
                let span = (max - min).abs().max(1e-12);
                PvValue::Float(min + (rate * t).rem_euclid(span))
            }
            SimSignal::Counter { step } => {
                let base = match self.value {
                    PvValue::Int(v) => v,
                    _ => 0,
                };
                let ticks = (t / self.period.as_secs_f64().max(1e-6)).floor() as i64;
                PvValue::Int(base.saturating_add(step.saturating_mul(ticks)))
            }
            SimSignal::Spot {
                width,
                height,
                period_secs,
            } => PvValue::Array(spot_frame(*width, *height, t / period_secs.max(1e-6))),
        }
    }

    fn info(&self, pv_name: &str, t: f64) -> ChannelInfo {
        ChannelInfo {
            pv_name: pv_name.to_string(),
            value: self.sample(t),
            units: self.units.clone(),
            precision: self.precision,
            write_access: self.writable,
        }
    }
}

/// Render one frame of the orbiting spot; `phase` is in revolutions.
fn spot_frame(width: usize, height: usize, phase: f64) -> Vec<f64> {
    let (w, h) = (width as f64, height as f64);
    let angle = 2.0 * PI * phase;
    let cx = w / 2.0 + (w / 4.0) * angle.cos();
    let cy = h / 2.0 + (h / 4.0) * angle.sin();
    let sigma = (w.min(h) / 10.0).max(1.0);
    let denom = 2.0 * sigma * sigma;
    let mut frame = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            frame.push(1000.0 * (-(dx * dx + dy * dy) / denom).exp());
        }
    }
    frame
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process simulated control system.
pub struct SimClient {
    channels: RwLock<HashMap<String, Arc<Mutex<SimChannel>>>>,
    start: Instant,
}

impl Default for SimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClient {
    /// An empty client; every name times out until channels are inserted.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            start: Instant::now(),
        }
    }

    /// A client pre-populated with the 6-ID-B diffractometer channels.
    pub fn beamline() -> Self {
        let client = Self::new();
        let deg = |ch: SimChannel| ch.units("deg").precision(4);
        client.insert(
            "6idb1:m18.RBV",
            deg(SimChannel::signal(SimSignal::Sine {
                amplitude: 2.0,
                period_secs: 20.0,
                offset: 30.0,
            })),
        );
        client.insert(
            "6idb1:m17.RBV",
            deg(SimChannel::signal(SimSignal::Ramp {
                min: 0.0,
                max: 90.0,
                rate: 0.5,
            })),
        );
        client.insert(
            "6idb1:m18.VAL",
            deg(SimChannel::constant(PvValue::Float(30.0))).writable(true),
        );
        client.insert(
            "6idb1:m17.VAL",
            deg(SimChannel::constant(PvValue::Float(0.0))).writable(true),
        );
        client.insert(
            "6idb1:m17.DESC",
            SimChannel::constant(PvValue::Text("Eta".into())).writable(true),
        );
        client.insert(
            "6idb1:m18.STAT",
            SimChannel::constant(PvValue::Unsupported("DBF_MENU".into())),
        );
        client.insert(
            "6idb1:scaler1.S2",
            SimChannel::signal(SimSignal::Counter { step: 137 })
                .units("cts")
                .period(Duration::from_millis(200)),
        );
        client.insert(
            "6idb1:scaler1.CNT",
            SimChannel::constant(PvValue::Int(0)).writable(true),
        );
        client.insert(
            "6idbPS1:image1:ArrayData",
            SimChannel::signal(SimSignal::Spot {
                width: 64,
                height: 64,
                period_secs: 8.0,
            })
            .period(Duration::from_millis(200)),
        );
        client.insert(
            "6idbPS1:image1:ArraySize0_RBV",
            SimChannel::constant(PvValue::Int(64)),
        );
        client
    }

    /// Add or replace a channel.
    pub fn insert(&self, pv_name: impl Into<String>, channel: SimChannel) {
        let pv_name = pv_name.into();
        debug!("sim: serving channel '{}'", pv_name);
        let mut map = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(pv_name, Arc::new(Mutex::new(channel)));
    }

    /// Stop serving a channel. Existing monitors keep their last value.
    pub fn remove(&self, pv_name: &str) -> bool {
        let mut map = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(pv_name).is_some()
    }

    /// Names of all served channels, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let map = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    fn channel(&self, pv_name: &str) -> Option<Arc<Mutex<SimChannel>>> {
        let map = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        map.get(pv_name.trim()).cloned()
    }

    fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl ChannelClient for SimClient {
    fn connect(&self, pv_name: &str, timeout: Duration) -> Result<ChannelInfo, ChannelError> {
        // Unknown names fail immediately with the error a real search would
        // produce after `timeout`.
        let channel = self.channel(pv_name).ok_or_else(|| ChannelError::Timeout {
            pv_name: pv_name.to_string(),
            timeout,
        })?;
        let info = lock(&channel).info(pv_name.trim(), self.elapsed());
        debug!("sim: connected '{}' ({})", info.pv_name, info.value.kind());
        Ok(info)
    }

    fn subscribe(
        &self,
        pv_name: &str,
        id: ParameterId,
        sink: MonitorSink,
    ) -> Result<Subscription, ChannelError> {
        let channel = self
            .channel(pv_name)
            .ok_or_else(|| ChannelError::NotFound(pv_name.to_string()))?;

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let start = self.start;
        let name = pv_name.trim().to_string();

        let spawned = thread::Builder::new()
            .name(format!("sim-monitor-{}", id))
            .spawn(move || {
                if sink.send_connection(id, true).is_err() {
                    return;
                }
                let mut last: Option<PvValue> = None;
                while !stop_flag.load(Ordering::Relaxed) {
                    let (value, period) = {
                        let ch = lock(&channel);
                        (ch.sample(start.elapsed().as_secs_f64()), ch.period)
                    };
                    if last.as_ref() != Some(&value) {
                        // Receiver dropped: the UI is gone.
                        if sink.send_value(id, value.clone()).is_err() {
                            break;
                        }
                        last = Some(value);
                    }
                    thread::sleep(period);
                }
                debug!("sim: monitor {} on '{}' stopped", id, name);
            });

        match spawned {
            Ok(_) => Ok(Subscription::new(move || stop.store(true, Ordering::Relaxed))),
            Err(e) => {
                warn!("sim: could not start monitor for '{}': {}", pv_name, e);
                Err(ChannelError::Disconnected(pv_name.to_string()))
            }
        }
    }

    fn put(&self, pv_name: &str, value: PvValue) -> Result<(), ChannelError> {
        let channel = self
            .channel(pv_name)
            .ok_or_else(|| ChannelError::NotFound(pv_name.to_string()))?;
        let mut ch = lock(&channel);
        if !ch.writable {
            return Err(ChannelError::ReadOnly(pv_name.to_string()));
        }
        let expected = ch.value.kind();
        let found = value.kind();
        if expected != found || expected == ValueKind::Unsupported {
            return Err(ChannelError::TypeMismatch { expected, found });
        }
        // Keep the channel's native numeric representation.
        let value = match (&ch.value, value) {
            (PvValue::Float(_), PvValue::Int(v)) => PvValue::Float(v as f64),
            (PvValue::Int(_), PvValue::Float(v)) => PvValue::Int(v.round() as i64),
            (_, v) => v,
        };
        info!("sim: put {} = {}", pv_name, value.display(ch.precision));
        ch.value = value;
        // A written channel holds its setpoint.
        ch.signal = SimSignal::Constant;
        Ok(())
    }
}
