use std::collections::VecDeque;

/// Default number of samples retained per parameter.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Bounded list of `[t, y]` samples; the oldest sample is dropped once full.
#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<[f64; 2]>,
    capacity: usize,
}

/// Summary statistics over a history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping the oldest samples if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.prune();
    }

    pub fn push(&mut self, t: f64, y: f64) {
        self.samples.push_back([t, y]);
        self.prune();
    }

    fn prune(&mut self) {
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn latest(&self) -> Option<[f64; 2]> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64; 2]> + '_ {
        self.samples.iter()
    }

    /// Samples with `t` shifted so the newest sample sits at zero.
    pub fn relative_points(&self) -> Vec<[f64; 2]> {
        let Some([t_latest, _]) = self.latest() else {
            return Vec::new();
        };
        self.samples
            .iter()
            .map(|&[t, y]| [t - t_latest, y])
            .collect()
    }

    pub fn stats(&self) -> Option<HistoryStats> {
        if self.samples.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &[_, y] in &self.samples {
            min = min.min(y);
            max = max.max(y);
            sum += y;
        }
        let count = self.samples.len();
        Some(HistoryStats {
            min,
            max,
            mean: sum / count as f64,
            count,
        })
    }
}
