//! Grouping cut ids into batches for a [`Dataset`](crate::Dataset).
//!
//! A [`CutSampler`] walks a [`CutSet`] once per epoch and yields batches of
//! ids bounded by a cut count and, optionally, a total duration. Shuffling
//! is seeded with `seed + epoch`, so every epoch is reproducible.
//!
//! # Example
//!
//! ```
//! use cutset_dataset::{CutSampler, CutSet, MonoCut, Recording, SamplerConfig};
//!
//! let cuts = CutSet::from_cuts(
//!     (0..5).map(|i| MonoCut::from_recording(Recording::from_samples(format!("c{i}"), vec![0.0; 100], 100))),
//! )
//! .unwrap();
//! let cfg = SamplerConfig { max_cuts: 2, ..Default::default() };
//! let batches: Vec<Vec<String>> = CutSampler::new(&cuts, cfg).collect();
//! assert_eq!(batches.len(), 3);
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::CutSet;

/// Batch limits and ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Maximum number of cuts per batch.
    pub max_cuts: usize,
    /// Maximum summed duration per batch, in seconds.
    pub max_duration: Option<f64>,
    pub shuffle: bool,
    pub seed: u64,
    /// Drop a trailing batch that hit neither limit.
    pub drop_last: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_cuts: 16,
            max_duration: None,
            shuffle: false,
            seed: 0,
            drop_last: false,
        }
    }
}

/// Yields batches of cut ids.
#[derive(Debug, Clone)]
pub struct CutSampler {
    entries: Vec<(String, f64)>,
    order: Vec<usize>,
    pos: usize,
    epoch: u64,
    cfg: SamplerConfig,
}

impl CutSampler {
    pub fn new(cuts: &CutSet, cfg: SamplerConfig) -> Self {
        let entries = cuts.iter().map(|c| (c.id().to_string(), c.duration())).collect();
        let mut sampler = Self {
            entries,
            order: Vec::new(),
            pos: 0,
            epoch: 0,
            cfg,
        };
        sampler.reset();
        sampler
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.cfg
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Restarts iteration for `epoch`, reshuffling if enabled.
    pub fn set_epoch(&mut self, epoch: u64) {
        self.epoch = epoch;
        self.reset();
    }

    fn reset(&mut self) {
        self.order = (0..self.entries.len()).collect();
        if self.cfg.shuffle {
            let mut rng = StdRng::seed_from_u64(self.cfg.seed.wrapping_add(self.epoch));
            self.order.shuffle(&mut rng);
        }
        self.pos = 0;
        debug!(epoch = self.epoch, cuts = self.entries.len(), shuffle = self.cfg.shuffle, "sampler reset");
    }

    fn batch_full(&self, count: usize, duration: f64, next: f64) -> bool {
        if count >= self.cfg.max_cuts.max(1) {
            return true;
        }
        match self.cfg.max_duration {
            Some(max) => count > 0 && duration + next > max,
            None => false,
        }
    }

    /// Whether a finished batch met either limit.
    fn reached_limit(&self, count: usize, duration: f64) -> bool {
        count >= self.cfg.max_cuts.max(1) || self.cfg.max_duration.is_some_and(|max| duration >= max)
    }
}

impl Iterator for CutSampler {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        let mut batch = Vec::new();
        let mut duration = 0.0;
        let mut full = false;
        while let Some(&i) = self.order.get(self.pos) {
            let (id, dur) = &self.entries[i];
            if self.batch_full(batch.len(), duration, *dur) {
                full = true;
                break;
            }
            batch.push(id.clone());
            duration += dur;
            self.pos += 1;
        }
        if batch.is_empty() {
            return None;
        }
        // A batch that stopped because the cuts ran out is the last one.
        if !full && self.cfg.drop_last && !self.reached_limit(batch.len(), duration) {
            return None;
        }
        Some(batch)
    }
}
