//! Batch iteration.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use cutset_dataset::{
    AugmentFn, CutSampler, DataLoader, Dataset, FeatureDataset, OnTheFlyDataset, WaveformDataset,
};
use serde::Serialize;
use tracing::debug;

use super::{build_extractor, load_manifest};
use crate::config::{Config, load_config};
use crate::{Cli, output};

/// Iterate one epoch of batches and report their shapes.
///
/// Batch limits and shuffling come from the `sampler` config section.
#[derive(Args)]
pub struct BatchesCommand {
    /// Manifest path (.json or .jsonl)
    manifest: PathBuf,

    /// Which dataset serves the batches
    #[arg(long, value_enum, default_value = "features")]
    mode: Mode,

    /// Epoch number, used to seed shuffling
    #[arg(long, default_value_t = 0)]
    epoch: u64,

    /// Stop after this many batches
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Precomputed features
    Features,
    /// Raw waveforms
    Audio,
    /// Features extracted from recordings at fetch time
    OnTheFly,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    index: usize,
    ids: Vec<String>,
    shape: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lens: Vec<usize>,
}

impl BatchesCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = load_config(cli.config.as_deref())?;
        let cuts = load_manifest(&self.manifest)?;
        let reports = match self.mode {
            Mode::Features => {
                let ds = FeatureDataset::new(cuts)?;
                self.iterate(&ds, &cfg, |b| (b.features.shape().to_vec(), b.features_lens))?
            }
            Mode::Audio => {
                let ds = WaveformDataset::new(cuts)?;
                self.iterate(&ds, &cfg, |b| (b.audio.shape().to_vec(), b.audio_lens))?
            }
            Mode::OnTheFly => {
                let augment = cfg.augment.build().map(|c| Arc::new(c) as Arc<dyn AugmentFn>);
                let ds = OnTheFlyDataset::new(Arc::new(build_extractor(&cfg)), cuts, augment)?;
                self.iterate(&ds, &cfg, |t| (t.shape().to_vec(), Vec::new()))?
            }
        };
        output::print(cli, &reports)
    }

    fn iterate<D, F>(&self, dataset: &D, cfg: &Config, describe: F) -> anyhow::Result<Vec<BatchReport>>
    where
        D: Dataset,
        F: Fn(D::Item) -> (Vec<usize>, Vec<usize>),
    {
        let mut sampler = CutSampler::new(dataset.cuts(), cfg.sampler.clone());
        sampler.set_epoch(self.epoch);
        // The sampler is deterministic, so a copy replays the same ids.
        let batch_ids = sampler.clone();

        let limit = self.limit.unwrap_or(usize::MAX);
        let mut reports = Vec::new();
        let batches = batch_ids.zip(DataLoader::new(dataset, sampler)).take(limit);
        for (index, (ids, batch)) in batches.enumerate() {
            let (shape, lens) = describe(batch?);
            debug!(index, ?shape, "batch");
            reports.push(BatchReport { index, ids, shape, lens });
        }
        Ok(reports)
    }
}
