//! Manifest summaries.

use std::path::PathBuf;

use clap::Args;
use cutset_dataset::{Cut, CutSet};
use serde::Serialize;

use super::load_manifest;
use crate::{Cli, output};

/// Summarize a manifest, or print a single cut.
#[derive(Args)]
pub struct InspectCommand {
    /// Manifest path (.json or .jsonl)
    manifest: PathBuf,

    /// Print this cut instead of a summary
    #[arg(long)]
    id: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
struct Summary {
    cuts: usize,
    mono: usize,
    mixed: usize,
    with_features: usize,
    with_recording: usize,
    total_duration: f64,
    min_duration: f64,
    max_duration: f64,
}

impl Summary {
    fn of(cuts: &CutSet) -> Self {
        let durations = || cuts.iter().map(Cut::duration);
        Self {
            cuts: cuts.len(),
            mono: cuts.iter().filter(|c| matches!(c, Cut::Mono(_))).count(),
            mixed: cuts.iter().filter(|c| matches!(c, Cut::Mixed(_))).count(),
            with_features: cuts.iter().filter(|c| c.has_features()).count(),
            with_recording: cuts.iter().filter(|c| c.has_recording()).count(),
            total_duration: cuts.total_duration(),
            min_duration: durations().reduce(f64::min).unwrap_or(0.0),
            max_duration: durations().reduce(f64::max).unwrap_or(0.0),
        }
    }
}

impl InspectCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cuts = load_manifest(&self.manifest)?;
        match &self.id {
            Some(id) => {
                let cut = cuts
                    .get(id)
                    .ok_or_else(|| anyhow::anyhow!("cut '{}' not found", id))?;
                output::print(cli, cut)
            }
            None => output::print(cli, &Summary::of(&cuts)),
        }
    }
}
