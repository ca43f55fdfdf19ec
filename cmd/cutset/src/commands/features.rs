//! Feature precomputation.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use cutset_dataset::{FeatureExtractor, manifest};
use serde::Serialize;

use super::{build_extractor, load_manifest};
use crate::config::load_config;
use crate::{Cli, output};

/// Compute filterbank features for every cut and write a new manifest.
///
/// Features are stored as raw f32 files under `--storage-dir`, or inline
/// in the manifest when no directory is given.
#[derive(Args)]
pub struct FeaturesCommand {
    /// Input manifest path (.json or .jsonl)
    manifest: PathBuf,

    /// Output manifest path
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Directory for feature files
    #[arg(long)]
    storage_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    manifest: String,
    cuts: usize,
    feature_type: String,
    feature_dim: usize,
    frame_shift: f64,
}

impl FeaturesCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = load_config(cli.config.as_deref())?;
        let extractor = build_extractor(&cfg);
        let cuts = load_manifest(&self.manifest)?;

        let with_features = cuts.compute_and_store_features(&extractor, self.storage_dir.as_deref())?;
        manifest::save(&with_features, &self.output)
            .with_context(|| format!("failed to write manifest {}", self.output.display()))?;

        output::print(
            cli,
            &Report {
                manifest: self.output.display().to_string(),
                cuts: with_features.len(),
                feature_type: extractor.name().to_string(),
                feature_dim: extractor.feature_dim(),
                frame_shift: extractor.frame_shift(),
            },
        )
    }
}
