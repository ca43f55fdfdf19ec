//! Manifest validation.

use std::path::PathBuf;

use clap::Args;
use cutset_dataset::{Requirement, check_requirement, validate};
use serde::Serialize;
use tracing::info;

use super::load_manifest;
use crate::{Cli, output};

/// Check a manifest for consistency.
///
/// Fails on the first invalid cut. With `--require`, also checks that every
/// cut carries the given modality.
#[derive(Args)]
pub struct ValidateCommand {
    /// Manifest path (.json or .jsonl)
    manifest: PathBuf,

    /// Also require every cut to have features or a recording
    #[arg(long, value_enum)]
    require: Option<Require>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Require {
    Features,
    Recording,
}

#[derive(Serialize)]
struct Report {
    manifest: String,
    cuts: usize,
    valid: bool,
}

impl ValidateCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cuts = load_manifest(&self.manifest)?;
        match self.require {
            Some(Require::Features) => check_requirement(&cuts, Requirement::Features)?,
            Some(Require::Recording) => check_requirement(&cuts, Requirement::Recording)?,
            None => validate(&cuts)?,
        }
        info!(cuts = cuts.len(), "manifest is valid");
        output::print(
            cli,
            &Report {
                manifest: self.manifest.display().to_string(),
                cuts: cuts.len(),
                valid: true,
            },
        )
    }
}
