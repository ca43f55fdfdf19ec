//! CLI commands module.

mod batches;
mod features;
mod inspect;
mod validate;

pub use batches::BatchesCommand;
pub use features::FeaturesCommand;
pub use inspect::InspectCommand;
pub use validate::ValidateCommand;

use std::path::Path;

use anyhow::Context as _;
use cutset_dataset::{CutSet, Fbank, manifest};

use crate::config::Config;

pub(crate) fn load_manifest(path: &Path) -> anyhow::Result<CutSet> {
    manifest::load(path).with_context(|| format!("failed to load manifest {}", path.display()))
}

pub(crate) fn build_extractor(cfg: &Config) -> Fbank {
    let fbank = Fbank::new(cfg.fbank.clone());
    if cfg.cmvn { fbank.with_cmvn() } else { fbank }
}
