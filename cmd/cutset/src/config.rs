//! CLI configuration.
//!
//! Configuration is stored in ~/.cutset/config.yaml. Every section is
//! optional:
//!
//! ```yaml
//! fbank:
//!   num_mels: 40
//! sampler:
//!   max_cuts: 8
//!   max_duration: 30.0
//!   shuffle: true
//! augment:
//!   speed: 1.1
//!   gain_db: -3.0
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use cutset_audio::fbank;
use cutset_dataset::{Chain, Gain, SamplerConfig, SpeedPerturb};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".cutset";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filterbank settings for feature computation and on-the-fly extraction.
    pub fbank: fbank::Config,
    /// Apply CMVN to extracted features.
    pub cmvn: bool,
    pub sampler: SamplerConfig,
    /// Augmentation for on-the-fly extraction.
    pub augment: AugmentConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Speed perturbation factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Gain in decibels, applied after speed perturbation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain_db: Option<f32>,
}

impl AugmentConfig {
    /// Builds the configured chain, or `None` when nothing is set.
    pub fn build(&self) -> Option<Chain> {
        if self.speed.is_none() && self.gain_db.is_none() {
            return None;
        }
        let mut chain = Chain::new();
        if let Some(factor) = self.speed {
            chain = chain.then(SpeedPerturb { factor });
        }
        if let Some(db) = self.gain_db {
            chain = chain.then(Gain { db });
        }
        Some(chain)
    }
}

/// Gets the default config file path.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(DEFAULT_CONFIG_FILE))
}

/// Loads the configuration.
///
/// An explicit path must exist. A missing default file yields defaults.
pub fn load_config(custom_path: Option<&str>) -> anyhow::Result<Config> {
    let path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                debug!("no config file, using defaults");
                return Ok(Config::default());
            }
        },
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}
