//! Feature extractor capability.

use cutset_audio::fbank::{self, Config, Extractor};

use crate::DatasetError;

/// Turns mono audio into a `[frames][feature_dim]` matrix.
///
/// Implementations must be safe for concurrent use.
pub trait FeatureExtractor: Send + Sync {
    /// Short name stored with computed features (e.g., "fbank").
    fn name(&self) -> &str;

    /// Seconds between consecutive frames.
    fn frame_shift(&self) -> f64;

    fn feature_dim(&self) -> usize;

    /// The sampling rate the extractor expects.
    fn sampling_rate(&self) -> u32;

    fn extract(&self, samples: &[f32], sampling_rate: u32) -> Result<Vec<Vec<f32>>, DatasetError>;
}

/// Log mel filterbank extractor.
pub struct Fbank {
    inner: Extractor,
    cmvn: bool,
}

impl Fbank {
    pub fn new(cfg: Config) -> Self {
        Self {
            inner: Extractor::new(cfg),
            cmvn: false,
        }
    }

    /// Normalizes every extracted matrix to zero mean and unit variance per bin.
    pub fn with_cmvn(mut self) -> Self {
        self.cmvn = true;
        self
    }

    pub fn config(&self) -> &Config {
        self.inner.config()
    }
}

impl Default for Fbank {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl FeatureExtractor for Fbank {
    fn name(&self) -> &str {
        "fbank"
    }

    fn frame_shift(&self) -> f64 {
        self.config().frame_shift()
    }

    fn feature_dim(&self) -> usize {
        self.config().num_mels
    }

    fn sampling_rate(&self) -> u32 {
        self.config().sample_rate as u32
    }

    fn extract(&self, samples: &[f32], sampling_rate: u32) -> Result<Vec<Vec<f32>>, DatasetError> {
        if sampling_rate != self.sampling_rate() {
            return Err(DatasetError::SamplingRate {
                expected: self.sampling_rate(),
                got: sampling_rate,
            });
        }
        let mut feats = self.inner.extract(samples)?;
        if self.cmvn {
            fbank::cmvn(&mut feats);
        }
        Ok(feats)
    }
}
