use cutset_audio::fbank::FbankError;
use cutset_audio::resampler::ResamplerError;
use cutset_audio::wav::WavError;
use thiserror::Error;

/// Errors returned by cut, collation and dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cut {cut_id} has no precomputed features")]
    MissingFeatures { cut_id: String },

    #[error("cut {cut_id} has no recording")]
    MissingRecording { cut_id: String },

    #[error("unknown cut id: {0}")]
    UnknownCut(String),

    #[error("duplicate cut id: {0}")]
    DuplicateCut(String),

    #[error("invalid cut {cut_id}: {reason}")]
    Validation { cut_id: String, reason: String },

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("sampling rate mismatch: expected {expected} Hz, got {got} Hz")]
    SamplingRate { expected: u32, got: u32 },

    #[error("augmentation failed: {0}")]
    Augment(String),

    #[error("wav: {0}")]
    Wav(#[from] WavError),

    #[error("fbank: {0}")]
    Fbank(#[from] FbankError),

    #[error("resample: {0}")]
    Resample(#[from] ResamplerError),

    #[error("manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub(crate) fn invalid(cut_id: &str, reason: impl Into<String>) -> Self {
        DatasetError::Validation {
            cut_id: cut_id.to_string(),
            reason: reason.into(),
        }
    }
}
