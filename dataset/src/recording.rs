//! Recordings: the raw audio a cut points into.

use std::path::PathBuf;

use cutset_audio::pcm::downmix;
use cutset_audio::wav;
use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// Where a recording's samples live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioSource {
    /// A WAV file on disk. Multi-channel files are downmixed on load.
    File { path: PathBuf },
    /// Mono samples held in memory.
    Memory { samples: Vec<f32> },
}

/// A single audio recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub source: AudioSource,
    pub sampling_rate: u32,
    pub num_samples: usize,
    pub duration: f64,
}

impl Recording {
    /// Describes a WAV file by reading its header.
    pub fn from_wav(id: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let path = path.into();
        let info = wav::probe(&path)?;
        Ok(Self {
            id: id.into(),
            source: AudioSource::File { path },
            sampling_rate: info.format.sample_rate,
            num_samples: info.num_frames,
            duration: info.duration(),
        })
    }

    /// Wraps in-memory mono samples.
    pub fn from_samples(id: impl Into<String>, samples: Vec<f32>, sampling_rate: u32) -> Self {
        let num_samples = samples.len();
        Self {
            id: id.into(),
            source: AudioSource::Memory { samples },
            sampling_rate,
            num_samples,
            duration: num_samples as f64 / sampling_rate as f64,
        }
    }

    /// Converts a time in seconds to a sample index at this recording's rate.
    pub fn sample_index(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.sampling_rate as f64).round() as usize
    }

    /// Loads mono samples starting at `offset` seconds.
    ///
    /// With `duration` unset the rest of the recording is returned. A span
    /// that overshoots the end by rounding is clipped to the recording.
    pub fn load_audio(&self, offset: f64, duration: Option<f64>) -> Result<Vec<f32>, DatasetError> {
        let start = self.sample_index(offset);
        if start > self.num_samples {
            return Err(DatasetError::invalid(
                &self.id,
                format!("offset {offset}s is past the end ({}s)", self.duration),
            ));
        }
        let available = self.num_samples - start;
        let len = duration
            .map(|d| self.sample_index(d).min(available))
            .unwrap_or(available);

        match &self.source {
            AudioSource::Memory { samples } => {
                if samples.len() < start + len {
                    return Err(DatasetError::ShapeMismatch {
                        expected: start + len,
                        got: samples.len(),
                    });
                }
                Ok(samples[start..start + len].to_vec())
            }
            AudioSource::File { path } => {
                let (info, samples) = wav::read_segment(path, start, len)?;
                if info.format.sample_rate != self.sampling_rate {
                    return Err(DatasetError::SamplingRate {
                        expected: self.sampling_rate,
                        got: info.format.sample_rate,
                    });
                }
                Ok(downmix(&samples, info.format.channels as usize))
            }
        }
    }
}
