//! Log mel filterbank feature extraction from PCM audio.
//!
//! Standard front-end for speech models. Output is a `[T][num_mels]` f32
//! matrix, one row per analysis frame.
//!
//! Default parameters match the Kaldi convention:
//! - SampleRate: 16000
//! - WindowSize: 400 (25ms)
//! - HopSize: 160 (10ms)
//! - FFTSize: 512
//! - NumMels: 80
//! - LowFreq: 20 Hz
//! - HighFreq: 7600 Hz
//! - PreEmphasis: 0.97

mod mel;

use std::sync::Arc;

use realfft::{FftError, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mel::{MelFilter, hamming_window, hz_to_mel, mel_to_hz};

/// Floor applied to mel energies before taking the log.
pub const ENERGY_FLOOR: f64 = 1e-10;

/// Errors from filterbank extraction.
#[derive(Debug, Error)]
pub enum FbankError {
    #[error("window of {window} samples does not fit an FFT of {fft_size}")]
    WindowTooLong { window: usize, fft_size: usize },

    #[error("fft: {0}")]
    Fft(#[from] FftError),
}

/// Configuration for mel filterbank extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sample_rate: usize,
    pub window_size: usize,
    pub hop_size: usize,
    pub fft_size: usize,
    pub num_mels: usize,
    pub low_freq: f64,
    pub high_freq: f64,
    pub pre_emphasis: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            window_size: 400,
            hop_size: 160,
            fft_size: 512,
            num_mels: 80,
            low_freq: 20.0,
            high_freq: 7600.0,
            pre_emphasis: 0.97,
        }
    }
}

impl Config {
    /// Hop between frames in seconds.
    pub fn frame_shift(&self) -> f64 {
        self.hop_size as f64 / self.sample_rate as f64
    }

    /// Number of frames produced for `num_samples` input samples.
    pub fn num_frames(&self, num_samples: usize) -> usize {
        if num_samples < self.window_size || self.hop_size == 0 {
            return 0;
        }
        (num_samples - self.window_size) / self.hop_size + 1
    }
}

/// Mel filterbank feature extractor.
pub struct Extractor {
    cfg: Config,
    window: Vec<f64>,
    filters: Vec<MelFilter>,
    fft: Arc<dyn RealToComplex<f64>>,
}

impl Extractor {
    /// Creates a new extractor with the given config.
    pub fn new(cfg: Config) -> Self {
        let window = hamming_window(cfg.window_size);
        let filters = mel::mel_filter_bank(
            cfg.num_mels, cfg.fft_size, cfg.sample_rate, cfg.low_freq, cfg.high_freq,
        );
        let fft = RealFftPlanner::<f64>::new().plan_fft_forward(cfg.fft_size);
        Self { cfg, window, filters, fft }
    }

    /// Returns the extractor's configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Extracts log mel filterbank features from normalized f32 PCM samples (range [-1, 1]).
    ///
    /// Returns `[T][num_mels]` where `T = (len(pcm) - window_size) / hop_size + 1`,
    /// or nothing when the input is shorter than one window.
    pub fn extract(&self, pcm: &[f32]) -> Result<Vec<Vec<f32>>, FbankError> {
        let cfg = &self.cfg;
        if cfg.window_size > cfg.fft_size {
            return Err(FbankError::WindowTooLong {
                window: cfg.window_size,
                fft_size: cfg.fft_size,
            });
        }

        let mut frame = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();
        let mut scratch = self.fft.make_scratch_vec();
        let mut power = vec![0.0f64; spectrum.len()];

        let mut features = Vec::with_capacity(cfg.num_frames(pcm.len()));
        for t in 0..cfg.num_frames(pcm.len()) {
            let start = t * cfg.hop_size;

            // Pre-emphasis against the previous sample, then windowing.
            frame.fill(0.0);
            for (i, w) in self.window.iter().enumerate() {
                let n = start + i;
                let prev = if n > 0 { pcm[n - 1] as f64 } else { 0.0 };
                frame[i] = (pcm[n] as f64 - cfg.pre_emphasis * prev) * w;
            }

            self.fft.process_with_scratch(&mut frame, &mut spectrum, &mut scratch)?;
            for (p, c) in power.iter_mut().zip(&spectrum) {
                *p = c.norm_sqr();
            }

            features.push(
                self.filters
                    .iter()
                    .map(|f| f.apply(&power).max(ENERGY_FLOOR).ln() as f32)
                    .collect(),
            );
        }
        Ok(features)
    }
}

/// Normalizes each mel bin to zero mean and unit variance over time, in place.
pub fn cmvn(features: &mut [Vec<f32>]) {
    let Some(dim) = features.first().map(Vec::len) else {
        return;
    };
    let frames = features.len() as f64;

    let mut sum = vec![0.0f64; dim];
    let mut sum_sq = vec![0.0f64; dim];
    for row in features.iter() {
        for ((s, q), &v) in sum.iter_mut().zip(sum_sq.iter_mut()).zip(row) {
            *s += v as f64;
            *q += (v as f64) * (v as f64);
        }
    }

    let stats: Vec<(f64, f64)> = sum
        .iter()
        .zip(&sum_sq)
        .map(|(s, q)| {
            let mean = s / frames;
            let var = (q / frames - mean * mean).max(0.0);
            (mean, var.sqrt().max(1e-10))
        })
        .collect();

    for row in features.iter_mut() {
        for (v, (mean, std)) in row.iter_mut().zip(&stats) {
            *v = ((*v as f64 - mean) / std) as f32;
        }
    }
}
