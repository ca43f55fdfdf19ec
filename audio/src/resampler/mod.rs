//! Sample rate conversion using rubato.
//!
//! Buffers are resampled in one pass with rubato's FFT resampler, a pure
//! Rust implementation without any FFI dependencies.
//!
//! # Example
//!
//! ```rust
//! use cutset_audio::resampler::resample;
//!
//! let input = vec![0.0f32; 44100];
//! let output = resample(&input, 44100, 16000).unwrap();
//! assert_eq!(output.len(), 16000);
//! ```

use rubato::{FftFixedInOut, Resampler as _};
use thiserror::Error;

/// Frames fed to rubato per processing block.
const CHUNK_SIZE: usize = 1024;

/// Error type for resampling operations.
#[derive(Debug, Error)]
pub enum ResamplerError {
    #[error("invalid sample rate: {0}")]
    InvalidRate(u32),

    #[error("rubato error: {0}")]
    Rubato(String),
}

impl From<rubato::ResamplerConstructionError> for ResamplerError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        ResamplerError::Rubato(e.to_string())
    }
}

impl From<rubato::ResampleError> for ResamplerError {
    fn from(e: rubato::ResampleError) -> Self {
        ResamplerError::Rubato(e.to_string())
    }
}

/// Returns the number of output samples produced for `len` input samples.
pub fn output_len(len: usize, from: u32, to: u32) -> usize {
    if from == 0 {
        return 0;
    }
    (len as f64 * to as f64 / from as f64).round() as usize
}

/// Resamples mono `samples` from `from` Hz to `to` Hz.
///
/// The resampler's delay is compensated so the output is time-aligned with
/// the input and exactly [`output_len`] samples long.
pub fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, ResamplerError> {
    if from == 0 {
        return Err(ResamplerError::InvalidRate(from));
    }
    if to == 0 {
        return Err(ResamplerError::InvalidRate(to));
    }
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedInOut::<f32>::new(from as usize, to as usize, CHUNK_SIZE, 1)?;
    let delay = resampler.output_delay();
    let expected = output_len(samples.len(), from, to);

    let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut input_buf = vec![Vec::with_capacity(CHUNK_SIZE)];
    let mut output_buf = vec![Vec::new()];
    let mut pos = 0;

    // Keep feeding (zero-padded past the end) until the delayed tail is flushed.
    while output.len() < expected + delay {
        let frames_needed = resampler.input_frames_next();
        input_buf[0].clear();
        if pos < samples.len() {
            let end = (pos + frames_needed).min(samples.len());
            input_buf[0].extend_from_slice(&samples[pos..end]);
            pos = end;
        }
        input_buf[0].resize(frames_needed, 0.0);

        output_buf[0].clear();
        output_buf[0].resize(resampler.output_frames_next(), 0.0);

        let (_, written) = resampler.process_into_buffer(&input_buf, &mut output_buf, None)?;
        output.extend_from_slice(&output_buf[0][..written]);
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output)
}
