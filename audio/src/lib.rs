//! Audio processing utilities.
//!
//! This crate provides the signal-level building blocks used by the
//! cut datasets:
//!
//! - `pcm`: sample formats, int16/float conversion and time-domain mixing
//! - `resampler`: sample rate conversion backed by rubato
//! - `wav`: reading and writing WAV files
//! - `fbank`: log mel filterbank feature extraction
//!
//! # Example
//!
//! ```rust
//! use cutset_audio::fbank::{Config, Extractor};
//! use cutset_audio::pcm::Format;
//!
//! let format = Format::MONO_16K;
//! let samples = vec![0.0f32; format.samples_in(1.0)];
//!
//! let extractor = Extractor::new(Config::default());
//! let features = extractor.extract(&samples).unwrap();
//! assert_eq!(features.len(), 98);
//! ```

pub mod fbank;
pub mod pcm;
pub mod resampler;
pub mod wav;

pub use pcm::Format;
