//! PCM (Pulse Code Modulation) sample handling.
//!
//! This module provides types and utilities for working with PCM audio data
//! held as normalized `f32` samples in the range [-1, 1].
//!
//! # Key Items
//!
//! - [`Format`]: Sample rate and channel count of a buffer
//! - [`i16_to_f32`] / [`f32_to_i16`]: Conversion to and from 16-bit PCM
//! - [`downmix`]: Interleaved multi-channel to mono
//! - [`mix_into`]: Time-domain mixing with a linear gain
//! - [`gain_for_snr`]: Gain that places a source at a given SNR
//!
//! # Example
//!
//! ```rust
//! use cutset_audio::pcm::{energy, gain_for_snr, mix_into};
//!
//! let mut speech = vec![0.5f32; 160];
//! let noise = vec![0.25f32; 80];
//!
//! let gain = gain_for_snr(energy(&speech), energy(&noise), 10.0);
//! mix_into(&mut speech, &noise, 40, gain);
//! assert_eq!(speech.len(), 160);
//! ```

mod convert;
mod format;
mod mix;

pub use convert::{bytes_to_f32, downmix, f32_to_i16, i16_to_f32};
pub use format::Format;
pub use mix::{energy, gain_for_snr, mix_into, peak};
