//! PCM audio format definitions.

/// Describes the layout of a PCM buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Sample rate in Hz (e.g., 16000, 44100).
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl Format {
    /// Creates a mono format with the given sample rate.
    pub const fn mono(sample_rate: u32) -> Self {
        Self { sample_rate, channels: 1 }
    }

    /// Creates a format with the given sample rate and channel count.
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self { sample_rate, channels }
    }

    /// Returns the number of samples per channel covering `seconds`.
    pub fn samples_in(&self, seconds: f64) -> usize {
        if seconds <= 0.0 {
            return 0;
        }
        (seconds * self.sample_rate as f64).round() as usize
    }

    /// Returns the duration in seconds of `samples` samples per channel.
    pub fn duration_of(&self, samples: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        samples as f64 / self.sample_rate as f64
    }
}

// Common format presets
impl Format {
    /// 8kHz mono (telephony)
    pub const MONO_8K: Format = Format::mono(8000);
    /// 16kHz mono (common for ASR corpora)
    pub const MONO_16K: Format = Format::mono(16000);
    /// 24kHz mono
    pub const MONO_24K: Format = Format::mono(24000);
    /// 48kHz mono
    pub const MONO_48K: Format = Format::mono(48000);
}
