//! WAV file reading and writing.
//!
//! Samples are exchanged as normalized `f32` in [-1, 1], interleaved when
//! the file has more than one channel. Integer files of 8 to 32 bits and
//! 32-bit float files are accepted on read; files are always written as
//! 16-bit PCM.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use thiserror::Error;

use crate::pcm::{Format, f32_to_i16};

/// Errors returned by WAV operations.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("wav error: {0}")]
    Hound(#[from] hound::Error),

    #[error("unsupported sample format: {bits}-bit {format:?}")]
    Unsupported { bits: u16, format: SampleFormat },

    #[error("segment out of range: offset {offset} + {len} > {total} frames")]
    OutOfRange { offset: usize, len: usize, total: usize },
}

/// Header information of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub format: Format,
    /// Number of frames (samples per channel).
    pub num_frames: usize,
}

impl WavInfo {
    /// Returns the duration of the file in seconds.
    pub fn duration(&self) -> f64 {
        self.format.duration_of(self.num_frames)
    }
}

/// Reads the header of a WAV file without decoding samples.
pub fn probe(path: impl AsRef<Path>) -> Result<WavInfo, WavError> {
    let reader = WavReader::open(path)?;
    Ok(info_of(&reader))
}

/// Reads a whole WAV file.
pub fn read(path: impl AsRef<Path>) -> Result<(WavInfo, Vec<f32>), WavError> {
    let mut reader = WavReader::open(path)?;
    let info = info_of(&reader);
    let samples = decode(&mut reader, info.num_frames * info.format.channels as usize)?;
    Ok((info, samples))
}

/// Reads `len` frames starting at frame `offset`.
pub fn read_segment(
    path: impl AsRef<Path>,
    offset: usize,
    len: usize,
) -> Result<(WavInfo, Vec<f32>), WavError> {
    let mut reader = WavReader::open(path)?;
    let info = info_of(&reader);
    if offset + len > info.num_frames {
        return Err(WavError::OutOfRange {
            offset,
            len,
            total: info.num_frames,
        });
    }
    reader.seek(offset as u32).map_err(hound::Error::from)?;
    let samples = decode(&mut reader, len * info.format.channels as usize)?;
    Ok((info, samples))
}

/// Writes interleaved samples as a 16-bit PCM WAV file.
pub fn write(path: impl AsRef<Path>, format: Format, samples: &[f32]) -> Result<(), WavError> {
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for s in f32_to_i16(samples) {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

fn info_of(reader: &WavReader<BufReader<File>>) -> WavInfo {
    let spec = reader.spec();
    WavInfo {
        format: Format::new(spec.sample_rate, spec.channels),
        num_frames: reader.duration() as usize,
    }
}

fn decode(reader: &mut WavReader<BufReader<File>>, count: usize) -> Result<Vec<f32>, WavError> {
    let spec = reader.spec();
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .take(count)
            .map(|s| s.map_err(WavError::from))
            .collect(),
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .take(count)
                .map(|s| s.map(|v| v as f32 / scale).map_err(WavError::from))
                .collect()
        }
        (format, bits) => Err(WavError::Unsupported { bits, format }),
    }
}
