//! Precomputed feature matrices attached to cuts.
//!
//! File storage is a headerless row-major buffer of little-endian `f32`,
//! `num_frames * num_features` values long.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// Where a feature matrix lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureStorage {
    Memory { data: Vec<Vec<f32>> },
    File { path: PathBuf },
}

/// A `[num_frames][num_features]` matrix covering `[start, start + duration)`
/// of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub feature_type: String,
    pub num_frames: usize,
    pub num_features: usize,
    /// Seconds between consecutive frames.
    pub frame_shift: f64,
    pub sampling_rate: u32,
    pub start: f64,
    pub duration: f64,
    pub storage: FeatureStorage,
}

impl Features {
    /// Converts a time in seconds (recording timeline) to a frame index.
    pub fn frame_index(&self, seconds: f64) -> usize {
        ((seconds - self.start).max(0.0) / self.frame_shift).round() as usize
    }

    /// Returns the `(first_frame, num_frames)` window covering a time span,
    /// clipped to the stored frames.
    pub fn frame_span(&self, start: f64, duration: Option<f64>) -> (usize, usize) {
        let first = self.frame_index(start).min(self.num_frames);
        let available = self.num_frames - first;
        let len = duration
            .map(|d| ((d / self.frame_shift).round() as usize).min(available))
            .unwrap_or(available);
        (first, len)
    }

    /// Loads the frames covering `[start, start + duration)`.
    pub fn load(&self, start: f64, duration: Option<f64>) -> Result<Vec<Vec<f32>>, DatasetError> {
        let (first, len) = self.frame_span(start, duration);
        match &self.storage {
            FeatureStorage::Memory { data } => {
                if data.len() < first + len {
                    return Err(DatasetError::ShapeMismatch {
                        expected: first + len,
                        got: data.len(),
                    });
                }
                Ok(data[first..first + len].to_vec())
            }
            FeatureStorage::File { path } => read_frames(path, first, len, self.num_features),
        }
    }
}

/// Writes a matrix to `path` in the raw `f32` layout.
pub fn write_matrix(path: impl AsRef<Path>, matrix: &[Vec<f32>]) -> Result<(), DatasetError> {
    let cols = matrix.first().map_or(0, Vec::len);
    let mut buf = Vec::with_capacity(matrix.len() * cols * 4);
    for row in matrix {
        if row.len() != cols {
            return Err(DatasetError::ShapeMismatch {
                expected: cols,
                got: row.len(),
            });
        }
        for v in row {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    fs::write(path, buf)?;
    Ok(())
}

fn read_frames(
    path: &Path,
    first: usize,
    len: usize,
    num_features: usize,
) -> Result<Vec<Vec<f32>>, DatasetError> {
    let row_bytes = num_features * 4;
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start((first * row_bytes) as u64))?;

    let mut buf = vec![0u8; len * row_bytes];
    file.read_exact(&mut buf)?;

    Ok(buf
        .chunks_exact(row_bytes.max(1))
        .take(len)
        .map(|row| {
            row.chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        })
        .collect())
}
