//! Random-access datasets over collections of speech cuts.
//!
//! This crate provides:
//! - [`Cut`], [`MonoCut`] and [`MixedCut`]: spans of recordings and/or
//!   precomputed features, optionally overlaid
//! - [`CutSet`]: an ordered, id-addressable collection with JSON manifests
//! - [`FeatureDataset`], [`WaveformDataset`] and [`OnTheFlyDataset`]:
//!   map a batch of cut ids to padded tensors
//! - [`CutSampler`] and [`DataLoader`]: batch iteration over a dataset
//!
//! # Example
//!
//! ```rust
//! use cutset_dataset::{CutSet, Dataset, MonoCut, Recording, WaveformDataset};
//!
//! let cuts = CutSet::from_cuts(vec![
//!     MonoCut::from_recording(Recording::from_samples("a", vec![0.1; 1600], 16000)),
//!     MonoCut::from_recording(Recording::from_samples("b", vec![0.2; 800], 16000)),
//! ])?;
//!
//! let dataset = WaveformDataset::new(cuts)?;
//! let batch = dataset.get_item(["a", "b"])?;
//! assert_eq!(batch.audio.shape(), [2, 1600]);
//! assert_eq!(batch.audio_lens, vec![1600, 800]);
//! # Ok::<(), cutset_dataset::DatasetError>(())
//! ```

mod augment;
mod collation;
mod cut;
mod cutset;
mod dataset;
mod error;
mod extractor;
mod features;
mod loader;
pub mod manifest;
mod recording;
mod sampler;
mod tensor;
mod validate;

pub use augment::*;
pub use collation::*;
pub use cut::*;
pub use cutset::*;
pub use dataset::*;
pub use error::*;
pub use extractor::*;
pub use features::*;
pub use loader::*;
pub use recording::*;
pub use sampler::*;
pub use tensor::*;
pub use validate::*;

#[cfg(test)]
mod tests;
