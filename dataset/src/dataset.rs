//! Random-access datasets over a [`CutSet`].
//!
//! Each dataset maps a batch of cut ids to a padded tensor payload:
//!
//! | Dataset             | Requires    | Payload                                  |
//! |---------------------|-------------|------------------------------------------|
//! | [`FeatureDataset`]  | features    | [`FeatureBatch`] `(B x T x F)` + lengths |
//! | [`WaveformDataset`] | recordings  | [`AudioBatch`] `(B x N)` + lengths       |
//! | [`OnTheFlyDataset`] | recordings  | `(B x T x F)` extracted at fetch time    |
//!
//! The requirement is checked for every cut when the dataset is built, so a
//! dataset that exists can always serve any of its ids.
//!
//! # Mixed cuts
//!
//! [`FeatureDataset`] mixes [`MixedCut`](crate::MixedCut) tracks in the
//! feature domain, [`OnTheFlyDataset`] mixes them in the time domain before
//! extraction. Un-mixed cuts yield the same features from both.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::collation::{collate_audio, collate_features, collate_matrices};
use crate::{AugmentFn, CutSet, DatasetError, FeatureExtractor, Tensor2, Tensor3, validate};

/// A dataset indexed by batches of cut ids.
pub trait Dataset {
    type Item;

    /// The cuts the dataset serves.
    fn cuts(&self) -> &CutSet;

    /// Number of cuts the dataset can serve.
    fn len(&self) -> usize {
        self.cuts().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the payload for `cut_ids`, in the order given.
    fn get_item<I, S>(&self, cut_ids: I) -> Result<Self::Item, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;
}

/// The modality a dataset needs every cut to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Features,
    Recording,
}

/// Validates the manifest and checks that every cut meets `requirement`.
///
/// Fails on the first offending cut.
pub fn check_requirement(cuts: &CutSet, requirement: Requirement) -> Result<(), DatasetError> {
    validate(cuts)?;
    let missing = cuts.iter().find(|cut| match requirement {
        Requirement::Features => !cut.has_features(),
        Requirement::Recording => !cut.has_recording(),
    });
    match (missing, requirement) {
        (None, _) => Ok(()),
        (Some(cut), Requirement::Features) => Err(DatasetError::MissingFeatures {
            cut_id: cut.id().to_string(),
        }),
        (Some(cut), Requirement::Recording) => Err(DatasetError::MissingRecording {
            cut_id: cut.id().to_string(),
        }),
    }
}

/// Padded precomputed features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBatch {
    /// `(B x T x F)`, padded with [`LOG_EPSILON`](crate::LOG_EPSILON).
    pub features: Tensor3,
    /// Frames per item before padding.
    pub features_lens: Vec<usize>,
}

/// Padded mono waveforms.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBatch {
    /// `(B x NumSamples)`, zero-padded.
    pub audio: Tensor2,
    /// Samples per item before padding.
    pub audio_lens: Vec<usize>,
}

/// Serves precomputed features.
#[derive(Debug, Clone)]
pub struct FeatureDataset {
    cuts: CutSet,
}

impl FeatureDataset {
    /// Fails if any cut lacks precomputed features.
    pub fn new(cuts: CutSet) -> Result<Self, DatasetError> {
        check_requirement(&cuts, Requirement::Features)?;
        Ok(Self { cuts })
    }
}

impl Dataset for FeatureDataset {
    type Item = FeatureBatch;

    fn cuts(&self) -> &CutSet {
        &self.cuts
    }

    fn get_item<I, S>(&self, cut_ids: I) -> Result<FeatureBatch, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cuts = self.cuts.subset(cut_ids)?;
        let (features, features_lens) = collate_features(&cuts)?;
        Ok(FeatureBatch {
            features,
            features_lens,
        })
    }
}

/// Serves raw mono waveforms.
#[derive(Debug, Clone)]
pub struct WaveformDataset {
    cuts: CutSet,
}

impl WaveformDataset {
    /// Fails if any cut lacks a recording.
    pub fn new(cuts: CutSet) -> Result<Self, DatasetError> {
        check_requirement(&cuts, Requirement::Recording)?;
        Ok(Self { cuts })
    }
}

impl Dataset for WaveformDataset {
    type Item = AudioBatch;

    fn cuts(&self) -> &CutSet {
        &self.cuts
    }

    fn get_item<I, S>(&self, cut_ids: I) -> Result<AudioBatch, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cuts = self.cuts.subset(cut_ids)?;
        let (audio, audio_lens) = collate_audio(&cuts)?;
        Ok(AudioBatch { audio, audio_lens })
    }
}

/// Extracts features from recordings when a batch is requested.
#[derive(Clone)]
pub struct OnTheFlyDataset {
    cuts: CutSet,
    extractor: Arc<dyn FeatureExtractor>,
    augment: Option<Arc<dyn AugmentFn>>,
}

impl OnTheFlyDataset {
    /// Fails if any cut lacks a recording.
    pub fn new(
        extractor: Arc<dyn FeatureExtractor>,
        cuts: CutSet,
        augment: Option<Arc<dyn AugmentFn>>,
    ) -> Result<Self, DatasetError> {
        check_requirement(&cuts, Requirement::Recording)?;
        Ok(Self {
            cuts,
            extractor,
            augment,
        })
    }
}

impl fmt::Debug for OnTheFlyDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnTheFlyDataset")
            .field("cuts", &self.cuts.len())
            .field("extractor", &self.extractor.name())
            .field("augment", &self.augment.is_some())
            .finish()
    }
}

impl Dataset for OnTheFlyDataset {
    type Item = Tensor3;

    fn cuts(&self) -> &CutSet {
        &self.cuts
    }

    fn get_item<I, S>(&self, cut_ids: I) -> Result<Tensor3, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cuts = self.cuts.subset(cut_ids)?;
        let matrices = cuts
            .iter()
            .map(|cut| cut.compute_features(self.extractor.as_ref(), self.augment.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(batch = matrices.len(), extractor = self.extractor.name(), "extracted on the fly");
        collate_matrices(matrices, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cut, Fbank, FeatureStorage, Features, MonoCut, Recording};

    fn with_audio(id: &str, len: usize) -> MonoCut {
        MonoCut::from_recording(Recording::from_samples(id, vec![0.1; len], 100))
    }

    fn with_feats(id: &str, frames: usize) -> MonoCut {
        MonoCut::from_features(
            id,
            Features {
                feature_type: "test".into(),
                num_frames: frames,
                num_features: 2,
                frame_shift: 0.01,
                sampling_rate: 100,
                start: 0.0,
                duration: frames as f64 * 0.01,
                storage: FeatureStorage::Memory {
                    data: (0..frames).map(|t| vec![t as f32, -(t as f32)]).collect(),
                },
            },
        )
    }

    #[test]
    fn test_requirement_names_first_offender() {
        let cuts = CutSet::from_cuts(vec![with_feats("a", 3), with_audio("b", 10), with_audio("c", 10)]).unwrap();
        match FeatureDataset::new(cuts) {
            Err(DatasetError::MissingFeatures { cut_id }) => assert_eq!(cut_id, "b"),
            other => panic!("unexpected {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_feature_dataset_batch() {
        let cuts = CutSet::from_cuts(vec![with_feats("a", 3), with_feats("b", 5)]).unwrap();
        let ds = FeatureDataset::new(cuts).unwrap();
        assert_eq!(ds.len(), 2);

        let batch = ds.get_item(["b", "a"]).unwrap();
        assert_eq!(batch.features.shape(), [2, 5, 2]);
        assert_eq!(batch.features_lens, vec![5, 3]);
        assert_eq!(batch.features.frame(1, 2), &[2.0, -2.0]);
        assert_eq!(batch.features.frame(1, 3), &[crate::LOG_EPSILON; 2]);
    }

    #[test]
    fn test_waveform_dataset_batch() {
        let cuts = CutSet::from_cuts(vec![with_audio("a", 30), with_audio("b", 10)]).unwrap();
        let ds = WaveformDataset::new(cuts).unwrap();

        let batch = ds.get_item(vec!["b".to_string()]).unwrap();
        assert_eq!(batch.audio.shape(), [1, 10]);
        assert_eq!(batch.audio_lens, vec![10]);
    }

    #[test]
    fn test_waveform_dataset_requires_recordings() {
        let cuts = CutSet::from_cuts(vec![with_feats("a", 3)]).unwrap();
        assert!(matches!(
            WaveformDataset::new(cuts),
            Err(DatasetError::MissingRecording { .. })
        ));
    }

    #[test]
    fn test_validation_runs_before_requirement() {
        let mut bad = with_feats("a", 3);
        bad.duration = -1.0;
        let cuts = CutSet::from_cuts(vec![bad]).unwrap();
        assert!(matches!(
            FeatureDataset::new(cuts),
            Err(DatasetError::Validation { .. })
        ));
    }

    #[test]
    fn test_unknown_id_propagates() {
        let cuts = CutSet::from_cuts(vec![with_audio("a", 10)]).unwrap();
        let ds = WaveformDataset::new(cuts).unwrap();
        assert!(matches!(ds.get_item(["nope"]), Err(DatasetError::UnknownCut(_))));
    }

    #[test]
    fn test_mixed_cut_needs_every_track() {
        let a: Cut = with_feats("a", 3).into();
        let b: Cut = with_audio("b", 10).into();
        let mix = a.mix(&b, 0.0, None).unwrap();
        assert!(!mix.has_features());
        assert!(!mix.has_recording());
    }

    #[test]
    fn test_on_the_fly_clone_and_debug() {
        let cuts = CutSet::from_cuts(vec![with_audio("a", 10)]).unwrap();
        let ds = OnTheFlyDataset::new(Arc::new(Fbank::default()), cuts, None).unwrap();
        let copy = ds.clone();
        assert_eq!(copy.len(), 1);
        assert!(Arc::ptr_eq(&ds.extractor, &copy.extractor));
        let debug = format!("{:?}", ds);
        assert!(debug.contains("OnTheFlyDataset"));
        assert!(debug.contains("fbank"));
    }

    #[test]
    fn test_empty_dataset() {
        let ds = FeatureDataset::new(CutSet::default()).unwrap();
        assert!(ds.is_empty());
        let batch = ds.get_item(Vec::<String>::new()).unwrap();
        assert_eq!(batch.features.shape(), [0, 0, 0]);
    }
}
