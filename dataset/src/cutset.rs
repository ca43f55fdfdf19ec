//! Ordered collections of cuts with unique ids.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::features::write_matrix;
use crate::{Cut, DatasetError, FeatureExtractor, FeatureStorage, Features, MixTrack, MixedCut, MonoCut};

/// An ordered set of cuts, addressable by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutSet {
    cuts: Vec<Cut>,
    index: HashMap<String, usize>,
}

impl CutSet {
    /// Builds a set, rejecting duplicate ids.
    pub fn from_cuts<I>(cuts: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator,
        I::Item: Into<Cut>,
    {
        let mut set = CutSet::default();
        for cut in cuts {
            set.push(cut.into())?;
        }
        Ok(set)
    }

    fn push(&mut self, cut: Cut) -> Result<(), DatasetError> {
        if self.index.contains_key(cut.id()) {
            return Err(DatasetError::DuplicateCut(cut.id().to_string()));
        }
        self.index.insert(cut.id().to_string(), self.cuts.len());
        self.cuts.push(cut);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cut> {
        self.cuts.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Cut> {
        self.index.get(id).map(|&i| &self.cuts[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cuts.iter().map(Cut::id)
    }

    /// Sum of all cut durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.cuts.iter().map(Cut::duration).sum()
    }

    /// Selects cuts by id, in the order the ids are given.
    ///
    /// Unknown ids are an error; repeated ids are too, since a set cannot
    /// hold the same cut twice.
    pub fn subset<I, S>(&self, ids: I) -> Result<CutSet, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = CutSet::default();
        for id in ids {
            let id = id.as_ref();
            let cut = self.get(id).ok_or_else(|| DatasetError::UnknownCut(id.to_string()))?;
            out.push(cut.clone())?;
        }
        debug!(requested = out.len(), total = self.len(), "subset cuts");
        Ok(out)
    }

    /// Keeps the cuts for which `pred` returns true.
    pub fn filter(&self, mut pred: impl FnMut(&Cut) -> bool) -> CutSet {
        let kept = self.cuts.iter().filter(|&c| pred(c)).cloned();
        // Ids stay unique, so this cannot fail.
        let mut out = CutSet::default();
        for cut in kept {
            out.index.insert(cut.id().to_string(), out.cuts.len());
            out.cuts.push(cut);
        }
        out
    }

    /// Extracts features for every cut's audio and attaches them.
    ///
    /// Mono cuts get one matrix covering their span; mixed cuts get one per
    /// track, so they can still be mixed in the feature domain. With
    /// `output_dir` set, matrices are written there as raw `.f32` files
    /// named after the cut id (`<mix id>.track<i>` for mixed tracks), with
    /// path separators and other unsafe characters replaced by `_`;
    /// otherwise they are kept in memory.
    pub fn compute_and_store_features(
        &self,
        extractor: &dyn FeatureExtractor,
        output_dir: Option<&Path>,
    ) -> Result<CutSet, DatasetError> {
        if let Some(dir) = output_dir {
            std::fs::create_dir_all(dir)?;
        }
        let mut names = FileNames::default();
        let mut out = CutSet::default();
        for cut in &self.cuts {
            let cut = match cut {
                Cut::Mono(c) => {
                    let path = output_dir.map(|dir| names.path(dir, &c.id));
                    Cut::Mono(attach_features(c, extractor, path)?)
                }
                Cut::Mixed(m) => Cut::Mixed(MixedCut {
                    id: m.id.clone(),
                    tracks: m
                        .tracks
                        .iter()
                        .enumerate()
                        .map(|(i, t)| {
                            let path = output_dir.map(|dir| names.path(dir, &format!("{}.track{i}", m.id)));
                            Ok(MixTrack {
                                cut: attach_features(&t.cut, extractor, path)?,
                                offset: t.offset,
                                snr: t.snr,
                            })
                        })
                        .collect::<Result<_, DatasetError>>()?,
                }),
            };
            out.push(cut)?;
        }
        info!(
            cuts = out.len(),
            extractor = extractor.name(),
            on_disk = output_dir.is_some(),
            "computed features"
        );
        Ok(out)
    }
}

/// Hands out distinct feature file names within one output directory.
#[derive(Default)]
struct FileNames {
    used: HashSet<String>,
}

impl FileNames {
    fn path(&mut self, dir: &Path, name: &str) -> PathBuf {
        let stem: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        let stem = if stem.is_empty() || stem.starts_with('.') {
            format!("_{stem}")
        } else {
            stem
        };
        let mut candidate = stem.clone();
        let mut n = 1;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{stem}-{n}");
            n += 1;
        }
        dir.join(format!("{candidate}.f32"))
    }
}

fn attach_features(
    cut: &MonoCut,
    extractor: &dyn FeatureExtractor,
    path: Option<PathBuf>,
) -> Result<MonoCut, DatasetError> {
    let rate = cut.sampling_rate().ok_or_else(|| DatasetError::MissingRecording {
        cut_id: cut.id.clone(),
    })?;
    let matrix = extractor.extract(&cut.load_audio()?, rate)?;
    let num_frames = matrix.len();
    let storage = match path {
        Some(path) => {
            write_matrix(&path, &matrix)?;
            FeatureStorage::File { path }
        }
        None => FeatureStorage::Memory { data: matrix },
    };
    Ok(cut.clone().with_features(Features {
        feature_type: extractor.name().to_string(),
        num_frames,
        num_features: extractor.feature_dim(),
        frame_shift: extractor.frame_shift(),
        sampling_rate: rate,
        start: cut.start,
        duration: cut.duration,
        storage,
    }))
}

impl<'a> IntoIterator for &'a CutSet {
    type Item = &'a Cut;
    type IntoIter = std::slice::Iter<'a, Cut>;

    fn into_iter(self) -> Self::IntoIter {
        self.cuts.iter()
    }
}

impl IntoIterator for CutSet {
    type Item = Cut;
    type IntoIter = std::vec::IntoIter<Cut>;

    fn into_iter(self) -> Self::IntoIter {
        self.cuts.into_iter()
    }
}
