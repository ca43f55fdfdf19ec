//! Cuts: labeled time spans over recordings and feature matrices.
//!
//! A [`MonoCut`] addresses one span of one recording (and/or its
//! precomputed features). A [`MixedCut`] overlays several mono cuts, each
//! shifted by an offset and optionally scaled to a signal-to-noise ratio
//! against the first track.
//!
//! Mixing happens in two domains:
//!
//! ```text
//! load_audio     -> time domain:    out[n]    = sum(gain_i * x_i[n - off_i])
//! load_features  -> feature domain: out[t][f] = ln(sum(gain_i * exp(X_i[t - off_i][f])))
//! ```
//!
//! The two agree only approximately, so datasets that extract features on
//! the fly can differ from precomputed ones for mixed cuts.

use cutset_audio::fbank::ENERGY_FLOOR;
use cutset_audio::pcm::{energy, gain_for_snr, mix_into};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AugmentFn, DatasetError, FeatureExtractor, Features, Recording};

/// Frame shifts closer than this are treated as equal.
pub(crate) const FRAME_SHIFT_TOLERANCE: f64 = 1e-9;

/// A span `[start, start + duration)` of a single recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonoCut {
    pub id: String,
    pub start: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording: Option<Recording>,
}

impl MonoCut {
    /// Creates a cut spanning a whole recording, named after it.
    pub fn from_recording(recording: Recording) -> Self {
        Self {
            id: recording.id.clone(),
            start: 0.0,
            duration: recording.duration,
            features: None,
            recording: Some(recording),
        }
    }

    /// Creates a cut spanning whole precomputed features.
    pub fn from_features(id: impl Into<String>, features: Features) -> Self {
        Self {
            id: id.into(),
            start: features.start,
            duration: features.duration,
            features: Some(features),
            recording: None,
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = Some(features);
        self
    }

    pub fn has_features(&self) -> bool {
        self.features.is_some()
    }

    pub fn has_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Sampling rate of the recording, or of the audio the features came from.
    pub fn sampling_rate(&self) -> Option<u32> {
        self.recording
            .as_ref()
            .map(|r| r.sampling_rate)
            .or_else(|| self.features.as_ref().map(|f| f.sampling_rate))
    }

    pub fn frame_shift(&self) -> Option<f64> {
        self.features.as_ref().map(|f| f.frame_shift)
    }

    pub fn num_features(&self) -> Option<usize> {
        self.features.as_ref().map(|f| f.num_features)
    }

    /// Number of feature frames inside the cut's span.
    pub fn num_frames(&self) -> Option<usize> {
        self.features
            .as_ref()
            .map(|f| f.frame_span(self.start, Some(self.duration)).1)
    }

    /// Number of audio samples inside the cut's span.
    pub fn num_samples(&self) -> Option<usize> {
        self.recording.as_ref().map(|r| {
            let first = r.sample_index(self.start).min(r.num_samples);
            r.sample_index(self.duration).min(r.num_samples - first)
        })
    }

    pub fn load_features(&self) -> Result<Vec<Vec<f32>>, DatasetError> {
        let features = self.features.as_ref().ok_or_else(|| DatasetError::MissingFeatures {
            cut_id: self.id.clone(),
        })?;
        features.load(self.start, Some(self.duration))
    }

    pub fn load_audio(&self) -> Result<Vec<f32>, DatasetError> {
        let recording = self.recording.as_ref().ok_or_else(|| DatasetError::MissingRecording {
            cut_id: self.id.clone(),
        })?;
        recording.load_audio(self.start, Some(self.duration))
    }
}

/// A mono cut placed inside a mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixTrack {
    pub cut: MonoCut,
    /// Seconds from the start of the mix.
    #[serde(default)]
    pub offset: f64,
    /// Level in dB relative to the first track; `None` keeps the source level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snr: Option<f64>,
}

/// Several mono cuts overlaid on a common timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedCut {
    pub id: String,
    pub tracks: Vec<MixTrack>,
}

impl MixedCut {
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.offset + t.cut.duration)
            .fold(0.0, f64::max)
    }

    pub fn has_features(&self) -> bool {
        !self.tracks.is_empty() && self.tracks.iter().all(|t| t.cut.has_features())
    }

    pub fn has_recording(&self) -> bool {
        !self.tracks.is_empty() && self.tracks.iter().all(|t| t.cut.has_recording())
    }

    fn reference(&self) -> Result<&MonoCut, DatasetError> {
        self.tracks
            .first()
            .map(|t| &t.cut)
            .ok_or_else(|| DatasetError::invalid(&self.id, "mixed cut has no tracks"))
    }

    pub fn num_frames(&self) -> Option<usize> {
        let shift = self.tracks.first()?.cut.frame_shift()?;
        self.tracks
            .iter()
            .map(|t| Some(frames_at(t.offset, shift) + t.cut.num_frames()?))
            .try_fold(0, |acc, n| n.map(|n| acc.max(n)))
    }

    pub fn num_samples(&self) -> Option<usize> {
        let rate = self.tracks.first()?.cut.recording.as_ref()?.sampling_rate;
        self.tracks
            .iter()
            .map(|t| Some(samples_at(t.offset, rate) + t.cut.num_samples()?))
            .try_fold(0, |acc, n| n.map(|n| acc.max(n)))
    }

    /// Mixes the tracks' audio in the time domain.
    pub fn load_audio(&self) -> Result<Vec<f32>, DatasetError> {
        let reference = self.reference()?;
        let rate = reference
            .recording
            .as_ref()
            .map(|r| r.sampling_rate)
            .ok_or_else(|| DatasetError::MissingRecording {
                cut_id: reference.id.clone(),
            })?;

        let mut out = Vec::with_capacity(self.num_samples().unwrap_or(0));
        let mut reference_energy = 0.0;
        for (i, track) in self.tracks.iter().enumerate() {
            let track_rate = track.cut.sampling_rate().unwrap_or(rate);
            if track_rate != rate {
                return Err(DatasetError::SamplingRate {
                    expected: rate,
                    got: track_rate,
                });
            }
            let audio = track.cut.load_audio()?;
            let gain = if i == 0 {
                reference_energy = energy(&audio);
                1.0
            } else {
                track
                    .snr
                    .map_or(1.0, |snr| gain_for_snr(reference_energy, energy(&audio), snr))
            };
            mix_into(&mut out, &audio, samples_at(track.offset, rate), gain);
        }
        Ok(out)
    }

    /// Mixes the tracks' log-energy features in the power domain.
    pub fn load_features(&self) -> Result<Vec<Vec<f32>>, DatasetError> {
        let reference = self.reference()?;
        let (shift, dim) = match (reference.frame_shift(), reference.num_features()) {
            (Some(shift), Some(dim)) => (shift, dim),
            _ => {
                return Err(DatasetError::MissingFeatures {
                    cut_id: reference.id.clone(),
                });
            }
        };

        let mut power: Vec<Vec<f64>> = Vec::new();
        let mut reference_energy = 0.0;
        for (i, track) in self.tracks.iter().enumerate() {
            if let Some(track_shift) = track.cut.frame_shift() {
                if (track_shift - shift).abs() > FRAME_SHIFT_TOLERANCE {
                    return Err(DatasetError::invalid(
                        &self.id,
                        format!("track {} has frame shift {track_shift}s, expected {shift}s", track.cut.id),
                    ));
                }
            }
            let feats = track.cut.load_features()?;
            if let Some(row) = feats.iter().find(|row| row.len() != dim) {
                return Err(DatasetError::ShapeMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            let track_energy = feature_energy(&feats);
            let gain = if i == 0 {
                reference_energy = track_energy;
                1.0
            } else {
                // gain_for_snr yields an amplitude gain; features are power.
                track.snr.map_or(1.0, |snr| {
                    (gain_for_snr(reference_energy, track_energy, snr) as f64).powi(2)
                })
            };

            let offset = frames_at(track.offset, shift);
            if power.len() < offset + feats.len() {
                power.resize(offset + feats.len(), vec![0.0; dim]);
            }
            for (dst, src) in power[offset..].iter_mut().zip(&feats) {
                for (p, &v) in dst.iter_mut().zip(src) {
                    *p += gain * (v as f64).exp();
                }
            }
        }

        Ok(power
            .into_iter()
            .map(|row| row.into_iter().map(|p| p.max(ENERGY_FLOOR).ln() as f32).collect())
            .collect())
    }
}

/// A cut of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cut {
    Mono(MonoCut),
    Mixed(MixedCut),
}

impl From<MonoCut> for Cut {
    fn from(cut: MonoCut) -> Self {
        Cut::Mono(cut)
    }
}

impl From<MixedCut> for Cut {
    fn from(cut: MixedCut) -> Self {
        Cut::Mixed(cut)
    }
}

impl Cut {
    pub fn id(&self) -> &str {
        match self {
            Cut::Mono(c) => &c.id,
            Cut::Mixed(c) => &c.id,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Cut::Mono(c) => c.duration,
            Cut::Mixed(c) => c.duration(),
        }
    }

    pub fn has_features(&self) -> bool {
        match self {
            Cut::Mono(c) => c.has_features(),
            Cut::Mixed(c) => c.has_features(),
        }
    }

    pub fn has_recording(&self) -> bool {
        match self {
            Cut::Mono(c) => c.has_recording(),
            Cut::Mixed(c) => c.has_recording(),
        }
    }

    pub fn sampling_rate(&self) -> Option<u32> {
        match self {
            Cut::Mono(c) => c.sampling_rate(),
            Cut::Mixed(c) => c.tracks.first()?.cut.sampling_rate(),
        }
    }

    pub fn frame_shift(&self) -> Option<f64> {
        match self {
            Cut::Mono(c) => c.frame_shift(),
            Cut::Mixed(c) => c.tracks.first()?.cut.frame_shift(),
        }
    }

    pub fn num_features(&self) -> Option<usize> {
        match self {
            Cut::Mono(c) => c.num_features(),
            Cut::Mixed(c) => c.tracks.first()?.cut.num_features(),
        }
    }

    pub fn num_frames(&self) -> Option<usize> {
        match self {
            Cut::Mono(c) => c.num_frames(),
            Cut::Mixed(c) => c.num_frames(),
        }
    }

    pub fn num_samples(&self) -> Option<usize> {
        match self {
            Cut::Mono(c) => c.num_samples(),
            Cut::Mixed(c) => c.num_samples(),
        }
    }

    /// Loads the precomputed features of the cut's span.
    pub fn load_features(&self) -> Result<Vec<Vec<f32>>, DatasetError> {
        match self {
            Cut::Mono(c) => c.load_features(),
            Cut::Mixed(c) => c.load_features(),
        }
    }

    /// Loads the cut's mono audio.
    pub fn load_audio(&self) -> Result<Vec<f32>, DatasetError> {
        match self {
            Cut::Mono(c) => c.load_audio(),
            Cut::Mixed(c) => c.load_audio(),
        }
    }

    /// Loads the cut's audio, optionally augments it, and extracts features.
    pub fn compute_features(
        &self,
        extractor: &dyn FeatureExtractor,
        augment: Option<&dyn AugmentFn>,
    ) -> Result<Vec<Vec<f32>>, DatasetError> {
        let rate = self.sampling_rate().ok_or_else(|| DatasetError::MissingRecording {
            cut_id: self.id().to_string(),
        })?;
        let mut audio = self.load_audio()?;
        if let Some(augment) = augment {
            audio = augment.augment(audio, rate)?;
        }
        let feats = extractor.extract(&audio, rate)?;
        if feats.is_empty() {
            warn!(cut_id = self.id(), samples = audio.len(), "cut too short for a single frame");
        }
        Ok(feats)
    }

    /// Overlays `other` onto this cut, starting `offset` seconds in.
    ///
    /// The result is always flat: mixed inputs contribute their tracks,
    /// with `other`'s tracks shifted by `offset`. `snr` applies to every
    /// track contributed by `other`.
    pub fn mix(&self, other: &Cut, offset: f64, snr: Option<f64>) -> Result<Cut, DatasetError> {
        if offset < 0.0 {
            return Err(DatasetError::invalid(self.id(), format!("negative mix offset {offset}")));
        }
        if let (Some(a), Some(b)) = (self.sampling_rate(), other.sampling_rate()) {
            if a != b {
                return Err(DatasetError::SamplingRate { expected: a, got: b });
            }
        }
        if let (Some(a), Some(b)) = (self.frame_shift(), other.frame_shift()) {
            if (a - b).abs() > FRAME_SHIFT_TOLERANCE {
                return Err(DatasetError::invalid(
                    self.id(),
                    format!("frame shift {a}s does not match {} ({b}s)", other.id()),
                ));
            }
        }
        if let (Some(a), Some(b)) = (self.num_features(), other.num_features()) {
            if a != b {
                return Err(DatasetError::ShapeMismatch { expected: a, got: b });
            }
        }

        let mut tracks = self.tracks();
        tracks.extend(other.tracks().into_iter().map(|t| MixTrack {
            offset: t.offset + offset,
            snr: snr.or(t.snr),
            cut: t.cut,
        }));
        Ok(Cut::Mixed(MixedCut {
            id: format!("mix-{}-{}", self.id(), other.id()),
            tracks,
        }))
    }

    fn tracks(&self) -> Vec<MixTrack> {
        match self {
            Cut::Mono(c) => vec![MixTrack {
                cut: c.clone(),
                offset: 0.0,
                snr: None,
            }],
            Cut::Mixed(c) => c.tracks.clone(),
        }
    }
}

fn frames_at(seconds: f64, frame_shift: f64) -> usize {
    (seconds / frame_shift).round() as usize
}

fn samples_at(seconds: f64, sampling_rate: u32) -> usize {
    (seconds * sampling_rate as f64).round() as usize
}

/// Mean power of a log-energy matrix.
fn feature_energy(feats: &[Vec<f32>]) -> f64 {
    let count: usize = feats.iter().map(Vec::len).sum();
    if count == 0 {
        return 0.0;
    }
    feats.iter().flatten().map(|&v| (v as f64).exp()).sum::<f64>() / count as f64
}
