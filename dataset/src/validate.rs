//! Manifest consistency checks.

use crate::cut::FRAME_SHIFT_TOLERANCE;
use crate::{Cut, CutSet, DatasetError, MixedCut, MonoCut};

/// Slack allowed when comparing spans computed from rounded sample counts.
const TOLERANCE: f64 = 1e-3;

/// Checks every cut in the set; returns the first problem found.
pub fn validate(cuts: &CutSet) -> Result<(), DatasetError> {
    cuts.iter().try_for_each(validate_cut)
}

pub fn validate_cut(cut: &Cut) -> Result<(), DatasetError> {
    match cut {
        Cut::Mono(c) => validate_mono(c),
        Cut::Mixed(c) => validate_mixed(c),
    }
}

fn validate_mono(cut: &MonoCut) -> Result<(), DatasetError> {
    let id = cut.id.as_str();
    if id.is_empty() {
        return Err(DatasetError::invalid(id, "empty id"));
    }
    if cut.start < 0.0 {
        return Err(DatasetError::invalid(id, format!("negative start {}", cut.start)));
    }
    if !(cut.duration > 0.0) {
        return Err(DatasetError::invalid(id, format!("non-positive duration {}", cut.duration)));
    }

    if let Some(rec) = &cut.recording {
        if rec.sampling_rate == 0 {
            return Err(DatasetError::invalid(id, "recording has a zero sampling rate"));
        }
        if cut.end() > rec.duration + TOLERANCE {
            return Err(DatasetError::invalid(
                id,
                format!("ends at {}s past recording {} ({}s)", cut.end(), rec.id, rec.duration),
            ));
        }
    }

    if let Some(feats) = &cut.features {
        if !(feats.frame_shift > 0.0) {
            return Err(DatasetError::invalid(id, "features have a non-positive frame shift"));
        }
        if feats.num_features == 0 {
            return Err(DatasetError::invalid(id, "features have zero dimensions"));
        }
        if cut.start + TOLERANCE < feats.start || cut.end() > feats.start + feats.duration + TOLERANCE {
            return Err(DatasetError::invalid(
                id,
                format!(
                    "span [{}, {}) is outside features [{}, {})",
                    cut.start,
                    cut.end(),
                    feats.start,
                    feats.start + feats.duration
                ),
            ));
        }
        if let Some(rec) = &cut.recording {
            if rec.sampling_rate != feats.sampling_rate {
                return Err(DatasetError::invalid(
                    id,
                    format!(
                        "features were computed at {} Hz but the recording is {} Hz",
                        feats.sampling_rate, rec.sampling_rate
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn validate_mixed(cut: &MixedCut) -> Result<(), DatasetError> {
    let id = cut.id.as_str();
    if id.is_empty() {
        return Err(DatasetError::invalid(id, "empty id"));
    }
    let Some(first) = cut.tracks.first() else {
        return Err(DatasetError::invalid(id, "mixed cut has no tracks"));
    };
    let rate = first.cut.sampling_rate();
    // Tracks with features are summed frame by frame and must agree.
    let reference = cut.tracks.iter().find_map(|t| t.cut.features.as_ref());

    for track in &cut.tracks {
        if track.offset < 0.0 {
            return Err(DatasetError::invalid(id, format!("negative track offset {}", track.offset)));
        }
        if track.cut.sampling_rate() != rate {
            return Err(DatasetError::invalid(
                id,
                format!("track {} has a different sampling rate", track.cut.id),
            ));
        }
        if let (Some(reference), Some(feats)) = (reference, &track.cut.features) {
            if (feats.frame_shift - reference.frame_shift).abs() > FRAME_SHIFT_TOLERANCE {
                return Err(DatasetError::invalid(
                    id,
                    format!(
                        "track {} has frame shift {}s, expected {}s",
                        track.cut.id, feats.frame_shift, reference.frame_shift
                    ),
                ));
            }
            if feats.num_features != reference.num_features {
                return Err(DatasetError::invalid(
                    id,
                    format!(
                        "track {} has {} feature dimensions, expected {}",
                        track.cut.id, feats.num_features, reference.num_features
                    ),
                ));
            }
        }
        validate_mono(&track.cut)?;
    }
    Ok(())
}
