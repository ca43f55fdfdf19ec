//! Integration tests for the dataset module.

use super::*;
use cutset_audio::fbank::Config;
use cutset_audio::pcm::Format;
use cutset_audio::wav;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

fn sine(freq: f32, seconds: f64, format: Format) -> Vec<f32> {
    let rate = format.sample_rate as f32;
    (0..format.samples_in(seconds))
        .map(|n| 0.3 * (2.0 * std::f32::consts::PI * freq * n as f32 / rate).sin())
        .collect()
}

fn write_wav(dir: &Path, name: &str, samples: &[f32], format: Format) -> Recording {
    let path = dir.join(format!("{name}.wav"));
    wav::write(&path, format, samples).unwrap();
    Recording::from_wav(name, path).unwrap()
}

/// Three 16 kHz recordings of 1.0, 0.5 and 0.75 seconds.
fn corpus(dir: &Path) -> CutSet {
    let f = Format::MONO_16K;
    CutSet::from_cuts(vec![
        MonoCut::from_recording(write_wav(dir, "a", &sine(440.0, 1.0, f), f)),
        MonoCut::from_recording(write_wav(dir, "b", &sine(880.0, 0.5, f), f)),
        MonoCut::from_recording(write_wav(dir, "c", &sine(220.0, 0.75, f), f)),
    ])
    .unwrap()
}

fn fbank() -> Arc<Fbank> {
    Arc::new(Fbank::new(Config {
        num_mels: 40,
        ..Config::default()
    }))
}

fn max_abs_diff(a: &Tensor3, b: &Tensor3) -> f32 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_all_error_types() {
    let _ = DatasetError::MissingFeatures { cut_id: "a".into() }.to_string();
    let _ = DatasetError::MissingRecording { cut_id: "a".into() }.to_string();
    let _ = DatasetError::UnknownCut("a".into()).to_string();
    let _ = DatasetError::DuplicateCut("a".into()).to_string();
    let _ = DatasetError::invalid("a", "bad").to_string();
    let _ = DatasetError::ShapeMismatch { expected: 1, got: 2 }.to_string();
    let _ = DatasetError::SamplingRate { expected: 1, got: 2 }.to_string();
    let _ = DatasetError::Augment("bad".into()).to_string();
    let _ = DatasetError::Io(std::io::Error::other("test")).to_string();
}

#[test]
fn test_recording_only_cuts() {
    let dir = TempDir::new().unwrap();
    let cuts = corpus(dir.path());

    assert!(matches!(
        FeatureDataset::new(cuts.clone()),
        Err(DatasetError::MissingFeatures { cut_id }) if cut_id == "a"
    ));
    assert_eq!(WaveformDataset::new(cuts.clone()).unwrap().len(), 3);
    assert_eq!(OnTheFlyDataset::new(fbank(), cuts, None).unwrap().len(), 3);
}

#[test]
fn test_feature_only_cuts() {
    let dir = TempDir::new().unwrap();
    let with_feats = corpus(dir.path())
        .compute_and_store_features(fbank().as_ref(), None)
        .unwrap();
    let feature_only = CutSet::from_cuts(with_feats.iter().map(|c| match c {
        Cut::Mono(m) => MonoCut {
            recording: None,
            ..m.clone()
        },
        Cut::Mixed(_) => unreachable!(),
    }))
    .unwrap();

    assert_eq!(FeatureDataset::new(feature_only.clone()).unwrap().len(), 3);
    assert!(matches!(
        WaveformDataset::new(feature_only.clone()),
        Err(DatasetError::MissingRecording { .. })
    ));
    assert!(matches!(
        OnTheFlyDataset::new(fbank(), feature_only, None),
        Err(DatasetError::MissingRecording { .. })
    ));
}

#[test]
fn test_mixed_frame_shift_mismatch_rejected() {
    let feats = |id: &str, frames: usize, shift: f64| {
        MonoCut::from_features(
            id,
            Features {
                feature_type: "fbank".into(),
                num_frames: frames,
                num_features: 2,
                frame_shift: shift,
                sampling_rate: 16000,
                start: 0.0,
                duration: frames as f64 * shift,
                storage: FeatureStorage::Memory {
                    data: vec![vec![0.0; 2]; frames],
                },
            },
        )
    };
    // 50 frames at 20 ms end at 1.5 s once offset; summing them onto a
    // 10 ms grid would fold them into frames 50..100.
    let mix = MixedCut {
        id: "m".into(),
        tracks: vec![
            MixTrack {
                cut: feats("a", 100, 0.01),
                offset: 0.0,
                snr: None,
            },
            MixTrack {
                cut: feats("b", 50, 0.02),
                offset: 0.5,
                snr: None,
            },
        ],
    };
    let cuts = CutSet::from_cuts(vec![Cut::Mixed(mix)]).unwrap();
    assert!(matches!(
        FeatureDataset::new(cuts),
        Err(DatasetError::Validation { cut_id, reason }) if cut_id == "m" && reason.contains("frame shift")
    ));
}

#[test]
fn test_empty_cut_set() {
    assert!(FeatureDataset::new(CutSet::default()).unwrap().is_empty());
    assert!(WaveformDataset::new(CutSet::default()).unwrap().is_empty());
    assert!(OnTheFlyDataset::new(fbank(), CutSet::default(), None).unwrap().is_empty());
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_waveform_batch_order_and_padding() {
    let dir = TempDir::new().unwrap();
    let ds = WaveformDataset::new(corpus(dir.path())).unwrap();

    let batch = ds.get_item(["b", "a"]).unwrap();
    assert_eq!(batch.audio.shape(), [2, 16000]);
    assert_eq!(batch.audio_lens, vec![8000, 16000]);
    assert!(batch.audio.row(0)[8000..].iter().all(|&s| s == 0.0));
    // 0.3 amplitude survives the 16-bit round trip closely.
    let peak = batch.audio.row(1).iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!((peak - 0.3).abs() < 1e-3);
}

#[test]
fn test_feature_batch_shape() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("feats");
    let cuts = corpus(dir.path())
        .compute_and_store_features(fbank().as_ref(), Some(store.as_path()))
        .unwrap();
    assert!(store.join("a.f32").exists());

    let ds = FeatureDataset::new(cuts).unwrap();
    let batch = ds.get_item(["c", "b", "a"]).unwrap();
    // 0.75 s -> 73 frames, 0.5 s -> 48, 1.0 s -> 98.
    assert_eq!(batch.features_lens, vec![73, 48, 98]);
    assert_eq!(batch.features.shape(), [3, 98, 40]);
    assert_eq!(batch.features.frame(1, 48), &[LOG_EPSILON; 40][..]);
}

#[test]
fn test_precomputed_matches_on_the_fly() {
    let dir = TempDir::new().unwrap();
    let cuts = corpus(dir.path());
    let extractor = fbank();

    let stored = cuts
        .compute_and_store_features(extractor.as_ref(), Some(dir.path().join("feats").as_path()))
        .unwrap();
    let precomputed = FeatureDataset::new(stored).unwrap();
    let on_the_fly = OnTheFlyDataset::new(extractor, cuts, None).unwrap();

    for ids in [vec!["a"], vec!["b", "c"], vec!["c", "a", "b"]] {
        let expected = precomputed.get_item(&ids).unwrap();
        let actual = on_the_fly.get_item(&ids).unwrap();
        assert_eq!(actual.shape()[0], ids.len());
        assert_eq!(actual.shape(), expected.features.shape());
        // Padding differs by design (0.0 vs LOG_EPSILON), so compare only real frames.
        for (b, &len) in expected.features_lens.iter().enumerate() {
            for t in 0..len {
                for (x, y) in actual.frame(b, t).iter().zip(expected.features.frame(b, t)) {
                    assert!((x - y).abs() < 1e-4, "item {b} frame {t}: {x} vs {y}");
                }
            }
        }
    }
}

#[test]
fn test_sub_span_cut() {
    let dir = TempDir::new().unwrap();
    let f = Format::MONO_16K;
    let rec = write_wav(dir.path(), "long", &sine(300.0, 2.0, f), f);
    let cut = MonoCut {
        id: "mid".into(),
        start: 0.5,
        duration: 1.0,
        features: None,
        recording: Some(rec),
    };
    let cuts = CutSet::from_cuts(vec![cut]).unwrap();

    let audio = WaveformDataset::new(cuts.clone()).unwrap().get_item(["mid"]).unwrap();
    assert_eq!(audio.audio_lens, vec![16000]);

    let extractor = fbank();
    let stored = cuts.compute_and_store_features(extractor.as_ref(), None).unwrap();
    let a = FeatureDataset::new(stored).unwrap().get_item(["mid"]).unwrap();
    let b = OnTheFlyDataset::new(extractor, cuts, None).unwrap().get_item(["mid"]).unwrap();
    assert!(max_abs_diff(&a.features, &b) < 1e-4);
}

#[test]
fn test_mixed_cut_domains_differ() {
    let dir = TempDir::new().unwrap();
    let f = Format::MONO_16K;
    let a: Cut = MonoCut::from_recording(write_wav(dir.path(), "a", &sine(440.0, 1.0, f), f)).into();
    let b: Cut = MonoCut::from_recording(write_wav(dir.path(), "b", &sine(440.0, 1.0, f), f)).into();
    let mix = a.mix(&b, 0.5, None).unwrap();
    assert_eq!(mix.id(), "mix-a-b");
    let cuts = CutSet::from_cuts(vec![mix]).unwrap();

    let audio = WaveformDataset::new(cuts.clone()).unwrap().get_item(["mix-a-b"]).unwrap();
    assert_eq!(audio.audio_lens, vec![24000]);

    let extractor = fbank();
    let stored = cuts.compute_and_store_features(extractor.as_ref(), None).unwrap();
    let precomputed = FeatureDataset::new(stored).unwrap().get_item(["mix-a-b"]).unwrap();
    let on_the_fly = OnTheFlyDataset::new(extractor, cuts, None)
        .unwrap()
        .get_item(["mix-a-b"])
        .unwrap();

    // Frame counts agree: 50 frames of offset plus 98 for the second track.
    assert_eq!(precomputed.features.shape(), [1, 148, 40]);
    assert_eq!(on_the_fly.shape(), [1, 148, 40]);
    // In-phase overlap doubles the amplitude in time but only the power in features.
    assert!(max_abs_diff(&precomputed.features, &on_the_fly) > 0.1);
}

#[test]
fn test_unknown_id() {
    let dir = TempDir::new().unwrap();
    let ds = OnTheFlyDataset::new(fbank(), corpus(dir.path()), None).unwrap();
    assert!(matches!(ds.get_item(["a", "zzz"]), Err(DatasetError::UnknownCut(id)) if id == "zzz"));
}

#[test]
fn test_on_the_fly_rate_mismatch() {
    let dir = TempDir::new().unwrap();
    let f = Format::MONO_8K;
    let cuts = CutSet::from_cuts(vec![MonoCut::from_recording(write_wav(
        dir.path(),
        "low",
        &sine(200.0, 0.5, f),
        f,
    ))])
    .unwrap();
    let ds = OnTheFlyDataset::new(fbank(), cuts, None).unwrap();
    assert!(matches!(
        ds.get_item(["low"]),
        Err(DatasetError::SamplingRate { expected: 16000, got: 8000 })
    ));
}

// ============================================================================
// Augmentation
// ============================================================================

#[test]
fn test_on_the_fly_augmentation() {
    let dir = TempDir::new().unwrap();
    let cuts = corpus(dir.path());
    let plain = OnTheFlyDataset::new(fbank(), cuts.clone(), None).unwrap();
    let louder = OnTheFlyDataset::new(fbank(), cuts.clone(), Some(Arc::new(Gain { db: 20.0 }))).unwrap();

    let p = plain.get_item(["a"]).unwrap();
    let l = louder.get_item(["a"]).unwrap();
    assert_eq!(p.shape(), l.shape());
    // +20 dB amplitude is +ln(100) in log power.
    let shift = l.get(0, 10, 7) - p.get(0, 10, 7);
    assert!((shift - 100f32.ln()).abs() < 0.05, "shift {shift}");

    let faster = OnTheFlyDataset::new(
        fbank(),
        cuts,
        Some(Arc::new(Chain::new().then(SpeedPerturb { factor: 1.1 }).then(Gain { db: -3.0 }))),
    )
    .unwrap();
    let frames = faster.get_item(["a"]).unwrap().shape()[1];
    assert!(frames < 98 && frames > 80, "frames {frames}");
}

#[test]
fn test_augment_error_propagates() {
    let dir = TempDir::new().unwrap();
    let failing = |_: Vec<f32>, _: u32| -> Result<Vec<f32>, DatasetError> {
        Err(DatasetError::Augment("boom".into()))
    };
    let ds = OnTheFlyDataset::new(fbank(), corpus(dir.path()), Some(Arc::new(failing))).unwrap();
    assert!(matches!(ds.get_item(["a"]), Err(DatasetError::Augment(_))));
}

// ============================================================================
// Manifests and loading
// ============================================================================

#[test]
fn test_manifest_round_trip_with_files() {
    let dir = TempDir::new().unwrap();
    let cuts = corpus(dir.path())
        .compute_and_store_features(fbank().as_ref(), Some(dir.path().join("feats").as_path()))
        .unwrap();
    let path = dir.path().join("cuts.jsonl");
    manifest::save(&cuts, &path).unwrap();

    let loaded = manifest::load(&path).unwrap();
    assert_eq!(loaded, cuts);

    let ds = FeatureDataset::new(loaded).unwrap();
    let batch = ds.get_item(["b"]).unwrap();
    assert_eq!(batch.features_lens, vec![48]);
}

#[test]
fn test_loader_epochs() {
    let dir = TempDir::new().unwrap();
    let ds = WaveformDataset::new(corpus(dir.path())).unwrap();
    let cfg = SamplerConfig {
        max_cuts: 2,
        max_duration: Some(1.5),
        shuffle: true,
        seed: 3,
        ..Default::default()
    };
    let mut loader = DataLoader::new(&ds, CutSampler::new(ds.cuts(), cfg));

    for epoch in 0..3 {
        loader.set_epoch(epoch);
        let total: usize = loader
            .by_ref()
            .map(|batch| batch.unwrap().audio_lens.len())
            .sum();
        assert_eq!(total, 3);
    }
}
