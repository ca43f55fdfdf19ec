//! Analysis window and triangular mel filters.

use std::f64::consts::PI;

/// Hamming window of length `n`.
pub fn hamming_window(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let step = 2.0 * PI / (n - 1) as f64;
            (0..n).map(|i| 0.54 - 0.46 * (step * i as f64).cos()).collect()
        }
    }
}

pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (hz / 700.0).ln_1p() / std::f64::consts::LN_10
}

pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * ((mel / 2595.0) * std::f64::consts::LN_10).exp_m1()
}

/// One triangular filter, stored over its non-zero bins only.
#[derive(Debug, Clone, PartialEq)]
pub struct MelFilter {
    /// First FFT bin covered by `weights`.
    pub start: usize,
    pub weights: Vec<f64>,
}

impl MelFilter {
    /// Weighted sum of a power spectrum under this filter.
    pub fn apply(&self, power: &[f64]) -> f64 {
        power
            .iter()
            .skip(self.start)
            .zip(&self.weights)
            .map(|(p, w)| p * w)
            .sum()
    }
}

/// Builds `num_mels` filters over a `fft_size / 2 + 1` bin power spectrum.
///
/// Edges are spaced evenly in mel between `low_freq` and `high_freq` and
/// snapped to FFT bins. Edges that collapse onto the same bin are pushed
/// apart so every filter covers at least one bin.
pub fn mel_filter_bank(
    num_mels: usize,
    fft_size: usize,
    sample_rate: usize,
    low_freq: f64,
    high_freq: f64,
) -> Vec<MelFilter> {
    let num_bins = fft_size / 2 + 1;
    let low = hz_to_mel(low_freq);
    let step = (hz_to_mel(high_freq) - low) / (num_mels + 1) as f64;
    let hz_per_bin = sample_rate as f64 / fft_size as f64;

    let mut edges = Vec::with_capacity(num_mels + 2);
    for i in 0..num_mels + 2 {
        let bin = ((mel_to_hz(low + step * i as f64) / hz_per_bin).round() as usize).min(num_bins - 1);
        let bin = match edges.last() {
            Some(&prev) if bin <= prev => prev + 1,
            _ => bin,
        };
        edges.push(bin);
    }

    edges
        .windows(3)
        .map(|e| {
            let (left, center, right) = (e[0], e[1], e[2]);
            let start = (left + 1).min(num_bins);
            let end = right.min(num_bins);
            let weights = (start..end)
                .map(|k| {
                    if k < center {
                        (k - left) as f64 / (center - left) as f64
                    } else {
                        (right - k) as f64 / (right - center) as f64
                    }
                })
                .collect();
            MelFilter { start, weights }
        })
        .collect()
}
