//! Time-domain mixing.
//!
//! Sources are summed sample by sample into a destination buffer. The
//! buffer grows with silence when a source extends past its end, so mixing
//! never truncates either input.

/// Returns the mean squared amplitude of `samples` (0 for empty input).
pub fn energy(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| s as f64 * s as f64).sum::<f64>() / samples.len() as f64
}

/// Returns the largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |p, &s| p.max(s.abs()))
}

/// Computes the linear gain that puts a source `snr_db` decibels below a
/// reference, given both signals' energies.
///
/// Silent sources (or a silent reference) get unit gain.
pub fn gain_for_snr(reference_energy: f64, source_energy: f64, snr_db: f64) -> f32 {
    if reference_energy <= 0.0 || source_energy <= 0.0 {
        return 1.0;
    }
    let target = reference_energy / 10f64.powf(snr_db / 10.0);
    (target / source_energy).sqrt() as f32
}

/// Adds `src * gain` into `dst` starting at sample `offset`.
pub fn mix_into(dst: &mut Vec<f32>, src: &[f32], offset: usize, gain: f32) {
    let end = offset + src.len();
    if dst.len() < end {
        dst.resize(end, 0.0);
    }
    for (d, &s) in dst[offset..end].iter_mut().zip(src) {
        *d += s * gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy() {
        assert_eq!(energy(&[]), 0.0);
        assert!((energy(&[1.0, -1.0]) - 1.0).abs() < 1e-12);
        assert!((energy(&[0.5, 0.5, 0.5, 0.5]) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_peak() {
        assert_eq!(peak(&[0.1, -0.8, 0.5]), 0.8);
        assert_eq!(peak(&[]), 0.0);
    }

    #[test]
    fn test_gain_for_snr() {
        // Equal energies at 0 dB -> unit gain
        assert!((gain_for_snr(1.0, 1.0, 0.0) - 1.0).abs() < 1e-6);
        // 20 dB below -> amplitude / 10
        assert!((gain_for_snr(1.0, 1.0, 20.0) - 0.1).abs() < 1e-6);
        // Silent source is left alone
        assert_eq!(gain_for_snr(1.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn test_mix_into_within_bounds() {
        let mut dst = vec![1.0f32; 4];
        mix_into(&mut dst, &[1.0, 1.0], 1, 0.5);
        assert_eq!(dst, vec![1.0, 1.5, 1.5, 1.0]);
    }

    #[test]
    fn test_mix_into_extends() {
        let mut dst = vec![1.0f32; 2];
        mix_into(&mut dst, &[1.0, 1.0], 3, 1.0);
        assert_eq!(dst, vec![1.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mix_into_empty_destination() {
        let mut dst = Vec::new();
        mix_into(&mut dst, &[0.25, 0.5], 0, 2.0);
        assert_eq!(dst, vec![0.5, 1.0]);
    }
}
