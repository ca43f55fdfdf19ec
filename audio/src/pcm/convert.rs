//! Sample conversion between 16-bit PCM and normalized floats.

/// Converts 16-bit samples to floats in [-1, 1].
pub fn i16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// Converts floats to 16-bit samples, clipping to [-1, 1] first.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            let t = s.clamp(-1.0, 1.0);
            if t >= 0.0 {
                (t * 32767.0) as i16
            } else {
                (t * 32768.0) as i16
            }
        })
        .collect()
}

/// Converts little-endian PCM16 bytes to floats in [-1, 1].
///
/// A trailing odd byte is ignored.
pub fn bytes_to_f32(pcm: &[u8]) -> Vec<f32> {
    pcm.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
        .collect()
}

/// Averages interleaved channels into a single mono channel.
///
/// Incomplete trailing frames are dropped. With `channels <= 1` the input
/// is returned unchanged.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
