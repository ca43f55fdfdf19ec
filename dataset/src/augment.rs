//! Time-domain augmentation applied before on-the-fly feature extraction.
//!
//! Any `Fn(Vec<f32>, u32) -> Result<Vec<f32>, DatasetError>` closure is an
//! [`AugmentFn`]; [`Gain`], [`SpeedPerturb`] and [`Chain`] cover common cases.

use cutset_audio::resampler::resample;

use crate::DatasetError;

/// Transforms a mono waveform at a given sampling rate.
///
/// Implementations must be safe for concurrent use. The output keeps the
/// input's sampling rate; its length may change.
pub trait AugmentFn: Send + Sync {
    fn augment(&self, samples: Vec<f32>, sampling_rate: u32) -> Result<Vec<f32>, DatasetError>;
}

impl<F> AugmentFn for F
where
    F: Fn(Vec<f32>, u32) -> Result<Vec<f32>, DatasetError> + Send + Sync,
{
    fn augment(&self, samples: Vec<f32>, sampling_rate: u32) -> Result<Vec<f32>, DatasetError> {
        self(samples, sampling_rate)
    }
}

/// Scales the waveform by a gain in decibels.
#[derive(Debug, Clone, Copy)]
pub struct Gain {
    pub db: f32,
}

impl AugmentFn for Gain {
    fn augment(&self, mut samples: Vec<f32>, _sampling_rate: u32) -> Result<Vec<f32>, DatasetError> {
        let gain = 10f32.powf(self.db / 20.0);
        for s in &mut samples {
            *s *= gain;
        }
        Ok(samples)
    }
}

/// Changes playback speed (and pitch) by `factor`.
///
/// A factor of 1.1 shortens the waveform to 1/1.1 of its length.
#[derive(Debug, Clone, Copy)]
pub struct SpeedPerturb {
    pub factor: f64,
}

impl AugmentFn for SpeedPerturb {
    fn augment(&self, samples: Vec<f32>, sampling_rate: u32) -> Result<Vec<f32>, DatasetError> {
        if !(self.factor > 0.0) {
            return Err(DatasetError::Augment(format!(
                "speed factor must be positive, got {}",
                self.factor
            )));
        }
        // Treat the samples as if recorded at rate * factor, then bring them back.
        let source_rate = (sampling_rate as f64 * self.factor).round() as u32;
        Ok(resample(&samples, source_rate, sampling_rate)?)
    }
}

/// Applies augmentations in order.
#[derive(Default)]
pub struct Chain {
    steps: Vec<Box<dyn AugmentFn>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl AugmentFn + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }
}

impl AugmentFn for Chain {
    fn augment(&self, samples: Vec<f32>, sampling_rate: u32) -> Result<Vec<f32>, DatasetError> {
        self.steps
            .iter()
            .try_fold(samples, |acc, step| step.augment(acc, sampling_rate))
    }
}
