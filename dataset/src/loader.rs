//! Iterating a dataset batch by batch.

use crate::{CutSampler, Dataset, DatasetError};

/// Pairs a [`Dataset`] with a [`CutSampler`] and yields one payload per
/// sampled batch.
///
/// Errors are yielded in place; iteration continues with the next batch.
pub struct DataLoader<'a, D: Dataset> {
    dataset: &'a D,
    sampler: CutSampler,
}

impl<'a, D: Dataset> DataLoader<'a, D> {
    pub fn new(dataset: &'a D, sampler: CutSampler) -> Self {
        Self { dataset, sampler }
    }

    pub fn sampler(&self) -> &CutSampler {
        &self.sampler
    }

    /// Restarts iteration for a new epoch.
    pub fn set_epoch(&mut self, epoch: u64) {
        self.sampler.set_epoch(epoch);
    }
}

impl<D: Dataset> Iterator for DataLoader<'_, D> {
    type Item = Result<D::Item, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        let ids = self.sampler.next()?;
        Some(self.dataset.get_item(&ids))
    }
}
