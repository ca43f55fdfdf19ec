//! Dense row-major batch tensors.
//!
//! Collation produces rectangular buffers: `Tensor2` is `[batch][time]`
//! (waveforms), `Tensor3` is `[batch][time][dim]` (feature matrices).

/// A `[rows, cols]` f32 tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor2 {
    shape: [usize; 2],
    data: Vec<f32>,
}

impl Tensor2 {
    /// Creates a tensor filled with `value`.
    pub fn full(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            shape: [rows, cols],
            data: vec![value; rows * cols],
        }
    }

    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Returns the element at `[r, c]`.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get(&self, r: usize, c: usize) -> f32 {
        assert!(r < self.shape[0] && c < self.shape[1], "index out of bounds");
        self.data[r * self.shape[1] + c]
    }

    /// Returns row `r` as a slice.
    pub fn row(&self, r: usize) -> &[f32] {
        let cols = self.shape[1];
        &self.data[r * cols..(r + 1) * cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f32] {
        let cols = self.shape[1];
        &mut self.data[r * cols..(r + 1) * cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// A `[batch, time, dim]` f32 tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor3 {
    shape: [usize; 3],
    data: Vec<f32>,
}

impl Tensor3 {
    /// Creates a tensor filled with `value`.
    pub fn full(batch: usize, time: usize, dim: usize, value: f32) -> Self {
        Self {
            shape: [batch, time, dim],
            data: vec![value; batch * time * dim],
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Returns the element at `[b, t, d]`.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get(&self, b: usize, t: usize, d: usize) -> f32 {
        let [nb, nt, nd] = self.shape;
        assert!(b < nb && t < nt && d < nd, "index out of bounds");
        self.data[(b * nt + t) * nd + d]
    }

    /// Returns frame `t` of item `b`.
    pub fn frame(&self, b: usize, t: usize) -> &[f32] {
        let [_, nt, nd] = self.shape;
        let start = (b * nt + t) * nd;
        &self.data[start..start + nd]
    }

    /// Returns item `b` as a flat `[time * dim]` slice.
    pub fn item(&self, b: usize) -> &[f32] {
        let [_, nt, nd] = self.shape;
        &self.data[b * nt * nd..(b + 1) * nt * nd]
    }

    pub fn item_mut(&mut self, b: usize) -> &mut [f32] {
        let [_, nt, nd] = self.shape;
        &mut self.data[b * nt * nd..(b + 1) * nt * nd]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
