//! Batching variable-length sequences into padded tensors.
//!
//! Every collate function returns the padded batch and, where it applies,
//! the unpadded per-item lengths so models can mask the padding.

use tracing::debug;

use crate::{CutSet, DatasetError, Tensor2, Tensor3};

/// `ln(1e-10)`, the log-energy floor used to pad feature matrices.
pub const LOG_EPSILON: f32 = -23.025_85;

/// Which side of a sequence receives the padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PadDirection {
    #[default]
    Right,
    Left,
    /// Split evenly, with the odd element on the right.
    Both,
}

impl PadDirection {
    /// Index at which a sequence of length `len` starts inside `total`.
    fn start(self, len: usize, total: usize) -> usize {
        let pad = total - len;
        match self {
            PadDirection::Right => 0,
            PadDirection::Left => pad,
            PadDirection::Both => pad / 2,
        }
    }
}

/// Collates the precomputed features of every cut, right-padded with
/// [`LOG_EPSILON`].
pub fn collate_features(cuts: &CutSet) -> Result<(Tensor3, Vec<usize>), DatasetError> {
    collate_features_with(cuts, PadDirection::Right, LOG_EPSILON)
}

pub fn collate_features_with(
    cuts: &CutSet,
    direction: PadDirection,
    padding_value: f32,
) -> Result<(Tensor3, Vec<usize>), DatasetError> {
    let matrices = cuts
        .iter()
        .map(|cut| cut.load_features())
        .collect::<Result<Vec<_>, _>>()?;
    let lens: Vec<usize> = matrices.iter().map(Vec::len).collect();
    let features = pad_matrices(&matrices, direction, padding_value)?;
    debug!(batch = lens.len(), shape = ?features.shape(), "collated features");
    Ok((features, lens))
}

/// Collates the mono audio of every cut, right-padded with zeros.
pub fn collate_audio(cuts: &CutSet) -> Result<(Tensor2, Vec<usize>), DatasetError> {
    collate_audio_with(cuts, PadDirection::Right)
}

pub fn collate_audio_with(
    cuts: &CutSet,
    direction: PadDirection,
) -> Result<(Tensor2, Vec<usize>), DatasetError> {
    let waves = cuts
        .iter()
        .map(|cut| cut.load_audio())
        .collect::<Result<Vec<_>, _>>()?;
    let lens: Vec<usize> = waves.iter().map(Vec::len).collect();
    let audio = collate_vectors(&waves, direction, 0.0);
    debug!(batch = lens.len(), shape = ?audio.shape(), "collated audio");
    Ok((audio, lens))
}

/// Pads 1-D sequences to the longest one.
pub fn collate_vectors<V: AsRef<[f32]>>(
    vectors: &[V],
    direction: PadDirection,
    padding_value: f32,
) -> Tensor2 {
    let longest = vectors.iter().map(|v| v.as_ref().len()).max().unwrap_or(0);
    let mut out = Tensor2::full(vectors.len(), longest, padding_value);
    for (i, v) in vectors.iter().enumerate() {
        let v = v.as_ref();
        let start = direction.start(v.len(), longest);
        out.row_mut(i)[start..start + v.len()].copy_from_slice(v);
    }
    out
}

/// Right-pads `[frames][dim]` matrices along time into one `[B, T, dim]`
/// tensor. All matrices must share the same dimension.
pub fn collate_matrices<I>(matrices: I, padding_value: f32) -> Result<Tensor3, DatasetError>
where
    I: IntoIterator<Item = Vec<Vec<f32>>>,
{
    let matrices: Vec<_> = matrices.into_iter().collect();
    pad_matrices(&matrices, PadDirection::Right, padding_value)
}

fn pad_matrices(
    matrices: &[Vec<Vec<f32>>],
    direction: PadDirection,
    padding_value: f32,
) -> Result<Tensor3, DatasetError> {
    let longest = matrices.iter().map(Vec::len).max().unwrap_or(0);
    let dim = matrices
        .iter()
        .flat_map(|m| m.first())
        .map(Vec::len)
        .next()
        .unwrap_or(0);

    let mut out = Tensor3::full(matrices.len(), longest, dim, padding_value);
    for (b, matrix) in matrices.iter().enumerate() {
        let start = direction.start(matrix.len(), longest);
        let item = out.item_mut(b);
        for (t, row) in matrix.iter().enumerate() {
            if row.len() != dim {
                return Err(DatasetError::ShapeMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            let at = (start + t) * dim;
            item[at..at + dim].copy_from_slice(row);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_epsilon() {
        assert!((LOG_EPSILON - (1e-10f64).ln() as f32).abs() < 1e-4);
    }

    #[test]
    fn test_collate_vectors_right() {
        let out = collate_vectors(&[vec![1.0, 2.0, 3.0], vec![4.0]], PadDirection::Right, 0.0);
        assert_eq!(out.shape(), [2, 3]);
        assert_eq!(out.row(1), &[4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_collate_vectors_left_and_both() {
        let input = [vec![1.0, 2.0, 3.0, 4.0], vec![5.0]];
        let left = collate_vectors(&input, PadDirection::Left, -1.0);
        assert_eq!(left.row(1), &[-1.0, -1.0, -1.0, 5.0]);

        let both = collate_vectors(&input, PadDirection::Both, -1.0);
        assert_eq!(both.row(1), &[-1.0, 5.0, -1.0, -1.0]);
    }

    #[test]
    fn test_collate_matrices() {
        let a = vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]];
        let b = vec![vec![4.0, 4.0]];
        let out = collate_matrices(vec![a, b], 0.0).unwrap();
        assert_eq!(out.shape(), [2, 3, 2]);
        assert_eq!(out.frame(0, 2), &[3.0, 3.0]);
        assert_eq!(out.frame(1, 0), &[4.0, 4.0]);
        assert_eq!(out.frame(1, 1), &[0.0, 0.0]);
    }

    #[test]
    fn test_collate_matrices_dim_mismatch() {
        let a = vec![vec![1.0, 1.0]];
        let b = vec![vec![4.0, 4.0, 4.0]];
        assert!(matches!(
            collate_matrices(vec![a, b], 0.0),
            Err(DatasetError::ShapeMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_collate_empty() {
        let out = collate_matrices(Vec::<Vec<Vec<f32>>>::new(), 0.0).unwrap();
        assert_eq!(out.shape(), [0, 0, 0]);

        let (audio, lens) = collate_audio(&CutSet::default()).unwrap();
        assert_eq!(audio.shape(), [0, 0]);
        assert!(lens.is_empty());
    }

    #[test]
    fn test_collate_matrix_with_empty_item() {
        let a = vec![vec![1.0, 2.0]];
        let out = collate_matrices(vec![Vec::new(), a], LOG_EPSILON).unwrap();
        assert_eq!(out.shape(), [2, 1, 2]);
        assert_eq!(out.frame(0, 0), &[LOG_EPSILON, LOG_EPSILON]);
    }
}
