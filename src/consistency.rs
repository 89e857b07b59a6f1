//! Feature-axis reconciliation between a matrix and a query vector.

use log::trace;

use crate::errors::{Result, SimilarityError};
use crate::labeled::{Axis, LabeledMatrix};

/// Returns `vector` with its columns reordered to follow `matrix`'s column order.
///
/// The matrix is never reordered. Fails with `Shape` when `vector` has more
/// than one row and with `SchemaMismatch` when the two column label sets differ.
///
/// # Examples
///
/// ```
/// use wordspace::consistency::assure_consistency;
/// use wordspace::index_matrix::IndexMatrix;
/// use wordspace::labeled::LabeledMatrix;
///
/// let m = IndexMatrix::from_rows(vec![vec![0.0; 3]], ["w"], ["a", "b", "c"]).unwrap();
/// let v = IndexMatrix::from_rows(vec![vec![3.0, 1.0, 2.0]], ["q"], ["c", "a", "b"]).unwrap();
/// let v = assure_consistency(&m, &v).unwrap();
/// assert_eq!(v.col2word(), m.col2word());
/// assert_eq!(v.to_rows(), vec![vec![1.0, 2.0, 3.0]]);
/// ```
pub fn assure_consistency<M: LabeledMatrix>(matrix: &M, vector: &M) -> Result<M> {
    if !vector.is_vector() {
        let (rows, cols) = vector.shape();
        return Err(SimilarityError::Shape { rows, cols });
    }

    let vector = vector.synchronize_word_order(matrix, Axis::Columns)?;
    if matrix.col2word() != vector.col2word() {
        trace!(
            "Column labels differ: matrix has {}, vector has {}",
            matrix.col2word().len(),
            vector.col2word().len()
        );
        return Err(SimilarityError::SchemaMismatch);
    }
    Ok(vector)
}
