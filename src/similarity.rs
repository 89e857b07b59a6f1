//! Similarity metrics between the rows of a labeled matrix and a query.
//!
//! Three metrics share one calling convention `(matrix, vector,
//! assure_consistency)` and all follow "higher = more similar":
//!
//! - [`dot`]: raw inner product of each row with the query, unsorted.
//! - [`euclidean`]: `1 / (1 + ‖row − query‖₂)`, always sorted descending.
//! - [`cos`]: cosine similarity, unsorted. A single-row matrix against a
//!   single-row query takes the pair path ([`word_cos`]); anything else goes
//!   through the broadcast path, which also handles multi-row queries.
//!
//! With `assure_consistency = true` the query is validated and its columns are
//! reordered to the matrix's order before anything is computed. With `false`
//! the caller asserts the axes already line up; misaligned labels then give
//! silently wrong scores, only a raw shape mismatch is still reported.
//!
//! Zero-norm operands are not guarded in [`cos`]/[`word_cos`]: they produce
//! NaN or infinite scores. Exclude zero rows beforehand if that matters.
//!
//! # Examples
//!
//! ```
//! use wordspace::index_matrix::IndexMatrix;
//! use wordspace::similarity::{cos, dot, euclidean};
//!
//! let m = IndexMatrix::from_rows(
//!     vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
//!     ["x", "y", "xy"],
//!     ["f1", "f2"],
//! ).unwrap();
//! let q = IndexMatrix::from_rows(vec![vec![1.0, 1.0]], ["q"], ["f1", "f2"]).unwrap();
//!
//! let scores = dot(&m, &q, true).unwrap();
//! assert_eq!(scores.to_rows(), vec![vec![1.0], vec![1.0], vec![2.0]]);
//!
//! let ranked = euclidean(&m, &q, true).unwrap();
//! assert_eq!(ranked.scores()[0].0, "xy");
//!
//! let cosines = cos(&m, &q, true).unwrap();
//! assert!((cosines.get("xy", "q").unwrap() - 1.0).abs() < 1e-12);
//! ```

use std::borrow::Cow;

use log::{debug, trace};

use crate::consistency::assure_consistency;
use crate::errors::{Result, SimilarityError};
use crate::labeled::{Axis, LabeledMatrix};

/// Shape class of a (matrix, query) pair, decided once per cosine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operands {
    /// Both operands are single rows.
    Pair,
    /// The matrix has several rows, or the query does.
    Broadcast,
}

impl Operands {
    pub fn classify<M: LabeledMatrix>(matrix: &M, vector: &M) -> Self {
        if matrix.is_vector() && vector.is_vector() {
            Operands::Pair
        } else {
            Operands::Broadcast
        }
    }
}

fn prepare<'a, M: LabeledMatrix>(
    matrix: &M,
    vector: &'a M,
    assure: bool,
) -> Result<Cow<'a, M>> {
    if assure {
        Ok(Cow::Owned(assure_consistency(matrix, vector)?))
    } else {
        trace!("Skipping consistency check");
        Ok(Cow::Borrowed(vector))
    }
}

/// Inner product of every row of `matrix` with `vector`.
///
/// Returns an `(R, 1)` matrix in the row order of `matrix`, its single column
/// labelled with the query's row label.
pub fn dot<M: LabeledMatrix>(matrix: &M, vector: &M, assure_consistency: bool) -> Result<M> {
    debug!(
        "dot: matrix {:?} against vector {:?}",
        matrix.shape(),
        vector.shape()
    );
    let vector = prepare(matrix, vector, assure_consistency)?;
    matrix.dot(&vector.transpose())
}

/// Inverse euclidean similarity `1 / (1 + distance)` of every row to `vector`.
///
/// Identical rows score 1, distant rows approach 0. The result is sorted
/// descending by score.
pub fn euclidean<M: LabeledMatrix>(matrix: &M, vector: &M, assure_consistency: bool) -> Result<M> {
    debug!(
        "euclidean: matrix {:?} against vector {:?}",
        matrix.shape(),
        vector.shape()
    );
    let vector = prepare(matrix, vector, assure_consistency)?;
    let distances = matrix.subtract(&vector)?.norm(Axis::Columns);
    let mut scores = distances.map(|d| 1.0 / (1.0 + d));
    if vector.is_vector() {
        scores = scores.relabel(Axis::Columns, vector.row2word().to_vec())?;
    }
    Ok(scores.sort(false))
}

/// Cosine similarity of every row of `matrix` with every row of `vector`.
///
/// Returns `(R, Q)` scores for a `(Q, C)` query, unsorted.
pub fn cos<M: LabeledMatrix>(matrix: &M, vector: &M, assure_consistency: bool) -> Result<M> {
    debug!(
        "cos: matrix {:?} against vector {:?}",
        matrix.shape(),
        vector.shape()
    );
    let vector = prepare(matrix, vector, assure_consistency)?;

    let operands = Operands::classify(matrix, vector.as_ref());
    trace!("cos dispatch: {:?}", operands);
    match operands {
        Operands::Pair => word_cos(matrix, vector.as_ref()),
        Operands::Broadcast => {
            let dotted = matrix.dot(&vector.transpose())?;
            let matrix_norms = matrix.multiply(matrix)?.sum(Axis::Columns).sqrt();
            let vector_norms = vector.multiply(&vector)?.sum(Axis::Columns).sqrt();
            // (R, 1) · (1, Q): one norm product per (row, query) pair
            let norms = matrix_norms.dot(&vector_norms.transpose())?;
            dotted.multiply(&norms.map(|n| 1.0 / n))
        }
    }
}

/// Cosine similarity of two single-row matrices as a `(1, 1)` matrix.
///
/// Columns are assumed aligned.
pub fn word_cos<M: LabeledMatrix>(v1: &M, v2: &M) -> Result<M> {
    for v in [v1, v2] {
        if !v.is_vector() {
            let (rows, cols) = v.shape();
            return Err(SimilarityError::Shape { rows, cols });
        }
    }
    let denom = v1.frobenius_norm() * v2.frobenius_norm();
    Ok(v1.dot(&v2.transpose())?.map(|x| x / denom))
}
