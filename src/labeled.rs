//! The labeled-matrix contract consumed by the metric engine.
//!
//! A labeled matrix is a 2D array of `f64` whose rows and columns carry unique
//! string labels (`row2word` / `col2word`). Column order defines the feature
//! axis. Every operation takes `&self` and returns a new owned value, so the
//! same matrix can be reused across several metric calls without aliasing.
//!
//! Binary elementwise operations (`subtract`, `multiply`) accept either an
//! operand of the same shape or one that broadcasts: a single row `(1, C)`
//! repeated over every row, or a single column `(R, 1)` repeated over every
//! column.

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Label used for the collapsed axis of a reduction (`sum`, `norm`).
pub const AGGREGATE_LABEL: &str = "*";

/// Matrix axis, numbered as in most array libraries (`Rows` = 0, `Columns` = 1).
///
/// Reductions along an axis collapse it: `sum(Axis::Columns)` yields one value
/// per row, `sum(Axis::Rows)` one value per column. Reordering along an axis
/// permutes the labels of that axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Rows,
    Columns,
}

/// Total order on scores with NaN after every number, whatever its sign bit.
///
/// `f64::total_cmp` alone places NaN by sign, and the sign of a NaN produced
/// by arithmetic differs between CPUs.
pub fn score_order(a: f64, b: f64, ascending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) if ascending => a.total_cmp(&b),
        (false, false) => b.total_cmp(&a),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}

pub trait LabeledMatrix: Clone + Debug + Sized {
    /// Returns (nrows, ncols).
    fn shape(&self) -> (usize, usize);

    /// True iff the matrix has exactly one row.
    #[inline]
    fn is_vector(&self) -> bool {
        self.shape().0 == 1
    }

    fn row2word(&self) -> &[String];

    fn col2word(&self) -> &[String];

    /// Labels along `axis`.
    #[inline]
    fn labels(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Rows => self.row2word(),
            Axis::Columns => self.col2word(),
        }
    }

    /// Value at positional `(row, col)`, for walking a matrix whose shape is
    /// already known. Lookups by label should go through
    /// `IndexMatrix::get`, which returns `None` instead of panicking.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    fn value(&self, row: usize, col: usize) -> f64;

    /// The single-row matrix labelled `word`.
    fn row(&self, word: &str) -> Result<Self>;

    /// Reorders the labels along `axis` to follow `other`'s order on the same axis.
    ///
    /// Labels shared with `other` come first, in `other`'s order; labels only
    /// `self` carries follow in their original order; labels only `other`
    /// carries are absent. Comparing the resulting labels with `other`'s is
    /// therefore enough to tell whether the two label sets were equal.
    fn synchronize_word_order(&self, other: &Self, axis: Axis) -> Result<Self>;

    fn transpose(&self) -> Self;

    /// Matrix product `self · other`; the inner dimensions must agree.
    fn dot(&self, other: &Self) -> Result<Self>;

    /// Elementwise `self - other`, broadcasting `other` when possible.
    fn subtract(&self, other: &Self) -> Result<Self>;

    /// Elementwise `self * other`, broadcasting `other` when possible.
    fn multiply(&self, other: &Self) -> Result<Self>;

    /// Sum collapsing `axis`.
    fn sum(&self, axis: Axis) -> Self;

    /// Applies `f` to every element.
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self;

    #[inline]
    fn sqrt(&self) -> Self {
        self.map(f64::sqrt)
    }

    /// L2 norm collapsing `axis`.
    #[inline]
    fn norm(&self, axis: Axis) -> Self {
        self.map(|x| x * x).sum(axis).sqrt()
    }

    /// L2 norm over all elements.
    fn frobenius_norm(&self) -> f64;

    /// Rows reordered by the values of the first column; NaN rows go last
    /// in either direction.
    fn sort(&self, ascending: bool) -> Self;

    /// Replaces the labels along `axis`; the count must match and labels must be unique.
    fn relabel(&self, axis: Axis, labels: Vec<String>) -> Result<Self>;
}
