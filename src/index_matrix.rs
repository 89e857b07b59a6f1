//! IndexMatrix: a labeled matrix over dense or sparse storage.
//!
//! Rows are words, columns are features (context words). Values live either in
//! a row-major `smartcore` `DenseMatrix` or in a CSR `sprs::CsMat`; labels are
//! kept alongside with reverse lookups.
//!
//! Storage rules for derived values:
//! - Operations between two sparse operands stay sparse when the result keeps
//!   zeros at zero (`dot`, `multiply` by finite values, `map` with `f(0) == 0`).
//! - Anything that fills in zeros (`subtract`, `sum`, `map` with `f(0) != 0`)
//!   or mixes storages yields a dense result.
//!
//! # Examples
//!
//! ```
//! use wordspace::index_matrix::IndexMatrix;
//! use wordspace::labeled::LabeledMatrix;
//!
//! let m = IndexMatrix::from_rows(
//!     vec![vec![1.0, 0.0], vec![0.0, 2.0]],
//!     ["cat", "dog"],
//!     ["purr", "bark"],
//! ).unwrap();
//! assert_eq!(m.shape(), (2, 2));
//! assert_eq!(m.get("dog", "bark"), Some(2.0));
//! assert!(m.to_sparse().is_sparse());
//! ```

use std::collections::HashMap;

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use sprs::{CsMat, TriMat};

use log::trace;

use crate::errors::{Result, SimilarityError};
use crate::labeled::{score_order, Axis, LabeledMatrix, AGGREGATE_LABEL};

/// Backing store of an `IndexMatrix`.
#[derive(Clone, Debug)]
pub enum Storage {
    Dense(DenseMatrix<f64>),
    Sparse(CsMat<f64>),
}

#[derive(Clone, Debug)]
pub struct IndexMatrix {
    row2word: Vec<String>,
    col2word: Vec<String>,
    word2row: HashMap<String, usize>,
    word2col: HashMap<String, usize>,
    storage: Storage,
}

/// How the right operand of an elementwise operation lines up with the left one.
#[derive(Clone, Copy, Debug)]
enum Broadcast {
    Same,
    Row,
    Column,
}

impl IndexMatrix {
    /// Builds a dense matrix from equally sized rows.
    pub fn from_rows<R, C>(rows: Vec<Vec<f64>>, row2word: R, col2word: C) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if nrows == 0 || ncols == 0 {
            return Err(SimilarityError::Empty);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
            return Err(SimilarityError::RaggedRows {
                row,
                expected: ncols,
                found: r.len(),
            });
        }
        let values = rows.into_iter().flatten();
        Self::with_labels(
            collect_labels(row2word),
            collect_labels(col2word),
            Storage::Dense(DenseMatrix::from_iterator(values, nrows, ncols, 0)),
        )
    }

    /// Builds a sparse CSR matrix from `(row, col, value)` triplets.
    ///
    /// Repeated positions are summed.
    pub fn from_triplets<R, C>(
        shape: (usize, usize),
        triplets: &[(usize, usize, f64)],
        row2word: R,
        col2word: C,
    ) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let (rows, cols) = shape;
        if rows == 0 || cols == 0 {
            return Err(SimilarityError::Empty);
        }
        let mut tri = TriMat::new(shape);
        for &(row, col, v) in triplets {
            if row >= rows || col >= cols {
                return Err(SimilarityError::OutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            tri.add_triplet(row, col, v);
        }
        let csr: CsMat<f64> = tri.to_csr();
        Self::with_labels(
            collect_labels(row2word),
            collect_labels(col2word),
            Storage::Sparse(csr),
        )
    }

    /// Wraps an existing smartcore matrix.
    pub fn from_dense<R, C>(matrix: DenseMatrix<f64>, row2word: R, col2word: C) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let (rows, cols) = matrix.shape();
        if rows == 0 || cols == 0 {
            return Err(SimilarityError::Empty);
        }
        Self::with_labels(
            collect_labels(row2word),
            collect_labels(col2word),
            Storage::Dense(matrix),
        )
    }

    /// Wraps an existing sprs matrix; CSC input is converted to CSR.
    pub fn from_sparse<R, C>(matrix: CsMat<f64>, row2word: R, col2word: C) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        if matrix.rows() == 0 || matrix.cols() == 0 {
            return Err(SimilarityError::Empty);
        }
        let matrix = if matrix.is_csr() {
            matrix
        } else {
            matrix.to_csr()
        };
        Self::with_labels(
            collect_labels(row2word),
            collect_labels(col2word),
            Storage::Sparse(matrix),
        )
    }

    fn with_labels(row2word: Vec<String>, col2word: Vec<String>, storage: Storage) -> Result<Self> {
        let (rows, cols) = storage_shape(&storage);
        let word2row = index_labels(Axis::Rows, &row2word, rows)?;
        let word2col = index_labels(Axis::Columns, &col2word, cols)?;
        Ok(Self {
            row2word,
            col2word,
            word2row,
            word2col,
            storage,
        })
    }

    /// Assembles a matrix whose labels are already known to be valid.
    fn assemble(row2word: Vec<String>, col2word: Vec<String>, storage: Storage) -> Self {
        let word2row = row2word.iter().cloned().zip(0..).collect();
        let word2col = col2word.iter().cloned().zip(0..).collect();
        Self {
            row2word,
            col2word,
            word2row,
            word2col,
            storage,
        }
    }

    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub fn is_sparse(&self) -> bool {
        matches!(self.storage, Storage::Sparse(_))
    }

    /// Number of stored values (every cell for dense storage).
    pub fn nnz(&self) -> usize {
        match &self.storage {
            Storage::Dense(m) => {
                let (r, c) = m.shape();
                r * c
            }
            Storage::Sparse(m) => m.nnz(),
        }
    }

    #[inline]
    pub fn word2row(&self, word: &str) -> Option<usize> {
        self.word2row.get(word).copied()
    }

    #[inline]
    pub fn word2col(&self, word: &str) -> Option<usize> {
        self.word2col.get(word).copied()
    }

    /// Value addressed by labels.
    pub fn get(&self, row_word: &str, col_word: &str) -> Option<f64> {
        let row = self.word2row(row_word)?;
        let col = self.word2col(col_word)?;
        Some(self.value(row, col))
    }

    /// Row-major copy of all values.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let (_, cols) = self.shape();
        self.to_row_major()
            .chunks(cols)
            .map(<[f64]>::to_vec)
            .collect()
    }

    /// `(row label, value)` pairs of the first column, in row order.
    pub fn scores(&self) -> Vec<(String, f64)> {
        self.row2word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), self.value(i, 0)))
            .collect()
    }

    pub fn to_dense(&self) -> Self {
        match &self.storage {
            Storage::Dense(_) => self.clone(),
            Storage::Sparse(_) => self.derive(
                self.row2word.clone(),
                self.col2word.clone(),
                self.to_row_major(),
                false,
            ),
        }
    }

    pub fn to_sparse(&self) -> Self {
        match &self.storage {
            Storage::Sparse(_) => self.clone(),
            Storage::Dense(_) => self.derive(
                self.row2word.clone(),
                self.col2word.clone(),
                self.to_row_major(),
                true,
            ),
        }
    }

    fn to_row_major(&self) -> Vec<f64> {
        let (rows, cols) = self.shape();
        match &self.storage {
            Storage::Dense(m) => (0..rows)
                .flat_map(|i| (0..cols).map(move |j| *m.get((i, j))))
                .collect(),
            Storage::Sparse(m) => {
                let mut out = vec![0.0; rows * cols];
                for (i, row) in m.outer_iterator().enumerate() {
                    for (j, &v) in row.iter() {
                        out[i * cols + j] = v;
                    }
                }
                out
            }
        }
    }

    /// New matrix from row-major values, in the requested storage.
    fn derive(&self, row2word: Vec<String>, col2word: Vec<String>, values: Vec<f64>, sparse: bool) -> Self {
        let (rows, cols) = (row2word.len(), col2word.len());
        let storage = if sparse {
            let mut tri = TriMat::new((rows, cols));
            for (idx, &v) in values.iter().enumerate() {
                if v != 0.0 {
                    tri.add_triplet(idx / cols, idx % cols, v);
                }
            }
            let csr: CsMat<f64> = tri.to_csr();
            Storage::Sparse(csr)
        } else {
            Storage::Dense(DenseMatrix::from_iterator(values.into_iter(), rows, cols, 0))
        };
        Self::assemble(row2word, col2word, storage)
    }

    /// Submatrix picking rows and columns by position, in the given order.
    fn select(&self, rows: &[usize], cols: &[usize]) -> Self {
        let row2word: Vec<String> = rows.iter().map(|&i| self.row2word[i].clone()).collect();
        let col2word: Vec<String> = cols.iter().map(|&j| self.col2word[j].clone()).collect();
        match &self.storage {
            Storage::Dense(m) => {
                let values = rows
                    .iter()
                    .flat_map(|&i| cols.iter().map(move |&j| *m.get((i, j))))
                    .collect();
                self.derive(row2word, col2word, values, false)
            }
            Storage::Sparse(m) => {
                let mut new_col = vec![None; self.col2word.len()];
                for (pos, &j) in cols.iter().enumerate() {
                    new_col[j] = Some(pos);
                }
                let mut tri = TriMat::new((rows.len(), cols.len()));
                for (new_i, &i) in rows.iter().enumerate() {
                    if let Some(row) = m.outer_view(i) {
                        for (j, &v) in row.iter() {
                            if let Some(new_j) = new_col[j] {
                                tri.add_triplet(new_i, new_j, v);
                            }
                        }
                    }
                }
                let csr: CsMat<f64> = tri.to_csr();
                Self::assemble(row2word, col2word, Storage::Sparse(csr))
            }
        }
    }

    fn broadcast(&self, other: &Self, op: &'static str) -> Result<Broadcast> {
        let (lr, lc) = self.shape();
        match other.shape() {
            (r, c) if r == lr && c == lc => Ok(Broadcast::Same),
            (1, c) if c == lc => Ok(Broadcast::Row),
            (r, 1) if r == lr => Ok(Broadcast::Column),
            right => Err(SimilarityError::DimensionMismatch {
                op,
                left: (lr, lc),
                right,
            }),
        }
    }

    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Self, op: &'static str, f: F) -> Result<Self> {
        let mode = self.broadcast(other, op)?;
        let (rows, cols) = self.shape();
        let rhs = |i: usize, j: usize| match mode {
            Broadcast::Same => other.value(i, j),
            Broadcast::Row => other.value(0, j),
            Broadcast::Column => other.value(i, 0),
        };
        let lhs = self.to_row_major();
        let values = (0..rows)
            .flat_map(|i| (0..cols).map(move |j| (i, j)))
            .map(|(i, j)| f(lhs[i * cols + j], rhs(i, j)))
            .collect();
        Ok(self.derive(self.row2word.clone(), self.col2word.clone(), values, false))
    }

    fn all_finite(&self) -> bool {
        match &self.storage {
            Storage::Dense(m) => {
                let (rows, cols) = m.shape();
                (0..rows).all(|i| (0..cols).all(|j| m.get((i, j)).is_finite()))
            }
            Storage::Sparse(m) => m.data().iter().all(|v| v.is_finite()),
        }
    }
}

impl LabeledMatrix for IndexMatrix {
    #[inline]
    fn shape(&self) -> (usize, usize) {
        storage_shape(&self.storage)
    }

    #[inline]
    fn row2word(&self) -> &[String] {
        &self.row2word
    }

    #[inline]
    fn col2word(&self) -> &[String] {
        &self.col2word
    }

    #[inline]
    fn value(&self, row: usize, col: usize) -> f64 {
        let (rows, cols) = self.shape();
        assert!(row < rows && col < cols, "Index out of bounds");
        match &self.storage {
            Storage::Dense(m) => *m.get((row, col)),
            Storage::Sparse(m) => m.get(row, col).copied().unwrap_or(0.0),
        }
    }

    fn row(&self, word: &str) -> Result<Self> {
        let i = self
            .word2row(word)
            .ok_or_else(|| SimilarityError::UnknownWord(word.to_string()))?;
        let cols: Vec<usize> = (0..self.col2word.len()).collect();
        Ok(self.select(&[i], &cols))
    }

    fn synchronize_word_order(&self, other: &Self, axis: Axis) -> Result<Self> {
        let (own, lookup) = match axis {
            Axis::Rows => (&self.row2word, &self.word2row),
            Axis::Columns => (&self.col2word, &self.word2col),
        };
        let mut order: Vec<usize> = other
            .labels(axis)
            .iter()
            .filter_map(|w| lookup.get(w).copied())
            .collect();
        let shared = order.len();
        let other_lookup = match axis {
            Axis::Rows => &other.word2row,
            Axis::Columns => &other.word2col,
        };
        order.extend(
            own.iter()
                .enumerate()
                .filter(|(_, w)| !other_lookup.contains_key(*w))
                .map(|(i, _)| i),
        );
        trace!(
            "Synchronizing {:?}: {} shared labels, {} unmatched",
            axis,
            shared,
            order.len() - shared
        );

        let all_rows: Vec<usize> = (0..self.row2word.len()).collect();
        let all_cols: Vec<usize> = (0..self.col2word.len()).collect();
        Ok(match axis {
            Axis::Rows => self.select(&order, &all_cols),
            Axis::Columns => self.select(&all_rows, &order),
        })
    }

    fn transpose(&self) -> Self {
        let (rows, cols) = self.shape();
        match &self.storage {
            Storage::Dense(m) => {
                let values = (0..cols)
                    .flat_map(|j| (0..rows).map(move |i| *m.get((i, j))))
                    .collect();
                self.derive(self.col2word.clone(), self.row2word.clone(), values, false)
            }
            Storage::Sparse(m) => {
                let csr: CsMat<f64> = m.transpose_view().to_csr();
                Self::assemble(
                    self.col2word.clone(),
                    self.row2word.clone(),
                    Storage::Sparse(csr),
                )
            }
        }
    }

    fn dot(&self, other: &Self) -> Result<Self> {
        let (rows, inner) = self.shape();
        let (other_inner, cols) = other.shape();
        if inner != other_inner {
            return Err(SimilarityError::DimensionMismatch {
                op: "dot",
                left: (rows, inner),
                right: (other_inner, cols),
            });
        }
        let row2word = self.row2word.clone();
        let col2word = other.col2word.clone();

        if let (Storage::Sparse(a), Storage::Sparse(b)) = (&self.storage, &other.storage) {
            // CSR · CSR stays CSR
            let csr: CsMat<f64> = a * b;
            return Ok(Self::assemble(row2word, col2word, Storage::Sparse(csr)));
        }

        let lhs = self.to_row_major();
        let rhs = other.to_row_major();
        let mut values = vec![0.0; rows * cols];
        for i in 0..rows {
            for k in 0..inner {
                let a_ik = lhs[i * inner + k];
                if a_ik == 0.0 {
                    continue;
                }
                for j in 0..cols {
                    values[i * cols + j] += a_ik * rhs[k * cols + j];
                }
            }
        }
        Ok(self.derive(row2word, col2word, values, false))
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    fn multiply(&self, other: &Self) -> Result<Self> {
        let mode = self.broadcast(other, "multiply")?;
        match &self.storage {
            // zeros stay zero as long as the right operand is finite
            Storage::Sparse(m) if other.all_finite() => {
                let mut tri = TriMat::new(self.shape());
                for (i, row) in m.outer_iterator().enumerate() {
                    for (j, &v) in row.iter() {
                        let rhs = match mode {
                            Broadcast::Same => other.value(i, j),
                            Broadcast::Row => other.value(0, j),
                            Broadcast::Column => other.value(i, 0),
                        };
                        let prod = v * rhs;
                        if prod != 0.0 {
                            tri.add_triplet(i, j, prod);
                        }
                    }
                }
                let csr: CsMat<f64> = tri.to_csr();
                Ok(Self::assemble(
                    self.row2word.clone(),
                    self.col2word.clone(),
                    Storage::Sparse(csr),
                ))
            }
            _ => self.zip_with(other, "multiply", |a, b| a * b),
        }
    }

    fn sum(&self, axis: Axis) -> Self {
        let (rows, cols) = self.shape();
        let aggregate = vec![AGGREGATE_LABEL.to_string()];
        let mut values = match axis {
            Axis::Columns => vec![0.0; rows],
            Axis::Rows => vec![0.0; cols],
        };
        match &self.storage {
            Storage::Dense(m) => {
                for i in 0..rows {
                    for j in 0..cols {
                        let v = *m.get((i, j));
                        match axis {
                            Axis::Columns => values[i] += v,
                            Axis::Rows => values[j] += v,
                        }
                    }
                }
            }
            Storage::Sparse(m) => {
                for (i, row) in m.outer_iterator().enumerate() {
                    for (j, &v) in row.iter() {
                        match axis {
                            Axis::Columns => values[i] += v,
                            Axis::Rows => values[j] += v,
                        }
                    }
                }
            }
        }
        match axis {
            Axis::Columns => self.derive(self.row2word.clone(), aggregate, values, false),
            Axis::Rows => self.derive(aggregate, self.col2word.clone(), values, false),
        }
    }

    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        match &self.storage {
            Storage::Sparse(m) if f(0.0) == 0.0 => {
                let mut tri = TriMat::new(self.shape());
                for (i, row) in m.outer_iterator().enumerate() {
                    for (j, &v) in row.iter() {
                        tri.add_triplet(i, j, f(v));
                    }
                }
                let csr: CsMat<f64> = tri.to_csr();
                Self::assemble(
                    self.row2word.clone(),
                    self.col2word.clone(),
                    Storage::Sparse(csr),
                )
            }
            _ => {
                let values = self.to_row_major().into_iter().map(f).collect();
                self.derive(self.row2word.clone(), self.col2word.clone(), values, false)
            }
        }
    }

    fn frobenius_norm(&self) -> f64 {
        match &self.storage {
            Storage::Dense(_) => self.to_row_major().iter().map(|&x| x * x).sum::<f64>().sqrt(),
            Storage::Sparse(m) => m.data().iter().map(|&x| x * x).sum::<f64>().sqrt(),
        }
    }

    fn sort(&self, ascending: bool) -> Self {
        let mut order: Vec<usize> = (0..self.row2word.len()).collect();
        let keys: Vec<f64> = order.iter().map(|&i| self.value(i, 0)).collect();
        order.sort_by(|&a, &b| score_order(keys[a], keys[b], ascending));
        let cols: Vec<usize> = (0..self.col2word.len()).collect();
        self.select(&order, &cols)
    }

    fn relabel(&self, axis: Axis, labels: Vec<String>) -> Result<Self> {
        let (rows, cols) = self.shape();
        let mut out = self.clone();
        match axis {
            Axis::Rows => {
                out.word2row = index_labels(axis, &labels, rows)?;
                out.row2word = labels;
            }
            Axis::Columns => {
                out.word2col = index_labels(axis, &labels, cols)?;
                out.col2word = labels;
            }
        }
        Ok(out)
    }
}

fn storage_shape(storage: &Storage) -> (usize, usize) {
    match storage {
        Storage::Dense(m) => m.shape(),
        Storage::Sparse(m) => (m.rows(), m.cols()),
    }
}

fn collect_labels<I>(labels: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    labels.into_iter().map(Into::into).collect()
}

fn index_labels(axis: Axis, labels: &[String], expected: usize) -> Result<HashMap<String, usize>> {
    if labels.len() != expected {
        return Err(SimilarityError::LabelCount {
            axis,
            expected,
            found: labels.len(),
        });
    }
    let mut index = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), i).is_some() {
            return Err(SimilarityError::DuplicateLabel {
                axis,
                label: label.clone(),
            });
        }
    }
    Ok(index)
}
