//! # wordspace
//!
//! Similarity metrics for distributional semantic models: rank the rows of a
//! labeled word-vector matrix against a query vector by dot product, inverse
//! euclidean distance or cosine similarity.
//!
//! Before scoring, the query's feature axis is reconciled with the matrix's
//! (same labels, same order), see [`consistency::assure_consistency`]. Metrics
//! are generic over the [`labeled::LabeledMatrix`] contract; [`IndexMatrix`]
//! implements it over dense (`smartcore`) and sparse CSR (`sprs`) storage.
//!
//! ```
//! use wordspace::{cos, IndexMatrix, LabeledMatrix};
//!
//! let m = IndexMatrix::from_rows(
//!     vec![vec![1.0, 2.0], vec![2.0, 4.0]],
//!     ["a", "b"],
//!     ["x", "y"],
//! ).unwrap();
//! let q = m.row("a").unwrap();
//! let sims = cos(&m, &q, true).unwrap();
//! assert!((sims.get("b", "a").unwrap() - 1.0).abs() < 1e-12);
//! ```
pub mod consistency;
pub mod errors;
pub mod index_matrix;
pub mod labeled;
pub mod search;
pub mod similarity;

pub use consistency::assure_consistency;
pub use errors::{Result, SimilarityError};
pub use index_matrix::{IndexMatrix, Storage};
pub use labeled::{score_order, Axis, LabeledMatrix};
pub use search::{Metric, NeighbourSearch, NeighbourSearchBuilder, SearchParams};
pub use similarity::{cos, dot, euclidean, word_cos, Operands};

#[cfg(test)]
mod tests;
