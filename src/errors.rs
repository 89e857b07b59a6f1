use thiserror::Error;

use crate::labeled::Axis;

/// Errors surfaced by the metric engine and by `IndexMatrix` construction.
///
/// Shape and schema errors are raised by the consistency guard before any
/// metric runs, so a failed call never yields a partial result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimilarityError {
    #[error("vector should have shape (1, n), got ({rows}, {cols})")]
    Shape { rows: usize, cols: usize },

    #[error("columns of each matrix must match")]
    SchemaMismatch,

    #[error("{op}: incompatible shapes {left:?} and {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("expected {expected} labels along {axis:?}, found {found}")]
    LabelCount {
        axis: Axis,
        expected: usize,
        found: usize,
    },

    #[error("duplicate label {label:?} along {axis:?}")]
    DuplicateLabel { axis: Axis, label: String },

    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("entry ({row}, {col}) is outside a ({rows}, {cols}) matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("matrix must have at least one row and one column")]
    Empty,

    #[error("unknown word {0:?}")]
    UnknownWord(String),

    #[error("unknown metric {0:?}, expected one of: dot, euclidean, cos")]
    UnknownMetric(String),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
