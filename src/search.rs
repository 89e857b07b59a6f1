//! Nearest-neighbour ranking over a labeled matrix.
//!
//! `NeighbourSearch` wraps the three metrics behind a serializable
//! `SearchParams` and ranks every row against a query by brute force.
//! Unlike the raw metrics it always returns scores sorted descending, whatever
//! the metric. NaN scores (zero-norm rows under cosine) rank last.
//!
//! # Examples
//!
//! ```
//! use wordspace::index_matrix::IndexMatrix;
//! use wordspace::search::{Metric, NeighbourSearchBuilder};
//!
//! let m = IndexMatrix::from_rows(
//!     vec![vec![1.0, 0.1], vec![0.9, 0.2], vec![0.0, 1.0]],
//!     ["cat", "kitten", "truck"],
//!     ["purr", "wheel"],
//! ).unwrap();
//!
//! let search = NeighbourSearchBuilder::new()
//!     .with_metric(Metric::Cos)
//!     .with_k(1)
//!     .build();
//! let hits = search.nearest_neighbours(&m, "cat").unwrap();
//! assert_eq!(hits[0].0, "kitten");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use log::{debug, info};

use crate::errors::{Result, SimilarityError};
use crate::labeled::{score_order, LabeledMatrix};
use crate::similarity;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Dot,
    #[serde(alias = "l2")]
    Euclidean,
    #[default]
    #[serde(alias = "cosine")]
    Cos,
}

impl Metric {
    /// Scores every row of `matrix` against `vector` with this metric.
    pub fn apply<M: LabeledMatrix>(&self, matrix: &M, vector: &M, assure_consistency: bool) -> Result<M> {
        match self {
            Metric::Dot => similarity::dot(matrix, vector, assure_consistency),
            Metric::Euclidean => similarity::euclidean(matrix, vector, assure_consistency),
            Metric::Cos => similarity::cos(matrix, vector, assure_consistency),
        }
    }
}

impl FromStr for Metric {
    type Err = SimilarityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dot" => Ok(Metric::Dot),
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "cos" | "cosine" => Ok(Metric::Cos),
            _ => Err(SimilarityError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Dot => "dot",
            Metric::Euclidean => "euclidean",
            Metric::Cos => "cos",
        };
        f.pad(name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchParams {
    pub metric: Metric,
    /// Validate and reorder the query's columns before scoring.
    pub assure_consistency: bool,
    /// Number of neighbours returned.
    pub k: usize,
    /// Keep the query word among its own neighbours.
    pub include_self: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            metric: Metric::Cos,
            assure_consistency: true,
            k: 10,
            include_self: false,
        }
    }
}

pub struct NeighbourSearchBuilder {
    params: SearchParams,
}

impl Default for NeighbourSearchBuilder {
    fn default() -> Self {
        debug!("Creating NeighbourSearchBuilder with default parameters");
        Self {
            params: SearchParams::default(),
        }
    }
}

impl NeighbourSearchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from previously stored parameters.
    pub fn from_params(params: SearchParams) -> Self {
        info!("Initializing NeighbourSearchBuilder from {:?}", params);
        Self { params }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        info!("Setting metric: {}", metric);
        self.params.metric = metric;
        self
    }

    /// `false` skips query validation: the caller asserts the columns already
    /// match the matrix, otherwise scores are silently wrong.
    pub fn with_consistency(mut self, assure_consistency: bool) -> Self {
        info!("Setting consistency check: {}", assure_consistency);
        self.params.assure_consistency = assure_consistency;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        info!("Setting k: {}", k);
        self.params.k = k;
        self
    }

    pub fn with_self_match(mut self, include_self: bool) -> Self {
        info!("Setting self match: {}", include_self);
        self.params.include_self = include_self;
        self
    }

    pub fn build(self) -> NeighbourSearch {
        debug!("Building NeighbourSearch with {:?}", self.params);
        NeighbourSearch {
            params: self.params,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NeighbourSearch {
    params: SearchParams,
}

impl NeighbourSearch {
    #[inline]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Raw metric output for `vector`, as the metric returns it.
    pub fn score<M: LabeledMatrix>(&self, matrix: &M, vector: &M) -> Result<M> {
        self.params
            .metric
            .apply(matrix, vector, self.params.assure_consistency)
    }

    /// Top-k rows of `matrix` most similar to the row labelled `word`.
    ///
    /// The word itself is dropped unless `include_self` is set.
    pub fn nearest_neighbours<M: LabeledMatrix>(&self, matrix: &M, word: &str) -> Result<Vec<(String, f64)>> {
        let query = matrix.row(word)?;
        let skip = if self.params.include_self { None } else { Some(word) };
        self.rank(matrix, &query, skip)
    }

    /// Top-k rows of `matrix` most similar to an external query vector.
    pub fn nearest_to_vector<M: LabeledMatrix>(&self, matrix: &M, vector: &M) -> Result<Vec<(String, f64)>> {
        self.rank(matrix, vector, None)
    }

    fn rank<M: LabeledMatrix>(&self, matrix: &M, vector: &M, skip: Option<&str>) -> Result<Vec<(String, f64)>> {
        if !vector.is_vector() {
            let (rows, cols) = vector.shape();
            return Err(SimilarityError::Shape { rows, cols });
        }
        let scores = self.score(matrix, vector)?;
        let mut ranked: Vec<(String, f64)> = scores
            .row2word()
            .iter()
            .enumerate()
            .filter(|(_, w)| skip != Some(w.as_str()))
            .map(|(i, w)| (w.clone(), scores.value(i, 0)))
            .collect();
        ranked.sort_by(|a, b| score_order(a.1, b.1, false));
        ranked.truncate(self.params.k);
        debug!(
            "{} neighbours by {} out of {} rows",
            ranked.len(),
            self.params.metric,
            matrix.shape().0
        );
        Ok(ranked)
    }
}
