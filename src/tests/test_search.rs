use approx::assert_relative_eq;

use crate::errors::SimilarityError;
use crate::labeled::LabeledMatrix;
use crate::search::{Metric, NeighbourSearchBuilder, SearchParams};
use crate::tests::test_helpers::{both_storages, init_logging, matrix, vector, word_space};

#[test]
fn test_metric_parsing_and_display() {
    assert_eq!("cos".parse::<Metric>().unwrap(), Metric::Cos);
    assert_eq!("Cosine".parse::<Metric>().unwrap(), Metric::Cos);
    assert_eq!(" dot ".parse::<Metric>().unwrap(), Metric::Dot);
    assert_eq!("l2".parse::<Metric>().unwrap(), Metric::Euclidean);
    assert_eq!(
        "jaccard".parse::<Metric>().unwrap_err(),
        SimilarityError::UnknownMetric("jaccard".to_string())
    );
    for metric in [Metric::Dot, Metric::Euclidean, Metric::Cos] {
        assert_eq!(metric.to_string().parse::<Metric>().unwrap(), metric);
    }
}

#[test]
fn test_params_defaults_and_partial_json() {
    let params = SearchParams::default();
    assert_eq!(params.metric, Metric::Cos);
    assert!(params.assure_consistency);
    assert_eq!(params.k, 10);
    assert!(!params.include_self);

    let parsed: SearchParams = serde_json::from_str(r#"{"metric": "euclidean", "k": 2}"#).unwrap();
    assert_eq!(parsed.metric, Metric::Euclidean);
    assert_eq!(parsed.k, 2);
    assert!(parsed.assure_consistency);

    let aliased: SearchParams = serde_json::from_str(r#"{"metric": "cosine"}"#).unwrap();
    assert_eq!(aliased.metric, Metric::Cos);
}

#[test]
fn test_builder_sets_params() {
    let search = NeighbourSearchBuilder::new()
        .with_metric(Metric::Dot)
        .with_consistency(false)
        .with_k(3)
        .with_self_match(true)
        .build();
    assert_eq!(
        search.params(),
        &SearchParams {
            metric: Metric::Dot,
            assure_consistency: false,
            k: 3,
            include_self: true,
        }
    );

    let restored = NeighbourSearchBuilder::from_params(search.params().clone()).build();
    assert_eq!(restored.params(), search.params());
}

#[test]
fn test_nearest_neighbours_by_cosine() {
    init_logging();
    for m in both_storages(word_space()) {
        let search = NeighbourSearchBuilder::new().with_k(2).build();
        let hits = search.nearest_neighbours(&m, "car").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, "truck");
        assert_eq!(hits[1].0, "thing");
        assert!(hits[0].1 >= hits[1].1);
        assert!(hits.iter().all(|(w, _)| w != "car"));
    }
}

#[test]
fn test_nearest_neighbours_with_self_match() {
    let m = word_space();
    let search = NeighbourSearchBuilder::new()
        .with_metric(Metric::Euclidean)
        .with_self_match(true)
        .with_k(3)
        .build();
    let hits = search.nearest_neighbours(&m, "dog").unwrap();
    assert_eq!(hits[0].0, "dog");
    assert_relative_eq!(hits[0].1, 1.0);
    assert_eq!(hits[1].0, "cat");
}

#[test]
fn test_dot_ranking_is_sorted_even_though_metric_is_not() {
    let m = word_space();
    let search = NeighbourSearchBuilder::new()
        .with_metric(Metric::Dot)
        .with_k(10)
        .build();
    let q = vector(vec![0.0, 0.0, 1.0, 1.0], "q", &["pet", "fur", "road", "wheel"]);

    let raw = search.score(&m, &q).unwrap();
    assert_eq!(raw.row2word(), m.row2word());

    let hits = search.nearest_to_vector(&m, &q).unwrap();
    assert_eq!(hits.len(), 5);
    let words: Vec<&str> = hits.iter().map(|(w, _)| w.as_str()).collect();
    assert_eq!(words[..2], ["car", "truck"]);
    assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn test_search_errors() {
    let m = word_space();
    let search = NeighbourSearchBuilder::new().build();
    assert_eq!(
        search.nearest_neighbours(&m, "boat").unwrap_err(),
        SimilarityError::UnknownWord("boat".to_string())
    );

    let two_rows = matrix(
        vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]],
        &["a", "b"],
        &["pet", "fur", "road", "wheel"],
    );
    let unchecked = NeighbourSearchBuilder::new().with_consistency(false).build();
    assert_eq!(
        unchecked.nearest_to_vector(&m, &two_rows).unwrap_err(),
        SimilarityError::Shape { rows: 2, cols: 4 }
    );

    let foreign = vector(vec![1.0, 1.0], "q", &["sea", "sail"]);
    assert_eq!(
        search.nearest_to_vector(&m, &foreign).unwrap_err(),
        SimilarityError::SchemaMismatch
    );
}

#[test]
fn test_zero_row_ranks_last_under_cosine() {
    let m = matrix(
        vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 0.0], vec![0.0, 1.0]],
        &["cat", "kitten", "empty", "truck"],
        &["purr", "wheel"],
    );
    for m in both_storages(m) {
        let search = NeighbourSearchBuilder::new().with_k(3).build();
        let hits = search.nearest_neighbours(&m, "cat").unwrap();
        let words: Vec<&str> = hits.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, ["kitten", "truck", "empty"]);
        assert!(hits[2].1.is_nan());

        let top = NeighbourSearchBuilder::new().with_k(2).build();
        let hits = top.nearest_neighbours(&m, "cat").unwrap();
        assert!(hits.iter().all(|(w, s)| w != "empty" && s.is_finite()));
    }
}

#[test]
fn test_nan_scores_rank_last_for_either_sign() {
    let m = matrix(
        vec![vec![f64::NAN, 0.0], vec![0.5, 0.0], vec![-f64::NAN, 0.0], vec![2.0, 0.0]],
        &["pos_nan", "low", "neg_nan", "high"],
        &["f1", "f2"],
    );
    let q = vector(vec![1.0, 0.0], "q", &["f1", "f2"]);
    let search = NeighbourSearchBuilder::new()
        .with_metric(Metric::Dot)
        .with_k(4)
        .build();
    let hits = search.nearest_to_vector(&m, &q).unwrap();
    let words: Vec<&str> = hits.iter().map(|(w, _)| w.as_str()).collect();
    assert_eq!(words[..2], ["high", "low"]);
    assert!(hits[2..].iter().all(|(_, s)| s.is_nan()));
}
