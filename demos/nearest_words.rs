/// Ranks the neighbours of a few words with each metric, over dense and sparse storage.
/// Run with `RUST_LOG=debug` to see the engine's dispatch decisions.
use wordspace::{IndexMatrix, LabeledMatrix, Metric, NeighbourSearchBuilder};

const CONTEXTS: [&str; 6] = ["eat", "drink", "drive", "park", "bark", "purr"];

const COUNTS: &str = r#"
cat;    12,4,0,0,0,9
dog;    15,6,0,2,11,0
kitten; 8,5,0,0,0,7
puppy;  9,4,0,1,6,0
car;    0,0,14,10,0,0
truck;  0,0,12,6,0,0
beer;   1,16,0,0,0,0
"#;

fn parse_counts(text: &str) -> (Vec<String>, Vec<Vec<f64>>) {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| {
            let (word, values) = l.split_once(';')?;
            let row = values
                .split(',')
                .map(|v| v.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            Some((word.trim().to_string(), row))
        })
        .unzip()
}

fn main() {
    env_logger::init();

    let (words, rows) = parse_counts(COUNTS);
    let dense = IndexMatrix::from_rows(rows, words, CONTEXTS).expect("valid counts");
    let sparse = dense.to_sparse();
    println!(
        "word space {:?}: {} stored values dense, {} sparse",
        dense.shape(),
        dense.nnz(),
        sparse.nnz()
    );

    for metric in [Metric::Cos, Metric::Euclidean, Metric::Dot] {
        let search = NeighbourSearchBuilder::new()
            .with_metric(metric)
            .with_k(3)
            .build();
        for word in ["cat", "car"] {
            let from_dense = search.nearest_neighbours(&dense, word).expect("known word");
            let from_sparse = search.nearest_neighbours(&sparse, word).expect("known word");
            assert_eq!(
                from_dense.iter().map(|(w, _)| w).collect::<Vec<_>>(),
                from_sparse.iter().map(|(w, _)| w).collect::<Vec<_>>()
            );
            let shown: Vec<String> = from_dense
                .iter()
                .map(|(w, s)| format!("{w} ({s:.3})"))
                .collect();
            println!("{metric:>9} | {word:<4} -> {}", shown.join(", "));
        }
    }

    // a query whose contexts arrive in another order is realigned before scoring
    let query = IndexMatrix::from_rows(
        vec![vec![0.0, 9.0, 0.0, 0.0, 0.0, 1.0]],
        ["purring"],
        ["bark", "purr", "park", "drive", "drink", "eat"],
    )
    .expect("valid query");
    let search = NeighbourSearchBuilder::new().with_k(2).build();
    let hits = search.nearest_to_vector(&dense, &query).expect("same contexts");
    println!("      cos | purring -> {hits:?}");
}
