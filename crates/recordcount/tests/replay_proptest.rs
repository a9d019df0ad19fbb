//! Property-based tests for the recount.
//!
//! Counts must not depend on the order rows are replayed in, and every
//! replayed row must reach every root exactly once.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use recordcount::repr::{Model, Tree};
use recordcount::{recount, testing, ReplayConfig};

// =============================================================================
// Generators
// =============================================================================

/// Strategy for one `(x, label)` row. Some x cells are left empty.
fn arb_row() -> impl Strategy<Value = (Option<f64>, &'static str)> {
    (
        prop::option::weighted(0.9, -1.0f64..4.0),
        prop::sample::select(vec!["yes", "no", "maybe"]),
    )
}

fn to_csv(rows: &[(Option<f64>, &str)]) -> String {
    let mut text = String::from("x,y\n");
    for (x, label) in rows {
        let cell = x.map(|x| x.to_string()).unwrap_or_default();
        text.push_str(&format!("{cell},{label}\n"));
    }
    text
}

/// Per node of every tree: record count and class counts sorted by label.
fn counts(model: &Model) -> Vec<Vec<(Option<u64>, Vec<(String, u64)>)>> {
    let mut out = Vec::new();
    model.kind.for_each_tree(&mut |tree: &Tree| {
        out.push(
            tree.nodes()
                .iter()
                .map(|node| {
                    let mut classes: Vec<_> = node
                        .score_distributions
                        .iter()
                        .map(|d| (d.value.to_string(), d.record_count))
                        .collect();
                    classes.sort();
                    (node.record_count, classes)
                })
                .collect(),
        );
    });
    out
}

fn recounted(rows: &[(Option<f64>, &str)]) -> Model {
    let mut model = testing::two_segment_classifier();
    testing::make_stale(&mut model);
    recount(&mut model, to_csv(rows).as_bytes(), &ReplayConfig::default()).unwrap();
    model
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn row_order_does_not_matter(
        (rows, shuffled) in prop_vec(arb_row(), 0..40)
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
    ) {
        prop_assert_eq!(counts(&recounted(&rows)), counts(&recounted(&shuffled)));
    }

    #[test]
    fn every_row_reaches_every_root(rows in prop_vec(arb_row(), 0..40)) {
        let model = recounted(&rows);
        let n_rows = rows.len() as u64;
        model.kind.for_each_tree(&mut |tree: &Tree| {
            assert_eq!(tree.root().record_count, Some(n_rows));
            let by_class: u64 = tree.root().score_distributions.iter().map(|d| d.record_count).sum();
            assert_eq!(by_class, n_rows);
        });
    }
}
