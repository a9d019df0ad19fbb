//! Counter reset pass.

use crate::repr::{Model, Tree};

/// Zero every counter of every tree in `model`.
///
/// Each node's record count becomes 0. Each score distribution's count
/// becomes 0, its probability 1.0 if its label is the node's score and 0.0
/// otherwise, and its confidence is cleared. Topology, predicates and scores
/// are left alone, so running the pass twice changes nothing.
pub fn reset_counts(model: &mut Model) {
    model.kind.for_each_tree_mut(&mut reset_tree);
}

/// Zero every counter of one tree. See [`reset_counts`].
pub fn reset_tree(tree: &mut Tree) {
    for node in tree.nodes_mut() {
        node.record_count = Some(0);
        for distribution in &mut node.score_distributions {
            distribution.record_count = 0;
            let predicted = node.score.as_ref() == Some(&distribution.value);
            distribution.probability = Some(if predicted { 1.0 } else { 0.0 });
            distribution.confidence = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::ModelKind;
    use crate::testing;

    #[test]
    fn zeroes_counts_and_seeds_probabilities() {
        let mut model = testing::two_segment_classifier();
        testing::make_stale(&mut model);
        reset_counts(&mut model);

        for counts in testing::all_record_counts(&model) {
            assert!(counts.iter().all(|&c| c == Some(0)));
        }

        // Segment 2, node 2 predicts "no".
        let node = testing::segment_tree(&model, 1).node(2);
        let probabilities: Vec<_> = node
            .score_distributions
            .iter()
            .map(|d| (d.value.to_string(), d.record_count, d.probability, d.confidence))
            .collect();
        assert_eq!(
            probabilities,
            vec![
                ("yes".to_string(), 0, Some(0.0), None),
                ("no".to_string(), 0, Some(1.0), None),
            ]
        );
    }

    #[test]
    fn is_idempotent() {
        let mut model = testing::two_segment_classifier();
        testing::make_stale(&mut model);
        reset_counts(&mut model);
        let once = model.clone();
        reset_counts(&mut model);
        assert_eq!(model, once);
    }

    #[test]
    fn leaves_structure_alone() {
        let mut model = testing::two_segment_classifier();
        testing::make_stale(&mut model);
        let before = model.clone();
        reset_counts(&mut model);

        let (ModelKind::Mining(a), ModelKind::Mining(b)) = (&before.kind, &model.kind) else {
            panic!("expected ensembles");
        };
        for (sa, sb) in a.segmentation.segments.iter().zip(&b.segmentation.segments) {
            let (ModelKind::Tree(ta), ModelKind::Tree(tb)) = (&sa.model, &sb.model) else {
                panic!("expected trees");
            };
            for (na, nb) in ta.tree.nodes().iter().zip(tb.tree.nodes()) {
                assert_eq!(na.children(), nb.children());
                assert_eq!(na.predicate, nb.predicate);
                assert_eq!(na.score, nb.score);
            }
        }
    }

    #[test]
    fn node_without_score_predicts_no_class() {
        let mut model = testing::two_segment_classifier();
        testing::make_stale(&mut model);
        model.kind.for_each_tree_mut(&mut |tree: &mut Tree| tree.node_mut(0).score = None);
        reset_counts(&mut model);

        let root = testing::segment_tree(&model, 0).root();
        assert!(root.score_distributions.iter().all(|d| d.probability == Some(0.0)));
    }
}
