//! Model builders and inspection helpers shared by unit and integration tests.

use crate::repr::{
    DataDictionary, DataField, DataType, FieldUsage, MiningField, MiningFunction, MiningModel,
    MiningSchema, Model, ModelKind, MultipleModelMethod, Node, NodeId, OpType, Predicate,
    ScoreDistribution, Segment, Segmentation, SimpleOperator, Tree, TreeModel, Value,
};

// =============================================================================
// Builders
// =============================================================================

/// A continuous double field.
pub fn numeric_field(name: &str) -> DataField {
    DataField::new(name, OpType::Continuous, DataType::Double)
}

/// A categorical string field with declared values.
pub fn categorical_field(name: &str, values: &[&str]) -> DataField {
    let mut field = DataField::new(name, OpType::Categorical, DataType::String);
    field.values = values.iter().map(|v| v.to_string()).collect();
    field
}

/// `field <= threshold`.
pub fn at_most(field: &str, threshold: f64) -> Predicate {
    Predicate::simple(field, SimpleOperator::LessOrEqual, threshold)
}

/// A root predicting `score` with one always-true leaf child.
pub fn pass_through(score: impl Into<Value> + Clone) -> Tree {
    Tree::new(Node::leaf(Predicate::True, score.clone()).with_id("0"))
        .with_child(Node::leaf(Predicate::True, score).with_id("1"))
}

/// A root with one leaf per `(upper bound, score)` on `field`, plus a final
/// catch-all leaf.
pub fn ladder<V: Into<Value>>(field: &str, root_score: impl Into<Value>, steps: Vec<(f64, V)>, last: V) -> Tree {
    let mut tree = Tree::new(Node::leaf(Predicate::True, root_score).with_id("0"));
    let n_steps = steps.len();
    for (i, (bound, score)) in steps.into_iter().enumerate() {
        tree.push_child(
            Tree::ROOT,
            Node::leaf(at_most(field, bound), score).with_id((i + 1).to_string()),
        );
    }
    tree.push_child(
        Tree::ROOT,
        Node::leaf(Predicate::True, last).with_id((n_steps + 1).to_string()),
    );
    tree
}

/// An ensemble of trees, all segments selected with weight 1.
pub fn ensemble(
    function: MiningFunction,
    method: MultipleModelMethod,
    fields: Vec<DataField>,
    target: &str,
    trees: Vec<Tree>,
) -> Model {
    let mining_schema = MiningSchema {
        fields: fields
            .iter()
            .map(|f| MiningField {
                name: f.name.clone(),
                usage: if f.name == target {
                    FieldUsage::Target
                } else {
                    FieldUsage::Active
                },
            })
            .collect(),
    };
    let segments = trees
        .into_iter()
        .enumerate()
        .map(|(i, tree)| {
            let mut segment = Segment::new(ModelKind::Tree(TreeModel::new(function, tree)));
            segment.id = Some((i + 1).to_string());
            segment
        })
        .collect();

    Model::new(
        DataDictionary::new(fields),
        ModelKind::Mining(MiningModel {
            name: None,
            function,
            mining_schema,
            segmentation: Segmentation { method, segments },
        }),
    )
}

/// Two-segment classifier on `x` predicting `y` in {no, yes}, blended by
/// average.
///
/// - segment 1: root "yes" with a single always-true leaf "yes"
/// - segment 2: root "yes" with leaves `x <= 1` "yes", `x <= 2` "no", else "yes"
pub fn two_segment_classifier() -> Model {
    ensemble(
        MiningFunction::Classification,
        MultipleModelMethod::Average,
        vec![numeric_field("x"), categorical_field("y", &["no", "yes"])],
        "y",
        vec![
            pass_through("yes"),
            ladder("x", "yes", vec![(1.0, "yes"), (2.0, "no")], "yes"),
        ],
    )
}

/// Two-segment regressor on `x` predicting `y`.
///
/// - segment 1: leaves `x <= 0` 1.0, else 2.0
/// - segment 2: leaves `x <= 5` 10.0, else 20.0
pub fn two_segment_regressor(method: MultipleModelMethod) -> Model {
    ensemble(
        MiningFunction::Regression,
        method,
        vec![numeric_field("x"), numeric_field("y")],
        "y",
        vec![
            ladder("x", 1.5, vec![(0.0, 1.0)], 2.0),
            ladder("x", 15.0, vec![(5.0, 10.0)], 20.0),
        ],
    )
}

/// Overwrite every counter with stale statistics.
pub fn make_stale(model: &mut Model) {
    model.kind.for_each_tree_mut(&mut |tree: &mut Tree| {
        for node in tree.nodes_mut() {
            node.record_count = Some(99);
            node.score_distributions = vec![
                ScoreDistribution {
                    value: Value::text("yes"),
                    record_count: 40,
                    probability: Some(0.4),
                    confidence: Some(0.3),
                },
                ScoreDistribution {
                    value: Value::text("no"),
                    record_count: 59,
                    probability: Some(0.6),
                    confidence: Some(0.2),
                },
            ];
        }
    });
}

// =============================================================================
// Inspection
// =============================================================================

/// Tree of segment `segment` of a top-level ensemble.
///
/// # Panics
///
/// Panics if the model is not an ensemble of trees.
pub fn segment_tree(model: &Model, segment: usize) -> &Tree {
    let ModelKind::Mining(mining) = &model.kind else {
        panic!("model is not an ensemble");
    };
    match &mining.segmentation.segments[segment].model {
        ModelKind::Tree(tree) => &tree.tree,
        ModelKind::Mining(_) => panic!("segment {segment} is not a tree"),
    }
}

/// Record count of one node.
pub fn record_count(model: &Model, segment: usize, node: NodeId) -> Option<u64> {
    segment_tree(model, segment).node(node).record_count
}

/// `(label, count)` pairs of one node, in stored order.
pub fn class_counts(model: &Model, segment: usize, node: NodeId) -> Vec<(String, u64)> {
    segment_tree(model, segment)
        .node(node)
        .score_distributions
        .iter()
        .map(|d| (d.value.to_string(), d.record_count))
        .collect()
}

/// Record counts of every node of every tree, in arena order.
pub fn all_record_counts(model: &Model) -> Vec<Vec<Option<u64>>> {
    let mut out = Vec::new();
    model.kind.for_each_tree(&mut |tree: &Tree| {
        out.push(tree.nodes().iter().map(|n| n.record_count).collect());
    });
    out
}
