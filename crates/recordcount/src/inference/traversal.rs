//! Tree walking.
//!
//! A walk starts at the root and repeatedly follows the first child whose
//! predicate is true. It records every node it enters, so the same walk that
//! yields a prediction also yields the decision path used for counting.

use super::input::Inputs;
use super::predicate::{evaluate_predicate, Truth};
use super::EvaluationError;
use crate::repr::{MissingValueStrategy, NoTrueChildStrategy, NodeId, Tree, TreeModel, Value};

/// Nodes visited by one walk, root first, and the value it predicts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPath {
    nodes: Vec<NodeId>,
    predicted: Option<Value>,
}

impl DecisionPath {
    pub fn new(nodes: Vec<NodeId>, predicted: Option<Value>) -> Self {
        Self { nodes, predicted }
    }

    /// A walk that never entered the tree.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Visited nodes, root first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Node the walk stopped at.
    pub fn terminal(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn predicted(&self) -> Option<&Value> {
        self.predicted.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Walk `model`'s tree for one row.
pub fn walk(model: &TreeModel, inputs: &Inputs<'_>) -> Result<DecisionPath, EvaluationError> {
    let tree = &model.tree;
    if !evaluate_predicate(&tree.root().predicate, inputs)?.is_true() {
        return Ok(DecisionPath::empty());
    }

    let mut path = vec![Tree::ROOT];
    let mut current = Tree::ROOT;
    loop {
        let node = tree.node(current);
        if node.is_leaf() {
            return Ok(DecisionPath::new(path, node.score.clone()));
        }

        let mut next = None;
        for &child in node.children() {
            match evaluate_predicate(&tree.node(child).predicate, inputs)? {
                Truth::True => {
                    next = Some(child);
                    break;
                }
                Truth::False => {}
                Truth::Unknown => match model.missing_value_strategy {
                    MissingValueStrategy::None => {}
                    MissingValueStrategy::LastPrediction => {
                        return Ok(DecisionPath::new(path, node.score.clone()));
                    }
                    MissingValueStrategy::NullPrediction => {
                        return Ok(DecisionPath::new(path, None));
                    }
                    MissingValueStrategy::DefaultChild => {
                        let child = tree
                            .default_child(current)
                            .ok_or(EvaluationError::MissingDefaultChild(current))?;
                        next = Some(child);
                        break;
                    }
                },
            }
        }

        match next {
            Some(child) => {
                path.push(child);
                current = child;
            }
            None => {
                let predicted = match model.no_true_child_strategy {
                    NoTrueChildStrategy::ReturnNullPrediction => None,
                    NoTrueChildStrategy::ReturnLastPrediction => node.score.clone(),
                };
                return Ok(DecisionPath::new(path, predicted));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{EvalOptions, InputRow};
    use crate::repr::{
        DataDictionary, DataField, DataType, MiningFunction, Node, OpType, Predicate,
        SimpleOperator,
    };
    use rstest::rstest;

    fn dictionary() -> DataDictionary {
        DataDictionary::new(vec![
            DataField::new("x", OpType::Continuous, DataType::Double),
            DataField::new("z", OpType::Continuous, DataType::Double),
        ])
    }

    /// root(score r)
    /// ├── x < 1 (score a)
    /// │   ├── z < 0 -> leaf aa
    /// │   └── z >= 0 -> leaf ab
    /// └── x >= 2 -> leaf b
    fn model() -> TreeModel {
        let mut tree = Tree::new(Node::leaf(Predicate::True, "r").with_id("root").with_default_child("b"));
        let a = tree.push_child(
            0,
            Node::leaf(Predicate::simple("x", SimpleOperator::LessThan, 1.0), "a").with_id("a"),
        );
        tree.push_child(
            a,
            Node::leaf(Predicate::simple("z", SimpleOperator::LessThan, 0.0), "aa").with_id("aa"),
        );
        tree.push_child(
            a,
            Node::leaf(Predicate::simple("z", SimpleOperator::GreaterOrEqual, 0.0), "ab").with_id("ab"),
        );
        tree.push_child(
            0,
            Node::leaf(Predicate::simple("x", SimpleOperator::GreaterOrEqual, 2.0), "b").with_id("b"),
        );
        TreeModel::new(MiningFunction::Classification, tree)
    }

    fn run(model: &TreeModel, x: &str, z: &str) -> Result<DecisionPath, EvaluationError> {
        let dictionary = dictionary();
        let row: InputRow = [("x", x), ("z", z)].into_iter().collect();
        let inputs = Inputs::prepare(&dictionary, &row, &EvalOptions::default()).unwrap();
        walk(model, &inputs)
    }

    fn ids(model: &TreeModel, path: &DecisionPath) -> Vec<String> {
        path.nodes()
            .iter()
            .map(|&n| model.tree.node(n).id.clone().unwrap())
            .collect()
    }

    #[test]
    fn follows_first_true_child_to_leaf() {
        let model = model();
        let path = run(&model, "0.5", "1").unwrap();
        assert_eq!(ids(&model, &path), vec!["root", "a", "ab"]);
        assert_eq!(path.predicted(), Some(&Value::text("ab")));
        assert_eq!(path.terminal(), Some(3));
    }

    #[rstest]
    #[case(NoTrueChildStrategy::ReturnNullPrediction, None)]
    #[case(NoTrueChildStrategy::ReturnLastPrediction, Some(Value::text("r")))]
    fn no_true_child(#[case] strategy: NoTrueChildStrategy, #[case] expected: Option<Value>) {
        let mut model = model();
        model.no_true_child_strategy = strategy;
        let path = run(&model, "1.5", "0").unwrap();
        assert_eq!(ids(&model, &path), vec!["root"]);
        assert_eq!(path.predicted().cloned(), expected);
    }

    #[rstest]
    #[case(MissingValueStrategy::None, vec!["root", "a"], None)]
    #[case(MissingValueStrategy::LastPrediction, vec!["root", "a"], Some(Value::text("a")))]
    #[case(MissingValueStrategy::NullPrediction, vec!["root", "a"], None)]
    fn missing_value_strategies(
        #[case] strategy: MissingValueStrategy,
        #[case] expected_ids: Vec<&str>,
        #[case] expected: Option<Value>,
    ) {
        let mut model = model();
        model.missing_value_strategy = strategy;
        let path = run(&model, "0.5", "").unwrap();
        assert_eq!(ids(&model, &path), expected_ids);
        assert_eq!(path.predicted().cloned(), expected);
    }

    #[test]
    fn default_child_strategy() {
        let mut model = model();
        model.missing_value_strategy = MissingValueStrategy::DefaultChild;
        let path = run(&model, "", "").unwrap();
        assert_eq!(ids(&model, &path), vec!["root", "b"]);

        // Node "a" has no default child.
        let err = run(&model, "0.5", "").unwrap_err();
        assert_eq!(err, EvaluationError::MissingDefaultChild(1));
    }

    #[test]
    fn false_root_gives_empty_path() {
        let mut model = model();
        model.tree.node_mut(0).predicate = Predicate::False;
        let path = run(&model, "0.5", "1").unwrap();
        assert!(path.is_empty());
        assert_eq!(path.predicted(), None);
    }
}
