//! Acceptance checks run once, before any dataset row is read.

use super::RecountError;
use crate::repr::{DataType, MiningFunction, Model, ModelKind, MultipleModelMethod};

/// What the replay needs to know about an accepted model.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedModel {
    pub function: MiningFunction,
    pub method: MultipleModelMethod,
    pub target_field: String,
    pub target_type: DataType,
    pub n_segments: usize,
}

/// Accept only ensembles of trees whose combination method keeps every
/// segment's own result.
///
/// Checks, in order: the model is an ensemble, its method exposes segment
/// results, its function is regression or classification, and every segment
/// holds a tree.
pub fn check_model(model: &Model) -> Result<AcceptedModel, RecountError> {
    let mining = match &model.kind {
        ModelKind::Mining(mining) => mining,
        other => {
            return Err(RecountError::UnsupportedModelKind {
                kind: other.kind_name(),
            })
        }
    };

    let method = mining.segmentation.method;
    if !method.exposes_segment_results() {
        return Err(RecountError::UnsupportedCombinationMethod { method });
    }

    let function = mining.function;
    if !(function.is_regression() || function.is_classification()) {
        return Err(RecountError::UnsupportedMiningFunction { function });
    }

    for (segment, s) in mining.segmentation.segments.iter().enumerate() {
        if !matches!(s.model, ModelKind::Tree(_)) {
            return Err(RecountError::UnsupportedSegmentModel {
                segment,
                kind: s.model.kind_name(),
            });
        }
    }

    let target_field = mining
        .mining_schema
        .target()
        .ok_or(RecountError::MissingTargetField)?;
    let target_type = model
        .data_dictionary
        .get(target_field)
        .map(|f| f.data_type)
        .ok_or(RecountError::MissingTargetField)?;

    Ok(AcceptedModel {
        function,
        method,
        target_field: target_field.to_string(),
        target_type,
        n_segments: mining.segmentation.segments.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{MiningModel, Node, Predicate, Tree, TreeModel};
    use crate::testing;
    use rstest::rstest;

    fn mining_mut(model: &mut Model) -> &mut MiningModel {
        match &mut model.kind {
            ModelKind::Mining(m) => m,
            ModelKind::Tree(_) => panic!("expected an ensemble"),
        }
    }

    #[test]
    fn accepts_tree_ensemble() {
        let accepted = check_model(&testing::two_segment_classifier()).unwrap();
        assert_eq!(accepted.function, MiningFunction::Classification);
        assert_eq!(accepted.target_field, "y");
        assert_eq!(accepted.target_type, DataType::String);
        assert_eq!(accepted.n_segments, 2);
    }

    #[test]
    fn rejects_single_tree() {
        let model = Model::new(
            testing::two_segment_classifier().data_dictionary,
            ModelKind::Tree(TreeModel::new(
                MiningFunction::Classification,
                Tree::new(Node::leaf(Predicate::True, "yes")),
            )),
        );
        assert!(matches!(
            check_model(&model),
            Err(RecountError::UnsupportedModelKind { kind: "tree_model" })
        ));
    }

    #[rstest]
    #[case(MultipleModelMethod::MajorityVote)]
    #[case(MultipleModelMethod::WeightedMajorityVote)]
    #[case(MultipleModelMethod::Max)]
    #[case(MultipleModelMethod::SelectFirst)]
    #[case(MultipleModelMethod::SelectAll)]
    #[case(MultipleModelMethod::ModelChain)]
    fn rejects_methods_hiding_segments(#[case] method: MultipleModelMethod) {
        let mut model = testing::two_segment_classifier();
        mining_mut(&mut model).segmentation.method = method;
        assert!(matches!(
            check_model(&model),
            Err(RecountError::UnsupportedCombinationMethod { method: m }) if m == method
        ));
    }

    #[rstest]
    #[case(MultipleModelMethod::Sum)]
    #[case(MultipleModelMethod::WeightedSum)]
    #[case(MultipleModelMethod::Average)]
    #[case(MultipleModelMethod::WeightedAverage)]
    #[case(MultipleModelMethod::Median)]
    #[case(MultipleModelMethod::WeightedMedian)]
    fn accepts_methods_exposing_segments(#[case] method: MultipleModelMethod) {
        let mut model = testing::two_segment_regressor(MultipleModelMethod::Sum);
        mining_mut(&mut model).segmentation.method = method;
        assert!(check_model(&model).is_ok());
    }

    #[test]
    fn rejects_clustering() {
        let mut model = testing::two_segment_classifier();
        mining_mut(&mut model).function = MiningFunction::Clustering;
        assert!(matches!(
            check_model(&model),
            Err(RecountError::UnsupportedMiningFunction { .. })
        ));
    }

    #[test]
    fn rejects_nested_ensemble_segment() {
        let inner = testing::two_segment_classifier();
        let mut model = testing::two_segment_classifier();
        mining_mut(&mut model).segmentation.segments[1].model = inner.kind;
        assert!(matches!(
            check_model(&model),
            Err(RecountError::UnsupportedSegmentModel { segment: 1, .. })
        ));
    }
}
