//! Segment evaluation and blending.
//!
//! Every segment whose predicate holds is evaluated and keeps its own result.
//! The blended value is computed from those results afterwards; it is what a
//! scorer would report, and takes no part in counting.

use super::input::Inputs;
use super::predicate::evaluate_predicate;
use super::traversal::{walk, DecisionPath};
use super::{EnsembleResult, EvaluationError, SegmentResult, SegmentValue};
use crate::repr::{MiningFunction, MiningModel, ModelKind, MultipleModelMethod, Tree, Value};
use crate::utils::{median, weighted_quantile};

/// Evaluate every selected segment of `model`, then blend.
pub fn evaluate_segmentation(model: &MiningModel, inputs: &Inputs<'_>) -> Result<EnsembleResult, EvaluationError> {
    let segments = &model.segmentation.segments;
    let mut segment_results = Vec::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        if !evaluate_predicate(&segment.predicate, inputs)?.is_true() {
            continue;
        }
        let value = match &segment.model {
            ModelKind::Tree(tree) => SegmentValue::TreePath(walk(tree, inputs)?),
            ModelKind::Mining(nested) => SegmentValue::Other(evaluate_segmentation(nested, inputs)?.value),
        };
        segment_results.push(SegmentResult {
            index,
            id: segment.id.clone(),
            weight: segment.weight,
            value,
        });
    }

    let value = blend(model, &segment_results)?;
    Ok(EnsembleResult {
        value,
        segment_results,
    })
}

// =============================================================================
// Blending
// =============================================================================

/// One segment's contribution to the blend.
struct Member<'a> {
    weight: f64,
    predicted: &'a Value,
    result: &'a SegmentResult,
}

fn blend(model: &MiningModel, results: &[SegmentResult]) -> Result<Option<Value>, EvaluationError> {
    let method = model.segmentation.method;
    let members: Vec<Member<'_>> = results
        .iter()
        .filter_map(|result| {
            result.value.predicted().map(|predicted| Member {
                weight: if method.is_weighted() { result.weight } else { 1.0 },
                predicted,
                result,
            })
        })
        .collect();

    if method == MultipleModelMethod::SelectFirst {
        return Ok(members.first().map(|m| m.predicted.clone()));
    }
    if members.is_empty() {
        return Ok(None);
    }

    match model.function {
        MiningFunction::Regression => blend_regression(method, &members).map(|v| v.map(Value::Number)),
        MiningFunction::Classification => blend_classification(model, method, &members),
        other => Err(EvaluationError::UnsupportedFunction(other)),
    }
}

fn blend_regression(method: MultipleModelMethod, members: &[Member<'_>]) -> Result<Option<f64>, EvaluationError> {
    let mut values = Vec::with_capacity(members.len());
    let mut weights = Vec::with_capacity(members.len());
    for member in members {
        let value = member
            .predicted
            .as_f64()
            .ok_or_else(|| EvaluationError::NonNumericScore(member.predicted.clone()))?;
        values.push(value);
        weights.push(member.weight);
    }

    let weighted_sum: f64 = values.iter().zip(&weights).map(|(v, w)| v * w).sum();
    let total_weight: f64 = weights.iter().sum();

    Ok(match method {
        MultipleModelMethod::Sum | MultipleModelMethod::WeightedSum => Some(weighted_sum),
        MultipleModelMethod::Average | MultipleModelMethod::WeightedAverage => {
            (total_weight > 0.0).then(|| weighted_sum / total_weight)
        }
        MultipleModelMethod::Median => Some(median(&values)),
        MultipleModelMethod::WeightedMedian => {
            Some(weighted_quantile(&values, Some(&weights), 0.5, &mut Vec::new()))
        }
        MultipleModelMethod::Max => values.iter().copied().reduce(f64::max),
        other => return Err(EvaluationError::UnsupportedMethod(other)),
    })
}

/// Class probabilities, in first-seen order.
#[derive(Debug, Default)]
struct ClassScores {
    entries: Vec<(Value, f64)>,
}

impl ClassScores {
    fn add(&mut self, label: &Value, amount: f64) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 += amount,
            None => self.entries.push((label.clone(), amount)),
        }
    }

    fn get(&self, label: &Value) -> f64 {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0.0, |(_, p)| *p)
    }

    /// Highest scoring label; ties go to the label seen first.
    fn argmax(&self) -> Option<&Value> {
        let mut best: Option<&(Value, f64)> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(label, _)| label)
    }
}

/// Probabilities a member assigns to each class.
fn member_probabilities(model: &MiningModel, member: &Member<'_>) -> ClassScores {
    let mut scores = ClassScores::default();
    let tree_path = match (&member.result.value, &model.segmentation.segments[member.result.index].model) {
        (SegmentValue::TreePath(path), ModelKind::Tree(tree)) => Some((&tree.tree, path)),
        _ => None,
    };
    match tree_path {
        Some((tree, path)) => terminal_probabilities(tree, path, member.predicted, &mut scores),
        None => scores.add(member.predicted, 1.0),
    }
    scores
}

fn terminal_probabilities(tree: &Tree, path: &DecisionPath, predicted: &Value, scores: &mut ClassScores) {
    let distributions = match path.terminal() {
        Some(terminal) => &tree.node(terminal).score_distributions,
        None => return,
    };

    if distributions.iter().any(|d| d.probability.is_some()) {
        for d in distributions {
            scores.add(&d.value, d.probability.unwrap_or(0.0));
        }
        return;
    }

    let total: u64 = distributions.iter().map(|d| d.record_count).sum();
    if total > 0 {
        for d in distributions {
            scores.add(&d.value, d.record_count as f64 / total as f64);
        }
    } else {
        scores.add(predicted, 1.0);
    }
}

fn blend_classification(
    model: &MiningModel,
    method: MultipleModelMethod,
    members: &[Member<'_>],
) -> Result<Option<Value>, EvaluationError> {
    let mut combined = ClassScores::default();

    match method {
        MultipleModelMethod::MajorityVote | MultipleModelMethod::WeightedMajorityVote => {
            for member in members {
                combined.add(member.predicted, member.weight);
            }
        }
        MultipleModelMethod::Sum
        | MultipleModelMethod::WeightedSum
        | MultipleModelMethod::Average
        | MultipleModelMethod::WeightedAverage => {
            // Averaging divides every class by the same total; the argmax is unchanged.
            for member in members {
                for (label, p) in member_probabilities(model, member).entries {
                    combined.add(&label, member.weight * p);
                }
            }
        }
        MultipleModelMethod::Median | MultipleModelMethod::WeightedMedian => {
            let per_member: Vec<ClassScores> = members.iter().map(|m| member_probabilities(model, m)).collect();
            let weights: Vec<f64> = members.iter().map(|m| m.weight).collect();
            let mut labels = ClassScores::default();
            for scores in &per_member {
                for (label, _) in &scores.entries {
                    labels.add(label, 0.0);
                }
            }

            let mut scratch = Vec::new();
            for (label, _) in labels.entries {
                let column: Vec<f64> = per_member.iter().map(|s| s.get(&label)).collect();
                let value = if method == MultipleModelMethod::Median {
                    median(&column)
                } else {
                    weighted_quantile(&column, Some(&weights), 0.5, &mut scratch)
                };
                combined.add(&label, value);
            }
        }
        other => return Err(EvaluationError::UnsupportedMethod(other)),
    }

    Ok(combined.argmax().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{evaluate, EvalOptions, InputRow, TargetValue};
    use crate::repr::{Model, Predicate, ScoreDistribution};
    use crate::testing;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn run(model: &Model, x: &str) -> EnsembleResult {
        let row: InputRow = [("x", x)].into_iter().collect();
        match evaluate(model, &row, &EvalOptions::default()).unwrap().target {
            TargetValue::Ensemble(result) => result,
            TargetValue::Plain(_) => panic!("expected an ensemble result"),
        }
    }

    fn mining_mut(model: &mut Model) -> &mut MiningModel {
        match &mut model.kind {
            ModelKind::Mining(m) => m,
            ModelKind::Tree(_) => panic!("expected an ensemble"),
        }
    }

    #[test]
    fn every_selected_segment_reports_its_path() {
        let model = testing::two_segment_classifier();
        let result = run(&model, "1.5");

        assert_eq!(result.segment_results.len(), 2);
        let paths: Vec<Vec<u32>> = result
            .segment_results
            .iter()
            .map(|r| match &r.value {
                SegmentValue::TreePath(path) => path.nodes().to_vec(),
                SegmentValue::Other(_) => panic!("expected a path"),
            })
            .collect();
        assert_eq!(paths, vec![vec![0, 1], vec![0, 2]]);
        assert_eq!(result.segment_results[1].id.as_deref(), Some("2"));
    }

    #[test]
    fn unselected_segments_are_skipped() {
        let mut model = testing::two_segment_classifier();
        mining_mut(&mut model).segmentation.segments[0].predicate = testing::at_most("x", 0.0);

        let result = run(&model, "1.5");
        assert_eq!(result.segment_results.len(), 1);
        assert_eq!(result.segment_results[0].index, 1);
    }

    #[rstest]
    #[case(MultipleModelMethod::Sum, 22.0)]
    #[case(MultipleModelMethod::Average, 11.0)]
    #[case(MultipleModelMethod::Median, 11.0)]
    #[case(MultipleModelMethod::Max, 20.0)]
    #[case(MultipleModelMethod::WeightedSum, 2.0 * 0.5 + 20.0 * 1.5)]
    #[case(MultipleModelMethod::WeightedAverage, (2.0 * 0.5 + 20.0 * 1.5) / 2.0)]
    #[case(MultipleModelMethod::WeightedMedian, 20.0)]
    fn regression_blending(#[case] method: MultipleModelMethod, #[case] expected: f64) {
        let mut model = testing::two_segment_regressor(method);
        let segments = &mut mining_mut(&mut model).segmentation.segments;
        segments[0].weight = 0.5;
        segments[1].weight = 1.5;

        let value = run(&model, "7").value.and_then(|v| v.as_f64()).unwrap();
        assert_relative_eq!(value, expected);
    }

    #[test]
    fn regression_rejects_vote_methods() {
        let model = testing::two_segment_regressor(MultipleModelMethod::MajorityVote);
        let row: InputRow = [("x", "7")].into_iter().collect();
        assert_eq!(
            evaluate(&model, &row, &EvalOptions::default()),
            Err(EvaluationError::UnsupportedMethod(MultipleModelMethod::MajorityVote))
        );
    }

    #[test]
    fn classification_average_uses_leaf_probabilities() {
        let mut model = testing::two_segment_classifier();
        // Segment 1's leaf leans "no"; segment 2's "no" leaf is one-hot.
        {
            let segments = &mut mining_mut(&mut model).segmentation.segments;
            let ModelKind::Tree(tree) = &mut segments[0].model else {
                unreachable!()
            };
            tree.tree.node_mut(1).score_distributions = vec![
                ScoreDistribution::new("yes", 0).with_probability(0.3),
                ScoreDistribution::new("no", 0).with_probability(0.7),
            ];
        }

        // x = 0.5: segment 2 predicts "yes" with no distribution -> one-hot yes.
        // Average: yes = (0.3 + 1) / 2, no = 0.7 / 2.
        assert_eq!(run(&model, "0.5").value, Some(Value::text("yes")));
        // x = 1.5: segment 2 predicts "no" -> no = (0.7 + 1) / 2.
        assert_eq!(run(&model, "1.5").value, Some(Value::text("no")));
    }

    #[test]
    fn classification_falls_back_to_counts() {
        let mut model = testing::two_segment_classifier();
        {
            let segments = &mut mining_mut(&mut model).segmentation.segments;
            for segment in segments.iter_mut() {
                let ModelKind::Tree(tree) = &mut segment.model else {
                    unreachable!()
                };
                for node in tree.tree.nodes_mut() {
                    node.score_distributions =
                        vec![ScoreDistribution::new("yes", 1), ScoreDistribution::new("no", 3)];
                }
            }
        }
        assert_eq!(run(&model, "0.5").value, Some(Value::text("no")));
    }

    #[test]
    fn majority_vote_counts_predictions() {
        let mut model = testing::two_segment_classifier();
        let mining = mining_mut(&mut model);
        mining.segmentation.method = MultipleModelMethod::WeightedMajorityVote;
        mining.segmentation.segments[1].weight = 3.0;

        assert_eq!(run(&model, "1.5").value, Some(Value::text("no")));
    }

    #[test]
    fn no_predictions_blend_to_nothing() {
        let mut model = testing::two_segment_classifier();
        for segment in &mut mining_mut(&mut model).segmentation.segments {
            segment.predicate = Predicate::False;
        }
        let result = run(&model, "1.5");
        assert!(result.segment_results.is_empty());
        assert_eq!(result.value, None);
    }

    #[test]
    fn nested_ensembles_report_values() {
        let inner = testing::two_segment_classifier();
        let mut outer = testing::two_segment_classifier();
        mining_mut(&mut outer).segmentation.segments[1].model = inner.kind;

        let result = run(&outer, "1.5");
        assert!(matches!(result.segment_results[0].value, SegmentValue::TreePath(_)));
        assert!(matches!(result.segment_results[1].value, SegmentValue::Other(Some(_))));
    }
}
