//! Path accumulation.
//!
//! Every segment path of a row adds exactly one observation to each node it
//! visits, whatever the segment's blend weight. Additions commute, so the
//! final counts do not depend on row order.

use log::debug;

use super::RecountError;
use crate::inference::{DecisionPath, SegmentValue, TargetValue};
use crate::repr::{MiningFunction, Model, ModelKind, ScoreDistribution, Tree, Value};

/// What accumulating one or more rows added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulationStats {
    /// Decision paths accumulated.
    pub paths: usize,
    /// Node counters incremented.
    pub node_visits: usize,
    /// Score distributions created for labels a node had not seen.
    pub distributions_created: usize,
}

impl AccumulationStats {
    pub fn merge(&mut self, other: AccumulationStats) {
        self.paths += other.paths;
        self.node_visits += other.node_visits;
        self.distributions_created += other.distributions_created;
    }
}

/// Add one observation along `path`.
///
/// Every visited node's record count goes up by one (an absent count is
/// taken as 0). For classification the visited node's score distribution for
/// `expected` goes up by one as well, created with a zero count first if the
/// node has none for that label; a row without a label only counts records.
pub fn accumulate_path(
    tree: &mut Tree,
    path: &DecisionPath,
    expected: Option<&Value>,
    function: MiningFunction,
) -> Result<AccumulationStats, RecountError> {
    let label = match function {
        MiningFunction::Regression => None,
        MiningFunction::Classification => expected,
        function => return Err(RecountError::UnsupportedMiningFunction { function }),
    };

    let mut stats = AccumulationStats {
        paths: 1,
        ..Default::default()
    };
    for &id in path.nodes() {
        let node = tree.node_mut(id);
        node.record_count = Some(node.record_count.unwrap_or(0) + 1);
        stats.node_visits += 1;

        if let Some(label) = label {
            let (distribution, created) = ensure_distribution(&mut node.score_distributions, label);
            distribution.record_count += 1;
            if created {
                debug!("node {id}: new score distribution for class {label}");
                stats.distributions_created += 1;
            }
        }
    }
    Ok(stats)
}

fn ensure_distribution<'a>(
    distributions: &'a mut Vec<ScoreDistribution>,
    label: &Value,
) -> (&'a mut ScoreDistribution, bool) {
    match distributions.iter().position(|d| d.value == *label) {
        Some(i) => (&mut distributions[i], false),
        None => {
            distributions.push(ScoreDistribution::new(label.clone(), 0));
            let last = distributions.len() - 1;
            (&mut distributions[last], true)
        }
    }
}

/// Accumulate every segment path of one evaluated row.
///
/// Fails with [`RecountError::UnexpectedResult`] if the result is not an
/// ensemble result whose segments all carry tree paths.
pub fn accumulate_row(
    model: &mut Model,
    target: &TargetValue,
    expected: Option<&Value>,
    row: usize,
) -> Result<AccumulationStats, RecountError> {
    let unexpected = |what: String| RecountError::UnexpectedResult { row, what };

    let TargetValue::Ensemble(ensemble) = target else {
        return Err(unexpected("model produced a plain result, expected segment results".into()));
    };
    let ModelKind::Mining(mining) = &mut model.kind else {
        return Err(unexpected("model is not an ensemble".into()));
    };
    let function = mining.function;

    let mut stats = AccumulationStats::default();
    for result in &ensemble.segment_results {
        let SegmentValue::TreePath(path) = &result.value else {
            return Err(unexpected(format!("segment {} produced no decision path", result.index)));
        };
        let Some(ModelKind::Tree(tree)) = mining.segmentation.segments.get_mut(result.index).map(|s| &mut s.model) else {
            return Err(unexpected(format!("segment {} is not a tree", result.index)));
        };
        stats.merge(accumulate_path(&mut tree.tree, path, expected, function)?);
    }
    Ok(stats)
}
