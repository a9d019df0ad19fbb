//! Model evaluation.
//!
//! [`evaluate`] scores one [`InputRow`] against a [`Model`]. For an ensemble
//! the result keeps every evaluated segment's own outcome, and tree segments
//! report the full [`DecisionPath`] they took.
//!
//! # Example
//!
//! ```
//! use recordcount::inference::{evaluate, EvalOptions, InputRow, TargetValue};
//! use recordcount::testing;
//!
//! let model = testing::two_segment_classifier();
//! let row: InputRow = [("x", "0.5")].into_iter().collect();
//! let result = evaluate(&model, &row, &EvalOptions::default()).unwrap();
//!
//! let TargetValue::Ensemble(ensemble) = result.target else { unreachable!() };
//! assert_eq!(ensemble.segment_results.len(), 2);
//! ```

mod ensemble;
mod error;
mod input;
mod predicate;
mod traversal;

pub use error::EvaluationError;
pub use input::{parse_as, EvalOptions, FieldValue, InputRow, Inputs};
pub use predicate::{evaluate_predicate, Truth};
pub use traversal::{walk, DecisionPath};

use crate::repr::{Model, ModelKind, Value};

// =============================================================================
// Results
// =============================================================================

/// Outcome of evaluating one row.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub target: TargetValue,
}

/// The target value of a result, shaped by the kind of model evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetValue {
    /// A single model's prediction.
    Plain(Option<Value>),
    /// An ensemble's blended prediction plus each segment's own result.
    Ensemble(EnsembleResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleResult {
    /// Blended prediction.
    pub value: Option<Value>,
    /// Results of the selected segments, in segment order.
    pub segment_results: Vec<SegmentResult>,
}

/// Result of one selected segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentResult {
    /// Position of the segment in its segmentation.
    pub index: usize,
    pub id: Option<String>,
    pub weight: f64,
    pub value: SegmentValue,
}

/// What a segment produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentValue {
    /// A tree's walk, with its prediction.
    TreePath(DecisionPath),
    /// Any other model's prediction; no path is available.
    Other(Option<Value>),
}

impl SegmentValue {
    pub fn predicted(&self) -> Option<&Value> {
        match self {
            Self::TreePath(path) => path.predicted(),
            Self::Other(value) => value.as_ref(),
        }
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Evaluate one row.
///
/// Cells are typed by the data dictionary, with `options` deciding which cell
/// texts are missing. Fields the model does not declare are ignored.
pub fn evaluate(model: &Model, row: &InputRow, options: &EvalOptions) -> Result<EvaluationResult, EvaluationError> {
    let inputs = Inputs::prepare(&model.data_dictionary, row, options)?;
    let target = match &model.kind {
        ModelKind::Tree(tree) => TargetValue::Plain(walk(tree, &inputs)?.predicted().cloned()),
        ModelKind::Mining(mining) => TargetValue::Ensemble(ensemble::evaluate_segmentation(mining, &inputs)?),
    };
    Ok(EvaluationResult { target })
}
