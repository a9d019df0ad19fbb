//! Model metadata enums.
//!
//! Shared between the runtime model and its persisted document; every enum
//! serializes as its snake_case name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of prediction a model makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningFunction {
    /// Continuous target.
    Regression,
    /// Categorical target.
    Classification,
    Clustering,
    AssociationRules,
    Sequences,
    TimeSeries,
    Mixed,
}

impl MiningFunction {
    /// Returns true if this is a classification function.
    pub fn is_classification(&self) -> bool {
        matches!(self, Self::Classification)
    }

    /// Returns true if this is a regression function.
    pub fn is_regression(&self) -> bool {
        matches!(self, Self::Regression)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regression => "regression",
            Self::Classification => "classification",
            Self::Clustering => "clustering",
            Self::AssociationRules => "association_rules",
            Self::Sequences => "sequences",
            Self::TimeSeries => "time_series",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for MiningFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an ensemble combines the results of its segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipleModelMethod {
    MajorityVote,
    WeightedMajorityVote,
    Average,
    WeightedAverage,
    Median,
    WeightedMedian,
    Max,
    Sum,
    WeightedSum,
    SelectFirst,
    SelectAll,
    ModelChain,
}

impl MultipleModelMethod {
    /// Returns true if every matching segment is evaluated and its own result
    /// is kept alongside the blended one.
    ///
    /// Only these methods can be replayed: the others either stop at the
    /// first matching segment, feed one segment into the next, or reduce the
    /// segments to a vote.
    pub fn exposes_segment_results(&self) -> bool {
        matches!(
            self,
            Self::Sum
                | Self::WeightedSum
                | Self::Average
                | Self::WeightedAverage
                | Self::Median
                | Self::WeightedMedian
        )
    }

    /// Returns true if segment weights take part in blending.
    pub fn is_weighted(&self) -> bool {
        matches!(
            self,
            Self::WeightedSum
                | Self::WeightedAverage
                | Self::WeightedMedian
                | Self::WeightedMajorityVote
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MajorityVote => "majority_vote",
            Self::WeightedMajorityVote => "weighted_majority_vote",
            Self::Average => "average",
            Self::WeightedAverage => "weighted_average",
            Self::Median => "median",
            Self::WeightedMedian => "weighted_median",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::WeightedSum => "weighted_sum",
            Self::SelectFirst => "select_first",
            Self::SelectAll => "select_all",
            Self::ModelChain => "model_chain",
        }
    }
}

impl fmt::Display for MultipleModelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage type of a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Integer,
    Float,
    Double,
    Boolean,
}

impl DataType {
    /// Returns true for the numeric storage types.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Double)
    }
}

/// Measurement level of a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    Categorical,
    Ordinal,
    Continuous,
}

/// Role of a field in a mining schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUsage {
    #[default]
    Active,
    Target,
    Supplementary,
}

/// What a tree does when a child predicate cannot be decided because an
/// input is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValueStrategy {
    /// Treat the undecidable predicate as false.
    #[default]
    None,
    /// Stop and predict the current node's score.
    LastPrediction,
    /// Stop without a prediction.
    NullPrediction,
    /// Follow the current node's default child.
    DefaultChild,
}

/// What a tree does when no child predicate is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoTrueChildStrategy {
    #[default]
    ReturnNullPrediction,
    ReturnLastPrediction,
}
