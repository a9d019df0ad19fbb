use crate::repr::{MiningFunction, MultipleModelMethod, NodeId, Value};

/// Failure to evaluate one input row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// An input cannot be read as its field's data type or is not one of the
    /// field's declared values.
    #[error("invalid value {value:?} for field {field:?}")]
    InvalidValue { field: String, value: String },

    /// A predicate names a field the data dictionary does not declare.
    #[error("unknown field {0:?}")]
    UnknownField(String),

    /// A predicate constant cannot be compared with its field.
    #[error("predicate constant {value} is incompatible with field {field:?}")]
    IncompatibleConstant { field: String, value: Value },

    /// A comparison predicate carries no constant.
    #[error("predicate on field {0:?} has no value to compare against")]
    MissingConstant(String),

    /// The default-child strategy applied at a node without a usable default child.
    #[error("node {0} has no usable default child")]
    MissingDefaultChild(NodeId),

    /// A regression score is not numeric.
    #[error("score {0} is not numeric")]
    NonNumericScore(Value),

    #[error("combination method {0} is not supported")]
    UnsupportedMethod(MultipleModelMethod),

    #[error("mining function {0} is not supported")]
    UnsupportedFunction(MiningFunction),
}
