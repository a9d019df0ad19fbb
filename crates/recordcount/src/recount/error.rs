use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::inference::{EvaluationError, InputRow};
use crate::persist::{ReadError, WriteError};
use crate::repr::{MiningFunction, MultipleModelMethod};

/// Why a content row could not be turned into an input mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowDefect {
    #[error("expected {expected} cells, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("cell {column} is not valid UTF-8")]
    InvalidUtf8 { column: usize },
}

/// A fatal failure of a recount run. Row indices count content rows from 0.
#[derive(Debug, thiserror::Error)]
pub enum RecountError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load model from {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("failed to write model to {}: {source}", path.display())]
    ModelWrite {
        path: PathBuf,
        #[source]
        source: WriteError,
    },

    #[error("model must be an ensemble (mining_model), found {kind}")]
    UnsupportedModelKind { kind: &'static str },

    #[error("combination method {method} does not expose per-segment results")]
    UnsupportedCombinationMethod { method: MultipleModelMethod },

    #[error("mining function {function} is not supported, expected regression or classification")]
    UnsupportedMiningFunction { function: MiningFunction },

    #[error("segment {segment} holds a {kind}, expected a tree_model")]
    UnsupportedSegmentModel { segment: usize, kind: &'static str },

    #[error("model declares no single target field")]
    MissingTargetField,

    #[error("failed to open dataset {}: {source}", path.display())]
    DatasetOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read dataset: {0}")]
    Dataset(#[from] csv::Error),

    #[error("dataset has no header line")]
    MissingHeader,

    #[error("dataset header names column {name:?} twice")]
    DuplicateColumn { name: String },

    #[error("malformed row {row}: {defect}; content: {content:?}; parsed: {inputs}")]
    MalformedRow {
        row: usize,
        defect: RowDefect,
        content: String,
        inputs: InputRow,
    },

    #[error("row {row} has no value for target field {field:?}")]
    MissingTarget { row: usize, field: String },

    #[error("row {row}: target value {value:?} is not valid for field {field:?}")]
    InvalidTarget { row: usize, field: String, value: String },

    #[error("evaluation failed at row {row} with inputs {inputs}: {source}")]
    EvaluationFailure {
        row: usize,
        inputs: InputRow,
        #[source]
        source: EvaluationError,
    },

    #[error("row {row}: {what}")]
    UnexpectedResult { row: usize, what: String },
}
