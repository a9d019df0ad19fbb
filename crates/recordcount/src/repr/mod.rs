//! In-memory model representation.
//!
//! These are the owned, mutable types the rest of the crate works on. The
//! persisted document shape lives in [`crate::persist`].

mod meta;
mod model;
mod predicate;
mod tree;
mod value;

pub use meta::{
    DataType, FieldUsage, MiningFunction, MissingValueStrategy, MultipleModelMethod,
    NoTrueChildStrategy, OpType,
};
pub use model::{
    DataDictionary, DataField, Header, MiningField, MiningModel, MiningSchema, Model, ModelKind,
    Segment, Segmentation, TreeModel,
};
pub use predicate::{BooleanOperator, Predicate, SetOperator, SimpleOperator};
pub use tree::{Node, NodeId, ScoreDistribution, Tree, TreeValidationError};
pub use value::Value;
