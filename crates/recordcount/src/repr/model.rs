//! Runtime model types.
//!
//! A [`Model`] owns its data dictionary and one top-level [`ModelKind`]: a
//! single [`TreeModel`] or an ensemble ([`MiningModel`]) whose segments own
//! their models outright. Nothing is shared between segments.

use super::{
    DataType, FieldUsage, MiningFunction, MissingValueStrategy, MultipleModelMethod,
    NoTrueChildStrategy, OpType, Predicate, Tree,
};

// =============================================================================
// Dictionary and schema
// =============================================================================

/// A field the model knows about.
#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
    pub name: String,
    pub optype: OpType,
    pub data_type: DataType,
    /// Valid values of a categorical or ordinal field. Empty means any.
    pub values: Vec<String>,
}

impl DataField {
    pub fn new(name: impl Into<String>, optype: OpType, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            optype,
            data_type,
            values: Vec::new(),
        }
    }

    /// Returns true if `raw` is acceptable for this field's declared values.
    pub fn accepts(&self, raw: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|v| v == raw)
    }
}

/// All fields known to a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDictionary {
    fields: Vec<DataField>,
}

impl DataDictionary {
    pub fn new(fields: Vec<DataField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[DataField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&DataField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A field as used by one model.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningField {
    pub name: String,
    pub usage: FieldUsage,
}

/// Fields a model reads and predicts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiningSchema {
    pub fields: Vec<MiningField>,
}

impl MiningSchema {
    /// The target fields, in declaration order.
    pub fn targets(&self) -> impl Iterator<Item = &MiningField> {
        self.fields.iter().filter(|f| f.usage == FieldUsage::Target)
    }

    /// The target field, if exactly one is declared.
    pub fn target(&self) -> Option<&str> {
        let mut targets = self.targets();
        match (targets.next(), targets.next()) {
            (Some(target), None) => Some(&target.name),
            _ => None,
        }
    }
}

/// Document header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub description: Option<String>,
    pub application: Option<String>,
    pub copyright: Option<String>,
}

// =============================================================================
// Models
// =============================================================================

/// A single decision tree with its walk strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeModel {
    pub name: Option<String>,
    pub function: MiningFunction,
    pub mining_schema: Option<MiningSchema>,
    pub missing_value_strategy: MissingValueStrategy,
    pub no_true_child_strategy: NoTrueChildStrategy,
    pub tree: Tree,
}

impl TreeModel {
    /// A tree with the default walk strategies.
    pub fn new(function: MiningFunction, tree: Tree) -> Self {
        Self {
            name: None,
            function,
            mining_schema: None,
            missing_value_strategy: MissingValueStrategy::default(),
            no_true_child_strategy: NoTrueChildStrategy::default(),
            tree,
        }
    }
}

/// One member of an ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: Option<String>,
    pub weight: f64,
    /// Rows for which this predicate is not true skip the segment.
    pub predicate: Predicate,
    pub model: ModelKind,
}

impl Segment {
    /// An always-selected segment with weight 1.
    pub fn new(model: ModelKind) -> Self {
        Self {
            id: None,
            weight: 1.0,
            predicate: Predicate::True,
            model,
        }
    }
}

/// Segments plus the method combining their results.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub method: MultipleModelMethod,
    pub segments: Vec<Segment>,
}

/// An ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningModel {
    pub name: Option<String>,
    pub function: MiningFunction,
    pub mining_schema: MiningSchema,
    pub segmentation: Segmentation,
}

/// The kinds of model a document or a segment can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    Mining(MiningModel),
    Tree(TreeModel),
}

impl ModelKind {
    pub fn function(&self) -> MiningFunction {
        match self {
            Self::Mining(m) => m.function,
            Self::Tree(t) => t.function,
        }
    }

    pub fn mining_schema(&self) -> Option<&MiningSchema> {
        match self {
            Self::Mining(m) => Some(&m.mining_schema),
            Self::Tree(t) => t.mining_schema.as_ref(),
        }
    }

    /// Element name, as written in documents.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Mining(_) => "mining_model",
            Self::Tree(_) => "tree_model",
        }
    }

    /// Visit every tree, descending into nested ensembles.
    pub fn for_each_tree_mut(&mut self, f: &mut impl FnMut(&mut Tree)) {
        match self {
            Self::Tree(t) => f(&mut t.tree),
            Self::Mining(m) => {
                for segment in &mut m.segmentation.segments {
                    segment.model.for_each_tree_mut(f);
                }
            }
        }
    }

    /// Visit every tree, descending into nested ensembles.
    pub fn for_each_tree(&self, f: &mut impl FnMut(&Tree)) {
        match self {
            Self::Tree(t) => f(&t.tree),
            Self::Mining(m) => {
                for segment in &m.segmentation.segments {
                    segment.model.for_each_tree(f);
                }
            }
        }
    }
}

/// A loaded model document.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub header: Option<Header>,
    pub data_dictionary: DataDictionary,
    pub kind: ModelKind,
}

impl Model {
    pub fn new(data_dictionary: DataDictionary, kind: ModelKind) -> Self {
        Self {
            header: None,
            data_dictionary,
            kind,
        }
    }

    /// Name of the top-level target field.
    pub fn target_field(&self) -> Option<&str> {
        self.kind.mining_schema().and_then(MiningSchema::target)
    }

    /// Total number of nodes over all trees.
    pub fn n_nodes(&self) -> usize {
        let mut total = 0;
        self.kind.for_each_tree(&mut |tree: &Tree| total += tree.n_nodes());
        total
    }
}
