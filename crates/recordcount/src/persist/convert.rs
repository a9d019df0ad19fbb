//! Conversion between runtime types and schema types.
//!
//! Reading goes through `TryFrom` because a parsed document still has to be
//! checked: every field a model reads must be declared, default children must
//! exist, segment weights must be usable. Writing is a plain `From`.

use std::collections::HashSet;

use super::error::ReadError;
use super::schema::{
    DataDictionarySchema, DataFieldSchema, HeaderSchema, MiningFieldSchema, MiningModelSchema,
    MiningSchemaSchema, ModelDocumentSchema, ModelSchema, NodeSchema, ScoreDistributionSchema,
    SegmentSchema, SegmentationSchema, TreeModelSchema, CURRENT_VERSION,
};
use crate::repr::{
    DataDictionary, DataField, Header, MiningField, MiningModel, MiningSchema, Model, ModelKind,
    Node, NodeId, Predicate, ScoreDistribution, Segment, Segmentation, Tree, TreeModel,
};

// =============================================================================
// Schema -> runtime
// =============================================================================

impl TryFrom<ModelDocumentSchema> for Model {
    type Error = ReadError;

    fn try_from(schema: ModelDocumentSchema) -> Result<Self, Self::Error> {
        if schema.version != CURRENT_VERSION {
            return Err(ReadError::Validation(format!(
                "unsupported document version {} (expected {CURRENT_VERSION})",
                schema.version
            )));
        }

        let data_dictionary = DataDictionary::try_from(schema.data_dictionary)?;
        let kind = convert_model(schema.model, &data_dictionary, "model")?;

        let Some(mining_schema) = kind.mining_schema() else {
            return Err(ReadError::Validation(
                "top-level model has no mining schema".into(),
            ));
        };
        let n_targets = mining_schema.targets().count();
        if n_targets != 1 {
            return Err(ReadError::Validation(format!(
                "top-level mining schema must name exactly one target field, found {n_targets}"
            )));
        }

        Ok(Model {
            header: schema.header.map(Header::from),
            data_dictionary,
            kind,
        })
    }
}

impl From<HeaderSchema> for Header {
    fn from(schema: HeaderSchema) -> Self {
        Self {
            description: schema.description,
            application: schema.application,
            copyright: schema.copyright,
        }
    }
}

impl TryFrom<DataDictionarySchema> for DataDictionary {
    type Error = ReadError;

    fn try_from(schema: DataDictionarySchema) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(schema.fields.len());
        for field in &schema.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ReadError::Validation(format!(
                    "data field {:?} declared twice",
                    field.name
                )));
            }
        }

        Ok(DataDictionary::new(
            schema
                .fields
                .into_iter()
                .map(|f| DataField {
                    name: f.name,
                    optype: f.optype,
                    data_type: f.data_type,
                    values: f.values,
                })
                .collect(),
        ))
    }
}

fn convert_mining_schema(
    schema: MiningSchemaSchema,
    dictionary: &DataDictionary,
    context: &str,
) -> Result<MiningSchema, ReadError> {
    for field in &schema.fields {
        check_declared(&field.name, dictionary, context)?;
    }
    Ok(MiningSchema {
        fields: schema
            .fields
            .into_iter()
            .map(|f| MiningField {
                name: f.name,
                usage: f.usage,
            })
            .collect(),
    })
}

fn convert_model(
    schema: ModelSchema,
    dictionary: &DataDictionary,
    context: &str,
) -> Result<ModelKind, ReadError> {
    match schema {
        ModelSchema::MiningModel(m) => convert_mining_model(m, dictionary, context).map(ModelKind::Mining),
        ModelSchema::TreeModel(t) => convert_tree_model(t, dictionary, context).map(ModelKind::Tree),
    }
}

fn convert_mining_model(
    schema: MiningModelSchema,
    dictionary: &DataDictionary,
    context: &str,
) -> Result<MiningModel, ReadError> {
    let mining_schema = convert_mining_schema(schema.mining_schema, dictionary, context)?;

    let mut segments = Vec::with_capacity(schema.segmentation.segments.len());
    for (index, segment) in schema.segmentation.segments.into_iter().enumerate() {
        let context = format!("{context}/segments/{index}");
        if !segment.weight.is_finite() || segment.weight < 0.0 {
            return Err(ReadError::Validation(format!(
                "{context}: weight must be finite and non-negative, got {}",
                segment.weight
            )));
        }
        check_predicate(&segment.predicate, dictionary, &context)?;
        segments.push(Segment {
            id: segment.id,
            weight: segment.weight,
            predicate: segment.predicate,
            model: convert_model(segment.model, dictionary, &context)?,
        });
    }

    Ok(MiningModel {
        name: schema.name,
        function: schema.function,
        mining_schema,
        segmentation: Segmentation {
            method: schema.segmentation.method,
            segments,
        },
    })
}

fn convert_tree_model(
    schema: TreeModelSchema,
    dictionary: &DataDictionary,
    context: &str,
) -> Result<TreeModel, ReadError> {
    let mining_schema = schema
        .mining_schema
        .map(|s| convert_mining_schema(s, dictionary, context))
        .transpose()?;

    let tree = convert_tree(schema.node, dictionary, context)?;
    tree.validate()
        .map_err(|e| ReadError::Validation(format!("{context}: {e}")))?;

    Ok(TreeModel {
        name: schema.name,
        function: schema.function,
        mining_schema,
        missing_value_strategy: schema.missing_value_strategy,
        no_true_child_strategy: schema.no_true_child_strategy,
        tree,
    })
}

/// Flatten nested nodes into an arena, keeping each node's child order.
fn convert_tree(root: NodeSchema, dictionary: &DataDictionary, context: &str) -> Result<Tree, ReadError> {
    let (root, children) = split_node(root, dictionary, context)?;
    let mut tree = Tree::new(root);

    let mut pending: Vec<(NodeId, Vec<NodeSchema>)> = vec![(Tree::ROOT, children)];
    while let Some((parent, children)) = pending.pop() {
        for child in children {
            let (node, grandchildren) = split_node(child, dictionary, context)?;
            let id = tree.push_child(parent, node);
            if !grandchildren.is_empty() {
                pending.push((id, grandchildren));
            }
        }
    }

    Ok(tree)
}

fn split_node(
    schema: NodeSchema,
    dictionary: &DataDictionary,
    context: &str,
) -> Result<(Node, Vec<NodeSchema>), ReadError> {
    check_predicate(&schema.predicate, dictionary, context)?;

    let mut node = Node::new(schema.predicate);
    node.id = schema.id;
    node.score = schema.score;
    node.record_count = schema.record_count;
    node.default_child = schema.default_child;
    node.score_distributions = schema
        .score_distributions
        .into_iter()
        .map(|d| ScoreDistribution {
            value: d.value,
            record_count: d.record_count,
            probability: d.probability,
            confidence: d.confidence,
        })
        .collect();

    Ok((node, schema.nodes))
}

fn check_declared(field: &str, dictionary: &DataDictionary, context: &str) -> Result<(), ReadError> {
    if dictionary.contains(field) {
        Ok(())
    } else {
        Err(ReadError::Validation(format!(
            "{context}: field {field:?} is not declared in the data dictionary"
        )))
    }
}

fn check_predicate(predicate: &Predicate, dictionary: &DataDictionary, context: &str) -> Result<(), ReadError> {
    for field in predicate.fields() {
        check_declared(field, dictionary, context)?;
    }
    check_constants(predicate, context)
}

fn check_constants(predicate: &Predicate, context: &str) -> Result<(), ReadError> {
    match predicate {
        Predicate::Simple {
            field,
            operator,
            value: None,
        } if operator.needs_value() => Err(ReadError::Validation(format!(
            "{context}: predicate on {field:?} needs a value"
        ))),
        Predicate::Compound { predicates, .. } => predicates
            .iter()
            .try_for_each(|p| check_constants(p, context)),
        _ => Ok(()),
    }
}

// =============================================================================
// Runtime -> schema
// =============================================================================

impl From<&Model> for ModelDocumentSchema {
    fn from(model: &Model) -> Self {
        Self {
            version: CURRENT_VERSION,
            header: model.header.as_ref().map(HeaderSchema::from),
            data_dictionary: DataDictionarySchema::from(&model.data_dictionary),
            model: ModelSchema::from(&model.kind),
        }
    }
}

impl From<&Header> for HeaderSchema {
    fn from(header: &Header) -> Self {
        Self {
            description: header.description.clone(),
            application: header.application.clone(),
            copyright: header.copyright.clone(),
        }
    }
}

impl From<&DataDictionary> for DataDictionarySchema {
    fn from(dictionary: &DataDictionary) -> Self {
        Self {
            fields: dictionary
                .fields()
                .iter()
                .map(|f| DataFieldSchema {
                    name: f.name.clone(),
                    optype: f.optype,
                    data_type: f.data_type,
                    values: f.values.clone(),
                })
                .collect(),
        }
    }
}

impl From<&MiningSchema> for MiningSchemaSchema {
    fn from(schema: &MiningSchema) -> Self {
        Self {
            fields: schema
                .fields
                .iter()
                .map(|f| MiningFieldSchema {
                    name: f.name.clone(),
                    usage: f.usage,
                })
                .collect(),
        }
    }
}

impl From<&ModelKind> for ModelSchema {
    fn from(kind: &ModelKind) -> Self {
        match kind {
            ModelKind::Mining(m) => Self::MiningModel(MiningModelSchema {
                name: m.name.clone(),
                function: m.function,
                mining_schema: MiningSchemaSchema::from(&m.mining_schema),
                segmentation: SegmentationSchema {
                    method: m.segmentation.method,
                    segments: m
                        .segmentation
                        .segments
                        .iter()
                        .map(|s| SegmentSchema {
                            id: s.id.clone(),
                            weight: s.weight,
                            predicate: s.predicate.clone(),
                            model: ModelSchema::from(&s.model),
                        })
                        .collect(),
                },
            }),
            ModelKind::Tree(t) => Self::TreeModel(TreeModelSchema {
                name: t.name.clone(),
                function: t.function,
                mining_schema: t.mining_schema.as_ref().map(MiningSchemaSchema::from),
                missing_value_strategy: t.missing_value_strategy,
                no_true_child_strategy: t.no_true_child_strategy,
                node: node_schema(&t.tree, Tree::ROOT),
            }),
        }
    }
}

fn node_schema(tree: &Tree, id: NodeId) -> NodeSchema {
    let node = tree.node(id);
    NodeSchema {
        id: node.id.clone(),
        score: node.score.clone(),
        record_count: node.record_count,
        predicate: node.predicate.clone(),
        score_distributions: node
            .score_distributions
            .iter()
            .map(|d| ScoreDistributionSchema {
                value: d.value.clone(),
                record_count: d.record_count,
                probability: d.probability,
                confidence: d.confidence,
            })
            .collect(),
        default_child: node.default_child.clone(),
        nodes: node.children().iter().map(|&child| node_schema(tree, child)).collect(),
    }
}
