//! Schema types for the JSON model document.
//!
//! The document nests child nodes inside their parents, the way tree models
//! are usually exported; the runtime [`Tree`](crate::repr::Tree) keeps them in
//! an arena instead. Keeping the two apart lets the document shape be
//! validated on load and evolve without touching the runtime types.
//!
//! Leaf enums and predicates are shared with the runtime representation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::repr::{
    DataType, FieldUsage, MiningFunction, MissingValueStrategy, MultipleModelMethod,
    NoTrueChildStrategy, OpType, Predicate, Value,
};

/// Document version written by this crate.
pub const CURRENT_VERSION: u32 = 1;

// =============================================================================
// Tolerant count parsing
// =============================================================================

/// Counts written by other tools may be floats (`12.0`) or strings (`"12"`).
fn parse_count(value: &JsonValue) -> Result<u64, String> {
    match value {
        JsonValue::Number(n) => {
            if let Some(count) = n.as_u64() {
                return Ok(count);
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err(format!("invalid record count {n}")),
            }
        }
        JsonValue::String(s) => {
            let t = s.trim();
            if let Ok(count) = t.parse::<u64>() {
                return Ok(count);
            }
            parse_count(&JsonValue::from(t.parse::<f64>().map_err(|_| format!("invalid record count {s:?}"))?))
        }
        other => Err(format!("invalid record count {other}")),
    }
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let value = JsonValue::deserialize(deserializer)?;
    parse_count(&value).map_err(SerdeError::custom)
}

fn deserialize_optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        value => parse_count(&value).map(Some).map_err(SerdeError::custom),
    }
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_weight() -> f64 {
    1.0
}

// =============================================================================
// Document
// =============================================================================

/// Top-level model document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocumentSchema {
    /// Document format version.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderSchema>,
    pub data_dictionary: DataDictionarySchema,
    pub model: ModelSchema,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDictionarySchema {
    pub fields: Vec<DataFieldSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFieldSchema {
    pub name: String,
    pub optype: OpType,
    pub data_type: DataType,
    /// Valid values for categorical and ordinal fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiningSchemaSchema {
    pub fields: Vec<MiningFieldSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningFieldSchema {
    pub name: String,
    #[serde(default)]
    pub usage: FieldUsage,
}

// =============================================================================
// Models
// =============================================================================

/// Model element, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSchema {
    MiningModel(MiningModelSchema),
    TreeModel(TreeModelSchema),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningModelSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub function: MiningFunction,
    #[serde(default)]
    pub mining_schema: MiningSchemaSchema,
    pub segmentation: SegmentationSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationSchema {
    pub method: MultipleModelMethod,
    pub segments: Vec<SegmentSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub predicate: Predicate,
    pub model: ModelSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeModelSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub function: MiningFunction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mining_schema: Option<MiningSchemaSchema>,
    #[serde(default)]
    pub missing_value_strategy: MissingValueStrategy,
    #[serde(default)]
    pub no_true_child_strategy: NoTrueChildStrategy,
    pub node: NodeSchema,
}

/// A node with its children nested inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub record_count: Option<u64>,
    #[serde(default)]
    pub predicate: Predicate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub score_distributions: Vec<ScoreDistributionSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_child: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDistributionSchema {
    pub value: Value,
    #[serde(deserialize_with = "deserialize_count")]
    pub record_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}
