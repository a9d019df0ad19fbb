//! Decision tree storage.
//!
//! - [`Tree`]: arena of [`Node`]s, root at index 0
//! - [`Node`]: one decision node with its counters and score distributions
//! - [`TreeValidationError`]: structural validation errors
//!
//! Nodes are owned by their tree and refer to their children by [`NodeId`], so
//! counters can be updated in place while walking a recorded decision path.

use std::collections::HashSet;

use super::{Predicate, Value};

/// Index of a node within its tree's arena.
pub type NodeId = u32;

// ============================================================================
// ScoreDistribution
// ============================================================================

/// Per-class statistics stored at a node.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreDistribution {
    /// Class label.
    pub value: Value,
    /// Number of observations of this class that reached the node.
    pub record_count: u64,
    pub probability: Option<f64>,
    pub confidence: Option<f64>,
}

impl ScoreDistribution {
    /// A distribution entry with only a label and a count.
    pub fn new(value: impl Into<Value>, record_count: u64) -> Self {
        Self {
            value: value.into(),
            record_count,
            probability: None,
            confidence: None,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }
}

// ============================================================================
// Node
// ============================================================================

/// A decision node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Option<String>,
    /// Value predicted when a walk stops here.
    pub score: Option<Value>,
    /// Number of observations that reached this node.
    pub record_count: Option<u64>,
    /// Condition under which a walk enters this node from its parent.
    pub predicate: Predicate,
    pub score_distributions: Vec<ScoreDistribution>,
    /// Id of the child followed when a predicate cannot be decided.
    pub default_child: Option<String>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            id: None,
            score: None,
            record_count: None,
            predicate,
            score_distributions: Vec::new(),
            default_child: None,
            children: Vec::new(),
        }
    }

    /// A node with a score and no children yet.
    pub fn leaf(predicate: Predicate, score: impl Into<Value>) -> Self {
        Self::new(predicate).with_score(score)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_score(mut self, score: impl Into<Value>) -> Self {
        self.score = Some(score.into());
        self
    }

    pub fn with_record_count(mut self, record_count: u64) -> Self {
        self.record_count = Some(record_count);
        self
    }

    pub fn with_distribution(mut self, distribution: ScoreDistribution) -> Self {
        self.score_distributions.push(distribution);
        self
    }

    pub fn with_default_child(mut self, id: impl Into<String>) -> Self {
        self.default_child = Some(id.into());
        self
    }

    /// Children in evaluation order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Score distribution entry for `label`, if present.
    pub fn distribution(&self, label: &Value) -> Option<&ScoreDistribution> {
        self.score_distributions.iter().find(|d| d.value == *label)
    }
}

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Two nodes share the same id.
    DuplicateNodeId { id: String },
    /// A default child id does not name one of the node's children.
    UnknownDefaultChild { node: NodeId, child: String },
}

impl std::fmt::Display for TreeValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNodeId { id } => write!(f, "duplicate node id {id:?}"),
            Self::UnknownDefaultChild { node, child } => {
                write!(f, "node {node} names default child {child:?}, which is not one of its children")
            }
        }
    }
}

impl std::error::Error for TreeValidationError {}

// ============================================================================
// Tree
// ============================================================================

/// Arena-backed decision tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub const ROOT: NodeId = 0;

    /// Start a tree from its root node.
    pub fn new(root: Node) -> Self {
        Self { nodes: vec![root] }
    }

    /// Append `node` as the last child of `parent` and return its id.
    pub fn push_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        debug_assert!((parent as usize) < self.nodes.len(), "parent out of bounds");
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.nodes[parent as usize].children.push(id);
        id
    }

    /// Builder form of [`push_child`](Self::push_child) for the root.
    pub fn with_child(mut self, node: Node) -> Self {
        self.push_child(Self::ROOT, node);
        self
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All nodes in arena order, mutably. Topology stays fixed.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Resolve the default child of `id` to a node index.
    pub fn default_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let target = node.default_child.as_deref()?;
        node.children
            .iter()
            .copied()
            .find(|&child| self.node(child).id.as_deref() == Some(target))
    }

    /// Sum of a node's children's record counts, absent counts taken as 0.
    pub fn children_record_count(&self, id: NodeId) -> u64 {
        self.node(id)
            .children
            .iter()
            .map(|&child| self.node(child).record_count.unwrap_or(0))
            .sum()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate the invariants the arena itself cannot enforce.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if let Some(id) = &node.id {
                if !seen.insert(id.as_str()) {
                    return Err(TreeValidationError::DuplicateNodeId { id: id.clone() });
                }
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let Some(child) = &node.default_child else {
                continue;
            };
            let index = index as NodeId;
            if self.default_child(index).is_none() {
                return Err(TreeValidationError::UnknownDefaultChild {
                    node: index,
                    child: child.clone(),
                });
            }
        }

        Ok(())
    }
}
