//! Model scalars.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar carried by a model document: a node score, a class label or a
/// predicate constant.
///
/// Documents spell scalars either as JSON numbers or as strings. The flavor is
/// kept so a loaded model is written back the way it was read, while equality
/// compares across flavors: any text that reads as a number compares as that
/// number, so `Number(1.0)`, `Text("1")` and `Text("1.0")` are all equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Create a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Numeric reading of this value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Text of a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

/// What equality compares: the number for numeric values and numeric text,
/// the text otherwise.
#[derive(PartialEq)]
enum EqKey<'a> {
    Number(f64),
    Text(&'a str),
}

impl Value {
    fn eq_key(&self) -> EqKey<'_> {
        match self {
            Self::Number(n) => EqKey::Number(*n),
            Self::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if !n.is_nan() => EqKey::Number(n),
                _ => EqKey::Text(s),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_key() == other.eq_key()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
