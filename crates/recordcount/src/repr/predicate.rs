//! Predicates guarding tree nodes and ensemble segments.

use serde::{Deserialize, Serialize};
use serde_with::formats::PreferMany;
use serde_with::{serde_as, OneOrMany};

use super::Value;

/// Comparison applied by a [`Predicate::Simple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleOperator {
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    IsMissing,
    IsNotMissing,
}

impl SimpleOperator {
    /// Returns true for operators that compare against a constant.
    pub fn needs_value(&self) -> bool {
        !matches!(self, Self::IsMissing | Self::IsNotMissing)
    }
}

/// Membership test applied by a [`Predicate::SimpleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    IsIn,
    IsNotIn,
}

/// Connective of a [`Predicate::Compound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOperator {
    And,
    Or,
    Xor,
    /// First operand that can be decided wins.
    Surrogate,
}

/// A boolean condition over input fields.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    #[default]
    True,
    False,
    #[serde(rename = "simple_predicate")]
    Simple {
        field: String,
        operator: SimpleOperator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    #[serde(rename = "simple_set_predicate")]
    SimpleSet {
        field: String,
        operator: SetOperator,
        #[serde_as(as = "OneOrMany<_, PreferMany>")]
        values: Vec<Value>,
    },
    #[serde(rename = "compound_predicate")]
    Compound {
        operator: BooleanOperator,
        predicates: Vec<Predicate>,
    },
}

impl Predicate {
    /// `field <operator> value`.
    pub fn simple(field: impl Into<String>, operator: SimpleOperator, value: impl Into<Value>) -> Self {
        Self::Simple {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }

    /// `field is missing`.
    pub fn is_missing(field: impl Into<String>) -> Self {
        Self::Simple {
            field: field.into(),
            operator: SimpleOperator::IsMissing,
            value: None,
        }
    }

    /// `field in {values}`.
    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::SimpleSet {
            field: field.into(),
            operator: SetOperator::IsIn,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn compound(operator: BooleanOperator, predicates: Vec<Predicate>) -> Self {
        Self::Compound { operator, predicates }
    }

    /// Names of all fields this predicate reads, in order of appearance.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::True | Self::False => {}
            Self::Simple { field, .. } | Self::SimpleSet { field, .. } => out.push(field),
            Self::Compound { predicates, .. } => {
                for predicate in predicates {
                    predicate.collect_fields(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_predicates() {
        let json = r#"{
            "type": "compound_predicate",
            "operator": "surrogate",
            "predicates": [
                { "type": "simple_predicate", "field": "x", "operator": "less_or_equal", "value": 2.5 },
                { "type": "simple_set_predicate", "field": "color", "operator": "is_in", "values": "red" },
                { "type": "true" }
            ]
        }"#;
        let predicate: Predicate = serde_json::from_str(json).unwrap();
        assert_eq!(
            predicate,
            Predicate::compound(
                BooleanOperator::Surrogate,
                vec![
                    Predicate::simple("x", SimpleOperator::LessOrEqual, 2.5),
                    Predicate::is_in("color", ["red"]),
                    Predicate::True,
                ]
            )
        );
        assert_eq!(predicate.fields(), vec!["x", "color"]);
    }

    #[test]
    fn set_values_written_as_array() {
        let json = serde_json::to_value(Predicate::is_in("color", ["red"])).unwrap();
        assert_eq!(json["values"], serde_json::json!(["red"]));
    }

    #[test]
    fn missing_checks_have_no_value() {
        let json = serde_json::to_value(Predicate::is_missing("x")).unwrap();
        assert!(json.get("value").is_none());
        assert!(!SimpleOperator::IsNotMissing.needs_value());
    }
}
