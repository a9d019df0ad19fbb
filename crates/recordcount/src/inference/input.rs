//! Raw input rows and their typed form.

use std::collections::HashMap;
use std::fmt;

use super::EvaluationError;
use crate::repr::{DataDictionary, DataField, DataType, Value};

// =============================================================================
// InputRow
// =============================================================================

/// One row of raw inputs: field name to unparsed cell text, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow {
    fields: Vec<(String, String)>,
}

impl InputRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, replacing an earlier value of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a field and return its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

impl fmt::Display for InputRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        f.write_str("}")
    }
}

// =============================================================================
// EvalOptions
// =============================================================================

/// How raw cells are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOptions {
    /// Cell texts that stand for a missing value.
    pub missing_values: Vec<String>,
}

impl EvalOptions {
    pub fn is_missing(&self, raw: &str) -> bool {
        self.missing_values.iter().any(|token| token == raw)
    }
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            missing_values: vec![String::new()],
        }
    }
}

// =============================================================================
// Typed inputs
// =============================================================================

/// A prepared input value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Read `raw` as a value of `data_type`. `None` if it cannot be read.
///
/// Numeric NaN reads as missing.
pub fn parse_as(data_type: DataType, raw: &str) -> Option<FieldValue> {
    match data_type {
        DataType::String => Some(FieldValue::Text(raw.to_string())),
        DataType::Integer => {
            let n: f64 = raw.trim().parse().ok()?;
            (n.is_nan() || n.fract() == 0.0).then(|| number(n))
        }
        DataType::Float | DataType::Double => raw.trim().parse().ok().map(number),
        DataType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(FieldValue::Number(1.0)),
            "false" | "0" => Some(FieldValue::Number(0.0)),
            _ => None,
        },
    }
}

fn number(n: f64) -> FieldValue {
    if n.is_nan() {
        FieldValue::Missing
    } else {
        FieldValue::Number(n)
    }
}

/// Read a model constant the way an input of `data_type` would be read.
pub fn coerce_constant(data_type: DataType, value: &Value) -> Option<FieldValue> {
    match (data_type, value) {
        (DataType::Float | DataType::Double | DataType::Integer, Value::Number(n)) => Some(number(*n)),
        (_, value) => parse_as(data_type, &value.to_string()),
    }
}

fn prepare_field(field: &DataField, raw: &str) -> Result<FieldValue, EvaluationError> {
    let invalid = || EvaluationError::InvalidValue {
        field: field.name.clone(),
        value: raw.to_string(),
    };
    let value = parse_as(field.data_type, raw).ok_or_else(invalid)?;
    if let FieldValue::Text(text) = &value {
        if !field.accepts(text) {
            return Err(invalid());
        }
    }
    Ok(value)
}

/// Typed inputs of one row, keyed by data dictionary field.
#[derive(Debug)]
pub struct Inputs<'a> {
    dictionary: &'a DataDictionary,
    values: HashMap<&'a str, FieldValue>,
}

impl<'a> Inputs<'a> {
    /// Type every dictionary field present in `row`. Other fields are ignored.
    pub fn prepare(
        dictionary: &'a DataDictionary,
        row: &InputRow,
        options: &EvalOptions,
    ) -> Result<Self, EvaluationError> {
        let mut values = HashMap::with_capacity(dictionary.len());
        for field in dictionary.fields() {
            let Some(raw) = row.get(&field.name) else {
                continue;
            };
            let value = if options.is_missing(raw) {
                FieldValue::Missing
            } else {
                prepare_field(field, raw)?
            };
            values.insert(field.name.as_str(), value);
        }
        Ok(Self { dictionary, values })
    }

    /// Value of `field`; fields absent from the row are missing.
    pub fn get(&self, field: &str) -> &FieldValue {
        static MISSING: FieldValue = FieldValue::Missing;
        self.values.get(field).unwrap_or(&MISSING)
    }

    pub fn data_type(&self, field: &str) -> Result<DataType, EvaluationError> {
        self.dictionary
            .get(field)
            .map(|f| f.data_type)
            .ok_or_else(|| EvaluationError::UnknownField(field.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::OpType;
    use rstest::rstest;

    fn dictionary() -> DataDictionary {
        let mut color = DataField::new("color", OpType::Categorical, DataType::String);
        color.values = vec!["red".into(), "blue".into()];
        DataDictionary::new(vec![
            DataField::new("x", OpType::Continuous, DataType::Double),
            DataField::new("n", OpType::Continuous, DataType::Integer),
            DataField::new("flag", OpType::Categorical, DataType::Boolean),
            color,
        ])
    }

    #[test]
    fn row_keeps_column_order_and_replaces_in_place() {
        let mut row: InputRow = [("a", "1"), ("b", "2")].into_iter().collect();
        row.insert("a", "3");
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
        assert_eq!(row.remove("a").as_deref(), Some("3"));
        assert_eq!(row.remove("a"), None);
        assert_eq!(row.to_string(), r#"{b="2"}"#);
    }

    #[rstest]
    #[case(DataType::Double, " 2.5 ", Some(FieldValue::Number(2.5)))]
    #[case(DataType::Double, "NaN", Some(FieldValue::Missing))]
    #[case(DataType::Double, "abc", None)]
    #[case(DataType::Integer, "4", Some(FieldValue::Number(4.0)))]
    #[case(DataType::Integer, "4.5", None)]
    #[case(DataType::Boolean, "TRUE", Some(FieldValue::Number(1.0)))]
    #[case(DataType::Boolean, "0", Some(FieldValue::Number(0.0)))]
    #[case(DataType::Boolean, "maybe", None)]
    #[case(DataType::String, " x ", Some(FieldValue::Text(" x ".into())))]
    fn parse_by_data_type(#[case] data_type: DataType, #[case] raw: &str, #[case] expected: Option<FieldValue>) {
        assert_eq!(parse_as(data_type, raw), expected);
    }

    #[test]
    fn prepare_types_known_fields_only() {
        let dictionary = dictionary();
        let row: InputRow = [("x", "1.5"), ("color", "red"), ("other", "junk"), ("n", "")]
            .into_iter()
            .collect();
        let inputs = Inputs::prepare(&dictionary, &row, &EvalOptions::default()).unwrap();

        assert_eq!(inputs.get("x"), &FieldValue::Number(1.5));
        assert_eq!(inputs.get("color"), &FieldValue::Text("red".into()));
        assert!(inputs.get("n").is_missing());
        assert!(inputs.get("flag").is_missing());
        assert!(inputs.get("other").is_missing());
    }

    #[test]
    fn prepare_rejects_undeclared_category() {
        let dictionary = dictionary();
        let row: InputRow = [("color", "green")].into_iter().collect();
        let err = Inputs::prepare(&dictionary, &row, &EvalOptions::default()).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::InvalidValue {
                field: "color".into(),
                value: "green".into()
            }
        );
    }

    #[test]
    fn custom_missing_tokens() {
        let dictionary = dictionary();
        let options = EvalOptions {
            missing_values: vec!["NA".into(), "?".into()],
        };
        let row: InputRow = [("x", "NA"), ("n", "?")].into_iter().collect();
        let inputs = Inputs::prepare(&dictionary, &row, &options).unwrap();
        assert!(inputs.get("x").is_missing());
        assert!(inputs.get("n").is_missing());

        // Empty cells are no longer missing once the tokens are replaced.
        let row: InputRow = [("x", "")].into_iter().collect();
        assert!(Inputs::prepare(&dictionary, &row, &options).is_err());
    }

    #[test]
    fn constants_follow_field_type() {
        assert_eq!(
            coerce_constant(DataType::Double, &Value::text("3")),
            Some(FieldValue::Number(3.0))
        );
        assert_eq!(
            coerce_constant(DataType::String, &Value::Number(3.0)),
            Some(FieldValue::Text("3".into()))
        );
        assert_eq!(coerce_constant(DataType::Double, &Value::text("three")), None);
    }
}
