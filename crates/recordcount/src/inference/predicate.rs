//! Three-valued predicate evaluation.

use std::cmp::Ordering;

use super::input::{coerce_constant, FieldValue, Inputs};
use super::EvaluationError;
use crate::repr::{BooleanOperator, Predicate, SetOperator, SimpleOperator, Value};

/// Outcome of a predicate: a missing input makes most predicates unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    #[inline]
    pub fn from_bool(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == Self::True
    }

    fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }
}

/// Evaluate `predicate` against prepared inputs.
pub fn evaluate_predicate(predicate: &Predicate, inputs: &Inputs<'_>) -> Result<Truth, EvaluationError> {
    match predicate {
        Predicate::True => Ok(Truth::True),
        Predicate::False => Ok(Truth::False),
        Predicate::Simple {
            field,
            operator,
            value,
        } => evaluate_simple(field, *operator, value.as_ref(), inputs),
        Predicate::SimpleSet {
            field,
            operator,
            values,
        } => evaluate_set(field, *operator, values, inputs),
        Predicate::Compound {
            operator,
            predicates,
        } => evaluate_compound(*operator, predicates, inputs),
    }
}

fn evaluate_simple(
    field: &str,
    operator: SimpleOperator,
    constant: Option<&Value>,
    inputs: &Inputs<'_>,
) -> Result<Truth, EvaluationError> {
    let input = inputs.get(field);
    match operator {
        SimpleOperator::IsMissing => return Ok(Truth::from_bool(input.is_missing())),
        SimpleOperator::IsNotMissing => return Ok(Truth::from_bool(!input.is_missing())),
        _ => {}
    }
    if input.is_missing() {
        return Ok(Truth::Unknown);
    }

    let constant = constant.ok_or_else(|| EvaluationError::MissingConstant(field.to_string()))?;
    let ordering = compare(field, input, constant, inputs)?;
    let Some(ordering) = ordering else {
        return Ok(Truth::False);
    };

    Ok(Truth::from_bool(match operator {
        SimpleOperator::Equal => ordering == Ordering::Equal,
        SimpleOperator::NotEqual => ordering != Ordering::Equal,
        SimpleOperator::LessThan => ordering == Ordering::Less,
        SimpleOperator::LessOrEqual => ordering != Ordering::Greater,
        SimpleOperator::GreaterThan => ordering == Ordering::Greater,
        SimpleOperator::GreaterOrEqual => ordering != Ordering::Less,
        // Decided before the comparison.
        SimpleOperator::IsMissing | SimpleOperator::IsNotMissing => false,
    }))
}

/// Compare a present input with a model constant of the same field.
fn compare(
    field: &str,
    input: &FieldValue,
    constant: &Value,
    inputs: &Inputs<'_>,
) -> Result<Option<Ordering>, EvaluationError> {
    let data_type = inputs.data_type(field)?;
    let incompatible = || EvaluationError::IncompatibleConstant {
        field: field.to_string(),
        value: constant.clone(),
    };
    let constant = coerce_constant(data_type, constant).ok_or_else(incompatible)?;

    Ok(match (input, &constant) {
        (FieldValue::Number(a), FieldValue::Number(b)) => a.partial_cmp(b),
        (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
        _ => return Err(incompatible()),
    })
}

fn evaluate_set(
    field: &str,
    operator: SetOperator,
    values: &[Value],
    inputs: &Inputs<'_>,
) -> Result<Truth, EvaluationError> {
    let input = inputs.get(field);
    if input.is_missing() {
        return Ok(Truth::Unknown);
    }

    let mut found = false;
    for value in values {
        if compare(field, input, value, inputs)? == Some(Ordering::Equal) {
            found = true;
            break;
        }
    }

    Ok(match operator {
        SetOperator::IsIn => Truth::from_bool(found),
        SetOperator::IsNotIn => Truth::from_bool(found).negate(),
    })
}

fn evaluate_compound(
    operator: BooleanOperator,
    predicates: &[Predicate],
    inputs: &Inputs<'_>,
) -> Result<Truth, EvaluationError> {
    match operator {
        BooleanOperator::And => {
            let mut result = Truth::True;
            for predicate in predicates {
                match evaluate_predicate(predicate, inputs)? {
                    Truth::False => return Ok(Truth::False),
                    Truth::Unknown => result = Truth::Unknown,
                    Truth::True => {}
                }
            }
            Ok(result)
        }
        BooleanOperator::Or => {
            let mut result = Truth::False;
            for predicate in predicates {
                match evaluate_predicate(predicate, inputs)? {
                    Truth::True => return Ok(Truth::True),
                    Truth::Unknown => result = Truth::Unknown,
                    Truth::False => {}
                }
            }
            Ok(result)
        }
        BooleanOperator::Xor => {
            let mut result = false;
            for predicate in predicates {
                match evaluate_predicate(predicate, inputs)? {
                    Truth::Unknown => return Ok(Truth::Unknown),
                    truth => result ^= truth.is_true(),
                }
            }
            Ok(Truth::from_bool(result))
        }
        BooleanOperator::Surrogate => {
            for predicate in predicates {
                match evaluate_predicate(predicate, inputs)? {
                    Truth::Unknown => continue,
                    truth => return Ok(truth),
                }
            }
            Ok(Truth::Unknown)
        }
    }
}
