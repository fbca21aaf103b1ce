use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

use super::expression::{Expression, RangeBounds};

/// Error locating the offending part of a filter expression by its path, e.g. `/and[1]/range/age`.
#[derive(Debug, Error, PartialEq)]
#[error("Parse Error: filtering expression at path \"{path}\":\n    {message}")]
pub struct FilterParseError {
    pub path: String,
    pub message: String,
}

impl FilterParseError {
    fn new(message: impl Into<String>, path: &str) -> Self {
        let path = if path.is_empty() { "<root>" } else { path };
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Parse a filter expression from its JSON encoding.
pub fn parse_expression(data: &Value) -> Result<Expression, FilterParseError> {
    parse_at(data, "")
}

impl FromStr for Expression {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data: Value = serde_json::from_str(s)
            .map_err(|err| FilterParseError::new(format!("Invalid JSON: {err}"), ""))?;
        parse_expression(&data)
    }
}

impl TryFrom<&Value> for Expression {
    type Error = FilterParseError;

    fn try_from(data: &Value) -> Result<Self, Self::Error> {
        parse_expression(data)
    }
}

#[derive(Clone, Copy)]
enum ValueType {
    Array,
    Object,
    String,
}

impl ValueType {
    fn name(self) -> &'static str {
        match self {
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::String => "string",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
            ValueType::String => value.is_string(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn entries(count: usize) -> &'static str {
    if count == 1 {
        "entry"
    } else {
        "entries"
    }
}

fn expect_object<'a>(data: &'a Value, path: &str) -> Result<&'a Map<String, Value>, FilterParseError> {
    data.as_object().ok_or_else(|| {
        FilterParseError::new(
            format!("Value must be a object (was {})", type_name(data)),
            path,
        )
    })
}

fn expect_len_exact(len: usize, exact: usize, path: &str) -> Result<(), FilterParseError> {
    if len != exact {
        return Err(FilterParseError::new(
            format!("Value must have exactly {exact} {} (had {len})", entries(exact)),
            path,
        ));
    }
    Ok(())
}

fn expect_len_at_least(len: usize, at_least: usize, path: &str) -> Result<(), FilterParseError> {
    if len < at_least {
        return Err(FilterParseError::new(
            format!(
                "Value must have at least {at_least} {} (had {len})",
                entries(at_least)
            ),
            path,
        ));
    }
    Ok(())
}

/// The single `(key, value)` entry of an object.
fn single_entry<'a>(
    data: &'a Map<String, Value>,
    path: &str,
) -> Result<(&'a String, &'a Value), FilterParseError> {
    expect_len_exact(data.len(), 1, path)?;
    data.iter()
        .next()
        .ok_or_else(|| FilterParseError::new("Value must not be empty", path))
}

fn parse_at(data: &Value, path: &str) -> Result<Expression, FilterParseError> {
    let object = expect_object(data, path)?;
    let (operation, value) = single_entry(object, path)?;

    let value_type = match operation.as_str() {
        "and" | "or" => ValueType::Array,
        "eq" | "ne" | "range" | "prefix" | "like" => ValueType::Object,
        "isnull" | "isnotnull" => ValueType::String,
        _ => {
            return Err(FilterParseError::new(
                format!("Unknown expression operation: \"{operation}\""),
                &format!("{path}/"),
            ))
        }
    };
    let path = format!("{path}/{operation}");
    if !value_type.matches(value) {
        return Err(FilterParseError::new(
            format!(
                "Expected value of type \"{}\", got \"{}\"",
                value_type.name(),
                type_name(value)
            ),
            &path,
        ));
    }

    match (operation.as_str(), value) {
        ("and", Value::Array(parts)) => Ok(Expression::And(parse_parts(parts, &path)?)),
        ("or", Value::Array(parts)) => Ok(Expression::Or(parse_parts(parts, &path)?)),
        ("eq", Value::Object(object)) => {
            let (property, value) = single_entry(object, &path)?;
            Ok(Expression::Eq {
                property: property.clone(),
                value: value.clone(),
            })
        }
        ("ne", Value::Object(object)) => {
            let (property, value) = single_entry(object, &path)?;
            Ok(Expression::Ne {
                property: property.clone(),
                value: value.clone(),
            })
        }
        ("range", Value::Object(object)) => parse_range(object, &path),
        ("isnull", Value::String(property)) => Ok(Expression::IsNull(property.clone())),
        ("isnotnull", Value::String(property)) => Ok(Expression::IsNotNull(property.clone())),
        ("prefix", Value::Object(object)) => {
            let (property, prefix) = single_entry(object, &path)?;
            Ok(Expression::Prefix {
                property: property.clone(),
                prefix: expect_string(prefix, &format!("{path}/{property}"))?,
            })
        }
        ("like", Value::Object(object)) => {
            let (property, pattern) = single_entry(object, &path)?;
            Ok(Expression::Like {
                property: property.clone(),
                pattern: expect_string(pattern, &format!("{path}/{property}"))?,
            })
        }
        _ => Err(FilterParseError::new(
            format!("Unsupported value for \"{operation}\""),
            &path,
        )),
    }
}

fn parse_parts(parts: &[Value], path: &str) -> Result<Vec<Expression>, FilterParseError> {
    expect_len_at_least(parts.len(), 2, path)?;
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| parse_at(part, &format!("{path}[{index}]")))
        .collect()
}

fn parse_range(data: &Map<String, Value>, path: &str) -> Result<Expression, FilterParseError> {
    let (property, bounds_data) = single_entry(data, path)?;
    let path = format!("{path}/{property}");
    let bounds_data = expect_object(bounds_data, &path)?;
    expect_len_at_least(bounds_data.len(), 1, &path)?;

    let mut bounds = RangeBounds::default();
    for (key, bound) in bounds_data {
        let slot = match key.as_str() {
            "gte" => &mut bounds.gte,
            "gt" => &mut bounds.gt,
            "lte" => &mut bounds.lte,
            "lt" => &mut bounds.lt,
            _ => {
                return Err(FilterParseError::new(
                    format!("Unknown operation for range expression: \"{key}\""),
                    &path,
                ))
            }
        };
        *slot = Some(bound.clone());
    }
    Ok(Expression::Range {
        property: property.clone(),
        bounds,
    })
}

fn expect_string(value: &Value, path: &str) -> Result<String, FilterParseError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        FilterParseError::new(
            format!("Value must be a string (was {})", type_name(value)),
            path,
        )
    })
}
