use std::ops::{BitAnd, BitOr};

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Bounds of a range expression. At least one bound should be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub gte: Option<Value>,
    pub gt: Option<Value>,
    pub lte: Option<Value>,
    pub lt: Option<Value>,
}

impl RangeBounds {
    fn to_json(&self) -> Value {
        let mut bounds = Map::new();
        for (key, bound) in [
            ("gte", &self.gte),
            ("gt", &self.gt),
            ("lte", &self.lte),
            ("lt", &self.lt),
        ] {
            if let Some(bound) = bound {
                bounds.insert(key.to_string(), bound.clone());
            }
        }
        Value::Object(bounds)
    }
}

/// A property filter evaluated by the catalog service.
///
/// Serializes to the service's JSON encoding, e.g. `{"and": [{"eq": {"kind": "road"}}, ...]}`.
/// Expressions combine with `&` and `|`, which flatten nested conjunctions and disjunctions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Eq { property: String, value: Value },
    Ne { property: String, value: Value },
    Range { property: String, bounds: RangeBounds },
    IsNull(String),
    IsNotNull(String),
    Prefix { property: String, prefix: String },
    Like { property: String, pattern: String },
}

impl Expression {
    pub fn to_json(&self) -> Value {
        match self {
            Expression::And(parts) => {
                json!({ "and": parts.iter().map(Expression::to_json).collect::<Vec<_>>() })
            }
            Expression::Or(parts) => {
                json!({ "or": parts.iter().map(Expression::to_json).collect::<Vec<_>>() })
            }
            Expression::Eq { property, value } => json!({ "eq": { property.as_str(): value } }),
            Expression::Ne { property, value } => json!({ "ne": { property.as_str(): value } }),
            Expression::Range { property, bounds } => {
                json!({ "range": { property.as_str(): bounds.to_json() } })
            }
            Expression::IsNull(property) => json!({ "isnull": property }),
            Expression::IsNotNull(property) => json!({ "isnotnull": property }),
            Expression::Prefix { property, prefix } => {
                json!({ "prefix": { property.as_str(): prefix } })
            }
            Expression::Like { property, pattern } => {
                json!({ "like": { property.as_str(): pattern } })
            }
        }
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl BitAnd for Expression {
    type Output = Expression;

    fn bitand(self, rhs: Expression) -> Expression {
        match (self, rhs) {
            (Expression::And(mut left), Expression::And(right)) => {
                left.extend(right);
                Expression::And(left)
            }
            (Expression::And(mut left), right) => {
                left.push(right);
                Expression::And(left)
            }
            (left, Expression::And(right)) => {
                let mut parts = vec![left];
                parts.extend(right);
                Expression::And(parts)
            }
            (left, right) => Expression::And(vec![left, right]),
        }
    }
}

impl BitOr for Expression {
    type Output = Expression;

    fn bitor(self, rhs: Expression) -> Expression {
        match (self, rhs) {
            (Expression::Or(mut left), Expression::Or(right)) => {
                left.extend(right);
                Expression::Or(left)
            }
            (Expression::Or(mut left), right) => {
                left.push(right);
                Expression::Or(left)
            }
            (left, Expression::Or(right)) => {
                let mut parts = vec![left];
                parts.extend(right);
                Expression::Or(parts)
            }
            (left, right) => Expression::Or(vec![left, right]),
        }
    }
}

/// Builder for expressions on a single feature property.
///
/// ```
/// use vector_catalog::filter::Property;
///
/// let filter = Property::new("kind").eq("road") & Property::new("lanes").gte(2);
/// ```
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn eq(&self, value: impl Into<Value>) -> Expression {
        Expression::Eq {
            property: self.name.clone(),
            value: value.into(),
        }
    }

    pub fn ne(&self, value: impl Into<Value>) -> Expression {
        Expression::Ne {
            property: self.name.clone(),
            value: value.into(),
        }
    }

    pub fn gte(&self, value: impl Into<Value>) -> Expression {
        self.range(RangeBounds {
            gte: Some(value.into()),
            ..RangeBounds::default()
        })
    }

    pub fn gt(&self, value: impl Into<Value>) -> Expression {
        self.range(RangeBounds {
            gt: Some(value.into()),
            ..RangeBounds::default()
        })
    }

    pub fn lte(&self, value: impl Into<Value>) -> Expression {
        self.range(RangeBounds {
            lte: Some(value.into()),
            ..RangeBounds::default()
        })
    }

    pub fn lt(&self, value: impl Into<Value>) -> Expression {
        self.range(RangeBounds {
            lt: Some(value.into()),
            ..RangeBounds::default()
        })
    }

    pub fn range(&self, bounds: RangeBounds) -> Expression {
        Expression::Range {
            property: self.name.clone(),
            bounds,
        }
    }

    pub fn is_null(&self) -> Expression {
        Expression::IsNull(self.name.clone())
    }

    pub fn is_not_null(&self) -> Expression {
        Expression::IsNotNull(self.name.clone())
    }

    pub fn prefix(&self, prefix: impl Into<String>) -> Expression {
        Expression::Prefix {
            property: self.name.clone(),
            prefix: prefix.into(),
        }
    }

    pub fn like(&self, pattern: impl Into<String>) -> Expression {
        Expression::Like {
            property: self.name.clone(),
            pattern: pattern.into(),
        }
    }
}
