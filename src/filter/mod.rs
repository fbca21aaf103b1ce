pub mod expression;
pub mod parse;

pub use expression::{Expression, Property, RangeBounds};
pub use parse::{parse_expression, FilterParseError};
