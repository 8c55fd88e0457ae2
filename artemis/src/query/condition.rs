use crate::common::{Document, Value};
use crate::errors::ArtemisResult;
use itertools::Itertools;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A predicate over the columns of a stored document.
///
/// Produced by the query parser from a method name, or built by hand with
/// [column]. Column names are store-side names; the parser has already
/// mapped entity fields through the entity metadata.
///
/// # Responsibilities
///
/// * **Comparison**: equality and ordering against a single value
/// * **Range and membership**: inclusive `Between` and `In`
/// * **Pattern matching**: SQL-style `Like` with `%` and `_` wildcards
/// * **Composition**: `And` / `Or` over nested conditions
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq { column: String, value: Value },
    NotEq { column: String, value: Value },
    Gt { column: String, value: Value },
    Gte { column: String, value: Value },
    Lt { column: String, value: Value },
    Lte { column: String, value: Value },
    Between { column: String, lower: Value, upper: Value },
    Like { column: String, pattern: String },
    In { column: String, values: Vec<Value> },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    /// Combines `self` and `other` with AND, flattening nested conjunctions.
    pub fn and(self, other: Condition) -> Condition {
        match self {
            Condition::And(mut conditions) => {
                conditions.push(other);
                Condition::And(conditions)
            }
            this => Condition::And(vec![this, other]),
        }
    }

    /// Combines `self` and `other` with OR, flattening nested disjunctions.
    pub fn or(self, other: Condition) -> Condition {
        match self {
            Condition::Or(mut conditions) => {
                conditions.push(other);
                Condition::Or(conditions)
            }
            this => Condition::Or(vec![this, other]),
        }
    }

    /// Evaluates the condition against `document`.
    ///
    /// A missing column reads as null. Values of different types never
    /// compare, so ordering conditions on them are false. Fails only when a
    /// `Like` pattern does not compile.
    pub fn matches(&self, document: &Document) -> ArtemisResult<bool> {
        let result = match self {
            Condition::Eq { column, value } => document.get(column).loose_eq(value),
            Condition::NotEq { column, value } => !document.get(column).loose_eq(value),
            Condition::Gt { column, value } => compare(document, column, value, |o| o.is_gt()),
            Condition::Gte { column, value } => compare(document, column, value, |o| o.is_ge()),
            Condition::Lt { column, value } => compare(document, column, value, |o| o.is_lt()),
            Condition::Lte { column, value } => compare(document, column, value, |o| o.is_le()),
            Condition::Between { column, lower, upper } => {
                compare(document, column, lower, |o| o.is_ge())
                    && compare(document, column, upper, |o| o.is_le())
            }
            Condition::Like { column, pattern } => match document.get(column).as_str() {
                Some(text) => like_regex(pattern)?.is_match(text),
                None => false,
            },
            Condition::In { column, values } => {
                let actual = document.get(column);
                values.iter().any(|v| actual.loose_eq(v))
            }
            Condition::And(conditions) => {
                for condition in conditions {
                    if !condition.matches(document)? {
                        return Ok(false);
                    }
                }
                true
            }
            Condition::Or(conditions) => {
                for condition in conditions {
                    if condition.matches(document)? {
                        return Ok(true);
                    }
                }
                false
            }
        };
        Ok(result)
    }
}

fn compare(
    document: &Document,
    column: &str,
    value: &Value,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    document
        .get(column)
        .loose_cmp(value)
        .is_some_and(accept)
}

/// Translates a `Like` pattern into an anchored regex.
fn like_regex(pattern: &str) -> ArtemisResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 2);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '%' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Ok(Regex::new(&expr)?)
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Eq { column, value } => write!(f, "{} = {}", column, value),
            Condition::NotEq { column, value } => write!(f, "{} != {}", column, value),
            Condition::Gt { column, value } => write!(f, "{} > {}", column, value),
            Condition::Gte { column, value } => write!(f, "{} >= {}", column, value),
            Condition::Lt { column, value } => write!(f, "{} < {}", column, value),
            Condition::Lte { column, value } => write!(f, "{} <= {}", column, value),
            Condition::Between { column, lower, upper } => {
                write!(f, "{} BETWEEN {} AND {}", column, lower, upper)
            }
            Condition::Like { column, pattern } => write!(f, "{} LIKE \"{}\"", column, pattern),
            Condition::In { column, values } => {
                write!(f, "{} IN [{}]", column, values.iter().join(", "))
            }
            Condition::And(conditions) => {
                write!(f, "({})", conditions.iter().join(" AND "))
            }
            Condition::Or(conditions) => {
                write!(f, "({})", conditions.iter().join(" OR "))
            }
        }
    }
}

/// Starts a condition on `column`.
///
/// ```rust
/// use artemis::query::column;
///
/// let adults = column("age").gte(18).and(column("name").like("A%"));
/// assert_eq!(adults.to_string(), "(age >= 18 AND name LIKE \"A%\")");
/// ```
pub fn column(column: &str) -> ColumnCondition {
    ColumnCondition {
        column: column.to_string(),
    }
}

/// Builder returned by [column].
pub struct ColumnCondition {
    column: String,
}

impl ColumnCondition {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Condition {
        Condition::Eq { column: self.column, value: value.into() }
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Condition {
        Condition::NotEq { column: self.column, value: value.into() }
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Condition {
        Condition::Gt { column: self.column, value: value.into() }
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Condition {
        Condition::Gte { column: self.column, value: value.into() }
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Condition {
        Condition::Lt { column: self.column, value: value.into() }
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Condition {
        Condition::Lte { column: self.column, value: value.into() }
    }

    /// Inclusive on both ends.
    pub fn between<T: Into<Value>>(self, lower: T, upper: T) -> Condition {
        Condition::Between {
            column: self.column,
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn like(self, pattern: &str) -> Condition {
        Condition::Like {
            column: self.column,
            pattern: pattern.to_string(),
        }
    }

    pub fn within<T: Into<Value>>(self, values: Vec<T>) -> Condition {
        Condition::In {
            column: self.column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}
