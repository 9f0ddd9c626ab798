//! Filter expressions: a recursive tree of conditions joined by AND/OR.
//!
//! Expressions render two ways: as the application's query text
//! (`"Title" ~ "audit" AND "Status" = "Active"`) through [`fmt::Display`], and
//! as the JSON tree the query service consumes (`{left, op: {name}, right}`)
//! through [`FilterExpression::to_json`] / `Serialize`.

use grcmap_types::TypeName;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::fmt;

/// Field the snapshot rewrite constrains.
pub const CHILD_TYPE_FIELD: &str = "child_type";

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Contains,
    NotContains,
    Lt,
    Gt,
    Le,
    Ge,
    In,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Contains => "~",
            Self::NotContains => "!~",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean operator of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal on the right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    Text(String),
    Number(i64),
    Bool(bool),
    List(Vec<String>),
}

impl FilterValue {
    fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => json!(n),
            Self::Bool(b) => Value::Bool(*b),
            Self::List(items) => json!(items),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&TypeName> for FilterValue {
    fn from(name: &TypeName) -> Self {
        Self::Text(name.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write_quoted(f, s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, item)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

/// A single `field op value` test.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub field: String,
    pub op: ComparisonOp,
    pub value: FilterValue,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, &self.field)?;
        write!(f, " {} {}", self.op, self.value)
    }
}

/// A filter tree. `Empty` matches everything and is the identity of [`join`].
///
/// [`join`]: FilterExpression::join
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FilterExpression {
    #[default]
    Empty,
    Condition(Condition),
    Binary {
        left: Box<FilterExpression>,
        op: LogicalOp,
        right: Box<FilterExpression>,
    },
}

impl FilterExpression {
    pub fn condition(field: impl Into<String>, op: ComparisonOp, value: impl Into<FilterValue>) -> Self {
        Self::Condition(Condition {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(field, ComparisonOp::Eq, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::condition(field, ComparisonOp::Contains, value)
    }

    pub fn one_of(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::condition(field, ComparisonOp::In, FilterValue::List(values))
    }

    /// Builds a binary node without simplification.
    pub fn binary(left: Self, op: LogicalOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// ANDs two expressions; an empty side yields the other unchanged.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        self.combine(LogicalOp::And, other)
    }

    /// ORs two expressions; an empty side yields the other unchanged.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.combine(LogicalOp::Or, other)
    }

    fn combine(self, op: LogicalOp, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, e) | (e, Self::Empty) => e,
            (l, r) => Self::binary(l, op, r),
        }
    }

    /// ANDs a sequence of expressions left to right.
    pub fn join_all(parts: impl IntoIterator<Item = Self>) -> Self {
        parts.into_iter().fold(Self::Empty, Self::join)
    }

    /// Restricts the expression to snapshots of `child_type`:
    /// `(child_type = X) AND (self)`.
    #[must_use]
    pub fn rewrite_for_snapshot(self, child_type: &TypeName) -> Self {
        Self::eq(CHILD_TYPE_FIELD, child_type).join(self)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Leaf conditions, left to right.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Self::Empty => {}
            Self::Condition(c) => out.push(c),
            Self::Binary { left, right, .. } => {
                left.collect_conditions(out);
                right.collect_conditions(out);
            }
        }
    }

    /// JSON tree shape consumed by the query service.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => json!({}),
            Self::Condition(c) => json!({
                "left": c.field,
                "op": { "name": c.op.as_str() },
                "right": c.value.to_json(),
            }),
            Self::Binary { left, op, right } => json!({
                "left": left.to_json(),
                "op": { "name": op.as_str() },
                "right": right.to_json(),
            }),
        }
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Condition(c) => write!(f, "{c}"),
            Self::Binary { left, op, right } => {
                write_operand(f, left)?;
                write!(f, " {op} ")?;
                write_operand(f, right)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &FilterExpression) -> fmt::Result {
    match expr {
        FilterExpression::Binary { .. } => write!(f, "({expr})"),
        _ => write!(f, "{expr}"),
    }
}
