//! Typed rider field names and values

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of a single rider field, e.g. `performance_fee`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldName(pub String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// The declared kind of a rider field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Integer,
    Decimal,
    Text,
    Choice,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldKind::Bool => "bool",
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Text => "text",
            FieldKind::Choice => "choice",
        };
        write!(f, "{}", s)
    }
}

/// A typed rider field value.
///
/// Money-valued fields (fees, budgets) use `Decimal`, never floats.
/// `Choice` holds one selection out of an enumerated set declared by the
/// document schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Choice(String),
}

impl FieldValue {
    /// The kind this value belongs to
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Decimal(_) => FieldKind::Decimal,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Choice(_) => FieldKind::Choice,
        }
    }

    /// Whether this value matches a declared kind
    pub fn matches(&self, kind: FieldKind) -> bool {
        self.kind() == kind
    }

    /// Convenience accessor for boolean fields
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Choice(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_value_kinds() {
        assert_eq!(FieldValue::Bool(true).kind(), FieldKind::Bool);
        assert_eq!(FieldValue::Integer(90).kind(), FieldKind::Integer);
        assert_eq!(
            FieldValue::Decimal(Decimal::from_str("1250.00").unwrap()).kind(),
            FieldKind::Decimal
        );
        assert!(FieldValue::Text("two 16A circuits".into()).matches(FieldKind::Text));
        assert!(!FieldValue::Choice("three_phase".into()).matches(FieldKind::Bool));
    }

    #[test]
    fn test_serde_tagged_form() {
        let json = serde_json::to_value(FieldValue::Integer(45)).unwrap();
        assert_eq!(json["kind"], "integer");
        assert_eq!(json["value"], 45);

        let back: FieldValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, FieldValue::Integer(45));
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(FieldValue::Bool(false).as_bool(), Some(false));
        assert_eq!(FieldValue::Integer(1).as_bool(), None);
    }
}
