//! Field filters understood by every document store backend

use serde_json::Value;
use std::fmt;

use super::Document;

/// Comparison applied by a [`FilterCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Field equals the value
    Equal,
    /// String field begins with the value
    StartsWith,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::StartsWith => write!(f, "STARTS WITH"),
        }
    }
}

/// Value side of a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Boolean(bool),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&FilterValue> for Value {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::String(s) => Value::String(s.clone()),
            FilterValue::Boolean(b) => Value::Bool(*b),
        }
    }
}

/// A single `field <op> value` condition; a query's conditions are AND-ed
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value.into())
    }

    /// `field` begins with `prefix`
    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::StartsWith,
            FilterValue::String(prefix.into()),
        )
    }

    /// Evaluate the condition against a document held in memory
    ///
    /// A missing field never matches.
    pub fn matches(&self, document: &Document) -> bool {
        let Some(actual) = document.get(&self.field) else {
            return false;
        };

        match (self.operator, &self.value) {
            (FilterOperator::Equal, expected) => *actual == Value::from(expected),
            (FilterOperator::StartsWith, FilterValue::String(prefix)) => actual
                .as_str()
                .is_some_and(|s| s.starts_with(prefix.as_str())),
            (FilterOperator::StartsWith, _) => false,
        }
    }
}
