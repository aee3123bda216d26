//! Value types shared by the store layer and the split core

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable key addressing one record within a dataset
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// A distinct value of the grouping attribute
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassValue(String);

impl ClassValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ClassValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_identifiers_use_decimal_text() {
        assert_eq!(Identifier::from(42u64).as_str(), "42");
        assert_eq!(Identifier::from(42u64), Identifier::from("42"));
    }

    #[test]
    fn test_serializes_transparently() {
        let json = serde_json::to_string(&ClassValue::new("forest")).unwrap();
        assert_eq!(json, "\"forest\"");
    }
}
