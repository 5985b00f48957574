//! Domain models for decoded records.
//!
//! - [`ScalarKind`] - Declared type of a field (string, integer, float, bool)
//! - [`Scalar`] - One field value
//! - [`Entity`] - One decoded record, fields in declared schema order

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::Schema;

// =============================================================================
// Scalar Kind
// =============================================================================

/// Declared scalar type of a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    #[serde(alias = "str")]
    String,
    #[serde(alias = "int")]
    Integer,
    Float,
    #[serde(alias = "boolean")]
    Bool,
}

impl ScalarKind {
    /// The zero value of this kind: `""`, `0`, `0.0` or `false`.
    pub fn zero(self) -> Scalar {
        match self {
            Self::String => Scalar::Str(String::new()),
            Self::Integer => Scalar::Int(0),
            Self::Float => Scalar::Float(0.0),
            Self::Bool => Scalar::Bool(false),
        }
    }

    /// Parse textual input (a CSV cell) into this kind.
    ///
    /// An empty cell yields the zero value.
    pub fn parse_text(self, text: &str) -> Result<Scalar, String> {
        if text.is_empty() {
            return Ok(self.zero());
        }
        match self {
            Self::String => Ok(Scalar::Str(text.to_string())),
            Self::Integer => text
                .trim()
                .parse::<i64>()
                .map(Scalar::Int)
                .map_err(|e| format!("expected an integer: {}", e)),
            Self::Float => text
                .trim()
                .parse::<f64>()
                .map(Scalar::Float)
                .map_err(|e| format!("expected a number: {}", e)),
            Self::Bool => match text.trim().to_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Scalar::Bool(true)),
                "false" | "f" | "0" => Ok(Scalar::Bool(false)),
                _ => Err("expected a boolean (true/false/1/0)".to_string()),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// =============================================================================
// Scalar
// =============================================================================

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Str(_) => ScalarKind::String,
            Self::Int(_) => ScalarKind::Integer,
            Self::Float(_) => ScalarKind::Float,
            Self::Bool(_) => ScalarKind::Bool,
        }
    }

    /// Whether this value equals its kind's zero value.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::Bool(b) => !*b,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

// =============================================================================
// Entity
// =============================================================================

/// Error returned by [`Entity::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAssignError {
    /// No field with that name.
    UnknownField(String),
    /// Value kind differs from the declared kind.
    KindMismatch {
        field: String,
        expected: ScalarKind,
        found: ScalarKind,
    },
}

impl fmt::Display for FieldAssignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(name) => write!(f, "unknown field '{}'", name),
            Self::KindMismatch {
                field,
                expected,
                found,
            } => write!(f, "field '{}' is {}, got {}", field, expected, found),
        }
    }
}

impl std::error::Error for FieldAssignError {}

/// One decoded record.
///
/// Fields keep the declared schema order. The set of fields and their kinds
/// is fixed at construction; only values change, through [`Entity::set`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    fields: Vec<(String, Scalar)>,
}

impl Entity {
    /// Create an entity with every schema field at its zero value.
    pub fn zeroed(schema: &Schema) -> Self {
        Self {
            fields: schema
                .fields()
                .iter()
                .map(|d| (d.name.clone(), d.kind.zero()))
                .collect(),
        }
    }

    /// Build an entity from `(name, value)` pairs in the given order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Value at declared position `index`.
    pub fn get_index(&self, index: usize) -> Option<&Scalar> {
        self.fields.get(index).map(|(_, v)| v)
    }

    /// Assign a field, keeping its declared kind.
    pub fn set(&mut self, name: &str, value: impl Into<Scalar>) -> Result<(), FieldAssignError> {
        let value = value.into();
        let slot = self
            .fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| FieldAssignError::UnknownField(name.to_string()))?;
        if slot.1.kind() != value.kind() {
            return Err(FieldAssignError::KindMismatch {
                field: name.to_string(),
                expected: slot.1.kind(),
                found: value.kind(),
            });
        }
        slot.1 = value;
        Ok(())
    }

    pub(crate) fn set_index(&mut self, index: usize, value: Scalar) {
        if let Some(slot) = self.fields.get_mut(index) {
            slot.1 = value;
        }
    }

    /// Fields as `(name, value)` pairs in declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    fn country_schema() -> Schema {
        Schema::builder("country")
            .field(FieldDescriptor::new("Name", ScalarKind::String))
            .field(FieldDescriptor::new("population", ScalarKind::Integer).private())
            .field(FieldDescriptor::new("Space", ScalarKind::Float))
            .field(FieldDescriptor::new("Landlocked", ScalarKind::Bool))
            .build()
            .unwrap()
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(ScalarKind::String.zero(), Scalar::Str(String::new()));
        assert_eq!(ScalarKind::Integer.zero(), Scalar::Int(0));
        assert_eq!(ScalarKind::Float.zero(), Scalar::Float(0.0));
        assert_eq!(ScalarKind::Bool.zero(), Scalar::Bool(false));
        assert!(ScalarKind::Float.zero().is_zero());
        assert!(!Scalar::Int(-1).is_zero());
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(ScalarKind::Integer.parse_text(" 42 "), Ok(Scalar::Int(42)));
        assert_eq!(ScalarKind::Float.parse_text("41.29"), Ok(Scalar::Float(41.29)));
        assert_eq!(ScalarKind::Bool.parse_text("TRUE"), Ok(Scalar::Bool(true)));
        assert_eq!(ScalarKind::Integer.parse_text(""), Ok(Scalar::Int(0)));
        assert_eq!(
            ScalarKind::String.parse_text(" padded "),
            Ok(Scalar::Str(" padded ".into()))
        );
        assert!(ScalarKind::Integer.parse_text("abc").is_err());
        assert!(ScalarKind::Bool.parse_text("maybe").is_err());
    }

    #[test]
    fn test_zeroed_entity_follows_schema_order() {
        let entity = Entity::zeroed(&country_schema());
        let names: Vec<&str> = entity.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Name", "population", "Space", "Landlocked"]);
        assert!(entity.fields().all(|(_, v)| v.is_zero()));
    }

    #[test]
    fn test_set_checks_name_and_kind() {
        let mut entity = Entity::zeroed(&country_schema());
        entity.set("Name", "Latvia").unwrap();
        entity.set("population", 1_902_000i64).unwrap();
        assert_eq!(entity.get("Name"), Some(&Scalar::Str("Latvia".into())));
        assert_eq!(entity.get("population").and_then(Scalar::as_i64), Some(1_902_000));

        assert_eq!(
            entity.set("Capital", "Riga"),
            Err(FieldAssignError::UnknownField("Capital".into()))
        );
        assert!(matches!(
            entity.set("Space", 12i64),
            Err(FieldAssignError::KindMismatch { .. })
        ));
    }
}
