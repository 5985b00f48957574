//! Schema tables driving decode and encode behavior.
//!
//! A [`Schema`] is an ordered list of [`FieldDescriptor`]s. Position in the
//! list is the column index for positional input; the wire name (override
//! or field name) is the key for keyed input and output.
//!
//! # Schema files
//!
//! ```json
//! {
//!   "name": "country",
//!   "fields": [
//!     { "name": "Name", "type": "string" },
//!     { "name": "Capital", "type": "string", "tag": "capital,omitempty" },
//!     { "name": "population", "type": "integer", "exported": false },
//!     { "name": "Space", "type": "float", "skip": true }
//!   ]
//! }
//! ```
//!
//! Files are checked against the embedded `schemas/record-schema.json`
//! (JSON Schema draft 7) before deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};
use crate::models::ScalarKind;

// =============================================================================
// Field Descriptor
// =============================================================================

/// Metadata for one declared field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDescriptor {
    /// In-memory field name.
    pub name: String,

    /// Declared scalar kind.
    #[serde(rename = "type")]
    pub kind: ScalarKind,

    /// Override name used on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,

    /// Never populated from keyed input, never emitted.
    #[serde(default)]
    pub skip: bool,

    /// Omitted on output when holding the zero value.
    #[serde(default)]
    pub omit_empty: bool,

    /// Non-exported fields are invisible on the keyed wire.
    #[serde(default = "default_exported")]
    pub exported: bool,
}

fn default_exported() -> bool {
    true
}

impl FieldDescriptor {
    /// Exported field with no override and no flags.
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            rename: None,
            skip: false,
            omit_empty: false,
            exported: true,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ScalarKind::Bool)
    }

    /// Set the wire override name.
    pub fn rename(mut self, wire: impl Into<String>) -> Self {
        self.rename = Some(wire.into());
        self
    }

    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Mark the field as not exported.
    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Apply a compact tag such as `"wire,omitempty"`, `",omitempty"` or `"-"`.
    ///
    /// `-` alone means skip; an empty name part keeps the field's own name.
    /// `"-,"` renames the field to a literal `-`.
    pub fn with_tag(mut self, tag: &str) -> SchemaResult<Self> {
        if tag == "-" {
            self.skip = true;
            return Ok(self);
        }

        let mut parts = tag.split(',');
        let wire = parts.next().unwrap_or("").trim();
        if !wire.is_empty() {
            self.rename = Some(wire.to_string());
        }

        for option in parts.map(str::trim).filter(|o| !o.is_empty()) {
            match option {
                "omitempty" => self.omit_empty = true,
                other => {
                    return Err(SchemaError::InvalidTag {
                        field: self.name.clone(),
                        tag: tag.to_string(),
                        message: format!("unknown option '{}'", other),
                    })
                }
            }
        }

        Ok(self)
    }

    /// Key used on the keyed wire: the override name, else the field name.
    pub fn wire_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }

    /// Whether this field appears on the keyed wire at all.
    pub fn is_serialized(&self) -> bool {
        self.exported && !self.skip
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Ordered, validated list of field descriptors.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Build a schema, checking names and wire names.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> SchemaResult<Self> {
        let schema = Self {
            name: name.into(),
            fields,
        };
        schema.check()?;
        Ok(schema)
    }

    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Fields visible on the keyed wire, with their declared positions.
    pub fn serialized_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_serialized())
    }

    fn check(&self) -> SchemaResult<()> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty(self.name.clone()));
        }

        let mut names: HashMap<&str, usize> = HashMap::new();
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName(i));
            }
            if names.insert(&field.name, i).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        let mut wires: HashMap<&str, &str> = HashMap::new();
        for (_, field) in self.serialized_fields() {
            if let Some(first) = wires.insert(field.wire_name(), &field.name) {
                return Err(SchemaError::DuplicateWireName {
                    wire: field.wire_name().to_string(),
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Parse a schema file from a JSON string.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse a schema file from a JSON value.
    pub fn from_value(value: &Value) -> SchemaResult<Self> {
        validate_schema_file(value).map_err(SchemaError::Invalid)?;
        let file: SchemaFile = serde_json::from_value(value.clone())?;
        file.into_schema()
    }

    /// Load a schema file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> SchemaResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize back to the schema file format.
    pub fn to_json(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Incremental [`Schema`] construction.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        Schema::new(self.name, self.fields)
    }
}

// =============================================================================
// Schema Files
// =============================================================================

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default = "default_schema_name")]
    name: String,
    fields: Vec<FieldEntry>,
}

fn default_schema_name() -> String {
    "record".to_string()
}

#[derive(Debug, Deserialize)]
struct FieldEntry {
    #[serde(flatten)]
    descriptor: FieldDescriptor,
    #[serde(default)]
    tag: Option<String>,
}

impl SchemaFile {
    fn into_schema(self) -> SchemaResult<Schema> {
        let fields = self
            .fields
            .into_iter()
            .map(|entry| match entry.tag {
                Some(tag) => entry.descriptor.with_tag(&tag),
                None => Ok(entry.descriptor),
            })
            .collect::<SchemaResult<Vec<_>>>()?;
        Schema::new(self.name, fields)
    }
}

/// Check a schema file against the embedded JSON Schema.
pub fn validate_schema_file(data: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/record-schema.json"))
        .map_err(|e| vec![format!("embedded schema is invalid: {}", e)])?;
    let validator =
        jsonschema::draft7::new(&schema).map_err(|e| vec![format!("embedded schema is invalid: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_variants() {
        let skipped = FieldDescriptor::string("Secret").with_tag("-").unwrap();
        assert!(skipped.skip);
        assert_eq!(skipped.rename, None);

        let dash = FieldDescriptor::string("Dash").with_tag("-,").unwrap();
        assert!(!dash.skip);
        assert_eq!(dash.wire_name(), "-");

        let own_name = FieldDescriptor::string("Capital").with_tag(",omitempty").unwrap();
        assert_eq!(own_name.wire_name(), "Capital");
        assert!(own_name.omit_empty);

        let renamed = FieldDescriptor::string("Craft").with_tag("craft").unwrap();
        assert_eq!(renamed.wire_name(), "craft");
        assert!(!renamed.omit_empty);

        let err = FieldDescriptor::string("Name").with_tag("name,inline").unwrap_err();
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Schema::builder("dup")
            .field(FieldDescriptor::string("Name"))
            .field(FieldDescriptor::integer("Name"))
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateField(_))));
    }

    #[test]
    fn test_duplicate_wire_names_rejected_only_when_serialized() {
        let clash = Schema::builder("clash")
            .field(FieldDescriptor::string("Name"))
            .field(FieldDescriptor::string("Title").rename("Name"))
            .build();
        assert!(matches!(clash, Err(SchemaError::DuplicateWireName { .. })));

        let hidden = Schema::builder("hidden")
            .field(FieldDescriptor::string("Name"))
            .field(FieldDescriptor::string("Title").rename("Name").skip())
            .build();
        assert!(hidden.is_ok());
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(matches!(Schema::new("none", vec![]), Err(SchemaError::Empty(_))));
    }

    #[test]
    fn test_from_json() {
        let schema = Schema::from_value(&json!({
            "name": "country",
            "fields": [
                { "name": "Name", "type": "string" },
                { "name": "Capital", "type": "string", "tag": "capital,omitempty" },
                { "name": "population", "type": "integer", "exported": false },
                { "name": "Space", "type": "float", "skip": true }
            ]
        }))
        .unwrap();

        assert_eq!(schema.name(), "country");
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.field("Capital").unwrap().wire_name(), "capital");
        assert!(schema.field("Capital").unwrap().omit_empty);
        assert!(!schema.field("population").unwrap().exported);
        let serialized: Vec<usize> = schema.serialized_fields().map(|(i, _)| i).collect();
        assert_eq!(serialized, vec![0, 1]);
    }

    #[test]
    fn test_schema_file_structural_errors() {
        let result = Schema::from_value(&json!({
            "fields": [ { "name": "Name", "type": "text" } ]
        }));
        assert!(matches!(result, Err(SchemaError::Invalid(_))));

        let missing_fields = validate_schema_file(&json!({ "name": "x" }));
        assert!(missing_fields.is_err());
    }

    #[test]
    fn test_to_json_reloads() {
        let schema = Schema::builder("astro")
            .field(FieldDescriptor::string("Craft").rename("craft"))
            .field(FieldDescriptor::string("Name").rename("name"))
            .build()
            .unwrap();
        let json = schema.to_json().unwrap();
        assert_eq!(Schema::from_json(&json).unwrap(), schema);
    }
}
