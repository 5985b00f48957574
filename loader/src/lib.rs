//! # Recordload - schema-driven CSV and JSON record loading
//!
//! Recordload reads flat records (CSV rows or JSON objects) into ordered,
//! typed entities and writes entities back out as JSON. Field names, wire
//! overrides, skipping, omit-if-empty and visibility come from an explicit
//! schema table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / JSON │────▶│   Decoder   │────▶│  Entities   │────▶│ Text / JSON │
//! │   (bytes)   │     │  (schema)   │     │  (ordered)  │     │  (schema)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recordload::{load_positional, FieldDescriptor, PositionalOptions, Schema};
//!
//! let schema = Schema::builder("song")
//!     .field(FieldDescriptor::string("title"))
//!     .field(FieldDescriptor::string("artist"))
//!     .field(FieldDescriptor::string("genre"))
//!     .build()?;
//! for song in load_positional("songs.csv", &schema, &PositionalOptions::default())? {
//!     println!("{}", song);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy (I/O, parse, conversion, schema)
//! - [`models`] - Scalars and entities
//! - [`schema`] - Field descriptors, tags and schema files
//! - [`parser`] - Positional (CSV) decoding
//! - [`keyed`] - Keyed (JSON) decoding and encoding
//! - [`render`] - Text output
//! - [`logs`] - Diagnostics

// Core modules
pub mod error;
pub mod models;
pub mod schema;

// Decoding and encoding
pub mod keyed;
pub mod parser;
pub mod render;

// Diagnostics
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CliError, LoadError, LoadResult, SchemaError, SchemaResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Entity, FieldAssignError, Scalar, ScalarKind};

// =============================================================================
// Re-exports - Schema
// =============================================================================

pub use schema::{validate_schema_file, FieldDescriptor, Schema, SchemaBuilder};

// =============================================================================
// Re-exports - Positional decoding
// =============================================================================

pub use parser::{
    decode_content,
    decode_positional,
    decode_positional_bytes,
    decode_positional_str,
    detect_delimiter,
    detect_encoding,
    load_positional,
    PositionalOptions,
};

// =============================================================================
// Re-exports - Keyed decoding and encoding
// =============================================================================

pub use keyed::{
    decode_keyed,
    decode_keyed_str,
    decode_keyed_value,
    encode_entity,
    encode_keyed,
    encode_keyed_string,
    load_keyed,
    save_keyed,
    write_keyed,
    KeyedOptions,
};

// =============================================================================
// Re-exports - Rendering
// =============================================================================

pub use render::{render_envelope, render_list, write_text};
