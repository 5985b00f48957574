//! Keyed (JSON) decoding and encoding.
//!
//! Each serialized schema field (exported and not skipped) is matched to a
//! wire key: its override name if present, otherwise its own name.
//! Matching is case-sensitive. Unknown keys are ignored and unmatched
//! fields keep their zero value.
//!
//! # Accepted documents
//!
//! ```text
//! [ {...}, {...} ]                          array of objects
//! { "message": "success", "people": [...] }  envelope with one array field
//! ```

use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::{Entity, Scalar, ScalarKind};
use crate::schema::{FieldDescriptor, Schema};

/// Options for keyed decoding.
#[derive(Debug, Clone, Default)]
pub struct KeyedOptions {
    /// Envelope key holding the record array. `None` picks the only array field.
    pub envelope: Option<String>,
}

impl KeyedOptions {
    pub fn with_envelope(key: impl Into<String>) -> Self {
        Self {
            envelope: Some(key.into()),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode keyed records from a reader.
pub fn decode_keyed<R: Read>(
    reader: R,
    schema: &Schema,
    options: &KeyedOptions,
) -> LoadResult<Vec<Entity>> {
    let document: Value = serde_json::from_reader(BufReader::new(reader)).map_err(read_error)?;
    decode_keyed_value(&document, schema, options)
}

/// Decode keyed records from a file.
pub fn load_keyed<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
    options: &KeyedOptions,
) -> LoadResult<Vec<Entity>> {
    let file = File::open(path.as_ref())?;
    decode_keyed(file, schema, options)
}

/// Decode keyed records from a JSON string.
pub fn decode_keyed_str(
    json: &str,
    schema: &Schema,
    options: &KeyedOptions,
) -> LoadResult<Vec<Entity>> {
    let document: Value = serde_json::from_str(json).map_err(read_error)?;
    decode_keyed_value(&document, schema, options)
}

/// Decode keyed records from a parsed JSON document.
pub fn decode_keyed_value(
    document: &Value,
    schema: &Schema,
    options: &KeyedOptions,
) -> LoadResult<Vec<Entity>> {
    record_array(document, options)?
        .iter()
        .enumerate()
        .map(|(idx, record)| decode_record(record, schema, idx + 1))
        .collect()
}

/// Reading: stream failures are I/O, anything else is malformed JSON and
/// reported by line.
fn read_error(err: serde_json::Error) -> LoadError {
    if err.is_io() {
        LoadError::Io(err.into())
    } else {
        LoadError::parse(err.line(), format!("malformed JSON: {}", err))
    }
}

fn write_error(err: serde_json::Error) -> LoadError {
    if err.is_io() {
        LoadError::Io(err.into())
    } else {
        LoadError::Json(err)
    }
}

/// Locate the array of records inside a document.
fn record_array<'a>(document: &'a Value, options: &KeyedOptions) -> LoadResult<&'a Vec<Value>> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(envelope) => match &options.envelope {
            Some(key) => match envelope.get(key) {
                Some(Value::Array(items)) => Ok(items),
                Some(_) => Err(LoadError::parse(0, format!("envelope field '{}' is not an array", key))),
                None => Err(LoadError::parse(0, format!("envelope has no field '{}'", key))),
            },
            None => {
                let mut arrays = envelope.iter().filter_map(|(key, value)| match value {
                    Value::Array(items) => Some((key, items)),
                    _ => None,
                });
                match (arrays.next(), arrays.next()) {
                    (Some((_, items)), None) => Ok(items),
                    (None, _) => Err(LoadError::parse(0, "envelope object has no array field")),
                    (Some((first, _)), Some((second, _))) => Err(LoadError::parse(
                        0,
                        format!(
                            "envelope has several array fields ('{}', '{}'); name one explicitly",
                            first, second
                        ),
                    )),
                }
            }
        },
        other => Err(LoadError::parse(
            0,
            format!("expected an array of objects or an envelope object, found {}", json_type(other)),
        )),
    }
}

fn decode_record(record: &Value, schema: &Schema, number: usize) -> LoadResult<Entity> {
    let object = record.as_object().ok_or_else(|| {
        LoadError::parse(number, format!("expected an object, found {}", json_type(record)))
    })?;

    let mut entity = Entity::zeroed(schema);
    for (i, field) in schema.serialized_fields() {
        if let Some(raw) = object.get(field.wire_name()) {
            entity.set_index(i, coerce(raw, field, number)?);
        }
    }

    Ok(entity)
}

/// Coerce a wire value to the field's declared kind. `null` is the zero value.
fn coerce(raw: &Value, field: &FieldDescriptor, number: usize) -> LoadResult<Scalar> {
    let value = match (field.kind, raw) {
        (kind, Value::Null) => Some(kind.zero()),
        (ScalarKind::String, Value::String(s)) => Some(Scalar::Str(s.clone())),
        (ScalarKind::Integer, Value::Number(n)) => n.as_i64().map(Scalar::Int),
        (ScalarKind::Float, Value::Number(n)) => n.as_f64().map(Scalar::Float),
        (ScalarKind::Bool, Value::Bool(b)) => Some(Scalar::Bool(*b)),
        _ => None,
    };

    value.ok_or_else(|| {
        LoadError::conversion(
            number,
            &field.name,
            raw.to_string(),
            format!("cannot convert {} to {}", json_type(raw), field.kind),
        )
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode one entity as a JSON object.
///
/// Skipped and non-exported fields never appear. `omit_empty` fields are
/// dropped when they hold the zero value. Keys follow declared order.
pub fn encode_entity(entity: &Entity, schema: &Schema, number: usize) -> LoadResult<Map<String, Value>> {
    check_shape(entity, schema, number)?;

    let mut object = Map::new();
    for (i, field) in schema.serialized_fields() {
        let Some(value) = entity.get_index(i) else {
            continue;
        };
        if field.omit_empty && value.is_zero() {
            continue;
        }
        object.insert(field.wire_name().to_string(), scalar_to_json(value, field, number)?);
    }

    Ok(object)
}

/// Encode entities as a JSON array.
pub fn encode_keyed(entities: &[Entity], schema: &Schema) -> LoadResult<Value> {
    let records = entities
        .iter()
        .enumerate()
        .map(|(idx, entity)| encode_entity(entity, schema, idx + 1).map(Value::Object))
        .collect::<LoadResult<Vec<_>>>()?;
    Ok(Value::Array(records))
}

/// Encode entities to a JSON string.
pub fn encode_keyed_string(entities: &[Entity], schema: &Schema, pretty: bool) -> LoadResult<String> {
    let document = encode_keyed(entities, schema)?;
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}

/// Encode entities and write them to a sink.
pub fn write_keyed<W: Write>(
    mut writer: W,
    entities: &[Entity],
    schema: &Schema,
    pretty: bool,
) -> LoadResult<()> {
    let document = encode_keyed(entities, schema)?;
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &document).map_err(write_error)?;
    } else {
        serde_json::to_writer(&mut writer, &document).map_err(write_error)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Encode entities into a file, replacing it.
pub fn save_keyed<P: AsRef<Path>>(
    path: P,
    entities: &[Entity],
    schema: &Schema,
    pretty: bool,
) -> LoadResult<()> {
    // Encode first so a conversion failure leaves the target untouched.
    let json = encode_keyed_string(entities, schema, pretty)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn check_shape(entity: &Entity, schema: &Schema, number: usize) -> LoadResult<()> {
    if entity.len() != schema.len() {
        return Err(LoadError::conversion(
            number,
            schema.name(),
            format!("{} fields", entity.len()),
            format!("entity does not match schema ({} fields declared)", schema.len()),
        ));
    }

    for ((name, value), field) in entity.fields().zip(schema.fields()) {
        if name != field.name {
            return Err(LoadError::conversion(
                number,
                &field.name,
                name,
                "entity field order does not match schema",
            ));
        }
        if value.kind() != field.kind {
            return Err(LoadError::conversion(
                number,
                &field.name,
                value.to_string(),
                format!("expected {}, entity holds {}", field.kind, value.kind()),
            ));
        }
    }

    Ok(())
}

fn scalar_to_json(value: &Scalar, field: &FieldDescriptor, number: usize) -> LoadResult<Value> {
    Ok(match value {
        Scalar::Str(s) => Value::String(s.clone()),
        Scalar::Int(i) => Value::Number((*i).into()),
        Scalar::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
            LoadError::conversion(number, &field.name, f.to_string(), "non-finite float cannot be encoded")
        })?,
        Scalar::Bool(b) => Value::Bool(*b),
    })
}
