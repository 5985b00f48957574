//! Positional (CSV) decoding with encoding and delimiter handling.
//!
//! Row position *i* maps to the *i*-th declared schema field. Short rows
//! leave trailing fields at their zero value, extra cells are ignored, and
//! no header row is assumed unless asked for.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::Entity;
use crate::schema::Schema;

/// Options for positional decoding.
#[derive(Debug, Clone)]
pub struct PositionalOptions {
    /// Cell delimiter. `None` detects it from the first line.
    pub delimiter: Option<char>,
    /// Discard the first row.
    pub has_header: bool,
    /// Trim whitespace around every cell.
    pub trim: bool,
    /// Input encoding label. `None` detects it.
    pub encoding: Option<String>,
}

impl Default for PositionalOptions {
    fn default() -> Self {
        Self {
            delimiter: Some(','),
            has_header: false,
            trim: false,
            encoding: None,
        }
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 wins outright. Otherwise chardet's guess is resolved through
/// encoding_rs labels, falling back to windows-1252.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let (guess, _, _) = chardet::detect(bytes);
    encoding_rs::Encoding::for_label(guess.as_bytes())
        .filter(|codec| *codec != encoding_rs::UTF_8)
        .unwrap_or(encoding_rs::WINDOWS_1252)
        .name()
        .to_lowercase()
}

/// Decode bytes to a string using an encoding label.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| LoadError::Encoding(format!("input is not valid UTF-8: {}", e)))?;
            Ok(text.trim_start_matches('\u{feff}').to_string())
        }
        label => {
            let codec = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| LoadError::Encoding(format!("unknown encoding '{}'", encoding)))?;
            let (text, _, had_errors) = codec.decode(bytes);
            if had_errors {
                return Err(LoadError::Encoding(format!(
                    "input contains bytes invalid in {}",
                    codec.name()
                )));
            }
            Ok(text.into_owned())
        }
    }
}

const DELIMITER_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Pick the candidate delimiter seen most often in the first line.
///
/// Ties go to the earlier candidate; `,` when none appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    DELIMITER_CANDIDATES
        .iter()
        .map(|&candidate| (candidate, first_line.matches(candidate).count()))
        .fold((',', 0), |best, current| if current.1 > best.1 { current } else { best })
        .0
}

/// Decode positional rows from a reader.
///
/// The whole stream is read before decoding starts; any failure discards
/// every entity decoded so far.
pub fn decode_positional<R: Read>(
    mut reader: R,
    schema: &Schema,
    options: &PositionalOptions,
) -> LoadResult<Vec<Entity>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_positional_bytes(&bytes, schema, options)
}

/// Decode positional rows from a file.
pub fn load_positional<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
    options: &PositionalOptions,
) -> LoadResult<Vec<Entity>> {
    let file = File::open(path.as_ref())?;
    decode_positional(file, schema, options)
}

/// Decode positional rows from raw bytes.
pub fn decode_positional_bytes(
    bytes: &[u8],
    schema: &Schema,
    options: &PositionalOptions,
) -> LoadResult<Vec<Entity>> {
    let encoding = options
        .encoding
        .clone()
        .unwrap_or_else(|| detect_encoding(bytes));
    let content = decode_content(bytes, &encoding)?;
    decode_positional_str(&content, schema, options)
}

/// Decode positional rows from already-decoded text.
pub fn decode_positional_str(
    content: &str,
    schema: &Schema,
    options: &PositionalOptions,
) -> LoadResult<Vec<Entity>> {
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| detect_delimiter(content));
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            LoadError::parse(0, format!("delimiter '{}' is not a single ASCII character", delimiter))
        })?;

    check_quoting(content, delimiter)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(options.has_header)
        .flexible(true)
        .delimiter(delimiter)
        .trim(if options.trim { Trim::All } else { Trim::None })
        .from_reader(content.as_bytes());

    let mut entities = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let number = record
            .position()
            .map(|p| p.record() as usize + 1)
            .unwrap_or(idx + 1);
        entities.push(row_to_entity(&record, schema, number)?);
    }

    Ok(entities)
}

/// Reject quoting the `csv` reader would otherwise accept silently.
///
/// A quote may only open a field, a quoted field must be closed, and only a
/// delimiter or a line end may follow the closing quote. Record numbers
/// count non-empty physical records, as the reader does.
fn check_quoting(content: &str, delimiter: u8) -> LoadResult<()> {
    let bytes = content.as_bytes();
    let mut record = 1;
    let mut record_has_data = false;
    let mut field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];

        if field_start && byte == b'"' {
            let opened_at = record;
            i += 1;
            loop {
                match bytes.get(i) {
                    None => return Err(LoadError::parse(opened_at, "quoted field is never closed")),
                    Some(b'"') if bytes.get(i + 1) == Some(&b'"') => i += 2,
                    Some(b'"') => {
                        i += 1;
                        break;
                    }
                    Some(_) => i += 1,
                }
            }
            match bytes.get(i) {
                None | Some(b'\n') | Some(b'\r') => {}
                Some(&next) if next == delimiter => {}
                Some(_) => {
                    return Err(LoadError::parse(record, "unexpected text after a closing quote"));
                }
            }
            record_has_data = true;
            field_start = false;
            continue;
        }

        match byte {
            b'\n' | b'\r' => {
                if record_has_data {
                    record += 1;
                }
                record_has_data = false;
                field_start = true;
            }
            b if b == delimiter => {
                record_has_data = true;
                field_start = true;
            }
            b'"' => return Err(LoadError::parse(record, "bare quote inside an unquoted field")),
            _ => {
                record_has_data = true;
                field_start = false;
            }
        }
        i += 1;
    }

    Ok(())
}

fn row_to_entity(record: &StringRecord, schema: &Schema, number: usize) -> LoadResult<Entity> {
    let mut entity = Entity::zeroed(schema);

    for (i, field) in schema.fields().iter().enumerate() {
        let Some(cell) = record.get(i) else {
            break;
        };
        let value = field
            .kind
            .parse_text(cell)
            .map_err(|message| LoadError::conversion(number, &field.name, format!("{:?}", cell), message))?;
        entity.set_index(i, value);
    }

    Ok(entity)
}
