//! Recordload CLI - Load CSV and JSON records through a schema table
//!
//! # Commands
//!
//! ```bash
//! recordload csv demos/songs.csv --schema demos/song.schema.json
//! recordload json demos/astros.json --schema demos/astro.schema.json --envelope people
//! recordload json demos/astros.json --schema demos/astro.schema.json --envelope people --label Crew
//! recordload json demos/countries.json --schema demos/country.schema.json --json --pretty
//! recordload schema demos/country.schema.json
//! ```

use clap::{Args, Parser, Subcommand};
use recordload::error::{CliError, CliResult};
use recordload::logs::{log_error, log_info, log_detail, log_success, log_warning, LogMode, LOGGER};
use recordload::{
    encode_keyed_string, load_keyed, load_positional, render_envelope, write_text, Entity,
    KeyedOptions, PositionalOptions, Schema,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "recordload")]
#[command(about = "Load CSV and JSON records into typed entities", long_about = None)]
struct Cli {
    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Diagnostics format (default: $RECORDLOAD_LOG or text)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode positional CSV rows
    Csv {
        /// Input CSV file
        input: PathBuf,

        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Cell delimiter, or "auto" to detect it
        #[arg(short, long, default_value = ",")]
        delimiter: String,

        /// Skip the first row
        #[arg(long)]
        header: bool,

        /// Trim whitespace around cells
        #[arg(long)]
        trim: bool,

        /// Input encoding (auto-detect if not specified)
        #[arg(short, long)]
        encoding: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Decode a JSON array (or envelope object) of records
    Json {
        /// Input JSON file
        input: PathBuf,

        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Envelope key holding the record array
        #[arg(long)]
        envelope: Option<String>,

        /// Name wrapping the records in text output (default: envelope key, capitalized)
        #[arg(long, requires = "envelope")]
        label: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Validate a schema file and print its field table
    Schema {
        /// Schema file
        file: PathBuf,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Emit a JSON array instead of text
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.quiet {
        LOGGER.set_mode(LogMode::Quiet);
    } else if let Some(mode) = cli.log_format {
        LOGGER.set_mode(mode);
    }

    let result = match cli.command {
        Commands::Csv {
            input,
            schema,
            delimiter,
            header,
            trim,
            encoding,
            output,
        } => cmd_csv(&input, &schema, &delimiter, header, trim, encoding, &output),

        Commands::Json {
            input,
            schema,
            envelope,
            label,
            output,
        } => cmd_json(&input, &schema, envelope, label, &output),

        Commands::Schema { file } => cmd_schema(&file),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_csv(
    input: &Path,
    schema_path: &Path,
    delimiter: &str,
    header: bool,
    trim: bool,
    encoding: Option<String>,
    output: &OutputArgs,
) -> CliResult<()> {
    let schema = load_schema(schema_path)?;
    let options = PositionalOptions {
        delimiter: parse_delimiter(delimiter)?,
        has_header: header,
        trim,
        encoding,
    };

    log_info(format!("📄 Reading CSV: {}", input.display()));
    log_detail(format!(
        "Delimiter: {}",
        options.delimiter.map(format_delimiter).unwrap_or_else(|| "auto".into())
    ));
    if let Some(ref enc) = options.encoding {
        log_detail(format!("Encoding: {}", enc));
    }

    let entities = load_positional(input, &schema, &options)?;
    report_count(entities.len());

    emit(&entities, &schema, None, output)
}

fn cmd_json(
    input: &Path,
    schema_path: &Path,
    envelope: Option<String>,
    label: Option<String>,
    output: &OutputArgs,
) -> CliResult<()> {
    let schema = load_schema(schema_path)?;

    log_info(format!("📄 Reading JSON: {}", input.display()));
    if let Some(ref key) = envelope {
        log_detail(format!("Envelope: {}", key));
    }

    let options = KeyedOptions { envelope };
    let entities = load_keyed(input, &schema, &options)?;
    report_count(entities.len());

    let label = label.or_else(|| options.envelope.as_deref().map(envelope_label));
    emit(&entities, &schema, label.as_deref(), output)
}

fn cmd_schema(path: &Path) -> CliResult<()> {
    let schema = load_schema(path)?;

    println!("{} ({} fields)", schema.name(), schema.len());
    for (i, field) in schema.fields().iter().enumerate() {
        let mut flags = Vec::new();
        if field.skip {
            flags.push("skip");
        }
        if field.omit_empty {
            flags.push("omitempty");
        }
        if !field.exported {
            flags.push("private");
        }
        println!(
            "  [{:2}] {:<16} {:<8} wire={:<16} {}",
            i,
            field.name,
            field.kind,
            if field.is_serialized() { field.wire_name() } else { "-" },
            flags.join(",")
        );
    }

    Ok(())
}

fn report_count(count: usize) {
    if count == 0 {
        log_warning("Input contains no records");
    } else {
        log_success(format!("Decoded {} records", count));
    }
}

fn load_schema(path: &Path) -> CliResult<Schema> {
    let schema = Schema::load(path)?;
    log_info(format!("📋 Schema '{}': {} fields", schema.name(), schema.len()));
    Ok(schema)
}

fn parse_delimiter(raw: &str) -> CliResult<Option<char>> {
    match raw {
        "auto" => Ok(None),
        "\\t" | "tab" => Ok(Some('\t')),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(Some(c)),
                _ => Err(CliError::InvalidArgument(format!(
                    "delimiter must be one ASCII character, \"tab\" or \"auto\", got '{}'",
                    raw
                ))),
            }
        }
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => format!("'{}'", c),
    }
}

/// Display name for an envelope key: `people` -> `People`.
fn envelope_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn emit(
    entities: &[Entity],
    schema: &Schema,
    label: Option<&str>,
    output: &OutputArgs,
) -> CliResult<()> {
    let mut rendered = Vec::new();
    if output.json {
        let json = encode_keyed_string(entities, schema, output.pretty)?;
        writeln!(rendered, "{}", json)?;
    } else if let Some(label) = label {
        writeln!(rendered, "{}", render_envelope(label, entities))?;
    } else {
        write_text(&mut rendered, entities)?;
    }

    match output.output {
        Some(ref path) => {
            fs::write(path, &rendered)?;
            log_success(format!("💾 Output written to: {}", path.display()));
        }
        None => {
            std::io::stdout().write_all(&rendered)?;
        }
    }

    Ok(())
}
