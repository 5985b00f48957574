use std::fs;
use std::path::PathBuf;

use recordload::{
    load_keyed, load_positional, render_envelope, save_keyed, Entity, FieldDescriptor,
    KeyedOptions, LoadError, PositionalOptions, Scalar, Schema,
};
use tempfile::tempdir;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("demos")
        .join(name)
}

#[test]
fn test_songs_demo() {
    let schema = Schema::load(demo("song.schema.json")).unwrap();
    let songs = load_positional(demo("songs.csv"), &schema, &PositionalOptions::default()).unwrap();

    assert_eq!(songs.len(), 10);
    assert_eq!(
        songs[0].to_string(),
        "{title:Señorita artist:Shawn Mendes genre:canadian pop}"
    );
    assert_eq!(songs[2].get("title"), Some(&Scalar::from("boyfriend (with Social House)")));
    assert_eq!(songs[9].get("artist"), Some(&Scalar::from("Billie Eilish")));
}

#[test]
fn test_astros_demo_envelope() {
    let schema = Schema::load(demo("astro.schema.json")).unwrap();
    let people = load_keyed(demo("astros.json"), &schema, &KeyedOptions::default()).unwrap();

    assert_eq!(people.len(), 7);
    assert!(people.iter().all(|p| p.get("Craft") == Some(&Scalar::from("ISS"))));

    let explicit = load_keyed(demo("astros.json"), &schema, &KeyedOptions::with_envelope("people")).unwrap();
    assert_eq!(explicit, people);

    let rendered = render_envelope("People", &people[..1]);
    assert_eq!(rendered, "{People:[{Craft:ISS Name:Oleg Kononenko}]}");
}

#[test]
fn test_countries_demo_round_trip() {
    let schema = Schema::load(demo("country.schema.json")).unwrap();
    let countries = load_keyed(demo("countries.json"), &schema, &KeyedOptions::default()).unwrap();

    assert_eq!(countries.len(), 3);
    assert_eq!(countries[0].get("population"), Some(&Scalar::Int(0)));
    assert_eq!(countries[2].get("Space"), Some(&Scalar::Float(2.02)));

    let dir = tempdir().unwrap();
    let out = dir.path().join("countries.out.json");
    save_keyed(&out, &countries, &schema, false).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with(r#"[{"Name":"Latvia","Capital":"Riga","Space":0.0}"#));
    assert!(written.contains(r#"{"Name":"Monaco","Space":2.02}"#));

    let reloaded = load_keyed(&out, &schema, &KeyedOptions::default()).unwrap();
    assert_eq!(reloaded, countries);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let schema = Schema::builder("one")
        .field(FieldDescriptor::string("a"))
        .build()
        .unwrap();

    let csv = load_positional(dir.path().join("absent.csv"), &schema, &PositionalOptions::default());
    assert!(matches!(csv, Err(LoadError::Io(_))));

    let json = load_keyed(dir.path().join("absent.json"), &schema, &KeyedOptions::default());
    assert!(matches!(json, Err(LoadError::Io(_))));
}

#[test]
fn test_failure_returns_no_partial_results() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("numbers.csv");
    fs::write(&path, "1,one\n2,two\nthree,3\n4,four\n").unwrap();

    let schema = Schema::builder("numbered")
        .field(FieldDescriptor::integer("n"))
        .field(FieldDescriptor::string("word"))
        .build()
        .unwrap();

    let err = load_positional(&path, &schema, &PositionalOptions::default()).unwrap_err();
    match err {
        LoadError::Conversion { record, field, value, .. } => {
            assert_eq!(record, 3);
            assert_eq!(field, "n");
            assert_eq!(value, "\"three\"");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_latin1_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("latin1.csv");
    // "Société;Paris" in ISO-8859-1 with a semicolon delimiter
    fs::write(&path, [0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9, b';', b'P', b'a', b'r', b'i', b's']).unwrap();

    let schema = Schema::builder("org")
        .field(FieldDescriptor::string("name"))
        .field(FieldDescriptor::string("city"))
        .build()
        .unwrap();
    let options = PositionalOptions {
        delimiter: Some(';'),
        encoding: Some("iso-8859-1".into()),
        ..Default::default()
    };

    let rows = load_positional(&path, &schema, &options).unwrap();
    assert_eq!(rows[0].get("name"), Some(&Scalar::from("Société")));
    assert_eq!(rows[0].get("city"), Some(&Scalar::from("Paris")));
}

#[test]
fn test_row_count_and_padding() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ragged.csv");
    fs::write(&path, "a,1,2.5,true\nb\nc,3,,false,extra\n").unwrap();

    let schema = Schema::builder("ragged")
        .field(FieldDescriptor::string("s"))
        .field(FieldDescriptor::integer("i"))
        .field(FieldDescriptor::float("f"))
        .field(FieldDescriptor::boolean("b"))
        .build()
        .unwrap();

    let rows = load_positional(&path, &schema, &PositionalOptions::default()).unwrap();
    assert_eq!(rows.len(), 3);

    let expected_b = Entity::from_pairs([
        ("s", Scalar::from("b")),
        ("i", Scalar::Int(0)),
        ("f", Scalar::Float(0.0)),
        ("b", Scalar::Bool(false)),
    ]);
    assert_eq!(rows[1], expected_b);
    assert_eq!(rows[2].get("i"), Some(&Scalar::Int(3)));
    assert_eq!(rows[2].get("f"), Some(&Scalar::Float(0.0)));
}

#[test]
fn test_malformed_inputs_are_parse_errors() {
    let dir = tempdir().unwrap();
    let schema = Schema::load(demo("song.schema.json")).unwrap();

    let csv = dir.path().join("open_quote.csv");
    fs::write(&csv, "Memories,Maroon 5,pop\n\"Senorita,Shawn Mendes,canadian pop\nChina,Anuel AA,reggaeton flow\n").unwrap();
    let err = load_positional(&csv, &schema, &PositionalOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { record: 2, .. }), "got {err}");

    let json = dir.path().join("truncated.json");
    fs::write(&json, "[\n  {\"title\": \"Memories\"},\n  {\"title\": ").unwrap();
    let err = load_keyed(&json, &schema, &KeyedOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { record: 3, .. }), "got {err}");
}
