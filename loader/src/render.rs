//! Textual rendering of entities.
//!
//! ```text
//! {title:China artist:Anuel AA genre:reggaeton flow}
//! {People:[{Craft:ISS Name:Oleg Kononenko} {Craft:ISS Name:Nikolai Chub}]}
//! ```

use std::fmt;
use std::io::Write;

use crate::models::Entity;

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", name, value)?;
        }
        f.write_str("}")
    }
}

/// Render a sequence as `[{..} {..}]`.
pub fn render_list(entities: &[Entity]) -> String {
    let items: Vec<String> = entities.iter().map(Entity::to_string).collect();
    format!("[{}]", items.join(" "))
}

/// Render a sequence wrapped under an envelope key: `{key:[{..} {..}]}`.
pub fn render_envelope(key: &str, entities: &[Entity]) -> String {
    format!("{{{}:{}}}", key, render_list(entities))
}

/// Write one entity per line.
pub fn write_text<W: Write>(mut writer: W, entities: &[Entity]) -> std::io::Result<()> {
    for entity in entities {
        writeln!(writer, "{}", entity)?;
    }
    writer.flush()
}
