//! Deterministic reconstruction of a spell back into record text.

use crate::record::Spell;

impl Spell {
    /// Reconstruct the record lines: header, type marker, category tag,
    /// optional inheritance directive, then every attribute sorted by key.
    ///
    /// The output is byte-stable: serializing, reparsing, and reserializing
    /// a spell produces identical text, which keeps generated files
    /// diff-friendly across runs.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("new entry \"{}\"", self.name),
            "type \"SpellData\"".to_string(),
            format!("data \"SpellType\" \"{}\"", self.spell_type),
        ];
        if let Some(using) = &self.using {
            lines.push(format!("using \"{using}\""));
        }
        for (key, value) in self.attributes() {
            lines.push(format!("data \"{key}\" \"{value}\""));
        }
        lines
    }

    /// The full record block as text.
    pub fn to_text(&self) -> String {
        self.to_lines().join("\n")
    }
}

impl std::fmt::Display for Spell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
