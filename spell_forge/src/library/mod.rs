//! Spell library: loading, linking, querying, and writing spell corpora.
//!
//! [`SpellLibrary`] is the facade the binary talks to. It loads every
//! record file under a path into a [`SpellGraph`], resolves relationships,
//! answers filtered queries, and drives the generation pipeline through to
//! per-group output files gated by an allow-list.

mod filter;
mod graph;

pub use filter::*;
pub use graph::*;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use spell_data::Spell;

use crate::error::Result;
use crate::generator::{GeneratorOptions, GeneratorRun};

/// File extension of spell record files.
const RECORD_EXTENSION: &str = "txt";

/// What an [`SpellLibrary::extend`] run produced.
#[derive(Debug, Default)]
pub struct ExtendReport {
    /// Output files written, one per enabled group.
    pub written: Vec<PathBuf>,
    /// Groups skipped because the allow-list does not name them.
    pub skipped: Vec<String>,
}

/// A loaded, linked corpus of spells.
#[derive(Debug, Default)]
pub struct SpellLibrary {
    graph: SpellGraph,
}

impl SpellLibrary {
    /// Load every record file under `path` (a single file or a directory
    /// walked recursively) and link the resulting graph.
    ///
    /// Files are read in sorted path order so repeated definitions resolve
    /// deterministically: the last one wins.
    pub fn load(path: &Path) -> Result<Self> {
        let mut files = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                let entry_path = entry.path();
                if entry_path.is_file()
                    && entry_path.extension().is_some_and(|e| e == RECORD_EXTENSION)
                {
                    files.push(entry_path.to_path_buf());
                }
            }
            files.sort();
        } else {
            files.push(path.to_path_buf());
        }

        let mut graph = SpellGraph::new();
        for file in files {
            log::debug!("loading {}", file.display());
            let text = fs::read_to_string(&file)?;
            insert_blocks(&mut graph, &text)?;
        }
        graph.link()?;
        Ok(Self { graph })
    }

    /// Build a library from in-memory record text.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut graph = SpellGraph::new();
        insert_blocks(&mut graph, text)?;
        graph.link()?;
        Ok(Self { graph })
    }

    /// The underlying relationship graph.
    pub fn graph(&self) -> &SpellGraph {
        &self.graph
    }

    /// Spells matching the filter, in name order.
    pub fn get_spells(&self, filter: &SpellFilter) -> Vec<&Spell> {
        filter
            .select(&self.graph)
            .iter()
            .filter_map(|name| self.graph.get(name))
            .collect()
    }

    /// Generate detached variants; returns the emitted spell names.
    pub fn detach(&mut self, names: &[String]) -> Result<Vec<String>> {
        GeneratorRun::default().detach(&mut self.graph, names)
    }

    /// Generate transmuted variants; returns the emitted spell names.
    pub fn transmute(&mut self, names: &[String]) -> Result<Vec<String>> {
        GeneratorRun::default().transmute(&mut self.graph, names)
    }

    /// Read an allow-list file: one group name per line, `#` comments and
    /// blank lines ignored.
    pub fn load_allow_list(path: &Path) -> Result<BTreeSet<String>> {
        let text = fs::read_to_string(path)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    /// Run the full pipeline — detachment then transmutation over every
    /// eligible root — and write one record file per allow-listed group
    /// under `dest`.
    ///
    /// Each file holds the group's spells in name order, so output is
    /// stable across runs.
    pub fn extend(
        &mut self,
        allow_list: &BTreeSet<String>,
        dest: &Path,
        options: GeneratorOptions,
    ) -> Result<ExtendReport> {
        let mut run = GeneratorRun::new(options);
        run.detach(&mut self.graph, &[])?;
        run.transmute(&mut self.graph, &[])?;

        fs::create_dir_all(dest)?;
        let mut report = ExtendReport::default();
        for (group, names) in run.groups() {
            if !allow_list.contains(group) {
                log::info!(" [-] skipping {group}, not enabled");
                report.skipped.push(group.clone());
                continue;
            }
            let mut spells: Vec<&Spell> =
                names.iter().filter_map(|name| self.graph.get(name)).collect();
            spells.sort();

            let mut contents = String::new();
            for spell in spells {
                contents.push_str(&spell.to_text());
                contents.push_str("\n\n");
            }
            let path = dest.join(format!("Spell_{group}.{RECORD_EXTENSION}"));
            log::info!(" [+] writing {}", path.display());
            fs::write(&path, contents)?;
            report.written.push(path);
        }
        Ok(report)
    }
}

/// Parse blank-line separated record blocks into the graph.
fn insert_blocks(graph: &mut SpellGraph, text: &str) -> Result<()> {
    for block in text.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        graph.insert(Spell::parse_block(block)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::generator::GeneratorOptions;

    const CORPUS: &str = r#"new entry "Target_Gloom"
type "SpellData"
data "SpellType" "Target"
data "Level" "2"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:2"
data "SpellFlags" "HasVerbalComponent;IsSpell;IsConcentration"

new entry "Target_Gloom_3"
type "SpellData"
data "SpellType" "Target"
using "Target_Gloom"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:3"
data "RootSpellID" "Target_Gloom"
data "PowerLevel" "3"

new entry "Shout_Veil"
type "SpellData"
data "SpellType" "Shout"
data "Level" "1"
data "SpellFlags" "IsSpell;IsConcentration"
"#;

    #[test]
    fn test_from_text_links_corpus() {
        let library = SpellLibrary::from_text(CORPUS).unwrap();
        assert_eq!(library.graph().len(), 3);
        assert_eq!(
            library.graph().parent_of("Target_Gloom_3"),
            Some("Target_Gloom")
        );
    }

    #[test]
    fn test_get_spells_honors_filter() {
        let library = SpellLibrary::from_text(CORPUS).unwrap();
        let filter = SpellFilter::new().spells().concentration();
        let names: Vec<&str> = library
            .get_spells(&filter)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Shout_Veil", "Target_Gloom"]);
    }

    #[test]
    fn test_load_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("stats");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Spell_Target.txt"), CORPUS).unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let library = SpellLibrary::load(dir.path()).unwrap();
        assert_eq!(library.graph().len(), 3);
    }

    #[test]
    fn test_load_allow_list_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enabled_spells.txt");
        fs::write(&path, "# enabled groups\nTarget_Gloom\n\n  Shout_Veil  \n").unwrap();

        let list = SpellLibrary::load_allow_list(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("Target_Gloom"));
        assert!(list.contains("Shout_Veil"));
    }

    #[test]
    fn test_load_allow_list_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("enabled_spells.txt");
        assert!(SpellLibrary::load_allow_list(&missing).is_err());
    }

    #[test]
    fn test_extend_writes_enabled_groups_only() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("modded");
        let mut library = SpellLibrary::from_text(CORPUS).unwrap();
        let allow_list = BTreeSet::from(["Target_Gloom".to_string()]);

        let report = library
            .extend(&allow_list, &dest, GeneratorOptions::default())
            .unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.skipped, vec!["Shout_Veil".to_string()]);

        let written = fs::read_to_string(&report.written[0]).unwrap();
        assert!(written.contains("new entry \"_Target_Gloom_Detached\""));
        assert!(written.contains("new entry \"Target_Gloom_Common_3\""));
        assert!(written.ends_with("\n\n"));
        // Name order puts the deprioritized `_` variants after canonical.
        let common = written.find("new entry \"Target_Gloom_Common\"").unwrap();
        let detached = written.find("new entry \"_Target_Gloom_Detached\"").unwrap();
        assert!(common < detached);
    }
}
