//! Command-line front end for the spell library and variant forge.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use spell_forge::diff::unified_diff;
use spell_forge::generator::{fresh_roots, GeneratorOptions};
use spell_forge::library::{SpellFilter, SpellGraph, SpellLibrary};

#[derive(Parser)]
#[command(name = "spellsmith", about = "Inspect a spell corpus and forge meta-spell variants")]
struct Cli {
    /// Root path of the spell record files.
    #[arg(short, long, default_value = "orig")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Restrict to these spell names.
    names: Vec<String>,

    /// Only real spells.
    #[arg(short, long)]
    spell: bool,

    /// Only base spells, outside any container.
    #[arg(short, long)]
    base: bool,

    /// Only concentration spells.
    #[arg(short = 'x', long)]
    concentration: bool,

    /// Only linked containers.
    #[arg(short, long)]
    container: bool,

    /// Only spells with a recognized damage element.
    #[arg(short, long)]
    elemental: bool,

    /// Only harmful spells.
    #[arg(short = 'f', long)]
    harmful: bool,

    /// Only upcast entries of a level chain.
    #[arg(short, long)]
    leveled: bool,

    /// Also print inheritance descendants, indented.
    #[arg(short, long)]
    descendants: bool,

    /// Also print container members, indented.
    #[arg(short, long)]
    members: bool,
}

impl FilterArgs {
    fn to_filter(&self) -> SpellFilter {
        let mut filter = SpellFilter::new().with_names(self.names.iter().cloned());
        if self.spell {
            filter = filter.spells();
        }
        if self.base {
            filter = filter.base();
        }
        if self.concentration {
            filter = filter.concentration();
        }
        if self.container {
            filter = filter.containers();
        }
        if self.elemental {
            filter = filter.elemental();
        }
        if self.harmful {
            filter = filter.harmful();
        }
        if self.leveled {
            filter = filter.leveled();
        }
        filter
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List spells matching the filter flags.
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Emit the matching spells as JSON instead of names.
        #[arg(long)]
        json: bool,
    },
    /// Show one spell in full, with its relationships.
    Spell { name: String },
    /// List fresh roots eligible for detachment.
    ListDetachable,
    /// List fresh roots eligible for transmutation.
    ListTransmutable,
    /// List fresh roots eligible for both detachment and transmutation.
    ListSuper,
    /// Generate detached variants and print what was forged.
    Detach { names: Vec<String> },
    /// Generate transmuted variants and print what was forged.
    Transmute { names: Vec<String> },
    /// Show a unified diff between two spells.
    Diff { name1: String, name2: String },
    /// Run the full pipeline and write enabled groups to disk.
    Extend {
        /// Allow-list file of enabled group names.
        #[arg(long, default_value = "enabled_spells.txt")]
        enabled: PathBuf,

        /// Output directory for the generated record files.
        #[arg(long, default_value = "modded")]
        dest: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();
    let cli = Cli::parse();
    let mut library = SpellLibrary::load(&cli.path)?;

    match cli.command {
        Commands::List { filter, json } => {
            let spells = library.get_spells(&filter.to_filter());
            if json {
                println!("{}", serde_json::to_string_pretty(&spells)?);
            } else {
                for spell in spells {
                    print_spell_line(library.graph(), &spell.name, 0, &filter);
                }
            }
        }
        Commands::Spell { name } => match library.graph().get(&name) {
            Some(spell) => print_spell_detail(library.graph(), spell.name.clone()),
            None => println!("no spell named {name}"),
        },
        Commands::ListDetachable => {
            let filter = SpellFilter::new().spells().concentration();
            for name in fresh_roots(library.graph(), &filter) {
                println!("{name}");
            }
        }
        Commands::ListTransmutable => {
            let filter = SpellFilter::new().spells().elemental().harmful();
            for name in fresh_roots(library.graph(), &filter) {
                println!("{name}");
            }
        }
        Commands::ListSuper => {
            let filter = SpellFilter::new()
                .spells()
                .concentration()
                .elemental()
                .harmful();
            for name in fresh_roots(library.graph(), &filter) {
                println!("{name}");
            }
        }
        Commands::Detach { names } => {
            let emitted = library.detach(&names)?;
            print_emitted(library.graph(), &emitted);
        }
        Commands::Transmute { names } => {
            let emitted = library.transmute(&names)?;
            print_emitted(library.graph(), &emitted);
        }
        Commands::Diff { name1, name2 } => {
            let graph = library.graph();
            let (Some(first), Some(second)) = (graph.get(&name1), graph.get(&name2)) else {
                anyhow::bail!("both spells must exist: {name1}, {name2}");
            };
            print!(
                "{}",
                unified_diff(&first.to_text(), &second.to_text(), &name1, &name2)
            );
        }
        Commands::Extend { enabled, dest } => {
            let allow_list = SpellLibrary::load_allow_list(&enabled)
                .with_context(|| format!("reading allow-list {}", enabled.display()))?;
            let report = library.extend(&allow_list, &dest, GeneratorOptions::default())?;
            println!(
                "wrote {} group file(s), skipped {} group(s)",
                report.written.len(),
                report.skipped.len()
            );
        }
    }
    Ok(())
}

/// Print generated spells in full, blank-line separated, in emission order.
fn print_emitted(graph: &SpellGraph, names: &[String]) {
    for name in names {
        if let Some(spell) = graph.get(name) {
            println!("{spell}");
            println!();
        }
    }
}

fn print_spell_line(graph: &SpellGraph, name: &str, indent: usize, args: &FilterArgs) {
    println!("{:indent$}{name}", "");
    if args.descendants {
        for child in graph.children_of(name).map(str::to_string).collect::<Vec<_>>() {
            print_spell_line(graph, &child, indent + 2, args);
        }
    }
    if args.members {
        for member in graph.members_of(name).map(str::to_string).collect::<Vec<_>>() {
            print_spell_line(graph, &member, indent + 2, args);
        }
    }
}

fn print_spell_detail(graph: &SpellGraph, name: String) {
    let Some(spell) = graph.get(&name) else { return };
    println!("{spell}");
    if let Some(parent) = graph.parent_of(&name) {
        println!("parent: {parent}");
    }
    if let Some(container) = graph.container_of(&name) {
        println!("container: {container}");
    }
    let children: Vec<&str> = graph.children_of(&name).collect();
    if !children.is_empty() {
        println!("children: {}", children.join(", "));
    }
    let members: Vec<&str> = graph.members_of(&name).collect();
    if !members.is_empty() {
        println!("members: {}", members.join(", "));
    }
    let upleveled: Vec<&str> = graph.upleveled_of(&name).collect();
    if !upleveled.is_empty() {
        println!("upleveled: {}", upleveled.join(", "));
    }
}
