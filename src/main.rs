//! fixture-overlay CLI
//!
//! Entry point for the `fixover` command-line tool: inspect a fixture tree,
//! resolve overlay chains, and print merged datasets.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process;

use fixture_overlay::selection::QUERY_PARAM;
use fixture_overlay::{
    overlay_label, select, FileStore, FixtureError, FsDirectory, OverlayEngine, SelectionInput,
};

/// File under the fixture root remembering the last selected overlay.
const PERSIST_FILE: &str = ".fixover-overlay";

#[derive(Parser)]
#[command(name = "fixover")]
#[command(about = "Inspect and merge fixture overlay trees", version)]
struct Cli {
    /// Root of the fixture tree
    #[arg(long, default_value = "fixtures")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged dataset for the active overlay as JSON
    Serialize {
        /// Overlay to activate (empty string resets the persisted choice)
        #[arg(long)]
        overlay: Option<String>,

        /// Path to a static settings file (default: <root>/fixover.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Print the resolved merge chain of an overlay
    Chain {
        /// Overlay to resolve
        #[arg(long)]
        overlay: String,
    },

    /// List known overlay names
    Overlays,
}

/// Static settings file: `[overlay] name = "..."`.
#[derive(Debug, Default, Deserialize)]
struct StaticSettings {
    #[serde(default)]
    overlay: OverlaySection,
}

#[derive(Debug, Default, Deserialize)]
struct OverlaySection {
    name: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serialize { overlay, config } => run_serialize(&cli.root, overlay, config),
        Commands::Chain { overlay } => run_chain(&cli.root, &overlay),
        Commands::Overlays => run_overlays(&cli.root),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run_serialize(
    root: &Path,
    overlay: Option<String>,
    config: Option<PathBuf>,
) -> Result<(), FixtureError> {
    let directory = FsDirectory::open(root)?;
    let mut engine = OverlayEngine::new(&directory)?;

    let input = SelectionInput {
        explicit: overlay,
        query_param: std::env::var(QUERY_PARAM).ok(),
        static_config: load_static_overlay(root, config),
    };
    let store = FileStore::new(root.join(PERSIST_FILE));
    let selection = select(&input, &store)?;

    let name = selection.name.as_deref();
    eprintln!(
        "Serializing {} (from {})...",
        overlay_label(name.unwrap_or_default()),
        selection.source.describe()
    );
    let dataset = engine.serialize(name)?;
    match serde_json::to_string_pretty(&dataset) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("error: failed to render dataset: {err}"),
    }
    Ok(())
}

fn run_chain(root: &Path, overlay: &str) -> Result<(), FixtureError> {
    let directory = FsDirectory::open(root)?;
    let mut engine = OverlayEngine::new(&directory)?;
    for member in engine.resolve(overlay)? {
        println!("{}", overlay_label(&member));
    }
    Ok(())
}

fn run_overlays(root: &Path) -> Result<(), FixtureError> {
    let directory = FsDirectory::open(root)?;
    let engine = OverlayEngine::new(&directory)?;
    for name in engine.overlays() {
        println!("{name}");
    }
    Ok(())
}

/// Read the overlay name from the static settings file, if one exists.
fn load_static_overlay(root: &Path, config: Option<PathBuf>) -> Option<String> {
    let path = config.unwrap_or_else(|| root.join("fixover.toml"));
    let raw = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<StaticSettings>(&raw) {
        Ok(settings) => settings.overlay.name,
        Err(err) => {
            eprintln!("warning: ignoring malformed settings file {}: {err}", path.display());
            None
        }
    }
}
