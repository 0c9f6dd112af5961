//! LifeTree command-line entry point.
//!
//! # Responsibility
//! - Lay out family snapshot files without the Flutter/FFI runtime.
//! - Print a quick per-person tier listing for data checks.

use clap::{Parser, Subcommand, ValueEnum};
use lifetree_core::{
    layout_family, FamilyGraph, FamilySnapshot, LayoutConfig, Orientation, TierSource,
    TierStrategy,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

/// Family tree layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the laid-out graph as JSON
    Layout {
        /// Snapshot file (`{"ancestors": [...], "members": [...]}`)
        snapshot: PathBuf,

        #[arg(long, value_enum, default_value_t = StrategyArg::RolePreferred)]
        strategy: StrategyArg,

        #[arg(long, value_enum, default_value_t = OrientationArg::OldestOnTop)]
        orientation: OrientationArg,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print one line per person: tier, tier source, id, name
    Tiers {
        /// Snapshot file (`{"ancestors": [...], "members": [...]}`)
        snapshot: PathBuf,

        #[arg(long, value_enum, default_value_t = StrategyArg::RolePreferred)]
        strategy: StrategyArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    RolePreferred,
    BirthYearPreferred,
    RoleOnly,
    BirthYearOnly,
}

impl From<StrategyArg> for TierStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::RolePreferred => Self::RolePreferred,
            StrategyArg::BirthYearPreferred => Self::BirthYearPreferred,
            StrategyArg::RoleOnly => Self::RoleOnly,
            StrategyArg::BirthYearOnly => Self::BirthYearOnly,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrientationArg {
    OldestOnTop,
    OldestAtBottom,
}

impl From<OrientationArg> for Orientation {
    fn from(value: OrientationArg) -> Self {
        match value {
            OrientationArg::OldestOnTop => Self::OldestOnTop,
            OrientationArg::OldestAtBottom => Self::OldestAtBottom,
        }
    }
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("lifetree: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    match args.command {
        Command::Layout {
            snapshot,
            strategy,
            orientation,
            pretty,
        } => {
            let config = LayoutConfig {
                strategy: strategy.into(),
                orientation: orientation.into(),
                ..LayoutConfig::default()
            };
            let graph = layout_snapshot_file(&snapshot, &config)?;
            let json = if pretty {
                serde_json::to_string_pretty(&graph)?
            } else {
                serde_json::to_string(&graph)?
            };
            println!("{json}");
        }
        Command::Tiers { snapshot, strategy } => {
            let config = LayoutConfig {
                strategy: strategy.into(),
                ..LayoutConfig::default()
            };
            let graph = layout_snapshot_file(&snapshot, &config)?;
            for node in &graph.nodes {
                println!(
                    "{}\t{}\t{}\t{}",
                    node.tier,
                    tier_source_label(node.tier_source),
                    node.id,
                    node.label
                );
            }
        }
    }
    Ok(())
}

fn layout_snapshot_file(path: &Path, config: &LayoutConfig) -> Result<FamilyGraph, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read `{}`: {err}", path.display()))?;
    let snapshot: FamilySnapshot = serde_json::from_str(&raw)
        .map_err(|err| format!("invalid snapshot `{}`: {err}", path.display()))?;
    Ok(layout_family(&snapshot, config))
}

fn tier_source_label(source: TierSource) -> &'static str {
    match source {
        TierSource::Role => "role",
        TierSource::BirthYear => "birth_year",
        TierSource::Spouse => "spouse",
        TierSource::Default => "default",
    }
}
