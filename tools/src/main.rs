use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use container::Limits;
use glob::Pattern;
use mapsync_tools::{decode_tiles, format_inspect_pretty, inspect_bundle, replay_script};
use model::Map;

#[derive(Parser)]
#[command(
    name = "mapsync-tools",
    version,
    about = "mapsync bundle inspection and replay tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a bundle, or every bundle in a directory.
    Inspect {
        /// Path to a bundle or a directory of bundles.
        path: PathBuf,
        /// Glob filter when inspecting a directory.
        #[arg(long, default_value = "*.map")]
        glob: String,
        /// Sort inspected bundles.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected bundles (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Decode a base64 tile payload into JSON cells.
    Tiles {
        /// Tile kind: tiles, game, front, tele, speedup, switch or tune.
        #[arg(long)]
        kind: String,
        /// Base64 payload.
        data: String,
    },
    /// Replay a file of event envelopes (one per line) against a bundle.
    Apply {
        /// Bundle to edit.
        map: PathBuf,
        /// Event script.
        script: PathBuf,
        /// Where to write the edited bundle.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write a blank map bundle.
    Blank {
        /// Output path.
        output: PathBuf,
        #[arg(long, default_value_t = 100)]
        width: usize,
        #[arg(long, default_value_t = 50)]
        height: usize,
        /// Add a background group and a tiles layer.
        #[arg(long)]
        default_layers: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
    Name,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let limits = Limits::default();
    match cli.command {
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
            format,
        } => {
            if path.is_dir() {
                let entries = collect_bundle_entries(&path, &glob)?;
                let mut entries = sort_entries(entries, sort);
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    inspect_file(&entry.path, &limits, format)?;
                }
            } else {
                inspect_file(&path, &limits, format)?;
            }
        }
        Command::Tiles { kind, data } => {
            let cells = decode_tiles(&kind, &data)?;
            let json = serde_json::to_string_pretty(&cells).context("serialize json")?;
            println!("{json}");
        }
        Command::Apply {
            map,
            script,
            output,
        } => {
            let bytes = fs::read(&map).with_context(|| format!("read bundle {}", map.display()))?;
            let loaded = Map::from_bundle(&map_name(&map), &bytes, &limits)
                .with_context(|| format!("load map {}", map.display()))?;
            let script_text = fs::read_to_string(&script)
                .with_context(|| format!("read script {}", script.display()))?;
            let (edited, report) = replay_script(loaded, &script_text)
                .with_context(|| format!("replay {}", script.display()))?;
            println!(
                "applied: {} dropped: {} refused: {} saved: {}",
                report.applied, report.dropped, report.refused, report.saved
            );
            if let Some(output) = output {
                let bundle = edited.to_bundle().context("encode bundle")?;
                fs::write(&output, bundle)
                    .with_context(|| format!("write bundle {}", output.display()))?;
                log::info!("wrote {}", output.display());
            }
        }
        Command::Blank {
            output,
            width,
            height,
            default_layers,
        } => {
            anyhow::ensure!(
                (1..=10_000).contains(&width) && (1..=10_000).contains(&height),
                "dimensions must be 1..=10000, got {width}x{height}"
            );
            let name = map_name(&output);
            let map = if default_layers {
                Map::blank_with_defaults(name, width, height)
            } else {
                Map::blank(name, width, height)
            };
            let bundle = map.to_bundle().context("encode bundle")?;
            fs::write(&output, bundle)
                .with_context(|| format!("write bundle {}", output.display()))?;
            log::info!("wrote {} ({width}x{height})", output.display());
        }
    }
    Ok(())
}

fn map_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("map")
        .to_string()
}

fn inspect_file(path: &Path, limits: &Limits, format: OutputFormat) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("read bundle {}", path.display()))?;
    let report = inspect_bundle(&map_name(path), &bytes, limits)
        .with_context(|| format!("inspect {}", path.display()))?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_inspect_pretty(&report)),
    }
    Ok(())
}

struct BundleEntry {
    path: PathBuf,
    size: u64,
}

fn collect_bundle_entries(dir: &Path, glob: &str) -> Result<Vec<BundleEntry>> {
    let pattern = Pattern::new(glob).context("invalid glob pattern")?;
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name));
        if !matches_name && !pattern.matches_path(&path) {
            continue;
        }
        let size = entry.metadata()?.len();
        entries.push(BundleEntry { path, size });
    }
    Ok(entries)
}

fn sort_entries(mut entries: Vec<BundleEntry>, sort: Option<InspectSort>) -> Vec<BundleEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        Some(InspectSort::Name) | None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}
