//! hexworld command line: generate the world, edit it and plan routes.
//! Run with: cargo run -- --help

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hexworld::constants::DEFAULT_WORLD_SEED;
use hexworld::map::statistics::export_tile_registry;
use hexworld::map::{MapConfig, MapConfigError, MapStatistics, TilePos};
use hexworld::pathfinding::{MacroGrid, PathfindingSystem};
use hexworld::save::{
    FileStore, ImportError, LoadedWorld, MapLock, OverrideStore, SaveError, StoreError, TileEdit,
    load_world,
};
use hexworld::sublands::{SubLandError, coastal_hints_for, generate_sub_land_grid, river_hints_for};

#[derive(Parser, Debug)]
#[command(name = "hexworld")]
#[command(about = "Procedural hex world generator with persistent edits and route planning")]
struct Cli {
    /// Directory holding edits, the map lock and the saved seed
    #[arg(long, default_value = ".hexworld")]
    store: PathBuf,

    /// World seed, ignored while the map is locked
    #[arg(short, long, default_value_t = DEFAULT_WORLD_SEED)]
    seed: u64,

    /// Month number used for seasons; any integer, folded into 1-12
    #[arg(short, long, default_value_t = 1)]
    month: i32,

    /// JSON map layout; defaults to the Earth layout
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the effective world and print its statistics
    Generate {
        /// Write the full tile registry as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Find the cheapest route between two tiles
    Path {
        /// Origin as q,r
        from: TilePos,
        /// Destination as q,r
        to: TilePos,
        /// Travel by ship instead of over land
        #[arg(long)]
        naval: bool,
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
    /// Subdivide one tile into its sub-land grid
    Sublands {
        /// Tile as q,r
        at: TilePos,
        /// Write every sub-land cell as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Store an edit for one tile, given as a JSON object of tile fields
    Edit {
        at: TilePos,
        #[arg(required_unless_present = "reroll_resources")]
        edit: Option<String>,
        /// Re-run resource distribution on the effective tile after the edit
        #[arg(long)]
        reroll_resources: bool,
    },
    /// Freeze the current seed so later runs reuse it
    Lock,
    /// Let the seed argument take effect again
    Unlock,
    /// Show lock state, saved seed and edit count
    Status,
    /// Replace every stored edit with the contents of a JSON file
    Import { file: PathBuf },
    /// Print or write every stored edit as JSON
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove every stored edit
    Clear,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Config(#[from] MapConfigError),
    #[error(transparent)]
    SubLand(#[from] SubLandError),
    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no tile at {0}")]
    UnknownTile(TilePos),
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn map_config(cli: &Cli) -> Result<MapConfig, CliError> {
    match &cli.config {
        Some(path) => Ok(serde_json::from_str(&read_file(path)?)?),
        None => Ok(MapConfig::earth()),
    }
}

fn world(cli: &Cli, store: &mut FileStore, config: &MapConfig) -> Result<LoadedWorld, CliError> {
    Ok(load_world(store, cli.seed, cli.month, config)?)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut store = FileStore::open(&cli.store)?;
    let config = map_config(cli)?;

    match &cli.command {
        Command::Generate { out } => {
            let loaded = world(cli, &mut store, &config)?;
            let stats = MapStatistics::collect(&loaded.tiles);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "seed": loaded.seed,
                    "overridesApplied": loaded.report.applied,
                    "overridesSkipped": loaded.report.skipped_invalid,
                    "statistics": stats,
                }))?
            );
            if let Some(path) = out {
                write_file(path, &export_tile_registry(&loaded.tiles)?)?;
            }
        }
        Command::Path {
            from,
            to,
            naval,
            speed,
        } => {
            let loaded = world(cli, &mut store, &config)?;
            let grid = if *naval {
                MacroGrid::naval(&loaded.tiles, config.width)
            } else {
                MacroGrid::new(&loaded.tiles, config.width)
            };
            let pathfinder = PathfindingSystem::new();
            let report = match pathfinder.find_path(*from, *to, &grid) {
                Some(path) => json!({
                    "steps": path.len().saturating_sub(1),
                    "days": pathfinder.calculate_path_travel_time(&path, &grid, *speed),
                    "terrain": pathfinder.get_path_terrain_summary(&path, &grid),
                    "path": path.iter().map(ToString::to_string).collect::<Vec<_>>(),
                }),
                None => json!({
                    "path": null,
                    "destinationPassable": pathfinder.is_destination_reachable(*to, &grid),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Sublands { at, out } => {
            let loaded = world(cli, &mut store, &config)?;
            let pos = at.wrapped(config.width);
            let parent = loaded.tiles.get(&pos).ok_or(CliError::UnknownTile(pos))?;
            let coast = coastal_hints_for(&loaded.tiles, pos, config.width);
            let rivers = river_hints_for(&loaded.tiles, pos, config.width);
            let grid = generate_sub_land_grid(parent, pos.q, pos.r, &coast, &rivers)?;

            let counts: std::collections::BTreeMap<String, usize> = grid
                .resource_counts()
                .into_iter()
                .map(|(resource, count)| (resource.to_string(), count))
                .collect();
            let river_cells = grid.cells().iter().filter(|c| c.has_river).count();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "parent": pos.to_string(),
                    "terrain": parent.terrain,
                    "coastalEdges": coast.len(),
                    "riverCells": river_cells,
                    "resources": counts,
                }))?
            );
            if let Some(path) = out {
                write_file(path, &serde_json::to_string(grid.cells())?)?;
            }
        }
        Command::Edit {
            at,
            edit,
            reroll_resources,
        } => {
            let pos = at.wrapped(config.width);
            let mut saved = None;
            if let Some(edit) = edit {
                let edit: TileEdit = serde_json::from_str(edit)?;
                saved = Some(OverrideStore::new(&mut store).save(pos.q, pos.r, edit)?);
            }
            if *reroll_resources {
                let loaded = world(cli, &mut store, &config)?;
                let tile = loaded.tiles.get(&pos).ok_or(CliError::UnknownTile(pos))?;
                saved = Some(OverrideStore::new(&mut store).reroll_resources(tile, loaded.seed)?);
            }
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        Command::Lock => {
            let mut lock = MapLock::new(&mut store);
            let seed = lock.resolve_seed(cli.seed);
            lock.save_seed(seed)?;
            lock.lock()?;
            println!("Map locked with seed {seed}");
        }
        Command::Unlock => {
            MapLock::new(&mut store).unlock()?;
            println!("Map unlocked");
        }
        Command::Status => {
            let lock = MapLock::new(&mut store);
            let status = json!({
                "locked": lock.is_locked(),
                "savedSeed": lock.saved_seed(),
                "effectiveSeed": lock.resolve_seed(cli.seed),
            });
            let edits = OverrideStore::new(&mut store).count();
            println!("{}", serde_json::to_string_pretty(&json!({ "map": status, "edits": edits }))?);
        }
        Command::Import { file } => {
            let imported = OverrideStore::new(&mut store).import(&read_file(file)?)?;
            println!("Imported {imported} edits");
        }
        Command::Export { out } => {
            let exported = OverrideStore::new(&mut store).export()?;
            match out {
                Some(path) => write_file(path, &exported)?,
                None => println!("{exported}"),
            }
        }
        Command::Clear => {
            OverrideStore::new(&mut store).clear_all()?;
            println!("Cleared all edits");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
