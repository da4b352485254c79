use clap::{Parser, Subcommand};
use glam::{DVec2, IVec2};
use std::path::PathBuf;
use tilespace_author::TileEditor;
use tilespace_common::Bounds2;
use tilespace_kernel::{HierarchyIndex, TileRecord, TileStore};
use tilespace_persist::{TilesetPackage, TilesetStore};
use tilespace_stream::{MemoryHost, TileScan, TileStreamingCoordinator, WorldConfig};
use tilespace_tools::TileInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tilespace-cli", about = "CLI tool for tilespace operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run a tile streaming demo: translate, rebase, undo
    Demo {
        /// Number of tiles to generate around the root
        #[arg(short, long, default_value = "8")]
        tiles: usize,
        /// Editable window half-extent in world units
        #[arg(long, default_value = "1000")]
        window: f64,
    },
    /// Write a generated tileset package to disk
    Seed {
        /// Store directory
        path: PathBuf,
        /// Number of tiles to generate around the root
        #[arg(short, long, default_value = "8")]
        tiles: usize,
    },
    /// Load a tileset package and check its integrity and hierarchy
    Validate {
        /// Store directory
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tilespace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tilespace_common::crate_info());
            println!("kernel: {}", tilespace_kernel::crate_info());
            println!("stream: {}", tilespace_stream::crate_info());
            println!("persist: {}", tilespace_persist::crate_info());
            println!("author: {}", tilespace_author::crate_info());
            println!("tools: {}", tilespace_tools::crate_info());
        }
        Commands::Demo { tiles, window } => {
            println!("Streaming demo: {tiles} tiles, window half-extent {window}");

            let scans = generate_tiles(tiles);
            let far = scans.last().map(|scan| scan.id);
            let config = WorldConfig {
                editable_half_extent: window,
                ..WorldConfig::default()
            };
            let mut coordinator = TileStreamingCoordinator::new(config, MemoryHost::new(scans))?;
            let all = TileInspector::list_tiles(&coordinator);
            let change = coordinator.load_levels(&all);
            println!(
                "Loaded {} tiles, {} came up shelved",
                change.loaded.len(),
                change.shelved.len()
            );
            println!("{}", TileInspector::summary(&coordinator));

            if let Some(far) = far {
                let mut editor = TileEditor::new();
                let delta = IVec2::new(window as i32 * 3, 0);
                let change = editor.translate_levels(&mut coordinator, &[far], delta, false);
                println!(
                    "Translated far tile by {delta}: origin move {:?}, {} shelved, {} unshelved",
                    change.origin,
                    change.shelved.len(),
                    change.unshelved.len()
                );
                if let Some(info) = TileInspector::inspect_tile(&coordinator, far) {
                    println!("  {info}");
                }

                editor.undo(&mut coordinator);
                println!("After undo: {}", TileInspector::summary(&coordinator));
            }
        }
        Commands::Seed { path, tiles } => {
            let scans = generate_tiles(tiles);
            let store = TileStore::from_records(scans.iter().map(TileRecord::from));
            let package = TilesetPackage::capture(&store);

            let tileset = TilesetStore::open(&path)?;
            tileset.save(&package)?;
            println!("Wrote {} tiles to {}", package.len(), path.display());
        }
        Commands::Validate { path } => {
            let tileset = TilesetStore::open(&path)?;
            let package = tileset.load()?;
            println!(
                "Package: {} tiles, content hash {}",
                package.len(),
                package.content_hash()?
            );

            let mut store = TileStore::from_records(package.to_records());
            let hierarchy = HierarchyIndex::build(&store)?;
            store.refresh_absolute_positions(&hierarchy);
            let consistent = store.absolute_positions_consistent(&hierarchy);
            println!(
                "Hierarchy: root {:.8}, positions {}",
                hierarchy.root().0.to_string(),
                if consistent { "consistent" } else { "INCONSISTENT" }
            );
            anyhow::ensure!(consistent, "absolute positions out of sync with parent chain");
        }
    }

    Ok(())
}

/// A root plus `count` tiles spiralling outwards, each 200 units apart.
fn generate_tiles(count: usize) -> Vec<TileScan> {
    let mut root = TileScan::new("root");
    root.bounds = Some(Bounds2::new(DVec2::splat(-50.0), DVec2::splat(50.0)));
    let root_id = root.id;
    let mut scans = vec![root];
    for i in 0..count {
        let mut scan = TileScan::new(format!("tile_{i:03}"));
        scan.parent = Some(root_id);
        let step = (i + 1) as i32 * 200;
        scan.position = match i % 4 {
            0 => IVec2::new(step, 0),
            1 => IVec2::new(0, step),
            2 => IVec2::new(-step, 0),
            _ => IVec2::new(0, -step),
        };
        scan.bounds = Some(Bounds2::new(DVec2::splat(-80.0), DVec2::splat(80.0)));
        scans.push(scan);
    }
    scans
}
