//! geostore CLI
//!
//! Command-line tools for geostore coordinate caches.
//!
//! # Commands
//!
//! - `load` - Load `id lon lat` lines into a coordinate cache
//! - `lookup` - Print the coordinates of node ids
//! - `inspect` - Display cache layout and load statistics
//! - `clean` - Delete a cache

mod commands;
mod manifest;

use clap::{Parser, Subcommand};
use geostore_core::CacheConfig;
use geostore_storage::MemoryKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// geostore command-line cache tools.
#[derive(Parser)]
#[command(name = "geostore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the cache directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MemoryArg {
    OnHeap,
    OffHeap,
    MappedFile,
    MappedDirectory,
}

impl From<MemoryArg> for MemoryKind {
    fn from(arg: MemoryArg) -> Self {
        match arg {
            MemoryArg::OnHeap => Self::OnHeap,
            MemoryArg::OffHeap => Self::OffHeap,
            MemoryArg::MappedFile => Self::MappedFile,
            MemoryArg::MappedDirectory => Self::MappedDirectory,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load node coordinates into a cache
    Load {
        /// Text file with one `id lon lat` line per node
        input: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Memory backend (overrides the configuration file)
        #[arg(short, long, value_enum)]
        memory: Option<MemoryArg>,

        /// Segment size in bytes (overrides the configuration file)
        #[arg(short, long)]
        segment_size: Option<usize>,

        /// Entries per batch (overrides the configuration file)
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Print the coordinates of node ids
    Lookup {
        /// Node ids
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<i64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Display cache layout and load statistics
    Inspect {
        /// List segment files
        #[arg(short, long)]
        segments: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete a cache
    Clean,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Load {
            input,
            config,
            memory,
            segment_size,
            batch_size,
        } => {
            let mut cache = match &config {
                Some(path) => CacheConfig::from_json_file(path)?,
                None => CacheConfig::new().memory_kind(MemoryKind::MappedFile),
            };
            if let Some(path) = cli.path {
                cache = cache.cache_dir(path);
            }
            if let Some(memory) = memory {
                cache = cache.memory_kind(memory.into());
            }
            if let Some(size) = segment_size {
                cache = cache.segment_size(size);
            }
            if let Some(size) = batch_size {
                cache = cache.batch_size(size);
            }
            let manifest = commands::load::run(&cache, &input)?;
            println!(
                "Loaded {} coordinates into {}",
                manifest.stats.entries_written,
                cache.cache_dir.display()
            );
        }
        Commands::Lookup { ids, format } => {
            let path = cli.path.ok_or("Cache path required for lookup")?;
            let entries = commands::lookup::run(&path, &ids)?;
            commands::lookup::print(&entries, &format)?;
        }
        Commands::Inspect { segments, format } => {
            let path = cli.path.ok_or("Cache path required for inspect")?;
            let result = commands::inspect::run(&path, segments)?;
            commands::inspect::print(&result, &format)?;
        }
        Commands::Clean => {
            let path = cli.path.ok_or("Cache path required for clean")?;
            commands::clean::run(&path)?;
        }
        Commands::Version => {
            println!("geostore CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
