//! ZVFS CLI
//!
//! Command-line interface for ZVFS containers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use zvfs::protocol::{Command, CompactionReport, ContainerStats, Listing, Response};
use zvfs::{Config, Engine, SyncStrategy};

/// Log filter used when `RUST_LOG` is unset: mutation summaries from the
/// library, warnings from everything else
const DEFAULT_LOG_FILTER: &str = "warn,zvfs=info";

/// ZVFS CLI
#[derive(Parser, Debug)]
#[command(name = "zvfs")]
#[command(about = "Single-file virtual filesystem")]
#[command(version)]
struct Args {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Skip fsync after mutations
    #[arg(long, global = true)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty filesystem
    Mkfs {
        /// Container file
        filesystem: PathBuf,
    },

    /// Show filesystem counters
    Gifs {
        /// Container file
        filesystem: PathBuf,
    },

    /// Add a host file
    Addfs {
        /// Container file
        filesystem: PathBuf,

        /// Host file to store (stored under its base name)
        file: PathBuf,
    },

    /// Extract a file to the host
    Getfs {
        /// Container file
        filesystem: PathBuf,

        /// Name of the stored file
        name: String,

        /// Output path (defaults to the stored name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Mark a file as deleted
    Rmfs {
        /// Container file
        filesystem: PathBuf,

        /// Name of the stored file
        name: String,
    },

    /// List stored files
    Lsfs {
        /// Container file
        filesystem: PathBuf,
    },

    /// Print a stored file
    Catfs {
        /// Container file
        filesystem: PathBuf,

        /// Name of the stored file
        name: String,
    },

    /// Drop deleted files and rebuild the filesystem
    Dfrgfs {
        /// Container file
        filesystem: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> zvfs::Result<()> {
    let sync = if args.no_sync {
        SyncStrategy::Never
    } else {
        SyncStrategy::EveryWrite
    };
    let engine = |path: &Path| {
        Engine::new(
            Config::builder()
                .container_path(path)
                .sync_strategy(sync)
                .build(),
        )
    };

    match args.command {
        Commands::Mkfs { filesystem } => {
            engine(&filesystem).execute(Command::Initialize)?;
            if args.json {
                print_json(&Response::Initialized);
            } else {
                println!("Created empty filesystem: {}", filesystem.display());
            }
        }
        Commands::Gifs { filesystem } => {
            if let Response::Stats(stats) = engine(&filesystem).execute(Command::Stat)? {
                if args.json {
                    print_json(&stats);
                } else {
                    print_stats(&filesystem, &stats);
                }
            }
        }
        Commands::Addfs { filesystem, file } => {
            let receipt = engine(&filesystem).insert_file(&file)?;
            if args.json {
                print_json(&receipt);
            } else {
                println!(
                    "Added file: {} ({} bytes), entry at offset {} (slot {}), data at offset {}",
                    file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                    receipt.length,
                    receipt.entry_offset,
                    receipt.slot,
                    receipt.start
                );
            }
        }
        Commands::Getfs {
            filesystem,
            name,
            output,
        } => {
            let dest = output.unwrap_or_else(|| PathBuf::from(&name));
            let written = engine(&filesystem).extract_to(&name, &dest)?;
            if args.json {
                print_json(&serde_json::json!({
                    "name": name,
                    "dest": dest.display().to_string(),
                    "length": written,
                }));
            } else {
                println!(
                    "Extracted file: {} ({} bytes) to {}",
                    name,
                    written,
                    dest.display()
                );
            }
        }
        Commands::Rmfs { filesystem, name } => {
            engine(&filesystem).execute(Command::Remove { name: name.clone() })?;
            if args.json {
                print_json(&Response::Removed);
            } else {
                println!("Removed {} from filesystem.", name);
            }
        }
        Commands::Lsfs { filesystem } => {
            if let Response::Listing(listing) = engine(&filesystem).execute(Command::List)? {
                if args.json {
                    print_json(&listing);
                } else {
                    print_listing(&filesystem, &listing);
                }
            }
        }
        Commands::Catfs { filesystem, name } => {
            let command = Command::ReadContents { name: name.clone() };
            if let Response::Data(data) = engine(&filesystem).execute(command)? {
                if args.json {
                    print_json(&serde_json::json!({
                        "name": name,
                        "length": data.len(),
                        "text": std::str::from_utf8(&data).ok(),
                    }));
                } else {
                    match std::str::from_utf8(&data) {
                        Ok(text) => {
                            println!("Contents of '{}':\n", name);
                            println!("{}", text);
                        }
                        Err(_) => println!("'{}' is binary ({} bytes)", name, data.len()),
                    }
                }
            }
        }
        Commands::Dfrgfs { filesystem } => {
            if let Response::Compacted(report) = engine(&filesystem).execute(Command::Compact)? {
                if args.json {
                    print_json(&report);
                } else {
                    print_compaction(&report);
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to render JSON: {}", e),
    }
}

fn print_stats(path: &Path, stats: &ContainerStats) {
    println!("Filesystem: {}", path.display());
    println!("Files present: {}", stats.active_files);
    println!("Files ever added: {}", stats.file_count);
    println!("Free entries: {}", stats.free_entries);
    println!("Deleted files: {}", stats.deleted_files);
    println!("Total space used: {} bytes", stats.total_active_bytes);
    println!("Next free data offset: {}", stats.next_free_offset);
}

fn print_listing(path: &Path, listing: &Listing) {
    println!("Files in virtual filesystem: {}", path.display());
    println!("{}", "=".repeat(60));
    println!("{:<20} {:<12} {:<20}", "Filename", "Size (bytes)", "Created On");
    println!("{}", "-".repeat(60));

    if listing.files.is_empty() {
        println!("No active files found in the filesystem.");
    }
    for file in &listing.files {
        println!(
            "{:<20} {:<12} {:<20}",
            file.name,
            file.length,
            format_timestamp(file.created)
        );
    }

    println!("{}", "-".repeat(60));
    println!("Total files listed: {}", listing.files.len());
    println!("Filesystem capacity: {} slots", listing.capacity);
    println!("Free slots remaining: {}", listing.free_slots);
}

fn print_compaction(report: &CompactionReport) {
    if !report.rebuilt() {
        println!("No deleted files to remove. Filesystem already clean.");
        return;
    }
    println!("Defragmentation complete!");
    println!("Files removed: {}", report.tombstones_removed);
    println!("Bytes freed (file data not counting padding): {}", report.bytes_freed);
    println!("Active files after defragmentation: {}", report.files_kept);
    println!("Next free data offset: {}", report.next_free_offset);
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| secs.to_string())
}
