use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shmseg_manager::commands::{self, access, create, inspect, selftest, version};

#[derive(Parser)]
#[command(name = "shmseg")]
#[command(about = "SHMSEG - named shared memory segments for IPC")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a segment and keep it until Ctrl+C
    Create {
        /// Segment name (e.g. /seg_a); overrides the config file
        name: Option<String>,
        /// Size in bytes (0 keeps the existing size)
        #[arg(short = 's', long = "size", value_parser = commands::parse_size)]
        size: Option<usize>,
        /// Attach to an existing segment instead of failing
        #[arg(long = "shared")]
        shared: bool,
        /// Permission bits in octal
        #[arg(short = 'm', long = "mode", value_parser = commands::parse_mode)]
        mode: Option<u32>,
        /// Open without write access
        #[arg(short = 'r', long = "read-only")]
        read_only: bool,
        /// Segment config file (TOML)
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Attach to a segment and print its contents
    Inspect {
        /// Segment name
        name: String,
        /// Attach without write access
        #[arg(short = 'r', long = "read-only")]
        read_only: bool,
        /// Number of bytes to dump
        #[arg(short = 'b', long = "bytes", default_value = "64", value_parser = commands::parse_size)]
        bytes: usize,
    },

    /// Read one element (bounds-checked)
    Read {
        /// Segment name
        name: String,
        /// Element index
        index: usize,
        /// Element width in bytes (1, 2, 4 or 8)
        #[arg(short = 'w', long = "width", default_value_t = 4)]
        width: usize,
    },

    /// Write one element (bounds-checked)
    Write {
        /// Segment name
        name: String,
        /// Element index
        index: usize,
        /// Value (decimal, 0x hex, 0o octal or 0b binary)
        #[arg(value_parser = commands::parse_number)]
        value: u64,
        /// Element width in bytes (1, 2, 4 or 8)
        #[arg(short = 'w', long = "width", default_value_t = 4)]
        width: usize,
    },

    /// Run the create/attach/share/cleanup self test
    Selftest {
        /// Segment size in bytes
        #[arg(short = 's', long = "size", default_value = "256", value_parser = commands::parse_size)]
        size: usize,
    },

    /// Show version information
    Version,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shmseg=info,shmseg_manager=info,shmseg_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Create {
            name,
            size,
            shared,
            mode,
            read_only,
            config,
        } => create::run_create(create::CreateArgs {
            name,
            config,
            size,
            shared,
            mode,
            read_only,
        }),

        Commands::Inspect {
            name,
            read_only,
            bytes,
        } => inspect::run_inspect(&name, read_only, bytes),

        Commands::Read { name, index, width } => access::run_read(&name, index, width),

        Commands::Write {
            name,
            index,
            value,
            width,
        } => access::run_write(&name, index, width, value),

        Commands::Selftest { size } => selftest::run_selftest(size),

        Commands::Version => {
            version::run_version();
            Ok(())
        }
    }
}
