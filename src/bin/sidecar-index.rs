//! sidecar-index: CLI tool for inspecting sidecar index files.

use clap::{Args, Parser, Subcommand};
use sidecar_index::{DataFile, IndexBuilder, LoadConfig, SidecarIndex};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sidecar-index")]
#[command(version)]
#[command(about = "Load and query tab-separated sidecar index files", long_about = None)]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LoadArgs {
    /// JSON file with load settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip lines longer than this many bytes
    #[arg(long, global = true)]
    max_line_bytes: Option<usize>,

    /// Average line width used to pre-size the index
    #[arg(long, global = true)]
    average_line_bytes: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a sidecar file and print load statistics
    Stats {
        /// Sidecar file ("-" for stdin)
        sidecar: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print records at the given positions
    Get {
        /// Sidecar file ("-" for stdin)
        sidecar: PathBuf,

        /// Record positions
        #[arg(required = true)]
        positions: Vec<usize>,
    },

    /// Write the payload of one record to stdout
    Payload {
        /// Sidecar file
        sidecar: PathBuf,

        /// Data file the sidecar points into
        data: PathBuf,

        /// Record position
        position: usize,

        /// Drop the entry's trailing NUL terminator
        #[arg(long)]
        strip_nul: bool,
    },

    /// Re-emit every record in normalized sidecar format
    Dump {
        /// Sidecar file ("-" for stdin)
        sidecar: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&cli.load)?;

    match cli.command {
        Commands::Stats { sidecar, json } => {
            let index = load(&sidecar, config)?;
            let stats = index.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(stats)?);
            } else {
                println!("Records:         {}", stats.records);
                println!("Malformed lines: {}", stats.malformed_lines);
                println!("Overlong lines:  {}", stats.overlong_lines);
                println!("Blank lines:     {}", stats.blank_lines);
                println!("Bytes read:      {}", stats.bytes_read);
                println!("Capacity hint:   {}", stats.capacity_hint);
                println!("Elapsed:         {:?}", stats.elapsed);
            }
        }
        Commands::Get { sidecar, positions } => {
            let index = load(&sidecar, config)?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for position in positions {
                let record = index.record_at(position)?;
                writeln!(out, "{}\t{}\t{}", record.key, record.offset, record.length)?;
            }
            out.flush()?;
        }
        Commands::Payload {
            sidecar,
            data,
            position,
            strip_nul,
        } => {
            let index = load(&sidecar, config)?;
            let data = DataFile::open(&data)?;
            let payload = if strip_nul {
                data.entry(&index, position)?
            } else {
                data.payload(&index, position)?
            };
            let mut out = io::stdout().lock();
            out.write_all(payload)?;
            out.flush()?;
        }
        Commands::Dump { sidecar } => {
            let index = load(&sidecar, config)?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for record in index.iter() {
                writeln!(out, "{}\t{}\t{}", record.key, record.offset, record.length)?;
            }
            out.flush()?;
        }
    }

    Ok(())
}

/// Merge the config file and command-line overrides.
fn build_config(args: &LoadArgs) -> sidecar_index::Result<LoadConfig> {
    let mut config = match &args.config {
        Some(path) => LoadConfig::from_json_file(path)?,
        None => LoadConfig::default(),
    };
    if let Some(bytes) = args.max_line_bytes {
        config = config.with_max_line_bytes(bytes);
    }
    if let Some(bytes) = args.average_line_bytes {
        config = config.with_average_line_bytes(bytes);
    }
    config.validate()?;
    Ok(config)
}

fn load(path: &Path, config: LoadConfig) -> sidecar_index::Result<SidecarIndex> {
    if path == Path::new("-") {
        let builder = IndexBuilder::new(config)?;
        let stdin = io::stdin();
        return builder.build_from_reader(stdin.lock(), 0);
    }
    SidecarIndex::load_with_config(path, config)
}
