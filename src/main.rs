mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::recall::RecallOverrides;
use notegraph::config::NotegraphConfig;
use notegraph::lifecycle::LifecycleMode;

#[derive(Parser)]
#[command(
    name = "notegraph",
    version,
    about = "Markdown notes to a term/relation graph with hybrid recall"
)]
struct Cli {
    /// Config file (default: ~/.notegraph/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Notes root, overriding config and NOTEGRAPH_NOTES_ROOT
    #[arg(long, global = true)]
    notes_root: Option<PathBuf>,

    /// Cache file, overriding config and NOTEGRAPH_CACHE
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the PARA folder layout and working directories
    Init {
        /// Workspace root (default: the configured notes root)
        path: Option<PathBuf>,
    },
    /// Rebuild the graph cache from the notes tree
    Index,
    /// Append text to a note, restating its relations
    Capture {
        /// Text to capture
        #[arg(long, conflicts_with = "file")]
        input: Option<String>,
        /// Read the text from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Target note (default: <inbox>/<date>-auto.md)
        #[arg(long)]
        note: Option<PathBuf>,
    },
    /// Rank notes against a query
    Recall {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        lexical_weight: Option<f64>,
        #[arg(long)]
        structural_weight: Option<f64>,
    },
    /// Check the cache for consistency and freshness
    Doctor,
    /// Measure hit@k over a labelled query set
    Benchmark {
        /// JSON array of {"query": ..., "expected": [...]}
        dataset: PathBuf,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Consolidate, decay or archive aged inbox notes
    Lifecycle {
        #[arg(long, value_enum, default_value_t = LifecycleMode::Consolidate)]
        mode: LifecycleMode,
        /// Archive threshold (default: lifecycle.archive_older_than_days)
        #[arg(long)]
        older_than_days: Option<u64>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NotegraphConfig::load_from(path)?,
        None => NotegraphConfig::load()?,
    };
    if let Some(root) = &cli.notes_root {
        config.notes.root = root.to_string_lossy().into_owned();
    }
    if let Some(cache) = &cli.cache {
        config.cache.path = cache.to_string_lossy().into_owned();
    }

    // Log to stderr so stdout stays clean for --json output.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    match cli.command {
        Command::Init { path } => {
            let root = path.unwrap_or_else(|| config.resolved_notes_root());
            cli::init::init(&root, json)?;
        }
        Command::Index => cli::index::index(&config, json)?,
        Command::Capture { input, file, note } => {
            cli::capture::capture(&config, input, file, note, json)?;
        }
        Command::Recall {
            query,
            top_k,
            lexical_weight,
            structural_weight,
        } => {
            let overrides = RecallOverrides {
                top_k,
                lexical_weight,
                structural_weight,
            };
            cli::recall::recall(&config, &query, overrides, json)?;
        }
        Command::Doctor => {
            if !cli::doctor::doctor(&config, json)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Benchmark { dataset, top_k } => {
            let overrides = RecallOverrides {
                top_k,
                ..RecallOverrides::default()
            };
            cli::recall::benchmark(&config, &dataset, overrides, json)?;
        }
        Command::Lifecycle {
            mode,
            older_than_days,
        } => cli::lifecycle::lifecycle(&config, mode, older_than_days, json)?,
    }

    Ok(ExitCode::SUCCESS)
}
