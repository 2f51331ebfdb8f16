use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use proofrank::RankConfig;
use proofrank::config::CONFIG_FILE;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rank cross-referenced corpus pages by link importance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the weighted reference graph and subset list from the corpus
    Extract,
    /// Solve the persisted graph, writing a ranking per checkpoint
    Rank {
        /// Stop after this many checkpoints
        #[arg(long)]
        max_checkpoints: Option<usize>,
    },
    /// Write numbered text reports from a checkpoint ranking
    Report {
        /// Checkpoint sequence number (defaults to the latest on disk)
        #[arg(long)]
        checkpoint: Option<usize>,
    },
    /// Extract, rank and report in one go
    Run,
}

#[derive(Args, Debug)]
struct Overrides {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Raw corpus dump
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Directory for all artifacts
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Damping factor in (0, 1)
    #[arg(long, global = true)]
    damping: Option<f64>,

    /// Convergence tolerance on the step norm
    #[arg(long, global = true)]
    tolerance: Option<f64>,

    /// Safety bound on solver iterations
    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    /// Recognized section name (repeatable, replaces the configured set)
    #[arg(long = "section", global = true)]
    sections: Vec<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "proofrank=debug"
    } else {
        "proofrank=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: Overrides) -> Result<RankConfig> {
    // 1. Load from file or default
    let mut config = RankConfig::load_from_file(&args.config)?.unwrap_or_default();

    // 2. Override with CLI args
    if let Some(c) = args.corpus {
        config.corpus = c;
    }
    if let Some(o) = args.output_dir {
        config.output_dir = o;
    }
    if let Some(d) = args.damping {
        config.damping = d;
    }
    if let Some(t) = args.tolerance {
        config.tolerance = t;
    }
    if let Some(m) = args.max_iterations {
        config.max_iterations = m;
    }
    if !args.sections.is_empty() {
        config.sections = args.sections;
    }
    if args.verbose {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.overrides)?;
    init_tracing(config.verbose);

    let outcome = match cli.command {
        Command::Extract => proofrank::extract(&config).map(|_| ()),
        Command::Rank { max_checkpoints } => proofrank::rank(&config, max_checkpoints).map(|_| ()),
        Command::Report { checkpoint } => proofrank::report(&config, checkpoint).map(|_| ()),
        Command::Run => proofrank::run(&config),
    };

    if let Err(ref e) = outcome {
        tracing::error!("{:#}", e);
    }
    outcome
}
