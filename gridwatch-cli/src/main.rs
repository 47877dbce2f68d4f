//! Gridwatch CLI - electricity theft risk assessment over meter batches

#![deny(warnings)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use gridwatch_core::classifier::LinearModel;
use gridwatch_core::config;
use gridwatch_core::{
    assess_csv, render_json, render_text, AnalysisPolicy, AssessOptions, Error, LocationResolver,
    ScoringPolicy,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridwatch")]
#[command(about = "Electricity theft risk assessment for utility meter batches")]
#[command(version = env!("GRIDWATCH_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a batch of meters from a CSV file
    Assess {
        /// Path to the meters CSV
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Scoring policy (overrides config file)
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Path to the classifier artifact (needed for --policy probability)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Path to the location table CSV
        #[arg(long)]
        locations: Option<PathBuf>,

        /// Show only the top N results (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Minimum score to show (overrides config file)
        #[arg(long)]
        min_score: Option<f64>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show contributing factors per meter (text format only)
        #[arg(long)]
        explain: bool,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running an assessment
    Validate {
        /// Path to config file (default: auto-discover)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PolicyArg {
    Heuristic,
    Probability,
}

impl From<PolicyArg> for ScoringPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Heuristic => ScoringPolicy::Heuristic,
            PolicyArg::Probability => ScoringPolicy::Probability,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            path,
            format,
            policy,
            model,
            locations,
            top,
            min_score,
            config,
            explain,
        } => run_assess(AssessArgs {
            path,
            format,
            policy,
            model,
            locations,
            top,
            min_score,
            config,
            explain,
        }),
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => config_validate(path),
            ConfigAction::Show { path } => config_show(path),
        },
    }
}

struct AssessArgs {
    path: PathBuf,
    format: OutputFormat,
    policy: Option<PolicyArg>,
    model: Option<PathBuf>,
    locations: Option<PathBuf>,
    top: Option<usize>,
    min_score: Option<f64>,
    config: Option<PathBuf>,
    explain: bool,
}

fn run_assess(args: AssessArgs) -> anyhow::Result<()> {
    if !args.path.exists() {
        anyhow::bail!("path does not exist: {}", args.path.display());
    }

    let root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&root, args.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(config_path) = &resolved.config_path {
        tracing::info!(path = %config_path.display(), "using config");
    }

    // CLI flags override config file values.
    let policy_choice: ScoringPolicy = args.policy.map(Into::into).unwrap_or(resolved.policy);
    let model_path = args.model.or(resolved.model_path);
    let locations_path = args.locations.or(resolved.locations_path);
    let options = AssessOptions {
        min_score: args.min_score.or(resolved.min_score),
        top_n: args.top.or(resolved.top_n),
    };

    // Startup resources load up front; a failure here aborts the run.
    let resolver = match &locations_path {
        Some(path) => LocationResolver::from_csv_path(path)?,
        None => LocationResolver::empty(),
    };

    let model = match policy_choice {
        ScoringPolicy::Probability => {
            let path = model_path.as_ref().ok_or_else(|| {
                anyhow::anyhow!(
                    "the probability policy requires a classifier artifact (--model or `model` in config)"
                )
            })?;
            Some(LinearModel::from_path(path)?)
        }
        ScoringPolicy::Heuristic => None,
    };
    let analysis_policy = match &model {
        Some(classifier) => AnalysisPolicy::Probability { classifier },
        None => AnalysisPolicy::Heuristic,
    };

    match assess_csv(
        &args.path,
        &resolver,
        &analysis_policy,
        &resolved.thresholds,
        &options,
    ) {
        Ok(report) => {
            match args.format {
                OutputFormat::Text => print!("{}", render_text(&report, args.explain)),
                OutputFormat::Json => println!("{}", render_json(&report)),
            }
            Ok(())
        }
        Err(Error::EmptyStore) => {
            tracing::warn!("no meters to analyze");
            println!("No data: add meters before running an analysis.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn config_validate(path: Option<PathBuf>) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    match &path {
        Some(explicit) => {
            config::load_config_file(explicit)?;
            println!("Config OK: {}", explicit.display());
        }
        None => match config::discover_config(&root)? {
            Some((_, found)) => println!("Config OK: {}", found.display()),
            None => println!("No config file found; defaults apply."),
        },
    }
    Ok(())
}

fn config_show(path: Option<PathBuf>) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&root, path.as_deref())?;
    println!("{:#?}", resolved);
    Ok(())
}
