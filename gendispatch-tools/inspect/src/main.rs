//! gendispatch Inspector Binary
//!
//! Run with: `gendispatch-inspect [OPTIONS] <COMMAND>`

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gendispatch_inspect::demo::Game;
use gendispatch_inspect::report::{render_check, render_demo, render_info, render_resolve};
use gendispatch_inspect::{Config, OutputFormat, Scenario, Workspace};

#[derive(Parser)]
#[command(name = "gendispatch-inspect")]
#[command(about = "Inspect multiple dispatch in gendispatch scenarios")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    format: Option<OutputFormat>,

    /// Configuration file path (TOML or JSON)
    #[arg(short = 'c', long, global = true, env = "GENDISPATCH_INSPECT_CONFIG")]
    config: Option<PathBuf>,

    /// Stop `check` at the first failing query
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Prefix classes with the parameter they were dispatched on
    #[arg(long, global = true)]
    qualified: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the candidate keys a call walks, most specific first
    Info {
        /// Scenario file
        scenario: PathBuf,
        /// Generic function name
        function: String,
        /// Classes at the dispatch positions
        #[arg(required = true)]
        types: Vec<String>,
    },
    /// Print the label a call returns
    Resolve {
        /// Scenario file
        scenario: PathBuf,
        /// Generic function name
        function: String,
        /// Classes at the dispatch positions
        #[arg(required = true)]
        types: Vec<String>,
    },
    /// Evaluate every query in a scenario
    Check {
        /// Scenario file
        scenario: PathBuf,
    },
    /// Print the rock-paper-scissors table
    Demo,
    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Commands::Config => {
            let mut config = Config::default();
            if let Some(format) = cli.format {
                config.format = format;
            }
            println!("{}", config.render()?);
        }
        Commands::Demo => {
            let config = build_config(&cli)?;
            let table = Game::new()?.table()?;
            println!("{}", render_demo(&table, &config)?);
        }
        Commands::Info {
            scenario,
            function,
            types,
        } => {
            let config = build_config(&cli)?;
            let (_, workspace) = load(scenario)?;
            let order = workspace.info(function, types)?;
            let signature = workspace.function(function)?.signature();
            println!("{}", render_info(signature, &order, &config)?);
        }
        Commands::Resolve {
            scenario,
            function,
            types,
        } => {
            let config = build_config(&cli)?;
            let (_, workspace) = load(scenario)?;
            let label = workspace.resolve(function, types)?;
            println!("{}", render_resolve(function, types, &label, &config)?);
        }
        Commands::Check { scenario } => {
            let config = build_config(&cli)?;
            let (scenario, workspace) = load(scenario)?;
            let reports = workspace.check(&scenario.queries, &config);
            println!("{}", render_check(&reports, &config)?);
            if reports.iter().any(|r| !r.passed) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path.display()))?
    } else {
        Config::default()
    };

    // Override with CLI options
    if let Some(format) = cli.format {
        config.format = format;
    }
    config.fail_fast |= cli.fail_fast;
    config.qualified_names |= cli.qualified;

    debug!(?config, "effective configuration");
    Ok(config)
}

fn load(path: &Path) -> Result<(Scenario, Workspace)> {
    let scenario = Scenario::from_file(path)?;
    let workspace = Workspace::build(&scenario)
        .with_context(|| format!("Failed to build scenario: {}", path.display()))?;
    Ok((scenario, workspace))
}
