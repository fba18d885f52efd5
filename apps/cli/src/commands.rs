//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use autodict_core::assembler::validate_dictionary;
use autodict_core::enrichment::SubprocessSource;
use autodict_core::pipeline::{self, BuildResult, ProgressReporter};
use autodict_shared::{AppConfig, CommandName, PipelineConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// autodict: catalog the commands installed on this machine.
#[derive(Parser)]
#[command(
    name = "autodict",
    version,
    about = "Generate a JSON dictionary of installed commands from their manual pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scan, describe and write the full dictionary.
    Build(BuildArgs),

    /// List discovered commands without describing them.
    List {
        /// Directory to scan (repeatable). Replaces the configured list.
        #[arg(long = "dir")]
        dirs: Vec<PathBuf>,
    },

    /// Describe a single command and print its entry.
    Show {
        /// Command name.
        name: String,
    },

    /// Validate an existing dictionary file.
    Check {
        /// Path to the dictionary JSON.
        path: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for `autodict build`.
#[derive(Args, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Output file (defaults to the configured output).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Directory to scan (repeatable). Replaces the configured list.
    #[arg(long = "dir")]
    pub dirs: Vec<PathBuf>,

    /// Maximum commands described at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-lookup timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "autodict=info",
        1 => "autodict=debug",
        _ => "autodict=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => cmd_build(&args).await,
        Command::List { dirs } => cmd_list(dirs),
        Command::Show { name } => cmd_show(&name).await,
        Command::Check { path } => cmd_check(&path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Merge command-line overrides into the loaded configuration.
fn pipeline_config(config: &AppConfig, args: &BuildArgs) -> PipelineConfig {
    let mut pipeline = PipelineConfig::from(config);
    if let Some(out) = &args.out {
        pipeline.output = out.clone();
    }
    if !args.dirs.is_empty() {
        pipeline.directories = args.dirs.clone();
    }
    if let Some(concurrency) = args.concurrency {
        pipeline.concurrency = concurrency;
    }
    if let Some(secs) = args.timeout_secs {
        pipeline.timeout = Duration::from_secs(secs);
    }
    pipeline
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(args: &BuildArgs) -> Result<()> {
    let config = load_config()?;
    let pipeline = pipeline_config(&config, args);

    info!(
        output = %pipeline.output.display(),
        directories = pipeline.directories.len(),
        concurrency = pipeline.concurrency,
        "building dictionary"
    );

    let source = Arc::new(SubprocessSource::from_config(&pipeline));
    let reporter = CliProgress::new();

    let result = pipeline::build_dictionary(&pipeline, source, &reporter).await?;

    println!(
        "Generated {} entries in {}",
        result.emitted,
        result.output.path.display()
    );
    println!(
        "  Discovered: {}  Excluded: {}  Failed: {}  Time: {:.1}s",
        result.discovered,
        result.excluded,
        result.failed,
        result.elapsed.as_secs_f64()
    );

    Ok(())
}

fn cmd_list(dirs: Vec<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let mut pipeline = PipelineConfig::from(&config);
    if !dirs.is_empty() {
        pipeline.directories = dirs;
    }

    let discovery = pipeline::list_commands(&pipeline);
    for name in &discovery.commands {
        println!("{name}");
    }
    for skipped in &discovery.skipped {
        eprintln!("skipped {}: {:?}", skipped.path.display(), skipped.reason);
    }
    println!("{} commands", discovery.len());

    Ok(())
}

async fn cmd_show(name: &str) -> Result<()> {
    let config = load_config()?;
    let pipeline = PipelineConfig::from(&config);
    pipeline.validate()?;

    let source = SubprocessSource::from_config(&pipeline);
    let name = CommandName::new(name);

    match pipeline::describe_command(&source, &name, &pipeline.tags).await {
        Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
        None => println!("{name}: no description found"),
    }

    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let collection = validate_dictionary(path)?;
    println!("{}: {} valid entries", path.display(), collection.len());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Console line printed once discovery finishes.
fn discovered_line(count: usize) -> String {
    format!("Discovered {count} commands. Fetching descriptions...")
}

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn discovered(&self, count: usize) {
        let line = discovered_line(count);
        self.spinner.suspend(|| println!("{line}"));
    }

    fn command_enriched(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Describing [{current}/{total}] {name}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
