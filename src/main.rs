// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use dirtrans::app_config::{self, Config, ProgressStyleKind, TranslationProvider};
use dirtrans::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    OpenAI,
    Anthropic,
    Ollama,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for ProgressStyleKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProgressStyle {
    Log,
    Bar,
    Off,
}

impl From<CliProgressStyle> for ProgressStyleKind {
    fn from(style: CliProgressStyle) -> Self {
        match style {
            CliProgressStyle::Log => ProgressStyleKind::Log,
            CliProgressStyle::Bar => ProgressStyleKind::Bar,
            CliProgressStyle::Off => ProgressStyleKind::Off,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate folder names and write one CSV per label (default command)
    Run(RunArgs),

    /// Show or clear the saved checkpoint for the configured roots
    Checkpoint(CheckpointArgs),

    /// Generate shell completions for dirtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options that override the configuration file
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Root of the tree holding the text files
    #[arg(short, long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Root for the CSV files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Extension of the files to pick up (e.g. 'txt')
    #[arg(short, long)]
    extension: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the selected provider
    #[arg(long, env = "DIRTRANS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Index into the sorted folder list to start from
    #[arg(short, long, value_name = "INDEX", conflicts_with = "resume")]
    resume_from: Option<usize>,

    /// Start from the saved checkpoint instead of an index
    #[arg(long)]
    resume: bool,

    /// Save a checkpoint after every step
    #[arg(long)]
    checkpoint: bool,

    /// How progress is shown while running
    #[arg(long, value_enum)]
    progress: Option<CliProgressStyle>,
}

#[derive(Args, Debug, Clone)]
struct CheckpointArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Delete the checkpoint instead of showing it
    #[arg(long)]
    clear: bool,
}

/// dirtrans - translate folder names into CSV collections
///
/// Groups text files by the folder they live in, translates every folder name
/// with an LLM and writes one CSV per translated label.
#[derive(Parser, Debug)]
#[command(name = "dirtrans")]
#[command(version)]
#[command(about = "Translate folder names with an LLM and collect their files into CSVs")]
#[command(long_about = "dirtrans groups text files by their parent folder, translates each folder name into an ASCII label and writes one CSV (filename,content) per label.

EXAMPLES:
    dirtrans -i data/raw -o data/csv                 # Run with conf.json defaults
    dirtrans -i data/raw -o data/csv -r 120          # Start at folder index 120
    dirtrans run --checkpoint -i data/raw -o data/csv
    dirtrans run --resume -i data/raw -o data/csv    # Continue from the saved checkpoint
    dirtrans -p ollama -m llama3.2:3b -t en -i in -o out
    dirtrans checkpoint -i data/raw -o data/csv      # Show the saved checkpoint
    dirtrans completions bash > dirtrans.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. Command line options override the file.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key, default: gpt-4o-mini)
    anthropic - Anthropic Claude API (requires API key)
    ollama    - Local Ollama server (default: llama3.2:3b)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::decoration(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dirtrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Checkpoint(args)) => run_checkpoint(args).await,
        Some(Commands::Run(args)) => run_pipeline(args).await,
        None => run_pipeline(cli.run).await,
    }
}

async fn run_pipeline(options: RunArgs) -> Result<()> {
    let mut config = load_config(&options.config)?;

    if let Some(index) = options.resume_from {
        config.resume_index = index;
    }
    if options.checkpoint {
        config.checkpoint.enabled = true;
    }
    if let Some(style) = options.progress {
        config.progress.style = style.into();
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run(options.resume).await?;

    info!("Done: {}", summary);
    Ok(())
}

async fn run_checkpoint(options: CheckpointArgs) -> Result<()> {
    let config = load_config(&options.config)?;
    let controller = Controller::with_config(config)?;

    if options.clear {
        if controller.clear_checkpoint().await? {
            info!("Checkpoint cleared");
        } else {
            info!("No checkpoint saved for these roots");
        }
        return Ok(());
    }

    match controller.checkpoint_status().await? {
        Some((record, labels)) => {
            info!("Checkpoint: {}", record);
            info!("{} labels written", labels.len());
            for label in labels {
                info!("  {} -> {}", label.label, label.location);
            }
        }
        None => info!("No checkpoint saved for these roots"),
    }
    info!("Database: {}", controller.checkpoint_stats()?);
    Ok(())
}

/// Load or create the configuration file, then apply command line overrides
fn load_config(options: &ConfigArgs) -> Result<Config> {
    // Apply the command line level right away so config loading is logged with it
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let mut config = if Path::new(&options.config_path).exists() {
        Config::from_file(&options.config_path)?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            options.config_path.display()
        );
        let config = Config::default();
        config.save(&options.config_path)?;
        config
    };

    if let Some(input) = &options.input {
        config.input_root = input.clone();
    }
    if let Some(output) = &options.output {
        config.output_root = output.clone();
    }
    if let Some(extension) = &options.extension {
        config.file_extension = extension.clone();
    }
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }

    log::set_max_level(LevelFilter::from(&config.log_level));
    Ok(config)
}
