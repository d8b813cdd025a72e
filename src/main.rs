// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use docxlate::app_config::{self, Config, TranslationProvider};
use docxlate::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "siliconflow")]
    SiliconFlow,
    #[value(name = "openai")]
    OpenAI,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::SiliconFlow => TranslationProvider::SiliconFlow,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate Word documents using AI providers (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for docxlate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory (defaults to the directory of the input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language code (e.g., 'zh-CN', 'fr', 'de')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Font applied to translated text
    #[arg(long)]
    font: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Draw progress bars
    #[arg(long)]
    show_progress: bool,
}

/// docxlate - Word document translation with AI
///
/// Translates every paragraph, table cell, header, footer and the title and
/// subject of a .docx file sentence by sentence through an OpenAI-compatible
/// chat completion API.
#[derive(Parser, Debug)]
#[command(name = "docxlate")]
#[command(version)]
#[command(about = "AI-powered Word document translation tool")]
#[command(long_about = "docxlate translates .docx documents using OpenAI-compatible AI providers.

EXAMPLES:
    docxlate report.docx                          # Translate using default config
    docxlate -f report.docx                       # Force overwrite existing output
    docxlate -t fr -o out/ report.docx            # Translate to French into out/
    docxlate -p openai -m gpt-4o-mini report.docx # Use specific provider and model
    docxlate --font \"SimSun\" report.docx          # Use another font for translated text
    docxlate --log-level debug /documents/        # Process entire directory with debug logging
    docxlate completions bash > docxlate.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. API keys are read from the environment variable
    named by the provider's api_key_env (SILICONFLOW_API_KEY by default).

SUPPORTED PROVIDERS:
    siliconflow - SiliconFlow API (default: Qwen/Qwen2-7B-Instruct)
    openai      - OpenAI API (requires API key)
    lmstudio    - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output directory (defaults to the directory of the input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language code (e.g., 'zh-CN', 'fr', 'de')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Font applied to translated text
    #[arg(long)]
    font: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Draw progress bars
    #[arg(long)]
    show_progress: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself accepts everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }

    // @writes: One colored, timestamped line
    fn write_line<W: Write>(out: &mut W, level: Level, args: &std::fmt::Arguments) -> std::io::Result<()> {
        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (color, tag) = Self::style_for_level(level);
        writeln!(out, "{}{} {} {}\x1B[0m", color, now, tag, args)
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // Progress bars draw on stderr, log lines go to stdout
            let _ = Self::write_line(&mut std::io::stdout().lock(), record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config or the command line says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "docxlate", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let translate_args = TranslateArgs {
                input_path,
                output: cli.output,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                target_language: cli.target_language,
                font: cli.font,
                config_path: cli.config_path,
                log_level: cli.log_level,
                show_progress: cli.show_progress,
            };
            run_translate(translate_args).await
        }
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(font) = &options.font {
        config.font_name = font.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(LevelFilter::from(&config_log_level));
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    config.validate()
        .context("Configuration validation failed")?;
    log::set_max_level(LevelFilter::from(&config.log_level));

    let controller = Controller::with_config(config)?
        .with_progress(options.show_progress);

    // Failures are logged; the process still exits normally
    if options.input_path.is_file() {
        let output_dir = options.output.clone().unwrap_or_else(|| {
            options.input_path.parent().unwrap_or(Path::new(".")).to_path_buf()
        });
        if let Err(e) = controller.run(options.input_path.clone(), output_dir, options.force_overwrite).await {
            error!("{:#}", e);
        }
    } else if options.input_path.is_dir() {
        if options.output.is_some() {
            log::warn!("--output is ignored for directories; outputs are written next to each input");
        }
        if let Err(e) = controller.run_folder(options.input_path.clone(), options.force_overwrite).await {
            error!("{:#}", e);
        }
    } else {
        error!("Input path does not exist: {:?}", options.input_path);
    }

    Ok(())
}
