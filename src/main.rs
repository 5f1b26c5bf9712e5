//! CLI entry point and command handlers for concept-lint.

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use concept_lint::assessment::Aspect;
use concept_lint::report::OutputFormat;

#[derive(Parser)]
#[command(name = "concept-lint")]
#[command(version)]
#[command(about = "Check concept implementations against their specifications", long_about = None)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every concept and report alignment issues
    Validate {
        /// Configuration file (default: .concept-lint/config.md)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Project root directory
        #[arg(long, value_name = "DIR")]
        project: Option<PathBuf>,
        /// Specification directory, relative to the project root
        #[arg(long, value_name = "DIR")]
        specs: Option<PathBuf>,
        /// Implementation directory, relative to the project root
        #[arg(long = "impl", value_name = "DIR")]
        implementations: Option<PathBuf>,
        /// Synchronization directory, relative to the project root
        #[arg(long, value_name = "DIR")]
        related: Option<PathBuf>,
        /// Directory for file reports
        #[arg(long, short, value_name = "DIR", default_value = concept_lint::paths::OUTPUT_DIR)]
        output: PathBuf,
        /// Output format: console, document, summary, structured or all
        #[arg(long, short, default_value = "console")]
        format: OutputFormat,
        /// Enable the assessment service
        #[arg(long)]
        ai: bool,
        /// Assessment API key (overrides CONCEPT_LINT_API_KEY)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Assessment model name
        #[arg(long)]
        model: Option<String>,
        /// Fail on warnings as well as errors
        #[arg(long)]
        strict: bool,
        /// Only validate this concept
        #[arg(long, value_name = "NAME")]
        concept: Option<String>,
    },
    /// Write a default configuration file
    Init {
        /// Project root directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        project: PathBuf,
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
    /// Assess one aspect of a concept with the assessment service
    Analyze {
        /// Concept name
        concept: String,
        /// purpose, actions, queries, state or independence
        aspect: Aspect,
        /// Configuration file (default: .concept-lint/config.md)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Project root directory
        #[arg(long, value_name = "DIR")]
        project: Option<PathBuf>,
        /// Assessment API key (overrides CONCEPT_LINT_API_KEY)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Assessment model name
        #[arg(long)]
        model: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            std::process::exit(1);
        }
    }
}

/// Run the selected command and return the process exit code.
fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Validate {
            config,
            project,
            specs,
            implementations,
            related,
            output,
            format,
            ai,
            api_key,
            model,
            strict,
            concept,
        } => {
            let options = cmd::validate::ValidateOptions {
                config,
                overrides: concept_lint::config::ConfigOverrides {
                    project_root: project,
                    specs,
                    implementations,
                    related,
                    enable_assessment: ai,
                    api_key,
                    model,
                    strict,
                },
                output,
                format,
                concept,
            };
            cmd::validate::cmd_validate(&options)
        }
        Commands::Init { project, force } => {
            cmd::init::cmd_init(&project, force)?;
            Ok(0)
        }
        Commands::Analyze {
            concept,
            aspect,
            config,
            project,
            api_key,
            model,
        } => {
            let overrides = concept_lint::config::ConfigOverrides {
                project_root: project,
                enable_assessment: true,
                api_key,
                model,
                ..Default::default()
            };
            cmd::analyze::cmd_analyze(&concept, aspect, config.as_deref(), &overrides)
        }
    }
}
