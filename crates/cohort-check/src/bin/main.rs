//! Cohort expression checker command-line interface

use clap::Parser;
use cohort_check::cli::output::{self, ColorMode, OutputFormat};
use cohort_check::cli::validate::{self, ValidateConfig};
use std::path::PathBuf;

/// Check an OHDSI cohort expression for likely mistakes
#[derive(Parser)]
#[command(name = "cohort-check")]
#[command(author, version, about = "Static checks for OHDSI cohort expressions", long_about = None)]
struct Cli {
    /// Cohort expression JSON file
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Checker configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Severity override, e.g. MISSING_EXIT_CRITERIA=ERROR
    #[arg(long = "severity", value_name = "KIND=LEVEL")]
    severity: Vec<String>,

    /// Concept metadata file (JSON array of concepts)
    #[arg(long)]
    concepts: Option<PathBuf>,

    /// Evaluate rules concurrently
    #[arg(long)]
    parallel: bool,

    /// Strict mode (warnings as errors)
    #[arg(short, long)]
    strict: bool,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    output::setup_colors(cli.color, cli.output.is_none());

    let config = ValidateConfig {
        input: cli.input,
        output: cli.output,
        format: cli.format,
        config_file: cli.config,
        overrides: cli.severity,
        concepts: cli.concepts,
        parallel: cli.parallel,
        strict: cli.strict,
    };

    match validate::validate(&config) {
        Ok(outcome) if outcome.passed => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}
