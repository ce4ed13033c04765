//! Frametest CLI: run frame-driven UI fixtures
//!
//! ## Usage
//!
//! ```bash
//! frametest list                          # Show fixtures and tests
//! frametest run                           # Run every test
//! frametest run Menu add_score -v         # One test, with phase detail
//! frametest run Level --format json       # JSON run reports
//! frametest config --config engine.yaml   # Effective configuration
//! ```

use clap::Parser;
use frametest::logging::init_tracing;
use frametest::EngineConfig;
use frametest_cli::{
    registry, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs,
    OutputFormat, ProgressReporter, RunArgs, TestRunner, Verbosity,
};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity.log_level(), cli.log_json);

    match cli.command {
        Commands::List => {
            run_list();
            Ok(())
        }
        Commands::Run(args) => run_tests(config, &args),
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    let color: ColorChoice = cli.color.into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn load_engine_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    let base = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    Ok(base.with_env_overrides()?)
}

fn run_list() {
    for (name, entry) in registry() {
        println!("{name}");
        for test in entry.tests {
            println!("  {test}");
        }
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let engine = load_engine_config(args.config.as_deref())?;
    print!("{}", engine.to_yaml()?);
    Ok(())
}

fn run_tests(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    if args.fps == 0 {
        return Err(CliError::invalid_argument("--fps must be at least 1"));
    }
    let engine = load_engine_config(args.config.as_deref())?;
    let selection = TestRunner::select(args.fixture.as_deref(), args.test.as_deref())?;
    let runner = TestRunner::new(engine, args.fps, args.max_frames);
    let format: OutputFormat = args.format.into();

    let mut reporter = ProgressReporter::new(
        config.color.should_color(),
        config.verbosity.is_quiet() || format == OutputFormat::Json,
    );
    reporter.start_progress(selection.len() as u64, "running");

    let mut reports = Vec::with_capacity(selection.len());
    let detailed = config.verbosity.is_verbose();
    for (entry, test) in &selection {
        if detailed && format == OutputFormat::Text {
            reporter.info(&format!("Running {}::{test}", entry.name));
        }
        let report = runner.run(entry, test)?;
        if format == OutputFormat::Text {
            reporter.report(&report, detailed);
        }
        reporter.increment(&format!("{}::{test}", entry.name));
        reports.push(report);
    }
    reporter.finish();

    let failed = reports.iter().filter(|r| !r.passed()).count();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => reporter.summary(reports.len() - failed, failed),
    }

    if failed > 0 {
        return Err(CliError::TestsFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}
