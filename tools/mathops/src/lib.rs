pub mod config;
pub mod engine;
pub mod errors;
pub mod generator;
pub mod log_retention;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod types;

use clap::{error::ErrorKind, CommandFactory, Parser};
use config::{load_config, AppConfig, CliOverrides, LoggingConfig};
use engine::{OperationEngine, Session};
use errors::MathOpsError;
use generator::{generate_random_operations, GenerationSummary};
use logging::{append_run_log, init_run_log, JsonlLogger};
use rand::rngs::StdRng;
use rand::SeedableRng;
use report::{format_timestamp, write_reports, ReportPaths};
use runtime::ProductionRuntime;
use serde_json::json;
use types::{OperationRecord, Operands};

#[derive(Debug, Clone, Parser)]
#[command(name = "mathops")]
#[command(about = "Runs sample and randomized arithmetic operations and writes run reports")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    #[arg(long)]
    pub output_dir: Option<std::path::PathBuf>,
    #[arg(long)]
    pub trials: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = false)]
    pub skip_demo: bool,
}

/// Everything one run produced, for callers that want more than an exit code.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub timestamp: String,
    pub paths: ReportPaths,
    pub session: Session,
    pub generation: GenerationSummary,
}

pub fn run() -> Result<i32, MathOpsError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| MathOpsError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, MathOpsError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(MathOpsError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        output_dir: cli.output_dir.clone(),
        trials: cli.trials,
        seed: cli.seed,
        skip_demo: cli.skip_demo,
    };
    let cfg = load_config(&overrides, cwd, runtime.file_system.as_ref())?;
    let _ = execute_run(&cfg, runtime)?;
    Ok(0)
}

/// Demonstration calls, randomized trials, then the three report files.
/// Replaces any previously installed run log with the one `cfg` describes.
pub fn execute_run(
    cfg: &AppConfig,
    runtime: &ProductionRuntime,
) -> Result<RunReport, MathOpsError> {
    init_run_log(run_logger(&cfg.logging));
    let terminal = runtime.terminal.as_ref();
    append_run_log(
        "info",
        "run.started",
        json!({
            "demo": cfg.demo.enabled,
            "trials": cfg.generator.trials,
            "seed": cfg.generator.seed,
            "output_dir": cfg.reports.output_dir.display().to_string(),
        }),
    );

    terminal.write_line("Math Operations Program")?;
    terminal.write_line(&"=".repeat(30))?;

    let mut engine = OperationEngine::new();
    if cfg.demo.enabled {
        terminal.write_line("Performing sample operations...")?;
        run_demonstration(&mut engine)?;
    }

    terminal.write_line("Generating random operations...")?;
    let mut rng = match cfg.generator.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generation = generate_random_operations(&mut engine, &mut rng, cfg.generator.trials);

    terminal.write_line("Generating files...")?;
    let timestamp = format_timestamp(runtime.clock.local_now());
    let paths = write_reports(
        engine.session(),
        runtime.file_system.as_ref(),
        &cfg.reports.output_dir,
        &timestamp,
    )?;
    terminal.write_line(&format!("Generated 3 files with timestamp: {timestamp}"))?;

    let session = engine.into_session();
    append_run_log(
        "info",
        "run.completed",
        json!({
            "timestamp": timestamp,
            "operations_performed": session.operations_performed(),
            "skipped_trials": generation.skipped,
        }),
    );
    terminal.write_line("Program completed!")?;

    Ok(RunReport {
        timestamp,
        paths,
        session,
        generation,
    })
}

fn run_logger(cfg: &LoggingConfig) -> Option<JsonlLogger> {
    cfg.path.as_ref().map(|path| {
        let mut logger = JsonlLogger::new(path);
        logger.max_payload_bytes = cfg.max_payload_bytes;
        logger.budget_bytes = cfg.budget_bytes;
        logger
    })
}

/// Fixed arguments for the demonstration, one call per operation.
pub fn demonstration_operands() -> [Operands; 7] {
    [
        Operands::Addition {
            a: 10.into(),
            b: 5.into(),
        },
        Operands::Subtraction {
            a: 20.into(),
            b: 7.into(),
        },
        Operands::Multiplication {
            a: 4.into(),
            b: 6.into(),
        },
        Operands::Division {
            a: 15.into(),
            b: 3.into(),
        },
        Operands::Power {
            base: 2.into(),
            exponent: 8.into(),
        },
        Operands::SquareRoot { number: 25.into() },
        Operands::Factorial { n: 5 },
    ]
}

/// None of the demonstration calls can fail a domain check, so an error here
/// is fatal.
pub fn run_demonstration(engine: &mut OperationEngine) -> Result<(), MathOpsError> {
    for operands in demonstration_operands() {
        let result = engine.perform(operands)?;
        append_run_log(
            "debug",
            "demo.operation.recorded",
            json!({
                "index": engine.session().operations_performed(),
                "record": OperationRecord { operands, result },
            }),
        );
    }
    Ok(())
}

pub fn render_help() -> String {
    Cli::command().render_long_help().to_string()
}
