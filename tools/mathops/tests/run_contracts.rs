use chrono::{NaiveDate, NaiveDateTime};
use mathops::config::AppConfig;
use mathops::errors::MathOpsError;
use mathops::runtime::{FakeClock, FakeFileSystem, FakeTerminal, ProductionRuntime};
use mathops::types::{Number, OperationKind};
use mathops::{execute_run, render_help, run_with_runtime};
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TIMESTAMP: &str = "20261016_090507";

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|date| date.and_hms_opt(9, 5, 7))
        .expect("valid time")
}

fn fake_runtime(fs: &FakeFileSystem, terminal: &FakeTerminal) -> ProductionRuntime {
    ProductionRuntime {
        clock: Arc::new(FakeClock::new(fixed_time())),
        file_system: Arc::new(fs.clone()),
        terminal: Arc::new(terminal.clone()),
    }
}

fn args(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

fn quiet_config(trials: usize, seed: u64) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.generator.trials = trials;
    cfg.generator.seed = Some(seed);
    cfg.reports.output_dir = PathBuf::from("/out");
    cfg.logging.path = None;
    cfg
}

fn summary_breakdown_total(summary: &str) -> u64 {
    summary
        .lines()
        .skip_while(|line| *line != "Operations breakdown:")
        .skip(1)
        .take_while(|line| line.starts_with("  "))
        .map(|line| {
            line.rsplit(": ")
                .next()
                .and_then(|count| count.parse::<u64>().ok())
                .expect("count")
        })
        .sum()
}

#[test]
fn cli_run_writes_three_consistent_reports() {
    let fs = FakeFileSystem::with_file(
        "/cfg.toml",
        "[generator]\nseed = 3\n\n[logging]\nenabled = false\n",
    );
    let terminal = FakeTerminal::new();
    let runtime = fake_runtime(&fs, &terminal);

    let code = run_with_runtime(
        &args(&["mathops", "--config", "/cfg.toml", "--output-dir", "/out"]),
        Path::new("/work"),
        &runtime,
    )
    .expect("run");
    assert_eq!(code, 0);

    let results = fs
        .file(format!("/out/math_results_{TIMESTAMP}.txt"))
        .expect("results");
    let statistics = fs
        .file(format!("/out/math_statistics_{TIMESTAMP}.json"))
        .expect("statistics");
    let summary = fs
        .file(format!("/out/math_summary_{TIMESTAMP}.txt"))
        .expect("summary");

    let stats: Value = serde_json::from_str(&statistics).expect("json");
    let total = stats["total_operations"].as_u64().expect("total");
    let counted: u64 = stats["operation_counts"]
        .as_object()
        .expect("counts")
        .values()
        .filter_map(Value::as_u64)
        .sum();
    let logged = results
        .lines()
        .filter(|line| line.starts_with("Operation "))
        .count() as u64;

    assert!((7..=22).contains(&total));
    assert_eq!(counted, total);
    assert_eq!(logged, total);
    assert_eq!(summary_breakdown_total(&summary), total);
    assert!(summary.contains(&format!("Total operations performed: {total}\n")));
}

#[test]
fn demonstration_sequence_produces_expected_results() {
    let fs = FakeFileSystem::default();
    let terminal = FakeTerminal::new();
    let runtime = fake_runtime(&fs, &terminal);

    let report = execute_run(&quiet_config(0, 1), &runtime).expect("run");

    let results = report
        .session
        .records()
        .iter()
        .map(|record| record.result)
        .collect::<Vec<_>>();
    assert_eq!(
        results,
        vec![
            Number::Int(15),
            Number::Int(13),
            Number::Int(24),
            Number::Float(5.0),
            Number::Int(256),
            Number::Float(5.0),
            Number::Int(120),
        ]
    );
    assert_eq!(report.session.operations_performed(), 7);
    assert_eq!(report.timestamp, TIMESTAMP);

    let stats: Value =
        serde_json::from_str(&fs.file(&report.paths.statistics).expect("stats")).expect("json");
    assert_eq!(stats["total_operations"], 7);
    for kind in OperationKind::ALL {
        assert_eq!(stats["operation_counts"][kind.as_str()], 1);
    }
    assert_eq!(stats["results_summary"]["min_result"].as_f64(), Some(5.0));
    assert_eq!(stats["results_summary"]["max_result"].as_i64(), Some(256));
}

#[test]
fn zero_operation_run_reports_null_extremes() {
    let fs = FakeFileSystem::default();
    let terminal = FakeTerminal::new();
    let runtime = fake_runtime(&fs, &terminal);
    let mut cfg = quiet_config(0, 1);
    cfg.demo.enabled = false;

    let report = execute_run(&cfg, &runtime).expect("run");

    let stats: Value =
        serde_json::from_str(&fs.file(&report.paths.statistics).expect("stats")).expect("json");
    assert_eq!(stats["total_operations"], 0);
    assert!(stats["results_summary"]["min_result"].is_null());
    assert!(stats["results_summary"]["max_result"].is_null());
    assert_eq!(stats["results_summary"]["average_result"], 0);
    assert_eq!(
        fs.file(&report.paths.results).expect("results"),
        format!("MATH OPERATIONS RESULTS\n{}\n\n", "=".repeat(50))
    );
}

#[test]
fn console_announces_each_phase_and_the_timestamp() {
    let fs = FakeFileSystem::default();
    let terminal = FakeTerminal::new();
    let runtime = fake_runtime(&fs, &terminal);

    execute_run(&quiet_config(5, 9), &runtime).expect("run");

    assert_eq!(
        terminal.written_lines(),
        vec![
            "Math Operations Program".to_string(),
            "=".repeat(30),
            "Performing sample operations...".to_string(),
            "Generating random operations...".to_string(),
            "Generating files...".to_string(),
            format!("Generated 3 files with timestamp: {TIMESTAMP}"),
            "Program completed!".to_string(),
        ]
    );
}

#[test]
fn randomized_trials_never_exceed_the_requested_count() {
    let fs = FakeFileSystem::default();
    let terminal = FakeTerminal::new();
    let runtime = fake_runtime(&fs, &terminal);
    let mut cfg = quiet_config(40, 77);
    cfg.demo.enabled = false;

    let report = execute_run(&cfg, &runtime).expect("run");

    assert_eq!(report.generation.attempted, 40);
    assert!(report.session.records().len() <= 40);
    assert_eq!(
        report.session.operations_performed() as usize,
        report.session.records().len()
    );
}

#[test]
fn report_write_failure_is_fatal() {
    let fs = FakeFileSystem::default();
    fs.set_fail_next(MathOpsError::Io("permission denied".to_string()));
    let terminal = FakeTerminal::new();
    let runtime = fake_runtime(&fs, &terminal);

    let err = execute_run(&quiet_config(1, 1), &runtime).expect_err("must fail");
    assert!(matches!(err, MathOpsError::Io(_)));
    assert!(!terminal
        .written_lines()
        .contains(&"Program completed!".to_string()));
}

#[test]
fn unknown_flags_are_cli_errors() {
    let fs = FakeFileSystem::default();
    let terminal = FakeTerminal::new();
    let runtime = fake_runtime(&fs, &terminal);

    let err = run_with_runtime(&args(&["mathops", "--bogus"]), Path::new("/"), &runtime)
        .expect_err("rejected");
    assert!(matches!(err, MathOpsError::Cli(_)));
    assert!(fs.written_paths().is_empty());
}

#[test]
fn help_lists_run_flags() {
    let help = render_help();
    for flag in ["--config", "--output-dir", "--trials", "--seed", "--skip-demo"] {
        assert!(help.contains(flag), "missing {flag}");
    }
}
