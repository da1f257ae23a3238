use assert_cmd::cargo::cargo_bin_cmd;
use std::path::{Path, PathBuf};

fn report_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = std::fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("math_"))
        })
        .collect::<Vec<_>>();
    files.sort();
    files
}

#[test]
fn help_lists_run_flags() {
    let mut cmd = cargo_bin_cmd!("mathops");
    cmd.arg("--help");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");

    assert!(stdout.contains("--output-dir"));
    assert!(stdout.contains("--seed"));
}

#[test]
fn bare_run_writes_reports_into_the_working_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("mathops");
    cmd.current_dir(temp.path());
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");

    assert!(stdout.starts_with("Math Operations Program\n"));
    assert!(stdout.contains("Generated 3 files with timestamp: "));
    assert!(stdout.trim_end().ends_with("Program completed!"));

    let files = report_files(temp.path());
    assert_eq!(files.len(), 3);
    let names = files
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
        .collect::<Vec<_>>();
    assert!(names[0].starts_with("math_results_") && names[0].ends_with(".txt"));
    assert!(names[1].starts_with("math_statistics_") && names[1].ends_with(".json"));
    assert!(names[2].starts_with("math_summary_") && names[2].ends_with(".txt"));
    let token = names[0]
        .trim_start_matches("math_results_")
        .trim_end_matches(".txt");
    assert_eq!(token.len(), "YYYYmmdd_HHMMSS".len());
    assert!(names[1].contains(token) && names[2].contains(token));

    let run_log =
        std::fs::read_to_string(temp.path().join(".cache/mathops/run.jsonl")).expect("run log");
    assert!(run_log.contains("\"event_type\":\"run.started\""));
    assert!(run_log.contains("\"event_type\":\"run.completed\""));
}

#[test]
fn seeded_runs_into_an_output_dir_are_reproducible() {
    let temp = tempfile::tempdir().expect("tempdir");
    let first = temp.path().join("first");
    let second = temp.path().join("second");

    for dir in [&first, &second] {
        let mut cmd = cargo_bin_cmd!("mathops");
        cmd.current_dir(temp.path())
            .arg("--seed")
            .arg("42")
            .arg("--trials")
            .arg("25")
            .arg("--output-dir")
            .arg(dir);
        cmd.assert().success();
    }

    let read_stats = |dir: &Path| {
        let files = report_files(dir);
        std::fs::read_to_string(&files[1]).expect("statistics")
    };
    assert_eq!(read_stats(first.as_path()), read_stats(second.as_path()));
}

#[test]
fn missing_config_exits_nonzero() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("mathops");
    cmd.current_dir(temp.path())
        .arg("--config")
        .arg(temp.path().join("missing.toml"));
    cmd.assert().failure();
    assert!(report_files(temp.path()).is_empty());
}
