use crate::engine::Session;
use crate::errors::MathOpsError;
use crate::logging::append_run_log;
use crate::runtime::FileSystem;
use crate::types::{Number, OperationKind, OperationRecord, Operands};
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::json;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const RESULTS_RULE_WIDTH: usize = 50;
const ENTRY_RULE_WIDTH: usize = 30;
const SUMMARY_RULE_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub results: PathBuf,
    pub statistics: PathBuf,
    pub summary: PathBuf,
}

impl ReportPaths {
    pub fn in_dir(dir: &Path, timestamp: &str) -> Self {
        Self {
            results: dir.join(format!("math_results_{timestamp}.txt")),
            statistics: dir.join(format!("math_statistics_{timestamp}.json")),
            summary: dir.join(format!("math_summary_{timestamp}.txt")),
        }
    }
}

/// Per-operation occurrence counts in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationCounts(Vec<(OperationKind, u64)>);

impl OperationCounts {
    pub fn from_records(records: &[OperationRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            counts.bump(record.kind());
        }
        counts
    }

    fn bump(&mut self, kind: OperationKind) {
        match self.0.iter_mut().find(|(seen, _)| *seen == kind) {
            Some((_, count)) => *count += 1,
            None => self.0.push((kind, 1)),
        }
    }

    pub fn get(&self, kind: OperationKind) -> u64 {
        self.0
            .iter()
            .find(|(seen, _)| *seen == kind)
            .map_or(0, |(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OperationKind, u64)> + '_ {
        self.0.iter().copied()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

impl Serialize for OperationCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(kind, count)| (kind.as_str(), count)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsSummary {
    pub min_result: Option<Number>,
    pub max_result: Option<Number>,
    pub total_sum: Number,
    pub average_result: Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_operations: u64,
    pub operation_counts: OperationCounts,
    pub results_summary: ResultsSummary,
}

/// Aggregates records into counts and result extremes. Non-finite results are
/// left out of min/max/sum; the average divides by `operations_performed`.
pub fn compute_statistics(records: &[OperationRecord], operations_performed: u64) -> Statistics {
    let mut min_result: Option<Number> = None;
    let mut max_result: Option<Number> = None;
    let mut total_sum = Number::Int(0);

    for record in records {
        let Some(value) = record.result.finite_f64() else {
            continue;
        };
        if min_result.map_or(true, |current| value < current.as_f64()) {
            min_result = Some(record.result);
        }
        if max_result.map_or(true, |current| value > current.as_f64()) {
            max_result = Some(record.result);
        }
        total_sum = total_sum + record.result;
    }

    let average_result = if operations_performed > 0 {
        Number::Float(total_sum.as_f64() / operations_performed as f64)
    } else {
        Number::Int(0)
    };

    Statistics {
        total_operations: operations_performed,
        operation_counts: OperationCounts::from_records(records),
        results_summary: ResultsSummary {
            min_result,
            max_result,
            total_sum,
            average_result,
        },
    }
}

pub fn render_statistics_json(statistics: &Statistics) -> Result<String, MathOpsError> {
    serde_json::to_string_pretty(statistics).map_err(|e| MathOpsError::Serialize(e.to_string()))
}

pub fn render_detailed_log(records: &[OperationRecord]) -> String {
    let mut out = String::new();
    out.push_str("MATH OPERATIONS RESULTS\n");
    out.push_str(&"=".repeat(RESULTS_RULE_WIDTH));
    out.push_str("\n\n");

    for (idx, record) in records.iter().enumerate() {
        out.push_str(&format!("Operation {}:\n", idx + 1));
        out.push_str(&format!("  Type: {}\n", record.kind()));
        out.push_str(&format!("  {}\n", describe_operands(&record.operands)));
        out.push_str(&format!("  Result: {}\n", record.result));
        out.push_str(&"-".repeat(ENTRY_RULE_WIDTH));
        out.push('\n');
    }

    out
}

fn describe_operands(operands: &Operands) -> String {
    match operands {
        Operands::SquareRoot { number } => format!("Input: {number}"),
        Operands::Factorial { n } => format!("Input: {n}"),
        Operands::Power { base, exponent } => format!("Base: {base}, Exponent: {exponent}"),
        Operands::Addition { a, b }
        | Operands::Subtraction { a, b }
        | Operands::Multiplication { a, b }
        | Operands::Division { a, b } => format!("A: {a}, B: {b}"),
    }
}

pub fn render_summary(records: &[OperationRecord], operations_performed: u64) -> String {
    let rule = "=".repeat(SUMMARY_RULE_WIDTH);
    let mut out = String::new();
    out.push_str("MATH OPERATIONS SUMMARY\n");
    out.push_str(&rule);
    out.push_str("\n\n");
    out.push_str(&format!(
        "Total operations performed: {operations_performed}\n\n"
    ));

    out.push_str("Operations breakdown:\n");
    for (kind, count) in OperationCounts::from_records(records).iter() {
        out.push_str(&format!("  {}: {count}\n", kind.label()));
    }

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out.push_str("Program completed successfully!\n");
    out
}

pub fn format_timestamp(now: NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Writes the detailed log, statistics and summary for `session` into `dir`,
/// one file after another.
pub fn write_reports(
    session: &Session,
    fs: &dyn FileSystem,
    dir: &Path,
    timestamp: &str,
) -> Result<ReportPaths, MathOpsError> {
    fs.create_dir_all(dir)?;
    let paths = ReportPaths::in_dir(dir, timestamp);
    let records = session.records();
    let performed = session.operations_performed();

    write_report(fs, &paths.results, &render_detailed_log(records))?;
    let statistics = compute_statistics(records, performed);
    write_report(fs, &paths.statistics, &render_statistics_json(&statistics)?)?;
    write_report(fs, &paths.summary, &render_summary(records, performed))?;

    Ok(paths)
}

fn write_report(fs: &dyn FileSystem, path: &Path, contents: &str) -> Result<(), MathOpsError> {
    fs.write_string(path, contents)?;
    append_run_log(
        "info",
        "report.file.written",
        json!({
            "path": path.display().to_string(),
            "bytes": contents.len(),
        }),
    );
    Ok(())
}
