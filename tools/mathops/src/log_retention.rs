use crate::errors::MathOpsError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

struct LogFile {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

/// Deletes the oldest `.jsonl` files in `dir` until the remaining ones fit in
/// `budget_bytes`. Returns the removed paths, oldest first.
pub fn prune_run_logs(dir: &Path, budget_bytes: u64) -> Result<Vec<PathBuf>, MathOpsError> {
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| MathOpsError::Io(e.to_string()))? {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        logs.push(LogFile {
            path,
            len: meta.len(),
            modified: meta.modified().ok(),
        });
    }
    logs.sort_by_key(|log| log.modified);

    let mut total: u64 = logs.iter().map(|log| log.len).sum();
    let mut removed = Vec::new();
    for log in logs {
        if total <= budget_bytes {
            break;
        }
        fs::remove_file(&log.path).map_err(|e| MathOpsError::Io(e.to_string()))?;
        total = total.saturating_sub(log.len);
        removed.push(log.path);
    }
    Ok(removed)
}
