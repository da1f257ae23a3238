use crate::errors::MathOpsError;
use crate::logging::{DEFAULT_DISK_BUDGET_BYTES, DEFAULT_MAX_PAYLOAD_BYTES};
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trials run by the binary when neither config nor flags say otherwise.
pub const DEFAULT_RUN_TRIALS: usize = 15;

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub skip_demo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub demo: DemoConfig,
    pub generator: GeneratorConfig,
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub trials: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportsConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            demo: DemoConfig { enabled: true },
            generator: GeneratorConfig {
                trials: DEFAULT_RUN_TRIALS,
                seed: None,
            },
            reports: ReportsConfig {
                output_dir: PathBuf::from("."),
            },
            logging: LoggingConfig {
                path: Some(PathBuf::from(".cache/mathops/run.jsonl")),
                max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
                budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialAppConfig {
    demo: Option<PartialDemoConfig>,
    generator: Option<PartialGeneratorConfig>,
    reports: Option<PartialReportsConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialDemoConfig {
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialGeneratorConfig {
    trials: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialReportsConfig {
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLoggingConfig {
    path: Option<PathBuf>,
    enabled: Option<bool>,
    max_payload_bytes: Option<usize>,
    budget_bytes: Option<u64>,
}

/// Defaults, then the TOML file if one was given, then CLI flags. Relative
/// paths resolve against `process_cwd`.
pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<AppConfig, MathOpsError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| MathOpsError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;

    cfg.reports.output_dir = absolutize_path(process_cwd, &cfg.reports.output_dir);
    cfg.logging.path = cfg
        .logging
        .path
        .take()
        .map(|path| absolutize_path(process_cwd, &path));
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(demo) = partial.demo {
        if let Some(enabled) = demo.enabled {
            cfg.demo.enabled = enabled;
        }
    }

    if let Some(generator) = partial.generator {
        if let Some(trials) = generator.trials {
            cfg.generator.trials = trials;
        }
        if let Some(seed) = generator.seed {
            cfg.generator.seed = Some(seed);
        }
    }

    if let Some(reports) = partial.reports {
        if let Some(output_dir) = reports.output_dir {
            cfg.reports.output_dir = output_dir;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(path) = logging.path {
            cfg.logging.path = Some(path);
        }
        if logging.enabled == Some(false) {
            cfg.logging.path = None;
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
        if let Some(value) = logging.budget_bytes {
            cfg.logging.budget_bytes = value;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(output_dir) = &overrides.output_dir {
        cfg.reports.output_dir = output_dir.clone();
    }
    if let Some(trials) = overrides.trials {
        cfg.generator.trials = trials;
    }
    if let Some(seed) = overrides.seed {
        cfg.generator.seed = Some(seed);
    }
    if overrides.skip_demo {
        cfg.demo.enabled = false;
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), MathOpsError> {
    if cfg.reports.output_dir.as_os_str().is_empty() {
        return Err(MathOpsError::InvalidConfig(
            "reports.output_dir must not be empty".to_string(),
        ));
    }

    if cfg.logging.max_payload_bytes == 0 {
        return Err(MathOpsError::InvalidConfig(
            "logging.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    if cfg
        .logging
        .path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        return Err(MathOpsError::InvalidConfig(
            "logging.path must not be empty".to_string(),
        ));
    }

    if cfg
        .logging
        .path
        .as_ref()
        .is_some_and(|path| path.extension().and_then(|ext| ext.to_str()) != Some("jsonl"))
    {
        return Err(MathOpsError::InvalidConfig(
            "logging.path must end in .jsonl".to_string(),
        ));
    }

    Ok(())
}
