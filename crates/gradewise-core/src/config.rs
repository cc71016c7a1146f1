//! Configuration loading.
//!
//! Tolerances and thresholds are configurable constants rather than values
//! baked into the strategies.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tolerances and thresholds used by the grader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    /// NUMERIC answers match when `|a - b|` is strictly below this.
    #[serde(default = "default_tolerance")]
    pub numeric_tolerance: f64,
    /// Numeric closeness used when comparing algebraic values and solutions.
    #[serde(default = "default_tolerance")]
    pub algebra_tolerance: f64,
    /// SHORT_ANSWER Jaccard similarity at or above which an answer is correct.
    #[serde(default = "default_short_answer_threshold")]
    pub short_answer_threshold: f64,
}

fn default_tolerance() -> f64 {
    1e-3
}
fn default_short_answer_threshold() -> f64 {
    0.7
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            numeric_tolerance: default_tolerance(),
            algebra_tolerance: default_tolerance(),
            short_answer_threshold: default_short_answer_threshold(),
        }
    }
}

impl GradingConfig {
    /// Reject tolerances and thresholds that would make grading meaningless.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.numeric_tolerance.is_finite() && self.numeric_tolerance > 0.0,
            "numeric_tolerance must be a positive number, got {}",
            self.numeric_tolerance
        );
        anyhow::ensure!(
            self.algebra_tolerance.is_finite() && self.algebra_tolerance > 0.0,
            "algebra_tolerance must be a positive number, got {}",
            self.algebra_tolerance
        );
        anyhow::ensure!(
            self.short_answer_threshold > 0.0 && self.short_answer_threshold <= 1.0,
            "short_answer_threshold must be in (0, 1], got {}",
            self.short_answer_threshold
        );
        Ok(())
    }
}

/// Work limits for the symbolic engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicLimits {
    /// Maximum input length in bytes.
    #[serde(default = "default_max_input_len")]
    pub max_input_len: usize,
    /// Maximum nesting depth while parsing or simplifying.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of terms in any intermediate polynomial.
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,
    /// Largest integer exponent expanded by repeated multiplication.
    #[serde(default = "default_max_exponent")]
    pub max_exponent: u32,
}

fn default_max_input_len() -> usize {
    1024
}
fn default_max_depth() -> usize {
    64
}
fn default_max_terms() -> usize {
    512
}
fn default_max_exponent() -> u32 {
    32
}

impl Default for SymbolicLimits {
    fn default() -> Self {
        Self {
            max_input_len: default_max_input_len(),
            max_depth: default_max_depth(),
            max_terms: default_max_terms(),
            max_exponent: default_max_exponent(),
        }
    }
}

/// Top-level gradewise configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradewiseConfig {
    #[serde(default)]
    pub grading: GradingConfig,
    #[serde(default)]
    pub limits: SymbolicLimits,
    /// Where `mark` writes reports when no `--output` is given.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./gradewise-results")
}

impl Default for GradewiseConfig {
    fn default() -> Self {
        Self {
            grading: GradingConfig::default(),
            limits: SymbolicLimits::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradewise.toml` in the current directory
/// 2. `~/.config/gradewise/config.toml`
///
/// Environment variable overrides: `GRADEWISE_NUMERIC_TOLERANCE`,
/// `GRADEWISE_SHORT_ANSWER_THRESHOLD`.
pub fn load_config() -> Result<GradewiseConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradewiseConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradewise.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => GradewiseConfig::default(),
    };

    if let Some(tolerance) = env_f64("GRADEWISE_NUMERIC_TOLERANCE")? {
        config.grading.numeric_tolerance = tolerance;
    }
    if let Some(threshold) = env_f64("GRADEWISE_SHORT_ANSWER_THRESHOLD")? {
        config.grading.short_answer_threshold = threshold;
    }

    config.grading.validate()?;
    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config_str(content: &str) -> Result<GradewiseConfig> {
    let config: GradewiseConfig = toml::from_str(content)?;
    Ok(config)
}

fn env_f64(name: &str) -> Result<Option<f64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("{name} is not a number: {raw:?}")),
        Err(_) => Ok(None),
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradewise"))
}
