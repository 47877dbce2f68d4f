//! Configuration file support
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.gridwatchrc.json` in the working directory
//! 3. `gridwatch.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file
//! values.

use crate::scoring::{ScoreThresholds, ScoringPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gridwatch configuration loaded from a JSON config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridwatchConfig {
    /// Scoring policy: "heuristic" (default) or "probability".
    #[serde(default)]
    pub policy: Option<ScoringPolicy>,

    /// Path to the classifier artifact (needed for the probability policy).
    #[serde(default)]
    pub model: Option<PathBuf>,

    /// Path to the location table CSV.
    #[serde(default)]
    pub locations: Option<PathBuf>,

    /// Custom score thresholds.
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Minimum score to show in reports.
    #[serde(default)]
    pub min_score: Option<f64>,

    /// Maximum number of results to show.
    #[serde(default)]
    pub top: Option<usize>,
}

/// Custom score thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Score above which a meter is high risk (default: 60.0).
    pub high_risk: Option<f64>,
    /// Score at which immediate inspection is recommended (default: 70.0).
    pub immediate: Option<f64>,
    /// Score at which monitoring is recommended (default: 40.0).
    pub monitor: Option<f64>,
}

/// Resolved configuration ready for use.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub policy: ScoringPolicy,
    pub model_path: Option<PathBuf>,
    pub locations_path: Option<PathBuf>,
    pub thresholds: ScoreThresholds,
    pub min_score: Option<f64>,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults).
    pub config_path: Option<PathBuf>,
}

impl GridwatchConfig {
    /// Validate the configuration for logical errors.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref t) = self.thresholds {
            let high_risk = t.high_risk.unwrap_or(60.0);
            let immediate = t.immediate.unwrap_or(70.0);
            let monitor = t.monitor.unwrap_or(40.0);

            for (name, value) in [
                ("high_risk", high_risk),
                ("immediate", immediate),
                ("monitor", monitor),
            ] {
                if !(0.0..=100.0).contains(&value) {
                    anyhow::bail!(
                        "thresholds.{} must be within [0, 100] (got {})",
                        name,
                        value
                    );
                }
            }
            if monitor >= immediate {
                anyhow::bail!(
                    "thresholds.monitor ({}) must be less than thresholds.immediate ({})",
                    monitor,
                    immediate
                );
            }
        }

        if let Some(min) = self.min_score {
            if !(0.0..=100.0).contains(&min) {
                anyhow::bail!("min_score must be within [0, 100] (got {})", min);
            }
        }

        Ok(())
    }

    /// Resolve config into a form ready for use.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let defaults = ScoreThresholds::default();
        let thresholds = match &self.thresholds {
            Some(t) => ScoreThresholds {
                high_risk: t.high_risk.unwrap_or(defaults.high_risk),
                immediate: t.immediate.unwrap_or(defaults.immediate),
                monitor: t.monitor.unwrap_or(defaults.monitor),
            },
            None => defaults,
        };

        Ok(ResolvedConfig {
            policy: self.policy.unwrap_or(ScoringPolicy::Heuristic),
            model_path: self.model.clone(),
            locations_path: self.locations.clone(),
            thresholds,
            min_score: self.min_score,
            top_n: self.top,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file).
    pub fn defaults() -> Result<Self> {
        GridwatchConfig::default().resolve()
    }
}

/// Discover and load a config file from the working directory.
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(GridwatchConfig, PathBuf)>> {
    let rc_path = root.join(".gridwatchrc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = root.join("gridwatch.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    Ok(None)
}

/// Load config from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<GridwatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: GridwatchConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a working directory.
///
/// If `config_path` is provided, loads from that file. Otherwise discovers
/// config from the directory. Returns defaults if nothing is found.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (GridwatchConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
