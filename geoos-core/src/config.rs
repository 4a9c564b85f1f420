//! Configuration file support for GEO OS
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.geoosrc.json` in project root
//! 3. `geoos.config.json` in project root
//! 4. `"geoos"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::format::Formatter;
use crate::metrics::MetricId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Highest display precision a metric may be configured with
pub const MAX_DECIMALS: u8 = 4;

/// GEO OS configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoosConfig {
    /// Changes with magnitude at or below this are neutral (default: 0.0)
    #[serde(default)]
    pub neutral_band: Option<f64>,

    /// Per-metric display precision overrides
    #[serde(default)]
    pub decimals: BTreeMap<MetricId, u8>,

    /// Metrics shown in reports (default: all)
    #[serde(default)]
    pub metrics: Vec<MetricId>,

    /// Maximum number of changed rows to show
    #[serde(default)]
    pub top: Option<usize>,
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub neutral_band: f64,
    pub formatter: Formatter,
    /// Metrics shown in reports (None means all)
    pub metrics: Option<Vec<MetricId>>,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl GeoosConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(band) = self.neutral_band {
            if !band.is_finite() || band < 0.0 {
                anyhow::bail!(
                    "neutral_band must be a non-negative number (got {})",
                    band
                );
            }
        }

        for (id, decimals) in &self.decimals {
            if *decimals > MAX_DECIMALS {
                anyhow::bail!(
                    "decimals.{} must be at most {} (got {})",
                    id,
                    MAX_DECIMALS,
                    decimals
                );
            }
        }

        if let Some(top) = self.top {
            if top == 0 {
                anyhow::bail!("top must be at least 1");
            }
        }

        Ok(())
    }

    /// Resolve config into the form used by reports
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let metrics = if self.metrics.is_empty() {
            None
        } else {
            let mut ids = self.metrics.clone();
            ids.sort();
            ids.dedup();
            Some(ids)
        };

        Ok(ResolvedConfig {
            neutral_band: self.neutral_band.unwrap_or(0.0),
            formatter: Formatter::with_overrides(self.decimals.clone()),
            metrics,
            top_n: self.top,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if a metric should be shown in reports
    ///
    /// Gap metrics follow their base metric, so including `reach` also
    /// shows `reachGap`.
    pub fn should_include(&self, id: MetricId) -> bool {
        match &self.metrics {
            None => true,
            Some(ids) => {
                ids.contains(&id) || id.base().map(|b| ids.contains(&b)).unwrap_or(false)
            }
        }
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        GeoosConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.geoosrc.json`
/// 2. `geoos.config.json`
/// 3. `"geoos"` key in `package.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(GeoosConfig, PathBuf)>> {
    let rc_path = project_root.join(".geoosrc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = project_root.join("geoos.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    tracing::debug!(root = %project_root.display(), "no config file found");
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<GeoosConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: GeoosConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Load config from the "geoos" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<GeoosConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("geoos") {
        Some(value) => {
            let config: GeoosConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid geoos config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid geoos config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (GeoosConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
