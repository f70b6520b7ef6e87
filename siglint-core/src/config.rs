//! Configuration loading from siglint.toml.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::doc::Finding;

/// Name of the config file looked up at the analyzed root.
pub const CONFIG_FILE: &str = "siglint.toml";

/// Main configuration structure for siglint.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SiglintConfig {
    /// Documentation checker settings.
    pub docs: Option<DocsConfig>,
    /// File discovery settings.
    pub scan: Option<ScanConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// `[docs]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Type whose public methods are checked (e.g. "Graph").
    pub target_type: Option<String>,
    /// Finding kinds to drop.
    pub suppress: Option<Vec<String>>,
    /// Function names to skip.
    pub ignore: Option<Vec<String>>,
    /// Where to write the findings artifact, relative to the root.
    pub artifact: Option<String>,
}

/// `[scan]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory names pruned during discovery.
    pub exclude: Option<Vec<String>>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl SiglintConfig {
    /// Rejects values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(kinds) = self.docs.as_ref().and_then(|d| d.suppress.as_ref()) {
            for kind in kinds {
                if !Finding::is_kind_name(kind) {
                    bail!(
                        "unknown finding kind '{}' in [docs].suppress (expected one of: {})",
                        kind,
                        Finding::KINDS.join(", ")
                    );
                }
            }
        }
        if let Some(format) = self.output.as_ref().and_then(|o| o.format.as_deref()) {
            if format != "plain" && format != "json" {
                bail!("unknown output format '{}' (expected 'plain' or 'json')", format);
            }
        }
        Ok(())
    }

    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f == "json")
    }
}

/// Loads configuration from siglint.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<SiglintConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg: SiglintConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("Invalid {}", path.display()))?;
    Ok(Some(cfg))
}
