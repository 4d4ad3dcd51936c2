//! Population configuration via `hodmock.toml`
//!
//! A default `hodmock.toml` can be written next to a run's inputs. Every
//! field has a default, so an empty file is a valid configuration. The
//! optional `[catalog]` section carries the catalog attributes a driver
//! would otherwise pass programmatically.

use hodmock_core::{Error, ModelParameters, Rank, Result};
use hodmock_model::MassDefinition;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "hodmock.toml";

/// Catalog attributes loaded from the `[catalog]` section
///
/// ```toml
/// [catalog]
/// mdef = "200c"
/// redshift = 0.55
/// seed = 42
/// rsd = [0.0, 0.0, 1.0]
///
/// [catalog.params]
/// logMmin = 13.031
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Halo mass definition: `"vir"`, `"NNNc"` or `"NNNm"`
    #[serde(default)]
    pub mdef: MassDefinition,
    /// Redshift of the halo catalog
    #[serde(default)]
    pub redshift: f64,
    /// RNG seed; absent means seed from entropy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Redshift-space distortion direction
    #[serde(default)]
    pub rsd: [f64; 3],
    /// Initial model parameters
    #[serde(default)]
    pub params: ModelParameters,
}

impl CatalogConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.redshift.is_finite() || self.redshift < 0.0 {
            return Err(Error::config(format!(
                "redshift must be finite and non-negative, got {}",
                self.redshift
            )));
        }
        if self.rsd.iter().any(|c| !c.is_finite()) {
            return Err(Error::config(format!(
                "rsd direction must be finite, got {:?}",
                self.rsd
            )));
        }
        Ok(())
    }
}

/// Population layer configuration loaded from `hodmock.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Rank that runs the transform
    #[serde(default)]
    pub designated_rank: Rank,
    /// Halos with fewer particles are skipped on the initial population
    #[serde(default = "default_min_particles")]
    pub min_particles: u64,
    /// Record summary statistics after each transform
    #[serde(default = "default_record_statistics")]
    pub record_statistics: bool,
    /// Column the category fraction is computed over
    #[serde(default = "default_category_column")]
    pub statistics_category_column: String,
    /// Category whose fraction is reported
    #[serde(default = "default_category")]
    pub statistics_category: String,
    /// Optional catalog attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,
}

fn default_min_particles() -> u64 {
    1
}

fn default_record_statistics() -> bool {
    true
}

fn default_category_column() -> String {
    "gal_type".to_string()
}

fn default_category() -> String {
    "satellites".to_string()
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            designated_rank: 0,
            min_particles: default_min_particles(),
            record_statistics: default_record_statistics(),
            statistics_category_column: default_category_column(),
            statistics_category: default_category(),
            catalog: None,
        }
    }
}

impl PopulationConfig {
    /// Check field values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.record_statistics && self.statistics_category_column.is_empty() {
            return Err(Error::config(
                "statistics_category_column must not be empty when record_statistics is set",
            ));
        }
        if let Some(catalog) = &self.catalog {
            catalog.validate()?;
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# hodmock population configuration
#
# Rank that gathers halos and runs the occupation model (default: 0)
designated_rank = 0

# Halos with fewer particles than this are skipped (default: 1)
min_particles = 1

# Log summary statistics of each populated catalog (default: true)
record_statistics = true
statistics_category_column = "gal_type"
statistics_category = "satellites"

# Catalog attributes. Uncomment to configure the catalog from this file.
# [catalog]
# mdef = "vir"          # "vir", "NNNc" or "NNNm"
# redshift = 0.0
# seed = 42             # optional, entropy if absent
# rsd = [0.0, 0.0, 0.0]
#
# [catalog.params]
# logMmin = 13.031
# sigma_logM = 0.38
# alpha = 0.76
# logM0 = 13.27
# logM1 = 14.08
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, cannot be parsed, or
    /// carries invalid values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let config: PopulationConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Io {
                reason: format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| Error::Io {
            reason: format!("failed to write config file '{}': {}", path.display(), e),
        })
    }
}
