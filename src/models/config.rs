//! Configuration models for tcompare.
//!
//! All I^R (resolvable ignorance) is parameterized here.
//! The user resolves these unknowns via config file or CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for one analysis run.
///
/// I^R resolved: every field has a documented default, so an empty
/// TOML file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Spreadsheet holding the data (xlsx, xlsm, xlsb, xls or ods)
    pub excel_path: PathBuf,

    /// Sheet to read; the first sheet when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,

    /// Column containing group labels
    pub group_column: String,

    /// Column containing the measurements to compare
    pub value_column: String,

    /// Name of the first group to compare
    pub group1_name: String,

    /// Name of the second group to compare
    pub group2_name: String,

    /// Prefix for output file names
    pub output_prefix: String,

    /// Directory the artifacts are written to
    pub output_dir: PathBuf,

    /// Assume equal population variances (Student); `false` selects Welch
    pub equal_var: bool,

    /// Chart rendering settings
    pub plot: PlotConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excel_path: PathBuf::from("data.xlsx"),
            sheet: None,
            group_column: "Group".to_string(),
            value_column: "Value".to_string(),
            group1_name: "Group1".to_string(),
            group2_name: "Group2".to_string(),
            output_prefix: "ttest".to_string(),
            output_dir: PathBuf::from("."),
            equal_var: true,
            plot: PlotConfig::default(),
        }
    }
}

/// Chart rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Figure width in inches
    pub width_in: f64,

    /// Figure height in inches
    pub height_in: f64,

    /// Resolution in dots per inch
    pub dpi: u32,

    /// TrueType font used for chart text; a system font is probed when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width_in: 10.0,
            height_in: 6.0,
            dpi: 300,
            font: None,
        }
    }
}

impl PlotConfig {
    /// Pixel dimensions of the rendered image.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f64| (inches * f64::from(self.dpi)).round().max(1.0) as u32;
        (px(self.width_in), px(self.height_in))
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file.
    ///
    /// B_i(file exists) → Result
    /// B_i(file is valid TOML) → Result
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Check the values the run depends on before touching any file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("group_column", &self.group_column),
            ("value_column", &self.value_column),
            ("group1_name", &self.group1_name),
            ("group2_name", &self.group2_name),
            ("output_prefix", &self.output_prefix),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }

        if self.output_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "output_prefix '{}' must not contain path separators; use output_dir",
                self.output_prefix
            )));
        }

        if self.group1_name == self.group2_name {
            return Err(ConfigError::Invalid(format!(
                "group1_name and group2_name are both '{}'",
                self.group1_name
            )));
        }

        if !(self.plot.width_in > 0.0 && self.plot.height_in > 0.0) || self.plot.dpi == 0 {
            return Err(ConfigError::Invalid(
                "plot width_in, height_in and dpi must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors.
///
/// Epistemic origin:
/// - B_i falsified: File not found, parse error
/// - I^R unresolved: Values that make the run meaningless
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
