use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ApiScanError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File discovery and worker pool settings
    pub scan: ScanConfig,

    /// Module disambiguation settings
    pub resolution: ResolutionConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of parallel workers (0 = half the available cores)
    pub workers: usize,

    /// File extensions to analyze
    pub file_extensions: Vec<String>,

    /// Path markers excluded in addition to the built-in ones
    pub extra_ignore_markers: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,

    /// Honour .gitignore files while walking the target directory
    pub respect_gitignore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Module prefixes preferred when a name is defined in several sql modules,
    /// most specific first
    pub preferred_modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the report and summary are written to
    pub dir: PathBuf,

    /// JSON report file name
    pub report_file: String,

    /// Text summary file name
    pub summary_file: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            file_extensions: vec!["py".to_string()],
            extra_ignore_markers: vec![],
            max_file_size: 1024 * 1024, // 1MB
            respect_gitignore: false,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            preferred_modules: [
                "pyspark.sql.functions",
                "pyspark.sql.dataframe",
                "pyspark.sql.column",
                "pyspark.sql.group",
                "pyspark.sql.window",
                "pyspark.sql.session",
                "pyspark.sql.readwriter",
                "pyspark.sql",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("api_usage"),
            report_file: "api_usage_report.json".to_string(),
            summary_file: "api_usage_summary.txt".to_string(),
        }
    }
}

impl ScanConfig {
    /// Worker count with `0` expanded to half the available cores
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::cmp::max(1, num_cpus::get() / 2)
        } else {
            self.workers
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ApiScanError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(ApiScanError::Config(format!(
                        "config file {} not found",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                let candidates = ["apiscan.toml", ".apiscan.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
