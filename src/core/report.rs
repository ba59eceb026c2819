use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::OutputConfig;
use crate::error::{ApiScanError, Result};
use super::analyzer::{AnalysisOutcome, ApiMatch, FileFailure};

/// Aggregated result of one run, written once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub total_files_analyzed: usize,
    pub total_matches: usize,
    pub ignored_files: Vec<String>,
    pub failed_files: Vec<FileFailure>,
    pub matches: Vec<ApiMatch>,
}

impl Report {
    pub fn from_outcome(outcome: AnalysisOutcome) -> Self {
        let mut ignored_files: Vec<String> = outcome
            .ignored_files
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        ignored_files.sort();

        Self {
            generated_at: Utc::now(),
            total_files_analyzed: outcome.files_considered,
            total_matches: outcome.matches.len(),
            ignored_files,
            failed_files: outcome.failed_files,
            matches: outcome.matches,
        }
    }

    /// Occurrences per `module.name`, sorted by key
    pub fn usage_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for m in &self.matches {
            *counts.entry(m.qualified_name()).or_insert(0) += 1;
        }
        counts
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total files analyzed: {}", self.total_files_analyzed);
        let _ = writeln!(out, "Total API matches: {}", self.total_matches);
        let _ = writeln!(out, "Ignored files: {}", self.ignored_files.len());
        let _ = writeln!(out, "Failed files: {}", self.failed_files.len());
        let _ = writeln!(out);
        let _ = writeln!(out, "APIs used:");
        for (key, count) in self.usage_counts() {
            let _ = writeln!(out, "{}: {} occurrences", key, count);
        }
        out
    }
}

/// Persists a report as JSON plus a text summary
pub struct ReportWriter {
    config: OutputConfig,
}

impl ReportWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Write both artifacts under `output_dir`, returning their paths
    pub fn write(&self, report: &Report, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(output_dir).map_err(|source| ApiScanError::OutputWrite {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let report_path = output_dir.join(&self.config.report_file);
        let json = serde_json::to_string_pretty(report)?;
        write_file(&report_path, &json)?;

        let summary_path = output_dir.join(&self.config.summary_file);
        write_file(&summary_path, &report.summary())?;

        info!(
            "Saved report to {} and summary to {}",
            report_path.display(),
            summary_path.display()
        );
        Ok((report_path, summary_path))
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| ApiScanError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
