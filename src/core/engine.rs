// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ApiScanError;
use super::{Catalog, ModuleResolver, ParallelAnalyzer, Report, ReportWriter};

/// Main orchestration engine for apiscan
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create a new engine, loading configuration from `config_path` or the default locations
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Scan `directory` for calls into the catalogued API and write the report
    pub fn scan(
        &self,
        directory: &Path,
        catalog_path: &Path,
        output: Option<PathBuf>,
        workers: Option<usize>,
    ) -> Result<Report> {
        if !directory.is_dir() {
            return Err(ApiScanError::TargetNotFound(directory.to_path_buf()).into());
        }

        let mut scan_config = self.config.scan.clone();
        if let Some(workers) = workers {
            scan_config.workers = workers;
        }
        let output_dir = output.unwrap_or_else(|| self.config.output.dir.clone());

        info!("🔍 Scanning {} for API usage", directory.display());
        info!("Catalog: {}", catalog_path.display());
        info!("Output: {}", output_dir.display());

        // Catalog errors abort the run before any source file is touched
        let catalog = Catalog::load(catalog_path)?;
        if catalog.is_empty() {
            warn!("Catalog {} has no entries, no calls can match", catalog_path.display());
        }
        let resolver = ModuleResolver::new(&self.config.resolution);

        let analyzer = ParallelAnalyzer::new(&catalog, &resolver, &scan_config)?;
        let outcome = analyzer
            .analyze(directory)
            .with_context(|| format!("Failed to analyze {}", directory.display()))?;

        let report = Report::from_outcome(outcome);
        ReportWriter::new(&self.config.output).write(&report, &output_dir)?;

        info!("🎉 Analysis complete. Results saved to {}", output_dir.display());
        Ok(report)
    }

    /// Show the candidate modules for `name` and the one a match would resolve to
    pub fn resolve(&self, catalog_path: &Path, name: &str) -> Result<()> {
        let catalog = Catalog::load(catalog_path)?;
        let resolver = ModuleResolver::new(&self.config.resolution);

        let candidates = match catalog.modules_for(name) {
            Some(candidates) => candidates,
            None => {
                println!("{}: not in catalog", name);
                return Ok(());
            }
        };

        println!("{}: {} candidate module(s)", name, candidates.len());
        for module in candidates {
            println!("  {}", module);
        }
        match resolver.resolve(name, candidates) {
            Some(module) => println!("resolves to: {}.{}", module, name),
            None => println!("resolves to: nothing (no owning module)"),
        }

        Ok(())
    }
}
