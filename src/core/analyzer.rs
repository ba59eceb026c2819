//! Parallel per-file analysis
//!
//! Every file is one unit of work on a bounded rayon pool. Workers share only
//! read-only state (catalog, resolver, redactor, filter) and each owns its own
//! tree-sitter parser. A file's failure is returned as a value and never
//! affects its siblings.

use std::path::{Path, PathBuf};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::error::{ApiScanError, Result};
use super::arg_shape::classify;
use super::catalog::Catalog;
use super::disambiguator::ModuleResolver;
use super::languages::{CallExtractor, PythonCallExtractor};
use super::parser::SourceDiscovery;
use super::path_filter::PathFilter;
use super::redactor::ContextRedactor;

/// One resolved call into the catalogued API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMatch {
    pub name: String,
    #[serde(rename = "module")]
    pub resolved_module: String,
    #[serde(rename = "file")]
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    /// Source line with literal content redacted
    pub context: String,
    /// Argument shape descriptors, one per positional argument
    pub args: Vec<String>,
}

impl ApiMatch {
    /// `module.name`, the key the summary groups by
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.resolved_module, self.name)
    }
}

/// A file that was considered but could not be read or parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug)]
enum FileOutcome {
    Ignored(PathBuf),
    Analyzed(Vec<ApiMatch>),
    Failed(FileFailure),
}

/// Everything a run produced, before it is turned into a report
#[derive(Debug, Default)]
pub struct AnalysisOutcome {
    pub matches: Vec<ApiMatch>,
    pub ignored_files: Vec<PathBuf>,
    pub failed_files: Vec<FileFailure>,
    /// Discovered files that were not ignored, including failed ones
    pub files_considered: usize,
}

pub struct ParallelAnalyzer<'a> {
    catalog: &'a Catalog,
    resolver: &'a ModuleResolver,
    redactor: ContextRedactor,
    path_filter: PathFilter,
    discovery: SourceDiscovery,
    workers: usize,
}

impl<'a> ParallelAnalyzer<'a> {
    pub fn new(catalog: &'a Catalog, resolver: &'a ModuleResolver, config: &ScanConfig) -> Result<Self> {
        // Fail fast if the grammar cannot be loaded rather than once per file
        let extractor = PythonCallExtractor::new()?;
        debug!(
            "Using the {} extractor ({:?} files)",
            extractor.language_name(),
            extractor.file_extensions()
        );

        Ok(Self {
            catalog,
            resolver,
            redactor: ContextRedactor::new()?,
            path_filter: PathFilter::with_extra_markers(&config.extra_ignore_markers),
            discovery: SourceDiscovery::new(config),
            workers: config.effective_workers(),
        })
    }

    /// Analyze every source file under `directory` on a pool of `workers` threads
    pub fn analyze(&self, directory: &Path) -> Result<AnalysisOutcome> {
        let files = self.discovery.discover(directory);
        info!("Found {} source files to analyze with {} workers", files.len(), self.workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("apiscan-worker-{}", i))
            .build()?;

        // collect() is the barrier: the run is not done until every file is
        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .par_iter()
                .map_init(PythonCallExtractor::new, |extractor, path| match extractor {
                    Ok(extractor) => self.analyze_file(extractor, directory, path),
                    Err(e) => failed(path, e),
                })
                .collect()
        });

        let mut outcome = AnalysisOutcome::default();
        for file_outcome in outcomes {
            match file_outcome {
                FileOutcome::Ignored(path) => outcome.ignored_files.push(path),
                FileOutcome::Analyzed(matches) => {
                    outcome.files_considered += 1;
                    outcome.matches.extend(matches);
                }
                FileOutcome::Failed(failure) => {
                    outcome.files_considered += 1;
                    outcome.failed_files.push(failure);
                }
            }
        }

        info!(
            "Analyzed {} files: {} matches, {} ignored, {} failed",
            outcome.files_considered,
            outcome.matches.len(),
            outcome.ignored_files.len(),
            outcome.failed_files.len()
        );
        Ok(outcome)
    }

    fn analyze_file(&self, extractor: &mut PythonCallExtractor, root: &Path, path: &Path) -> FileOutcome {
        // Markers are matched below the scan root so the root's own location never counts
        let relative = path.strip_prefix(root).unwrap_or(path);
        if self.path_filter.should_ignore(relative) {
            debug!("Ignoring {}", path.display());
            return FileOutcome::Ignored(path.to_path_buf());
        }

        let result = self
            .discovery
            .read_source(path)
            .and_then(|content| self.analyze_source(extractor, path, &content));

        match result {
            Ok(matches) => FileOutcome::Analyzed(matches),
            Err(e) => failed(path, &e),
        }
    }

    /// Matches for one file's content, in syntax-tree traversal order
    pub fn analyze_source(
        &self,
        extractor: &mut dyn CallExtractor,
        path: &Path,
        content: &str,
    ) -> Result<Vec<ApiMatch>> {
        let calls = extractor.extract_calls(content)?;
        let file_path = path.display().to_string();
        let mut matches = Vec::new();

        for call in calls {
            let candidates = match self.catalog.modules_for(&call.name) {
                Some(candidates) => candidates,
                None => continue,
            };

            let module = match self.resolver.resolve(&call.name, candidates) {
                Some(module) => module.to_string(),
                None => {
                    debug!("'{}' is catalogued without a module, skipping", call.name);
                    continue;
                }
            };

            matches.push(ApiMatch {
                context: self.redactor.redact(content, call.line),
                args: classify(&call.args),
                name: call.name,
                resolved_module: module,
                file_path: file_path.clone(),
                line: call.line,
                column: call.column,
            });
        }

        Ok(matches)
    }
}

fn failed(path: &Path, error: &ApiScanError) -> FileOutcome {
    warn!("Error processing {}: {}", path.display(), error);
    FileOutcome::Failed(FileFailure {
        file: path.display().to_string(),
        error: error.to_string(),
    })
}
