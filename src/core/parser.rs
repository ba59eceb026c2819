use std::path::{Path, PathBuf};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{ApiScanError, Result};
use super::arg_shape::ArgExpr;

/// A call expression found while parsing one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSite {
    /// Callee name: the identifier, or the trailing member of an attribute access
    pub name: String,

    /// 1-based line of the call expression
    pub line: usize,

    /// 0-based byte offset of the call within its line
    pub column: usize,

    /// Positional arguments in call order
    pub args: Vec<ArgExpr>,
}

/// Finds and reads the source files under a target directory
pub struct SourceDiscovery {
    extensions: Vec<String>,
    respect_gitignore: bool,
    max_file_size: usize,
}

impl SourceDiscovery {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            extensions: config.file_extensions.clone(),
            respect_gitignore: config.respect_gitignore,
            max_file_size: config.max_file_size,
        }
    }

    /// All source files under `dir`, sorted
    pub fn discover<P: AsRef<Path>>(&self, dir: P) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .ignore(self.respect_gitignore)
            .parents(self.respect_gitignore)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            let is_file = entry.file_type().map_or(false, |ft| ft.is_file());
            if is_file && self.should_parse_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!("Discovered {} source files", files.len());
        files
    }

    /// Read a file as UTF-8, refusing anything over the size limit
    pub fn read_source(&self, path: &Path) -> Result<String> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() > self.max_file_size as u64 {
            return Err(ApiScanError::Parser(format!(
                "File {} exceeds maximum size limit ({} bytes)",
                path.display(),
                self.max_file_size
            )));
        }

        Ok(std::fs::read_to_string(path)?)
    }

    fn should_parse_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| self.extensions.iter().any(|e| e == ext))
    }
}
