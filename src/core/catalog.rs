//! The catalog of known API names and the modules that define them.
//!
//! A catalog is produced offline by a reflective collector and loaded once per
//! run. After loading it is never mutated, so workers borrow it freely.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiScanError, Result};

/// Immutable mapping from callable name to the modules defining it
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, BTreeSet<String>>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    functions: Option<Vec<String>>,
    entries: Option<Vec<CatalogEntry>>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    module: String,
}

impl Catalog {
    /// Build a catalog from `(name, module)` pairs. Empty modules register the
    /// name without an owner.
    pub fn from_pairs<I, N, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, M)>,
        N: Into<String>,
        M: Into<String>,
    {
        let mut catalog = Self::default();
        for (name, module) in pairs {
            catalog.insert(name.into(), module.into());
        }
        catalog
    }

    /// Load a catalog from a `.json` or `.txt` resource
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |message: String| ApiScanError::CatalogLoad {
            path: path.to_path_buf(),
            message,
        };

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;

        let catalog = match extension {
            "json" => Self::from_json(&content).map_err(load_error)?,
            "txt" => Self::from_lines(&content),
            other => {
                return Err(load_error(format!(
                    "unsupported catalog format '{}', expected .json or .txt",
                    other
                )))
            }
        };

        info!(
            "Loaded catalog with {} names from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    fn from_json(content: &str) -> std::result::Result<Self, String> {
        let file: CatalogFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        if file.functions.is_none() && file.entries.is_none() {
            return Err("expected a 'functions' or 'entries' array".to_string());
        }

        let mut catalog = Self::default();
        for qualified in file.functions.unwrap_or_default() {
            catalog.insert_qualified(qualified.trim());
        }
        for entry in file.entries.unwrap_or_default() {
            if entry.name.is_empty() {
                return Err("catalog entry with an empty name".to_string());
            }
            catalog.insert(entry.name, entry.module);
        }
        Ok(catalog)
    }

    fn from_lines(content: &str) -> Self {
        let mut catalog = Self::default();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            catalog.insert_qualified(line);
        }
        catalog
    }

    /// `pkg.mod.name` registers `name` under `pkg.mod`; a bare `name` has no owner
    fn insert_qualified(&mut self, qualified: &str) {
        match qualified.rsplit_once('.') {
            Some((module, name)) if !name.is_empty() => {
                self.insert(name.to_string(), module.to_string())
            }
            Some(_) => {}
            None if !qualified.is_empty() => self.insert(qualified.to_string(), String::new()),
            None => {}
        }
    }

    fn insert(&mut self, name: String, module: String) {
        let modules = self.entries.entry(name).or_default();
        if !module.is_empty() {
            modules.insert(module);
        }
    }

    /// Candidate modules for a name, or `None` if the name is not catalogued
    pub fn modules_for(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_collector_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "functions.json",
            r#"{
                "timestamp": "2024-01-01T00:00:00",
                "pyspark_version": "3.5.0",
                "function_count": 4,
                "functions": [
                    "col",
                    "pyspark.sql.functions.col",
                    "pyspark.sql.dataframe.DataFrame.select",
                    "select"
                ]
            }"#,
        );

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        let col: Vec<_> = catalog.modules_for("col").unwrap().iter().collect();
        assert_eq!(col, vec!["pyspark.sql.functions"]);
        let select: Vec<_> = catalog.modules_for("select").unwrap().iter().collect();
        assert_eq!(select, vec!["pyspark.sql.dataframe.DataFrame"]);
    }

    #[test]
    fn test_load_entries_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "catalog.json",
            r#"{"entries": [
                {"name": "select", "module": "pkg.sql.functions"},
                {"name": "select", "module": "pkg.other"}
            ]}"#,
        );

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.modules_for("select").unwrap().len(), 2);
    }

    #[test]
    fn test_load_text_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "functions.txt", "pkg.a.count\n\n  pkg.b.count  \nlen\n");

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.modules_for("count").unwrap().len(), 2);
        assert!(catalog.modules_for("len").unwrap().is_empty());
        assert!(catalog.modules_for("items").is_none());
    }

    #[test]
    fn test_malformed_catalogs_are_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let missing_fields = write(&dir, "a.json", r#"{"timestamp": "now"}"#);
        assert!(matches!(
            Catalog::load(&missing_fields),
            Err(ApiScanError::CatalogLoad { .. })
        ));

        let invalid = write(&dir, "b.json", "{not json");
        assert!(matches!(Catalog::load(&invalid), Err(ApiScanError::CatalogLoad { .. })));

        let wrong_format = write(&dir, "c.yaml", "functions: []");
        assert!(matches!(
            Catalog::load(&wrong_format),
            Err(ApiScanError::CatalogLoad { .. })
        ));

        assert!(matches!(
            Catalog::load(dir.path().join("missing.json")),
            Err(ApiScanError::CatalogLoad { .. })
        ));
    }

    #[test]
    fn test_from_pairs_dedupes_modules() {
        let catalog = Catalog::from_pairs([
            ("select", "pkg.sql.functions"),
            ("select", "pkg.sql.functions"),
            ("select", "pkg.other"),
        ]);
        assert_eq!(catalog.modules_for("select").unwrap().len(), 2);
        assert!(catalog.modules_for("count").is_none());
    }
}
