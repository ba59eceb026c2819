use std::path::Path;

/// Substring markers for vendored code, caches and test trees
const DEFAULT_MARKERS: &[&str] = &[
    "/venv/",
    "/.venv/",
    "/env/",
    "/site-packages/",
    "/dist-packages/",
    "/__pycache__/",
    "/.tox/",
    "/.eggs/",
    "/tests/",
    "/test/",
    "/testing/",
    "/test_",
    "_test.py",
    "/conftest.py",
];

/// Decides which discovered files are excluded from analysis
#[derive(Debug, Clone)]
pub struct PathFilter {
    markers: Vec<String>,
}

impl PathFilter {
    pub fn new() -> Self {
        Self::with_extra_markers(&[])
    }

    pub fn with_extra_markers(extra: &[String]) -> Self {
        let markers = DEFAULT_MARKERS
            .iter()
            .map(|m| m.to_string())
            .chain(extra.iter().filter(|m| !m.is_empty()).cloned())
            .collect();
        Self { markers }
    }

    pub fn should_ignore(&self, path: &Path) -> bool {
        // Leading slash lets directory markers match the first component of relative paths
        let normalized = format!("/{}", path.to_string_lossy().replace('\\', "/"));
        self.markers.iter().any(|marker| normalized.contains(marker.as_str()))
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new()
    }
}
