//! Language-specific call extractors
//!
//! Each language gets its own module implementing [`CallExtractor`], which turns
//! source text into the call-sites found in it.

mod python;

pub use python::PythonCallExtractor;

use crate::error::Result;
use super::CallSite;

/// Trait that all language call extractors must implement
pub trait CallExtractor {
    /// Parse source code and return every call-site whose callee has a name.
    /// Fails with a syntax error if the source does not parse cleanly.
    fn extract_calls(&mut self, content: &str) -> Result<Vec<CallSite>>;

    /// Get the file extensions this extractor handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
