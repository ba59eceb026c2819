// src/core/mod.rs
mod engine;
mod parser;
mod catalog;
mod path_filter;
mod disambiguator;
mod redactor;
mod arg_shape;
mod analyzer;
mod report;

// Language-specific call extractors
mod languages;

pub use parser::{CallSite, SourceDiscovery};
pub use catalog::Catalog;
pub use path_filter::PathFilter;
pub use disambiguator::ModuleResolver;
pub use redactor::{ContextRedactor, PLACEHOLDER};
pub use arg_shape::{classify, ArgExpr, LiteralType};
pub use analyzer::{AnalysisOutcome, ApiMatch, FileFailure, ParallelAnalyzer};
pub use report::{Report, ReportWriter};
pub use languages::{CallExtractor, PythonCallExtractor};

// Export the main engine
pub use engine::Engine;
