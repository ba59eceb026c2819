use std::collections::BTreeSet;

use tracing::trace;

use crate::config::ResolutionConfig;

/// Picks the module a matched name most likely refers to.
///
/// This is a syntactic heuristic: it never looks at imports. Candidate sets are
/// ordered, so every tie is broken by the lexicographically smallest module and
/// the same catalog always yields the same answer.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    preferred_modules: Vec<String>,
}

impl ModuleResolver {
    pub fn new(config: &ResolutionConfig) -> Self {
        Self {
            preferred_modules: config.preferred_modules.clone(),
        }
    }

    pub fn resolve<'a>(&self, name: &str, candidates: &'a BTreeSet<String>) -> Option<&'a str> {
        match candidates.len() {
            0 => None,
            1 => candidates.iter().next().map(String::as_str),
            _ => {
                let sql: Vec<&'a str> = candidates
                    .iter()
                    .map(String::as_str)
                    .filter(|module| module.contains("sql"))
                    .collect();

                if sql.is_empty() {
                    trace!(
                        "'{}' is ambiguous across {} modules, taking the first",
                        name,
                        candidates.len()
                    );
                    return candidates.iter().next().map(String::as_str);
                }

                for preferred in &self.preferred_modules {
                    if let Some(module) = sql.iter().copied().find(|m| m.contains(preferred.as_str())) {
                        return Some(module);
                    }
                }

                sql.first().copied()
            }
        }
    }
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new(&ResolutionConfig::default())
    }
}
