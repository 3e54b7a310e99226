//! Path classification: which rule, if any, places a manifest entry.

use std::path::Path;

use crate::layout::ClassificationRule;
use crate::runtime::Runtime;

/// Ordered rule table for one category. First matching prefix wins.
pub struct PathClassifier<'a> {
    rules: &'a [ClassificationRule],
}

impl<'a> PathClassifier<'a> {
    pub fn new(rules: &'a [ClassificationRule]) -> Self {
        Self { rules }
    }

    /// Find the first rule whose prefix is a literal string prefix of `src`.
    pub fn match_rule(&self, src: &str) -> Option<&'a ClassificationRule> {
        self.rules.iter().find(|rule| src.starts_with(&rule.prefix))
    }

    /// Classify a manifest entry. Directories never match: only leaf files are
    /// linked, the directory structure comes from creating parents on demand.
    pub fn classify<R: Runtime>(&self, runtime: &R, src: &str) -> Option<&'a ClassificationRule> {
        if runtime.is_dir(Path::new(src)) {
            return None;
        }
        self.match_rule(src)
    }
}
