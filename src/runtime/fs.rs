//! File system operations (read, directory, glob).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("Failed to create directory {:?}", path))?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn is_dir_impl(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn glob_impl(&self, pattern: &Path) -> Result<Vec<PathBuf>> {
        let pattern = pattern
            .to_str()
            .with_context(|| format!("Glob pattern is not valid UTF-8: {:?}", pattern))?;
        let mut matches = glob::glob(pattern)
            .with_context(|| format!("Invalid glob pattern '{}'", pattern))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to expand glob pattern '{}'", pattern))?;
        matches.sort();
        Ok(matches)
    }
}
