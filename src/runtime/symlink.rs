//! Symlink operations (create, inspect).

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::symlink as unix_symlink;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> Result<()> {
        unix_symlink(original, link)
            .with_context(|| format!("Failed to create symlink {:?} -> {:?}", link, original))?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }
}
