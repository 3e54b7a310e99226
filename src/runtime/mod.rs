//! Runtime abstraction for filesystem operations.
//!
//! Every filesystem touch made while building a tree goes through the
//! [`Runtime`] trait so the classification and relink logic can be exercised
//! against `MockRuntime` without a real package installation.
//!
//! # Structure
//!
//! - `path` - Lexical path helpers (relative symlink targets)
//! - `fs` - File and directory queries, directory creation, glob expansion
//! - `symlink` - Symlink creation and inspection

mod fs;
pub mod path;
mod symlink;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use path::relative_symlink_path;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime {
    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Expand a glob pattern into the sorted list of matching paths.
    fn glob(&self, pattern: &Path) -> Result<Vec<PathBuf>>;

    // Symlinks
    fn symlink(&self, original: &Path, link: &Path) -> Result<()>;
    fn is_symlink(&self, path: &Path) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn glob(&self, pattern: &Path) -> Result<Vec<PathBuf>> {
        self.glob_impl(pattern)
    }

    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        self.symlink_impl(original, link)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.is_symlink_impl(path)
    }
}
