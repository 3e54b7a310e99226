//! Package database access.
//!
//! The tree builder only ever asks two things of the host package manager:
//! which installed package matches a name pattern, and which files that
//! package owns. Both go through [`PackageDatabase`] so the builder can be
//! tested against `MockPackageDatabase`.

mod dpkg;
mod version;

use anyhow::Result;

pub use dpkg::Dpkg;
pub use version::VersionResolver;

/// An installed package matched by a name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    /// The pattern the package was looked up by (e.g., `libcudnn?`)
    pub requested_pattern: String,
    /// Exact installed package name (e.g., `libcudnn8`)
    pub name: String,
    /// Full Debian version string (e.g., `8.9.1.23-1+cuda12.2`)
    pub version: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait PackageDatabase {
    /// Resolve a name or name pattern (`?` matches one character) to an
    /// installed package. `Ok(None)` means nothing installed matches.
    fn resolve_package(&self, pattern: &str) -> Result<Option<PackageRef>>;

    /// List every absolute path owned by an installed package.
    fn list_package_files(&self, name: &str) -> Result<Vec<String>>;
}
