//! Layout definitions.
//!
//! A layout is the configured part of a run: which packages to resolve, which
//! path prefixes of their manifests land where in the output tree, and which
//! fixups run afterwards. Built-in layouts live in [`cuda`] and [`mkl_dnn`];
//! custom ones are read from JSON.

pub mod cuda;
pub mod mkl_dnn;
mod template;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub use template::expand;

/// A complete target layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Layout {
    /// Short name, also used in the log prefix (e.g., "cuda")
    pub name: String,
    /// Packages whose versions are exposed as `{name}` to package patterns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<VersionSource>,
    /// Categories in the order they are linked
    pub categories: Vec<Category>,
}

/// A package whose truncated version becomes a template variable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VersionSource {
    /// Variable name (e.g., "cuda" for `{cuda}`)
    pub name: String,
    /// Package name pattern to resolve
    pub package: String,
    /// Number of numeric components to keep (2 turns `10.1.243-3` into `10.1`)
    pub components: usize,
}

/// One package and the rules that place its files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    /// Human-readable name used in logs
    pub name: String,
    /// Package name pattern; may use `?` and `{var}` placeholders
    pub package: String,
    /// Classification rules, first match wins
    pub rules: Vec<ClassificationRule>,
    /// Fixups run after the category's files are linked
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post: Vec<PostLink>,
}

/// Maps files under a literal source prefix to a directory of the output tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassificationRule {
    /// Literal string prefix of the absolute source path; also the source root
    pub prefix: String,
    /// Destination root, relative to the output directory
    pub destination: PathBuf,
}

impl ClassificationRule {
    pub fn new(prefix: &str, destination: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            destination: PathBuf::from(destination),
        }
    }
}

/// A link created outside the per-file classification pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PostLink {
    /// Inside `dir`, point `link` at the single file matching the glob `target`.
    /// `{version}` in both expands to the category package's version cut to
    /// `components` components.
    VersionedAlias {
        dir: PathBuf,
        link: String,
        target: String,
        components: usize,
    },
    /// Link an absolute `source` (with `{package}` expanded to the resolved
    /// package name) to `dest` inside the output directory.
    Direct { source: String, dest: PathBuf },
}

impl Layout {
    /// Names of the built-in layouts.
    pub const BUILTIN: [&'static str; 2] = [cuda::NAME, mkl_dnn::NAME];

    /// Look up a built-in layout by name.
    pub fn builtin(name: &str) -> Option<Layout> {
        match name {
            cuda::NAME => Some(cuda::layout()),
            mkl_dnn::NAME => Some(mkl_dnn::layout()),
            _ => None,
        }
    }

    /// Load and validate a layout from a JSON file.
    #[tracing::instrument(level = "trace", skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Layout> {
        let content = runtime.read_to_string(path)?;
        let layout: Layout = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse layout file {:?}", path))?;
        layout
            .validate()
            .with_context(|| format!("Invalid layout file {:?}", path))?;
        Ok(layout)
    }

    /// Check the invariants the tree builder relies on.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("Layout name must not be empty");
        }
        if self.categories.is_empty() {
            bail!("Layout '{}' has no categories", self.name);
        }

        for source in &self.versions {
            if source.package.is_empty() {
                bail!("Version source '{}' has an empty package", source.name);
            }
            if source.components == 0 {
                bail!("Version source '{}' keeps zero components", source.name);
            }
        }

        for category in &self.categories {
            if category.package.is_empty() {
                bail!("Category '{}' has an empty package", category.name);
            }
            for rule in &category.rules {
                if rule.prefix.is_empty() {
                    bail!("Category '{}' has a rule with an empty prefix", category.name);
                }
                check_inside_output(&category.name, &rule.destination)?;
            }
            for post in &category.post {
                match post {
                    PostLink::VersionedAlias {
                        dir, components, ..
                    } => {
                        check_inside_output(&category.name, dir)?;
                        if *components == 0 {
                            bail!(
                                "Category '{}' has a versioned alias keeping zero components",
                                category.name
                            );
                        }
                    }
                    PostLink::Direct { dest, .. } => check_inside_output(&category.name, dest)?,
                }
            }
        }

        Ok(())
    }
}

fn check_inside_output(category: &str, path: &Path) -> Result<()> {
    use std::path::Component;

    if path.as_os_str().is_empty() {
        bail!("Category '{}' has an empty destination", category);
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        bail!(
            "Category '{}' destination {:?} must be a plain relative path",
            category,
            path
        );
    }
    Ok(())
}
