//! Tree builder: resolve packages, classify their files, relink them.

mod classify;
mod relink;
mod resolve;

use anyhow::{Context, Result, bail};
use glob::Pattern;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::layout::{Layout, PostLink, expand};
use crate::package::{PackageDatabase, PackageRef, VersionResolver};
use crate::runtime::{Runtime, relative_symlink_path};

pub use classify::PathClassifier;
pub use relink::{RelinkOutcome, SymlinkEdge, destination_for, relative_remainder, relink};
pub use resolve::{ResolvedCategory, resolve_layout};

/// What a build produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildReport {
    /// Symlinks created, in creation order
    pub edges: Vec<SymlinkEdge>,
    /// Manifest entries that matched no rule or were directories
    pub skipped: usize,
    /// Post links that were applied
    pub fixups: usize,
}

pub struct TreeBuilder<'a, R: Runtime, D: PackageDatabase> {
    runtime: &'a R,
    db: &'a D,
    config: &'a Config,
}

impl<'a, R: Runtime, D: PackageDatabase> TreeBuilder<'a, R, D> {
    pub fn new(runtime: &'a R, db: &'a D, config: &'a Config) -> Self {
        Self {
            runtime,
            db,
            config,
        }
    }

    /// Build `layout` under the configured output root.
    #[tracing::instrument(level = "trace", skip(self, layout), fields(layout = %layout.name))]
    pub fn build(&self, layout: &Layout) -> Result<BuildReport> {
        let resolved = resolve_layout(self.db, layout)?;

        let root = &self.config.output_root;
        self.runtime.create_dir_all(root)?;

        let mut report = BuildReport::default();
        for item in &resolved {
            self.link_category(item, &mut report)?;
            for post in &item.category.post {
                self.apply_post(post, &item.package, &mut report)
                    .with_context(|| format!("Fixup for {} failed", item.package.name))?;
            }
        }

        Ok(report)
    }

    fn link_category(&self, item: &ResolvedCategory<'_>, report: &mut BuildReport) -> Result<()> {
        let package = &item.package;
        info!("Linking {} ({})", item.category.name, package.name);

        let files = self
            .db
            .list_package_files(&package.name)
            .with_context(|| format!("Failed to list files of {}", package.name))?;
        let classifier = PathClassifier::new(&item.category.rules);

        let before = report.edges.len();
        for file in &files {
            let Some(rule) = classifier.classify(self.runtime, file) else {
                report.skipped += 1;
                continue;
            };

            let dst_root = self.config.output_root.join(&rule.destination);
            match relink(self.runtime, file, &rule.prefix, &dst_root)? {
                RelinkOutcome::Created(edge) => report.edges.push(edge),
                RelinkOutcome::Skipped => report.skipped += 1,
                RelinkOutcome::Conflict(dest) => bail!(
                    "Cannot link {} from {}: {:?} already exists",
                    file,
                    package.name,
                    dest
                ),
            }
        }

        debug!(
            "{}: {} link(s) from {} manifest entries",
            package.name,
            report.edges.len() - before,
            files.len()
        );
        Ok(())
    }

    fn apply_post(&self, post: &PostLink, package: &PackageRef, report: &mut BuildReport) -> Result<()> {
        let root = &self.config.output_root;
        match post {
            PostLink::VersionedAlias {
                dir,
                link,
                target,
                components,
            } => {
                let version = VersionResolver::truncate(&package.version, *components)?;
                let vars = [("version", version.as_str())];
                let dir = root.join(dir);
                let link = dir.join(expand(link, &vars)?);
                // Only the target template is a pattern; the output path is literal.
                let pattern = PathBuf::from(format!(
                    "{}/{}",
                    Pattern::escape(&dir.to_string_lossy()),
                    expand(target, &vars)?
                ));

                if self.runtime.is_symlink(&link) || self.runtime.exists(&link) {
                    debug!("{:?} is already provided by the package", link);
                    return Ok(());
                }

                let matches = self.runtime.glob(&pattern)?;
                let Some(chosen) = matches.iter().max_by(|a, b| {
                    VersionResolver::compare(&a.to_string_lossy(), &b.to_string_lossy())
                }) else {
                    bail!("No file matches {:?} to provide {:?}", pattern, link);
                };
                if matches.len() > 1 {
                    info!(
                        "{} files match {:?}, using the highest version {:?}",
                        matches.len(),
                        pattern,
                        chosen
                    );
                }

                let link_target =
                    relative_symlink_path(&link, chosen).unwrap_or_else(|| chosen.clone());
                self.create_link(&link_target, &link, report)
            }
            PostLink::Direct { source, dest } => {
                let source = PathBuf::from(expand(source, &[("package", package.name.as_str())])?);
                if !self.runtime.exists(&source) {
                    bail!("{:?} does not exist", source);
                }

                let dest = root.join(dest);
                if let Some(parent) = dest.parent() {
                    self.runtime.create_dir_all(parent)?;
                }
                if self.runtime.is_symlink(&dest) || self.runtime.exists(&dest) {
                    bail!("{:?} already exists", dest);
                }
                self.create_link(&source, &dest, report)
            }
        }
    }

    fn create_link(&self, target: &Path, link: &Path, report: &mut BuildReport) -> Result<()> {
        self.runtime.symlink(target, link)?;
        info!("Linked {:?} -> {:?}", link, target);
        report.fixups += 1;
        report.edges.push(SymlinkEdge {
            source: target.to_path_buf(),
            destination: link.to_path_buf(),
        });
        Ok(())
    }
}
