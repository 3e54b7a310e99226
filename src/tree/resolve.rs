//! Package resolution for a layout.
//!
//! Every package a layout needs is resolved up front, before anything touches
//! the output directory, so a missing package never leaves a half-built tree.

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::layout::{Category, Layout, expand};
use crate::package::{PackageDatabase, PackageRef, VersionResolver};

/// A category together with the installed package that feeds it.
#[derive(Debug)]
pub struct ResolvedCategory<'a> {
    pub category: &'a Category,
    pub package: PackageRef,
}

fn require<D: PackageDatabase>(db: &D, pattern: &str) -> Result<PackageRef> {
    match db.resolve_package(pattern)? {
        Some(package) => {
            info!("Found {} {}", package.name, package.version);
            Ok(package)
        }
        None => bail!("Required package '{}' is not installed", pattern),
    }
}

/// Resolve the layout's version sources, then the package of every category.
#[tracing::instrument(level = "trace", skip(db, layout), fields(layout = %layout.name))]
pub fn resolve_layout<'a, D: PackageDatabase>(
    db: &D,
    layout: &'a Layout,
) -> Result<Vec<ResolvedCategory<'a>>> {
    let mut vars: Vec<(String, String)> = Vec::with_capacity(layout.versions.len());
    for source in &layout.versions {
        let package = require(db, &source.package)?;
        let value = VersionResolver::truncate(&package.version, source.components)
            .with_context(|| format!("Failed to detect the {} version", source.name))?;
        debug!("Version variable {{{}}} = {}", source.name, value);
        vars.push((source.name.clone(), value));
    }
    let vars: Vec<(&str, &str)> = vars
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    layout
        .categories
        .iter()
        .map(|category| -> Result<ResolvedCategory<'a>> {
            let pattern = expand(&category.package, &vars)
                .with_context(|| format!("Invalid package pattern in '{}'", category.name))?;
            Ok(ResolvedCategory {
                category,
                package: require(db, &pattern)?,
            })
        })
        .collect()
}
