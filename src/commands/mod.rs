//! Command implementations behind the CLI.

use anyhow::{Context, Result};
use log::info;

use crate::config::Config;
use crate::layout::Layout;
use crate::package::PackageDatabase;
use crate::runtime::Runtime;
use crate::tree::{BuildReport, TreeBuilder};

/// Build `layout` into `config.output_root`.
#[tracing::instrument(level = "trace", skip(runtime, db, config, layout))]
pub fn build<R: Runtime, D: PackageDatabase>(
    runtime: &R,
    db: &D,
    config: &Config,
    layout: &Layout,
) -> Result<BuildReport> {
    info!(
        "Building {} layout in {}",
        layout.name,
        config.output_root.display()
    );

    let report = TreeBuilder::new(runtime, db, config).build(layout)?;

    info!(
        "Created {} symlink(s) ({} fixup(s), {} manifest entries skipped)",
        report.edges.len(),
        report.fixups,
        report.skipped
    );
    Ok(report)
}

/// Render a built-in layout as the JSON accepted by `build --layout`.
pub fn show_layout(name: &str) -> Result<String> {
    let layout = Layout::builtin(name).with_context(|| format!("Unknown layout '{}'", name))?;
    Ok(serde_json::to_string_pretty(&layout)?)
}
