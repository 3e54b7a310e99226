//! Run configuration, built once from the command line.

use std::path::{Path, PathBuf};

/// Package database executable used when nothing else is configured.
pub const DEFAULT_DPKG_QUERY: &str = "dpkg-query";

/// Everything a run needs to know, passed explicitly to every component.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name shown in the `[tool]` log prefix
    pub tool: String,
    /// Directory the tree is built in; must not exist before the run
    pub output_root: PathBuf,
    /// Whether DEBUG messages are shown
    pub verbose: bool,
    /// `dpkg-query` executable
    pub dpkg_query: PathBuf,
}

impl Config {
    pub fn new(layout: &str, output_root: PathBuf, verbose: bool, dpkg_query: PathBuf) -> Self {
        Self {
            tool: tool_name(layout),
            output_root,
            verbose,
            dpkg_query,
        }
    }
}

/// Log prefix for a layout, e.g. `vendorlink-cuda`.
pub fn tool_name(layout: &str) -> String {
    format!("{}-{}", env!("CARGO_PKG_NAME"), layout)
}

/// clap value parser for the output directory: it must not exist yet.
///
/// A dangling symlink counts as existing.
pub fn parse_new_output(value: &str) -> Result<PathBuf, String> {
    if value.is_empty() {
        return Err("output directory must not be empty".to_string());
    }
    let path = Path::new(value);
    if path.symlink_metadata().is_ok() {
        return Err(format!("{} already exists", value));
    }
    Ok(path.to_path_buf())
}
