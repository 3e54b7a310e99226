//! `dpkg-query` backed package database.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::PathBuf;
use std::process::{Command, Output};

use super::{PackageDatabase, PackageRef};

/// Output format for `dpkg-query -W`: status abbreviation, name, version.
const SHOW_FORMAT: &str = "${db:Status-Abbrev}\t${Package}\t${Version}\n";

/// Package database that shells out to `dpkg-query`.
pub struct Dpkg {
    program: PathBuf,
}

impl Dpkg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn query(&self, args: &[&str]) -> Result<Output> {
        Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {:?}", self.program))
    }

    /// Pick the first installed row out of `dpkg-query -W` output.
    ///
    /// Rows for packages that are known but not installed (e.g. `rc`, removed
    /// with config files left behind) are ignored.
    pub(crate) fn parse_show_output(pattern: &str, stdout: &str) -> Option<PackageRef> {
        let mut installed = stdout.lines().filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?;
            let name = fields.next()?.trim();
            let version = fields.next()?.trim();
            let is_installed = status.chars().nth(1) == Some('i');
            (is_installed && !name.is_empty()).then(|| PackageRef {
                requested_pattern: pattern.to_string(),
                name: name.to_string(),
                version: version.to_string(),
            })
        });

        let first = installed.next()?;
        let others: Vec<String> = installed.map(|p| p.name).collect();
        if !others.is_empty() {
            debug!(
                "Pattern '{}' also matches {:?}, using {}",
                pattern, others, first.name
            );
        }
        Some(first)
    }

    /// Extract owned paths from `dpkg-query -L` output.
    ///
    /// Diversion notes and the `/.` entry dpkg lists for every package are dropped.
    pub(crate) fn parse_list_output(stdout: &str) -> Vec<String> {
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('/') && *line != "/.")
            .map(str::to_string)
            .collect()
    }
}

impl PackageDatabase for Dpkg {
    #[tracing::instrument(level = "trace", skip(self))]
    fn resolve_package(&self, pattern: &str) -> Result<Option<PackageRef>> {
        let format = format!("--showformat={}", SHOW_FORMAT);
        let output = self.query(&["-W", &format, pattern])?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() && stdout.trim().is_empty() {
            // dpkg-query exits non-zero when nothing matches the pattern
            debug!(
                "dpkg-query found nothing for '{}': {}",
                pattern,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        Ok(Self::parse_show_output(pattern, &stdout))
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn list_package_files(&self, name: &str) -> Result<Vec<String>> {
        let output = self.query(&["-L", name])?;
        if !output.status.success() {
            bail!(
                "dpkg-query -L {} failed: {}",
                name,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let files = Self::parse_list_output(&String::from_utf8_lossy(&output.stdout));
        debug!("Package {} owns {} path(s)", name, files.len());
        Ok(files)
    }
}
