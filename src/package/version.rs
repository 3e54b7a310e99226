//! Version extraction for Debian package versions.
//!
//! Turns `[epoch:]upstream[-revision]` strings into the short numeric
//! qualifiers layouts interpolate into package patterns and link names.

use anyhow::{Result, bail};
use std::cmp::Ordering;

/// Version resolver - pure functions over Debian version strings.
pub struct VersionResolver;

impl VersionResolver {
    /// Return the upstream part of a Debian version (epoch and revision removed).
    ///
    /// `1:10.1.243-3` becomes `10.1.243`; `8.9.1.23-1+cuda12.2` becomes `8.9.1.23`.
    pub fn upstream(version: &str) -> &str {
        let without_epoch = version.split_once(':').map_or(version, |(_, rest)| rest);
        without_epoch
            .rsplit_once('-')
            .map_or(without_epoch, |(upstream, _)| upstream)
    }

    /// Truncate a Debian version to its first `components` numeric components.
    ///
    /// Each component keeps only its leading digits, so `10.1.243~rc1-3` with two
    /// components gives `10.1`. Fails if the version has fewer numeric components
    /// than requested.
    pub fn truncate(version: &str, components: usize) -> Result<String> {
        if components == 0 {
            bail!("Cannot truncate version '{}' to zero components", version);
        }

        let upstream = Self::upstream(version);
        let parts: Vec<&str> = upstream
            .split('.')
            .take(components)
            .map(|part| {
                let end = part
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(part.len());
                &part[..end]
            })
            .collect();

        if parts.len() < components || parts.iter().any(|p| p.is_empty()) {
            bail!(
                "Cannot extract {} numeric version component(s) from '{}'",
                components,
                version
            );
        }

        Ok(parts.join("."))
    }

    /// Compare two strings the way version numbers order.
    ///
    /// Digit runs compare by numeric value and everything else compares
    /// bytewise, so `libcudnn.so.8.10.0` sorts after `libcudnn.so.8.9.1`.
    pub fn compare(a: &str, b: &str) -> Ordering {
        let (mut a, mut b) = (a, b);
        loop {
            match (a.is_empty(), b.is_empty()) {
                (true, true) => return Ordering::Equal,
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }

            let (a_chunk, a_rest) = split_run(a);
            let (b_chunk, b_rest) = split_run(b);
            let a_digits = a_chunk.starts_with(|c: char| c.is_ascii_digit());
            let b_digits = b_chunk.starts_with(|c: char| c.is_ascii_digit());
            let ord = if a_digits && b_digits {
                let a_num = a_chunk.trim_start_matches('0');
                let b_num = b_chunk.trim_start_matches('0');
                a_num
                    .len()
                    .cmp(&b_num.len())
                    .then_with(|| a_num.cmp(b_num))
            } else {
                a_chunk.cmp(b_chunk)
            };
            if ord != Ordering::Equal {
                return ord;
            }
            a = a_rest;
            b = b_rest;
        }
    }
}

/// Split off the leading run of digits or of non-digits.
fn split_run(s: &str) -> (&str, &str) {
    let digits = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .find(|c: char| c.is_ascii_digit() != digits)
        .unwrap_or(s.len());
    s.split_at(end)
}
