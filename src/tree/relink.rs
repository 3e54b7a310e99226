//! The relative relink primitive.
//!
//! Given an absolute source file, the root it is installed under and a
//! destination root, place a symlink at the same relative position under the
//! destination root.

use anyhow::{Result, bail};
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// A created symlink: `destination` points at `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkEdge {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// What the primitive did with one source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelinkOutcome {
    /// A new symlink was created
    Created(SymlinkEdge),
    /// The source is a directory; nothing was done
    Skipped,
    /// Something already occupies the destination; it was left untouched
    Conflict(PathBuf),
}

/// Path of `src` relative to `src_root`.
///
/// The root must be a literal string prefix of the source; no normalization is
/// applied. Separators left over when the root lacks a trailing slash are
/// dropped so the result never reads as absolute.
pub fn relative_remainder<'a>(src: &'a str, src_root: &str) -> Result<&'a str> {
    if src.is_empty() {
        bail!("Source path is empty");
    }
    if src_root.is_empty() {
        bail!("Source root is empty");
    }
    let Some(rest) = src.strip_prefix(src_root) else {
        bail!("Source {:?} is not under source root {:?}", src, src_root);
    };
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        bail!("Source {:?} is the source root itself", src);
    }
    Ok(rest)
}

/// Destination of `src` under `dst_root`, plus the directory that has to exist
/// for it.
pub fn destination_for(src: &str, src_root: &str, dst_root: &Path) -> Result<(PathBuf, PathBuf)> {
    if dst_root.as_os_str().is_empty() {
        bail!("Destination root is empty");
    }
    let relative = Path::new(relative_remainder(src, src_root)?);
    let Some(file_name) = relative.file_name() else {
        bail!("Source {:?} has no file name", src);
    };

    let dir = match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => dst_root.join(parent),
        _ => dst_root.to_path_buf(),
    };
    let destination = dir.join(file_name);
    Ok((dir, destination))
}

/// Link `src` into `dst_root` at its position relative to `src_root`.
///
/// Directories are skipped. Precondition violations are errors. An occupied
/// destination is reported as [`RelinkOutcome::Conflict`], never overwritten.
#[tracing::instrument(level = "trace", skip(runtime))]
pub fn relink<R: Runtime>(
    runtime: &R,
    src: &str,
    src_root: &str,
    dst_root: &Path,
) -> Result<RelinkOutcome> {
    if runtime.is_dir(Path::new(src)) {
        debug!("Skipping directory {}", src);
        return Ok(RelinkOutcome::Skipped);
    }

    let (dir, destination) = destination_for(src, src_root, dst_root)?;
    runtime.create_dir_all(&dir)?;

    if runtime.is_symlink(&destination) || runtime.exists(&destination) {
        return Ok(RelinkOutcome::Conflict(destination));
    }

    let source = PathBuf::from(src);
    runtime.symlink(&source, &destination)?;
    debug!("Linked {:?} -> {:?}", destination, source);

    Ok(RelinkOutcome::Created(SymlinkEdge {
        source,
        destination,
    }))
}
