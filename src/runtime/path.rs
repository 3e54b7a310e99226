//! Path utility functions.

use std::path::{Path, PathBuf};

/// Calculate the relative path from a symlink location to a target.
///
/// For example, a link at `/out/lib64/libcudnn.so.8` pointing to
/// `/out/lib64/libcudnn.so.8.9.1` gets the target `libcudnn.so.8.9.1`.
///
/// Returns `None` if a relative path cannot be computed.
pub fn relative_symlink_path(from_link: &Path, to_target: &Path) -> Option<PathBuf> {
    let from_dir = from_link.parent()?;
    let result = pathdiff::diff_paths(to_target, from_dir)?;

    if result.is_absolute() {
        return None;
    }

    Some(result)
}
