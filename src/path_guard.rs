//! File-system boundary of the locator.
//!
//! A caller-supplied relative path is only ever read when it resolves to an
//! existing file under the project root and outside every excluded
//! dependency directory. Rejections happen before any read.

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::config::LocatorOptions;
use crate::error::LocatorError;

/// Validate `file_path` against the configured root and return the absolute path to read.
pub fn validate_file_path(file_path: &str, options: &LocatorOptions) -> Result<PathBuf, LocatorError> {
    if file_path.trim().is_empty() {
        return Err(LocatorError::MissingPath);
    }

    if file_path.contains("..") || file_path.contains('\0') {
        return Err(LocatorError::InvalidPath);
    }

    let root = absolute_root(&options.project_root)?;
    let resolved = normalize(&root.join(file_path));

    if !resolved.starts_with(&root) {
        return Err(LocatorError::InvalidPath);
    }

    if is_excluded(&resolved, &root, &options.excluded_dirs) {
        return Err(LocatorError::InvalidPath);
    }

    if !resolved.is_file() {
        return Err(LocatorError::FileNotFound);
    }

    // Symlinks inside the tree must not lead back out of it.
    let canonical_root = root.canonicalize().map_err(|_| LocatorError::InvalidPath)?;
    let canonical = resolved
        .canonicalize()
        .map_err(|_| LocatorError::FileNotFound)?;
    if !canonical.starts_with(&canonical_root)
        || is_excluded(&canonical, &canonical_root, &options.excluded_dirs)
    {
        return Err(LocatorError::InvalidPath);
    }

    Ok(resolved)
}

fn absolute_root(root: &Path) -> Result<PathBuf, LocatorError> {
    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        env::current_dir().map_err(LocatorError::Read)?.join(root)
    };
    Ok(normalize(&root))
}

/// Lexically resolve `.` and `..` without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn is_excluded(path: &Path, root: &Path, excluded_dirs: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| match c {
        Component::Normal(name) => excluded_dirs
            .iter()
            .any(|dir| name.to_str() == Some(dir.as_str())),
        _ => false,
    })
}
