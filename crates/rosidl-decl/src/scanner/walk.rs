// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw directory walk discovery.

use super::ScanError;
use crate::model::{InterfaceCategory, InterfaceReference};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All regular files below `root`, following symbolic links, sorted by path.
///
/// Unreadable entries are logged and skipped.
pub async fn collect_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let root = root.to_path_buf();
    Ok(tokio::task::spawn_blocking(move || walk_blocking(&root)).await?)
}

fn walk_blocking(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(entry.into_path()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .collect()
}

/// Package name for a file found by the walk: its parent directory, or the
/// grandparent when the parent is named after the file extension
/// (`<package>/msg/Foo.msg`).
///
/// `Ok(None)` when the directory holding the name is not valid UTF-8. Running
/// out of parent directories is an error.
pub fn package_name(path: &Path, extension: &str) -> Result<Option<String>, ScanError> {
    let unresolvable = || ScanError::UnresolvablePackage {
        path: path.to_path_buf(),
    };

    let parent = path.parent().ok_or_else(unresolvable)?;
    let parent_name = parent.file_name().ok_or_else(unresolvable)?;
    if parent_name != extension {
        return Ok(parent_name.to_str().map(str::to_string));
    }

    let package_dir = parent.parent().and_then(Path::file_name).ok_or_else(unresolvable)?;
    Ok(package_dir.to_str().map(str::to_string))
}

/// Build a reference for a walked file; `None` for non-interface files and
/// for names that cannot be decomposed.
pub fn reference_for(path: &Path) -> Result<Option<InterfaceReference>, ScanError> {
    let Some(category) = InterfaceCategory::from_path(path) else {
        return Ok(None);
    };
    let extension = category.extension();
    let interface_name = path.file_stem().and_then(|stem| stem.to_str());
    let package = package_name(path, extension)?;

    let (Some(interface_name), Some(package)) = (interface_name, package) else {
        tracing::error!(
            "Cannot decompose {} into package/subfolder/name",
            path.display()
        );
        return Ok(None);
    };

    Ok(Some(InterfaceReference::new(
        package,
        extension,
        interface_name,
        category,
        path,
    )))
}
