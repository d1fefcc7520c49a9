// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ament resource index discovery.

use super::ScanError;
use crate::model::{InterfaceCategory, InterfaceReference};
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Resource index directory listing packages that ship interfaces.
pub const RESOURCE_INDEX: &str = "share/ament_index/resource_index/rosidl_interfaces";

/// Matches `.../share/<package>/<subfolder>/<file>`.
const SHARE_PATH_PATTERN: &str = r"(?:^|/)share/(\w+)/(\w+)/[^/]+$";

fn share_path() -> &'static Regex {
    static SHARE_PATH: OnceLock<Regex> = OnceLock::new();
    SHARE_PATH.get_or_init(|| Regex::new(SHARE_PATH_PATTERN).expect("share path pattern is valid"))
}

/// Package names registered in the resource index, sorted.
///
/// A missing index directory yields no packages.
pub async fn list_packages(root: &Path) -> Result<Vec<String>, ScanError> {
    let index_dir = root.join(RESOURCE_INDEX);
    let mut entries = match tokio::fs::read_dir(&index_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ScanError::io(&index_dir, e)),
    };

    let mut packages = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ScanError::io(&index_dir, e))?
    {
        if let Some(name) = entry.file_name().to_str() {
            packages.push(name.to_string());
        }
    }
    packages.sort();
    Ok(packages)
}

/// Artifact paths listed in a package's index file, resolved under
/// `<root>/share/<package>`. A missing index file yields no paths.
pub async fn read_package_index(root: &Path, package: &str) -> Result<Vec<PathBuf>, ScanError> {
    let index_file = root.join(RESOURCE_INDEX).join(package);
    let content = match tokio::fs::read_to_string(&index_file).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ScanError::io(&index_file, e)),
    };

    let package_dir = root.join("share").join(package);
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| package_dir.join(line))
        .collect())
}

/// Derive `(package, subfolder)` from an installed artifact path.
pub fn package_and_subfolder(path: &Path) -> Option<(String, String)> {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let captures = share_path().captures(&normalized)?;
    Some((captures[1].to_string(), captures[2].to_string()))
}

/// Build a reference for an index entry.
///
/// Returns `None` for files that are not interface definitions and for paths
/// that do not follow the `share/<package>/<subfolder>/` layout.
pub fn reference_for(path: &Path) -> Option<InterfaceReference> {
    let category = InterfaceCategory::from_path(path)?;
    let interface_name = path.file_stem()?.to_str()?;
    let (package, sub_folder) = package_and_subfolder(path)?;
    Some(InterfaceReference::new(
        package,
        sub_folder,
        interface_name,
        category,
        path,
    ))
}
