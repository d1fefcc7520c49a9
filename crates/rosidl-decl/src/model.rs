// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery model: interface references grouped per package.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Category an IDL artifact belongs to, decided by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceCategory {
    Message,
    Service,
    Action,
}

impl InterfaceCategory {
    /// Map a file extension (without the dot) to a category.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "msg" => Some(Self::Message),
            "srv" => Some(Self::Service),
            "action" => Some(Self::Action),
            _ => None,
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// File extension used for this category.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Message => "msg",
            Self::Service => "srv",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for InterfaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One discoverable IDL artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceReference {
    pub package_name: String,
    pub interface_name: String,
    pub category: InterfaceCategory,
    /// Category bucket on disk (`msg`, `srv`, `srvs`, `action`, ...).
    pub sub_folder: String,
    pub file_path: PathBuf,
    /// Request/Response halves produced by the service splitter.
    pub synthesized_from_service: bool,
}

impl InterfaceReference {
    pub fn new(
        package_name: impl Into<String>,
        sub_folder: impl Into<String>,
        interface_name: impl Into<String>,
        category: InterfaceCategory,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            interface_name: interface_name.into(),
            category,
            sub_folder: sub_folder.into(),
            file_path: file_path.into(),
            synthesized_from_service: false,
        }
    }

    /// Derive a Request/Response message reference from this service reference.
    pub fn derived_half(&self, suffix: &str, file_path: impl Into<PathBuf>) -> Self {
        Self {
            package_name: self.package_name.clone(),
            interface_name: format!("{}{}", self.interface_name, suffix),
            category: InterfaceCategory::Message,
            sub_folder: self.sub_folder.clone(),
            file_path: file_path.into(),
            synthesized_from_service: true,
        }
    }

    /// Uniqueness key within a scan.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.package_name, &self.sub_folder, &self.interface_name)
    }

    /// `<package>/<subfolder>/<interface>`
    pub fn full_name(&self) -> String {
        format!(
            "{}/{}/{}",
            self.package_name, self.sub_folder, self.interface_name
        )
    }
}

impl fmt::Display for InterfaceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.file_path.display())
    }
}

/// All references discovered for one package.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PackageRecord {
    pub package_name: String,
    pub messages: Vec<InterfaceReference>,
    pub services: Vec<InterfaceReference>,
    pub actions: Vec<InterfaceReference>,
}

impl PackageRecord {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            ..Default::default()
        }
    }

    /// Record a reference in its category list. Returns `false` if an
    /// entry with the same key is already present.
    pub fn add(&mut self, reference: InterfaceReference) -> bool {
        if self.contains(&reference) {
            return false;
        }
        match reference.category {
            InterfaceCategory::Message => self.messages.push(reference),
            InterfaceCategory::Service => self.services.push(reference),
            InterfaceCategory::Action => self.actions.push(reference),
        }
        true
    }

    pub fn contains(&self, reference: &InterfaceReference) -> bool {
        self.references().any(|r| r.key() == reference.key())
    }

    /// Messages, then services, then actions.
    pub fn references(&self) -> impl Iterator<Item = &InterfaceReference> {
        self.messages
            .iter()
            .chain(self.services.iter())
            .chain(self.actions.iter())
    }

    pub fn len(&self) -> usize {
        self.messages.len() + self.services.len() + self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Package name -> record, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PackageMap {
    packages: IndexMap<String, PackageRecord>,
}

impl PackageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference, creating the package entry on first use.
    pub fn add(&mut self, reference: InterfaceReference) -> bool {
        self.packages
            .entry(reference.package_name.clone())
            .or_insert_with(|| PackageRecord::new(reference.package_name.clone()))
            .add(reference)
    }

    /// Merge another map in; entries whose key already exists are ignored.
    pub fn merge(&mut self, other: PackageMap) {
        for record in other.packages.into_values() {
            let PackageRecord {
                messages,
                services,
                actions,
                ..
            } = record;
            for reference in messages.into_iter().chain(services).chain(actions) {
                self.add(reference);
            }
        }
    }

    /// Whether a reference with the same key is recorded.
    pub fn contains(&self, reference: &InterfaceReference) -> bool {
        self.packages
            .get(&reference.package_name)
            .is_some_and(|record| record.contains(reference))
    }

    pub fn get(&self, package_name: &str) -> Option<&PackageRecord> {
        self.packages.get(package_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Total number of recorded references.
    pub fn reference_count(&self) -> usize {
        self.packages.values().map(PackageRecord::len).sum()
    }
}
