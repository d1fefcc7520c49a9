// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Package scanner.
//!
//! Walks an installation root and collects interface references per package.
//! Two layouts are supported:
//!
//! - **Ament index** (a `share` directory exists under the root): package
//!   names come from `share/ament_index/resource_index/rosidl_interfaces`,
//!   each package index file lists one artifact path per line.
//! - **Raw walk** (fallback): every `.msg`/`.srv`/`.action` file below the
//!   root, package name taken from the directory layout.
//!
//! Per-package index reads and per-file classification are fanned out as
//! tasks; results are merged on the calling task in submission order, so the
//! package map is never shared between tasks and the outcome is deterministic.

pub mod ament;
pub mod walk;

use crate::filter::InterfaceFilter;
use crate::model::{InterfaceCategory, InterfaceReference, PackageMap};
use crate::splitter::{ServiceSplitter, SplitError, SplitOutcome};
use serde::Serialize;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default bound on in-flight file operations.
pub const DEFAULT_MAX_CONCURRENT_IO: usize = 64;

/// Scanner errors.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot derive a package name for {path}")]
    UnresolvablePackage { path: PathBuf },

    #[error("Service split failed: {0}")]
    Split(#[from] SplitError),

    #[error("Scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScanError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Discovery strategy picked for a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    AmentIndex,
    RawWalk,
}

/// Outcome of scanning one or more roots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    pub packages: PackageMap,
    /// References dropped by the interface filter.
    pub omitted: Vec<InterfaceReference>,
}

impl ScanResult {
    /// Merge a later root's result; already-known keys are kept.
    pub fn merge(&mut self, other: ScanResult) {
        self.packages.merge(other.packages);
        self.omitted.extend(other.omitted);
    }

    fn absorb(&mut self, outcome: FileOutcome) {
        for reference in outcome.recorded {
            self.packages.add(reference);
        }
        self.omitted.extend(outcome.omitted);
    }
}

/// What classifying a single file produced.
#[derive(Debug, Default)]
pub(crate) struct FileOutcome {
    recorded: Vec<InterfaceReference>,
    omitted: Vec<InterfaceReference>,
}

impl FileOutcome {
    fn skipped() -> Self {
        Self::default()
    }
}

struct ScanContext {
    filter: InterfaceFilter,
    splitter: ServiceSplitter,
}

/// Collects interface references from installation roots.
#[derive(Clone)]
pub struct PackageScanner {
    context: Arc<ScanContext>,
    limit: Arc<Semaphore>,
}

impl PackageScanner {
    /// Create a scanner.
    pub fn new(filter: InterfaceFilter, splitter: ServiceSplitter) -> Self {
        Self {
            context: Arc::new(ScanContext { filter, splitter }),
            limit: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_IO)),
        }
    }

    /// Bound the number of concurrent file operations.
    pub fn with_max_concurrent_io(mut self, max: usize) -> Self {
        self.limit = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    /// Pick the strategy for a root by probing for `share`.
    pub async fn detect_strategy(root: &Path) -> Result<ScanStrategy, ScanError> {
        let share = root.join("share");
        let has_share = tokio::fs::try_exists(&share)
            .await
            .map_err(|e| ScanError::io(&share, e))?;
        Ok(if has_share {
            ScanStrategy::AmentIndex
        } else {
            ScanStrategy::RawWalk
        })
    }

    /// Scan several roots in order and merge the results.
    ///
    /// A reference already recorded by an earlier root is skipped, so a
    /// later root never splits a service over the halves of an earlier one.
    pub async fn scan_all(&self, roots: &[PathBuf]) -> Result<ScanResult, ScanError> {
        let mut result = ScanResult::default();
        for root in roots {
            let known = Arc::new(result.packages.clone());
            result.merge(self.scan_root(root, known).await?);
        }
        Ok(result)
    }

    /// Scan one root.
    pub async fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_root(root, Arc::new(PackageMap::new())).await
    }

    async fn scan_root(&self, root: &Path, known: Arc<PackageMap>) -> Result<ScanResult, ScanError> {
        let strategy = Self::detect_strategy(root).await?;
        tracing::info!("Scanning {} ({:?})", root.display(), strategy);

        let outcomes = match strategy {
            ScanStrategy::AmentIndex => self.scan_ament(root, known).await?,
            ScanStrategy::RawWalk => self.scan_walk(root, known).await?,
        };

        let mut result = ScanResult::default();
        for outcome in outcomes {
            result.absorb(outcome);
        }

        tracing::info!(
            "[OK] {}: {} package(s), {} interface(s), {} omitted",
            root.display(),
            result.packages.len(),
            result.packages.reference_count(),
            result.omitted.len()
        );
        Ok(result)
    }

    async fn scan_ament(
        &self,
        root: &Path,
        known: Arc<PackageMap>,
    ) -> Result<Vec<FileOutcome>, ScanError> {
        let packages = ament::list_packages(root).await?;
        tracing::debug!("{} package(s) in the resource index", packages.len());

        let index_reads = packages
            .into_iter()
            .map(|package| {
                let root = root.to_path_buf();
                async move { ament::read_package_index(&root, &package).await }
            })
            .collect();
        let files: Vec<PathBuf> = self
            .join_ordered(index_reads)
            .await?
            .into_iter()
            .flatten()
            .collect();

        let classifications = files
            .into_iter()
            .map(|path| {
                let context = Arc::clone(&self.context);
                let known = Arc::clone(&known);
                async move {
                    if InterfaceCategory::from_path(&path).is_none() {
                        return Ok(FileOutcome::skipped());
                    }
                    match ament::reference_for(&path) {
                        Some(reference) => classify(&context, &known, reference).await,
                        None => {
                            tracing::error!(
                                "Cannot decompose {} into package/subfolder/name",
                                path.display()
                            );
                            Ok(FileOutcome::skipped())
                        }
                    }
                }
            })
            .collect();
        self.join_ordered(classifications).await
    }

    async fn scan_walk(
        &self,
        root: &Path,
        known: Arc<PackageMap>,
    ) -> Result<Vec<FileOutcome>, ScanError> {
        let files = walk::collect_files(root).await?;
        tracing::debug!("{} interface file(s) under {}", files.len(), root.display());

        let mut references = Vec::with_capacity(files.len());
        for path in files {
            references.push(walk::reference_for(&path)?);
        }

        let classifications = references
            .into_iter()
            .flatten()
            .map(|reference| {
                let context = Arc::clone(&self.context);
                let known = Arc::clone(&known);
                async move { classify(&context, &known, reference).await }
            })
            .collect();
        self.join_ordered(classifications).await
    }

    /// Run every future as a task and return the results in submission
    /// order. The first failure aborts the remaining tasks.
    async fn join_ordered<R, F>(&self, futures: Vec<F>) -> Result<Vec<R>, ScanError>
    where
        F: Future<Output = Result<R, ScanError>> + Send + 'static,
        R: Send + 'static,
    {
        let count = futures.len();
        let mut set = JoinSet::new();
        for (index, future) in futures.into_iter().enumerate() {
            let limit = Arc::clone(&self.limit);
            set.spawn(async move {
                let _permit = limit.acquire_owned().await.ok();
                (index, future.await)
            });
        }

        let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let (index, result) = joined?;
            slots[index] = Some(result?);
        }
        Ok(slots.into_iter().flatten().collect())
    }
}

/// Filter, classify and (for services) split one discovered file.
async fn classify(
    context: &ScanContext,
    known: &PackageMap,
    reference: InterfaceReference,
) -> Result<FileOutcome, ScanError> {
    let mut outcome = FileOutcome::default();

    if context.filter.matches_any(&reference) {
        tracing::info!("Omitting filtered interface: {}", reference);
        outcome.omitted.push(reference);
        return Ok(outcome);
    }

    if known.contains(&reference) {
        tracing::debug!("{} already recorded by an earlier root", reference);
        return Ok(outcome);
    }

    match reference.category {
        InterfaceCategory::Message => {
            if is_legacy_action_message(&reference.file_path) {
                tracing::debug!("Skipping legacy action message {}", reference);
            } else {
                outcome.recorded.push(reference);
            }
        }
        InterfaceCategory::Service => {
            if let SplitOutcome::Split {
                request, response, ..
            } = context.splitter.split(&reference).await?
            {
                for half in [request, response] {
                    if context.filter.matches_any(&half) {
                        tracing::info!("Omitting filtered interface: {}", half);
                        outcome.omitted.push(half);
                    } else {
                        outcome.recorded.push(half);
                    }
                }
            }
            outcome.recorded.push(reference);
        }
        InterfaceCategory::Action => outcome.recorded.push(reference),
    }

    Ok(outcome)
}

/// `.msg` files under an `action` directory were produced for actions by old
/// generators and are not first-class messages.
pub fn is_legacy_action_message(path: &Path) -> bool {
    path.ancestors()
        .skip(1)
        .take(2)
        .filter_map(|dir| dir.file_name())
        .any(|name| name == "action")
}
