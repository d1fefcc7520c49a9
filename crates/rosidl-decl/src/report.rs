// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generation report and JSON manifest.

use crate::generate::GenerationSummary;
use crate::scanner::ScanResult;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// RFC 3339 UTC timestamp.
    pub generated_at: String,
    pub module_name: String,
    pub output: PathBuf,
    pub roots: Vec<PathBuf>,
    /// Packages found by the scan, including ones without declarations.
    pub packages_scanned: usize,
    /// References recorded by the scan.
    pub interfaces_scanned: usize,
    #[serde(flatten)]
    pub summary: GenerationSummary,
    /// Filtered references, as `<package>/<subfolder>/<interface>`.
    pub omitted: Vec<String>,
}

impl GenerationReport {
    pub fn new(
        module_name: impl Into<String>,
        output: impl Into<PathBuf>,
        roots: Vec<PathBuf>,
        scan: &ScanResult,
        summary: GenerationSummary,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            module_name: module_name.into(),
            output: output.into(),
            roots,
            packages_scanned: scan.packages.len(),
            interfaces_scanned: scan.packages.reference_count(),
            summary,
            omitted: scan.omitted.iter().map(|r| r.full_name()).collect(),
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("  Interface Declaration Report");
        println!("{}", "=".repeat(60));
        println!();
        println!("  [OK] Packages:    {}", self.summary.packages);
        println!("  [OK] Messages:    {}", self.summary.messages);
        println!("  [OK] Services:    {}", self.summary.services);
        println!("  [OK] Actions:     {}", self.summary.actions);
        println!("       Internal:    {}", self.summary.internal);
        if !self.omitted.is_empty() {
            println!("  [--] Filtered:    {}", self.omitted.len());
        }
        if !self.summary.incomplete.is_empty() {
            println!("  [!!] Incomplete:  {}", self.summary.incomplete.len());
            for name in &self.summary.incomplete {
                println!("    - {}", name);
            }
        }
        println!();
        println!("  Module '{}' written to:", self.module_name);
        println!("    - {}", self.output.display());
        println!();
        println!("{}", "=".repeat(60));
    }

    /// Write the report as pretty JSON.
    pub fn write_manifest(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::from)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
    }
}
