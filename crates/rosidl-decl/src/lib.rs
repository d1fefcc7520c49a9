// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ROS 2 interface discovery and typed declaration generation.
//!
//! Discovers `.msg`, `.srv` and `.action` files in installed packages,
//! splits service files into their request/response messages, validates
//! that services and actions are complete, and writes one typed
//! declaration file describing every interface plus lookup tables.
//!
//! # Pipeline
//!
//! 1. **Scan** ([`scanner`]): ament resource index when the root has a
//!    `share` directory, raw directory walk otherwise. References matching
//!    the [`filter`] are dropped here.
//! 2. **Split** ([`splitter`]): service halves staged in the work directory.
//! 3. **Load** ([`idl`]): references parsed into descriptors.
//! 4. **Generate** ([`generate`]): [`classify`] maps field types,
//!    [`validate`] drops incomplete services and actions.
//!
//! # Quick Start
//!
//! ```bash
//! # Scan AMENT_PREFIX_PATH and write types/interfaces.d.ts
//! rosidl-decl-gen generate
//!
//! # Explicit roots and output
//! rosidl-decl-gen generate --root /opt/ros/jazzy --output out/interfaces.d.ts
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! roots = ["/opt/ros/jazzy"]
//! output = "types/interfaces.d.ts"
//! module_name = "rclnodejs"
//!
//! [[filters]]
//! package = "test_msgs"
//! interface = "Builtins|Nested"
//! ```

pub mod classify;
pub mod config;
pub mod filter;
pub mod generate;
pub mod idl;
pub mod model;
pub mod report;
pub mod scanner;
pub mod splitter;
pub mod validate;

pub use config::{ConfigError, FilterRule, GeneratorConfig};
pub use filter::InterfaceFilter;
pub use generate::{
    write_declarations, DeclarationGenerator, GenerateError, GenerationSummary,
};
pub use idl::{DescriptorLoader, IdlFileLoader, InterfaceDescriptor, LoadError};
pub use model::{InterfaceCategory, InterfaceReference, PackageMap, PackageRecord};
pub use report::GenerationReport;
pub use scanner::{PackageScanner, ScanError, ScanResult, ScanStrategy};
pub use splitter::{ServiceSplitter, SplitError};

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("No installation root configured and {} is not set", config::AMENT_PREFIX_PATH)]
    NoRoots,

    #[error("Pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Build the scanner described by a configuration.
pub fn scanner_for(config: &GeneratorConfig) -> Result<PackageScanner, Error> {
    let filter = InterfaceFilter::from_rules(&config.filters)?;
    Ok(PackageScanner::new(filter, ServiceSplitter::new(&config.work_dir))
        .with_max_concurrent_io(config.max_concurrent_io))
}

fn roots_for(config: &GeneratorConfig) -> Result<Vec<PathBuf>, Error> {
    let roots = config.resolved_roots();
    if roots.is_empty() {
        return Err(Error::NoRoots);
    }
    Ok(roots)
}

/// Run discovery only.
pub async fn scan_interfaces(config: &GeneratorConfig) -> Result<ScanResult, Error> {
    config.validate()?;
    let roots = roots_for(config)?;
    Ok(scanner_for(config)?.scan_all(&roots).await?)
}

/// Run the whole pipeline and write the declaration file.
pub async fn generate_declarations(config: &GeneratorConfig) -> Result<GenerationReport, Error> {
    config.validate()?;
    let roots = roots_for(config)?;
    let scan = scanner_for(config)?.scan_all(&roots).await?;

    let packages = scan.packages.clone();
    let loader = IdlFileLoader::new().with_service_events(config.service_events);
    let generator = DeclarationGenerator::new(config.module_name.clone());
    let output = config.output.clone();

    let summary = tokio::task::spawn_blocking(move || -> Result<GenerationSummary, Error> {
        let descriptors = idl::load_packages(&packages, &loader)?;
        Ok(write_declarations(&output, &descriptors, &generator)?)
    })
    .await??;

    Ok(GenerationReport::new(
        config.module_name.clone(),
        config.output.clone(),
        roots,
        &scan,
        summary,
    ))
}
