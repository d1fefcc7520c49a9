// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration.

use crate::generate::DEFAULT_MODULE_NAME;
use crate::scanner::DEFAULT_MAX_CONCURRENT_IO;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable listing installation prefixes.
pub const AMENT_PREFIX_PATH: &str = "AMENT_PREFIX_PATH";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Installation prefixes to scan (empty = `AMENT_PREFIX_PATH`).
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// Declaration file to write.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Staging directory for synthesized service halves.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Name of the declared module.
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Synthesize `<Service>_Event` messages.
    #[serde(default)]
    pub service_events: bool,

    /// Maximum number of in-flight file operations during a scan.
    #[serde(default = "default_max_concurrent_io")]
    pub max_concurrent_io: usize,

    /// Exclusion rules.
    #[serde(default)]
    pub filters: Vec<FilterRule>,
}

fn default_output() -> PathBuf {
    PathBuf::from("types/interfaces.d.ts")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_module_name() -> String {
    DEFAULT_MODULE_NAME.to_string()
}

fn default_max_concurrent_io() -> usize {
    DEFAULT_MAX_CONCURRENT_IO
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            output: default_output(),
            work_dir: default_work_dir(),
            module_name: default_module_name(),
            service_events: false,
            max_concurrent_io: default_max_concurrent_io(),
            filters: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::Invalid("Empty module name".into()));
        }
        if self.max_concurrent_io == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_io must be greater than 0".into(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("Empty output path".into()));
        }

        for (i, rule) in self.filters.iter().enumerate() {
            if rule.package.is_none() && rule.interface.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "Filter {} has neither a package nor an interface pattern",
                    i
                )));
            }
            rule.compile()?;
        }

        Ok(())
    }

    /// Roots to scan: the configured ones, or `AMENT_PREFIX_PATH`.
    pub fn resolved_roots(&self) -> Vec<PathBuf> {
        if !self.roots.is_empty() {
            return self.roots.clone();
        }
        std::env::var_os(AMENT_PREFIX_PATH)
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Add a root to scan.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Set the declaration output file.
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the staging directory.
    pub fn work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Set the declared module name.
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Enable or disable service event synthesis.
    pub fn service_events(mut self, enabled: bool) -> Self {
        self.service_events = enabled;
        self
    }

    /// Bound concurrent file operations during the scan.
    pub fn max_concurrent_io(mut self, max: usize) -> Self {
        self.max_concurrent_io = max;
        self
    }

    /// Add an exclusion rule.
    pub fn filter(mut self, rule: FilterRule) -> Self {
        self.filters.push(rule);
        self
    }
}

/// One exclusion rule. Present patterns must all match (full match).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Package name pattern (regex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Interface name pattern (regex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl FilterRule {
    /// Exclude every interface of a package.
    pub fn package(pattern: impl Into<String>) -> Self {
        Self {
            package: Some(pattern.into()),
            interface: None,
        }
    }

    /// Exclude interfaces by name in every package.
    pub fn interface(pattern: impl Into<String>) -> Self {
        Self {
            package: None,
            interface: Some(pattern.into()),
        }
    }

    /// Restrict to an interface name pattern.
    pub fn with_interface(mut self, pattern: impl Into<String>) -> Self {
        self.interface = Some(pattern.into());
        self
    }

    pub(crate) fn compile(&self) -> Result<CompiledRule, ConfigError> {
        Ok(CompiledRule {
            package: self.package.as_deref().map(anchored).transpose()?,
            interface: self.interface.as_deref().map(anchored).transpose()?,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) package: Option<regex::Regex>,
    pub(crate) interface: Option<regex::Regex>,
}

fn anchored(pattern: &str) -> Result<regex::Regex, ConfigError> {
    regex::Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
