// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface exclusion filter.
//!
//! Consulted before a reference is admitted to a package record.

use crate::config::{CompiledRule, ConfigError, FilterRule};
use crate::model::InterfaceReference;

/// Compiled set of exclusion rules. Matches nothing when empty.
#[derive(Debug, Clone, Default)]
pub struct InterfaceFilter {
    rules: Vec<CompiledRule>,
}

impl InterfaceFilter {
    /// Filter that excludes nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Compile exclusion rules.
    pub fn from_rules(rules: &[FilterRule]) -> Result<Self, ConfigError> {
        let rules = rules
            .iter()
            .map(FilterRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Check whether any rule excludes the given package/interface pair.
    pub fn matches(&self, package_name: &str, interface_name: &str) -> bool {
        self.rules.iter().any(|rule| {
            let package_ok = rule
                .package
                .as_ref()
                .map_or(true, |re| re.is_match(package_name));
            let interface_ok = rule
                .interface
                .as_ref()
                .map_or(true, |re| re.is_match(interface_name));
            package_ok && interface_ok && (rule.package.is_some() || rule.interface.is_some())
        })
    }

    /// Check whether any rule excludes the reference.
    pub fn matches_any(&self, reference: &InterfaceReference) -> bool {
        self.matches(&reference.package_name, &reference.interface_name)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
