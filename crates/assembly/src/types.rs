// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed assembly definitions

use fx_core::component::{AcceptAll, AllOf, PatternRules, RequiredKeys};
use fx_core::{ComponentDescriptor, ConfigValidator, Dictionary};
use std::sync::Arc;

/// A parsed assembly: components to install plus the external services and
/// configurations present when they are installed
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Raw `[runtime]` table, interpreted by the runtime
    pub runtime: Option<toml::Table>,
    pub components: Vec<ComponentDef>,
    pub services: Vec<ServiceDef>,
    pub configurations: Vec<ConfigurationDef>,
}

impl Assembly {
    /// Get a component definition by name
    pub fn get_component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.iter().find(|c| c.descriptor.name == name)
    }

    /// Get a configuration definition by pid
    pub fn get_configuration(&self, pid: &str) -> Option<&ConfigurationDef> {
        self.configurations.iter().find(|c| c.pid == pid)
    }

    /// One-line summary used by `fx check`
    pub fn summary(&self) -> String {
        format!(
            "{} components, {} services, {} configurations",
            self.components.len(),
            self.services.len(),
            self.configurations.len()
        )
    }
}

/// A `[[component]]` entry
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub descriptor: ComponentDescriptor,
    pub validation: ValidationDef,
}

/// Reconfiguration rules from `[component.validate]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationDef {
    pub required: Vec<String>,
    /// Key and full-match pattern, in key order
    pub patterns: Vec<(String, String)>,
}

impl ValidationDef {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.patterns.is_empty()
    }

    /// Build the validator these rules describe
    pub fn build(&self) -> Result<Arc<dyn ConfigValidator>, regex::Error> {
        if self.is_empty() {
            return Ok(Arc::new(AcceptAll));
        }
        let mut all = AllOf::new();
        if !self.required.is_empty() {
            all = all.with(RequiredKeys::new(self.required.iter().cloned()));
        }
        if !self.patterns.is_empty() {
            let mut rules = PatternRules::new();
            for (key, pattern) in &self.patterns {
                rules = rules.rule(key.clone(), pattern)?;
            }
            all = all.with(rules);
        }
        Ok(Arc::new(all))
    }
}

/// A `[[service]]` entry: a service registered outside any component
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDef {
    pub interfaces: Vec<String>,
    pub properties: Dictionary,
}

/// A `[[configuration]]` entry
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationDef {
    pub pid: String,
    pub values: Dictionary,
}
