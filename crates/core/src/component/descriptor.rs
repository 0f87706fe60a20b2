// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static description of a component: what it provides and what it needs

use crate::config::Dictionary;
use crate::service::ServiceFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a dependency is satisfied by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// A registered service matching a filter
    #[default]
    Service,
    /// A configuration with the given pid
    Configuration,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Service => write!(f, "service"),
            DependencyKind::Configuration => write!(f, "configuration"),
        }
    }
}

/// A declared dependency.
///
/// With `count = Some(n)` the reference stands for `n` numbered slots named
/// `name0` through `name{n-1}`, each bound independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    /// Service filter text, or a pid for configuration references
    pub target: String,
    #[serde(default)]
    pub kind: DependencyKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Reference {
    pub fn service(name: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: filter.into(),
            kind: DependencyKind::Service,
            optional: false,
            count: None,
        }
    }

    pub fn configuration(name: impl Into<String>, pid: impl Into<String>) -> Self {
        Self {
            kind: DependencyKind::Configuration,
            ..Self::service(name, pid)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn numbered(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Expand into bindable slots
    pub fn slots(&self) -> Vec<Slot> {
        let slot = |name: String| Slot {
            name,
            target: self.target.clone(),
            kind: self.kind,
            optional: self.optional,
        };
        match self.count {
            None => vec![slot(self.name.clone())],
            Some(n) => (0..n).map(|i| slot(format!("{}{}", self.name, i))).collect(),
        }
    }
}

/// One bindable dependency position of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub name: String,
    pub target: String,
    pub kind: DependencyKind,
    pub optional: bool,
}

impl Slot {
    pub fn is_required(&self) -> bool {
        !self.optional
    }

    pub fn filter(&self) -> ServiceFilter {
        ServiceFilter::parse(&self.target)
    }
}

/// A component type: provided interfaces, default properties, dependencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub name: String,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub properties: Dictionary,
    /// Pid of the configuration that overrides `properties`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provides: Vec::new(),
            properties: Dictionary::new(),
            pid: None,
            references: Vec::new(),
        }
    }

    pub fn provides(mut self, interface: impl Into<String>) -> Self {
        self.provides.push(interface.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<crate::config::Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn with_pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    /// All slots in declaration order
    pub fn slots(&self) -> Vec<Slot> {
        self.references.iter().flat_map(Reference::slots).collect()
    }

    /// Default properties overlaid with `configuration`
    pub fn effective_configuration(&self, configuration: Option<&Dictionary>) -> Dictionary {
        let mut merged = self.properties.clone();
        if let Some(configuration) = configuration {
            for (key, value) in configuration.iter() {
                merged.insert(key, value.clone());
            }
        }
        merged
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
