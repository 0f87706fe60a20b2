// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semantic validation for assemblies.
//!
//! Parsing accepts anything well-formed; this pass rejects assemblies the
//! runtime could not install faithfully:
//! - Duplicate component names or configuration pids
//! - Slot name collisions within a component
//! - Validation patterns that do not compile

use crate::Assembly;
use std::collections::HashSet;
use std::fmt;

/// Collection of validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "assembly validation failed with {} error(s)",
            self.errors.len()
        )?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n  {}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A single validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateComponent { name: String },
    DuplicateConfiguration { pid: String },
    /// Two slots of one component share a name, possibly after numbering
    DuplicateSlot { component: String, slot: String },
    /// A numbered reference with `count = 0`
    EmptyCount { component: String, reference: String },
    EmptyName { item_kind: &'static str },
    InvalidPattern {
        component: String,
        key: String,
        message: String,
    },
    /// A service entry that provides nothing
    NoInterfaces { index: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateComponent { name } => {
                write!(f, "component '{}' is defined more than once", name)
            }
            ValidationError::DuplicateConfiguration { pid } => {
                write!(f, "configuration '{}' is defined more than once", pid)
            }
            ValidationError::DuplicateSlot { component, slot } => {
                write!(f, "component '{}' declares slot '{}' twice", component, slot)
            }
            ValidationError::EmptyCount {
                component,
                reference,
            } => write!(
                f,
                "reference '{}' of component '{}' has count 0",
                reference, component
            ),
            ValidationError::EmptyName { item_kind } => write!(f, "{} has an empty name", item_kind),
            ValidationError::InvalidPattern {
                component,
                key,
                message,
            } => write!(
                f,
                "invalid pattern for '{}' in component '{}': {}",
                key, component, message
            ),
            ValidationError::NoInterfaces { index } => {
                write!(f, "service[{}] lists no interfaces", index)
            }
        }
    }
}

/// Validate a parsed assembly, collecting every error
pub fn validate_assembly(assembly: &Assembly) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for component in &assembly.components {
        let descriptor = &component.descriptor;
        if descriptor.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName {
                item_kind: "component",
            });
        }
        if !names.insert(descriptor.name.as_str()) {
            errors.push(ValidationError::DuplicateComponent {
                name: descriptor.name.clone(),
            });
        }

        for reference in &descriptor.references {
            if reference.name.trim().is_empty() {
                errors.push(ValidationError::EmptyName {
                    item_kind: "reference",
                });
            }
            if reference.count == Some(0) {
                errors.push(ValidationError::EmptyCount {
                    component: descriptor.name.clone(),
                    reference: reference.name.clone(),
                });
            }
        }

        let mut slots = HashSet::new();
        for slot in descriptor.slots() {
            if !slots.insert(slot.name.clone()) {
                errors.push(ValidationError::DuplicateSlot {
                    component: descriptor.name.clone(),
                    slot: slot.name,
                });
            }
        }

        for (key, pattern) in &component.validation.patterns {
            if let Err(e) = regex::Regex::new(&format!("^(?:{})$", pattern)) {
                errors.push(ValidationError::InvalidPattern {
                    component: descriptor.name.clone(),
                    key: key.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    for (index, service) in assembly.services.iter().enumerate() {
        if service.interfaces.is_empty() {
            errors.push(ValidationError::NoInterfaces { index });
        }
    }

    let mut pids = HashSet::new();
    for configuration in &assembly.configurations {
        if configuration.pid.trim().is_empty() {
            errors.push(ValidationError::EmptyName {
                item_kind: "configuration",
            });
        }
        if !pids.insert(configuration.pid.as_str()) {
            errors.push(ValidationError::DuplicateConfiguration {
                pid: configuration.pid.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
