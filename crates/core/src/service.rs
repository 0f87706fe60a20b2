// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service identities and provider matching

use crate::config::Dictionary;
use crate::id::InstanceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registration handle for a service, unique within one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(pub u64);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered service as seen by dependents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub interfaces: Vec<String>,
    pub properties: Dictionary,
    /// The component instance that registered it, `None` for external providers
    pub owner: Option<InstanceId>,
}

impl ServiceRecord {
    pub fn provides(&self, filter: &ServiceFilter) -> bool {
        filter.matches(&self.interfaces, &self.properties)
    }
}

/// Requirement on a provider: an interface name plus optional property
/// constraints, written `Name` or `Name(key=value,other=value)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceFilter {
    interface: String,
    properties: Vec<(String, String)>,
}

impl ServiceFilter {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Parse the `Name(k=v,...)` form; malformed property pairs are skipped.
    pub fn parse(text: &str) -> Self {
        let Some(open) = text.find('(') else {
            return Self::new(text.trim());
        };
        let interface = text[..open].trim();
        let rest = &text[open + 1..];
        let body = rest.split(')').next().unwrap_or_default();
        let properties = body
            .split(',')
            .filter_map(|pair| {
                let (k, v) = pair.split_once('=')?;
                let (k, v) = (k.trim(), v.trim());
                if k.is_empty() || v.contains('=') {
                    return None;
                }
                Some((k.to_string(), v.to_string()))
            })
            .collect();
        Self {
            interface: interface.to_string(),
            properties,
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Whether a provider offering `interfaces` with `properties` satisfies this filter
    pub fn matches(&self, interfaces: &[String], properties: &Dictionary) -> bool {
        interfaces.iter().any(|i| i == &self.interface)
            && self.properties.iter().all(|(k, want)| {
                properties
                    .get(k)
                    .is_some_and(|have| have.to_string() == *want)
            })
    }
}

impl FromStr for ServiceFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ServiceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.interface)?;
        if !self.properties.is_empty() {
            write!(f, "(")?;
            for (i, (k, v)) in self.properties.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", k, v)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
