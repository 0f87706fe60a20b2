// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration validators
//!
//! A validator looks at a proposed configuration and answers accept or
//! reject. It has no other effect; the lifecycle state machine acts on the
//! verdict.

use super::state::ComponentInput;
use crate::config::Dictionary;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Outcome of validating a configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    #[default]
    Accept,
    Reject { reason: String },
}

impl Verdict {
    pub fn reject(reason: impl Into<String>) -> Self {
        Verdict::Reject {
            reason: reason.into(),
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Accept => None,
            Verdict::Reject { reason } => Some(reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "accepted"),
            Verdict::Reject { reason } => write!(f, "rejected: {}", reason),
        }
    }
}

/// Decides whether a configuration is acceptable for a component.
///
/// Must be deterministic for a given dictionary; the runtime calls it on
/// every settle pass.
pub trait ConfigValidator: Send + Sync {
    fn validate(&self, configuration: &Dictionary) -> Verdict;
}

impl<F> ConfigValidator for F
where
    F: Fn(&Dictionary) -> Verdict + Send + Sync,
{
    fn validate(&self, configuration: &Dictionary) -> Verdict {
        self(configuration)
    }
}

/// Turn a proposed configuration into the lifecycle input that applies it
pub fn review(validator: &dyn ConfigValidator, configuration: Dictionary) -> ComponentInput {
    let verdict = validator.validate(&configuration);
    ComponentInput::Reconfigure {
        configuration,
        verdict,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ConfigValidator for AcceptAll {
    fn validate(&self, _: &Dictionary) -> Verdict {
        Verdict::Accept
    }
}

/// Rejects configurations missing any of the listed keys
#[derive(Debug, Clone, Default)]
pub struct RequiredKeys {
    keys: Vec<String>,
}

impl RequiredKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigValidator for RequiredKeys {
    fn validate(&self, configuration: &Dictionary) -> Verdict {
        let missing: Vec<&str> = self
            .keys
            .iter()
            .filter(|k| !configuration.contains_key(k))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Verdict::Accept
        } else {
            Verdict::reject(format!("missing required key(s): {}", missing.join(", ")))
        }
    }
}

/// Requires present values to match a regular expression in full.
/// Absent keys are not checked.
#[derive(Debug, Clone, Default)]
pub struct PatternRules {
    rules: Vec<(String, Regex)>,
}

impl PatternRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, key: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        self.rules.push((key.into(), regex));
        Ok(self)
    }
}

impl ConfigValidator for PatternRules {
    fn validate(&self, configuration: &Dictionary) -> Verdict {
        for (key, regex) in &self.rules {
            let Some(value) = configuration.get(key) else {
                continue;
            };
            let text = value.to_string();
            if !regex.is_match(&text) {
                let pattern = regex.as_str();
                let pattern = pattern
                    .strip_prefix("^(?:")
                    .and_then(|p| p.strip_suffix(")$"))
                    .unwrap_or(pattern);
                return Verdict::reject(format!("{}={} does not match {}", key, text, pattern));
            }
        }
        Verdict::Accept
    }
}

/// Accepts only if every inner validator accepts; the first rejection wins
#[derive(Clone, Default)]
pub struct AllOf {
    validators: Vec<Arc<dyn ConfigValidator>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, validator: impl ConfigValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ConfigValidator for AllOf {
    fn validate(&self, configuration: &Dictionary) -> Verdict {
        self.validators
            .iter()
            .map(|v| v.validate(configuration))
            .find(|verdict| !verdict.is_accept())
            .unwrap_or(Verdict::Accept)
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
