// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering of diagnoses

use super::diagnosis::{Cycle, Diagnosis, MissingDependency, RootCause};
use crate::component::DependencyKind;
use std::fmt;

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.components {
            write!(f, "{} -> ", name)?;
        }
        match self.components.first() {
            Some(first) => write!(f, "{}", first),
            None => Ok(()),
        }
    }
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for component {}", self.name, self.required_by)
    }
}

impl fmt::Display for RootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cycle() {
            let cycles: Vec<String> = self.cycles.iter().map(|c| c.to_string()).collect();
            return write!(f, "circular dependency: {}", cycles.join("; "));
        }

        let n = self.unregistered.len();
        write!(
            f,
            "{} unregistered component{}",
            n,
            if n == 1 { "" } else { "s" }
        )?;
        if !self.missing.is_empty() {
            write!(f, ", root cause: {}", self.missing_names().join(", "))?;
        }
        for cycle in &self.cycles {
            write!(f, "; circular dependency: {}", cycle)?;
        }
        Ok(())
    }
}

fn missing_section(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    missing: &[&MissingDependency],
) -> fmt::Result {
    if missing.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}", heading)?;
    for m in missing {
        writeln!(f, " * {}", m)?;
    }
    Ok(())
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unregistered.is_empty() {
            writeln!(f, "No unregistered components found")?;
        } else {
            let message = format!("{} unregistered components found", self.unregistered.len());
            writeln!(f, "{}", message)?;
            writeln!(f, "{}", "-".repeat(message.len()))?;
        }

        if !self.cycles.is_empty() {
            writeln!(f, "Circular dependencies:")?;
            for cycle in &self.cycles {
                writeln!(f, " * -> {}", cycle)?;
            }
        }

        missing_section(
            f,
            "The following configuration(s) are missing:",
            &self.missing_of(DependencyKind::Configuration),
        )?;
        missing_section(
            f,
            "The following service(s) are missing:",
            &self.missing_of(DependencyKind::Service),
        )
    }
}
