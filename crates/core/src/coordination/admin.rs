// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Administrative view over a manager's coordinations

use super::coordination::{CoordinationState, FailReason};
use super::error::CoordinationError;
use super::manager::CoordinationManager;
use crate::clock::Clock;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Point-in-time copy of a coordination for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinationSnapshot {
    pub id: u64,
    pub name: String,
    pub state: CoordinationState,
    /// Zero when the coordination has no timeout
    pub timeout_ms: u64,
    pub participants: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl CoordinationSnapshot {
    fn timeout_label(&self) -> String {
        if self.timeout_ms == 0 {
            "none".to_string()
        } else {
            humantime::format_duration(Duration::from_millis(self.timeout_ms)).to_string()
        }
    }
}

impl fmt::Display for CoordinationSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.id,
            self.name,
            self.state,
            self.timeout_label()
        )
    }
}

/// Compile `pattern` so it must match a whole name
fn full_match(pattern: &str) -> Result<Regex, CoordinationError> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| CoordinationError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl<C: Clock> CoordinationManager<C> {
    /// Snapshots of live coordinations, optionally filtered by a regular
    /// expression that must match the entire name
    pub fn list_coordinations(
        &self,
        pattern: Option<&str>,
    ) -> Result<Vec<CoordinationSnapshot>, CoordinationError> {
        let filter = pattern.map(full_match).transpose()?;
        Ok(self
            .coordinations()
            .iter()
            .filter(|c| match &filter {
                Some(re) => re.is_match(c.name()),
                None => true,
            })
            .map(|c| c.snapshot())
            .collect())
    }

    pub fn coordination(&self, id: u64) -> Result<CoordinationSnapshot, CoordinationError> {
        self.get(id)
            .map(|c| c.snapshot())
            .ok_or(CoordinationError::NotFound(id))
    }

    /// Fail a coordination by id. `Ok(false)` if it was already terminating.
    pub fn fail_coordination(
        &self,
        id: u64,
        reason: impl Into<String>,
    ) -> Result<bool, CoordinationError> {
        let coordination = self.get(id).ok_or(CoordinationError::NotFound(id))?;
        let reason = reason.into();
        tracing::info!(coordination = id, %reason, "failing on request");
        Ok(coordination.fail(FailReason::Message(reason)))
    }

    /// Replace a coordination's timeout; zero clears it
    pub fn set_coordination_timeout(
        &self,
        id: u64,
        timeout_ms: u64,
    ) -> Result<bool, CoordinationError> {
        let coordination = self.get(id).ok_or(CoordinationError::NotFound(id))?;
        Ok(coordination.add_timeout(Duration::from_millis(timeout_ms)))
    }
}

/// Render snapshots as an aligned text table
pub fn render_table(snapshots: &[CoordinationSnapshot]) -> String {
    let rows: Vec<[String; 4]> = snapshots
        .iter()
        .map(|s| {
            [
                s.id.to_string(),
                s.name.clone(),
                s.state.to_string(),
                s.timeout_label(),
            ]
        })
        .collect();
    let header = ["ID", "NAME", "STATE", "TIMEOUT"];

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 4]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };
    push_row(header);
    for row in &rows {
        push_row([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]);
    }
    out
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
