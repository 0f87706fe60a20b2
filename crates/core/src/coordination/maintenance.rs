// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic maintenance for coordinations
//!
//! Timeouts are not enforced by the coordination itself. A maintenance task
//! ticks the manager, failing every coordination whose deadline has passed.

use super::coordination::CoordinationState;
use super::manager::CoordinationManager;
use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;

/// Configuration for the maintenance task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// How often to look for overdue coordinations
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub enabled: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            enabled: true,
        }
    }
}

impl MaintenanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Background task that expires overdue coordinations
pub struct MaintenanceTask<C: Clock> {
    config: MaintenanceConfig,
    manager: CoordinationManager<C>,
}

impl<C: Clock> MaintenanceTask<C> {
    pub fn new(config: MaintenanceConfig, manager: CoordinationManager<C>) -> Self {
        Self { config, manager }
    }

    /// Run a single maintenance cycle, returning the ids that timed out
    pub fn tick(&self) -> Vec<u64> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.manager.expire_overdue()
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Tick on every interval until `shutdown` turns true or its sender drops
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if !self.config.enabled {
            tracing::debug!("coordination maintenance disabled");
            return;
        }
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let expired = self.tick();
                    if !expired.is_empty() {
                        tracing::info!(count = expired.len(), "expired overdue coordinations");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("coordination maintenance stopped");
    }
}

/// Counts over a manager's live coordinations
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CoordinationStats {
    pub total: usize,
    pub active: usize,
    pub terminating: usize,
    pub with_timeout: usize,
    pub overdue: usize,
    pub participants: usize,
}

impl CoordinationStats {
    pub fn collect<C: Clock>(manager: &CoordinationManager<C>) -> Self {
        let mut stats = CoordinationStats::default();
        for coordination in manager.coordinations() {
            stats.total += 1;
            match coordination.state() {
                CoordinationState::Active => stats.active += 1,
                CoordinationState::Terminating => stats.terminating += 1,
                _ => {}
            }
            if coordination.deadline().is_some() {
                stats.with_timeout += 1;
            }
            if coordination.is_overdue(manager.clock()) {
                stats.overdue += 1;
            }
            stats.participants += coordination.participants().len();
        }
        stats
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
