// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fx status`

use crate::output::{print_list, OutputFormat};
use clap::Args;
use fx_core::{ComponentInstance, ComponentState};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct StatusArgs {
    /// Assembly file
    pub assembly: PathBuf,
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ComponentRow {
    id: String,
    name: String,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl From<&ComponentInstance> for ComponentRow {
    fn from(instance: &ComponentInstance) -> Self {
        let reason = match &instance.state {
            ComponentState::Invalid { reason } => Some(reason.to_string()),
            ComponentState::Created => instance.blocker().map(|r| r.to_string()),
            _ => None,
        };
        Self {
            id: instance.id.to_string(),
            name: instance.name().to_string(),
            state: instance.state.name(),
            reason,
        }
    }
}

impl fmt::Display for ComponentRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} {:<10}", self.name, self.state)?;
        if let Some(reason) = &self.reason {
            write!(f, " {}", reason)?;
        }
        Ok(())
    }
}

pub fn handle(args: StatusArgs) -> anyhow::Result<()> {
    let runtime = super::install(&args.assembly)?;
    let rows: Vec<ComponentRow> = runtime.components().iter().map(ComponentRow::from).collect();

    if matches!(args.format, OutputFormat::Text) {
        if rows.is_empty() {
            println!("No components");
            return Ok(());
        }
        println!("{:<24} {:<10} REASON", "COMPONENT", "STATE");
    }
    print_list(&rows, args.format)
}
