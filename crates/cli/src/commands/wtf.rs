// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fx wtf`

use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct WtfArgs {
    /// Assembly file
    pub assembly: PathBuf,
    /// Explain a single component instead of the whole assembly
    #[arg(long)]
    pub component: Option<String>,
}

pub fn handle(args: WtfArgs) -> anyhow::Result<()> {
    let runtime = super::install(&args.assembly)?;
    match args.component {
        Some(name) => {
            if !runtime.components().iter().any(|c| c.name() == name) {
                anyhow::bail!("no component named {}", name);
            }
            match runtime.root_cause(&name) {
                Some(cause) => println!("{}: {}", name, cause),
                None => println!("{}: registered", name),
            }
        }
        None => print!("{}", runtime.diagnose()),
    }
    Ok(())
}
