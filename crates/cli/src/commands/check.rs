// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fx check`

use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Assembly file
    pub assembly: PathBuf,
}

pub fn handle(args: CheckArgs) -> anyhow::Result<()> {
    let assembly = fx_assembly::load_assembly(&args.assembly)?;
    println!("ok: {}", assembly.summary());
    Ok(())
}
