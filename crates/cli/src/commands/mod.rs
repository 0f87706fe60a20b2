// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod check;
pub mod status;
pub mod wtf;

use anyhow::{Context, Result};
use fx_engine::Runtime;
use std::path::Path;

/// Load an assembly and install it into a fresh runtime
fn install(path: &Path) -> Result<Runtime> {
    let assembly = fx_assembly::load_assembly(path)?;
    let runtime = Runtime::from_assembly(&assembly)
        .with_context(|| format!("cannot install {}", path.display()))?;
    tracing::debug!(path = %path.display(), summary = %assembly.summary(), "installed");
    Ok(runtime)
}
