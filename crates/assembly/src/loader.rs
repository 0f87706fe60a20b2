// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reading assemblies from disk

use crate::{parse_assembly, validate_assembly, Assembly, ParseError, ValidationErrors};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading an assembly file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("{path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationErrors,
    },
}

/// Read, parse and validate the assembly at `path`
pub fn load_assembly(path: &Path) -> Result<Assembly, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let assembly = parse_assembly(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_assembly(&assembly).map_err(|source| LoadError::Validation {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(assembly)
}
