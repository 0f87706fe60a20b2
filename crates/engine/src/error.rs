// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the component runtime

use crate::ExecuteError;
use fx_core::coordination::CoordinationError;
use fx_core::{InstanceId, ServiceId};
use thiserror::Error;

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("component instance not found: {0}")]
    ComponentNotFound(InstanceId),
    #[error("component instance {0} is disposed")]
    Disposed(InstanceId),
    #[error("service not found: {0}")]
    ServiceNotFound(ServiceId),
    #[error("service {service} belongs to component instance {instance}")]
    OwnedService {
        service: ServiceId,
        instance: InstanceId,
    },
    #[error("execute error: {0}")]
    Execute(#[from] ExecuteError),
    #[error("coordination error: {0}")]
    Coordination(#[from] CoordinationError),
    #[error("invalid assembly: {0}")]
    Assembly(#[from] fx_assembly::ValidationErrors),
    #[error("invalid validation pattern in component {component}: {message}")]
    Pattern { component: String, message: String },
    #[error("invalid runtime settings: {0}")]
    Config(#[from] toml::de::Error),
}
