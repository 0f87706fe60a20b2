// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembly TOML parsing

use crate::{Assembly, ComponentDef, ConfigurationDef, ServiceDef, ValidationDef};
use fx_core::{ComponentDescriptor, Dictionary, Reference, Value};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur during assembly parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// `[[component.reference]]` as written
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReference {
    name: Option<String>,
    service: Option<String>,
    configuration: Option<String>,
    #[serde(default)]
    optional: bool,
    count: Option<usize>,
}

/// `[component.validate]` as written
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawValidation {
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    patterns: toml::Table,
}

/// Parse an assembly from TOML content
pub fn parse_assembly(content: &str) -> Result<Assembly, ParseError> {
    let raw: toml::Value = toml::from_str(content)?;
    let table = raw
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat("root must be a table".to_string()))?;

    let mut assembly = Assembly::default();

    if let Some(runtime) = table.get("runtime") {
        let runtime = runtime
            .as_table()
            .ok_or_else(|| ParseError::InvalidFormat("runtime must be a table".to_string()))?;
        assembly.runtime = Some(runtime.clone());
    }

    for (i, value) in entries(table, "component")?.iter().enumerate() {
        assembly.components.push(parse_component(i, value)?);
    }

    for (i, value) in entries(table, "service")?.iter().enumerate() {
        assembly.services.push(parse_service(i, value)?);
    }

    for (i, value) in entries(table, "configuration")?.iter().enumerate() {
        assembly.configurations.push(parse_configuration(i, value)?);
    }

    Ok(assembly)
}

/// `[[key]]` array of tables; absent means empty
fn entries<'a>(table: &'a toml::Table, key: &str) -> Result<&'a [toml::Value], ParseError> {
    match table.get(key) {
        None => Ok(&[]),
        Some(value) => value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| ParseError::InvalidFormat(format!("{} must be an array of tables", key))),
    }
}

fn parse_component(index: usize, value: &toml::Value) -> Result<ComponentDef, ParseError> {
    let table = value.as_table().ok_or_else(|| {
        ParseError::InvalidFormat(format!("component[{}] must be a table", index))
    })?;

    let name = table
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ParseError::MissingField(format!("component[{}].name", index)))?
        .to_string();

    let mut descriptor = ComponentDescriptor::new(&name);

    // Either a single interface or a list
    descriptor.provides = match table.get("provides") {
        None => Vec::new(),
        Some(toml::Value::String(s)) => vec![s.clone()],
        Some(toml::Value::Array(arr)) => arr
            .iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| {
                    ParseError::InvalidFormat(format!(
                        "component.{}.provides entries must be strings",
                        name
                    ))
                })
            })
            .collect::<Result<_, _>>()?,
        Some(_) => {
            return Err(ParseError::InvalidFormat(format!(
                "component.{}.provides must be a string or list",
                name
            )))
        }
    };

    if let Some(pid) = table.get("pid") {
        let pid = pid.as_str().ok_or_else(|| {
            ParseError::InvalidFormat(format!("component.{}.pid must be a string", name))
        })?;
        descriptor.pid = Some(pid.to_string());
    }

    if let Some(properties) = table.get("properties") {
        descriptor.properties = dictionary(&format!("component.{}.properties", name), properties)?;
    }

    for (i, value) in entries(table, "reference")?.iter().enumerate() {
        descriptor.references.push(parse_reference(&name, i, value)?);
    }

    let validation = match table.get("validate") {
        Some(value) => parse_validation(&name, value)?,
        None => ValidationDef::default(),
    };

    Ok(ComponentDef {
        descriptor,
        validation,
    })
}

fn parse_reference(component: &str, index: usize, value: &toml::Value) -> Result<Reference, ParseError> {
    let at = format!("component.{}.reference[{}]", component, index);
    let raw: RawReference = value
        .clone()
        .try_into()
        .map_err(|e: toml::de::Error| ParseError::InvalidFormat(format!("{}: {}", at, e)))?;

    let name = raw
        .name
        .ok_or_else(|| ParseError::MissingField(format!("{}.name", at)))?;

    let mut reference = match (raw.service, raw.configuration) {
        (Some(filter), None) => Reference::service(name, filter),
        (None, Some(pid)) => Reference::configuration(name, pid),
        (Some(_), Some(_)) => {
            return Err(ParseError::InvalidFormat(format!(
                "{}: set either service or configuration, not both",
                at
            )))
        }
        (None, None) => return Err(ParseError::MissingField(format!("{}.service", at))),
    };
    reference.optional = raw.optional;
    reference.count = raw.count;
    Ok(reference)
}

fn parse_validation(component: &str, value: &toml::Value) -> Result<ValidationDef, ParseError> {
    let raw: RawValidation = value.clone().try_into().map_err(|e: toml::de::Error| {
        ParseError::InvalidFormat(format!("component.{}.validate: {}", component, e))
    })?;

    let patterns = raw
        .patterns
        .into_iter()
        .map(|(key, pattern)| match pattern {
            toml::Value::String(p) => Ok((key, p)),
            _ => Err(ParseError::InvalidFormat(format!(
                "component.{}.validate.patterns.{} must be a string",
                component, key
            ))),
        })
        .collect::<Result<_, _>>()?;

    Ok(ValidationDef {
        required: raw.required,
        patterns,
    })
}

fn parse_service(index: usize, value: &toml::Value) -> Result<ServiceDef, ParseError> {
    let at = format!("service[{}]", index);
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("{} must be a table", at)))?;

    let interfaces: Vec<String> = table
        .get("interfaces")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ParseError::MissingField(format!("{}.interfaces", at)))?
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();

    let properties = match table.get("properties") {
        Some(value) => dictionary(&format!("{}.properties", at), value)?,
        None => Dictionary::new(),
    };

    Ok(ServiceDef {
        interfaces,
        properties,
    })
}

fn parse_configuration(index: usize, value: &toml::Value) -> Result<ConfigurationDef, ParseError> {
    let at = format!("configuration[{}]", index);
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("{} must be a table", at)))?;

    let pid = table
        .get("pid")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ParseError::MissingField(format!("{}.pid", at)))?
        .to_string();

    let values = match table.get("values") {
        Some(value) => dictionary(&format!("configuration.{}.values", pid), value)?,
        None => Dictionary::new(),
    };

    Ok(ConfigurationDef { pid, values })
}

fn dictionary(at: &str, value: &toml::Value) -> Result<Dictionary, ParseError> {
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("{} must be a table", at)))?;
    let mut dict = Dictionary::new();
    for (key, v) in table {
        dict.insert(key.clone(), config_value(&format!("{}.{}", at, key), v)?);
    }
    Ok(dict)
}

fn config_value(at: &str, value: &toml::Value) -> Result<Value, ParseError> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Integer(*i),
        toml::Value::Float(x) => Value::Float(*x),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::List(
            items
                .iter()
                .map(|v| config_value(at, v))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(_) => {
            return Err(ParseError::InvalidFormat(format!(
                "{}: nested tables are not configuration values",
                at
            )))
        }
    })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
