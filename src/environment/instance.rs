//! Instance type and container role classification.

use super::{EnvSnapshot, CONTAINER_TYPE_VAR, INSTANCE_TYPE_VAR, STAGE_VAR};
use crate::error::EntrypointError;
use serde::Serialize;
use std::fmt;

/// Deployment stage of this instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum InstanceType {
    Production,
    Updates,
    Develop,
    Test,
    /// A primary signal outside the known stages, accepted as is.
    Other(String),
}

impl InstanceType {
    /// Map a raw primary signal to an instance type without validation.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "production" => InstanceType::Production,
            "updates" => InstanceType::Updates,
            "develop" => InstanceType::Develop,
            "test" => InstanceType::Test,
            other => InstanceType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstanceType::Production => "production",
            InstanceType::Updates => "updates",
            InstanceType::Develop => "develop",
            InstanceType::Test => "test",
            InstanceType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<InstanceType> for String {
    fn from(value: InstanceType) -> Self {
        value.as_str().to_string()
    }
}

/// Pairs of (`INSTANCE_TYPE`, `ODOO_STAGE`) that name the same stage.
const STAGE_EQUIVALENCE: &[(&str, &str, InstanceType)] = &[
    ("production", "production", InstanceType::Production),
    ("updates", "staging", InstanceType::Updates),
    ("develop", "dev", InstanceType::Develop),
    ("test", "staging", InstanceType::Test),
];

/// Derive the instance type from `INSTANCE_TYPE` and `ODOO_STAGE`.
///
/// `INSTANCE_TYPE` alone is trusted verbatim. When both are set they must name
/// the same stage.
pub fn classify_instance(env: &EnvSnapshot) -> Result<InstanceType, EntrypointError> {
    let instance_type = env.get_or_empty(INSTANCE_TYPE_VAR);
    let stage = env.get_or_empty(STAGE_VAR);

    match (instance_type.is_empty(), stage.is_empty()) {
        (true, true) => Err(EntrypointError::InstanceUndetermined),
        (_, true) => Ok(InstanceType::parse_lenient(instance_type)),
        _ => STAGE_EQUIVALENCE
            .iter()
            .find(|(it, st, _)| *it == instance_type && *st == stage)
            .map(|(_, _, canonical)| canonical.clone())
            .ok_or_else(|| EntrypointError::InstanceMismatch {
                instance_type: instance_type.to_string(),
                stage: stage.to_string(),
            }),
    }
}

/// Role this container plays in a multi-container deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ContainerRole {
    Worker,
    Cron,
    Longpoll,
    /// Set to a value without a preset.
    Unknown(String),
    Unset,
}

impl ContainerRole {
    /// Case-insensitive parse of a raw `CONTAINER_TYPE` value.
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "" => ContainerRole::Unset,
            "worker" => ContainerRole::Worker,
            "cron" => ContainerRole::Cron,
            "longpoll" => ContainerRole::Longpoll,
            _ => ContainerRole::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRole::Worker => f.write_str("worker"),
            ContainerRole::Cron => f.write_str("cron"),
            ContainerRole::Longpoll => f.write_str("longpoll"),
            ContainerRole::Unknown(raw) => f.write_str(raw),
            ContainerRole::Unset => f.write_str("unset"),
        }
    }
}

impl From<ContainerRole> for String {
    fn from(value: ContainerRole) -> Self {
        value.to_string()
    }
}

/// Container role from `CONTAINER_TYPE`.
pub fn container_role(env: &EnvSnapshot) -> ContainerRole {
    ContainerRole::parse(env.get_or_empty(CONTAINER_TYPE_VAR))
}
