//! Terraform state files.
//!
//! Only version 4 (Terraform 0.12 and later) is understood. The auditor walks
//! every managed resource of a supported type and re-parses its `id` attribute
//! against the registered layout.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::ids::{IdError, ParseMode, ParsedId};
use crate::resource;

const SUPPORTED_VERSION: u64 = 4;

#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("reading state file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing state file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported state version {0} (expected {SUPPORTED_VERSION})")]
    UnsupportedVersion(u64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerraformState {
    pub version: u64,
    #[serde(default)]
    pub terraform_version: Option<String>,
    #[serde(default)]
    pub resources: Vec<StateResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateResource {
    #[serde(default)]
    pub module: Option<String>,
    pub mode: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub instances: Vec<StateInstance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateInstance {
    #[serde(default)]
    pub index_key: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl StateResource {
    pub fn is_managed(&self) -> bool {
        self.mode == "managed"
    }

    /// The resource address, e.g. `module.cache.azurerm_redis_cache.main["a"]`.
    pub fn address(&self, instance: &StateInstance) -> String {
        let mut address = String::new();
        if let Some(module) = &self.module {
            address.push_str(module);
            address.push('.');
        }
        address.push_str(&self.resource_type);
        address.push('.');
        address.push_str(&self.name);
        match &instance.index_key {
            Some(serde_json::Value::String(key)) => address.push_str(&format!("[{:?}]", key)),
            Some(key) => address.push_str(&format!("[{}]", key)),
            None => {}
        }
        address
    }
}

impl StateInstance {
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").and_then(|v| v.as_str())
    }
}

/// The result of re-parsing one instance's ID.
#[derive(Debug)]
pub struct IdAudit {
    pub address: String,
    pub resource_type: String,
    pub id: String,
    pub outcome: Result<ParsedId, IdError>,
}

impl IdAudit {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl TerraformState {
    pub fn parse(content: &str) -> Result<Self, StateFileError> {
        let state: TerraformState = serde_json::from_str(content)?;
        if state.version != SUPPORTED_VERSION {
            return Err(StateFileError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    pub fn load(path: &Path) -> Result<Self, StateFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| StateFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Checks the `id` of every managed instance whose type is registered.
    /// Instances without an `id` attribute are skipped.
    pub fn audit_ids(&self) -> Vec<IdAudit> {
        let mut audits = Vec::new();

        for res in self.resources.iter().filter(|r| r.is_managed()) {
            let Some(def) = resource::lookup(&res.resource_type) else {
                tracing::debug!(resource_type = %res.resource_type, "skipping unsupported type");
                continue;
            };

            for instance in &res.instances {
                let Some(id) = instance.id() else { continue };
                audits.push(IdAudit {
                    address: res.address(instance),
                    resource_type: res.resource_type.clone(),
                    id: id.to_string(),
                    outcome: def.parse(id, ParseMode::Strict),
                });
            }
        }

        audits
    }
}
