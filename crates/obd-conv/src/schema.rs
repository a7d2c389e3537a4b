//! YAML schema files
//!
//! ```yaml
//! meta:
//!   name: Generic OBD-II
//!   version: "1.0"
//!
//! codec:
//!   response_offset: 8
//!
//! modes:
//!   0x01:
//!     0x0C:
//!       name: Engine RPM
//!       bytes: 2
//!       unit: rpm
//!       type: float
//!       expr: (A*256+B)/4
//!     0x0D:
//!       name: Vehicle Speed
//!       bytes: 1
//!       unit: km/h
//!       type: uint8
//! ```
//!
//! Mode and PID keys are hex bytes with or without `0x`. A missing `expr`
//! means the raw bytes are the value.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::PidRecord;
use crate::error::{parse_id, SchemaError};
use crate::frame::CodecConfig;
use crate::registry::PidRegistry;
use crate::types::ValueType;

/// Generic OBD-II mode 01 schema shipped with the crate
pub const GENERIC_OBD2: &str = include_str!("../schemas/obd2.yaml");

/// Metadata about the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One PID entry as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PidEntry {
    name: String,
    bytes: u8,
    #[serde(default)]
    unit: String,
    #[serde(rename = "type")]
    value_type: ValueType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    expr: String,
}

/// YAML file structure
#[derive(Debug, Serialize, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    meta: SchemaMeta,
    #[serde(default)]
    codec: CodecConfig,
    #[serde(default)]
    modes: BTreeMap<String, BTreeMap<String, PidEntry>>,
}

/// Parsed, not yet compiled schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub meta: SchemaMeta,
    pub codec: CodecConfig,
    pub records: Vec<PidRecord>,
}

impl Schema {
    /// Load a schema from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let schema = Self::from_yaml(&content)?;
        debug!(
            path = %path.display(),
            pids = schema.records.len(),
            "Loaded schema file"
        );
        Ok(schema)
    }

    /// Parse a schema from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = serde_yaml::from_str(yaml)?;
        file.codec.validate()?;

        let mut records = Vec::new();
        for (mode_key, pids) in file.modes {
            let mode = parse_id(&mode_key)?;
            for (pid_key, entry) in pids {
                let pid = parse_id(&pid_key)?;
                records.push(PidRecord {
                    mode,
                    pid,
                    name: entry.name,
                    unit: entry.unit,
                    can_bytes: entry.bytes,
                    value_type: entry.value_type,
                    formula: entry.expr,
                });
            }
        }
        // Key spelling ("0x0C" vs "0c") must not affect order
        records.sort_by_key(|r| (r.mode, r.pid));

        Ok(Self {
            meta: file.meta,
            codec: file.codec,
            records,
        })
    }

    /// Compile every record into a registry; the first bad entry fails the load
    pub fn into_registry(self) -> Result<PidRegistry, SchemaError> {
        PidRegistry::build(self.records)
    }

    /// Export to YAML
    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        let mut modes: BTreeMap<String, BTreeMap<String, PidEntry>> = BTreeMap::new();
        for record in &self.records {
            modes
                .entry(format!("0x{:02X}", record.mode))
                .or_default()
                .insert(
                    format!("0x{:02X}", record.pid),
                    PidEntry {
                        name: record.name.clone(),
                        bytes: record.can_bytes,
                        unit: record.unit.clone(),
                        value_type: record.value_type,
                        expr: record.formula.clone(),
                    },
                );
        }

        let file = SchemaFile {
            meta: self.meta.clone(),
            codec: self.codec,
            modes,
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
