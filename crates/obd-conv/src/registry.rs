//! PID registry - the immutable container for descriptors
//!
//! Built once from [`PidRecord`]s; every formula is compiled during the build
//! and any failure rejects the whole set. After construction the registry is
//! read-only, so it can be shared across threads (e.g. behind an `Arc`)
//! without locking.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::definition::{PidDescriptor, PidRecord};
use crate::error::{LookupError, SchemaError};
use crate::formula::compile;
use crate::frame::MAX_RAW_BYTES;
use crate::types::UnitId;

/// Largest raw width a PID may declare
///
/// Only [`MAX_RAW_BYTES`] fit in a single response frame; wider PIDs load
/// but cannot be framed or decoded.
pub const MAX_CAN_BYTES: u8 = 7;

/// Immutable lookup from (mode, PID) to descriptor and from unit id to name
#[derive(Debug, Clone, Default)]
pub struct PidRegistry {
    descriptors: HashMap<(u8, u8), PidDescriptor>,
    units: Vec<String>,
}

impl PidRegistry {
    /// Build a registry, compiling every record's formula
    ///
    /// Units are assigned ids in order of first appearance.
    pub fn build(records: impl IntoIterator<Item = PidRecord>) -> Result<Self, SchemaError> {
        let mut descriptors = HashMap::new();
        let mut units = Vec::new();
        let mut unit_index: HashMap<String, UnitId> = HashMap::new();

        for record in records {
            let PidRecord {
                mode,
                pid,
                name,
                unit,
                can_bytes,
                value_type,
                formula: expression,
            } = record;

            if descriptors.contains_key(&(mode, pid)) {
                return Err(SchemaError::DuplicatePid { mode, pid });
            }

            if can_bytes == 0 || can_bytes > MAX_CAN_BYTES {
                return Err(SchemaError::InvalidByteWidth {
                    mode,
                    pid,
                    bytes: can_bytes,
                });
            }

            if usize::from(can_bytes) > MAX_RAW_BYTES {
                warn!(
                    mode,
                    pid,
                    bytes = can_bytes,
                    max = MAX_RAW_BYTES,
                    "PID wider than a single response frame"
                );
            }

            let formula = compile(&expression)
                .map_err(|source| SchemaError::Formula { mode, pid, source })?;
            if formula.operand_count() > usize::from(can_bytes) {
                return Err(SchemaError::OperandWidth {
                    mode,
                    pid,
                    operands: formula.operand_count(),
                    bytes: can_bytes,
                });
            }

            let unit = *unit_index.entry(unit).or_insert_with_key(|name| {
                units.push(name.clone());
                UnitId((units.len() - 1) as u16)
            });

            descriptors.insert(
                (mode, pid),
                PidDescriptor {
                    mode,
                    pid,
                    name,
                    unit,
                    can_bytes,
                    value_type,
                    expression,
                    formula,
                },
            );
        }

        debug!(
            pids = descriptors.len(),
            units = units.len(),
            "Built PID registry"
        );

        Ok(Self { descriptors, units })
    }

    /// Look up a descriptor
    pub fn lookup(&self, mode: u8, pid: u8) -> Result<&PidDescriptor, LookupError> {
        self.get(mode, pid)
            .ok_or(LookupError::DescriptorNotFound { mode, pid })
    }

    /// Look up a descriptor, `None` if absent
    pub fn get(&self, mode: u8, pid: u8) -> Option<&PidDescriptor> {
        self.descriptors.get(&(mode, pid))
    }

    /// Display string for a unit id
    pub fn unit_name(&self, unit: UnitId) -> Result<&str, LookupError> {
        self.units
            .get(usize::from(unit.0))
            .map(String::as_str)
            .ok_or(LookupError::UnitNotFound(unit.0))
    }

    pub fn contains(&self, mode: u8, pid: u8) -> bool {
        self.descriptors.contains_key(&(mode, pid))
    }

    /// All descriptors ordered by (mode, PID)
    pub fn descriptors(&self) -> Vec<&PidDescriptor> {
        let mut all: Vec<_> = self.descriptors.values().collect();
        all.sort_by_key(|d| (d.mode, d.pid));
        all
    }

    /// Number of registered PIDs
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Number of distinct units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}
