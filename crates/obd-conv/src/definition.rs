//! PID records and compiled descriptors
//!
//! A [`PidRecord`] is the uncompiled form handed over by a schema loader.
//! The registry turns each record into a [`PidDescriptor`] that owns the
//! compiled formula and is immutable from then on.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EvalError;
use crate::formula::CompiledFormula;
use crate::types::{UnitId, Value, ValueType};

/// Uncompiled PID definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidRecord {
    /// Diagnostic service (e.g., 0x01 current data)
    pub mode: u8,
    /// Parameter ID within the mode
    pub pid: u8,
    /// Display name (e.g., "Engine RPM")
    pub name: String,
    /// Unit display string (e.g., "rpm")
    #[serde(default)]
    pub unit: String,
    /// Raw payload bytes carried on the bus
    pub can_bytes: u8,
    /// Storage type of the interpreted value
    pub value_type: ValueType,
    /// Conversion formula; empty means pass-through
    #[serde(default)]
    pub formula: String,
}

impl PidRecord {
    /// Create a pass-through record
    pub fn new(
        mode: u8,
        pid: u8,
        name: impl Into<String>,
        can_bytes: u8,
        value_type: ValueType,
    ) -> Self {
        Self {
            mode,
            pid,
            name: name.into(),
            unit: String::new(),
            can_bytes,
            value_type,
            formula: String::new(),
        }
    }

    /// Add a unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Add a conversion formula
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = formula.into();
        self
    }
}

/// Compiled, immutable PID descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct PidDescriptor {
    pub mode: u8,
    pub pid: u8,
    pub name: String,
    pub unit: UnitId,
    pub can_bytes: u8,
    pub value_type: ValueType,
    /// Formula source text as written in the schema
    pub expression: String,
    pub formula: CompiledFormula,
}

impl PidDescriptor {
    /// Size of the interpreted value's storage
    pub fn interpreted_bytes(&self) -> usize {
        self.value_type.byte_size()
    }

    /// Raw bytes the formula needs before it can be evaluated
    pub fn required_bytes(&self) -> usize {
        if self.formula.is_identity() {
            usize::from(self.can_bytes)
        } else {
            self.formula.operand_count()
        }
    }

    /// Evaluate raw payload bytes and cast to the declared type
    ///
    /// Bytes beyond `can_bytes` are ignored.
    pub fn interpret(&self, raw: &[u8]) -> Result<Value, EvalError> {
        let needed = self.required_bytes();
        if raw.len() < needed {
            return Err(EvalError::InsufficientBytes {
                needed,
                available: raw.len(),
            });
        }

        let raw = &raw[..raw.len().min(usize::from(self.can_bytes))];
        let result = self.formula.evaluate(raw)?;
        if !result.is_finite() {
            warn!(
                mode = self.mode,
                pid = self.pid,
                result,
                "Formula produced a non-finite value"
            );
        }

        Ok(self.value_type.cast(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::compile;

    fn descriptor(can_bytes: u8, value_type: ValueType, expression: &str) -> PidDescriptor {
        PidDescriptor {
            mode: 0x01,
            pid: 0x0C,
            name: "Test".to_string(),
            unit: UnitId(0),
            can_bytes,
            value_type,
            expression: expression.to_string(),
            formula: compile(expression).unwrap(),
        }
    }

    #[test]
    fn test_record_builder() {
        let record = PidRecord::new(0x01, 0x0C, "Engine RPM", 2, ValueType::Float)
            .with_unit("rpm")
            .with_formula("(A*256+B)/4");

        assert_eq!(record.name, "Engine RPM");
        assert_eq!(record.unit, "rpm");
        assert_eq!(record.formula, "(A*256+B)/4");
    }

    #[test]
    fn test_interpret_float() {
        let desc = descriptor(2, ValueType::Float, "(A*256+B)/4");
        assert_eq!(desc.interpreted_bytes(), 4);
        assert_eq!(desc.interpret(&[77, 130]).unwrap(), Value::Float(4960.5));
    }

    #[test]
    fn test_interpret_identity() {
        let desc = descriptor(1, ValueType::Uint8, "");
        assert_eq!(desc.interpret(&[60]).unwrap(), Value::Uint8(60));

        let desc = descriptor(2, ValueType::Uint16, "");
        assert_eq!(desc.interpret(&[0x12, 0x34]).unwrap(), Value::Uint16(0x1234));
        assert_eq!(
            desc.interpret(&[0x12]),
            Err(EvalError::InsufficientBytes {
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_interpret_ignores_trailing_bytes() {
        let desc = descriptor(1, ValueType::Uint8, "");
        assert_eq!(desc.interpret(&[60, 0xCC, 0xCC]).unwrap(), Value::Uint8(60));
    }

    #[test]
    fn test_interpret_signed() {
        let desc = descriptor(1, ValueType::Int16, "A-40");
        assert_eq!(desc.interpret(&[0]).unwrap(), Value::Int16(-40));
    }
}
