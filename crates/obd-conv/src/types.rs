//! Value types and interpreted values
//!
//! A PID's formula result is narrowed to the PID's declared [`ValueType`].
//! Byte representations use the host's native order on both the encode and
//! decode side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Storage type of an interpreted value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// 32-bit IEEE 754 float
    #[default]
    Float,
    /// Unsigned 8-bit integer
    Uint8,
    /// Unsigned 16-bit integer
    Uint16,
    /// Unsigned 32-bit integer
    Uint32,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Float => "float",
            ValueType::Uint8 => "uint8",
            ValueType::Uint16 => "uint16",
            ValueType::Uint32 => "uint32",
            ValueType::Int8 => "int8",
            ValueType::Int16 => "int16",
            ValueType::Int32 => "int32",
        };
        f.write_str(s)
    }
}

impl FromStr for ValueType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "float" => Ok(ValueType::Float),
            "uint8" => Ok(ValueType::Uint8),
            "uint16" => Ok(ValueType::Uint16),
            "uint32" => Ok(ValueType::Uint32),
            "int8" => Ok(ValueType::Int8),
            "int16" => Ok(ValueType::Int16),
            "int32" => Ok(ValueType::Int32),
            _ => Err(SchemaError::InvalidValueType(s.to_string())),
        }
    }
}

impl ValueType {
    /// Native storage size in bytes
    pub fn byte_size(&self) -> usize {
        match self {
            ValueType::Uint8 | ValueType::Int8 => 1,
            ValueType::Uint16 | ValueType::Int16 => 2,
            ValueType::Float | ValueType::Uint32 | ValueType::Int32 => 4,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ValueType::Float)
    }

    /// Narrow a formula result to this type
    ///
    /// Integers truncate toward zero and wrap on overflow; NaN becomes 0.
    pub fn cast(&self, value: f64) -> Value {
        // `as i64` truncates and maps NaN to 0; the second cast wraps
        let whole = value as i64;
        match self {
            ValueType::Float => Value::Float(value as f32),
            ValueType::Uint8 => Value::Uint8(whole as u8),
            ValueType::Uint16 => Value::Uint16(whole as u16),
            ValueType::Uint32 => Value::Uint32(whole as u32),
            ValueType::Int8 => Value::Int8(whole as i8),
            ValueType::Int16 => Value::Int16(whole as i16),
            ValueType::Int32 => Value::Int32(whole as i32),
        }
    }
}

/// Interpreted PID value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Float(f32),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Int8(i8),
    Int16(i16),
    Int32(i32),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Float(_) => ValueType::Float,
            Value::Uint8(_) => ValueType::Uint8,
            Value::Uint16(_) => ValueType::Uint16,
            Value::Uint32(_) => ValueType::Uint32,
            Value::Int8(_) => ValueType::Int8,
            Value::Int16(_) => ValueType::Int16,
            Value::Int32(_) => ValueType::Int32,
        }
    }

    /// Size of the byte representation
    pub fn width(&self) -> usize {
        self.value_type().byte_size()
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Float(v) => f64::from(v),
            Value::Uint8(v) => f64::from(v),
            Value::Uint16(v) => f64::from(v),
            Value::Uint32(v) => f64::from(v),
            Value::Int8(v) => f64::from(v),
            Value::Int16(v) => f64::from(v),
            Value::Int32(v) => f64::from(v),
        }
    }

    /// Native-order byte representation
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        match *self {
            Value::Float(v) => v.to_ne_bytes().to_vec(),
            Value::Uint8(v) => v.to_ne_bytes().to_vec(),
            Value::Uint16(v) => v.to_ne_bytes().to_vec(),
            Value::Uint32(v) => v.to_ne_bytes().to_vec(),
            Value::Int8(v) => v.to_ne_bytes().to_vec(),
            Value::Int16(v) => v.to_ne_bytes().to_vec(),
            Value::Int32(v) => v.to_ne_bytes().to_vec(),
        }
    }

    /// Read a value of the given type back from native-order bytes
    ///
    /// Returns `None` if `bytes` is shorter than the type's width.
    pub fn from_ne_bytes(value_type: ValueType, bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..value_type.byte_size())?;
        let value = match value_type {
            ValueType::Float => Value::Float(f32::from_ne_bytes(bytes.try_into().ok()?)),
            ValueType::Uint8 => Value::Uint8(bytes[0]),
            ValueType::Uint16 => Value::Uint16(u16::from_ne_bytes(bytes.try_into().ok()?)),
            ValueType::Uint32 => Value::Uint32(u32::from_ne_bytes(bytes.try_into().ok()?)),
            ValueType::Int8 => Value::Int8(bytes[0] as i8),
            ValueType::Int16 => Value::Int16(i16::from_ne_bytes(bytes.try_into().ok()?)),
            ValueType::Int32 => Value::Int32(i32::from_ne_bytes(bytes.try_into().ok()?)),
        };
        Some(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Uint8(v) => write!(f, "{}", v),
            Value::Uint16(v) => write!(f, "{}", v),
            Value::Uint32(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
        }
    }
}

/// Interned unit identifier, assigned by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u16);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_value_type_sizes() {
        assert_eq!(ValueType::Float.byte_size(), 4);
        assert_eq!(ValueType::Uint8.byte_size(), 1);
        assert_eq!(ValueType::Uint16.byte_size(), 2);
        assert_eq!(ValueType::Uint32.byte_size(), 4);
        assert_eq!(ValueType::Int8.byte_size(), 1);
        assert_eq!(ValueType::Int16.byte_size(), 2);
        assert_eq!(ValueType::Int32.byte_size(), 4);
    }

    #[rstest]
    #[case(ValueType::Uint8, 60.0, Value::Uint8(60))]
    #[case(ValueType::Uint8, 60.9, Value::Uint8(60))]
    #[case(ValueType::Uint8, 256.0, Value::Uint8(0))]
    #[case(ValueType::Uint8, 300.5, Value::Uint8(44))]
    #[case(ValueType::Uint8, -1.0, Value::Uint8(255))]
    #[case(ValueType::Uint16, 65537.0, Value::Uint16(1))]
    #[case(ValueType::Int8, -40.7, Value::Int8(-40))]
    #[case(ValueType::Int8, 128.0, Value::Int8(-128))]
    #[case(ValueType::Int16, -1.5, Value::Int16(-1))]
    #[case(ValueType::Uint32, f64::NAN, Value::Uint32(0))]
    #[case(ValueType::Float, 4960.5, Value::Float(4960.5))]
    fn test_cast(#[case] ty: ValueType, #[case] input: f64, #[case] expected: Value) {
        assert_eq!(ty.cast(input), expected);
    }

    #[test]
    fn test_ne_bytes() {
        let value = Value::Uint16(0xABCD);
        let bytes = value.to_ne_bytes();
        assert_eq!(bytes, 0xABCDu16.to_ne_bytes().to_vec());
        assert_eq!(Value::from_ne_bytes(ValueType::Uint16, &bytes), Some(value));

        let value = Value::Float(4960.5);
        assert_eq!(value.width(), 4);
        assert_eq!(
            Value::from_ne_bytes(ValueType::Float, &value.to_ne_bytes()),
            Some(value)
        );

        assert_eq!(Value::from_ne_bytes(ValueType::Uint32, &[1, 2]), None);
    }

    #[test]
    fn test_serde_names() {
        let ty: ValueType = serde_yaml::from_str("uint16").unwrap();
        assert_eq!(ty, ValueType::Uint16);
        assert_eq!(ValueType::Float.to_string(), "float");
        assert_eq!("Uint8".parse::<ValueType>().unwrap(), ValueType::Uint8);
        assert!("double".parse::<ValueType>().is_err());
    }
}
