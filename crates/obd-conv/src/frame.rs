//! Classic CAN frames and codec constants

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, SchemaError};

/// Payload size of a classic CAN frame
pub const FRAME_LEN: usize = 8;

/// Functional (broadcast) request identifier
pub const QUERY_ID: u16 = 0x7DF;

/// Offset from [`QUERY_ID`] to the response identifier
pub const RESPONSE_ID_OFFSET: u16 = 8;

/// Added to the mode byte in positive responses
pub const RESPONSE_MODE_OFFSET: u8 = 0x40;

/// Filler for unused payload bytes
pub const PADDING: u8 = 0xCC;

/// Length byte, mode and PID
pub const HEADER_LEN: usize = 3;

/// Largest raw value that fits behind the header
pub const MAX_RAW_BYTES: usize = FRAME_LEN - HEADER_LEN;

/// Highest 11-bit identifier
pub const MAX_STANDARD_ID: u16 = 0x7FF;

/// Single classic CAN frame (11-bit identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    /// 11-bit identifier
    pub id: u16,
    /// Data length code (0-8)
    pub len: u8,
    pub data: [u8; FRAME_LEN],
}

impl CanFrame {
    /// Full-length frame
    pub fn new(id: u16, data: [u8; FRAME_LEN]) -> Self {
        Self {
            id,
            len: FRAME_LEN as u8,
            data,
        }
    }

    /// Bytes covered by the length code
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.len).min(FRAME_LEN)]
    }
}

/// Candump notation: `7DF#02010CCCCCCCCCCC`
impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}#{}", self.id, hex::encode_upper(self.payload()))
    }
}

impl FromStr for CanFrame {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, data) = s
            .trim()
            .split_once('#')
            .ok_or_else(|| CodecError::InvalidFrame(format!("missing '#' in {:?}", s)))?;

        let id = u16::from_str_radix(id, 16)
            .ok()
            .filter(|id| *id <= MAX_STANDARD_ID)
            .ok_or_else(|| CodecError::InvalidFrame(format!("invalid identifier {:?}", id)))?;

        let bytes = hex::decode(data.replace('.', ""))
            .map_err(|e| CodecError::InvalidFrame(format!("invalid data {:?}: {}", data, e)))?;
        if bytes.len() > FRAME_LEN {
            return Err(CodecError::InvalidFrame(format!(
                "{} data bytes, at most {}",
                bytes.len(),
                FRAME_LEN
            )));
        }

        let mut frame = CanFrame {
            id,
            len: bytes.len() as u8,
            data: [0; FRAME_LEN],
        };
        frame.data[..bytes.len()].copy_from_slice(&bytes);
        Ok(frame)
    }
}

/// Addressing and padding used when building frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Request identifier
    pub query_id: u16,
    /// Response identifier minus request identifier. The on-bus convention
    /// for the first ECU is 9.
    pub response_offset: u16,
    /// Filler for unused payload bytes
    pub padding: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            query_id: QUERY_ID,
            response_offset: RESPONSE_ID_OFFSET,
            padding: PADDING,
        }
    }
}

impl CodecConfig {
    /// Identifier of response frames
    ///
    /// Fails unless both the query and the response identifier are 11-bit.
    pub fn response_id(&self) -> Result<u16, SchemaError> {
        Some(self.query_id)
            .filter(|id| *id <= MAX_STANDARD_ID)
            .and_then(|id| id.checked_add(self.response_offset))
            .filter(|id| *id <= MAX_STANDARD_ID)
            .ok_or(SchemaError::InvalidAddressing {
                query_id: self.query_id,
                response_offset: self.response_offset,
            })
    }

    /// Check that the addressing fits standard identifiers
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.response_id().map(|_| ())
    }
}
