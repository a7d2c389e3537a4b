//! Query/response frame codec
//!
//! Frame layout (8 payload bytes, unused bytes padded):
//!
//! | Byte  | Query       | Response                 |
//! |-------|-------------|--------------------------|
//! | 0     | 2           | 2 + raw length           |
//! | 1     | mode        | mode + 0x40              |
//! | 2     | PID         | PID                      |
//! | 3..   | padding     | raw value, then padding  |
//!
//! Every operation is a pure function of its inputs and the registry.

use tracing::trace;

use crate::definition::PidDescriptor;
use crate::error::{CodecError, Result, SchemaError};
use crate::frame::{
    CanFrame, CodecConfig, FRAME_LEN, HEADER_LEN, MAX_RAW_BYTES, QUERY_ID, RESPONSE_ID_OFFSET,
    RESPONSE_MODE_OFFSET,
};
use crate::registry::PidRegistry;
use crate::types::Value;

/// Fully interpreted response frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResponse<'r> {
    /// Request mode (response offset removed)
    pub mode: u8,
    pub pid: u8,
    pub descriptor: &'r PidDescriptor,
    /// Raw value bytes as found in the frame
    pub raw: Vec<u8>,
    pub value: Value,
}

/// Builds and parses frames against a shared registry
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec<'r> {
    registry: &'r PidRegistry,
    config: CodecConfig,
    response_id: u16,
}

impl<'r> FrameCodec<'r> {
    /// Codec with default addressing (0x7DF / +8, 0xCC padding)
    pub fn new(registry: &'r PidRegistry) -> Self {
        Self {
            registry,
            config: CodecConfig::default(),
            response_id: QUERY_ID + RESPONSE_ID_OFFSET,
        }
    }

    /// Codec with custom addressing; both identifiers must be 11-bit
    pub fn with_config(
        registry: &'r PidRegistry,
        config: CodecConfig,
    ) -> std::result::Result<Self, SchemaError> {
        let response_id = config.response_id()?;
        Ok(Self {
            registry,
            config,
            response_id,
        })
    }

    pub fn registry(&self) -> &'r PidRegistry {
        self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Build a query frame for a registered PID
    pub fn build_query(&self, mode: u8, pid: u8) -> Result<CanFrame> {
        self.registry.lookup(mode, pid)?;

        let mut data = [self.config.padding; FRAME_LEN];
        data[0] = 2;
        data[1] = mode;
        data[2] = pid;

        Ok(CanFrame::new(self.config.query_id, data))
    }

    /// Build a response frame carrying `raw` verbatim
    ///
    /// `raw` must be exactly the PID's declared byte width.
    pub fn build_response(&self, mode: u8, pid: u8, raw: &[u8]) -> Result<CanFrame> {
        if raw.len() > MAX_RAW_BYTES {
            return Err(CodecError::RawBytesTooLarge {
                len: raw.len(),
                max: MAX_RAW_BYTES,
            }
            .into());
        }

        let descriptor = self.registry.lookup(mode, pid)?;
        if raw.len() != usize::from(descriptor.can_bytes) {
            return Err(CodecError::PayloadLengthMismatch {
                mode,
                pid,
                expected: usize::from(descriptor.can_bytes),
                actual: raw.len(),
            }
            .into());
        }

        let mut data = [self.config.padding; FRAME_LEN];
        data[0] = (2 + raw.len()) as u8;
        data[1] = mode.wrapping_add(RESPONSE_MODE_OFFSET);
        data[2] = pid;
        data[HEADER_LEN..HEADER_LEN + raw.len()].copy_from_slice(raw);

        Ok(CanFrame::new(self.response_id, data))
    }

    /// Extract the stored (mode, PID) bytes
    ///
    /// The mode byte is returned as stored; responses carry the 0x40 offset.
    pub fn parse_headers(frame: &CanFrame) -> Result<(u8, u8)> {
        let payload = frame.payload();
        if payload.len() < HEADER_LEN {
            return Err(CodecError::FrameTooShort { len: payload.len() }.into());
        }
        Ok((payload[1], payload[2]))
    }

    /// Interpret a response frame
    pub fn decode_response(&self, frame: &CanFrame) -> Result<DecodedResponse<'r>> {
        let (mode_byte, pid) = Self::parse_headers(frame)?;
        let mode = mode_byte
            .checked_sub(RESPONSE_MODE_OFFSET)
            .ok_or(CodecError::NotAResponse(mode_byte))?;
        let descriptor = self.registry.lookup(mode, pid)?;

        // Raw value ends at whichever comes first: declared width, length byte, frame end
        let payload = frame.payload();
        let declared = usize::from(payload[0].saturating_sub(2));
        let end = (HEADER_LEN + usize::from(descriptor.can_bytes).min(declared)).min(payload.len());
        let raw = &payload[HEADER_LEN..end];

        let value = descriptor.interpret(raw)?;
        trace!(mode, pid, raw = ?raw, %value, "Decoded response");

        Ok(DecodedResponse {
            mode,
            pid,
            descriptor,
            raw: raw.to_vec(),
            value,
        })
    }

    /// Interpret a response frame into `out` using native byte order
    ///
    /// Returns the number of bytes written. `out` is untouched on error.
    pub fn parse_response(&self, frame: &CanFrame, out: &mut [u8]) -> Result<usize> {
        let decoded = self.decode_response(frame)?;

        let width = decoded.value.width();
        if out.len() < width {
            return Err(CodecError::OutputBufferTooSmall {
                needed: width,
                available: out.len(),
            }
            .into());
        }

        out[..width].copy_from_slice(&decoded.value.to_ne_bytes());
        Ok(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PidRecord;
    use crate::error::{Error, EvalError, LookupError};
    use crate::types::ValueType;
    use pretty_assertions::assert_eq;

    fn registry() -> PidRegistry {
        PidRegistry::build([
            PidRecord::new(0x01, 0x0C, "Engine RPM", 2, ValueType::Float)
                .with_unit("rpm")
                .with_formula("(A*256+B)/4"),
            PidRecord::new(0x01, 0x0D, "Vehicle Speed", 1, ValueType::Uint8).with_unit("km/h"),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_query() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);

        let frame = codec.build_query(0x01, 0x0C).unwrap();
        assert_eq!(frame.id, 0x7DF);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.data, [2, 0x01, 0x0C, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC]);
    }

    #[test]
    fn test_build_query_unknown() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);

        assert!(matches!(
            codec.build_query(0x01, 0x99),
            Err(Error::Lookup(LookupError::DescriptorNotFound {
                mode: 0x01,
                pid: 0x99
            }))
        ));
    }

    #[test]
    fn test_build_response() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);

        let frame = codec.build_response(0x01, 0x0C, &[0xCD, 0xAB]).unwrap();
        assert_eq!(frame.id, 0x7DF + 8);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.data, [4, 0x41, 0x0C, 0xCD, 0xAB, 0xCC, 0xCC, 0xCC]);
    }

    #[test]
    fn test_build_response_errors() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);

        assert!(matches!(
            codec.build_response(0x01, 0x0C, &[0; 6]),
            Err(Error::Codec(CodecError::RawBytesTooLarge { len: 6, max: 5 }))
        ));
        assert!(matches!(
            codec.build_response(0x01, 0x0C, &[1]),
            Err(Error::Codec(CodecError::PayloadLengthMismatch {
                expected: 2,
                actual: 1,
                ..
            }))
        ));
        assert!(matches!(
            codec.build_response(0x02, 0x0C, &[1, 2]),
            Err(Error::Lookup(_))
        ));
    }

    #[test]
    fn test_configured_addressing() {
        let registry = registry();
        let config = CodecConfig {
            response_offset: 9,
            padding: 0x55,
            ..Default::default()
        };
        let codec = FrameCodec::with_config(&registry, config).unwrap();

        let frame = codec.build_response(0x01, 0x0D, &[60]).unwrap();
        assert_eq!(frame.id, 0x7E8);
        assert_eq!(frame.data, [3, 0x41, 0x0D, 60, 0x55, 0x55, 0x55, 0x55]);
    }

    #[test]
    fn test_out_of_range_addressing_rejected() {
        let registry = registry();
        for query_id in [0x7FF, 0xFFFF] {
            let config = CodecConfig {
                query_id,
                ..Default::default()
            };
            assert!(matches!(
                FrameCodec::with_config(&registry, config),
                Err(SchemaError::InvalidAddressing { .. })
            ));
        }
    }

    #[test]
    fn test_wide_pid_loads_but_cannot_be_framed() {
        let registry = PidRegistry::build([PidRecord::new(
            0x01,
            0x42,
            "Wide",
            6,
            ValueType::Uint32,
        )])
        .unwrap();
        let codec = FrameCodec::new(&registry);

        assert!(codec.build_query(0x01, 0x42).is_ok());
        assert!(matches!(
            codec.build_response(0x01, 0x42, &[1, 2, 3, 4, 5, 6]),
            Err(Error::Codec(CodecError::RawBytesTooLarge { len: 6, max: 5 }))
        ));

        // A full frame still only carries five value bytes
        let frame = CanFrame::new(0x7E7, [8, 0x41, 0x42, 1, 2, 3, 4, 5]);
        assert!(matches!(
            codec.decode_response(&frame),
            Err(Error::Eval(EvalError::InsufficientBytes {
                needed: 6,
                available: 5
            }))
        ));
    }

    #[test]
    fn test_parse_headers() {
        let mut data = [0u8; 8];
        data[..4].copy_from_slice(&[1, 0x01, 0x0D, 60]);
        let frame = CanFrame::new(0x7DF, data);

        assert_eq!(FrameCodec::parse_headers(&frame).unwrap(), (0x01, 0x0D));
    }

    #[test]
    fn test_parse_headers_short_frame() {
        let frame = CanFrame {
            id: 0x7E8,
            len: 2,
            data: [0; 8],
        };
        assert!(matches!(
            FrameCodec::parse_headers(&frame),
            Err(Error::Codec(CodecError::FrameTooShort { len: 2 }))
        ));
    }

    #[test]
    fn test_parse_response_float() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);
        let frame = CanFrame::new(0x7E7, [4, 0x41, 0x0C, 77, 130, 0, 0, 0]);

        let mut out = [0u8; 4];
        assert_eq!(codec.parse_response(&frame, &mut out).unwrap(), 4);
        assert_eq!(f32::from_ne_bytes(out), 4960.5);
    }

    #[test]
    fn test_parse_response_uint8() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);
        let frame = CanFrame::new(0x7E7, [3, 0x41, 0x0D, 60, 0, 0, 0, 0]);

        let mut out = [0u8; 4];
        assert_eq!(codec.parse_response(&frame, &mut out).unwrap(), 1);
        assert_eq!(out[0], 60);
    }

    #[test]
    fn test_parse_response_buffer_too_small() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);
        let frame = CanFrame::new(0x7E7, [4, 0x41, 0x0C, 77, 130, 0, 0, 0]);

        let mut out = [0xEEu8; 2];
        assert!(matches!(
            codec.parse_response(&frame, &mut out),
            Err(Error::Codec(CodecError::OutputBufferTooSmall {
                needed: 4,
                available: 2
            }))
        ));
        assert_eq!(out, [0xEE, 0xEE]);
    }

    #[test]
    fn test_parse_response_not_a_response() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);
        let frame = codec.build_query(0x01, 0x0C).unwrap();

        let mut out = [0u8; 4];
        assert!(matches!(
            codec.parse_response(&frame, &mut out),
            Err(Error::Codec(CodecError::NotAResponse(0x01)))
        ));
    }

    #[test]
    fn test_parse_response_truncated_length_byte() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);
        // Length byte declares one value byte; RPM needs two
        let frame = CanFrame::new(0x7E7, [3, 0x41, 0x0C, 77, 130, 0, 0, 0]);

        let mut out = [0u8; 4];
        assert!(matches!(
            codec.parse_response(&frame, &mut out),
            Err(Error::Eval(EvalError::InsufficientBytes {
                needed: 2,
                available: 1
            }))
        ));
    }

    #[test]
    fn test_decode_response() {
        let registry = registry();
        let codec = FrameCodec::new(&registry);
        let frame = codec.build_response(0x01, 0x0C, &[77, 130]).unwrap();

        let decoded = codec.decode_response(&frame).unwrap();
        assert_eq!(decoded.mode, 0x01);
        assert_eq!(decoded.pid, 0x0C);
        assert_eq!(decoded.descriptor.name, "Engine RPM");
        assert_eq!(decoded.raw, vec![77, 130]);
        assert_eq!(decoded.value, Value::Float(4960.5));
    }
}
