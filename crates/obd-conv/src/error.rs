//! Error types for schema loading, lookup, framing and evaluation

use thiserror::Error;

/// Formula compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A `)` without matching `(`, or a `(` left open at end of input
    #[error("unbalanced parentheses")]
    UnbalancedParens,

    /// Formula has more tokens than the compiler's fixed limit
    #[error("formula exceeds {limit} tokens")]
    TokenOverflow { limit: usize },

    /// Character that is not part of the formula grammar
    #[error("unknown token '{token}' at position {position}")]
    UnknownToken { token: char, position: usize },

    /// Operand letter skips ahead of the next unbound letter
    #[error("operand '{found}' used before '{expected}'")]
    NonContiguousOperand { expected: char, found: char },

    /// Valid token in a place the grammar does not allow it
    #[error("unexpected token at position {position}")]
    UnexpectedToken { position: usize },

    /// Input ended while an operand was still expected
    #[error("unexpected end of formula")]
    UnexpectedEnd,

    /// Numeric literal that does not parse
    #[error("invalid numeric literal: {0}")]
    InvalidLiteral(String),
}

/// Errors that reject a schema as a whole
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Same (mode, PID) pair defined twice
    #[error("duplicate PID: mode 0x{mode:02X}, PID 0x{pid:02X}")]
    DuplicatePid { mode: u8, pid: u8 },

    /// Formula failed to compile
    #[error("formula for mode 0x{mode:02X}, PID 0x{pid:02X}: {source}")]
    Formula {
        mode: u8,
        pid: u8,
        #[source]
        source: CompileError,
    },

    /// Formula references more operands than the PID carries bytes
    #[error("mode 0x{mode:02X}, PID 0x{pid:02X}: formula uses {operands} operands but PID has {bytes} bytes")]
    OperandWidth {
        mode: u8,
        pid: u8,
        operands: usize,
        bytes: u8,
    },

    /// CAN byte width outside 1..=7 (6 and 7 load but exceed a single frame)
    #[error("mode 0x{mode:02X}, PID 0x{pid:02X}: invalid byte width {bytes}")]
    InvalidByteWidth { mode: u8, pid: u8, bytes: u8 },

    /// Codec addressing that leaves the 11-bit identifier range
    #[error("invalid CAN addressing: query id 0x{query_id:03X} plus offset {response_offset} must stay within 0x7FF")]
    InvalidAddressing { query_id: u16, response_offset: u16 },

    /// Unrecognized value type name
    #[error("invalid value type: {0}")]
    InvalidValueType(String),

    /// Mode or PID key that is not a hex byte
    #[error("invalid mode/PID identifier: {0}")]
    InvalidId(String),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registry lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown PID: mode 0x{mode:02X}, PID 0x{pid:02X}")]
    DescriptorNotFound { mode: u8, pid: u8 },

    #[error("unknown unit id {0}")]
    UnitNotFound(u16),
}

/// Frame layout errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Raw value does not fit after the three header bytes
    #[error("raw value too large: {len} bytes, at most {max} fit in a frame")]
    RawBytesTooLarge { len: usize, max: usize },

    /// Frame shorter than the fields being read
    #[error("frame too short: {len} bytes")]
    FrameTooShort { len: usize },

    /// Caller's output buffer cannot hold the interpreted value
    #[error("output buffer too small: need {needed} bytes, got {available}")]
    OutputBufferTooSmall { needed: usize, available: usize },

    /// Raw byte count differs from the PID's declared width
    #[error("mode 0x{mode:02X}, PID 0x{pid:02X}: expected {expected} raw bytes, got {actual}")]
    PayloadLengthMismatch {
        mode: u8,
        pid: u8,
        expected: usize,
        actual: usize,
    },

    /// Mode byte lacks the positive-response offset
    #[error("not a response frame: mode byte 0x{0:02X}")]
    NotAResponse(u8),

    /// Textual frame that does not parse
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

/// Evaluation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("insufficient bytes: formula needs {needed}, got {available}")]
    InsufficientBytes { needed: usize, available: usize },
}

/// Any error produced by this crate
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Result type for codec and registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Parse a mode or PID identifier (hex) to u8
///
/// Accepts formats: "0C", "0x0C", "0X0C", "c"
pub fn parse_id(s: &str) -> std::result::Result<u8, SchemaError> {
    let trimmed = s.trim().trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(trimmed, 16).map_err(|_| SchemaError::InvalidId(s.trim().to_string()))
}
