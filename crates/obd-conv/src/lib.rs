//! obd-conv - OBD-II PID Conversion Library
//!
//! Builds and decodes single-frame OBD-II request/response CAN frames from a
//! small schema: one entry per (mode, PID) with a display name, unit, raw byte
//! width, value type and conversion formula.
//!
//! # Features
//!
//! - **Compiled formulas** - `(A*256+B)/4` is compiled once to postfix form
//! - **Immutable registry** - built once, shared freely across threads
//! - **Bit-exact frames** - fixed 8-byte layout with `0xCC` padding
//! - **YAML schema files** - one entry per mode/PID
//!
//! # Quick Start
//!
//! ```rust
//! use obd_conv::{FrameCodec, PidRecord, PidRegistry, Value, ValueType};
//!
//! let registry = PidRegistry::build([
//!     PidRecord::new(0x01, 0x0C, "Engine RPM", 2, ValueType::Float)
//!         .with_unit("rpm")
//!         .with_formula("(A*256+B)/4"),
//! ])
//! .unwrap();
//! let codec = FrameCodec::new(&registry);
//!
//! // Outbound: query frame
//! let query = codec.build_query(0x01, 0x0C).unwrap();
//! assert_eq!(query.to_string(), "7DF#02010CCCCCCCCCCC");
//!
//! // Inbound: (77*256 + 130) / 4 = 4960.5 rpm
//! let response = codec.build_response(0x01, 0x0C, &[77, 130]).unwrap();
//! let decoded = codec.decode_response(&response).unwrap();
//! assert_eq!(decoded.value, Value::Float(4960.5));
//! ```
//!
//! # Frame Layout
//!
//! | Byte | Query | Response |
//! |------|-------|----------|
//! | id   | 0x7DF | 0x7DF + 8 |
//! | 0    | 2     | 2 + raw length |
//! | 1    | mode  | mode + 0x40 |
//! | 2    | PID   | PID |
//! | 3..  | 0xCC  | raw bytes, then 0xCC |

pub mod codec;
pub mod definition;
pub mod error;
pub mod formula;
pub mod frame;
pub mod registry;
pub mod schema;
pub mod stack;
pub mod types;

// Re-export main types
pub use codec::{DecodedResponse, FrameCodec};
pub use definition::{PidDescriptor, PidRecord};
pub use error::{
    parse_id, CodecError, CompileError, Error, EvalError, LookupError, Result, SchemaError,
};
pub use formula::{compile, CompiledFormula, Operator, Token};
pub use frame::{CanFrame, CodecConfig};
pub use registry::PidRegistry;
pub use schema::{Schema, SchemaMeta, GENERIC_OBD2};
pub use stack::TokenStack;
pub use types::{UnitId, Value, ValueType};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::FrameCodec;
    pub use crate::error::{Error, Result};
    pub use crate::frame::CanFrame;
    pub use crate::registry::PidRegistry;
    pub use crate::schema::Schema;
    pub use crate::types::{Value, ValueType};
}
