//! Command implementations for obd-cli

pub mod eval;
pub mod frames;
pub mod pids;

pub use eval::eval;
pub use frames::{decode, query, respond};
pub use pids::pids;
