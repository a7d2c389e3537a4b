//! Ad-hoc formula evaluation

use anyhow::{Context, Result};
use obd_conv::{compile, ValueType};

use crate::output::{EvalRow, OutputContext};

/// Compile a formula and evaluate it against raw hex bytes
pub fn eval(formula: &str, data: &str, value_type: ValueType, ctx: &OutputContext) -> Result<()> {
    let compiled = compile(formula).with_context(|| format!("Failed to compile {:?}", formula))?;
    let raw = hex::decode(data.trim()).with_context(|| format!("Invalid hex data: {}", data))?;
    let result = compiled.evaluate(&raw)?;

    ctx.print_one(&EvalRow {
        formula: formula.to_string(),
        postfix: compiled.to_string(),
        raw: hex::encode_upper(&raw),
        result,
        value_type: value_type.to_string(),
        value: value_type.cast(result).to_string(),
    });
    Ok(())
}
