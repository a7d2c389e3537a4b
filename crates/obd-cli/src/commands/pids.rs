//! PID listing

use anyhow::Result;
use obd_conv::PidRegistry;

use crate::output::{hex_byte, OutputContext, PidRow};

/// List every descriptor in the registry
pub fn pids(registry: &PidRegistry, ctx: &OutputContext) -> Result<()> {
    let rows = registry
        .descriptors()
        .into_iter()
        .map(|desc| {
            Ok(PidRow {
                mode: hex_byte(desc.mode),
                pid: hex_byte(desc.pid),
                name: desc.name.clone(),
                bytes: desc.can_bytes,
                value_type: desc.value_type.to_string(),
                unit: registry.unit_name(desc.unit)?.to_string(),
                formula: desc.expression.clone(),
                postfix: desc.formula.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ctx.print(&rows);
    Ok(())
}
