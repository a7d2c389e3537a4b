//! Frame building and decoding

use anyhow::{Context, Result};
use obd_conv::{CanFrame, FrameCodec};

use crate::output::{hex_byte, FrameRow, OutputContext, ValueRow};

fn frame_row(frame: &CanFrame) -> FrameRow {
    FrameRow {
        id: format!("0x{:03X}", frame.id),
        data: frame
            .payload()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" "),
        frame: frame.to_string(),
    }
}

/// Print the query frame for a PID
pub fn query(codec: &FrameCodec<'_>, mode: u8, pid: u8, ctx: &OutputContext) -> Result<()> {
    let frame = codec.build_query(mode, pid).with_context(|| {
        format!(
            "Failed to build query for mode {} PID {}",
            hex_byte(mode),
            hex_byte(pid)
        )
    })?;

    tracing::debug!(%frame, "Built query");
    ctx.print_one(&frame_row(&frame));
    Ok(())
}

/// Print a response frame carrying raw hex bytes
pub fn respond(
    codec: &FrameCodec<'_>,
    mode: u8,
    pid: u8,
    data: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let raw = hex::decode(data.trim()).with_context(|| format!("Invalid hex data: {}", data))?;
    let frame = codec.build_response(mode, pid, &raw).with_context(|| {
        format!(
            "Failed to build response for mode {} PID {}",
            hex_byte(mode),
            hex_byte(pid)
        )
    })?;

    tracing::debug!(%frame, "Built response");
    ctx.print_one(&frame_row(&frame));
    Ok(())
}

/// Decode a candump-style response frame
pub fn decode(codec: &FrameCodec<'_>, frame: &str, ctx: &OutputContext) -> Result<()> {
    let frame: CanFrame = frame.parse()?;
    let decoded = codec
        .decode_response(&frame)
        .with_context(|| format!("Failed to decode {}", frame))?;
    let unit = codec.registry().unit_name(decoded.descriptor.unit)?;

    ctx.print_one(&ValueRow {
        mode: hex_byte(decoded.mode),
        pid: hex_byte(decoded.pid),
        name: decoded.descriptor.name.clone(),
        raw: hex::encode_upper(&decoded.raw),
        value: decoded.value.to_string(),
        unit: unit.to_string(),
    });
    Ok(())
}
