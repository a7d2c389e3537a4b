//! End-to-end frame tests against the bundled OBD-II schema

use std::sync::Arc;
use std::thread;

use obd_conv::{
    CanFrame, CodecError, CompileError, Error, FrameCodec, PidRegistry, Schema, SchemaError,
    Value,
};
use pretty_assertions::assert_eq;

const OBD2_SCHEMA: &str = include_str!("../schemas/obd2.yaml");

fn registry() -> PidRegistry {
    Schema::from_yaml(OBD2_SCHEMA)
        .unwrap()
        .into_registry()
        .unwrap()
}

/// Bytes past the length byte's coverage must all be padding
fn assert_padded(frame: &CanFrame) {
    let used = 1 + usize::from(frame.data[0]);
    assert!(
        frame.data[used..].iter().all(|&b| b == 0xCC),
        "frame {} not padded after byte {}",
        frame,
        used
    );
}

#[test]
fn test_bundled_schema_loads() {
    let registry = registry();
    assert_eq!(registry.len(), 13);

    let rpm = registry.lookup(0x01, 0x0C).unwrap();
    assert_eq!(rpm.name, "Engine RPM");
    assert_eq!(rpm.can_bytes, 2);
    assert_eq!(rpm.interpreted_bytes(), 4);
    assert_eq!(registry.unit_name(rpm.unit).unwrap(), "rpm");
}

#[test]
fn test_query_scenario() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    let frame = codec.build_query(0x01, 0x0C).unwrap();
    assert_eq!(frame.id, 0x7DF);
    assert_eq!(frame.data, [2, 0x01, 0x0C, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC]);
}

#[test]
fn test_response_build_scenario() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    let frame = codec.build_response(0x01, 0x0C, &[0xCD, 0xAB]).unwrap();
    assert_eq!(frame.id, 0x7E7);
    assert_eq!(frame.data, [4, 0x41, 0x0C, 0xCD, 0xAB, 0xCC, 0xCC, 0xCC]);
}

#[test]
fn test_response_parse_scenario() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    let frame = CanFrame::new(0x7E7, [4, 0x41, 0x0C, 77, 130, 0xCC, 0xCC, 0xCC]);
    let mut out = [0u8; 4];
    codec.parse_response(&frame, &mut out).unwrap();
    assert_eq!(f32::from_ne_bytes(out), 4960.5);
}

#[test]
fn test_identity_scenario() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    let frame = CanFrame::new(0x7E7, [3, 0x41, 0x0D, 60, 0, 0, 0, 0]);
    let mut out = [0u8; 1];
    assert_eq!(codec.parse_response(&frame, &mut out).unwrap(), 1);
    assert_eq!(out[0], 60);
}

#[test]
fn test_query_header_roundtrip_for_every_pid() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    for desc in registry.descriptors() {
        let frame = codec.build_query(desc.mode, desc.pid).unwrap();
        assert_eq!(
            FrameCodec::parse_headers(&frame).unwrap(),
            (desc.mode, desc.pid)
        );
        assert_padded(&frame);
    }
}

#[test]
fn test_response_roundtrip_for_every_pid() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    for desc in registry.descriptors() {
        let raw: Vec<u8> = (0..desc.can_bytes).map(|i| 0x10 + i).collect();
        let query = codec.build_query(desc.mode, desc.pid).unwrap();
        let response = codec.build_response(desc.mode, desc.pid, &raw).unwrap();

        // Headers differ only by the response offset on the mode byte
        let (query_mode, query_pid) = FrameCodec::parse_headers(&query).unwrap();
        let (resp_mode, resp_pid) = FrameCodec::parse_headers(&response).unwrap();
        assert_eq!(resp_mode, query_mode + 0x40);
        assert_eq!(resp_pid, query_pid);

        // Raw bytes come back unchanged
        let decoded = codec.decode_response(&response).unwrap();
        assert_eq!(decoded.raw, raw);
        assert_eq!(decoded.descriptor, desc);
        assert_padded(&response);
    }
}

#[test]
fn test_native_order_roundtrip() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    // Run time is 256*A+B as uint16, written back in host order
    let frame = codec.build_response(0x01, 0x1F, &[0x01, 0x02]).unwrap();
    let mut out = [0u8; 2];
    codec.parse_response(&frame, &mut out).unwrap();
    assert_eq!(u16::from_ne_bytes(out), 0x0102);
}

#[test]
fn test_negative_values() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    let frame = codec.build_response(0x01, 0x05, &[0]).unwrap();
    assert_eq!(codec.decode_response(&frame).unwrap().value, Value::Int16(-40));

    let frame = codec.build_response(0x01, 0x0E, &[0]).unwrap();
    assert_eq!(
        codec.decode_response(&frame).unwrap().value,
        Value::Float(-64.0)
    );
}

#[test]
fn test_unbalanced_formula_fails_schema_load() {
    let yaml = r#"
modes:
  0x01:
    0x0C: { name: Engine RPM, bytes: 2, unit: rpm, type: float, expr: "(A+B" }
"#;
    let result = Schema::from_yaml(yaml).unwrap().into_registry();
    assert!(matches!(
        result,
        Err(SchemaError::Formula {
            source: CompileError::UnbalancedParens,
            ..
        })
    ));
}

#[test]
fn test_unknown_pid_errors() {
    let registry = registry();
    let codec = FrameCodec::new(&registry);

    assert!(matches!(codec.build_query(0x09, 0x02), Err(Error::Lookup(_))));

    let frame: CanFrame = "7E7#0349020100000000".parse().unwrap();
    let mut out = [0u8; 4];
    assert!(matches!(
        codec.parse_response(&frame, &mut out),
        Err(Error::Lookup(_))
    ));
}

#[test]
fn test_short_frame() {
    let frame: CanFrame = "7E7#0241".parse().unwrap();
    assert!(matches!(
        FrameCodec::parse_headers(&frame),
        Err(Error::Codec(CodecError::FrameTooShort { len: 2 }))
    ));
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(registry());

    let handles: Vec<_> = (0..4u8)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let codec = FrameCodec::new(&registry);
                let frame = codec.build_response(0x01, 0x0D, &[n]).unwrap();
                codec.decode_response(&frame).unwrap().value
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Value::Uint8(n as u8));
    }
}
