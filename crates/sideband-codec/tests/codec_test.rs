//! Integration tests for the sideband codec.
//!
//! These drive the public API end to end: catalog resolution, frame building,
//! response parsing and layout extraction, and a scripted executor standing in
//! for the transport tool.

use sideband_codec::{
    build_frame, extract_fields, parse_response, BusCatalog, CodecError, CodecResult,
    CommandCatalog, CommandFields, CommandId, ErrorKind, ExecutorOutput, ExtractMode,
    FieldLayout, Frame, LayoutTable, MessageType, OutputCodec, RawResponse, ResponseLayout,
    Session, TransportArgs, TransportExecutor,
};

/// Executor that answers every call with the same output.
struct Echo {
    output: String,
    calls: usize,
}

impl TransportExecutor for Echo {
    fn execute(&mut self, _args: &[String]) -> CodecResult<ExecutorOutput> {
        self.calls += 1;
        Ok(ExecutorOutput::from_stdout(&self.output))
    }
}

fn tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

// ============================================================================
// Frame Building
// ============================================================================

#[test]
fn test_every_ncsi_command_frame_shape() {
    let catalog = CommandCatalog::builtin();
    let defaults = CommandFields::default();
    let mut seen = 0;
    for name in catalog.names_in(MessageType::Ncsi) {
        let def = catalog.definition(name, &defaults).unwrap();
        let frame = build_frame(def.family, &def.fields).unwrap();
        let payload_len = def.fields.payload_len as usize;

        assert_eq!(frame.header.len(), 9, "{}", name);
        assert_eq!(frame.payload.len(), payload_len, "{}", name);
        assert_eq!(frame.pad.len(), 4, "{}", name);
        assert_eq!(frame.checksum.len(), 4, "{}", name);
        assert_eq!(frame.tokens().len(), 16 + payload_len + 8, "{}", name);
        seen += 1;
    }
    assert_eq!(seen, 30);
}

#[test]
fn test_every_catalog_command_builds() {
    let catalog = CommandCatalog::builtin();
    for (name, entry) in catalog.entries() {
        let def = catalog.definition(name, &CommandFields::default()).unwrap();
        assert_eq!(def.family, entry.family);
        assert!(build_frame(def.family, &def.fields).is_ok(), "{}", name);
    }
}

#[test]
fn test_command_ids_match_catalog() {
    let catalog = CommandCatalog::builtin();
    assert_eq!(catalog.len(), CommandId::ALL.len());
    for id in CommandId::ALL {
        let entry = catalog.entry(id.as_str()).unwrap();
        assert_eq!(entry.family, id.family(), "{}", id);
    }
}

#[test]
fn test_resolve_nonexistent_command() {
    let err = CommandCatalog::builtin()
        .resolve("nonexistent command")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!("nonexistent command".parse::<CommandId>().is_err());
}

#[test]
fn test_unknown_family_name() {
    let err = "CAN".parse::<MessageType>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ============================================================================
// Response Parsing
// ============================================================================

#[test]
fn test_ncsi_response_segments() {
    let raw = RawResponse::from_line("A B C D E F G H I 0 0 0 0 0 0 0 0 0 0 RC1 RC2 RR1 RR2 P1 P2 P3");
    let response = parse_response(MessageType::Ncsi, None, &raw).unwrap();
    let header: Vec<&str> = response.header.iter().map(|h| h.value.as_str()).collect();
    assert_eq!(header, vec!["A", "B", "C", "D", "E", "F", "G", "H", "I"]);
    assert_eq!(response.payload(), &["P1", "P2", "P3"]);
}

#[test]
fn test_string_range_drops_nul() {
    let layout = ResponseLayout::new().string("name", 0, 2);
    let fields = extract_fields(&tokens("00 41 00"), &layout, ExtractMode::Strict).unwrap();
    assert_eq!(fields.get("name").unwrap().as_text(), Some("A"));
}

#[test]
fn test_header_round_trip() {
    let catalog = CommandCatalog::builtin();
    let defaults = CommandFields {
        mc_id: 0x11,
        header_rev: 1,
        ..Default::default()
    };
    for name in catalog.names_in(MessageType::Ncsi) {
        let def = catalog.definition(name, &defaults).unwrap();
        let frame = build_frame(def.family, &def.fields).unwrap();
        let at = |field: &str| frame.header_tokens(field).unwrap()[0].clone();

        let mut line = vec![
            "0x08".to_string(),
            "0x09".to_string(),
            "0x02".to_string(),
            at("managementControllerId"),
            at("headerRevision"),
            at("reserved"),
            at("instanceId"),
            at("commandCode"),
            at("channelId"),
        ];
        line.extend(std::iter::repeat("0x00".to_string()).take(14));
        line.extend(frame.payload.iter().cloned());

        let response = parse_response(MessageType::Ncsi, None, &RawResponse::new(line)).unwrap();
        assert_eq!(response.header_value("mcId").unwrap(), "0x11");
        assert_eq!(response.header_value("instanceId").unwrap(), at("instanceId"));
        assert_eq!(response.header_value("packetType").unwrap(), at("commandCode"));
        assert_eq!(response.header_value("channel").unwrap(), at("channelId"));
        assert_eq!(response.payload(), &frame.payload[..], "{}", name);
        assert!(response.ncsi_status().unwrap().is_success());
    }
}

/// Echo a built frame back as a response of the same family: header values at
/// their response positions, the request payload as the response payload.
fn echo_response(frame: &Frame) -> RawResponse {
    let at = |field: &str| frame.header_tokens(field).unwrap()[0].clone();
    let mut line: Vec<String> = vec!["0x08".into(), "0x09".into()];
    match frame.family {
        MessageType::Ncsi => {
            line.push("0x02".into());
            for field in [
                "managementControllerId",
                "headerRevision",
                "reserved",
                "instanceId",
                "commandCode",
                "channelId",
            ] {
                line.push(at(field));
            }
            line.extend(std::iter::repeat("0x00".to_string()).take(14));
        }
        MessageType::Mctp => {
            line.push("0x00".into());
            line.push(at("requestFlagsAndInstanceId"));
            line.push(at("commandCode"));
            line.push("0x00".into());
        }
        MessageType::Pldm => {
            line.push("0x01".into());
            line.push(at("requestFlagsAndInstanceId"));
            line.push(at("headerVersionAndType"));
            line.push(at("commandCode"));
            line.push("0x00".into());
        }
        other => panic!("no response header for {}", other),
    }
    line.extend(frame.payload.iter().cloned());
    RawResponse::new(line)
}

#[test]
fn test_payload_round_trip_through_layouts() {
    let catalog = CommandCatalog::builtin();
    let layouts = LayoutTable::builtin();
    let cases = [
        (MessageType::Ncsi, "get package uuid"),
        (MessageType::Mctp, "get mctp version support"),
        (MessageType::Pldm, "get pldm version"),
    ];

    for (family, name) in cases {
        let layout = layouts.layout(name).unwrap();
        let len = layout.min_payload_tokens();
        let bytes: Vec<u8> = (0..len)
            .map(|i| (i as u8).wrapping_mul(7).wrapping_add(0x11))
            .collect();

        let mut def = catalog.definition(name, &CommandFields::default()).unwrap();
        def.fields.payload_len = len as u16;
        def.fields.payload = Some(bytes);
        let frame = build_frame(def.family, &def.fields).unwrap();
        assert_eq!(frame.family, family);

        let response = parse_response(family, Some(name), &echo_response(&frame)).unwrap();
        assert_eq!(response.payload(), &frame.payload[..], "{}", name);
        let command = response
            .header_value("commandCode")
            .or_else(|_| response.header_value("packetType"))
            .unwrap();
        assert_eq!(command, frame.header_tokens("commandCode").unwrap()[0]);

        for field in layout.fields() {
            let value = response.field(&field.name).unwrap();
            match field.at {
                FieldLayout::Offset(i) => assert_eq!(
                    value.as_token().unwrap(),
                    frame.payload[i],
                    "{}.{}",
                    name,
                    field.name
                ),
                FieldLayout::Range(start, end) => assert_eq!(
                    value.as_tokens().unwrap(),
                    &frame.payload[start..=end],
                    "{}.{}",
                    name,
                    field.name
                ),
                FieldLayout::StringRange(..) => unreachable!("no text fields in these layouts"),
            }
        }
    }
}

#[test]
fn test_mctp_version_support_round_trip() {
    let def = CommandCatalog::builtin()
        .definition_for(CommandId::GetMctpVersionSupport, &CommandFields::default())
        .unwrap();
    let frame = build_frame(def.family, &def.fields).unwrap();
    assert_eq!(frame.tokens(), vec!["0x83", "0x04", "0xff"]);

    // one version entry, 1.3.1
    let mut raw = echo_response(&frame).tokens().to_vec();
    raw.truncate(6);
    raw.extend(tokens("01 f1 f3 f1 00"));

    let response = parse_response(
        MessageType::Mctp,
        Some("get mctp version support"),
        &RawResponse::new(raw),
    )
    .unwrap();
    assert!(response.completion_code().unwrap().is_success());
    assert_eq!(response.header_value("requestFlagsAndInstanceId").unwrap(), "0x83");
    assert_eq!(response.field("versionCount").unwrap().as_token(), Some("01"));
    assert_eq!(
        response.field("version").unwrap().as_tokens().unwrap(),
        &["f1", "f3", "f1", "00"]
    );
}

#[test]
fn test_version_id_extraction() {
    // "NIC-FW" NUL padded to 12 bytes at payload offsets 8..=19
    let payload = "f1 f1 ff 00 00 00 00 01 \
                   4e 49 43 2d 46 57 00 00 00 00 00 00 \
                   01 02 03 04 16 37 80 86 00 01 80 86 00 00 01 57";
    let line = format!(
        "08 09 02 00 01 00 15 95 00 0 0 0 0 0 0 0 0 0 0 00 00 00 00 {}",
        payload
    );
    let response = parse_response(
        MessageType::Ncsi,
        Some("get version id"),
        &RawResponse::from_line(&line),
    )
    .unwrap();
    assert_eq!(response.field("firmwareName").unwrap().as_text(), Some("NIC-FW"));
    assert_eq!(
        response.field("pciVendorId").unwrap().as_tokens().unwrap(),
        &["80", "86"]
    );
}

// ============================================================================
// Sessions and Executor Output
// ============================================================================

#[test]
fn test_session_runs_every_layout_command_in_lenient_mode() {
    // 28 payload tokens: enough for every single-offset field, short of most ranges
    let payload = vec!["0x00"; 28].join(" ");
    let output = format!(
        "raw response\n0x08 0x09 0x02 0x00 0x01 0x00 0x00 0x80 0x00 \
         0 0 0 0 0 0 0 0 0 0 0x00 0x00 0x00 0x00 {}\n",
        payload
    );
    let mut echo = Echo { output, calls: 0 };
    let mut session = Session::new(&mut echo, TransportArgs::default(), CommandFields::default())
        .with_extract_mode(ExtractMode::Lenient);
    let catalog = CommandCatalog::builtin();

    for (name, _) in LayoutTable::builtin().iter() {
        if catalog.entry(name).unwrap().family != MessageType::Ncsi {
            continue;
        }
        let response = session.run_command(name).unwrap();
        assert!(response.fields.is_some(), "{}", name);
    }
    drop(session);
    assert_eq!(echo.calls, 9);
}

#[test]
fn test_streamed_output_matches_line_scan() {
    let text = b"probe\r\nraw response:\r\n08 01 02 03 04 05\r\n";
    let mut codec = OutputCodec::default();
    for chunk in text.chunks(5) {
        codec.push(chunk);
    }
    let streamed = codec.decode_raw_response().unwrap();
    assert_eq!(streamed.tokens(), &tokens("08 01 02 03 04 05")[..]);
}

#[test]
fn test_extraction_bounds_is_terminal() {
    let line = "08 09 02 00 01 00 15 95 00 0 0 0 0 0 0 0 0 0 0 00 00 00 00 01 02";
    let err = parse_response(
        MessageType::Ncsi,
        Some("get version id"),
        &RawResponse::from_line(line),
    )
    .unwrap_err();
    assert!(matches!(err, CodecError::ExtractionBounds { .. }));
}

// ============================================================================
// Persisted Tables
// ============================================================================

#[test]
fn test_catalog_json_round_trip() {
    let catalog = CommandCatalog::builtin();
    let json = serde_json::to_string(catalog).unwrap();
    let loaded: CommandCatalog = serde_json::from_str(&json).unwrap();
    assert_eq!(&loaded, catalog);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["select package"]["family"], "NCSI");
    assert_eq!(value["select package"]["channelId"], 31);
    assert_eq!(value["set link"]["verified"], false);
}

#[test]
fn test_layout_json_shape() {
    let value = serde_json::to_value(LayoutTable::builtin()).unwrap();
    let fields = value["get version id"].as_array().unwrap();
    let firmware = fields
        .iter()
        .find(|f| f["name"] == "firmwareName")
        .unwrap();
    assert_eq!(firmware["at"]["stringRange"], serde_json::json!([8, 19]));
    assert_eq!(BusCatalog::builtin().len(), 8);
}
