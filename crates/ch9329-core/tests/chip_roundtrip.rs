//! Integration tests for the ch9329-core codecs.
//!
//! These drive the public API end to end: a captured `GetParameterConfig`
//! reply is parsed as a frame, decoded through the parameter layout, edited,
//! re-encoded, and framed again.

use ch9329_core::{
    build,
    command::{expect_success, parameters_from_reply, Commands, GET_PARAMETERS_REPLY_LEN},
    parse,
    protocol::FRAME_HEAD,
    record::chip::field,
    CodecConfig, FrameAccumulator, FrameCodec, FrameError,
};

/// Reply cmd code for `GetParameterConfig` (request code with the high bit set).
const GET_PARAMETERS_REPLY_CMD: u8 = 0x88;

/// A `GetParameterConfig` reply captured from a chip in factory state.
fn captured_reply() -> Vec<u8> {
    let mut bytes = vec![
        0x57, 0xAB, 0x00, 0x88, 0x32, // prefix, 50-byte payload
        0x80, 0x80, 0x00, // work mode, serial mode, address
        0x00, 0x00, 0x25, 0x80, // 9600 baud
        0x08, 0x00, // reserve
        0x00, 0x03, // packet interval
        0x86, 0x1A, // VID
        0x29, 0xE1, // PID
        0x00, 0x00, 0x00, 0x00, // upload interval, release delay
        0x00, 0x01, // auto enter flag
        0x0D, 0x00, 0x00, 0x00, // enter data 1
    ];
    bytes.extend_from_slice(&[0x00; 25]);
    bytes.push(0x24);
    bytes
}

#[test]
fn test_captured_reply_is_56_bytes_with_valid_checksum() {
    let reply = captured_reply();
    assert_eq!(reply.len(), GET_PARAMETERS_REPLY_LEN);

    let parsed = parse(&reply, true).expect("captured reply must parse strictly");
    assert!(parsed.checksum_ok());
    assert_eq!(parsed.frame_len, 56);
    assert_eq!(parsed.frame.command(), GET_PARAMETERS_REPLY_CMD);
    assert_eq!(parsed.frame.payload().len(), 50);
}

#[test]
fn test_reply_decodes_to_expected_values() {
    let parsed = parse(&captured_reply(), true).unwrap();
    let params = parameters_from_reply(parsed.frame.payload()).unwrap();

    assert_eq!(params.baud_rate(), Some(9600));
    assert_eq!(params.usb_vid(), Some(6790));
    assert_eq!(params.usb_pid(), Some(57641));
    assert_eq!(
        params.record().get_bytes(field::KEYBOARD_ENTER_DATA_1),
        Some(&[0x0D, 0x00, 0x00, 0x00][..])
    );
}

#[test]
fn test_decode_encode_reframe_reproduces_every_byte() {
    let reply = captured_reply();
    let parsed = parse(&reply, true).unwrap();
    let params = parameters_from_reply(parsed.frame.payload()).unwrap();

    let payload = params.to_payload().unwrap();
    let rebuilt = build(FRAME_HEAD, 0x00, GET_PARAMETERS_REPLY_CMD, &payload).unwrap();

    assert_eq!(rebuilt, reply);
}

#[test]
fn test_set_parameters_frame_from_captured_values() {
    let parsed = parse(&captured_reply(), true).unwrap();
    let params = parameters_from_reply(parsed.frame.payload()).unwrap();

    let bytes = Commands::default()
        .set_parameters(&params)
        .unwrap()
        .to_bytes();

    assert_eq!(bytes.len(), 56);
    assert_eq!(&bytes[..5], &[0x57, 0xAB, 0x00, 0x09, 0x32]);
    assert_eq!(bytes[55], 0xA5);
}

#[test]
fn test_edited_baud_rate_survives_full_cycle() {
    let parsed = parse(&captured_reply(), true).unwrap();
    let mut params = parameters_from_reply(parsed.frame.payload()).unwrap();
    params.set_baud_rate(115_200);

    let frame = Commands::default().set_parameters(&params).unwrap();
    let reparsed = parse(&frame.to_bytes(), true).unwrap();
    let again = parameters_from_reply(reparsed.frame.payload()).unwrap();

    assert_eq!(again.baud_rate(), Some(115_200));
    assert_eq!(again.usb_vid(), Some(6790));
}

#[test]
fn test_accumulator_splits_back_to_back_replies() {
    let mut stream = vec![0xFF, 0x00]; // noise from an earlier timeout
    stream.extend_from_slice(&captured_reply());
    stream.extend_from_slice(&[0x57, 0xAB, 0x00, 0x89, 0x01, 0x00, 0x8C]);

    let mut acc = FrameAccumulator::new(CodecConfig::default().strict());
    let mut frames = Vec::new();
    for chunk in stream.chunks(9) {
        frames.extend(acc.push(chunk));
    }

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].frame.command(), GET_PARAMETERS_REPLY_CMD);
    assert_eq!(frames[1].frame.command(), 0x89);
    assert_eq!(expect_success(frames[1].frame.payload()), Ok(()));
    assert_eq!(acc.pending(), 0);
}

#[test]
fn test_configured_codec_rejects_foreign_head() {
    let codec = FrameCodec::new(CodecConfig::default());
    let mut reply = captured_reply();
    reply[0] = 0x58;

    assert_eq!(
        codec.parse(&reply),
        Err(FrameError::UnexpectedHead([0x58, 0xAB]))
    );
}

#[test]
fn test_truncated_reply_reports_missing_bytes() {
    let reply = captured_reply();
    assert_eq!(
        parse(&reply[..40], false),
        Err(FrameError::InsufficientData {
            needed: 56,
            available: 40
        })
    );
}
