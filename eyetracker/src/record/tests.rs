use super::*;

const REC: &[u8] = br#"<REC CNT="12" FPOGX="0.51" FPOGY="0.47" />"#;

#[test]
fn decode_single_record() {
    let mut codec = RecordCodec::default();
    let mut buffer = BytesMut::from(&b"<REC CNT=\"12\" FPOGX=\"0.51\" FPOGY=\"0.47\" />\r\n"[..]);

    let record = codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .expect("should produce a record");
    assert_eq!(record.as_bytes(), REC);
    assert!(buffer.is_empty());
    assert!(codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .is_none());
}

#[test]
fn decode_holds_partial_line() {
    let mut codec = RecordCodec::default();
    let mut buffer = BytesMut::from(&REC[..20]);

    assert!(codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .is_none());
    assert_eq!(buffer.len(), 20);

    buffer.extend_from_slice(&REC[20..]);
    assert!(codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .is_none());

    buffer.extend_from_slice(b"\r\n");
    let record = codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .expect("should produce a record");
    assert_eq!(record.as_bytes(), REC);
}

#[test]
fn decode_splits_multiple_lines_in_order() {
    let mut codec = RecordCodec::default();
    let mut buffer = BytesMut::from(&b"<ACK ID=\"ENABLE_SEND_DATA\" STATE=\"1\" />\r\n<REC CNT=\"1\" />\r\n<REC CNT=\"2\" />\n<REC"[..]);

    let mut records = Vec::new();
    while let Some(record) = codec.decode(&mut buffer).expect("should decode without errors") {
        records.push(record);
    }

    assert_eq!(
        records,
        vec![
            Record::new(&b"<ACK ID=\"ENABLE_SEND_DATA\" STATE=\"1\" />"[..]),
            Record::new(&b"<REC CNT=\"1\" />"[..]),
            Record::new(&b"<REC CNT=\"2\" />"[..]),
        ]
    );
    assert_eq!(&buffer[..], b"<REC");
}

#[test]
fn decode_skips_empty_lines() {
    let mut codec = RecordCodec::default();
    let mut buffer = BytesMut::from(&b"\r\n\n\r\n<REC />\r\n"[..]);

    let record = codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .expect("should produce a record");
    assert_eq!(record.to_str().expect("should be utf-8"), "<REC />");
}

#[test]
fn decode_rejects_overlong_fragment() {
    let mut codec = RecordCodec::new(8);
    let mut buffer = BytesMut::from(&b"0123456789"[..]);

    let error = codec
        .decode(&mut buffer)
        .expect_err("should reject the fragment");
    assert!(matches!(error, Error::RecordTooLong { length: 10, max: 8 }));
}

#[test]
fn decode_rejects_overlong_line() {
    let mut codec = RecordCodec::new(4);
    let mut buffer = BytesMut::from(&b"<REC />\n"[..]);

    let error = codec
        .decode(&mut buffer)
        .expect_err("should reject the line");
    assert!(matches!(error, Error::RecordTooLong { length: 7, max: 4 }));
}

#[test]
fn decode_accepts_line_at_limit_with_terminator() {
    let mut codec = RecordCodec::new(7);
    let mut buffer = BytesMut::from(&b"<REC />\r\n"[..]);

    let record = codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .expect("should produce a record");
    assert_eq!(record.len(), 7);
}

#[test]
fn decode_eof_discards_fragment() {
    let mut codec = RecordCodec::default();
    let mut buffer = BytesMut::from(&b"<REC />\r\n<REC CNT="[..]);

    let record = codec
        .decode_eof(&mut buffer)
        .expect("should decode without errors")
        .expect("should produce the complete record");
    assert_eq!(record.as_bytes(), b"<REC />");

    assert!(codec
        .decode_eof(&mut buffer)
        .expect("should decode without errors")
        .is_none());
    assert!(buffer.is_empty());
}

#[test]
fn record_accessors() {
    let record = Record::new(&b"\xff\xfe"[..]);
    assert!(record.to_str().is_err());
    assert!(!record.is_empty());
    assert_eq!(record.into_bytes(), Bytes::from_static(b"\xff\xfe"));
}

#[test]
fn decode_continues_after_overlong_line() {
    let mut codec = RecordCodec::new(4);
    let mut buffer = BytesMut::from(&b"<REC CNT=\"1\" />\r\n<A/>\r\n"[..]);

    let error = codec
        .decode(&mut buffer)
        .expect_err("should reject the first line");
    assert!(matches!(error, Error::RecordTooLong { max: 4, .. }));

    let record = codec
        .decode(&mut buffer)
        .expect("should decode without errors")
        .expect("should produce the next record");
    assert_eq!(record.as_bytes(), b"<A/>");
}

#[test]
fn decode_keeps_failing_on_overlong_fragment() {
    let mut codec = RecordCodec::new(4);
    let mut buffer = BytesMut::from(&b"<REC CNT="[..]);

    for _ in 0..2 {
        let error = codec
            .decode(&mut buffer)
            .expect_err("should reject the fragment");
        assert!(matches!(error, Error::RecordTooLong { length: 9, max: 4 }));
    }
}
