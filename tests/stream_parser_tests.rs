use quill::api::stream::StreamParser;
use quill::types::SseEvent;

const PROGRESS: &str =
    r#"data: {"type":"progress","node":"research","data":{"current_step":"Searching","evidence_count":4}}"#;

#[test]
fn test_frame_split_across_chunks() {
    let mut parser = StreamParser::new();
    let frame = format!("{PROGRESS}\n");
    let (head, tail) = frame.as_bytes().split_at(23);

    assert!(parser.process(head).is_empty());
    assert_eq!(parser.buffered_len(), 23);

    let events = parser.process(tail);
    assert_eq!(events.len(), 1);
    match &events[0] {
        SseEvent::Progress { node, data } => {
            assert_eq!(node, "research");
            assert_eq!(data.current_step.as_deref(), Some("Searching"));
            assert_eq!(data.evidence_count, Some(4));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(parser.buffered_len(), 0);
}

#[test]
fn test_byte_at_a_time_yields_same_events() {
    let body = format!(
        "{PROGRESS}\n\ndata: {{\"type\":\"error\",\"message\":\"überlastet\"}}\n"
    );
    let mut parser = StreamParser::new();
    let mut events = Vec::new();
    for byte in body.as_bytes() {
        events.extend(parser.process(std::slice::from_ref(byte)));
    }

    assert_eq!(events.len(), 2);
    match &events[1] {
        SseEvent::Error { message } => assert_eq!(message, "überlastet"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn test_malformed_json_is_skipped() {
    let mut parser = StreamParser::new();
    let chunk = b"data: {not json}\ndata: {\"type\":\"error\",\"message\":\"later\"}\n";

    let events = parser.process(chunk);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], SseEvent::Error { message } if message == "later"));
}

#[test]
fn test_non_data_and_blank_lines_are_ignored() {
    let mut parser = StreamParser::new();
    let chunk = b": keep-alive\nevent: progress\n\ndata:\ndata:    \r\n";
    assert!(parser.process(chunk).is_empty());
}

#[test]
fn test_unknown_type_is_tolerated() {
    let mut parser = StreamParser::new();
    let events = parser.process(b"data: {\"type\":\"heartbeat\",\"ts\":1}\n");
    assert!(matches!(events.as_slice(), [SseEvent::Unknown]));
}

#[test]
fn test_unterminated_final_frame_is_parsed_on_finish() {
    let mut parser = StreamParser::new();
    assert!(parser
        .process(b"data: {\"type\":\"error\",\"message\":\"tail\"}")
        .is_empty());
    assert!(matches!(parser.finish(), Some(SseEvent::Error { message }) if message == "tail"));
    assert!(parser.finish().is_none());
}
