//! Tests for SSE decoder

use super::*;

#[test]
fn test_simple_event() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b"data: {\"text\": \"bonjour\"}\n\n");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "{\"text\": \"bonjour\"}");
    assert_eq!(events[0].event_type, None);
    assert!(!decoder.has_remaining());
}

#[test]
fn test_event_type_and_id() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b"event: chunk\nid: 7\ndata: x\n\n");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type.as_deref(), Some("chunk"));
    assert_eq!(events[0].id.as_deref(), Some("7"));
}

#[test]
fn test_event_split_across_chunks() {
    let mut decoder = SseDecoder::new();

    assert!(decoder.feed(b"data: {\"choices\":[{\"del").is_empty());
    assert!(decoder.feed(b"ta\":{\"content\":\"Sa").is_empty());
    let events = decoder.feed(b"lut\"}}]}\n\n");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].delta_content().as_deref(), Some("Salut"));
}

#[test]
fn test_delimiter_split_across_chunks() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.feed(b"data: first\n").is_empty());
    let events = decoder.feed(b"\ndata: second\r\n\r\n");

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].data, "first");
    assert_eq!(events[1].data, "second");
}

#[test]
fn test_utf8_split_across_chunks() {
    let mut decoder = SseDecoder::new();
    let text = "data: crème brûlée\n\n".as_bytes();
    // Split inside the two-byte 'è'
    let split = text.iter().position(|b| *b == 0xC3).unwrap() + 1;

    assert!(decoder.feed(&text[..split]).is_empty());
    assert!(decoder.has_remaining());
    let events = decoder.feed(&text[split..]);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "crème brûlée");
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b"data: a\xFFb\n\n");
    assert_eq!(events[0].data, "a\u{FFFD}b");
}

#[test]
fn test_multi_line_data() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b"data: line1\ndata: line2\n\n");
    assert_eq!(events[0].data, "line1\nline2");
}

#[test]
fn test_comments_and_empty_events_skipped() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b": keep-alive\n\nevent: ping\n\ndata: real\n\n");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "real");
    assert_eq!(events[0].event_type, None);
}

#[test]
fn test_done_marker() {
    let mut decoder = SseDecoder::new();
    let events = decoder.feed(b"data: [DONE]\n\n");
    assert!(events[0].is_done());
    assert_eq!(events[0].delta_content(), None);
}

#[test]
fn test_finish_flushes_unterminated_event() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"fin\"}}]}").is_empty());

    let event = decoder.finish().unwrap();
    assert_eq!(event.delta_content().as_deref(), Some("fin"));
    assert!(!decoder.has_remaining());
    assert!(decoder.finish().is_none());
}

#[test]
fn test_delta_without_content() {
    let event = SseEvent::new(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#);
    assert_eq!(event.delta_content(), None);
    assert_eq!(SseEvent::new("not json").delta_content(), None);
}

#[test]
fn test_clear() {
    let mut decoder = SseDecoder::new();
    decoder.feed(b"data: partial");
    decoder.clear();
    assert!(!decoder.has_remaining());
}
