use crate::types::SseEvent;

const DATA_PREFIX: &str = "data:";

/// Incremental parser for newline-delimited `data: <json>` frames.
///
/// Chunks may split a frame, or a multi-byte character, anywhere. Bytes after
/// the last `\n` stay buffered until the next chunk completes the line.
#[derive(Default)]
pub struct StreamParser {
    buffer: Vec<u8>,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(event) = parse_line(&self.buffer[start..end]) {
                events.push(event);
            }
            start = end + 1;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        events
    }

    /// Parse whatever is left once the body has ended.
    ///
    /// A final frame without a trailing newline is still a complete frame.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_line(raw: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(raw);
    let payload = line.trim().strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str::<SseEvent>(payload) {
        Ok(event) => Some(event),
        Err(error) => {
            tracing::warn!(%error, data = payload, "failed to parse stream frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_non_data_lines() {
        let mut parser = StreamParser::new();
        let events = parser.process(b"event: progress\nid: 4\n: keepalive\n\n");
        assert!(events.is_empty());
        assert_eq!(parser.buffered_len(), 0);
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let mut parser = StreamParser::new();
        let events = parser.process(b"data: {\"type\":\"error\",\"message\":\"x\"}\r\n");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn finish_parses_unterminated_last_frame() {
        let mut parser = StreamParser::new();
        assert!(parser
            .process(b"data: {\"type\":\"error\",\"message\":\"late\"}")
            .is_empty());
        match parser.finish() {
            Some(SseEvent::Error { message }) => assert_eq!(message, "late"),
            other => panic!("unexpected frame: {other:?}"),
        }
        assert!(parser.finish().is_none());
    }
}
