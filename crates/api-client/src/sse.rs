/// Incremental `text/event-stream` decoder.
///
/// Network chunks do not respect event boundaries; a `data:` line may be
/// split across two reads. The decoder buffers until complete lines are
/// available, accumulates `data` fields per event, and emits one payload
/// per blank-line-terminated event. Comment lines (`:`) and non-`data`
/// fields are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns the data payloads of every event
    /// completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data_lines.is_empty() {
                    payloads.push(self.data_lines.join("\n"));
                    self.data_lines.clear();
                }
            } else if let Some(data) = line.strip_prefix("data:") {
                self.data_lines.push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
            // `: comment`, `event:`, `id:`, `retry:` — nothing to do.
        }
        payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_event() {
        let mut dec = SseDecoder::new();
        let out = dec.feed(b"data: {\"a\":1}\n\n");
        assert_eq!(out, vec![r#"{"a":1}"#]);
    }

    #[test]
    fn event_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.feed(b"data: {\"a\"").is_empty());
        assert!(dec.feed(b":1}\n").is_empty());
        let out = dec.feed(b"\n");
        assert_eq!(out, vec![r#"{"a":1}"#]);
    }

    #[test]
    fn multiple_events_in_one_chunk() {
        let mut dec = SseDecoder::new();
        let out = dec.feed(b"data: one\n\ndata: two\n\n");
        assert_eq!(out, vec!["one", "two"]);
    }

    #[test]
    fn crlf_line_endings() {
        let mut dec = SseDecoder::new();
        let out = dec.feed(b"data: one\r\n\r\n");
        assert_eq!(out, vec!["one"]);
    }

    #[test]
    fn comments_and_other_fields_are_ignored() {
        let mut dec = SseDecoder::new();
        let out = dec.feed(b": keepalive\nevent: message\nid: 7\ndata: x\n\n");
        assert_eq!(out, vec!["x"]);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut dec = SseDecoder::new();
        let out = dec.feed(b"data: one\ndata: two\n\n");
        assert_eq!(out, vec!["one\ntwo"]);
    }

    #[test]
    fn blank_line_without_data_emits_nothing() {
        let mut dec = SseDecoder::new();
        assert!(dec.feed(b"\n\n\n").is_empty());
    }
}
