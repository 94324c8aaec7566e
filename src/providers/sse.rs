//! Incremental Server-Sent Events decoding
//!
//! Streamed chat completions arrive as an SSE body: events separated by a
//! blank line, each carrying one or more `data:` lines. The decoder buffers
//! raw bytes so that event boundaries and multi-byte UTF-8 sequences may be
//! split anywhere across network chunks.

/// Incremental decoder that yields the `data` payload of each complete event
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body
    ///
    /// Returns the data payloads of every event completed by this chunk, in
    /// arrival order. Events without data, comments and `ping` events are
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatline::providers::sse::SseDecoder;
    ///
    /// let mut decoder = SseDecoder::new();
    /// assert!(decoder.push(b"data: hel").is_empty());
    /// assert_eq!(decoder.push(b"lo\n\n"), vec!["hello".to_string()]);
    /// ```
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(pos) = find_event_boundary(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(data) = parse_event_block(&block[..pos]) {
                events.push(data);
            }
        }
        events
    }

    /// Flush a trailing event that was not terminated by a blank line
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let block = std::mem::take(&mut self.buffer);
        parse_event_block(&block)
    }
}

fn find_event_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Parse a single SSE event block (the text between two blank-line delimiters)
fn parse_event_block(block: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(block);
    let mut data_lines: Vec<&str> = Vec::new();
    let mut event_type: Option<&str> = None;

    for line in text.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim());
        }
        // `id:`, `retry:` and `:` comment lines carry nothing we use.
    }

    if let Some(et) = event_type {
        if et.eq_ignore_ascii_case("ping") {
            return None;
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(data_lines.join("\n"))
}
