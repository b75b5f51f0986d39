//! Server-sent events decoding for streaming completions.
//!
//! Both hosted providers stream `data: <json>` lines separated by blank lines.
//! Network chunks do not respect line boundaries, so bytes are buffered until
//! a full line is available.

use futures::{Stream, StreamExt};
use notion_qa_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::fmt::Display;

struct SseState<S> {
    inner: S,
    buffer: Vec<u8>,
    ready: VecDeque<String>,
    finished: bool,
}

impl<S> SseState<S> {
    /// Move every complete line out of the buffer.
    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.push_line(&line);
        }
    }

    fn push_line(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        if let Some(data) = line.trim().strip_prefix("data:") {
            let data = data.trim();
            if !data.is_empty() {
                self.ready.push_back(data.to_string());
            }
        }
    }
}

/// Decode a byte stream into the payloads of its `data:` fields.
///
/// Comment lines, `event:` and `id:` fields are skipped. A trailing line
/// without a newline is still emitted when the stream ends.
pub fn data_events<S, B, E>(bytes: S) -> impl Stream<Item = AppResult<String>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    let state = SseState {
        inner: bytes,
        buffer: Vec::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }

            if state.finished {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(chunk.as_ref());
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(AppError::Llm(format!("Stream error: {}", e))), state));
                }
                None => {
                    state.finished = true;
                    let rest = std::mem::take(&mut state.buffer);
                    state.push_line(&rest);
                }
            }
        }
    })
}
