//! Restartable decoder for newline-delimited `data: ` frames.
//!
//! # Design
//! - Buffer raw bytes so multi-byte characters and JSON records may be split
//!   across reads; only complete lines are ever decoded.
//! - Lines without a `data:` prefix (comments, `event:`, `id:`, blank
//!   separators) are ignored.
//! - A bad frame yields an error entry for that frame alone; decoding continues.

use crate::error::{FrameError, FrameResult};
use crate::payloads::ActivationEvent;

const DATA_PREFIX: &[u8] = b"data:";

/// Incremental frame decoder fed with response body chunks.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    // Prefix of `buffer` already known to hold no newline.
    scanned: usize,
}

impl FrameDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
        }
    }

    /// Feed one chunk and return every frame completed by it, in arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<FrameResult<ActivationEvent>> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[self.scanned..]
            .iter()
            .position(|byte| *byte == b'\n')
        {
            let end = self.scanned + offset;
            let line = &self.buffer[consumed..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if let Some(frame) = decode_line(line.to_vec()) {
                frames.push(frame);
            }
            consumed = end + 1;
            self.scanned = consumed;
        }
        self.buffer.drain(..consumed);
        self.scanned = self.buffer.len();
        frames
    }

    /// Bytes held back waiting for a newline.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Close the decoder, discarding any unterminated fragment.
    ///
    /// Returns the number of bytes dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        self.scanned = 0;
        dropped
    }
}

fn decode_line(line: Vec<u8>) -> Option<FrameResult<ActivationEvent>> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(b" ").unwrap_or(payload);
    let text = match std::str::from_utf8(payload) {
        Ok(text) => text.trim(),
        Err(source) => return Some(Err(FrameError::Utf8 { line, source })),
    };
    if text.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<ActivationEvent>(text).map_err(|source| FrameError::Json {
            payload: text.to_string(),
            source,
        }),
    )
}
