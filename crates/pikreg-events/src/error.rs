//! Frame decoding errors.

use thiserror::Error;

/// Failure to decode a single `data: ` frame.
///
/// Frame errors never terminate a stream; callers log them and keep reading.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The completed line was not valid UTF-8.
    #[error("frame is not valid UTF-8")]
    Utf8 {
        /// Raw bytes of the offending line.
        line: Vec<u8>,
        /// Decoder error detail.
        source: std::str::Utf8Error,
    },
    /// The payload after `data: ` was not a recognised event record.
    #[error("frame payload is not a valid activation event")]
    Json {
        /// Payload text that failed to parse.
        payload: String,
        /// Parser error detail.
        source: serde_json::Error,
    },
}

impl FrameError {
    /// Short text of the payload for log fields, truncated to keep logs readable.
    #[must_use]
    pub fn payload_preview(&self) -> String {
        const LIMIT: usize = 120;
        let text = match self {
            Self::Utf8 { line, .. } => String::from_utf8_lossy(line).into_owned(),
            Self::Json { payload, .. } => payload.clone(),
        };
        if text.chars().count() <= LIMIT {
            text
        } else {
            let mut cut: String = text.chars().take(LIMIT).collect();
            cut.push('…');
            cut
        }
    }
}

/// Result alias for frame decoding.
pub type FrameResult<T> = Result<T, FrameError>;
