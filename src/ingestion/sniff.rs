//! Content-type sniffing for uploaded buffers.
//!
//! The verdict is derived from the buffer's leading bytes only; the filename
//! and content-type declared by the client never participate. This is the
//! sole authority for accepting or rejecting an upload.

use serde::Serialize;

/// Container kind recognized from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedKind {
    /// MPEG audio stream, with or without a leading ID3 block.
    Mp3Audio,
    /// Anything that did not match a supported signature.
    Unknown,
}

/// The type reported by the magic-byte matcher, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedType {
    pub ext: &'static str,
    pub mime: &'static str,
}

/// Result of sniffing one buffer. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SniffVerdict {
    pub kind: SniffedKind,
    /// Present whenever the matcher recognized *any* type, including ones
    /// we reject. `None` for garbage, empty, or truncated buffers.
    pub detected: Option<DetectedType>,
}

impl SniffVerdict {
    pub fn is_accepted(&self) -> bool {
        self.kind == SniffedKind::Mp3Audio
    }
}

const MP3_MIME: &str = "audio/mpeg";

/// Inspect a buffer's leading bytes and classify its real container type.
///
/// Never fails: malformed or empty input yields `Unknown`.
pub fn sniff(buffer: &[u8]) -> SniffVerdict {
    match infer::get(buffer) {
        Some(kind) => {
            let detected = DetectedType {
                ext: kind.extension(),
                mime: kind.mime_type(),
            };
            let kind = if detected.mime == MP3_MIME {
                SniffedKind::Mp3Audio
            } else {
                SniffedKind::Unknown
            };
            SniffVerdict {
                kind,
                detected: Some(detected),
            }
        }
        None => SniffVerdict {
            kind: SniffedKind::Unknown,
            detected: None,
        },
    }
}
