//! Serialized messages pushed to a subscriber.

use serde_json::json;

use crate::view::PublicTournament;

/// Payload of the error frame sent when a tick cannot produce a snapshot
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching data";

/// Kind of frame, used for metrics labels and by consumers that do not want
/// to parse the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Snapshot,
    Error,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Snapshot => "snapshot",
            FrameKind::Error => "error",
        }
    }
}

/// One JSON message, already serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameKind,
    data: String,
}

impl Frame {
    /// Serialize a redacted snapshot
    pub fn snapshot(view: &PublicTournament) -> serde_json::Result<Self> {
        Ok(Self {
            kind: FrameKind::Snapshot,
            data: serde_json::to_string(view)?,
        })
    }

    /// `{"error": message}`
    pub fn error(message: &str) -> Self {
        Self {
            kind: FrameKind::Error,
            data: json!({ "error": message }).to_string(),
        }
    }

    pub fn fetch_error() -> Self {
        Self::error(FETCH_ERROR_MESSAGE)
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn is_error(&self) -> bool {
        self.kind == FrameKind::Error
    }

    /// JSON payload
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn into_data(self) -> String {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_frame_shape() {
        let frame = Frame::fetch_error();
        assert!(frame.is_error());
        assert_eq!(frame.kind().as_str(), "error");
        let value: serde_json::Value = serde_json::from_str(frame.data()).unwrap();
        assert_eq!(value, json!({ "error": "Error fetching data" }));
    }

    #[test]
    fn test_payload_is_one_line() {
        // A frame must fit on a single `data:` line of an event stream.
        let frame = Frame::error("line1\nline2");
        assert!(!frame.data().contains('\n'));
        assert_eq!(frame.clone().into_data(), frame.data());
    }
}
