use serde::{Deserialize, Serialize};

/// Request message sent from a front-end client to the filter server.
///
/// One JSON object per newline-framed message, tagged on `type`. Anything
/// that fails to decode into one of these variants gets an explicit error
/// response rather than a dropped connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Load the named source file into a fresh engine for this session,
    /// replacing any prior engine
    Init { filename: String },
    /// Replace the search pattern (empty pattern shows all lines)
    Search {
        #[serde(default)]
        pattern: String,
    },
    /// Move the selection by a signed offset (clamped, any magnitude)
    Move {
        #[serde(default)]
        delta: i64,
    },
}

/// Response message sent back for every request, tagged on `status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// The request was applied; `line` is the current selection ("" when
    /// the filtered view is empty)
    Ok { line: String },
    /// The request could not be applied; the session stays usable
    Error { message: String },
}

impl Response {
    pub fn ok(line: impl Into<String>) -> Self {
        Self::Ok { line: line.into() }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// The selected line on success, None on error
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::Ok { line } => Some(line),
            Self::Error { .. } => None,
        }
    }
}
