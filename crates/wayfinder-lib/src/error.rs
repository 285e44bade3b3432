use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Convenient result alias for the wayfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used by callers that map errors onto a transport
/// (HTTP status codes, CLI exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something that cannot be answered as posed.
    InvalidRequest,
    /// The request was valid but the building has no answer for it.
    NotFound,
    /// Broken data or an internal inconsistency.
    Internal,
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A floor the caller asked for lacks a required group, or the group
    /// could not be interpreted.
    #[error("malformed geometry on floor {floor}: {reason}")]
    MalformedGeometry { floor: String, reason: String },

    /// A walkable segment endpoint did not resolve to any door or
    /// intersection. Extraction recovers from this locally; the variant exists
    /// so reports and logs can name it.
    #[error("segment {line_id} on floor {floor} does not touch a door or intersection")]
    GeometryMismatch { floor: String, line_id: String },

    /// Raised when a room id is not present in the building.
    #[error("unknown room: {id}{}", format_suggestions(.suggestions))]
    UnknownRoom {
        id: String,
        suggestions: Vec<String>,
    },

    /// Raised when a floor id is not present in the building.
    #[error("unknown floor: {floor}")]
    UnknownFloor { floor: String },

    /// Raised when a room exists but has no doors to route through.
    #[error("room {room} has no doors and cannot be routed")]
    RoomUnroutable { room: String },

    /// Raised when no door pair between two rooms is connected.
    #[error("no route found between {from} and {to}")]
    NoRouteFound { from: String, to: String },

    /// Raised when a caller asks for zero routes.
    #[error("route count must be at least 1, got {k}")]
    InvalidRouteCount { k: usize },

    /// Raised when the k-shortest-path enumeration exceeds its deadline.
    #[error("route search exceeded its deadline after {elapsed:?}")]
    SearchTimedOut { elapsed: Duration },

    /// Internal inconsistency between extraction and graph assembly.
    #[error("graph assembly failed: {reason}")]
    GraphAssemblyError { reason: String },

    /// The floor-plan document is not well-formed.
    #[error("failed to parse floor plan: {message}")]
    FloorPlanParse { message: String },

    /// Raised when serializing a graph snapshot fails.
    #[error("failed to serialize graph snapshot: {message}")]
    SnapshotSerialize { message: String },

    /// Raised when loading a graph snapshot from a file fails.
    #[error("failed to load graph snapshot from {path}: {message}")]
    SnapshotLoad { path: PathBuf, message: String },

    /// Raised when deserializing a graph snapshot from bytes fails.
    #[error("failed to deserialize graph snapshot: {message}")]
    SnapshotDeserialize { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify the error for transport mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownRoom { .. }
            | Error::UnknownFloor { .. }
            | Error::RoomUnroutable { .. }
            | Error::InvalidRouteCount { .. } => ErrorKind::InvalidRequest,
            Error::NoRouteFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    pub(crate) fn malformed(floor: &str, reason: impl Into<String>) -> Self {
        Error::MalformedGeometry {
            floor: floor.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn assembly(reason: impl Into<String>) -> Self {
        Error::GraphAssemblyError {
            reason: reason.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
