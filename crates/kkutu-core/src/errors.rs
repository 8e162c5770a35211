//! Error types shared across the sync core.
//!
//! Each collaborator boundary gets its own enum. None of them is ever
//! surfaced to lifecycle-event consumers; the channel that saw the error
//! decides whether to log and continue or to stop.

use thiserror::Error;

use crate::mode::GameMode;

/// Failure reading a fact from the rendered page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The fact could not be read this time (element missing, script
    /// evaluation failed). The observation is discarded.
    #[error("'{fact}' unavailable: {message}")]
    Unavailable {
        /// Fact being read.
        fact: &'static str,
        /// Collaborator message.
        message: String,
    },

    /// The page is gone; no further reads can succeed.
    #[error("page disconnected: {0}")]
    Disconnected(String),
}

impl ScrapeError {
    /// Shorthand for [`ScrapeError::Unavailable`].
    pub fn unavailable(fact: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            fact,
            message: message.into(),
        }
    }

    /// Whether the reading channel should stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Disconnected(_))
    }
}

/// Failure decoding a push payload.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A required attribute is absent.
    #[error("'{message}' message without '{attribute}' attribute")]
    MissingAttribute {
        /// Message type.
        message: String,
        /// Attribute path, e.g. `room.game.seq`.
        attribute: String,
    },

    /// An attribute is present but has the wrong shape.
    #[error("'{message}' message has invalid '{attribute}' attribute: {detail}")]
    InvalidAttribute {
        /// Message type.
        message: String,
        /// Attribute path.
        attribute: String,
        /// What was wrong.
        detail: String,
    },

    /// Payload was not valid JSON.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    /// Shorthand for [`ParseError::MissingAttribute`].
    pub fn missing(message: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            message: message.to_owned(),
            attribute: attribute.to_owned(),
        }
    }
}

/// Logical precondition violation inside the synchronizer.
///
/// These signal an ordering problem upstream rather than a glitch; callers
/// may resynchronize (e.g. wait for the next round-ready) and carry on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    /// A turn started before the round's setup arrived.
    #[error("{mode} turn started before round-ready")]
    RoundNotReady {
        /// Mode whose round setup is missing.
        mode: GameMode,
    },

    /// An operation needs a known identity and none is set.
    #[error("no game session")]
    NoSession,
}

/// Failure registering helpers or filters with the push transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Registration was refused or failed; retried on the next tick.
    #[error("registration failed: {0}")]
    Registration(String),

    /// The transport shut down.
    #[error("transport closed")]
    Closed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
