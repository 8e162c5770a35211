//! Channel-local error types.

use kkutu_core::{ParseError, ScrapeError, SyncError, TransportError};
use thiserror::Error;

/// Failure inside one poller iteration.
#[derive(Debug, Error)]
pub enum PollError {
    /// Reading from the page failed.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    /// The synchronizer refused the fact.
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// Registering helpers or filters failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl PollError {
    /// Whether the poller should stop instead of retrying next tick.
    ///
    /// Only a disconnected page is fatal. Ordering faults are reported and
    /// the poller carries on so the next round can resynchronize it.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Scrape(err) => err.is_fatal(),
            Self::Sync(_) | Self::Transport(_) => false,
        }
    }
}

/// Failure handling one push message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The payload could not be decoded.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The synchronizer refused the fact.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use kkutu_core::GameMode;

    #[test]
    fn fatality() {
        assert!(PollError::from(ScrapeError::Disconnected("gone".into())).is_fatal());
        assert!(!PollError::from(ScrapeError::unavailable("round", "missing")).is_fatal());
        assert!(!PollError::from(SyncError::RoundNotReady { mode: GameMode::Hunmin }).is_fatal());
        assert!(!PollError::from(TransportError::Closed).is_fatal());
    }

    #[test]
    fn messages_pass_through() {
        let err = DispatchError::from(kkutu_core::ParseError::missing("turnEnd", "ok"));
        assert_eq!(err.to_string(), "'turnEnd' message without 'ok' attribute");
    }
}
