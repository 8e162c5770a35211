//! Page-scraping collaborator.

use async_trait::async_trait;
use kkutu_core::{GameMode, PlayerId, ScrapeError};

/// Async getters over the rendered game page.
///
/// Every getter reads one fact. "Undeterminable" is expressed as `None`,
/// an empty collection, a negative round, or [`GameMode::None`] rather
/// than an error; errors are reserved for reads that failed outright.
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Install page-side helper scripts. Called every primary tick and
    /// must be idempotent.
    async fn register_helpers(&self) -> Result<(), ScrapeError> {
        Ok(())
    }

    /// My player id.
    async fn user_id(&self) -> Result<Option<String>, ScrapeError>;

    /// Turn order of the running game, empty when no game is running.
    async fn game_sequence(&self) -> Result<Vec<PlayerId>, ScrapeError>;

    /// Current round, `<= 0` when not known.
    async fn round_index(&self) -> Result<i32, ScrapeError>;

    /// Text of the condition display (`"가"`, `"력(역)"`, or the last word).
    async fn presented_word(&self) -> Result<String, ScrapeError>;

    /// Mission character, if the room shows one.
    async fn mission_char(&self) -> Result<Option<String>, ScrapeError>;

    /// Word length shown by the alternating-length mode.
    async fn word_length(&self) -> Result<Option<usize>, ScrapeError> {
        Ok(None)
    }

    /// Rejection banner, e.g. `"한방 단어: 늪"`.
    async fn unsupported_word(&self) -> Result<Option<String>, ScrapeError>;

    /// Example word revealed after a turn.
    async fn example_word(&self) -> Result<Option<String>, ScrapeError>;

    /// Mode shown in the room header.
    async fn game_mode(&self) -> Result<GameMode, ScrapeError>;

    /// The page highlights my input box.
    async fn is_my_turn(&self) -> Result<bool, ScrapeError>;

    /// Seat whose turn the page highlights.
    async fn turn_seat(&self) -> Result<Option<usize>, ScrapeError>;

    /// Every word in the history panel, newest first.
    async fn word_histories(&self) -> Result<Vec<String>, ScrapeError>;

    /// Typing-battle prompt text.
    async fn typing_word(&self) -> Result<Option<String>, ScrapeError>;

    /// Seconds left in the turn.
    async fn turn_time(&self) -> Result<Option<f64>, ScrapeError>;

    /// Seconds left in the round.
    async fn round_time(&self) -> Result<Option<f64>, ScrapeError>;
}
