//! Typed push-message records and turn-error codes.
//!
//! These are the decoded forms of the server's push messages, one struct
//! per message shape per mode family. Decoding itself lives with the push
//! parser; these types only carry the data.

use serde::{Deserialize, Serialize};

use crate::condition::WordCondition;
use crate::ids::PlayerId;
use crate::mode::GameMode;

// ─────────────────────────────────────────────────────────────────────────────
// Turn errors
// ─────────────────────────────────────────────────────────────────────────────

/// Why a submitted word was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnErrorCode {
    /// End-word played on the first turn of a round.
    NoEndWordOnBegin,
    /// End-word (no continuation exists).
    EndWord,
    /// Not in the dictionary.
    NotFound,
    /// Loanword not allowed in this room.
    Loanword,
    /// Rejected by strict rules.
    Strict,
    /// Outside the room's subject.
    WrongSubject,
    /// Already played this game.
    AlreadyUsed,
    /// A code this core does not know.
    Other(i64),
}

impl TurnErrorCode {
    /// Decode a server error code.
    pub fn from_code(code: i64) -> Self {
        match code {
            402 => Self::NoEndWordOnBegin,
            403 => Self::EndWord,
            404 => Self::NotFound,
            405 => Self::Loanword,
            406 => Self::Strict,
            407 => Self::WrongSubject,
            409 => Self::AlreadyUsed,
            other => Self::Other(other),
        }
    }

    /// Server error code.
    pub fn code(self) -> i64 {
        match self {
            Self::NoEndWordOnBegin => 402,
            Self::EndWord => 403,
            Self::NotFound => 404,
            Self::Loanword => 405,
            Self::Strict => 406,
            Self::WrongSubject => 407,
            Self::AlreadyUsed => 409,
            Self::Other(code) => code,
        }
    }

    /// Classify the rejection banner the page shows, e.g. `"한방 단어: 늪"`.
    ///
    /// Only the part before `':'` is inspected. Text without a reason
    /// prefix means the word is not in the dictionary.
    pub fn from_page_text(text: &str) -> Self {
        let Some((reason, _)) = text.split_once(':') else {
            return Self::NotFound;
        };
        if reason.contains("한방") {
            if reason.contains("첫 턴") {
                Self::NoEndWordOnBegin
            } else {
                Self::EndWord
            }
        } else if reason.contains("외래") {
            Self::Loanword
        } else if reason.contains('깐') {
            Self::Strict
        } else if reason.contains("주제") {
            Self::WrongSubject
        } else if reason.contains("이미") {
            Self::AlreadyUsed
        } else {
            Self::NotFound
        }
    }

    /// The word exists in the dictionary but was refused for another reason.
    pub fn is_existing_word(self) -> bool {
        self != Self::NotFound
    }

    /// The word was refused for being an end-word.
    pub fn is_end_word(self) -> bool {
        matches!(self, Self::NoEndWordOnBegin | Self::EndWord)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Base records (any mode)
// ─────────────────────────────────────────────────────────────────────────────

/// Session greeting carrying my identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    /// My player id, when the server sent one.
    pub user_id: Option<PlayerId>,
}

/// Room snapshot: roster, mode and game sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Raw room mode code (`KSH`, `ETY`, ...).
    pub mode_code: String,
    /// Mode decoded from `mode_code`.
    pub mode: GameMode,
    /// Everyone in the room.
    pub players: Vec<PlayerId>,
    /// A game is running in the room.
    pub gaming: bool,
    /// Turn order of the running game.
    pub game_sequence: Vec<PlayerId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Classic family
// ─────────────────────────────────────────────────────────────────────────────

/// Classic turn start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassicTurnStart {
    /// Absolute turn index.
    pub turn: i64,
    /// Remaining round time, ms.
    pub round_time: i64,
    /// Turn time limit, ms.
    pub turn_time: i64,
    /// Condition for this turn.
    pub condition: WordCondition,
}

/// Classic turn end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassicTurnEnd {
    /// The turn ended with an accepted word.
    pub ok: bool,
    /// Accepted word.
    pub value: Option<String>,
    /// Example word shown when nobody answered.
    pub hint: Option<String>,
}

/// Classic turn error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassicTurnError {
    /// Rejection reason.
    pub code: TurnErrorCode,
    /// Rejected word.
    pub value: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Typing battle
// ─────────────────────────────────────────────────────────────────────────────

/// Typing-battle round ready with the round's word list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingRoundReady {
    /// Round number.
    pub round: i32,
    /// Words to type, in order.
    pub words: Vec<String>,
}

/// Typing-battle turn start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingTurnStart {
    /// Remaining round time, ms.
    pub round_time: i64,
}

/// Typing-battle turn end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingTurnEnd {
    /// The typed word was accepted.
    pub ok: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Hunmin
// ─────────────────────────────────────────────────────────────────────────────

/// Hunmin round ready with the round's base condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunminRoundReady {
    /// Round number.
    pub round: i32,
    /// Base condition (theme consonants) for every turn of the round.
    pub condition: WordCondition,
}

/// Hunmin turn start; carries only the mission character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunminTurnStart {
    /// Absolute turn index.
    pub turn: i64,
    /// Remaining round time, ms.
    pub round_time: i64,
    /// Turn time limit, ms.
    pub turn_time: i64,
    /// Mission character for this turn.
    pub mission_char: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(TurnErrorCode::from_code(402), TurnErrorCode::NoEndWordOnBegin);
        assert_eq!(TurnErrorCode::from_code(403), TurnErrorCode::EndWord);
        assert_eq!(TurnErrorCode::from_code(404), TurnErrorCode::NotFound);
        assert_eq!(TurnErrorCode::from_code(409), TurnErrorCode::AlreadyUsed);
        assert_eq!(TurnErrorCode::from_code(500), TurnErrorCode::Other(500));
        assert_eq!(TurnErrorCode::Other(500).code(), 500);
        assert_eq!(TurnErrorCode::WrongSubject.code(), 407);
    }

    #[test]
    fn page_text_classification() {
        assert_eq!(TurnErrorCode::from_page_text("늪"), TurnErrorCode::NotFound);
        assert_eq!(TurnErrorCode::from_page_text("한방 단어: 늪"), TurnErrorCode::EndWord);
        assert_eq!(
            TurnErrorCode::from_page_text("첫 턴 한방 금지: 늪"),
            TurnErrorCode::NoEndWordOnBegin
        );
        assert_eq!(TurnErrorCode::from_page_text("외래어: 컴퓨터"), TurnErrorCode::Loanword);
        assert_eq!(TurnErrorCode::from_page_text("깐깐!: 사과"), TurnErrorCode::Strict);
        assert_eq!(TurnErrorCode::from_page_text("다른 주제: 사과"), TurnErrorCode::WrongSubject);
        assert_eq!(TurnErrorCode::from_page_text("이미 사용된 단어: 사과"), TurnErrorCode::AlreadyUsed);
        assert_eq!(TurnErrorCode::from_page_text("무언가: 사과"), TurnErrorCode::NotFound);
    }

    #[test]
    fn existing_and_end_word_flags() {
        assert!(!TurnErrorCode::NotFound.is_existing_word());
        assert!(TurnErrorCode::AlreadyUsed.is_existing_word());
        assert!(TurnErrorCode::EndWord.is_end_word());
        assert!(TurnErrorCode::NoEndWordOnBegin.is_end_word());
        assert!(!TurnErrorCode::Loanword.is_end_word());
    }
}
