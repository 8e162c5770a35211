//! Game rule variants.
//!
//! A [`GameMode`] is the rule the room is playing under. Push-message shapes
//! only differ between three [`ImplMode`] families, so routing keys off the
//! family while condition extraction keys off the concrete mode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule variant reported by the room.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Mode not known yet.
    #[default]
    None,
    /// Next word starts with the previous word's last character.
    LastAndFirst,
    /// Next word ends with the previous word's first character.
    FirstAndLast,
    /// Next word starts with the previous word's middle character.
    MiddleAndFirst,
    /// Next word starts with the previous word's trailing syllables.
    Kkutu,
    /// Three/two-letter alternation chain.
    KungKungTta,
    /// Any word, no chaining.
    Free,
    /// Last-and-first chain with free word choice.
    LastAndFirstFree,
    /// Rule rotates between chain variants; turns still carry a condition.
    All,
    /// Korean-dictionary rotation; turns still carry a condition.
    AllKorean,
    /// English-dictionary rotation; turns still carry a condition.
    AllEnglish,
    /// Race to type a shared word list.
    TypingBattle,
    /// Initial-consonant quiz.
    Hunmin,
}

/// Push-message shape family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImplMode {
    /// Turn-based chains, including the all/free variants.
    Classic,
    /// Typing battle.
    TypingBattle,
    /// Hunmin.
    Hunmin,
}

impl GameMode {
    /// Message-shape family. An unknown mode is treated as classic.
    pub fn impl_mode(self) -> ImplMode {
        match self {
            Self::TypingBattle => ImplMode::TypingBattle,
            Self::Hunmin => ImplMode::Hunmin,
            _ => ImplMode::Classic,
        }
    }

    /// Free-chain modes where a turn may legitimately carry no condition.
    pub fn is_free(self) -> bool {
        matches!(self, Self::Free | Self::LastAndFirstFree)
    }

    /// Map a room mode code (`KSH`, `ETY`, ...) to a mode.
    pub fn from_room_code(code: &str) -> Self {
        match code {
            "ESH" | "KSH" => Self::LastAndFirst,
            "KGT" => Self::MiddleAndFirst,
            "EAP" | "KAP" => Self::FirstAndLast,
            "EKT" | "KMT" => Self::Kkutu,
            "KKT" => Self::KungKungTta,
            "EAW" | "KAW" => Self::Free,
            "EJH" | "KJH" => Self::LastAndFirstFree,
            "ETY" | "KTY" => Self::TypingBattle,
            "KEA" => Self::All,
            "KAD" => Self::AllKorean,
            "EAD" => Self::AllEnglish,
            "HUN" => Self::Hunmin,
            _ => Self::None,
        }
    }

    /// Character(s) of `word` the next word must chain from.
    ///
    /// Returns `None` for modes without chaining or when the word is too
    /// short to carry a node (middle-and-first needs an odd length over 2).
    pub fn condition_node(self, word: &str) -> Option<String> {
        let chars: Vec<char> = word.chars().collect();
        let len = chars.len();
        if len == 0 {
            return None;
        }
        match self {
            Self::LastAndFirst | Self::KungKungTta | Self::LastAndFirstFree => {
                Some(chars[len - 1].to_string())
            }
            Self::FirstAndLast => Some(chars[0].to_string()),
            Self::MiddleAndFirst => {
                (len > 2 && len % 2 == 1).then(|| chars[(len - 1) / 2].to_string())
            }
            Self::Kkutu => {
                let take = if len >= 4 { 2 } else { 1 };
                Some(chars[len - take..].iter().collect())
            }
            _ => None,
        }
    }

    /// Stable lowercase name used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LastAndFirst => "last_and_first",
            Self::FirstAndLast => "first_and_last",
            Self::MiddleAndFirst => "middle_and_first",
            Self::Kkutu => "kkutu",
            Self::KungKungTta => "kung_kung_tta",
            Self::Free => "free",
            Self::LastAndFirstFree => "last_and_first_free",
            Self::All => "all",
            Self::AllKorean => "all_korean",
            Self::AllEnglish => "all_english",
            Self::TypingBattle => "typing_battle",
            Self::Hunmin => "hunmin",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ImplMode {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::TypingBattle => "typing_battle",
            Self::Hunmin => "hunmin",
        }
    }
}

impl fmt::Display for ImplMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
