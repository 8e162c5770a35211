//! Word conditions.
//!
//! A [`WordCondition`] is what the next submitted word has to satisfy: a
//! head character, an optional alternate spelling (initial-sound law), an
//! optional mission character, and for the three/two alternation mode the
//! required word length.

use serde::{Deserialize, Serialize};

use crate::mode::GameMode;

/// Default required word length for the alternation mode.
pub const DEFAULT_WORD_LENGTH: usize = 3;

/// Constraint on the next word.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCondition {
    /// Required head character(s). Empty means "no condition".
    pub char: String,
    /// Alternate spelling of `char`, empty when none.
    #[serde(default)]
    pub sub_char: String,
    /// Bonus character, empty when none.
    #[serde(default)]
    pub mission_char: String,
    /// Required length; only meaningful for the alternation mode.
    #[serde(default = "default_word_length")]
    pub word_length: usize,
}

fn default_word_length() -> usize {
    DEFAULT_WORD_LENGTH
}

impl Default for WordCondition {
    fn default() -> Self {
        Self::empty()
    }
}

impl WordCondition {
    /// Condition with only a head character.
    pub fn new(char: impl Into<String>) -> Self {
        Self {
            char: char.into(),
            ..Self::empty()
        }
    }

    /// The "no condition" value.
    pub fn empty() -> Self {
        Self {
            char: String::new(),
            sub_char: String::new(),
            mission_char: String::new(),
            word_length: DEFAULT_WORD_LENGTH,
        }
    }

    /// Builder: alternate spelling.
    #[must_use]
    pub fn with_sub_char(mut self, sub_char: impl Into<String>) -> Self {
        self.sub_char = sub_char.into();
        self
    }

    /// Builder: mission character.
    #[must_use]
    pub fn with_mission_char(mut self, mission_char: impl Into<String>) -> Self {
        self.mission_char = mission_char.into();
        self
    }

    /// Builder: required word length.
    #[must_use]
    pub fn with_word_length(mut self, word_length: usize) -> Self {
        self.word_length = word_length;
        self
    }

    /// No head character.
    pub fn is_empty(&self) -> bool {
        self.char.is_empty()
    }

    /// Same head, alternate and mission characters, ignoring case.
    ///
    /// Used to decide whether an answer computed for one condition is still
    /// valid for another.
    pub fn is_similar(&self, other: &Self) -> bool {
        eq_ignore_case(&self.char, &other.char)
            && eq_ignore_case(&self.sub_char, &other.sub_char)
            && eq_ignore_case(&self.mission_char, &other.mission_char)
    }

    /// Parse the condition text shown on the page.
    ///
    /// Accepts `<X>` (brackets trimmed), `X(Y)` (head plus alternate), a
    /// single character, or a whole previous word from which the chain node
    /// is derived for `mode`. `displayed_length` is the length the page
    /// reports for the alternation mode. Free modes and unparseable text
    /// yield [`WordCondition::empty`].
    pub fn from_presented(
        text: &str,
        mission_char: Option<&str>,
        mode: GameMode,
        displayed_length: Option<usize>,
    ) -> Self {
        if text.is_empty() || mode.is_free() {
            return Self::empty();
        }
        let mission = mission_char.unwrap_or_default();
        let text = text.trim_start_matches('<').trim_end_matches('>');
        let alternation_length = if mode == GameMode::KungKungTta {
            displayed_length.unwrap_or(DEFAULT_WORD_LENGTH)
        } else {
            DEFAULT_WORD_LENGTH
        };

        if let Some(open) = text.find('(').filter(|_| text.ends_with(')')) {
            let head = &text[..open];
            let sub = &text[open + 1..text.len() - 1];
            return Self::new(head)
                .with_sub_char(sub)
                .with_mission_char(mission)
                .with_word_length(alternation_length);
        }

        // Initial-consonant pairs are the condition as shown.
        if text.chars().count() <= 1 || mode == GameMode::Hunmin {
            return Self::new(text).with_mission_char(mission);
        }

        // A whole word: the page is still showing the previous answer.
        match mode.condition_node(text) {
            Some(node) => {
                let word_length = match (mode, alternation_length) {
                    (GameMode::KungKungTta, 3) => 2,
                    (GameMode::KungKungTta, _) => 3,
                    _ => DEFAULT_WORD_LENGTH,
                };
                Self::new(node)
                    .with_mission_char(mission)
                    .with_word_length(word_length)
            }
            None => {
                tracing::debug!(text, %mode, "presented word carries no chain node");
                Self::empty()
            }
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl std::fmt::Display for WordCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.char)?;
        if !self.sub_char.is_empty() {
            write!(f, "({})", self.sub_char)?;
        }
        if !self.mission_char.is_empty() {
            write!(f, " [{}]", self.mission_char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_condition() {
        assert!(WordCondition::empty().is_empty());
        assert!(WordCondition::default().is_empty());
        assert!(!WordCondition::new("가").is_empty());
    }

    #[test]
    fn similarity_ignores_case_and_length() {
        let a = WordCondition::new("A").with_mission_char("x");
        let b = WordCondition::new("a").with_mission_char("X").with_word_length(2);
        assert!(a.is_similar(&b));
        assert!(!a.is_similar(&WordCondition::new("a")));
        assert!(!a.is_similar(&WordCondition::new("b").with_mission_char("x")));
    }

    #[test]
    fn presented_with_alternate() {
        let c = WordCondition::from_presented("력(역)", Some("가"), GameMode::LastAndFirst, None);
        assert_eq!(c.char, "력");
        assert_eq!(c.sub_char, "역");
        assert_eq!(c.mission_char, "가");
    }

    #[test]
    fn presented_brackets_are_trimmed() {
        let c = WordCondition::from_presented("<ㄱㄴ>", None, GameMode::Hunmin, None);
        assert_eq!(c.char, "ㄱㄴ");
        let single = WordCondition::from_presented("<가>", None, GameMode::Hunmin, None);
        assert_eq!(single.char, "가");
    }

    #[test]
    fn presented_single_char() {
        let c = WordCondition::from_presented("가", None, GameMode::LastAndFirst, None);
        assert_eq!(c, WordCondition::new("가"));
    }

    #[test]
    fn presented_whole_word_uses_chain_node() {
        let c = WordCondition::from_presented("사과", None, GameMode::LastAndFirst, None);
        assert_eq!(c.char, "과");
        let c = WordCondition::from_presented("사과", None, GameMode::FirstAndLast, None);
        assert_eq!(c.char, "사");
    }

    #[test]
    fn presented_whole_word_without_mode_is_empty() {
        assert!(WordCondition::from_presented("사과", None, GameMode::None, None).is_empty());
    }

    #[test]
    fn free_modes_have_no_condition() {
        assert!(WordCondition::from_presented("가", None, GameMode::Free, None).is_empty());
        assert!(WordCondition::from_presented("", None, GameMode::LastAndFirst, None).is_empty());
    }

    #[test]
    fn alternation_mode_flips_length() {
        let c = WordCondition::from_presented("기러기", None, GameMode::KungKungTta, Some(3));
        assert_eq!(c.word_length, 2);
        let c = WordCondition::from_presented("기차", None, GameMode::KungKungTta, Some(2));
        assert_eq!(c.word_length, 3);
        let c = WordCondition::from_presented("가(까)", None, GameMode::KungKungTta, Some(2));
        assert_eq!(c.word_length, 2);
    }

    #[test]
    fn display_includes_alternate_and_mission() {
        let c = WordCondition::new("력").with_sub_char("역").with_mission_char("가");
        assert_eq!(c.to_string(), "력(역) [가]");
    }
}
