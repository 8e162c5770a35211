//! Typing-battle transitions.
//!
//! The round-ready message carries the whole word list; turn boundaries
//! only move an index through it.

use kkutu_core::{GameMode, LifecycleEvent, SyncError};
use tracing::trace;

use super::Synchronizer;

impl Synchronizer {
    /// Report the word currently shown on the page. The same word is only
    /// republished once the repeat window has passed.
    pub fn notify_typing_battle_word(&self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        self.locked(|_, out| {
            if !self.caches.typing_word.observe(word, self.typing_word_repeat) {
                return;
            }
            out.push(LifecycleEvent::TypingWordPresented {
                base: self.base(),
                word: word.to_owned(),
            });
        });
    }

    /// Round-ready: new round index and word list.
    pub fn notify_typing_battle_round_change(&self, round: i32, words: Vec<String>) {
        self.notify_round_change(round);
        self.locked(|state, _| {
            trace!(round, words = words.len(), "typing words loaded");
            state.set_typing_words(words);
        });
    }

    /// Turn start: present the first word of the round.
    pub fn notify_typing_battle_turn_start(&self) -> Result<(), SyncError> {
        self.locked(|state, out| {
            let word = state
                .rewind_typing_word()
                .ok_or(SyncError::RoundNotReady {
                    mode: GameMode::TypingBattle,
                })?
                .to_owned();
            self.present_typing_word(word, out);
            Ok(())
        })
    }

    /// Turn end: step to the next word whether or not the turn succeeded.
    pub fn notify_typing_battle_turn_end(&self, ok: bool) {
        self.locked(|state, out| {
            let Some(word) = state.advance_typing_word().map(str::to_owned) else {
                return;
            };
            trace!(ok, index = state.typing_word_index(), "typing word advanced");
            self.present_typing_word(word, out);
        });
    }

    /// Push-channel words always publish and refresh the dedup entry so
    /// the page poller does not repeat them.
    fn present_typing_word(&self, word: String, out: &mut Vec<LifecycleEvent>) {
        self.caches.typing_word.remember(&word);
        out.push(LifecycleEvent::TypingWordPresented {
            base: self.base(),
            word,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use kkutu_core::{GameMode, LifecycleEvent, SyncError};

    use crate::synchronizer::tests::Harness;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| (*w).to_owned()).collect()
    }

    fn presented(h: &Harness) -> Vec<String> {
        h.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::TypingWordPresented { word, .. } => Some(word.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn turn_start_before_round_ready_is_an_error() {
        let h = Harness::gaming(&["me"]);
        assert_eq!(
            h.sync.notify_typing_battle_turn_start(),
            Err(SyncError::RoundNotReady {
                mode: GameMode::TypingBattle
            })
        );
        assert!(presented(&h).is_empty());
    }

    #[test]
    fn words_cycle_through_the_list() {
        let h = Harness::gaming(&["me"]);
        h.sync
            .notify_typing_battle_round_change(1, words(&["사과", "배", "감"]));
        assert_matches!(h.sync.notify_typing_battle_turn_start(), Ok(()));
        h.sync.notify_typing_battle_turn_end(true);
        h.sync.notify_typing_battle_turn_end(false);
        h.sync.notify_typing_battle_turn_end(true);
        assert_eq!(presented(&h), words(&["사과", "배", "감", "사과"]));
        assert_eq!(h.count("round_changed"), 1);
    }

    #[test]
    fn turn_start_rewinds() {
        let h = Harness::gaming(&["me"]);
        h.sync.notify_typing_battle_round_change(1, words(&["사과", "배"]));
        h.sync.notify_typing_battle_turn_start().unwrap();
        h.sync.notify_typing_battle_turn_end(true);
        h.sync.notify_typing_battle_turn_start().unwrap();
        assert_eq!(h.sync.snapshot().typing_word_index(), 0);
        assert_eq!(presented(&h).last().map(String::as_str), Some("사과"));
    }

    #[test]
    fn turn_end_without_list_is_silent() {
        let h = Harness::gaming(&["me"]);
        h.sync.notify_typing_battle_turn_end(true);
        assert!(presented(&h).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn page_word_dedups_within_window() {
        let h = Harness::gaming(&["me"]);
        h.sync.notify_typing_battle_word("사과");
        h.sync.notify_typing_battle_word("사과");
        assert_eq!(presented(&h).len(), 1);

        tokio::time::advance(Duration::from_millis(1001)).await;
        h.sync.notify_typing_battle_word("사과");
        assert_eq!(presented(&h).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn push_word_suppresses_page_echo() {
        let h = Harness::gaming(&["me"]);
        h.sync.notify_typing_battle_round_change(1, words(&["사과"]));
        h.sync.notify_typing_battle_turn_start().unwrap();
        h.sync.notify_typing_battle_word("사과");
        assert_eq!(presented(&h).len(), 1);
    }
}
