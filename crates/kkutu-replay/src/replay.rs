//! Line-by-line replay.

use std::io::BufRead;

use anyhow::{Context, Result};
use kkutu_sync::{EventChannel, PushMessage};
use tracing::warn;

/// Outcome counts of one replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Messages routed to a handler.
    pub routed: usize,
    /// Messages whose type is not routed in the mode at the time.
    pub dropped: usize,
    /// Messages whose handler failed.
    pub failed: usize,
    /// Lines that are not a push message.
    pub malformed: usize,
}

/// Process every line of `input` in order, inline, so the capture's order
/// is the order the synchronizer sees.
pub async fn replay(input: impl BufRead, channel: &EventChannel) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let message: PushMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(err) => {
                warn!(line = line_no, error = %err, "skipping malformed line");
                stats.malformed += 1;
                continue;
            }
        };
        match channel.process(&message).await {
            Ok(Some(_)) => stats.routed += 1,
            Ok(None) => stats.dropped += 1,
            Err(err) => {
                warn!(line = line_no, kind = %message.kind, error = %err, "message failed");
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::sync::Arc;

    use kkutu_core::LifecycleEvent;
    use kkutu_sync::{JsonPushParser, MessageTypes, SyncContext, Synchronizer};

    const CAPTURE: &str = r#"
{"type": "welcome", "payload": {"id": "me"}}
{"type": "room", "payload": {"room": {"mode": "KSH", "gaming": true, "game": {"seq": ["a", "me"]}}}}
{"type": "turnStart", "payload": {"turn": 0, "char": "가"}}
{"type": "chat", "payload": {"value": "hi"}}
not json
{"type": "turnEnd", "payload": {"value": "가나"}}
{"type": "turnEnd", "payload": {"ok": true, "value": "가나"}}
"#;

    fn channel(ctx: &SyncContext) -> EventChannel {
        EventChannel::new(
            Arc::new(Synchronizer::new(ctx)),
            Arc::new(JsonPushParser),
            &MessageTypes::default(),
        )
    }

    #[tokio::test]
    async fn counts_every_outcome() {
        let ctx = SyncContext::default();
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _sub = ctx.bus.subscribe(move |e: &LifecycleEvent| {
            sink.lock().unwrap().push(e.event_type());
        });

        let stats = replay(Cursor::new(CAPTURE), &channel(&ctx)).await.unwrap();
        assert_eq!(
            stats,
            ReplayStats {
                routed: 4,
                dropped: 1,
                failed: 1,
                malformed: 1,
            }
        );
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "session_changed",
                "game_started",
                "game_mode_changed",
                "turn_started",
                "turn_ended",
                "word_history_discovered",
            ]
        );
    }

    #[tokio::test]
    async fn reads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "welcome", "payload": {{"id": "me"}}}}"#).unwrap();
        let reader = std::io::BufReader::new(std::fs::File::open(file.path()).unwrap());

        let ctx = SyncContext::default();
        let stats = replay(reader, &channel(&ctx)).await.unwrap();
        assert_eq!(stats.routed, 1);
    }
}
