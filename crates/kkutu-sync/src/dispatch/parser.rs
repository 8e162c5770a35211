//! Payload decoding.
//!
//! [`PushParser`] turns raw payloads into the typed records of
//! [`kkutu_core::records`]. [`JsonPushParser`] understands the stock
//! server's shapes.

use async_trait::async_trait;
use kkutu_core::records::{
    ClassicTurnEnd, ClassicTurnError, ClassicTurnStart, HunminRoundReady, HunminTurnStart, Room,
    TypingRoundReady, TypingTurnEnd, TypingTurnStart, Welcome,
};
use kkutu_core::{GameMode, ParseError, PlayerId, TurnErrorCode, WordCondition};
use serde_json::Value;

/// Mode codes in the order the server indexes them when it sends a number.
const RULE_KEYS: [&str; 14] = [
    "EKT", "ESH", "KKT", "KSH", "CSQ", "KCW", "KTY", "ETY", "KAP", "HUN", "KDA", "EDA", "KSS",
    "ESS",
];

/// Decodes push payloads per message shape.
#[async_trait]
pub trait PushParser: Send + Sync {
    /// Session greeting.
    async fn welcome(&self, payload: &Value) -> Result<Welcome, ParseError>;
    /// Room snapshot.
    async fn room(&self, payload: &Value) -> Result<Room, ParseError>;
    /// Classic turn start.
    async fn classic_turn_start(&self, payload: &Value) -> Result<ClassicTurnStart, ParseError>;
    /// Classic turn end.
    async fn classic_turn_end(&self, payload: &Value) -> Result<ClassicTurnEnd, ParseError>;
    /// Classic turn error.
    async fn classic_turn_error(&self, payload: &Value) -> Result<ClassicTurnError, ParseError>;
    /// Typing-battle round ready.
    async fn typing_round_ready(&self, payload: &Value) -> Result<TypingRoundReady, ParseError>;
    /// Typing-battle turn start.
    async fn typing_turn_start(&self, payload: &Value) -> Result<TypingTurnStart, ParseError>;
    /// Typing-battle turn end.
    async fn typing_turn_end(&self, payload: &Value) -> Result<TypingTurnEnd, ParseError>;
    /// Hunmin round ready.
    async fn hunmin_round_ready(&self, payload: &Value) -> Result<HunminRoundReady, ParseError>;
    /// Hunmin turn start.
    async fn hunmin_turn_start(&self, payload: &Value) -> Result<HunminTurnStart, ParseError>;
}

/// Parser for the stock server's JSON payloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPushParser;

// ── Field access ────────────────────────────────────────────────────

/// Attribute reader that names the message in its errors.
struct Fields<'a> {
    message: &'static str,
    payload: &'a Value,
}

impl<'a> Fields<'a> {
    fn new(message: &'static str, payload: &'a Value) -> Self {
        Self { message, payload }
    }

    fn get(&self, attribute: &str) -> Option<&'a Value> {
        self.payload.get(attribute).filter(|v| !v.is_null())
    }

    fn require(&self, attribute: &str) -> Result<&'a Value, ParseError> {
        self.get(attribute)
            .ok_or_else(|| ParseError::missing(self.message, attribute))
    }

    fn invalid(&self, attribute: &str, detail: &str) -> ParseError {
        ParseError::InvalidAttribute {
            message: self.message.to_owned(),
            attribute: attribute.to_owned(),
            detail: detail.to_owned(),
        }
    }

    fn int(&self, attribute: &str) -> Result<i64, ParseError> {
        self.require(attribute)?
            .as_i64()
            .ok_or_else(|| self.invalid(attribute, "expected an integer"))
    }

    fn int_or(&self, attribute: &str, default: i64) -> Result<i64, ParseError> {
        match self.get(attribute) {
            Some(_) => self.int(attribute),
            None => Ok(default),
        }
    }

    fn bool(&self, attribute: &str) -> Result<bool, ParseError> {
        self.require(attribute)?
            .as_bool()
            .ok_or_else(|| self.invalid(attribute, "expected a boolean"))
    }

    fn bool_or(&self, attribute: &str, default: bool) -> Result<bool, ParseError> {
        match self.get(attribute) {
            Some(_) => self.bool(attribute),
            None => Ok(default),
        }
    }

    fn text_or(&self, attribute: &str, default: &'a str) -> Result<&'a str, ParseError> {
        match self.get(attribute) {
            Some(_) => self.text(attribute),
            None => Ok(default),
        }
    }

    fn text(&self, attribute: &str) -> Result<&'a str, ParseError> {
        self.require(attribute)?
            .as_str()
            .ok_or_else(|| self.invalid(attribute, "expected a string"))
    }

    /// Optional string; numbers are accepted and stringified.
    fn opt_string(&self, attribute: &str) -> Option<String> {
        self.get(attribute).and_then(scalar_string)
    }

    fn round(&self) -> Result<i32, ParseError> {
        i32::try_from(self.int("round")?).map_err(|_| self.invalid("round", "out of range"))
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Player entries are either bare ids or objects carrying an `id`.
fn player_id(value: &Value) -> Option<PlayerId> {
    scalar_string(value)
        .or_else(|| value.get("id").and_then(scalar_string))
        .map(PlayerId::from_string)
}

fn player_list(
    fields: &Fields<'_>,
    value: &Value,
    attribute: &str,
) -> Result<Vec<PlayerId>, ParseError> {
    value
        .as_array()
        .ok_or_else(|| fields.invalid(attribute, "expected an array"))?
        .iter()
        .map(|entry| {
            player_id(entry).ok_or_else(|| fields.invalid(attribute, "entry without id"))
        })
        .collect()
}

fn decode_mode_code(value: &Value) -> Option<String> {
    match value {
        Value::String(code) => Some(code.clone()),
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| RULE_KEYS.get(usize::try_from(i).ok()?))
            .map(|code| (*code).to_owned()),
        _ => None,
    }
}

/// Free modes start turns without a `char`; that decodes as an empty
/// condition.
fn turn_condition(fields: &Fields<'_>) -> Result<WordCondition, ParseError> {
    let mut condition = WordCondition::new(fields.text_or("char", "")?);
    if let Some(sub) = fields.opt_string("subChar") {
        condition = condition.with_sub_char(sub);
    }
    if let Some(mission) = fields.opt_string("mission") {
        condition = condition.with_mission_char(mission);
    }
    if let Some(length) = fields.get("wordLength").and_then(Value::as_u64) {
        condition = condition.with_word_length(usize::try_from(length).unwrap_or(usize::MAX));
    }
    Ok(condition)
}

#[async_trait]
impl PushParser for JsonPushParser {
    async fn welcome(&self, payload: &Value) -> Result<Welcome, ParseError> {
        let fields = Fields::new("welcome", payload);
        Ok(Welcome {
            user_id: fields.get("id").and_then(player_id),
        })
    }

    async fn room(&self, payload: &Value) -> Result<Room, ParseError> {
        let outer = Fields::new("room", payload);
        let room = Fields::new("room", outer.require("room")?);

        let mode_code = room
            .get("mode")
            .and_then(decode_mode_code)
            .unwrap_or_default();
        let players = match room.get("players") {
            Some(list) => player_list(&room, list, "players")?,
            None => Vec::new(),
        };
        let gaming = room.get("gaming").and_then(Value::as_bool).unwrap_or(false);
        let game_sequence = match room.get("game").and_then(|g| g.get("seq")) {
            Some(seq) if !seq.is_null() => player_list(&room, seq, "game.seq")?,
            _ => Vec::new(),
        };

        Ok(Room {
            mode: GameMode::from_room_code(&mode_code),
            mode_code,
            players,
            gaming,
            game_sequence,
        })
    }

    async fn classic_turn_start(&self, payload: &Value) -> Result<ClassicTurnStart, ParseError> {
        let fields = Fields::new("turnStart", payload);
        Ok(ClassicTurnStart {
            turn: fields.int("turn")?,
            round_time: fields.int_or("roundTime", 0)?,
            turn_time: fields.int_or("turnTime", 0)?,
            condition: turn_condition(&fields)?,
        })
    }

    async fn classic_turn_end(&self, payload: &Value) -> Result<ClassicTurnEnd, ParseError> {
        let fields = Fields::new("turnEnd", payload);
        Ok(ClassicTurnEnd {
            ok: fields.bool("ok")?,
            value: fields.opt_string("value"),
            hint: fields
                .get("hint")
                .and_then(|hint| hint.get("_id"))
                .and_then(scalar_string),
        })
    }

    async fn classic_turn_error(&self, payload: &Value) -> Result<ClassicTurnError, ParseError> {
        let fields = Fields::new("turnError", payload);
        Ok(ClassicTurnError {
            code: TurnErrorCode::from_code(fields.int("code")?),
            value: fields.opt_string("value"),
        })
    }

    async fn typing_round_ready(&self, payload: &Value) -> Result<TypingRoundReady, ParseError> {
        let fields = Fields::new("roundReady", payload);
        let words = fields
            .require("list")?
            .as_array()
            .ok_or_else(|| fields.invalid("list", "expected an array"))?
            .iter()
            .filter_map(scalar_string)
            .collect();
        Ok(TypingRoundReady {
            round: fields.round()?,
            words,
        })
    }

    async fn typing_turn_start(&self, payload: &Value) -> Result<TypingTurnStart, ParseError> {
        let fields = Fields::new("turnStart", payload);
        Ok(TypingTurnStart {
            round_time: fields.int("roundTime")?,
        })
    }

    async fn typing_turn_end(&self, payload: &Value) -> Result<TypingTurnEnd, ParseError> {
        let fields = Fields::new("turnEnd", payload);
        Ok(TypingTurnEnd {
            ok: fields.bool_or("ok", false)?,
        })
    }

    async fn hunmin_round_ready(&self, payload: &Value) -> Result<HunminRoundReady, ParseError> {
        let fields = Fields::new("roundReady", payload);
        let mut condition = WordCondition::new(fields.text("theme")?);
        if let Some(mission) = fields.opt_string("mission") {
            condition = condition.with_mission_char(mission);
        }
        Ok(HunminRoundReady {
            round: fields.round()?,
            condition,
        })
    }

    async fn hunmin_turn_start(&self, payload: &Value) -> Result<HunminTurnStart, ParseError> {
        let fields = Fields::new("turnStart", payload);
        Ok(HunminTurnStart {
            turn: fields.int("turn")?,
            round_time: fields.int_or("roundTime", 0)?,
            turn_time: fields.int_or("turnTime", 0)?,
            mission_char: fields.opt_string("mission").unwrap_or_default(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
