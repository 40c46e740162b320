//! Effects validator.
//!
//! The narrator returns prose with at most one fenced JSON block describing
//! what the turn changed. The block is untrusted: every field is optional
//! and type-checked on its own, and a field with the wrong shape is dropped
//! without affecting the others. A missing or unparsable block is a normal
//! "nothing changed" turn, never an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// How a session ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Still in play, or ended without a verdict.
    #[default]
    None,
    /// The party won.
    Win,
    /// The party lost.
    Lose,
}

impl Outcome {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "none" => Some(Self::None),
            "win" => Some(Self::Win),
            "lose" => Some(Self::Lose),
            _ => None,
        }
    }
}

/// A validated, partial state change for one turn.
///
/// `hp`, `mana`, `inventory`, `add_items` and `remove_items` apply to the
/// acting player only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// New party goal.
    pub goal: Option<String>,
    /// Complete replacement quest log.
    pub quest_log: Option<Vec<String>>,
    /// Narrator-declared end of session.
    pub is_over: Option<bool>,
    /// Narrator-declared verdict.
    pub outcome: Option<Outcome>,
    /// Absolute hit points for the acting player.
    pub hp: Option<i32>,
    /// Absolute mana for the acting player.
    pub mana: Option<i32>,
    /// Complete replacement inventory for the acting player.
    pub inventory: Option<Vec<String>>,
    /// Items gained by the acting player.
    pub add_items: Option<Vec<String>>,
    /// Items lost by the acting player.
    pub remove_items: Option<Vec<String>>,
}

impl Effect {
    /// Returns `true` if no field survived validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds an effect from a JSON object, keeping only well-typed fields.
    /// Returns `None` if `value` is not an object.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            goal: field(object, "goal", "goal").and_then(as_text),
            quest_log: field(object, "questLog", "quest_log").and_then(as_text_list),
            is_over: field(object, "isOver", "is_over").and_then(Value::as_bool),
            outcome: field(object, "outcome", "outcome")
                .and_then(Value::as_str)
                .and_then(Outcome::parse),
            hp: field(object, "hp", "hp").and_then(as_int),
            mana: field(object, "mana", "mana").and_then(as_int),
            inventory: field(object, "inventory", "inventory").and_then(as_text_list),
            add_items: field(object, "addItems", "add_items").and_then(as_text_list),
            remove_items: field(object, "removeItems", "remove_items").and_then(as_text_list),
        })
    }
}

fn field<'a>(object: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    object.get(camel).or_else(|| object.get(snake))
}

fn as_text(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

fn as_text_list(value: &Value) -> Option<Vec<String>> {
    let entries = value.as_array()?;
    Some(entries.iter().filter_map(as_text).collect())
}

#[allow(clippy::cast_possible_truncation)]
fn as_int(value: &Value) -> Option<i32> {
    if let Some(int) = value.as_i64() {
        return Some(i32::try_from(int).unwrap_or(if int < 0 { i32::MIN } else { i32::MAX }));
    }
    if value.is_u64() {
        return Some(i32::MAX);
    }
    let float = value.as_f64().filter(|f| f.is_finite())?;
    // `as` saturates at the i32 bounds.
    Some(float.round() as i32)
}

/// Narrator output split into player-facing prose and the validated effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNarration {
    /// Raw output with the effects block removed, trimmed.
    pub narration: String,
    /// Effect carried by the block, if one was present and parsed.
    pub effect: Option<Effect>,
}

/// Location of the first fenced block within a narrator response.
struct FencedBlock<'a> {
    start: usize,
    end: usize,
    body: &'a str,
}

/// Finds the first ```` ```json ```` fence, or failing that the first bare
/// ```` ``` ```` fence. An unterminated fence is not a block.
fn find_block(raw: &str) -> Option<FencedBlock<'_>> {
    let (start, body_start) = match raw.find("```json").or_else(|| raw.find("```JSON")) {
        Some(start) => (start, start + "```json".len()),
        None => {
            let start = raw.find("```")?;
            (start, start + "```".len())
        }
    };
    let body_len = raw[body_start..].find("```")?;
    Some(FencedBlock {
        start,
        end: body_start + body_len + "```".len(),
        body: &raw[body_start..body_start + body_len],
    })
}

/// Parses the JSON object inside a block body, skipping any info string or
/// stray text around the outermost braces.
pub(crate) fn parse_block_json(body: &str) -> Option<Value> {
    let open = body.find('{')?;
    let close = body.rfind('}')?;
    if close < open {
        return None;
    }
    serde_json::from_str(&body[open..=close]).ok()
}

/// Extracts the first JSON object from a fenced block in `raw`, if any.
#[must_use]
pub fn extract_block_json(raw: &str) -> Option<Value> {
    find_block(raw).and_then(|block| parse_block_json(block.body))
}

/// Splits raw narrator output into narration and effect.
///
/// Never fails: a missing block, invalid JSON, or a non-object payload all
/// yield `effect: None`. The block is stripped from the narration whenever
/// it is present, even if its contents did not parse.
#[must_use]
pub fn parse_narration(raw: &str) -> ParsedNarration {
    let Some(block) = find_block(raw) else {
        return ParsedNarration {
            narration: raw.trim().to_owned(),
            effect: None,
        };
    };

    let effect = parse_block_json(block.body).and_then(|value| Effect::from_json(&value));
    if effect.is_none() {
        debug!("narrator effects block did not parse; treating turn as effect-free");
    }

    let before = raw[..block.start].trim();
    let after = raw[block.end..].trim();
    let narration = match (before.is_empty(), after.is_empty()) {
        (false, false) => format!("{before}\n\n{after}"),
        (false, true) => before.to_owned(),
        (true, _) => after.to_owned(),
    };

    ParsedNarration { narration, effect }
}
