//! Turn context handed to the narrator, and the prompts rendered from it.

use sagaforge_character::Player;
use sagaforge_rules::DiceRoll;
use sagaforge_world::World;
use serde::{Deserialize, Serialize};

use super::outline::StoryOutline;
use super::transcript::{Message, Speaker};

/// Number of transcript lines included in a narrator prompt.
pub const RECENT_MESSAGE_WINDOW: usize = 12;

/// Everything the narrator needs to resolve one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    /// Setting of the session.
    pub world: Option<World>,
    /// The whole party, as of the start of the turn.
    pub party: Vec<Player>,
    /// Story skeleton, if one was generated.
    pub outline: Option<StoryOutline>,
    /// Current party goal.
    pub goal: Option<String>,
    /// Current quest log.
    pub quest_log: Vec<String>,
    /// Tail of the transcript, oldest first.
    pub recent_messages: Vec<Message>,
    /// Index of the acting player in `party`.
    pub acting_index: usize,
    /// What the acting player does. Empty for the intro turn.
    pub action: String,
    /// Dice result; absent for the intro turn.
    pub roll: Option<DiceRoll>,
    /// `true` for the session-opening turn.
    pub is_intro: bool,
}

/// A rendered request for a chat-style text generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationPrompt {
    /// System role: tone, length and output-format rules.
    pub system: String,
    /// User message: world, party, outline, transcript and action.
    pub user: String,
}

const EFFECTS_FORMAT: &str = "After the narration, append exactly one ```json fenced block \
describing what changed this turn. Allowed keys: \"goal\" (string), \"questLog\" (the complete \
updated list of strings), \"isOver\" (bool), \"outcome\" (\"win\" or \"lose\"), and for the \
acting player only: \"hp\" and \"mana\" (absolute integers), \"inventory\" (complete list) or \
\"addItems\"/\"removeItems\" (lists). Omit every key that did not change.";

impl TurnContext {
    /// The player whose turn is being resolved.
    #[must_use]
    pub fn acting_player(&self) -> Option<&Player> {
        self.party.get(self.acting_index)
    }

    /// Renders the chat prompt for this turn.
    #[must_use]
    pub fn render_prompt(&self) -> NarrationPrompt {
        NarrationPrompt {
            system: render_system(self.world.as_ref()),
            user: self.render_user(),
        }
    }

    fn render_user(&self) -> String {
        let mut out = String::new();

        if let Some(world) = &self.world {
            out.push_str(&format!("WORLD: {}\n{}\n\n", world.name, world.description));
        }

        out.push_str("PARTY:\n");
        out.push_str(&render_party(&self.party));

        if let Some(outline) = &self.outline {
            out.push_str(&format!("\nSTORY OUTLINE: {}\n", outline.synopsis));
            for (i, act) in outline.acts.iter().enumerate() {
                out.push_str(&format!("Act {}: {}\n", i + 1, act.title));
                for scene in &act.scenes {
                    out.push_str(&format!("  - {} (goal: {})", scene.title, scene.goal));
                    if !scene.dangers.is_empty() {
                        out.push_str(&format!(" dangers: {}", scene.dangers.join(", ")));
                    }
                    out.push('\n');
                }
            }
        }

        if let Some(goal) = &self.goal {
            out.push_str(&format!("\nCURRENT GOAL: {goal}\n"));
        }
        if !self.quest_log.is_empty() {
            out.push_str("QUEST LOG:\n");
            for entry in &self.quest_log {
                out.push_str(&format!("- {entry}\n"));
            }
        }

        if !self.recent_messages.is_empty() {
            out.push_str("\nRECENT EVENTS:\n");
            for message in &self.recent_messages {
                let who = match message.role {
                    Speaker::User => "Player",
                    Speaker::Assistant => "Narrator",
                    Speaker::System => "Note",
                };
                out.push_str(&format!("{who}: {}\n", message.text));
            }
        }

        out.push('\n');
        if self.is_intro {
            out.push_str(
                "Open the adventure: introduce the setting and the party, and set a first goal.\n",
            );
        } else if let Some(player) = self.acting_player() {
            out.push_str(&format!(
                "ACTING PLAYER: {} ({}) hp {}/{}, mana {}/{}\nACTION: {}\n",
                player.name,
                player.class,
                player.hp(),
                player.stats.hp_base,
                player.mana(),
                player.stats.mana_base,
                self.action
            ));
            if let Some(roll) = &self.roll {
                out.push_str(&format!(
                    "ROLL: d20 {} + {} {} = {} ({:?}). Key the severity of the consequences on \
                     the total, not the raw roll.\n",
                    roll.roll,
                    roll.attribute.as_str(),
                    roll.modifier,
                    roll.total,
                    roll.tier()
                ));
            }
        }

        out
    }
}

fn render_system(world: Option<&World>) -> String {
    let mut out = String::from(
        "You are the narrator of a cooperative, turn-based role-playing session. \
         Write in the language the players use, in the second person, at most three short \
         paragraphs. Never act for the players.",
    );
    if let Some(world) = world {
        if !world.tone.is_empty() {
            out.push_str(&format!(" Tone: {}.", world.tone.join(", ")));
        }
        if !world.constraints.is_empty() {
            out.push_str(&format!(" Constraints: {}.", world.constraints.join("; ")));
        }
    }
    out.push(' ');
    out.push_str(EFFECTS_FORMAT);
    out
}

fn render_party(party: &[Player]) -> String {
    party
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{}. {} the {} (hp {}/{}, mana {}/{}, items: {})\n",
                i + 1,
                p.name,
                p.class,
                p.hp(),
                p.stats.hp_base,
                p.mana(),
                p.stats.mana_base,
                if p.inventory.is_empty() {
                    "none".to_owned()
                } else {
                    p.inventory.items().join(", ")
                }
            )
        })
        .collect()
}

/// Renders the request for a three-act outline.
#[must_use]
pub fn render_outline_prompt(world: &World, party: &[Player]) -> NarrationPrompt {
    NarrationPrompt {
        system: "You design adventures for a cooperative role-playing session. Reply with a \
                 single ```json block: {\"synopsis\": string, \"acts\": [{\"title\": string, \
                 \"scenes\": [{\"title\": string, \"goal\": string, \"hooks\": [string], \
                 \"dangers\": [string]}]}]} with exactly three acts."
            .to_owned(),
        user: format!(
            "WORLD: {}\n{}\n\nPARTY:\n{}",
            world.name,
            world.description,
            render_party(party)
        ),
    }
}
