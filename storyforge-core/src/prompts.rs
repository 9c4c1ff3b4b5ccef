//! Prompt templates for the extraction flows.
//!
//! The formats described here are wire formats: the section and key names
//! must match what the parsers expect, so changes here and in `extract`
//! move together.

use ollama::{ChatMessage, Role};

/// System prompt for extraction runs.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a world-building data \
extraction specialist. You respond ONLY in the exact structured format \
requested, with no commentary before or after.";

/// Build the prompt that turns a world-building conversation into a
/// structured section summary.
pub fn world_summary_prompt(conversation: &[ChatMessage]) -> String {
    let transcript = conversation
        .iter()
        .filter(|m| matches!(m.role, Role::User | Role::Assistant))
        .map(|m| {
            let speaker = match m.role {
                Role::User => "User",
                _ => "AI",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are analyzing a conversation about a fictional world. Extract EVERY piece of world-building information mentioned into this EXACT format:

=== WORLD OVERVIEW ===
name: [world name]
description: [one-paragraph description]
time period: [era or age]
technology level: [technology level]
history: [key history]
rules physics: [special rules, magic, physics]

=== CHARACTERS ===
[one block per character, blank line between blocks]
name: [character name]
role: [protagonist/antagonist/mentor/...]
description: [who they are]
age: [number]
race: [race]
class: [profession or class]
skills: [comma separated]

=== NPCS ===
name: [npc name]
role: [their function]
description: [who they are]
location: [location_id where they are found]

=== LOCATIONS ===
name: [location name]
type: [city/fortress/forest/...]
region: [region name]
description: [what it is like]
population: [number]
coords: x: [number], y: [number]

=== ROUTES ===
from: [location_id]
to: [location_id]
travel time hours: [number]
method: [on foot/airship/...]

=== FACTIONS ===
name: [faction name]
type: [organization type]
description: [goals and nature]
goals: [comma separated]

=== RELIGIONS ===
name: [religion name]
type: [faith type]
description: [beliefs and nature]

=== GLOSSARY ===
term: [in-world term]
category: [kind of term]
definition: [what it means]

=== ITEMS ===
name: [item name]
type: [item type]
description: [what it does]

CRITICAL RULES:
1. Use lowercase ids with underscores when referencing locations (e.g. silver_keep)
2. Separate multiple entries within a section with a blank line
3. Omit sections that have no information rather than inventing content
4. Only extract information actually discussed
5. Respond with the structured summary ONLY, no other text

CONVERSATION:
{transcript}

BEGIN EXTRACTION:"#
    )
}

/// The structured arc-summary format, for callers asking the model to
/// condense an arc-planning conversation before [`crate::extract_arcs`].
pub fn arc_summary_prompt() -> &'static str {
    r#"Based on our conversation, please generate a complete structured arc summary. Use this EXACT format:

=== ARC SUMMARY ===

=== ARC ===
id: [unique_arc_id_lowercase]
title: [Arc title]
season: [season number]
arcNumber: [arc number within season]
episodeStart: [first episode number]
episodeEnd: [last episode number]
status: [planned/in_progress/complete]
description: [Arc description]
themes: [comma separated themes]
mainCharacters: [comma separated character_ids]
supportingCharacters: [comma separated character_ids]
primaryLocations: [comma separated location_ids]
factions: [comma separated faction_ids]
resolution: [How the arc concludes]
cliffhanger: [Setup for next arc, or "none"]
previousArc: [previous_arc_id or "none"]
nextArc: [next_arc_id or "none"]

episode: [episode number]
beatTitle: [Beat title]
beatDescription: [What happens]
characters: [comma separated character_ids involved]
location: [location_id]
outcome: [Result of this beat]

CRITICAL:
- Use ONLY character_ids, location_ids and faction_ids from our world context
- Each arc must have plot beats for each episode
- Separate multiple arcs with empty lines
- Include all arcs we discussed"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_includes_both_speakers() {
        let conversation = vec![
            ChatMessage::user("My world is called Aetheria"),
            ChatMessage::assistant("Tell me more about Aetheria."),
            ChatMessage::system("ignored context"),
        ];

        let prompt = world_summary_prompt(&conversation);
        assert!(prompt.contains("User: My world is called Aetheria"));
        assert!(prompt.contains("AI: Tell me more about Aetheria."));
        assert!(!prompt.contains("ignored context"));
    }

    #[test]
    fn test_prompt_pins_section_labels() {
        let prompt = world_summary_prompt(&[]);
        for label in [
            "=== WORLD OVERVIEW ===",
            "=== CHARACTERS ===",
            "=== LOCATIONS ===",
            "=== ROUTES ===",
            "=== GLOSSARY ===",
        ] {
            assert!(prompt.contains(label), "missing {label}");
        }
    }

    #[test]
    fn test_arc_prompt_pins_field_names() {
        let prompt = arc_summary_prompt();
        assert!(prompt.contains("episodeStart:"));
        assert!(prompt.contains("beatTitle:"));
        assert!(prompt.contains("previousArc:"));
    }
}
