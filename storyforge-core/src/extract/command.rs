//! Explicit line commands: `ADD CHARACTER: ...`, `SET WORLD: ...`.
//!
//! Commands are deterministic user syntax; this parser never calls the
//! completion collaborator. Only lines from user turns are scanned, one
//! command per line, prefix matched case-insensitively.

use crate::extract::kv::normalize_key;
use crate::ids;
use crate::world::{Character, Faction, Item, Npc, Place, Religion, WorldOverview, WorldSet};
use ollama::{ChatMessage, Role};

/// If `line` starts with `prefix` (ASCII case-insensitive), return the rest.
fn command_rest<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

/// Comma-separated positional fields, trimmed.
fn positions(rest: &str) -> Vec<String> {
    rest.split(',').map(|p| p.trim().to_string()).collect()
}

/// Positional field `index`, or `default` when missing or empty.
fn pos_or(fields: &[String], index: usize, default: &str) -> String {
    match fields.get(index) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

/// Positional number, falling back to the positional default when the
/// field is missing or unparsable. Commands are typed by hand, so a typo'd
/// age should not zero out.
fn pos_number_or(fields: &[String], index: usize, default: i64) -> i64 {
    fields
        .get(index)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

// Positional schema: name, role, description, age, race, class.
fn parse_character(rest: &str) -> Option<Character> {
    let fields = positions(rest);
    let name = fields.first().filter(|n| !n.is_empty())?.clone();

    Some(Character {
        id: ids::slug(&name),
        name,
        role: pos_or(&fields, 1, "character"),
        description: pos_or(&fields, 2, ""),
        age: pos_number_or(&fields, 3, 30),
        race: pos_or(&fields, 4, "human"),
        class: pos_or(&fields, 5, "adventurer"),
        ..Default::default()
    })
}

// Positional schema: name, role, description, location.
fn parse_npc(rest: &str) -> Option<Npc> {
    let fields = positions(rest);
    let name = fields.first().filter(|n| !n.is_empty())?.clone();

    Some(Npc {
        id: ids::slug(&name),
        name,
        role: pos_or(&fields, 1, "npc"),
        description: pos_or(&fields, 2, ""),
        location: pos_or(&fields, 3, ""),
    })
}

// Positional schema: name, type, description.
fn parse_place(rest: &str) -> Option<Place> {
    let fields = positions(rest);
    let name = fields.first().filter(|n| !n.is_empty())?.clone();

    Some(Place {
        id: ids::slug(&name),
        name,
        kind: pos_or(&fields, 1, "place"),
        description: pos_or(&fields, 2, ""),
        ..Default::default()
    })
}

// Positional schema: name, type, description.
fn parse_faction(rest: &str) -> Option<Faction> {
    let fields = positions(rest);
    let name = fields.first().filter(|n| !n.is_empty())?.clone();

    Some(Faction {
        id: ids::slug(&name),
        name,
        kind: pos_or(&fields, 1, "organization"),
        description: pos_or(&fields, 2, ""),
        ..Default::default()
    })
}

// Positional schema: name, type, description.
fn parse_religion(rest: &str) -> Option<Religion> {
    let fields = positions(rest);
    let name = fields.first().filter(|n| !n.is_empty())?.clone();

    Some(Religion {
        id: ids::slug(&name),
        name,
        kind: pos_or(&fields, 1, "religion"),
        description: pos_or(&fields, 2, ""),
        ..Default::default()
    })
}

// Positional schema: name, type, description.
fn parse_item(rest: &str) -> Option<Item> {
    let fields = positions(rest);
    let name = fields.first().filter(|n| !n.is_empty())?.clone();

    Some(Item {
        id: ids::slug(&name),
        name,
        kind: pos_or(&fields, 1, "item"),
        description: pos_or(&fields, 2, ""),
        ..Default::default()
    })
}

/// Apply `key=value` pairs to the overview. Keys outside the allow-list
/// are dropped.
fn apply_world_settings(overview: &mut WorldOverview, rest: &str) {
    for pair in rest.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match normalize_key(key).as_str() {
            "name" => overview.name = value,
            "description" => overview.description = value,
            "timeperiod" | "time" => overview.time_period = value,
            "technologylevel" | "technology" => overview.technology_level = value,
            "history" => overview.history = value,
            "rulesphysics" | "rules" => overview.rules_physics = value,
            _ => {}
        }
    }
}

/// Extract entities from the explicit commands in a conversation's user
/// turns. Assistant and system turns are never scanned.
pub fn extract_commands(messages: &[ChatMessage]) -> WorldSet {
    let mut world = WorldSet::default();

    for message in messages.iter().filter(|m| m.role == Role::User) {
        for line in message.content.lines() {
            let line = line.trim();

            if let Some(rest) = command_rest(line, "ADD CHARACTER:") {
                if let Some(character) = parse_character(rest) {
                    world.characters.characters.push(character);
                }
            } else if let Some(rest) = command_rest(line, "ADD NPC:") {
                if let Some(npc) = parse_npc(rest) {
                    world.npcs.npcs.push(npc);
                }
            } else if let Some(rest) = command_rest(line, "ADD LOCATION:") {
                if let Some(place) = parse_place(rest) {
                    world.locations.places.push(place);
                }
            } else if let Some(rest) = command_rest(line, "ADD FACTION:") {
                if let Some(faction) = parse_faction(rest) {
                    world.factions.factions.push(faction);
                }
            } else if let Some(rest) = command_rest(line, "ADD RELIGION:") {
                if let Some(religion) = parse_religion(rest) {
                    world.religions.religions.push(religion);
                }
            } else if let Some(rest) = command_rest(line, "ADD ITEM:") {
                if let Some(item) = parse_item(rest) {
                    world.content.items.push(item);
                }
            } else if let Some(rest) = command_rest(line, "SET WORLD:") {
                apply_world_settings(&mut world.world_overview, rest);
            }
        }
    }

    world
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(content: &str) -> ChatMessage {
        ChatMessage::user(content)
    }

    #[test]
    fn test_add_character_full() {
        let world = extract_commands(&[user(
            "ADD CHARACTER: Gorvoth, protagonist, A grim warrior, 34, Orc, Warrior",
        )]);

        let character = &world.characters.characters[0];
        assert_eq!(character.id, "gorvoth");
        assert_eq!(character.name, "Gorvoth");
        assert_eq!(character.role, "protagonist");
        assert_eq!(character.description, "A grim warrior");
        assert_eq!(character.age, 34);
        assert_eq!(character.race, "Orc");
        assert_eq!(character.class, "Warrior");
        assert!(character.skills.is_empty());
        assert!(character.relationships.is_empty());
    }

    #[test]
    fn test_add_character_defaults_for_missing_positions() {
        let world = extract_commands(&[user("ADD CHARACTER: Eilif")]);

        let character = &world.characters.characters[0];
        assert_eq!(character.name, "Eilif");
        assert_eq!(character.role, "character");
        assert_eq!(character.description, "");
        assert_eq!(character.age, 30);
        assert_eq!(character.race, "human");
        assert_eq!(character.class, "adventurer");
    }

    #[test]
    fn test_nameless_entity_is_rejected() {
        let world = extract_commands(&[user("ADD CHARACTER: , protagonist")]);
        assert!(world.characters.characters.is_empty());

        let world = extract_commands(&[user("ADD LOCATION:")]);
        assert!(world.locations.places.is_empty());
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let world = extract_commands(&[user("add npc: Old Marta, innkeeper")]);
        assert_eq!(world.npcs.npcs[0].id, "old_marta");
        assert_eq!(world.npcs.npcs[0].role, "innkeeper");
    }

    #[test]
    fn test_assistant_turns_are_ignored() {
        let world = extract_commands(&[
            ChatMessage::assistant("ADD CHARACTER: Fake, villain"),
            user("ADD CHARACTER: Real"),
        ]);
        assert_eq!(world.characters.characters.len(), 1);
        assert_eq!(world.characters.characters[0].name, "Real");
    }

    #[test]
    fn test_set_world_allow_list_and_remapping() {
        let world = extract_commands(&[user(
            "SET WORLD: name=Aetheria, time period=Iron Age, technology level=medieval, mood=dark",
        )]);

        let overview = &world.world_overview;
        assert_eq!(overview.name, "Aetheria");
        assert_eq!(overview.time_period, "Iron Age");
        assert_eq!(overview.technology_level, "medieval");
        // unrecognized key dropped, nothing else touched
        assert_eq!(overview.description, "");
    }

    #[test]
    fn test_multiple_commands_across_lines_and_turns() {
        let world = extract_commands(&[
            user("ADD LOCATION: Silver Keep, fortress, Seat of the mountain clans\nADD ITEM: Ember Blade, sword"),
            user("ADD FACTION: Order of the Flame\nADD RELIGION: The Deep Current, cult"),
        ]);

        assert_eq!(world.locations.places[0].id, "silver_keep");
        assert_eq!(world.locations.places[0].kind, "fortress");
        assert_eq!(world.content.items[0].id, "ember_blade");
        assert_eq!(world.factions.factions[0].kind, "organization");
        assert_eq!(world.religions.religions[0].kind, "cult");
    }

    #[test]
    fn test_unparsable_age_falls_back_to_default() {
        let world = extract_commands(&[user("ADD CHARACTER: Bram, guard, , old")]);
        assert_eq!(world.characters.characters[0].age, 30);
    }
}
