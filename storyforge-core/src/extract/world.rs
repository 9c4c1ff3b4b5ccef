//! World extraction: raw text in, a complete document set out.
//!
//! Every category starts from its empty schema shape and parsed entities
//! are overlaid, so a category absent from the input still comes out valid
//! and empty. An extraction that finds nothing at all is a failure, not an
//! empty success: callers need to tell "the model emitted garbage" apart
//! from "the summary was fine but said nothing".

use crate::extract::kv::{
    parse_entity_sequence, parse_fields, CHARACTER_FIELDS, FACTION_FIELDS, GLOSSARY_FIELDS,
    ITEM_FIELDS, NPC_FIELDS, OVERVIEW_FIELDS, PLACE_FIELDS, RELIGION_FIELDS, ROUTE_FIELDS,
};
use crate::extract::section::split_sections;
use crate::extract::{command, strip_code_fences, ExtractError};
use crate::ids;
use crate::prompts;
use crate::world::WorldSet;
use ollama::{ChatMessage, GenerateRequest, Ollama};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The two input modes of the extraction strategy.
#[derive(Debug, Clone)]
pub enum ExtractionSource {
    /// A structured summary with `=== SECTION ===` headers, usually
    /// AI-authored.
    Summary(String),

    /// A whole conversation; only explicit commands in user turns count.
    Conversation(Vec<ChatMessage>),
}

/// A successful extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The assembled document set, every category present.
    pub world: WorldSet,

    /// Total entities found across all categories.
    pub entities: usize,
}

fn to_entity<T: DeserializeOwned>(map: Map<String, Value>) -> Option<T> {
    serde_json::from_value(Value::Object(map)).ok()
}

fn overlay_section(world: &mut WorldSet, label: &str, content: &str) {
    match label.trim().to_uppercase().as_str() {
        "WORLD OVERVIEW" | "OVERVIEW" | "WORLD" => {
            if let Some(overview) = to_entity(parse_fields(content, OVERVIEW_FIELDS)) {
                world.world_overview = overview;
            }
        }
        "CHARACTERS" => {
            world.characters.characters.extend(
                parse_entity_sequence(content, CHARACTER_FIELDS)
                    .into_iter()
                    .filter_map(to_entity),
            );
        }
        "NPCS" => {
            world.npcs.npcs.extend(
                parse_entity_sequence(content, NPC_FIELDS)
                    .into_iter()
                    .filter_map(to_entity),
            );
        }
        "LOCATIONS" | "PLACES" => {
            world.locations.places.extend(
                parse_entity_sequence(content, PLACE_FIELDS)
                    .into_iter()
                    .filter_map(to_entity),
            );
        }
        "ROUTES" => {
            world.locations.routes.extend(
                parse_entity_sequence(content, ROUTE_FIELDS)
                    .into_iter()
                    .filter_map(to_entity),
            );
        }
        "FACTIONS" => {
            world.factions.factions.extend(
                parse_entity_sequence(content, FACTION_FIELDS)
                    .into_iter()
                    .filter_map(to_entity),
            );
        }
        "RELIGIONS" => {
            world.religions.religions.extend(
                parse_entity_sequence(content, RELIGION_FIELDS)
                    .into_iter()
                    .filter_map(to_entity),
            );
        }
        "GLOSSARY" | "TERMS" => {
            let mut terms: Vec<crate::world::GlossaryTerm> =
                parse_entity_sequence(content, GLOSSARY_FIELDS)
                    .into_iter()
                    .filter_map(to_entity)
                    .collect();
            // Glossary entries are named by `term`, so the usual name→id
            // side effect never fires for them.
            for term in &mut terms {
                if term.id.is_empty() && !term.term.is_empty() {
                    term.id = ids::slug(&term.term);
                }
            }
            world.glossary.terms.extend(terms);
        }
        "ITEMS" => {
            world.content.items.extend(
                parse_entity_sequence(content, ITEM_FIELDS)
                    .into_iter()
                    .filter_map(to_entity),
            );
        }
        _ => {}
    }
}

/// Run the extraction strategy over the given input.
///
/// Fails with [`ExtractError::NoSections`] when summary input has no
/// recognizable headers at all, and with [`ExtractError::NothingFound`]
/// when the input was well-formed but yielded zero entities.
pub fn extract(source: &ExtractionSource) -> Result<Extraction, ExtractError> {
    let mut world = match source {
        ExtractionSource::Summary(text) => {
            let text = strip_code_fences(text);
            let sections = split_sections(&text);
            if sections.is_empty() {
                return Err(ExtractError::NoSections);
            }

            let mut world = WorldSet::default();
            for (label, content) in &sections {
                overlay_section(&mut world, label, content);
            }
            world
        }
        ExtractionSource::Conversation(messages) => command::extract_commands(messages),
    };

    world.backfill_names();

    let entities = world.entity_count();
    if entities == 0 {
        return Err(ExtractError::NothingFound);
    }

    Ok(Extraction { world, entities })
}

/// Extractor that asks the completion collaborator to summarize a free-form
/// conversation into the section wire format, then parses the result.
pub struct WorldExtractor {
    ollama: Ollama,
}

impl WorldExtractor {
    /// Create an extractor over the given client.
    pub fn new(ollama: Ollama) -> Self {
        Self { ollama }
    }

    /// Summarize a world-building conversation with the model and extract
    /// the resulting document set.
    ///
    /// Generation runs at low temperature; upstream failures keep the
    /// collaborator's own error text.
    pub async fn extract_from_conversation(
        &self,
        conversation: &[ChatMessage],
    ) -> Result<Extraction, ExtractError> {
        let prompt = prompts::world_summary_prompt(conversation);
        let request = GenerateRequest::new(prompt)
            .with_temperature(0.2)
            .with_system(prompts::EXTRACTION_SYSTEM_PROMPT);

        let summary = self.ollama.generate(request).await?;
        extract(&ExtractionSource::Summary(summary))
    }
}
