//! Arc extraction from `=== ARC ===` structured summaries.
//!
//! Arc blocks use a fixed field map rather than a supplied schema. Plot
//! beats are a repeatable sub-block inside an arc, opened by `episode:`;
//! beat-only keys apply to the beat being accumulated and are ignored
//! outside one.

use crate::arc::{Arc, PlotBeat};
use crate::extract::kv::{normalize_key, parse_int, parse_list};
use crate::extract::section::split_blocks;
use crate::extract::{strip_code_fences, ExtractError};
use crate::ids;

fn none_or(value: &str) -> Option<String> {
    if value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

fn flush_beat(current: &mut Option<PlotBeat>, beats: &mut Vec<PlotBeat>) {
    // A beat without an episode number never made it past its opener.
    if current.as_ref().is_some_and(|b| b.episode != 0) {
        beats.extend(current.take());
    }
}

/// Parse one arc block. Returns `None` when the block yields no id, not
/// even via its title.
fn parse_arc(content: &str) -> Option<Arc> {
    let mut arc = Arc::default();
    let mut beats: Vec<PlotBeat> = Vec::new();
    let mut current_beat: Option<PlotBeat> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush_beat(&mut current_beat, &mut beats);
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once(':') else {
            continue;
        };
        let value = raw_value.trim();
        if value.is_empty() {
            continue;
        }

        match normalize_key(raw_key).as_str() {
            "id" => arc.id = value.to_string(),
            "title" => arc.title = value.to_string(),
            "season" => arc.season = parse_int(value),
            "arcnumber" => arc.arc_number = parse_int(value),
            "episodestart" | "startepisode" => arc.episodes.start = parse_int(value),
            "episodeend" | "endepisode" => arc.episodes.end = parse_int(value),
            "status" => arc.status = value.to_string(),
            "description" => arc.description = value.to_string(),
            "themes" => arc.themes = parse_list(value),
            "maincharacters" => arc.main_characters = parse_list(value),
            "supportingcharacters" => arc.supporting_characters = parse_list(value),
            "primarylocations" | "locations" => arc.primary_locations = parse_list(value),
            "factions" => arc.factions = parse_list(value),
            "resolution" => arc.resolution = value.to_string(),
            "cliffhanger" => arc.cliffhanger = value.to_string(),
            "previousarc" => arc.connections.previous_arc = none_or(value),
            "nextarc" => arc.connections.next_arc = none_or(value),
            "episode" => {
                flush_beat(&mut current_beat, &mut beats);
                current_beat = Some(PlotBeat {
                    episode: parse_int(value),
                    ..Default::default()
                });
            }
            beat_key => {
                if let Some(beat) = current_beat.as_mut() {
                    match beat_key {
                        "beattitle" => beat.title = value.to_string(),
                        "beatdescription" => beat.description = value.to_string(),
                        "characters" => beat.characters = parse_list(value),
                        "location" => beat.location = value.to_string(),
                        "outcome" => beat.outcome = value.to_string(),
                        _ => {}
                    }
                }
            }
        }
    }

    flush_beat(&mut current_beat, &mut beats);
    arc.plot_beats = beats;
    arc.episodes.derive_list();

    if arc.id.is_empty() && !arc.title.is_empty() {
        arc.id = ids::slug(&arc.title);
    }
    if arc.id.is_empty() {
        None
    } else {
        Some(arc)
    }
}

/// Extract all arcs from a structured summary.
///
/// Fails with [`ExtractError::NoArcSections`] when no `=== ARC ===` blocks
/// exist and [`ExtractError::NoValidArcs`] when none of them parsed to an
/// arc with an id.
pub fn extract_arcs(summary: &str) -> Result<Vec<Arc>, ExtractError> {
    let text = strip_code_fences(summary);
    let blocks = split_blocks(&text, "ARC");
    if blocks.is_empty() {
        return Err(ExtractError::NoArcSections);
    }

    let arcs: Vec<Arc> = blocks.iter().filter_map(|block| parse_arc(block)).collect();
    if arcs.is_empty() {
        return Err(ExtractError::NoValidArcs);
    }

    Ok(arcs)
}
