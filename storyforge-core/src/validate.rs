//! Consistency validation across a project's world documents.
//!
//! Validation is a pure function of the current document set: it never
//! mutates and reports are never persisted. Severity is advisory metadata;
//! a world is valid exactly when there are zero warnings, regardless of
//! their severity. Suggestions never affect validity.

use crate::store::{ProjectStore, StoreError};
use crate::world::WorldSet;
use serde::Serialize;
use std::collections::HashSet;

/// How much a warning matters. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// The kinds of consistency warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    IncompleteWorldOverview,
    DuplicateLocationIds,
    InvalidRoute,
    InvalidTravelTime,
    DuplicateCharacterIds,
    InvalidRelationship,
    DuplicateFactionIds,
}

/// A consistency problem worth fixing.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

/// The kinds of improvement suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    MissingRoutes,
}

/// A non-blocking improvement idea.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub message: String,
    pub suggestion: String,
}

/// Totals for display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub total_warnings: usize,
    pub total_suggestions: usize,
}

/// The result of one validation run. Computed fresh each time.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub warnings: Vec<Warning>,
    pub suggestions: Vec<Suggestion>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    fn new(warnings: Vec<Warning>, suggestions: Vec<Suggestion>) -> Self {
        Self {
            valid: warnings.is_empty(),
            summary: ReportSummary {
                total_warnings: warnings.len(),
                total_suggestions: suggestions.len(),
            },
            warnings,
            suggestions,
        }
    }
}

/// Validate the world document set of a stored project.
///
/// A missing project directory is a hard failure; missing category files
/// were already absorbed as empty collections by the store.
pub async fn validate_project(
    store: &ProjectStore,
    project_id: &str,
) -> Result<ValidationReport, StoreError> {
    let world = store.load_world(project_id).await?;
    Ok(validate_world(&world))
}

/// Run all consistency checks over a world document set.
pub fn validate_world(world: &WorldSet) -> ValidationReport {
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    check_world_overview(world, &mut warnings);
    check_locations(world, &mut warnings, &mut suggestions);
    check_characters(world, &mut warnings);
    check_factions(world, &mut warnings);

    ValidationReport::new(warnings, suggestions)
}

fn check_world_overview(world: &WorldSet, warnings: &mut Vec<Warning>) {
    let overview = &world.world_overview;
    let required = [
        ("name", &overview.name),
        ("description", &overview.description),
        ("timePeriod", &overview.time_period),
        ("technologyLevel", &overview.technology_level),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            warnings.push(Warning {
                kind: WarningKind::IncompleteWorldOverview,
                severity: Severity::Medium,
                message: format!("World overview missing: {field}"),
                suggestion: format!("Add {field} to world overview for better context"),
            });
        }
    }
}

/// Ids that appear in a collection, keeping only non-empty ones.
fn collect_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    ids.filter(|id| !id.is_empty()).collect()
}

fn has_duplicates(ids: &[&str]) -> bool {
    ids.len() != ids.iter().collect::<HashSet<_>>().len()
}

fn check_locations(
    world: &WorldSet,
    warnings: &mut Vec<Warning>,
    suggestions: &mut Vec<Suggestion>,
) {
    let places = &world.locations.places;
    let routes = &world.locations.routes;

    let place_ids = collect_ids(places.iter().map(|p| p.id.as_str()));
    if has_duplicates(&place_ids) {
        warnings.push(Warning {
            kind: WarningKind::DuplicateLocationIds,
            severity: Severity::High,
            message: "Duplicate location IDs detected".to_string(),
            suggestion: "Ensure each location has a unique ID".to_string(),
        });
    }

    let place_id_set: HashSet<&str> = place_ids.iter().copied().collect();
    for route in routes {
        for endpoint in [route.from.as_str(), route.to.as_str()] {
            if !place_id_set.contains(endpoint) {
                warnings.push(Warning {
                    kind: WarningKind::InvalidRoute,
                    severity: Severity::High,
                    message: format!("Route references non-existent location: {endpoint}"),
                    suggestion: format!("Remove route or create location with ID: {endpoint}"),
                });
            }
        }

        if route.travel_time_hours <= 0 {
            warnings.push(Warning {
                kind: WarningKind::InvalidTravelTime,
                severity: Severity::Medium,
                message: format!(
                    "Route {} -> {} has invalid travel time",
                    route.from, route.to
                ),
                suggestion: "Set realistic travel time in hours".to_string(),
            });
        }
    }

    if places.len() > 1 && routes.is_empty() {
        suggestions.push(Suggestion {
            kind: SuggestionKind::MissingRoutes,
            message: "You have multiple locations but no routes defined".to_string(),
            suggestion: "Consider adding travel routes between locations".to_string(),
        });
    }
}

fn check_characters(world: &WorldSet, warnings: &mut Vec<Warning>) {
    let characters = &world.characters.characters;

    let character_ids = collect_ids(characters.iter().map(|c| c.id.as_str()));
    if has_duplicates(&character_ids) {
        warnings.push(Warning {
            kind: WarningKind::DuplicateCharacterIds,
            severity: Severity::High,
            message: "Duplicate character IDs detected".to_string(),
            suggestion: "Ensure each character has a unique ID".to_string(),
        });
    }

    let character_id_set: HashSet<&str> = character_ids.iter().copied().collect();
    for character in characters {
        for relationship in &character.relationships {
            let target = relationship.character_id.as_str();
            if !target.is_empty() && !character_id_set.contains(target) {
                warnings.push(Warning {
                    kind: WarningKind::InvalidRelationship,
                    severity: Severity::Medium,
                    message: format!(
                        "Character {} has relationship with non-existent character ID: {target}",
                        character.name
                    ),
                    suggestion: "Remove relationship or create the referenced character"
                        .to_string(),
                });
            }
        }
    }
}

fn check_factions(world: &WorldSet, warnings: &mut Vec<Warning>) {
    let faction_ids = collect_ids(world.factions.factions.iter().map(|f| f.id.as_str()));
    if has_duplicates(&faction_ids) {
        warnings.push(Warning {
            kind: WarningKind::DuplicateFactionIds,
            severity: Severity::High,
            message: "Duplicate faction IDs detected".to_string(),
            suggestion: "Ensure each faction has a unique ID".to_string(),
        });
    }
}
