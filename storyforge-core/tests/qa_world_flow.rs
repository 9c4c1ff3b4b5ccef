//! QA tests for the full extraction → store → validation flow.
//!
//! These tests exercise the engine end to end against a real temporary
//! directory, without touching the completion collaborator.

use ollama::ChatMessage;
use storyforge_core::extract::{extract, extract_arcs, ExtractionSource};
use storyforge_core::store::ProjectStore;
use storyforge_core::validate::validate_project;
use storyforge_core::world::{Characters, WorldSet};
use storyforge_core::StoreError;
use tempfile::TempDir;

const SUMMARY: &str = "\
=== WORLD OVERVIEW ===
name: Aetheria
description: A shattered archipelago drifting through an endless sky
time period: Age of Storms
technology level: airships and brass automata

=== CHARACTERS ===
name: Gorvoth
role: protagonist
description: A grim warrior of the sky clans
age: 34
race: Orc
class: Warrior

name: Eilif
role: mentor
age: 61

=== LOCATIONS ===
name: Silver Keep
type: fortress
description: Seat of the mountain clans
coords: x: 3, y: 5

name: Ember Port
type: harbor

=== ROUTES ===
from: silver_keep
to: ember_port
travel time hours: 72
method: airship

=== FACTIONS ===
name: Order of the Flame
type: religious order
";

const ARC_SUMMARY: &str = "\
=== ARC SUMMARY ===

=== ARC ===
title: Rise of the Tribes
season: 1
episodeStart: 1
episodeEnd: 3
description: The scattered tribes unite.

episode: 1
beatTitle: The Summons
characters: gorvoth
location: silver_keep
outcome: The clans agree to talk

=== ARC ===
title: The Long Winter
season: 1
episodeStart: 4
episodeEnd: 6
";

// =============================================================================
// TEST 1: Extraction feeds the store and survives a round trip
// =============================================================================

#[tokio::test]
async fn test_extract_save_load_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    let project = store
        .create_project("Aetheria Chronicles", "Sky pirates", "Fantasy")
        .await
        .expect("Create should succeed");

    let extraction =
        extract(&ExtractionSource::Summary(SUMMARY.to_string())).expect("Extraction should succeed");

    // overview + 2 characters + 2 places + 1 route + 1 faction
    assert_eq!(extraction.entities, 7);

    let written = store
        .save_world(&project.id, &extraction.world)
        .await
        .expect("Save should succeed");
    assert_eq!(written.len(), 8, "every category file is written");

    let loaded = store
        .load_world(&project.id)
        .await
        .expect("Load should succeed");
    assert_eq!(loaded, extraction.world);

    // categories absent from the summary still have their empty shape
    assert!(loaded.religions.religions.is_empty());
    assert!(loaded.glossary.terms.is_empty());

    let stats = loaded.stats();
    assert_eq!(stats.characters, 2);
    assert_eq!(stats.locations, 2);
    assert_eq!(stats.factions, 1);
}

// =============================================================================
// TEST 2: Validation over stored documents
// =============================================================================

#[tokio::test]
async fn test_validation_of_stored_world() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    let project = store
        .create_project("Validation Target", "", "")
        .await
        .unwrap();

    let extraction = extract(&ExtractionSource::Summary(SUMMARY.to_string())).unwrap();
    store.save_world(&project.id, &extraction.world).await.unwrap();

    let report = validate_project(&store, &project.id).await.unwrap();
    assert!(report.valid, "warnings: {:?}", report.warnings);

    // break a route endpoint and revalidate
    let mut world = extraction.world.clone();
    world.locations.routes[0].to = "nowhere".to_string();
    store.save_world(&project.id, &world).await.unwrap();

    let report = validate_project(&store, &project.id).await.unwrap();
    assert!(!report.valid);
    assert_eq!(report.summary.total_warnings, 1);
}

#[tokio::test]
async fn test_validation_of_missing_project_is_hard_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    let result = validate_project(&store, "ghost_00000000").await;
    assert!(matches!(result, Err(StoreError::ProjectNotFound(_))));
}

// =============================================================================
// TEST 3: Command conversations build worlds too
// =============================================================================

#[tokio::test]
async fn test_command_conversation_flow() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    let project = store.create_project("Commanded", "", "").await.unwrap();

    let conversation = vec![
        ChatMessage::assistant("Tell me about your world."),
        ChatMessage::user(
            "SET WORLD: name=Aetheria, time period=Age of Storms\n\
             ADD CHARACTER: Gorvoth, protagonist, A grim warrior, 34, Orc, Warrior",
        ),
        ChatMessage::user("ADD LOCATION: Silver Keep, fortress"),
    ];

    let extraction = extract(&ExtractionSource::Conversation(conversation)).unwrap();
    assert_eq!(extraction.entities, 3);

    store.save_world(&project.id, &extraction.world).await.unwrap();

    let characters: Characters = store.read_category(&project.id).await.unwrap();
    assert_eq!(characters.characters[0].id, "gorvoth");
    assert_eq!(characters.characters[0].age, 34);
}

// =============================================================================
// TEST 4: Arc extraction merges additively
// =============================================================================

#[tokio::test]
async fn test_arc_extraction_and_merge() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    let project = store.create_project("Arc Flow", "", "").await.unwrap();

    let arcs = extract_arcs(ARC_SUMMARY).expect("Arc extraction should succeed");
    assert_eq!(arcs.len(), 2);
    assert_eq!(arcs[0].episodes.list, vec![1, 2, 3]);

    let merge = store.merge_arcs(&project.id, arcs.clone()).await.unwrap();
    assert_eq!(merge.added.len(), 2);
    assert!(merge.skipped.is_empty());

    // re-extracting the same summary adds nothing: arcs are additive,
    // colliding ids are skipped rather than overwritten
    let merge = store.merge_arcs(&project.id, arcs).await.unwrap();
    assert!(merge.added.is_empty());
    assert_eq!(merge.skipped.len(), 2);

    let collection = store.load_arcs(&project.id).await.unwrap();
    assert_eq!(collection.arcs.len(), 2);
    assert_eq!(collection.metadata.total_arcs, 2);
    assert_eq!(collection.metadata.total_seasons, 1);
}

// =============================================================================
// TEST 5: World sections are snapshot replacements
// =============================================================================

#[tokio::test]
async fn test_world_save_is_snapshot_replacement() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    let project = store.create_project("Snapshots", "", "").await.unwrap();

    let first = extract(&ExtractionSource::Summary(SUMMARY.to_string())).unwrap();
    store.save_world(&project.id, &first.world).await.unwrap();

    let smaller = "=== CHARACTERS ===\nname: Solo\n";
    let second = extract(&ExtractionSource::Summary(smaller.to_string())).unwrap();
    store.save_world(&project.id, &second.world).await.unwrap();

    let loaded = store.load_world(&project.id).await.unwrap();
    assert_eq!(loaded.characters.characters.len(), 1);
    assert_eq!(loaded.characters.characters[0].name, "Solo");
    // the previous snapshot's places are gone, not merged
    assert!(loaded.locations.places.is_empty());
}

// =============================================================================
// TEST 6: Project lifecycle
// =============================================================================

#[tokio::test]
async fn test_project_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    assert!(store.list_projects().await.unwrap().is_empty());

    let a = store.create_project("Alpha", "", "").await.unwrap();
    let b = store.create_project("Beta", "", "").await.unwrap();

    let listed = store.list_projects().await.unwrap();
    assert_eq!(listed.len(), 2);

    store.delete_project(&a.id).await.unwrap();
    let listed = store.list_projects().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, b.id);

    // deleting a project removes its documents entirely
    let result = store.load_world(&a.id).await;
    assert!(matches!(result, Err(StoreError::ProjectNotFound(_))));
}

// =============================================================================
// TEST 7: Default world round trip is byte-stable modulo key order
// =============================================================================

#[tokio::test]
async fn test_default_world_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProjectStore::new(temp_dir.path());

    let project = store.create_project("Empty World", "", "").await.unwrap();
    let loaded = store.load_world(&project.id).await.unwrap();
    assert_eq!(loaded, WorldSet::default());

    let value = serde_json::to_value(&loaded).unwrap();
    assert_eq!(value, serde_json::to_value(WorldSet::default()).unwrap());
}
