//! World-building extraction and consistency engine.
//!
//! This crate turns loosely formatted text (AI-generated section summaries
//! or explicit user commands) into typed world entities, persists them as
//! per-project JSON documents, and cross-checks their referential
//! integrity.
//!
//! # Quick Start
//!
//! ```ignore
//! use storyforge_core::{extract, ExtractionSource, ProjectStore, validate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ProjectStore::new("./projects");
//!     let project = store.create_project("My World", "", "Fantasy").await?;
//!
//!     let summary = "=== CHARACTERS ===\nname: Gorvoth\nrole: protagonist\n";
//!     let result = extract(&ExtractionSource::Summary(summary.to_string()))?;
//!     store.save_world(&project.id, &result.world).await?;
//!
//!     let report = validate::validate_project(&store, &project.id).await?;
//!     println!("valid: {}", report.valid);
//!     Ok(())
//! }
//! ```

pub mod arc;
pub mod extract;
pub mod ids;
pub mod prompts;
pub mod store;
pub mod validate;
pub mod world;

// Primary public API
pub use arc::{Arc, ArcCollection, ArcMerge, Connections, EpisodeRange, PlotBeat};
pub use extract::{
    extract, extract_arcs, extract_commands, ExtractError, Extraction, ExtractionSource,
    WorldExtractor,
};
pub use store::{ProjectMetadata, ProjectStore, StoreError};
pub use validate::{validate_world, Severity, Suggestion, ValidationReport, Warning};
pub use world::{Category, CategoryDoc, WorldSet};
