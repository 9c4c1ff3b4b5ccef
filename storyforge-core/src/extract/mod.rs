//! Extraction of typed world entities from loosely formatted text.
//!
//! Two text conventions are understood, both produced either by the model
//! or typed directly by a user:
//!
//! ```text
//! === CHARACTERS ===
//! name: Gorvoth
//! role: protagonist
//!
//! ADD CHARACTER: Eilif, mentor, A wise smith, 61, Dwarf, Artificer
//! ```
//!
//! Section summaries are parsed by [`section`] + [`kv`], explicit commands
//! by [`command`]. The orchestrating extractors live in [`world`] and
//! [`arc`], one per output shape.

pub mod arc;
pub mod command;
pub mod kv;
pub mod section;
pub mod world;

pub use arc::extract_arcs;
pub use command::extract_commands;
pub use world::{extract, Extraction, ExtractionSource, WorldExtractor};

use thiserror::Error;

/// Errors from an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The completion collaborator failed; its own error text is preserved.
    #[error("AI error: {0}")]
    Upstream(#[from] ollama::Error),

    /// The input contained no recognizable section headers.
    #[error("No sections found in text")]
    NoSections,

    /// Sections (or commands) were recognized but yielded no entities.
    #[error("Nothing found: text contained no extractable entities")]
    NothingFound,

    /// The summary contained no `=== ARC ===` blocks.
    #[error("No arc sections found in summary")]
    NoArcSections,

    /// Arc blocks were present but none produced a usable arc.
    #[error("No valid arcs extracted from summary")]
    NoValidArcs,
}

/// Strip a markdown code fence wrapper from model output, if present.
///
/// Generation output is sometimes wrapped in ```` ```json ```` or a bare
/// fence; the content inside the first fence is returned. Without fences
/// the text passes through trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();

    let after_marker = if let Some(start) = text.find("```json") {
        &text[start + 7..]
    } else if let Some(start) = text.find("```") {
        &text[start + 3..]
    } else {
        return text.to_string();
    };

    match after_marker.find("```") {
        Some(end) => after_marker[..end].trim().to_string(),
        None => after_marker.trim().to_string(),
    }
}
