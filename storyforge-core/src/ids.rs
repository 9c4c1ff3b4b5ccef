//! Identifier derivation for entities and projects.
//!
//! Entity ids are slugs: lowercase, apostrophes and quotes stripped, spaces
//! joined with underscores. The transform must stay stable because display
//! names are re-derived from ids when an extracted entity arrives nameless.

use uuid::Uuid;

/// Derive an entity id from a display name.
///
/// `"Bob's Tavern"` becomes `"bobs_tavern"`.
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '"')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Generate a unique project id from a title.
///
/// The title is cleaned for the filesystem (alphanumerics, spaces and
/// underscores survive, everything else is dropped), then suffixed with an
/// 8-character random tag so two projects can share a title.
pub fn project_id(title: &str) -> String {
    let clean: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect::<String>()
        .to_lowercase();

    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", clean, &suffix[..8])
}

/// Derive a display name from an id: `"silver_keep"` becomes `"Silver Keep"`.
pub fn name_from_id(id: &str) -> String {
    id.split('_')
        .filter(|piece| !piece.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basic() {
        assert_eq!(slug("Gorvoth"), "gorvoth");
        assert_eq!(slug("Silver Keep"), "silver_keep");
    }

    #[test]
    fn test_slug_strips_quotes() {
        assert_eq!(slug("Bob's Tavern"), "bobs_tavern");
        assert_eq!(slug("The \"Iron\" Pact"), "the_iron_pact");
    }

    #[test]
    fn test_project_id_shape() {
        let id = project_id("My Epic Story!");
        assert!(id.starts_with("my_epic_story_"));
        // cleaned title + underscore + 8-char suffix
        assert_eq!(id.len(), "my_epic_story_".len() + 8);
    }

    #[test]
    fn test_project_ids_are_unique() {
        assert_ne!(project_id("Same Title"), project_id("Same Title"));
    }

    #[test]
    fn test_name_from_id() {
        assert_eq!(name_from_id("silver_keep"), "Silver Keep");
        assert_eq!(name_from_id("gorvoth"), "Gorvoth");
        assert_eq!(name_from_id("order_of_the_flame"), "Order Of The Flame");
    }

    #[test]
    fn test_name_from_id_skips_empty_pieces() {
        assert_eq!(name_from_id("dark__tower"), "Dark Tower");
    }
}
