//! Typed documents for the world of a project.
//!
//! Each category of world entity lives in its own JSON document, wrapped in
//! a named container field (`"characters"`, `"places"`, ...). Field names
//! follow the established wire format, so a document written here can be
//! edited by hand and read back unchanged. Every struct carries serde
//! defaults: a partially filled document always deserializes.

use crate::ids;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One kind of world entity, and the JSON document it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    WorldOverview,
    Locations,
    Characters,
    Npcs,
    Factions,
    Religions,
    Glossary,
    Content,
}

impl Category {
    /// All categories, in the order they are written to disk.
    pub const ALL: [Category; 8] = [
        Category::WorldOverview,
        Category::Locations,
        Category::Characters,
        Category::Npcs,
        Category::Factions,
        Category::Religions,
        Category::Glossary,
        Category::Content,
    ];

    /// The category's stable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WorldOverview => "world_overview",
            Category::Locations => "locations",
            Category::Characters => "characters",
            Category::Npcs => "npcs",
            Category::Factions => "factions",
            Category::Religions => "religions",
            Category::Glossary => "glossary",
            Category::Content => "content",
        }
    }

    /// The JSON file this category is stored in.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

/// A document that persists as one category file of a project.
pub trait CategoryDoc: Serialize + DeserializeOwned + Default {
    const CATEGORY: Category;
}

// ============================================================================
// World overview
// ============================================================================

/// Singleton description of the world itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldOverview {
    pub name: String,
    pub description: String,
    pub time_period: String,
    pub technology_level: String,
    pub history: String,
    pub rules_physics: String,
}

impl CategoryDoc for WorldOverview {
    const CATEGORY: Category = Category::WorldOverview;
}

// ============================================================================
// Locations
// ============================================================================

/// Grid position of a place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coords {
    pub x: i64,
    pub y: i64,
}

/// A place in the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub region: String,
    pub description: String,
    pub population: i64,
    pub coords: Coords,
    #[serde(rename = "notableFeatures")]
    pub notable_features: Vec<String>,
}

/// A travel connection between two places, referenced by place id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub from: String,
    pub to: String,
    pub travel_time_hours: i64,
    pub method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locations {
    pub places: Vec<Place>,
    pub routes: Vec<Route>,
}

impl CategoryDoc for Locations {
    const CATEGORY: Category = Category::Locations;
}

// ============================================================================
// Characters
// ============================================================================

/// A directed relationship from one character to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relationship {
    pub character_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub description: String,
}

/// A main character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub role: String,
    pub description: String,
    pub age: i64,
    pub race: String,
    pub class: String,
    pub skills: Vec<String>,
    #[serde(rename = "currentLocation")]
    pub current_location: String,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Characters {
    pub characters: Vec<Character>,
}

impl CategoryDoc for Characters {
    const CATEGORY: Category = Category::Characters;
}

// ============================================================================
// NPCs
// ============================================================================

/// A minor, non-recurring character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub role: String,
    pub description: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Npcs {
    pub npcs: Vec<Npc>,
}

impl CategoryDoc for Npcs {
    const CATEGORY: Category = Category::Npcs;
}

// ============================================================================
// Factions
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Faction {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub alignment: String,
    pub headquarters: String,
    pub description: String,
    pub goals: Vec<String>,
    pub leadership: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Factions {
    pub factions: Vec<Faction>,
}

impl CategoryDoc for Factions {
    const CATEGORY: Category = Category::Factions;
}

// ============================================================================
// Religions
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Religion {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub domain: String,
    pub description: String,
    pub beliefs: Vec<String>,
    pub practices: Vec<String>,
    pub followers: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Religions {
    pub religions: Vec<Religion>,
}

impl CategoryDoc for Religions {
    const CATEGORY: Category = Category::Religions;
}

// ============================================================================
// Glossary
// ============================================================================

/// An in-world term with its definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossaryTerm {
    pub id: String,
    pub term: String,
    pub category: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glossary {
    pub terms: Vec<GlossaryTerm>,
}

impl CategoryDoc for Glossary {
    const CATEGORY: Category = Category::Glossary;
}

// ============================================================================
// Content (items, hazards, machines)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub properties: Vec<String>,
    pub magical: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    pub items: Vec<Item>,
    pub hazards: Vec<Item>,
    pub machines: Vec<Item>,
}

impl CategoryDoc for Content {
    const CATEGORY: Category = Category::Content;
}

// ============================================================================
// The full document set
// ============================================================================

/// Per-category entity counts for display purposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldStats {
    pub locations: usize,
    pub characters: usize,
    pub npcs: usize,
    pub factions: usize,
    pub religions: usize,
    pub glossary_terms: usize,
    pub items: usize,
}

/// The eight category documents that together describe one project's world.
///
/// `Default` yields every category's empty schema shape, so a freshly
/// created project round-trips through the store with all files present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSet {
    pub world_overview: WorldOverview,
    pub locations: Locations,
    pub characters: Characters,
    pub npcs: Npcs,
    pub factions: Factions,
    pub religions: Religions,
    pub glossary: Glossary,
    pub content: Content,
}

impl WorldSet {
    /// Total number of entities across all categories.
    ///
    /// A non-empty overview name counts as one entity: naming the world is
    /// the smallest meaningful extraction result.
    pub fn entity_count(&self) -> usize {
        let overview = usize::from(!self.world_overview.name.trim().is_empty());
        overview
            + self.locations.places.len()
            + self.locations.routes.len()
            + self.characters.characters.len()
            + self.npcs.npcs.len()
            + self.factions.factions.len()
            + self.religions.religions.len()
            + self.glossary.terms.len()
            + self.content.items.len()
            + self.content.hazards.len()
            + self.content.machines.len()
    }

    /// Summary counts for display.
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            locations: self.locations.places.len(),
            characters: self.characters.characters.len(),
            npcs: self.npcs.npcs.len(),
            factions: self.factions.factions.len(),
            religions: self.religions.religions.len(),
            glossary_terms: self.glossary.terms.len(),
            items: self.content.items.len(),
        }
    }

    /// Give every nameless entity a display name derived from its id.
    ///
    /// `"silver_keep"` backfills as `"Silver Keep"`.
    pub fn backfill_names(&mut self) {
        fn fill(name: &mut String, id: &str) {
            if name.trim().is_empty() && !id.is_empty() {
                *name = ids::name_from_id(id);
            }
        }

        for c in &mut self.characters.characters {
            fill(&mut c.name, &c.id);
        }
        for n in &mut self.npcs.npcs {
            fill(&mut n.name, &n.id);
        }
        for p in &mut self.locations.places {
            fill(&mut p.name, &p.id);
        }
        for f in &mut self.factions.factions {
            fill(&mut f.name, &f.id);
        }
        for r in &mut self.religions.religions {
            fill(&mut r.name, &r.id);
        }
        for i in &mut self.content.items {
            fill(&mut i.name, &i.id);
        }
    }
}
