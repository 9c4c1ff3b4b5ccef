//! Schema-guided parsing of `key: value` lines into field maps.
//!
//! The parser never fails: unknown keys are dropped, unparsable values
//! coerce to a default for their declared kind. Callers rely on that
//! contract, since an extraction run must survive whatever the model emits.

use crate::ids;
use serde_json::{Map, Number, Value};

/// Declared type of a schema field, driving value coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    List,
    Coords,
}

/// One field of a category's schema template.
///
/// `name` is the wire-format JSON field name; incoming keys are matched
/// against it after normalization.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

use FieldKind::{Boolean, Coords, List, Number as Num, Text};

pub const OVERVIEW_FIELDS: &[FieldSpec] = &[
    field("name", Text),
    field("description", Text),
    field("timePeriod", Text),
    field("technologyLevel", Text),
    field("history", Text),
    field("rulesPhysics", Text),
];

pub const CHARACTER_FIELDS: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("role", Text),
    field("description", Text),
    field("age", Num),
    field("race", Text),
    field("class", Text),
    field("skills", List),
    field("currentLocation", Text),
];

pub const NPC_FIELDS: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("role", Text),
    field("description", Text),
    field("location", Text),
];

pub const PLACE_FIELDS: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("type", Text),
    field("region", Text),
    field("description", Text),
    field("population", Num),
    field("coords", Coords),
    field("notableFeatures", List),
];

pub const ROUTE_FIELDS: &[FieldSpec] = &[
    field("from", Text),
    field("to", Text),
    field("travel_time_hours", Num),
    field("method", Text),
];

pub const FACTION_FIELDS: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("type", Text),
    field("alignment", Text),
    field("headquarters", Text),
    field("description", Text),
    field("goals", List),
    field("leadership", Text),
    field("members", List),
];

pub const RELIGION_FIELDS: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("type", Text),
    field("domain", Text),
    field("description", Text),
    field("beliefs", List),
    field("practices", List),
    field("followers", Num),
];

pub const GLOSSARY_FIELDS: &[FieldSpec] = &[
    field("id", Text),
    field("term", Text),
    field("category", Text),
    field("definition", Text),
];

pub const ITEM_FIELDS: &[FieldSpec] = &[
    field("id", Text),
    field("name", Text),
    field("type", Text),
    field("description", Text),
    field("properties", List),
    field("magical", Boolean),
];

/// Normalize a key for schema matching: lowercase, spaces and underscores
/// stripped. `"Time Period"`, `"time_period"` and `"timePeriod"` all
/// normalize to `"timeperiod"`.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .collect()
}

/// Parse an integer, falling back to 0. Never fails.
pub fn parse_int(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Split a delimited list on `,` or `;`, dropping empty pieces.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coerce a raw value to its declared kind. Never fails.
pub fn coerce(kind: FieldKind, value: &str) -> Value {
    let value = value.trim();
    match kind {
        FieldKind::Text => Value::String(value.to_string()),
        FieldKind::Number => {
            if value.contains('.') {
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::from(0))
            } else {
                Value::from(parse_int(value))
            }
        }
        FieldKind::Boolean => {
            let lower = value.to_lowercase();
            Value::Bool(lower == "true" || lower == "yes" || lower == "1")
        }
        FieldKind::List => Value::Array(
            parse_list(value).into_iter().map(Value::String).collect(),
        ),
        FieldKind::Coords => parse_coords(value),
    }
}

/// Parse `x: <int>, y: <int>` (case-insensitive); anything else yields the
/// origin.
fn parse_coords(value: &str) -> Value {
    let mut x = None;
    let mut y = None;

    for piece in value.to_lowercase().split(',') {
        if let Some((axis, number)) = piece.split_once(':') {
            match (axis.trim(), number.trim().parse::<i64>()) {
                ("x", Ok(n)) => x = Some(n),
                ("y", Ok(n)) => y = Some(n),
                _ => {}
            }
        }
    }

    match (x, y) {
        (Some(x), Some(y)) => serde_json::json!({ "x": x, "y": y }),
        _ => serde_json::json!({ "x": 0, "y": 0 }),
    }
}

/// Apply one `key: value` line to an entity map. Lines without a key or
/// value, and keys matching no schema field, are ignored.
fn apply_line(entity: &mut Map<String, Value>, line: &str, specs: &[FieldSpec]) {
    let Some((raw_key, raw_value)) = line.split_once(':') else {
        return;
    };
    let value = raw_value.trim();
    if value.is_empty() {
        return;
    }

    let key = normalize_key(raw_key);
    for spec in specs {
        if key == normalize_key(spec.name) {
            entity.insert(spec.name.to_string(), coerce(spec.kind, value));

            // Naming an entity implies an id, unless one was given.
            if spec.name == "name" && !entity.contains_key("id") {
                entity.insert("id".to_string(), Value::String(ids::slug(value)));
            }
            return;
        }
    }
}

/// Parse a block holding a single entity (or singleton map) into a field
/// map. Blank lines are not significant here.
pub fn parse_fields(text: &str, specs: &[FieldSpec]) -> Map<String, Value> {
    let mut entity = Map::new();
    for line in text.lines() {
        apply_line(&mut entity, line, specs);
    }
    entity
}

/// Parse a block holding a sequence of entities separated by blank lines.
///
/// A blank line closes the entity being accumulated (if it gathered at
/// least one field); a final pending entity is flushed at end of block.
pub fn parse_entity_sequence(text: &str, specs: &[FieldSpec]) -> Vec<Map<String, Value>> {
    let mut entities = Vec::new();
    let mut current = Map::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                entities.push(std::mem::take(&mut current));
            }
            continue;
        }
        apply_line(&mut current, line, specs);
    }

    if !current.is_empty() {
        entities.push(current);
    }

    entities
}
