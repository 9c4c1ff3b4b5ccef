//! Story arcs: narrative units spanning a range of episodes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The episode span of an arc. `list` is derived from `start`/`end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeRange {
    pub start: i64,
    pub end: i64,
    pub list: Vec<i64>,
}

impl Default for EpisodeRange {
    fn default() -> Self {
        Self {
            start: 1,
            end: 1,
            list: Vec::new(),
        }
    }
}

impl EpisodeRange {
    /// Fill `list` with the inclusive range `start..=end`.
    ///
    /// Left empty when either bound is unset (zero) or the range is inverted.
    pub fn derive_list(&mut self) {
        self.list = if self.start != 0 && self.end != 0 {
            (self.start..=self.end).collect()
        } else {
            Vec::new()
        };
    }
}

/// One narrative event within an arc, tied to a single episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotBeat {
    pub episode: i64,
    pub title: String,
    pub description: String,
    pub characters: Vec<String>,
    pub location: String,
    pub outcome: String,
}

/// Links to the arcs before and after this one, by arc id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Connections {
    pub previous_arc: Option<String>,
    pub next_arc: Option<String>,
}

/// A story arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Arc {
    pub id: String,
    pub title: String,
    pub season: i64,
    pub arc_number: i64,
    pub episodes: EpisodeRange,
    pub status: String,
    pub description: String,
    pub themes: Vec<String>,
    pub main_characters: Vec<String>,
    pub supporting_characters: Vec<String>,
    pub primary_locations: Vec<String>,
    pub factions: Vec<String>,
    pub plot_beats: Vec<PlotBeat>,
    pub resolution: String,
    pub cliffhanger: String,
    pub connections: Connections,
}

impl Default for Arc {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            season: 1,
            arc_number: 1,
            episodes: EpisodeRange::default(),
            status: "planned".to_string(),
            description: String::new(),
            themes: Vec::new(),
            main_characters: Vec::new(),
            supporting_characters: Vec::new(),
            primary_locations: Vec::new(),
            factions: Vec::new(),
            plot_beats: Vec::new(),
            resolution: String::new(),
            cliffhanger: String::new(),
            connections: Connections::default(),
        }
    }
}

/// Collection-level bookkeeping, refreshed on every save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArcsMetadata {
    pub total_arcs: usize,
    pub total_seasons: usize,
    pub last_updated: String,
}

/// Outcome of merging extracted arcs into an existing collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcMerge {
    /// Ids of arcs that were added.
    pub added: Vec<String>,
    /// Ids that collided with existing arcs and were skipped.
    pub skipped: Vec<String>,
}

/// All arcs of a project, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcCollection {
    pub arcs: Vec<Arc>,
    pub metadata: ArcsMetadata,
}

impl ArcCollection {
    /// Recompute totals and stamp the update time.
    pub fn refresh_metadata(&mut self, now: impl Into<String>) {
        self.metadata.total_arcs = self.arcs.len();
        self.metadata.total_seasons = self
            .arcs
            .iter()
            .map(|a| a.season)
            .collect::<HashSet<_>>()
            .len();
        self.metadata.last_updated = now.into();
    }

    /// Find an arc by id.
    pub fn get(&self, id: &str) -> Option<&Arc> {
        self.arcs.iter().find(|a| a.id == id)
    }

    /// All arcs of one season.
    pub fn by_season(&self, season: i64) -> Vec<&Arc> {
        self.arcs.iter().filter(|a| a.season == season).collect()
    }

    /// Add extracted arcs, skipping any whose id already exists.
    ///
    /// Arcs are additive: a colliding id never overwrites the stored arc,
    /// it is reported in `skipped` instead.
    pub fn merge(&mut self, incoming: Vec<Arc>) -> ArcMerge {
        let mut merge = ArcMerge::default();
        for arc in incoming {
            if self.get(&arc.id).is_some() {
                merge.skipped.push(arc.id);
            } else {
                merge.added.push(arc.id.clone());
                self.arcs.push(arc);
            }
        }
        merge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_list_derivation() {
        let mut range = EpisodeRange {
            start: 3,
            end: 5,
            list: Vec::new(),
        };
        range.derive_list();
        assert_eq!(range.list, vec![3, 4, 5]);

        let mut single = EpisodeRange {
            start: 5,
            end: 5,
            list: Vec::new(),
        };
        single.derive_list();
        assert_eq!(single.list, vec![5]);
    }

    #[test]
    fn test_episode_list_unset_bounds() {
        let mut range = EpisodeRange {
            start: 0,
            end: 4,
            list: vec![9],
        };
        range.derive_list();
        assert!(range.list.is_empty());

        let mut inverted = EpisodeRange {
            start: 6,
            end: 2,
            list: Vec::new(),
        };
        inverted.derive_list();
        assert!(inverted.list.is_empty());
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let mut collection = ArcCollection::default();
        collection.arcs.push(Arc {
            id: "rise_of_the_tribes".to_string(),
            title: "Rise of the Tribes".to_string(),
            ..Default::default()
        });

        let incoming = vec![
            Arc {
                id: "rise_of_the_tribes".to_string(),
                ..Default::default()
            },
            Arc {
                id: "the_long_winter".to_string(),
                season: 2,
                ..Default::default()
            },
        ];

        let merge = collection.merge(incoming);
        assert_eq!(merge.added, vec!["the_long_winter"]);
        assert_eq!(merge.skipped, vec!["rise_of_the_tribes"]);
        assert_eq!(collection.arcs.len(), 2);
    }

    #[test]
    fn test_refresh_metadata_counts_seasons() {
        let mut collection = ArcCollection::default();
        collection.arcs.push(Arc {
            id: "a".to_string(),
            season: 1,
            ..Default::default()
        });
        collection.arcs.push(Arc {
            id: "b".to_string(),
            season: 1,
            ..Default::default()
        });
        collection.arcs.push(Arc {
            id: "c".to_string(),
            season: 2,
            ..Default::default()
        });

        collection.refresh_metadata("2026-01-01T00:00:00Z");
        assert_eq!(collection.metadata.total_arcs, 3);
        assert_eq!(collection.metadata.total_seasons, 2);
        assert_eq!(collection.metadata.last_updated, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn test_arc_wire_format() {
        let arc = Arc {
            id: "rise".to_string(),
            connections: Connections {
                previous_arc: None,
                next_arc: Some("fall".to_string()),
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&arc).unwrap();
        assert!(json.contains("\"arcNumber\":1"));
        assert!(json.contains("\"plotBeats\":[]"));
        assert!(json.contains("\"previousArc\":null"));
        assert!(json.contains("\"nextArc\":\"fall\""));
        assert!(json.contains("\"status\":\"planned\""));
    }
}
