//! Flat-file JSON persistence for projects, worlds and arcs.
//!
//! One directory per project, one JSON document per entity category:
//!
//! ```text
//! <root>/
//!   my_story_3fa9c1d2/
//!     project_metadata.json
//!     world/
//!       world_overview.json  locations.json  characters.json  npcs.json
//!       factions.json  religions.json  glossary.json  content.json
//!     story/
//!       arcs.json
//! ```
//!
//! Reads are whole-file-parse-to-memory, writes are whole-collection
//! serialize-and-overwrite. The store assumes a single writer per project;
//! concurrent writers race and the last write wins.

use crate::arc::{Arc, ArcCollection, ArcMerge};
use crate::ids;
use crate::world::{CategoryDoc, WorldSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

const METADATA_FILE: &str = "project_metadata.json";
const METADATA_VERSION: &str = "1.0";

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project title is required")]
    EmptyTitle,

    #[error("Project already exists: {0}")]
    ProjectExists(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Arc not found: {0}")]
    ArcNotFound(String),

    #[error("Arc already exists: {0}")]
    ArcExists(String),
}

/// Singleton metadata document of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub created: String,
    pub last_modified: String,
    pub version: String,
}

/// The project file store. Constructed over a root directory and passed
/// into operations explicitly; there is no ambient global store.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).await?;
    Ok(())
}

impl ProjectStore {
    /// Create a store over the given projects directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn project_dir(&self, project_id: &str) -> PathBuf {
        self.root.join(project_id)
    }

    fn world_dir(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("world")
    }

    fn arcs_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("story").join("arcs.json")
    }

    fn ensure_project(&self, project_id: &str) -> Result<PathBuf, StoreError> {
        let dir = self.project_dir(project_id);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::ProjectNotFound(project_id.to_string()))
        }
    }

    /// Whether a project directory exists.
    pub fn project_exists(&self, project_id: &str) -> bool {
        self.project_dir(project_id).is_dir()
    }

    // =========================================================================
    // Project lifecycle
    // =========================================================================

    /// Create a new project with its directory scaffold, metadata, empty
    /// world files and an empty arc collection.
    ///
    /// A failure partway through rolls the directory back so no
    /// half-created project is left on disk.
    pub async fn create_project(
        &self,
        title: &str,
        description: &str,
        genre: &str,
    ) -> Result<ProjectMetadata, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let id = ids::project_id(title);
        let dir = self.project_dir(&id);
        if dir.exists() {
            return Err(StoreError::ProjectExists(title.to_string()));
        }

        let timestamp = now();
        let metadata = ProjectMetadata {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            genre: genre.to_string(),
            created: timestamp.clone(),
            last_modified: timestamp,
            version: METADATA_VERSION.to_string(),
        };

        match self.init_project(&dir, &metadata).await {
            Ok(()) => Ok(metadata),
            Err(e) => {
                if dir.exists() {
                    let _ = fs::remove_dir_all(&dir).await;
                }
                Err(e)
            }
        }
    }

    async fn init_project(&self, dir: &Path, metadata: &ProjectMetadata) -> Result<(), StoreError> {
        let world_dir = dir.join("world");
        let story_dir = dir.join("story");
        fs::create_dir_all(&world_dir).await?;
        fs::create_dir_all(&story_dir).await?;

        write_json(&dir.join(METADATA_FILE), metadata).await?;

        write_world_dir(&world_dir, &WorldSet::default()).await?;

        let mut arcs = ArcCollection::default();
        arcs.refresh_metadata(now());
        write_json(&story_dir.join("arcs.json"), &arcs).await?;

        log::debug!("created project {}", metadata.id);
        Ok(())
    }

    /// Metadata of every project under the root, newest modification first.
    ///
    /// Projects whose metadata is missing or corrupted are skipped.
    pub async fn list_projects(&self) -> Result<Vec<ProjectMetadata>, StoreError> {
        let mut projects = Vec::new();

        if !self.root.is_dir() {
            return Ok(projects);
        }

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.path().is_dir() {
                continue;
            }
            let metadata_path = entry.path().join(METADATA_FILE);
            match fs::read_to_string(&metadata_path).await {
                Ok(content) => match serde_json::from_str::<ProjectMetadata>(&content) {
                    Ok(metadata) => projects.push(metadata),
                    Err(e) => {
                        log::warn!("skipping corrupted project {:?}: {e}", entry.path());
                    }
                },
                Err(_) => continue,
            }
        }

        projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(projects)
    }

    /// Load a project's metadata.
    pub async fn load_project(&self, project_id: &str) -> Result<ProjectMetadata, StoreError> {
        let dir = self.ensure_project(project_id)?;
        let content = fs::read_to_string(dir.join(METADATA_FILE))
            .await
            .map_err(|_| StoreError::ProjectNotFound(project_id.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Delete a project and all of its documents.
    pub async fn delete_project(&self, project_id: &str) -> Result<(), StoreError> {
        let dir = self.ensure_project(project_id)?;
        fs::remove_dir_all(dir).await?;
        Ok(())
    }

    /// Update the project's lastModified timestamp.
    ///
    /// The touch is a courtesy, not part of any contract: failures are
    /// logged and swallowed so a save never fails over its timestamp.
    pub async fn touch(&self, project_id: &str) {
        let path = self.project_dir(project_id).join(METADATA_FILE);

        let result: Result<(), StoreError> = async {
            let content = fs::read_to_string(&path).await?;
            let mut metadata: ProjectMetadata = serde_json::from_str(&content)?;
            metadata.last_modified = now();
            write_json(&path, &metadata).await
        }
        .await;

        if let Err(e) = result {
            log::warn!("failed to touch {project_id}: {e}");
        }
    }

    // =========================================================================
    // World documents
    // =========================================================================

    /// Read one category document.
    ///
    /// A missing or unreadable file is the category's empty shape; a
    /// missing project directory is a hard failure.
    pub async fn read_category<T: CategoryDoc>(
        &self,
        project_id: &str,
    ) -> Result<T, StoreError> {
        self.ensure_project(project_id)?;
        let path = self.world_dir(project_id).join(T::CATEGORY.file_name());

        match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(doc) => Ok(doc),
                Err(e) => {
                    log::warn!(
                        "unreadable {} in {project_id}, treating as empty: {e}",
                        T::CATEGORY.file_name()
                    );
                    Ok(T::default())
                }
            },
            Err(_) => Ok(T::default()),
        }
    }

    /// Overwrite one category document with the given collection.
    pub async fn write_category<T: CategoryDoc>(
        &self,
        project_id: &str,
        doc: &T,
    ) -> Result<(), StoreError> {
        self.ensure_project(project_id)?;
        let world_dir = self.world_dir(project_id);
        fs::create_dir_all(&world_dir).await?;
        write_json(&world_dir.join(T::CATEGORY.file_name()), doc).await?;
        self.touch(project_id).await;
        Ok(())
    }

    /// Load the full world document set, all eight categories.
    pub async fn load_world(&self, project_id: &str) -> Result<WorldSet, StoreError> {
        Ok(WorldSet {
            world_overview: self.read_category(project_id).await?,
            locations: self.read_category(project_id).await?,
            characters: self.read_category(project_id).await?,
            npcs: self.read_category(project_id).await?,
            factions: self.read_category(project_id).await?,
            religions: self.read_category(project_id).await?,
            glossary: self.read_category(project_id).await?,
            content: self.read_category(project_id).await?,
        })
    }

    /// Write the full world document set as a snapshot, replacing every
    /// category file. Returns the file names written.
    pub async fn save_world(
        &self,
        project_id: &str,
        world: &WorldSet,
    ) -> Result<Vec<String>, StoreError> {
        self.ensure_project(project_id)?;
        let world_dir = self.world_dir(project_id);
        fs::create_dir_all(&world_dir).await?;

        let written = write_world_dir(&world_dir, world).await?;
        self.touch(project_id).await;
        Ok(written)
    }

    // =========================================================================
    // Arcs
    // =========================================================================

    /// Load the project's arc collection, initializing the file on first
    /// access.
    pub async fn load_arcs(&self, project_id: &str) -> Result<ArcCollection, StoreError> {
        let dir = self.ensure_project(project_id)?;
        let path = self.arcs_path(project_id);

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(_) => {
                let mut arcs = ArcCollection::default();
                arcs.refresh_metadata(now());
                fs::create_dir_all(dir.join("story")).await?;
                write_json(&path, &arcs).await?;
                Ok(arcs)
            }
        }
    }

    /// Save the arc collection, refreshing its metadata.
    pub async fn save_arcs(
        &self,
        project_id: &str,
        arcs: &mut ArcCollection,
    ) -> Result<(), StoreError> {
        let dir = self.ensure_project(project_id)?;
        arcs.refresh_metadata(now());
        fs::create_dir_all(dir.join("story")).await?;
        write_json(&self.arcs_path(project_id), arcs).await?;
        Ok(())
    }

    /// Add a single arc; a colliding id is an error.
    pub async fn add_arc(&self, project_id: &str, arc: Arc) -> Result<(), StoreError> {
        let mut arcs = self.load_arcs(project_id).await?;
        if arcs.get(&arc.id).is_some() {
            return Err(StoreError::ArcExists(arc.id));
        }
        arcs.arcs.push(arc);
        self.save_arcs(project_id, &mut arcs).await
    }

    /// Replace an existing arc.
    pub async fn update_arc(
        &self,
        project_id: &str,
        arc_id: &str,
        arc: Arc,
    ) -> Result<(), StoreError> {
        let mut arcs = self.load_arcs(project_id).await?;
        let Some(slot) = arcs.arcs.iter_mut().find(|a| a.id == arc_id) else {
            return Err(StoreError::ArcNotFound(arc_id.to_string()));
        };
        *slot = arc;
        self.save_arcs(project_id, &mut arcs).await
    }

    /// Remove an arc by id.
    pub async fn delete_arc(&self, project_id: &str, arc_id: &str) -> Result<(), StoreError> {
        let mut arcs = self.load_arcs(project_id).await?;
        let before = arcs.arcs.len();
        arcs.arcs.retain(|a| a.id != arc_id);
        if arcs.arcs.len() == before {
            return Err(StoreError::ArcNotFound(arc_id.to_string()));
        }
        self.save_arcs(project_id, &mut arcs).await
    }

    /// Fetch a single arc by id.
    pub async fn get_arc(&self, project_id: &str, arc_id: &str) -> Result<Arc, StoreError> {
        let arcs = self.load_arcs(project_id).await?;
        arcs.get(arc_id)
            .cloned()
            .ok_or_else(|| StoreError::ArcNotFound(arc_id.to_string()))
    }

    /// All arcs of one season.
    pub async fn arcs_by_season(
        &self,
        project_id: &str,
        season: i64,
    ) -> Result<Vec<Arc>, StoreError> {
        let arcs = self.load_arcs(project_id).await?;
        Ok(arcs.by_season(season).into_iter().cloned().collect())
    }

    /// Merge extracted arcs into the stored collection, skipping id
    /// collisions, and persist the result.
    pub async fn merge_arcs(
        &self,
        project_id: &str,
        incoming: Vec<Arc>,
    ) -> Result<ArcMerge, StoreError> {
        let mut arcs = self.load_arcs(project_id).await?;
        let merge = arcs.merge(incoming);
        self.save_arcs(project_id, &mut arcs).await?;
        Ok(merge)
    }
}

/// Write all eight category files of a world set into a world directory.
async fn write_world_dir(world_dir: &Path, world: &WorldSet) -> Result<Vec<String>, StoreError> {
    use crate::world::Category;

    let mut written = Vec::new();

    macro_rules! write_doc {
        ($category:expr, $doc:expr) => {{
            let file_name = $category.file_name();
            write_json(&world_dir.join(&file_name), $doc).await?;
            written.push(file_name);
        }};
    }

    write_doc!(Category::WorldOverview, &world.world_overview);
    write_doc!(Category::Locations, &world.locations);
    write_doc!(Category::Characters, &world.characters);
    write_doc!(Category::Npcs, &world.npcs);
    write_doc!(Category::Factions, &world.factions);
    write_doc!(Category::Religions, &world.religions);
    write_doc!(Category::Glossary, &world.glossary);
    write_doc!(Category::Content, &world.content);

    Ok(written)
}
