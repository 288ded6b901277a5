//! Persisted terrain overrides and the map lock.
//!
//! Manual edits are stored as sparse [`TerrainModification`] records behind a
//! small [`KeyValueStore`] port. At load time they are merged field by field
//! onto freshly generated base tiles, so regeneration never loses an edit.
//! The map lock pins the world seed so that the base tiles (and therefore the
//! meaning of every stored edit) stay the same across sessions.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::map::config::{MapConfig, MapConfigError};
use crate::map::tile_pos::TilePos;
use crate::map::tiles::{HexTile, TerrainFeature, TerrainType};
use crate::map::world_gen::{TileMap, add_coastal_tiles_where, generate};
use crate::resources::{AnimalType, MineralType, NaturalResource, ResourceSet, distribute};

/// Key holding the JSON array of modifications
pub const MODIFICATIONS_KEY: &str = "terrain_modifications";
/// Key holding `"true"` while the map is locked
pub const MAP_LOCK_KEY: &str = "map_locked";
/// Key holding the pinned world seed
pub const MAP_SEED_KEY: &str = "map_seed";

// ============================================================================
// Persistence port
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Minimal string key-value storage the override layer is written against
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.path_for(key)?, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)?) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Modification records
// ============================================================================

/// Optional tile fields; `None` means "inherit the base value"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<TerrainFeature>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<NaturalResource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animals: Option<Vec<AnimalType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minerals: Option<Vec<MineralType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<f64>,
}

impl TileEdit {
    /// Edit touching only the resource fields
    pub fn resources_only(
        resources: Option<Vec<NaturalResource>>,
        animals: Option<Vec<AnimalType>>,
        minerals: Option<Vec<MineralType>>,
    ) -> Self {
        Self {
            resources,
            animals,
            minerals,
            ..Self::default()
        }
    }

    /// Edit replacing all three resource lists with a distributor result
    pub fn from_resource_set(set: ResourceSet) -> Self {
        Self::resources_only(Some(set.resources), Some(set.animals), Some(set.minerals))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields set in `newer` replace ours; unset ones are kept
    pub fn overlay(&mut self, newer: TileEdit) {
        if newer.terrain.is_some() {
            self.terrain = newer.terrain;
        }
        if newer.features.is_some() {
            self.features = newer.features;
        }
        if newer.resources.is_some() {
            self.resources = newer.resources;
        }
        if newer.animals.is_some() {
            self.animals = newer.animals;
        }
        if newer.minerals.is_some() {
            self.minerals = newer.minerals;
        }
        if newer.elevation.is_some() {
            self.elevation = newer.elevation;
        }
        if newer.temperature.is_some() {
            self.temperature = newer.temperature;
        }
        if newer.rainfall.is_some() {
            self.rainfall = newer.rainfall;
        }
    }

    /// Range-checks the numeric fields
    pub fn validate(&self) -> Result<(), ModificationError> {
        check_range("elevation", self.elevation, 0.0, 10.0)?;
        check_range("temperature", self.temperature, -50.0, 50.0)?;
        check_range("rainfall", self.rainfall, 0.0, 100.0)
    }
}

fn check_range(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ModificationError> {
    match value {
        Some(v) if !(v.is_finite() && (min..=max).contains(&v)) => Err(
            ModificationError::OutOfRange {
                field,
                value: v,
                min,
                max,
            },
        ),
        _ => Ok(()),
    }
}

/// A sparse, persisted edit of one tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainModification {
    pub q: i32,
    pub r: i32,
    #[serde(flatten)]
    pub edit: TileEdit,
    /// Unix milliseconds of the last write
    pub timestamp: i64,
}

impl TerrainModification {
    pub fn new(q: i32, r: i32, edit: TileEdit) -> Self {
        Self {
            q,
            r,
            edit,
            timestamp: now_millis(),
        }
    }

    pub fn pos(&self) -> TilePos {
        TilePos::new(self.q, self.r)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Error, PartialEq)]
pub enum ModificationError {
    #[error("modification for {found} cannot apply to tile {expected}")]
    CoordinateMismatch { expected: TilePos, found: TilePos },
    #[error("{field} {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Merge a patch onto a base tile. Defined fields replace, undefined fields
/// inherit. On error nothing is applied.
pub fn merge(base: &HexTile, patch: &TerrainModification) -> Result<HexTile, ModificationError> {
    if patch.pos() != base.pos() {
        return Err(ModificationError::CoordinateMismatch {
            expected: base.pos(),
            found: patch.pos(),
        });
    }
    patch.edit.validate()?;

    let edit = &patch.edit;
    let mut tile = base.clone();
    if let Some(terrain) = edit.terrain {
        tile.terrain = terrain;
    }
    if let Some(features) = &edit.features {
        tile.features = features.clone();
        tile.sync_feature_flags();
    }
    if let Some(resources) = &edit.resources {
        tile.resources = resources.clone();
    }
    if let Some(animals) = &edit.animals {
        tile.animals = animals.clone();
    }
    if let Some(minerals) = &edit.minerals {
        tile.minerals = minerals.clone();
    }
    if let Some(elevation) = edit.elevation {
        tile.elevation = elevation;
    }
    if let Some(temperature) = edit.temperature {
        tile.temperature = temperature;
    }
    if let Some(rainfall) = edit.rainfall {
        tile.rainfall = rainfall;
    }
    Ok(tile)
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("expected a JSON array of modifications")]
    NotAnArray,
    #[error("record {index} is not an object")]
    NotAnObject { index: usize },
    #[error("record {index} has a missing or non-integer `{field}`")]
    InvalidCoordinate { index: usize, field: &'static str },
    #[error("record {index} is malformed: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("record {index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: ModificationError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("edit rejected: {0}")]
    Invalid(#[from] ModificationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of applying every stored modification to a tile map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped_invalid: usize,
    pub unknown_coordinates: usize,
    /// Tiles whose terrain is set by an override
    pub pinned_terrain: HashSet<TilePos>,
}

// ============================================================================
// Override store
// ============================================================================

/// Read-modify-write access to the persisted modification list
pub struct OverrideStore<S> {
    store: S,
}

impl<S: KeyValueStore> OverrideStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All stored modifications. Missing or corrupt data reads as empty.
    pub fn load_all(&self) -> Vec<TerrainModification> {
        let raw = match self.store.get(MODIFICATIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Error reading terrain modifications: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(modifications) => modifications,
            Err(e) => {
                error!("Error loading terrain modifications, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn write_all(&mut self, modifications: &[TerrainModification]) -> Result<(), StoreError> {
        let json = serde_json::to_string(modifications)?;
        self.store.set(MODIFICATIONS_KEY, &json)
    }

    /// Upsert: fields in `edit` replace the stored ones, other stored fields stay.
    /// The combined edit is range-checked first; on error nothing is written.
    pub fn save(&mut self, q: i32, r: i32, edit: TileEdit) -> Result<TerrainModification, SaveError> {
        let mut modifications = self.load_all();
        let index = modifications.iter().position(|m| m.q == q && m.r == r);

        let mut combined = match index {
            Some(i) => modifications[i].edit.clone(),
            None => TileEdit::default(),
        };
        combined.overlay(edit);
        if let Err(e) = combined.validate() {
            warn!("Rejecting modification for {},{}: {}", q, r, e);
            return Err(e.into());
        }

        let saved = TerrainModification::new(q, r, combined);
        match index {
            Some(i) => modifications[i] = saved.clone(),
            None => modifications.push(saved.clone()),
        }
        self.write_all(&modifications)?;
        debug!("Saved modification for {},{}", q, r);
        Ok(saved)
    }

    /// Upsert restricted to resource fields; terrain and features are never set
    pub fn save_resources_only(
        &mut self,
        q: i32,
        r: i32,
        resources: Option<Vec<NaturalResource>>,
        animals: Option<Vec<AnimalType>>,
        minerals: Option<Vec<MineralType>>,
    ) -> Result<TerrainModification, SaveError> {
        self.save(q, r, TileEdit::resources_only(resources, animals, minerals))
    }

    /// Re-runs the resource distributor on the effective `tile` and stores the
    /// outcome as a resources-only edit. The same tile and seed always store
    /// the same lists.
    pub fn reroll_resources(&mut self, tile: &HexTile, seed: u64) -> Result<TerrainModification, SaveError> {
        let set = distribute(tile, seed);
        let pos = tile.pos();
        info!(
            "Rerolled resources for {}: {} resources, {} animals, {} minerals",
            pos,
            set.resources.len(),
            set.animals.len(),
            set.minerals.len()
        );
        self.save(pos.q, pos.r, TileEdit::from_resource_set(set))
    }

    pub fn get_modification(&self, q: i32, r: i32) -> Option<TerrainModification> {
        self.load_all().into_iter().find(|m| m.q == q && m.r == r)
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.store.remove(MODIFICATIONS_KEY)
    }

    pub fn count(&self) -> usize {
        self.load_all().len()
    }

    /// Pretty JSON of every stored modification
    pub fn export(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.load_all())?)
    }

    /// Replace the stored list with `json` after validating all of it.
    /// On any error the existing store is untouched.
    pub fn import(&mut self, json: &str) -> Result<usize, ImportError> {
        let modifications = match parse_import(json) {
            Ok(modifications) => modifications,
            Err(e) => {
                error!("Error importing modifications: {}", e);
                return Err(e);
            }
        };
        self.write_all(&modifications)?;
        info!("Imported {} terrain modifications", modifications.len());
        Ok(modifications.len())
    }

    /// Merge every stored modification into `tiles`
    pub fn apply_all(&self, tiles: &mut TileMap) -> ApplyReport {
        let mut report = ApplyReport::default();
        for modification in self.load_all() {
            let pos = modification.pos();
            let Some(base) = tiles.get(&pos) else {
                report.unknown_coordinates += 1;
                continue;
            };
            match merge(base, &modification) {
                Ok(merged) => {
                    if modification.edit.terrain.is_some() {
                        report.pinned_terrain.insert(pos);
                    }
                    tiles.insert(pos, merged);
                    report.applied += 1;
                }
                Err(e) => {
                    warn!("Skipping modification for {}: {}", pos, e);
                    report.skipped_invalid += 1;
                }
            }
        }
        report
    }
}

fn parse_import(json: &str) -> Result<Vec<TerrainModification>, ImportError> {
    let value: Value = serde_json::from_str(json).map_err(ImportError::Json)?;
    let Value::Array(records) = value else {
        return Err(ImportError::NotAnArray);
    };

    let mut modifications = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let Some(object) = record.as_object() else {
            return Err(ImportError::NotAnObject { index });
        };
        for field in ["q", "r"] {
            let valid = object
                .get(field)
                .and_then(Value::as_i64)
                .is_some_and(|v| i32::try_from(v).is_ok());
            if !valid {
                return Err(ImportError::InvalidCoordinate { index, field });
            }
        }
        let modification: TerrainModification = serde_json::from_value(record)
            .map_err(|source| ImportError::Record { index, source })?;
        modification
            .edit
            .validate()
            .map_err(|source| ImportError::Invalid { index, source })?;
        modifications.push(modification);
    }
    Ok(modifications)
}

// ============================================================================
// Map lock
// ============================================================================

/// Pins the world seed across sessions
pub struct MapLock<S> {
    store: S,
}

impl<S: KeyValueStore> MapLock<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn is_locked(&self) -> bool {
        match self.store.get(MAP_LOCK_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                error!("Error checking map lock: {}", e);
                false
            }
        }
    }

    pub fn lock(&mut self) -> Result<(), StoreError> {
        self.store.set(MAP_LOCK_KEY, "true")
    }

    pub fn unlock(&mut self) -> Result<(), StoreError> {
        self.store.remove(MAP_LOCK_KEY)
    }

    /// Flips the lock and returns the new state
    pub fn toggle(&mut self) -> Result<bool, StoreError> {
        if self.is_locked() {
            self.unlock()?;
            Ok(false)
        } else {
            self.lock()?;
            Ok(true)
        }
    }

    pub fn save_seed(&mut self, seed: u64) -> Result<(), StoreError> {
        self.store.set(MAP_SEED_KEY, &seed.to_string())
    }

    pub fn saved_seed(&self) -> Option<u64> {
        let raw = match self.store.get(MAP_SEED_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                error!("Error getting saved map seed: {}", e);
                return None;
            }
        };
        match raw.trim().parse() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!("Ignoring unparseable saved map seed '{}'", raw);
                None
            }
        }
    }

    /// Seed a world load must use: the pinned one while locked, else `current`
    pub fn resolve_seed(&self, current: u64) -> u64 {
        if self.is_locked()
            && let Some(seed) = self.saved_seed()
        {
            return seed;
        }
        current
    }
}

// ============================================================================
// World loading
// ============================================================================

/// The effective world for one session
#[derive(Debug, Clone)]
pub struct LoadedWorld {
    pub seed: u64,
    pub tiles: TileMap,
    pub report: ApplyReport,
}

/// Resolve the seed through the lock, generate, then merge every override.
/// The coastal pass is re-run afterwards on tiles whose terrain no override pins.
pub fn load_world<S: KeyValueStore>(
    store: &mut S,
    current_seed: u64,
    month: i32,
    config: &MapConfig,
) -> Result<LoadedWorld, MapConfigError> {
    let seed = MapLock::new(&mut *store).resolve_seed(current_seed);
    let mut tiles = generate(seed, month, config)?;

    let report = OverrideStore::new(&mut *store).apply_all(&mut tiles);
    let recoasted =
        add_coastal_tiles_where(&mut tiles, config, |pos| !report.pinned_terrain.contains(&pos));
    info!(
        "Loaded world with seed {}: {} overrides applied, {} skipped, {} coast tiles added",
        seed, report.applied, report.skipped_invalid, recoasted
    );

    Ok(LoadedWorld {
        seed,
        tiles,
        report,
    })
}
