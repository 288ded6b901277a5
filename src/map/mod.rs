// Map-related modules
pub mod calendar;
pub mod config;
pub mod statistics;
pub mod terrain_gen;
pub mod tile_pos;
pub mod tiles;
pub mod world_gen;

// Re-exports for convenience
pub use calendar::{Hemisphere, LatitudeBand, Season};
pub use config::{ContinentConfig, ContinentType, IslandConfig, IslandType, MapConfig, MapConfigError};
pub use statistics::{MapStatistics, export_tile_registry};
pub use terrain_gen::{TerrainGenerator, classify_terrain};
pub use tile_pos::{GridBounds, HexCoordinates, TilePos};
pub use tiles::{HexTile, TerrainFeature, TerrainType};
pub use world_gen::{TileMap, add_coastal_tiles, generate};
