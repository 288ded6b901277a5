//! Testing utilities for hexworld
//!
//! Small fixtures for building tiles and maps by hand, so map, override and
//! pathfinding logic can be tested without running the world generator.

use crate::map::calendar::Hemisphere;
use crate::map::tile_pos::{TilePos, hex_distance, wrapped_distance};
use crate::map::tiles::{HexTile, TerrainType};
use crate::map::world_gen::TileMap;

/// A bare temperate tile with no features, resources or continent
pub fn plain_tile(pos: TilePos, terrain: TerrainType) -> HexTile {
    HexTile {
        coordinates: pos.into(),
        terrain,
        features: Vec::new(),
        resources: Vec::new(),
        animals: Vec::new(),
        minerals: Vec::new(),
        elevation: 4.0,
        temperature: 15.0,
        rainfall: 40.0,
        has_volcano: false,
        has_river: false,
        continent: None,
        latitude: 45.0,
        hemisphere: Hemisphere::Northern,
        season: None,
    }
}

/// A `width` x `height` map filled with one terrain
pub fn flat_map(width: i32, height: i32, terrain: TerrainType) -> TileMap {
    let mut tiles = TileMap::new();
    for r in 0..height {
        for q in 0..width {
            let pos = TilePos::new(q, r);
            tiles.insert(pos, plain_tile(pos, terrain));
        }
    }
    tiles
}

/// Overwrites the terrain of every listed tile
pub fn paint(tiles: &mut TileMap, positions: &[TilePos], terrain: TerrainType) {
    for pos in positions {
        if let Some(tile) = tiles.get_mut(pos) {
            tile.terrain = terrain;
        }
    }
}

/// Asserts that two tile positions are adjacent (distance = 1)
pub fn assert_adjacent(pos1: TilePos, pos2: TilePos) {
    let distance = hex_distance(pos1, pos2);
    assert_eq!(
        distance, 1,
        "Positions {:?} and {:?} are not adjacent (distance: {})",
        pos1, pos2, distance
    );
}

/// Asserts that a path is valid (each step is adjacent to the previous)
pub fn assert_valid_path(path: &[TilePos]) {
    if path.len() < 2 {
        return; // Single position or empty path is valid
    }

    for window in path.windows(2) {
        assert_adjacent(window[0], window[1]);
    }
}

/// Same as [`assert_valid_path`] on a map that wraps every `map_width` columns
pub fn assert_valid_wrapped_path(path: &[TilePos], map_width: i32) {
    for window in path.windows(2) {
        let distance = wrapped_distance(window[0], window[1], map_width);
        assert_eq!(
            distance, 1,
            "Positions {:?} and {:?} are not adjacent across the seam (distance: {})",
            window[0], window[1], distance
        );
    }
}
