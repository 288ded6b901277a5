#![allow(dead_code)]

use hexworld::map::{
    ContinentConfig, ContinentType, IslandConfig, IslandType, MapConfig, TileMap, TilePos,
};

pub const SEED: u64 = 42;

/// A small world: one continent in the middle and a desert island to the west
pub fn test_config() -> MapConfig {
    MapConfig::empty(64, 40)
        .with_continent(ContinentConfig {
            center_q: 32,
            center_r: 20,
            width: 24,
            height: 16,
            continent_type: ContinentType::Drantium,
        })
        .with_island(IslandConfig {
            center_q: 8,
            center_r: 20,
            island_type: IslandType::Desert,
        })
}

/// Every position of `tiles`, north to south then west to east
pub fn sorted_positions(tiles: &TileMap) -> Vec<TilePos> {
    let mut positions: Vec<TilePos> = tiles.keys().copied().collect();
    positions.sort_by_key(|pos| (pos.r, pos.q));
    positions
}

/// First tile in reading order that satisfies `predicate`
pub fn find_tile(tiles: &TileMap, predicate: impl Fn(&hexworld::map::HexTile) -> bool) -> Option<TilePos> {
    sorted_positions(tiles)
        .into_iter()
        .find(|pos| tiles.get(pos).is_some_and(&predicate))
}
