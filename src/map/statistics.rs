use std::collections::BTreeMap;

use serde::Serialize;

use crate::map::config::ContinentType;
use crate::map::tiles::{HexTile, TerrainType};
use crate::map::world_gen::TileMap;

/// Aggregate counts over an effective tile map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStatistics {
    pub total_tiles: usize,
    pub land_tiles: usize,
    pub terrain_counts: BTreeMap<TerrainType, usize>,
    pub continent_counts: BTreeMap<ContinentType, usize>,
    pub tiles_with_resources: usize,
    pub tiles_with_minerals: usize,
    pub tiles_with_animals: usize,
    pub tiles_with_features: usize,
    pub volcanoes: usize,
    pub rivers: usize,
}

impl MapStatistics {
    pub fn collect(tiles: &TileMap) -> Self {
        let mut stats = Self {
            total_tiles: tiles.len(),
            ..Self::default()
        };
        for tile in tiles.values() {
            *stats.terrain_counts.entry(tile.terrain).or_default() += 1;
            if let Some(continent) = tile.continent {
                *stats.continent_counts.entry(continent).or_default() += 1;
            }
            stats.land_tiles += usize::from(tile.terrain.is_land());
            stats.tiles_with_resources += usize::from(!tile.resources.is_empty());
            stats.tiles_with_minerals += usize::from(!tile.minerals.is_empty());
            stats.tiles_with_animals += usize::from(!tile.animals.is_empty());
            stats.tiles_with_features += usize::from(!tile.features.is_empty());
            stats.volcanoes += usize::from(tile.has_volcano);
            stats.rivers += usize::from(tile.has_river);
        }
        stats
    }

    pub fn terrain_count(&self, terrain: TerrainType) -> usize {
        self.terrain_counts.get(&terrain).copied().unwrap_or(0)
    }
}

/// All tiles ordered north to south, then west to east
pub fn sorted_tiles(tiles: &TileMap) -> Vec<&HexTile> {
    let mut sorted: Vec<&HexTile> = tiles.values().collect();
    sorted.sort_by_key(|tile| (tile.coordinates.r, tile.coordinates.q));
    sorted
}

/// Pretty JSON dump of every tile record
pub fn export_tile_registry(tiles: &TileMap) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&sorted_tiles(tiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tile_pos::TilePos;
    use crate::test_utils::{flat_map, plain_tile};

    #[test]
    fn counts_terrain_and_flags() {
        let mut tiles = flat_map(4, 3, TerrainType::Plains);
        let mut volcano = plain_tile(TilePos::new(1, 1), TerrainType::MountainRange);
        volcano.has_volcano = true;
        volcano.features.push(crate::map::tiles::TerrainFeature::Volcano);
        volcano.continent = Some(ContinentType::Brontium);
        tiles.insert(volcano.pos(), volcano);

        let stats = MapStatistics::collect(&tiles);
        assert_eq!(stats.total_tiles, 12);
        assert_eq!(stats.land_tiles, 12);
        assert_eq!(stats.terrain_count(TerrainType::Plains), 11);
        assert_eq!(stats.terrain_count(TerrainType::Ocean), 0);
        assert_eq!(stats.volcanoes, 1);
        assert_eq!(stats.tiles_with_features, 1);
        assert_eq!(stats.continent_counts[&ContinentType::Brontium], 1);
    }

    #[test]
    fn registry_is_row_major() {
        let tiles = flat_map(3, 2, TerrainType::Meadow);
        let json = export_tile_registry(&tiles).unwrap();
        let parsed: Vec<HexTile> = serde_json::from_str(&json).unwrap();
        let order: Vec<(i32, i32)> = parsed
            .iter()
            .map(|t| (t.coordinates.q, t.coordinates.r))
            .collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }
}
