//! Integration tests for world generation
//!
//! These tests run the full generator on a small layout and check the
//! properties every generated world must have.

mod common;

use common::{SEED, sorted_positions, test_config};
use hexworld::map::statistics::export_tile_registry;
use hexworld::map::{
    GridBounds, Hemisphere, MapConfig, MapConfigError, MapStatistics, TerrainType, generate,
};

#[test]
fn test_same_inputs_give_identical_worlds() {
    let config = test_config();
    let first = generate(SEED, 1, &config).unwrap();
    let second = generate(SEED, 1, &config).unwrap();
    assert_eq!(first, second);

    let other = generate(SEED + 1, 1, &config).unwrap();
    assert_ne!(first, other);
}

#[test]
fn test_world_covers_the_grid() {
    let config = test_config();
    let tiles = generate(SEED, 1, &config).unwrap();
    assert_eq!(tiles.len(), (config.width * config.height) as usize);
    for (pos, tile) in &tiles {
        assert!(config.in_bounds(*pos));
        assert_eq!(tile.pos(), *pos);
    }
}

#[test]
fn test_no_open_ocean_touches_land() {
    let config = test_config();
    let tiles = generate(SEED, 1, &config).unwrap();
    let bounds = GridBounds::wrapping(config.width, config.height);

    let stats = MapStatistics::collect(&tiles);
    assert!(stats.land_tiles > 0);
    assert!(stats.terrain_count(TerrainType::Coast) > 0);

    for pos in sorted_positions(&tiles) {
        if tiles[&pos].terrain != TerrainType::Ocean {
            continue;
        }
        for neighbor in bounds.neighbors(pos) {
            assert!(
                !tiles[&neighbor].terrain.is_land(),
                "ocean at {pos} borders land at {neighbor}"
            );
        }
    }
}

#[test]
fn test_tile_fields_stay_in_range() {
    let tiles = generate(SEED, 4, &test_config()).unwrap();
    for tile in tiles.values() {
        assert!((0.0..=10.0).contains(&tile.elevation), "{:?}", tile.coordinates);
        assert!((-50.0..=50.0).contains(&tile.temperature));
        assert!((0.0..=100.0).contains(&tile.rainfall));
        assert!((-90.0..=90.0).contains(&tile.latitude));
        assert_eq!(tile.has_volcano, tile.has_feature(hexworld::map::TerrainFeature::Volcano));
        assert_eq!(tile.has_river, tile.has_feature(hexworld::map::TerrainFeature::River));
        if tile.terrain.is_water() {
            assert!(tile.features.is_empty());
        }
    }
}

#[test]
fn test_hemispheres_see_opposite_seasons() {
    let config = test_config();
    let january = generate(SEED, 1, &config).unwrap();
    let july = generate(SEED, 7, &config).unwrap();

    for (pos, tile) in &january {
        let later = &july[pos];
        assert_eq!(tile.terrain, later.terrain);
        match tile.hemisphere {
            Hemisphere::Equatorial => assert!(tile.season.is_none()),
            _ => assert_eq!(later.season, tile.season.map(|s| s.opposite())),
        }
    }
}

#[test]
fn test_registry_export_lists_every_tile() {
    let config = MapConfig::empty(12, 8);
    let tiles = generate(SEED, 1, &config).unwrap();
    let json = export_tile_registry(&tiles).unwrap();

    let records: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(records.len(), 96);
    assert_eq!(records[0]["coordinates"]["q"], 0);
    assert_eq!(records[0]["coordinates"]["r"], 0);
    assert!(records[0].get("hasVolcano").is_some());
}

#[test]
fn test_bad_layout_is_rejected() {
    let config = MapConfig::empty(0, 10);
    assert_eq!(
        generate(SEED, 1, &config),
        Err(MapConfigError::NonPositiveDimensions {
            width: 0,
            height: 10
        })
    );
}
