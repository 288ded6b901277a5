use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::constants::{
    BOREAL_RAINFALL, BRONTIUM_FOREST_RAINFALL, BRONTIUM_RAINFALL_BONUS, DRANTIUM_JUNGLE_RAINFALL,
    DRANTIUM_RAINFALL_BONUS, DRANTIUM_TEMPERATURE_BONUS, FOREST_RAINFALL, ISLAND_RADIUS,
    JUNGLE_MIN_TEMPERATURE, JUNGLE_RAINFALL, MOUNTAIN_ELEVATION, OASIS_CHANCE, POLAR_CAP_LATITUDE,
    RIVER_MIN_RAINFALL, RIVER_STRENGTH, SWAMP_MAX_ELEVATION, SWAMP_RAINFALL, VOLCANO_CHANCE,
};
use crate::map::calendar::{Hemisphere, latitude, season_for};
use crate::map::config::{ContinentConfig, ContinentType, IslandType, MapConfig, MapConfigError};
use crate::map::terrain_gen::{ClimateBias, TerrainGenerator, classify_terrain, tile_seed};
use crate::map::tile_pos::{GridBounds, HexCoordinates, TilePos};
use crate::map::tiles::{HexTile, TerrainFeature, TerrainType};
use crate::resources::distribute;

/// Sparse tile storage keyed by axial position
pub type TileMap = HashMap<TilePos, HexTile>;

/// RNG stream reserved for feature rolls
const FEATURE_STREAM: u64 = 0xFEA7_0001;

/// What the landmass placements contribute to one tile
#[derive(Debug, Clone, Copy, Default)]
struct Placement {
    uplift: f64,
    bias: ClimateBias,
    continent: Option<ContinentType>,
}

/// Generate the base world. A pure function of `(seed, month, config)`;
/// `month` only affects the season labels.
pub fn generate(seed: u64, month: i32, config: &MapConfig) -> Result<TileMap, MapConfigError> {
    config.validate()?;

    let generator = TerrainGenerator::new(seed, config.width);
    let bounds = GridBounds::wrapping(config.width, config.height);
    let mut tiles = TileMap::with_capacity((config.width as usize) * (config.height as usize));

    for pos in bounds.positions() {
        let lat = latitude(pos.r, config.height);
        let placement = placement_at(&generator, pos, lat, config);
        let sample = generator.sample(pos, lat, placement.uplift, placement.bias);

        tiles.insert(
            pos,
            HexTile {
                coordinates: HexCoordinates::from(pos),
                terrain: classify_terrain(&sample),
                features: Vec::new(),
                resources: Vec::new(),
                animals: Vec::new(),
                minerals: Vec::new(),
                elevation: sample.elevation,
                temperature: sample.temperature,
                rainfall: sample.rainfall,
                has_volcano: false,
                has_river: false,
                continent: placement.continent,
                latitude: lat,
                hemisphere: Hemisphere::from_latitude(lat),
                season: None,
            },
        );
    }
    debug!("Classified {} tiles", tiles.len());

    let coastal = add_coastal_tiles(&mut tiles, config);
    debug!("Coastal pass reclassified {} tiles", coastal);

    for tile in tiles.values_mut() {
        assign_features(tile, &generator, seed);
        distribute(tile, seed).apply_to(tile);
        tile.season = season_for(tile.latitude, month);
    }

    let land = tiles.values().filter(|t| t.terrain.is_land()).count();
    info!(
        "Generated world with seed {}: {}x{} ({} tiles, {} land)",
        seed,
        config.width,
        config.height,
        tiles.len(),
        land
    );

    Ok(tiles)
}

/// Reclassify every ocean tile that touches land as coast.
/// Idempotent, and never changes a land tile. Returns how many tiles changed.
pub fn add_coastal_tiles(tiles: &mut TileMap, config: &MapConfig) -> usize {
    add_coastal_tiles_where(tiles, config, |_| true)
}

/// Coastal pass restricted to tiles accepted by `eligible`
pub fn add_coastal_tiles_where(
    tiles: &mut TileMap,
    config: &MapConfig,
    mut eligible: impl FnMut(TilePos) -> bool,
) -> usize {
    let bounds = GridBounds::wrapping(config.width, config.height);
    let mut to_coast: Vec<TilePos> = tiles
        .iter()
        .filter(|(_, tile)| tile.terrain == TerrainType::Ocean)
        .filter(|(pos, _)| {
            bounds
                .neighbors(**pos)
                .any(|n| tiles.get(&n).is_some_and(|t| t.terrain.is_land()))
        })
        .map(|(pos, _)| *pos)
        .collect();
    to_coast.retain(|pos| eligible(*pos));

    for pos in &to_coast {
        if let Some(tile) = tiles.get_mut(pos) {
            tile.terrain = TerrainType::Coast;
        }
    }
    to_coast.len()
}

fn placement_at(
    generator: &TerrainGenerator,
    pos: TilePos,
    lat: f64,
    config: &MapConfig,
) -> Placement {
    let mut placement = Placement::default();

    // Closest continent wins when extents overlap
    let jitter = generator.coastline_jitter(pos);
    let nearest = config
        .continents
        .iter()
        .map(|c| (c, continent_distance(pos, c, config.width) + 0.2 * jitter))
        .filter(|(_, d)| *d < 1.0)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((continent, d)) = nearest {
        placement.uplift = 1.6 + 2.4 * (1.0 - d).sqrt() + generator.ridge(pos);
        placement.continent = Some(continent.continent_type);
        placement.bias = match continent.continent_type {
            ContinentType::Drantium => {
                ClimateBias::new(0.0, DRANTIUM_TEMPERATURE_BONUS, DRANTIUM_RAINFALL_BONUS)
            }
            ContinentType::Brontium => ClimateBias::new(0.0, 0.0, BRONTIUM_RAINFALL_BONUS),
        };
    }

    let bounds = GridBounds::wrapping(config.width, config.height);
    for island in &config.islands {
        let d = f64::from(bounds.distance(pos, island.center()));
        if d > ISLAND_RADIUS {
            continue;
        }
        let falloff = 1.0 - d / (ISLAND_RADIUS + 1.0);
        placement.uplift = placement.uplift.max(1.4 + 2.0 * falloff);
        placement.bias = placement.bias + island_bias(island.island_type);
    }

    if lat.abs() >= POLAR_CAP_LATITUDE {
        placement.uplift = placement.uplift.max(2.0);
    }

    placement
}

/// Normalized elliptic distance from a continent's centre; below 1.0 is inside
fn continent_distance(pos: TilePos, continent: &ContinentConfig, map_width: i32) -> f64 {
    let half = map_width / 2;
    let dq = (pos.q - continent.center_q + half).rem_euclid(map_width) - half;
    let dr = pos.r - continent.center_r;
    // Shear axial offsets so the ellipse is upright on screen
    let dx = f64::from(dq) + f64::from(dr) / 2.0;
    let dy = f64::from(dr);
    let rx = f64::from(continent.width) / 2.0;
    let ry = f64::from(continent.height) / 2.0;
    ((dx / rx).powi(2) + (dy / ry).powi(2)).sqrt()
}

fn island_bias(island_type: IslandType) -> ClimateBias {
    match island_type {
        IslandType::Desert => ClimateBias::new(0.0, 6.0, -45.0),
        IslandType::Tundra => ClimateBias::new(0.0, -35.0, 0.0),
        IslandType::Jungle => ClimateBias::new(0.0, 6.0, 35.0),
        IslandType::Forest => ClimateBias::new(0.0, 0.0, 20.0),
        IslandType::MountainRange => ClimateBias::new(4.5, 0.0, 0.0),
    }
}

/// Features in fixed priority: relief, then one vegetation class (or an
/// oasis), then river.
fn assign_features(tile: &mut HexTile, generator: &TerrainGenerator, seed: u64) {
    let pos = tile.pos();
    let mut rng = StdRng::seed_from_u64(tile_seed(seed, pos, FEATURE_STREAM));
    let volcano_roll: f64 = rng.random();
    let oasis_roll: f64 = rng.random();

    let mut features = Vec::new();
    if tile.terrain == TerrainType::MountainRange {
        features.push(if volcano_roll < VOLCANO_CHANCE {
            TerrainFeature::Volcano
        } else {
            TerrainFeature::Mountain
        });
    }

    if let Some(vegetation) = vegetation_for(tile) {
        features.push(vegetation);
    } else if tile.terrain == TerrainType::Desert && oasis_roll < OASIS_CHANCE {
        features.push(TerrainFeature::Oasis);
    }

    if tile.terrain.is_land()
        && tile.terrain != TerrainType::Ice
        && tile.elevation < MOUNTAIN_ELEVATION
        && tile.rainfall >= RIVER_MIN_RAINFALL
        && generator.river_strength(pos) >= RIVER_STRENGTH
    {
        features.push(TerrainFeature::River);
    }

    tile.features = features;
    tile.sync_feature_flags();
}

fn vegetation_for(tile: &HexTile) -> Option<TerrainFeature> {
    let lowland = matches!(tile.terrain, TerrainType::Plains | TerrainType::Meadow);
    if !lowland && !matches!(tile.terrain, TerrainType::Hills | TerrainType::Tundra) {
        return None;
    }

    let jungle_rainfall = match tile.continent {
        Some(ContinentType::Drantium) => DRANTIUM_JUNGLE_RAINFALL,
        _ => JUNGLE_RAINFALL,
    };
    let forest_rainfall = match tile.continent {
        Some(ContinentType::Brontium) => BRONTIUM_FOREST_RAINFALL,
        _ => FOREST_RAINFALL,
    };
    let (temp, rain) = (tile.temperature, tile.rainfall);
    let tundra = tile.terrain == TerrainType::Tundra;

    if lowland && rain >= SWAMP_RAINFALL && tile.elevation < SWAMP_MAX_ELEVATION && temp >= 5.0 {
        Some(TerrainFeature::Swamp)
    } else if !tundra && temp >= JUNGLE_MIN_TEMPERATURE && rain >= jungle_rainfall {
        Some(TerrainFeature::Jungle)
    } else if temp > -15.0 && temp < 5.0 && rain >= BOREAL_RAINFALL {
        Some(TerrainFeature::BorealForest)
    } else if !tundra && temp >= 5.0 && rain >= forest_rainfall {
        Some(TerrainFeature::Forest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::config::IslandConfig;
    use crate::test_utils::plain_tile;

    fn small_config() -> MapConfig {
        MapConfig::empty(48, 32).with_continent(ContinentConfig {
            center_q: 24,
            center_r: 16,
            width: 20,
            height: 14,
            continent_type: ContinentType::Drantium,
        })
    }

    #[test]
    fn generation_covers_every_position() {
        let config = small_config();
        let tiles = generate(1, 1, &config).unwrap();
        assert_eq!(tiles.len(), 48 * 32);
        for (pos, tile) in &tiles {
            assert!(config.in_bounds(*pos));
            assert_eq!(tile.pos(), *pos);
        }
    }

    #[test]
    fn continent_centre_is_land_and_tagged() {
        let tiles = generate(5, 1, &small_config()).unwrap();
        let centre = &tiles[&TilePos::new(24, 16)];
        assert!(centre.terrain.is_land());
        assert_eq!(centre.continent, Some(ContinentType::Drantium));
    }

    #[test]
    fn month_only_changes_seasons() {
        let config = small_config();
        let january = generate(11, 1, &config).unwrap();
        let july = generate(11, 7, &config).unwrap();
        for (pos, a) in &january {
            let b = &july[pos];
            assert_eq!(a.terrain, b.terrain);
            assert_eq!(a.features, b.features);
            assert_eq!(a.resources, b.resources);
            assert_eq!(a.elevation, b.elevation);
            if a.season.is_some() {
                assert_ne!(a.season, b.season);
            }
        }
    }

    #[test]
    fn extreme_months_are_folded_not_rejected() {
        let config = MapConfig::empty(8, 8);
        let april = generate(42, 4, &config).unwrap();
        assert_eq!(generate(42, i32::MIN, &config).unwrap(), april);
        assert!(generate(42, i32::MAX, &config).is_ok());
    }

    #[test]
    fn invalid_config_fails_before_generation() {
        assert!(generate(1, 1, &MapConfig::empty(0, 5)).is_err());
    }

    #[test]
    fn mountain_island_rises_above_sea() {
        let config = MapConfig::empty(40, 30).with_island(IslandConfig {
            center_q: 20,
            center_r: 15,
            island_type: IslandType::MountainRange,
        });
        let tiles = generate(3, 1, &config).unwrap();
        assert!(tiles[&TilePos::new(20, 15)].terrain.is_land());
        assert_eq!(tiles[&TilePos::new(20, 15)].continent, None);
    }

    #[test]
    fn coastal_pass_is_idempotent_and_leaves_land_alone() {
        let config = MapConfig::empty(6, 6);
        let mut tiles = TileMap::new();
        for q in 0..6 {
            for r in 0..6 {
                let pos = TilePos::new(q, r);
                tiles.insert(pos, plain_tile(pos, TerrainType::Ocean));
            }
        }
        tiles.insert(TilePos::new(3, 3), plain_tile(TilePos::new(3, 3), TerrainType::Plains));

        let changed = add_coastal_tiles(&mut tiles, &config);
        assert_eq!(changed, 6);
        assert_eq!(tiles[&TilePos::new(3, 3)].terrain, TerrainType::Plains);
        assert_eq!(add_coastal_tiles(&mut tiles, &config), 0);
    }

    #[test]
    fn volcano_pre_empts_mountain() {
        let tiles = generate(8, 1, &MapConfig::earth()).unwrap();
        for tile in tiles.values() {
            assert!(!(tile.has_feature(TerrainFeature::Volcano)
                && tile.has_feature(TerrainFeature::Mountain)));
            assert_eq!(tile.has_volcano, tile.has_feature(TerrainFeature::Volcano));
            assert_eq!(tile.has_river, tile.has_feature(TerrainFeature::River));
        }
    }

    #[test]
    fn vegetation_priority() {
        let mut tile = plain_tile(TilePos::new(0, 0), TerrainType::Plains);
        tile.temperature = 26.0;
        tile.rainfall = 85.0;
        tile.elevation = 3.5;
        assert_eq!(vegetation_for(&tile), Some(TerrainFeature::Swamp));

        tile.elevation = 5.0;
        assert_eq!(vegetation_for(&tile), Some(TerrainFeature::Jungle));

        tile.rainfall = 55.0;
        assert_eq!(vegetation_for(&tile), Some(TerrainFeature::Forest));
        tile.continent = Some(ContinentType::Drantium);
        assert_eq!(vegetation_for(&tile), Some(TerrainFeature::Jungle));

        tile.terrain = TerrainType::Tundra;
        tile.temperature = -8.0;
        assert_eq!(vegetation_for(&tile), Some(TerrainFeature::BorealForest));

        tile.terrain = TerrainType::Desert;
        assert_eq!(vegetation_for(&tile), None);
    }
}
