use super::*;
use crate::pathfinding::PathfindingSystem;
use crate::test_utils::{assert_valid_path, flat_map, plain_tile};

fn parent(terrain: TerrainType) -> HexTile {
    plain_tile(TilePos::new(12, 34), terrain)
}

fn grid_for(tile: &HexTile, coast: &[CoastalHint], rivers: &[RiverHint]) -> SubLandGrid {
    generate_sub_land_grid(tile, tile.coordinates.q, tile.coordinates.r, coast, rivers).unwrap()
}

#[test]
fn test_grid_is_dense_and_tagged_with_parent() {
    let tile = parent(TerrainType::Plains);
    let cells = generate_sub_lands_for_hex(&tile, 12, 34, &[], &[]).unwrap();
    assert_eq!(cells.len(), (SUBLAND_GRID_SIZE * SUBLAND_GRID_SIZE) as usize);
    assert!(cells.iter().all(|c| c.parent() == TilePos::new(12, 34)));
    assert!(cells.iter().all(|c| c.biome_type == SubLandBiome::Plains));
    assert!(cells.iter().all(|c| c.resource_type.is_none() && !c.has_river));
}

#[test]
fn test_wrong_parent_is_rejected() {
    let tile = parent(TerrainType::Plains);
    assert_eq!(
        generate_sub_lands_for_hex(&tile, 1, 1, &[], &[]),
        Err(SubLandError::ParentMismatch {
            requested: TilePos::new(1, 1),
            actual: TilePos::new(12, 34),
        })
    );
    assert_eq!(
        generate_sub_lands_for_hex(&tile, 12, 34, &[CoastalHint { direction: 6 }], &[]),
        Err(SubLandError::InvalidDirection(6))
    );
}

#[test]
fn test_generation_is_deterministic() {
    let mut tile = parent(TerrainType::Hills);
    tile.minerals = vec![MineralType::Iron, MineralType::Gold];
    tile.resources = vec![NaturalResource::Wheat];
    tile.has_river = true;
    tile.features = vec![TerrainFeature::River];
    let coast = [CoastalHint { direction: 2 }];
    assert_eq!(grid_for(&tile, &coast, &[]), grid_for(&tile, &coast, &[]));
}

#[test]
fn test_vegetation_sets_biome() {
    let mut tile = parent(TerrainType::Plains);
    tile.features = vec![TerrainFeature::Jungle];
    assert_eq!(SubLandBiome::for_parent(&tile), SubLandBiome::Jungle);
    tile.features = vec![TerrainFeature::BorealForest];
    assert_eq!(SubLandBiome::for_parent(&tile), SubLandBiome::Forest);
    assert_eq!(
        SubLandBiome::for_parent(&parent(TerrainType::MountainRange)),
        SubLandBiome::Mountain
    );
}

#[test]
fn test_coast_only_on_hinted_side() {
    let tile = parent(TerrainType::Plains);
    let grid = grid_for(&tile, &[CoastalHint { direction: 0 }], &[]);
    let counts = grid.resource_counts();
    let outer = counts.get(&SubLandResource::CoastalLand).copied().unwrap_or(0);
    let inner = counts.get(&SubLandResource::CoastalInland).copied().unwrap_or(0);
    assert!(outer > 0 && inner > 0);

    // Direction 0 is east (+q): the coast sits on the high-q side
    let centre = SUBLAND_GRID_SIZE / 2;
    for cell in grid.cells() {
        if cell.resource_type == SubLandResource::CoastalLand {
            assert!(cell.q + cell.r / 2 > centre, "coast cell {:?} on the wrong side", cell.pos());
        }
    }

    let no_coast = grid_for(&tile, &[], &[]);
    assert!(no_coast.cells().iter().all(|c| c.resource_type.is_none()));
}

#[test]
fn test_water_parent_has_no_coastal_band() {
    let tile = parent(TerrainType::Ocean);
    let grid = grid_for(&tile, &[CoastalHint { direction: 1 }], &[]);
    assert!(grid.cells().iter().all(|c| c.biome_type == SubLandBiome::Water));
    assert!(grid.cells().iter().all(|c| c.resource_type.is_none()));
}

#[test]
fn test_every_mineral_gets_a_mine() {
    let mut tile = parent(TerrainType::MountainRange);
    tile.minerals = vec![MineralType::Gold, MineralType::Silver, MineralType::Gems];
    let counts = grid_for(&tile, &[], &[]).resource_counts();
    for mineral in &tile.minerals {
        let cells = counts.get(&SubLandResource::Mine(*mineral)).copied().unwrap_or(0);
        assert!(cells > 0, "no mine for {mineral:?}");
        assert!(cells <= 19, "cluster for {mineral:?} too large");
    }
}

#[test]
fn test_farmland_needs_suitable_biome() {
    let mut tile = parent(TerrainType::Plains);
    tile.resources = vec![NaturalResource::Wheat, NaturalResource::Fish];
    let counts = grid_for(&tile, &[], &[]).resource_counts();
    assert!(counts.contains_key(&SubLandResource::Farmland(NaturalResource::Wheat)));
    assert!(!counts.keys().any(|r| r.to_string() == "farmland_fish"));

    let mut desert = parent(TerrainType::Desert);
    desert.resources = vec![NaturalResource::Wheat, NaturalResource::Dates];
    let counts = grid_for(&desert, &[], &[]).resource_counts();
    assert!(!counts.contains_key(&SubLandResource::Farmland(NaturalResource::Wheat)));
    assert!(counts.contains_key(&SubLandResource::Farmland(NaturalResource::Dates)));
}

#[test]
fn test_river_runs_edge_to_edge_and_widens() {
    let tile = parent(TerrainType::Plains);
    let hint = RiverHint {
        entry: 3,
        exit: 0,
        flow: 1.0,
    };
    let grid = grid_for(&tile, &[], &[hint]);
    let river: Vec<&SubLand> = grid.cells().iter().filter(|c| c.has_river).collect();
    assert!(river.len() > SUBLAND_GRID_SIZE as usize / 2);

    let navigable = river.iter().filter(|c| c.is_navigable_river).count();
    assert!(navigable > 0 && navigable < river.len());
    assert!(grid.cells().iter().all(|c| c.has_river || !c.is_navigable_river));
}

#[test]
fn test_trickle_is_never_navigable() {
    let tile = parent(TerrainType::Plains);
    let hint = RiverHint {
        entry: 1,
        exit: 4,
        flow: 0.3,
    };
    let grid = grid_for(&tile, &[], &[hint]);
    assert!(grid.cells().iter().any(|c| c.has_river));
    assert!(grid.cells().iter().all(|c| !c.is_navigable_river));
}

#[test]
fn test_parent_river_without_hints_still_draws_one() {
    let mut tile = parent(TerrainType::Meadow);
    tile.features = vec![TerrainFeature::River];
    tile.sync_feature_flags();
    let grid = grid_for(&tile, &[], &[]);
    assert!(grid.cells().iter().any(|c| c.has_river));
}

#[test]
fn test_resource_names_round_trip() {
    for name in ["none", "coastal_land", "coastal_inland", "mine_gold", "farmland_oil_well"] {
        let parsed = name.parse::<SubLandResource>();
        if name == "farmland_oil_well" {
            assert!(parsed.is_err());
        } else {
            assert_eq!(parsed.unwrap().to_string(), name);
        }
    }
    let json = serde_json::to_string(&SubLandResource::Farmland(NaturalResource::Wheat)).unwrap();
    assert_eq!(json, "\"farmland_wheat\"");
    let back: SubLandResource = serde_json::from_str("\"mine_cobalt\"").unwrap();
    assert_eq!(back, SubLandResource::Mine(MineralType::Cobalt));
}

#[test]
fn test_lookup_is_bounds_checked() {
    let grid = grid_for(&parent(TerrainType::Plains), &[], &[]);
    assert!(grid.locate(TilePos::new(0, 0)).is_ok());
    assert_eq!(
        grid.locate(TilePos::new(SUBLAND_GRID_SIZE, 0)),
        Err(SubLandError::OutOfGrid {
            pos: TilePos::new(SUBLAND_GRID_SIZE, 0),
            size: SUBLAND_GRID_SIZE,
        })
    );
    assert!(grid.get(TilePos::new(-1, 5)).is_none());

    let bounds = grid.bounds();
    assert!(!bounds.wraps);
    let east_edge = TilePos::new(SUBLAND_GRID_SIZE - 1, 5);
    assert!(bounds.neighbors(east_edge).all(|n| grid.get(n).is_some()));
    assert_eq!(bounds.positions().count(), grid.cells().len());
}

#[test]
fn test_pathfinding_inside_sub_lands() {
    let grid = grid_for(&parent(TerrainType::Plains), &[], &[]);
    let pathfinder = PathfindingSystem::new();
    let path = pathfinder
        .find_path(TilePos::new(0, 0), TilePos::new(10, 0), &grid)
        .unwrap();
    assert_eq!(path.len(), 11);
    assert_valid_path(&path);
    assert_eq!(
        pathfinder.calculate_path_travel_time(&path, &grid, 1.0),
        Some(10.0)
    );
    assert!(pathfinder
        .find_path(TilePos::new(0, 0), TilePos::new(SUBLAND_GRID_SIZE, 0), &grid)
        .is_none());
}

#[test]
fn test_hints_from_effective_map() {
    let mut tiles = flat_map(6, 6, TerrainType::Plains);
    let pos = TilePos::new(2, 2);
    let east = neighbors(pos)[0];
    tiles.get_mut(&east).unwrap().terrain = TerrainType::Coast;

    let hints = coastal_hints_for(&tiles, pos, 6);
    assert_eq!(hints, vec![CoastalHint { direction: 0 }]);

    // River entering from the west and reaching the sea to the east
    let west = neighbors(pos)[3];
    for p in [pos, west] {
        let tile = tiles.get_mut(&p).unwrap();
        tile.features = vec![TerrainFeature::River];
        tile.sync_feature_flags();
    }
    let rivers = river_hints_for(&tiles, pos, 6);
    assert_eq!(rivers.len(), 1);
    assert_eq!((rivers[0].entry, rivers[0].exit), (3, 0));

    assert!(river_hints_for(&tiles, TilePos::new(5, 5), 6).is_empty());
}
