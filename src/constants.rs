//! World constants and tuning values
//!
//! This module centralizes the thresholds, sizes and costs used by generation,
//! sub-land drill-down and pathfinding. Changing a classification threshold
//! changes every generated world, so treat these as part of the save format.

// ============================================================================
// MAP CONSTANTS
// ============================================================================

/// Reference planet width (hexes around the equator)
pub const EARTH_MAP_WIDTH: i32 = 420;

/// Reference planet height (hexes from pole to pole)
pub const EARTH_MAP_HEIGHT: i32 = 220;

/// Reference hex size in kilometres
pub const EARTH_HEX_SIZE_KM: f64 = 100.0;

/// Default seed used by the CLI when nothing is locked or passed
pub const DEFAULT_WORLD_SEED: u64 = 42;

/// Months in a calendar year
pub const MONTHS_PER_YEAR: u32 = 12;

// ============================================================================
// CLIMATE CONSTANTS
// ============================================================================

/// Tiles within this many degrees of the equator are equatorial
pub const EQUATORIAL_BAND_DEGREES: f64 = 5.0;

/// Tropical band edge (absolute latitude)
pub const TROPIC_LATITUDE: f64 = 23.5;

/// Polar band edge (absolute latitude)
pub const POLAR_LATITUDE: f64 = 60.0;

/// Latitude beyond which the polar caps raise land
pub const POLAR_CAP_LATITUDE: f64 = 78.0;

/// Sea-level temperature at the equator (celsius)
pub const EQUATOR_TEMPERATURE: f64 = 30.0;

/// Sea-level temperature at the poles (celsius)
pub const POLE_TEMPERATURE: f64 = -35.0;

/// Temperature drop per elevation unit above sea level
pub const LAPSE_RATE_PER_UNIT: f64 = 3.5;

/// Latitude of the subtropical dry belts
pub const DRY_BELT_LATITUDE: f64 = 25.0;

// ============================================================================
// TERRAIN CLASSIFICATION THRESHOLDS
// ============================================================================

/// Elevation below which a tile is water
pub const SEA_LEVEL: f64 = 3.0;

/// Elevation at or above which land is a mountain range
pub const MOUNTAIN_ELEVATION: f64 = 8.0;

/// Elevation at or above which land is hills
pub const HILLS_ELEVATION: f64 = 6.5;

/// Land at or below this temperature is ice
pub const ICE_TEMPERATURE: f64 = -20.0;

/// Land at or below this temperature is tundra
pub const TUNDRA_TEMPERATURE: f64 = -5.0;

/// Desert needs less rain than this...
pub const DESERT_MAX_RAINFALL: f64 = 20.0;

/// ...and at least this warmth
pub const DESERT_MIN_TEMPERATURE: f64 = 18.0;

/// Rainfall at or above which lowland is meadow instead of plains
pub const MEADOW_RAINFALL: f64 = 55.0;

// ============================================================================
// PLACEMENT CONSTANTS
// ============================================================================

/// Radius (in hexes) of an island placement
pub const ISLAND_RADIUS: f64 = 5.0;

/// Rainfall bonus inside Drantium
pub const DRANTIUM_RAINFALL_BONUS: f64 = 15.0;

/// Temperature bonus inside Drantium
pub const DRANTIUM_TEMPERATURE_BONUS: f64 = 2.0;

/// Rainfall bonus inside Brontium
pub const BRONTIUM_RAINFALL_BONUS: f64 = 8.0;

/// Chance that a mountain-range peak is a volcano
pub const VOLCANO_CHANCE: f64 = 0.08;

/// Chance that a desert tile carries an oasis
pub const OASIS_CHANCE: f64 = 0.05;

// ============================================================================
// FEATURE THRESHOLDS
// ============================================================================

/// Rainfall needed for jungle on warm lowland
pub const JUNGLE_RAINFALL: f64 = 65.0;

/// Jungle rainfall threshold inside Drantium
pub const DRANTIUM_JUNGLE_RAINFALL: f64 = 50.0;

/// Minimum temperature for jungle
pub const JUNGLE_MIN_TEMPERATURE: f64 = 22.0;

/// Rainfall needed for temperate forest
pub const FOREST_RAINFALL: f64 = 50.0;

/// Forest rainfall threshold inside Brontium
pub const BRONTIUM_FOREST_RAINFALL: f64 = 38.0;

/// Rainfall needed for boreal forest in cold climates
pub const BOREAL_RAINFALL: f64 = 35.0;

/// Rainfall needed for swamp on low, flat land
pub const SWAMP_RAINFALL: f64 = 80.0;

/// Swamps only form below this elevation
pub const SWAMP_MAX_ELEVATION: f64 = 4.0;

/// River noise strength at or above which a tile carries a river
pub const RIVER_STRENGTH: f64 = 0.97;

/// Rivers need at least this much rain upstream
pub const RIVER_MIN_RAINFALL: f64 = 30.0;

// ============================================================================
// SUB-LAND CONSTANTS
// ============================================================================

/// Side length of the sub-land grid inside one macro tile
pub const SUBLAND_GRID_SIZE: i32 = 100;

/// Normalized radius where the coastal_inland band starts
pub const COAST_INNER_BAND: f64 = 0.70;

/// Normalized radius where the coastal_land band starts
pub const COAST_OUTER_BAND: f64 = 0.85;

/// Radius of a mine cluster (sub-hexes)
pub const MINE_CLUSTER_RADIUS: i32 = 2;

/// Radius of a farmland patch (sub-hexes)
pub const FARMLAND_PATCH_RADIUS: i32 = 4;

/// River width at which a channel becomes navigable
pub const NAVIGABLE_RIVER_WIDTH: f64 = 0.5;

// ============================================================================
// MOVEMENT CONSTANTS
// ============================================================================

/// Days to enter open lowland (plains/meadow) at speed 1.0
pub const BASE_MOVEMENT_COST: f64 = 1.0;

/// Maximum number of nodes A* may expand before giving up
pub const DEFAULT_EXPANSION_CAP: usize = 120_000;
