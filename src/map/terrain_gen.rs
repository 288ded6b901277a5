use std::f64::consts::TAU;

use noise::{NoiseFn, Perlin};

use crate::constants::{
    DESERT_MAX_RAINFALL, DESERT_MIN_TEMPERATURE, DRY_BELT_LATITUDE, EQUATOR_TEMPERATURE,
    HILLS_ELEVATION, ICE_TEMPERATURE, LAPSE_RATE_PER_UNIT, MEADOW_RAINFALL, MOUNTAIN_ELEVATION,
    POLE_TEMPERATURE, SEA_LEVEL, TUNDRA_TEMPERATURE,
};
use crate::map::tile_pos::TilePos;
use crate::map::tiles::TerrainType;

/// Raw climate values for one tile before classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub elevation: f64,
    pub temperature: f64,
    pub rainfall: f64,
}

/// Additive adjustments applied by continent and island placement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClimateBias {
    pub elevation: f64,
    pub temperature: f64,
    pub rainfall: f64,
}

impl ClimateBias {
    pub fn new(elevation: f64, temperature: f64, rainfall: f64) -> Self {
        Self {
            elevation,
            temperature,
            rainfall,
        }
    }
}

impl std::ops::Add for ClimateBias {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.elevation + other.elevation,
            self.temperature + other.temperature,
            self.rainfall + other.rainfall,
        )
    }
}

/// Seeded noise fields sampled on a cylinder so that they tile seamlessly
/// across the east-west wrap.
pub struct TerrainGenerator {
    map_width: i32,
    elevation_noise: Perlin,
    ridge_noise: Perlin,
    moisture_noise: Perlin,
    temperature_noise: Perlin,
    coastline_noise: Perlin,
    river_noise: Perlin,
}

impl TerrainGenerator {
    pub fn new(seed: u64, map_width: i32) -> Self {
        let base = (seed ^ (seed >> 32)) as u32;
        Self {
            map_width: map_width.max(1),
            // Use different seeds for each noise layer for variety
            elevation_noise: Perlin::new(base),
            ridge_noise: Perlin::new(base.wrapping_add(500)),
            moisture_noise: Perlin::new(base.wrapping_add(1000)),
            temperature_noise: Perlin::new(base.wrapping_add(2000)),
            coastline_noise: Perlin::new(base.wrapping_add(3000)),
            river_noise: Perlin::new(base.wrapping_add(4000)),
        }
    }

    /// Point on a cylinder wrapping once around `q`; `frequency` is the number
    /// of noise cells around the equator.
    fn cylinder_point(&self, pos: TilePos, frequency: f64) -> [f64; 3] {
        let width = f64::from(self.map_width);
        let angle = TAU * f64::from(pos.q) / width;
        let radius = frequency / TAU;
        [
            radius * angle.cos(),
            radius * angle.sin(),
            f64::from(pos.r) * frequency / width,
        ]
    }

    /// Noise value normalized to [0, 1]
    fn sample01(&self, noise: &Perlin, pos: TilePos, frequency: f64) -> f64 {
        ((noise.get(self.cylinder_point(pos, frequency)) + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// Sea floor height before any landmass is raised; stays below sea level
    pub fn base_elevation(&self, pos: TilePos) -> f64 {
        1.0 + 1.9 * self.sample01(&self.elevation_noise, pos, 12.0)
    }

    /// Extra height for mountain ridges inside landmasses
    pub fn ridge(&self, pos: TilePos) -> f64 {
        let n = self.sample01(&self.ridge_noise, pos, 30.0);
        ((n - 0.55) * 10.0).max(0.0)
    }

    /// Signed jitter in [-1, 1] used to roughen continent edges
    pub fn coastline_jitter(&self, pos: TilePos) -> f64 {
        self.coastline_noise.get(self.cylinder_point(pos, 40.0)).clamp(-1.0, 1.0)
    }

    /// Close to 1.0 along narrow noise valleys where rivers run
    pub fn river_strength(&self, pos: TilePos) -> f64 {
        1.0 - self.river_noise.get(self.cylinder_point(pos, 25.0)).abs()
    }

    /// Full climate sample for a tile at `latitude` after placement bias
    pub fn sample(&self, pos: TilePos, latitude: f64, uplift: f64, bias: ClimateBias) -> ClimateSample {
        let elevation = (self.base_elevation(pos) + uplift + bias.elevation).clamp(0.0, 10.0);

        // Colder toward the poles, with most of the drop beyond the tropics
        let polar_fraction = (latitude.abs() / 90.0).powi(2);
        let sea_level_temp =
            EQUATOR_TEMPERATURE - (EQUATOR_TEMPERATURE - POLE_TEMPERATURE) * polar_fraction;
        let temp_jitter = (self.sample01(&self.temperature_noise, pos, 16.0) - 0.5) * 12.0;
        let altitude = (elevation - SEA_LEVEL).max(0.0);
        let temperature = (sea_level_temp + temp_jitter - LAPSE_RATE_PER_UNIT * altitude
            + bias.temperature)
            .clamp(-50.0, 50.0);

        let moisture = self.sample01(&self.moisture_noise, pos, 18.0);
        let dry_belt = 25.0 * (-((latitude.abs() - DRY_BELT_LATITUDE) / 10.0).powi(2)).exp();
        let equatorial_wet = 15.0 * (-(latitude / 10.0).powi(2)).exp();
        let rainfall =
            (20.0 + 60.0 * moisture - dry_belt + equatorial_wet + bias.rainfall).clamp(0.0, 100.0);

        ClimateSample {
            elevation,
            temperature,
            rainfall,
        }
    }
}

/// Classify terrain from a climate sample. Total: every input maps to exactly
/// one terrain; NaN fields fall through to plains.
pub fn classify_terrain(sample: &ClimateSample) -> TerrainType {
    let ClimateSample {
        elevation,
        temperature,
        rainfall,
    } = *sample;

    if elevation < SEA_LEVEL {
        return TerrainType::Ocean;
    }
    if temperature <= ICE_TEMPERATURE {
        return TerrainType::Ice;
    }
    if elevation >= MOUNTAIN_ELEVATION {
        return TerrainType::MountainRange;
    }
    if temperature <= TUNDRA_TEMPERATURE {
        return TerrainType::Tundra;
    }
    if elevation >= HILLS_ELEVATION {
        return TerrainType::Hills;
    }
    if rainfall < DESERT_MAX_RAINFALL && temperature >= DESERT_MIN_TEMPERATURE {
        return TerrainType::Desert;
    }
    if rainfall >= MEADOW_RAINFALL {
        return TerrainType::Meadow;
    }
    TerrainType::Plains
}

/// Mixes a world seed, a tile and a stream salt into one RNG seed
pub fn tile_seed(seed: u64, pos: TilePos, salt: u64) -> u64 {
    let mut x = seed
        ^ (pos.q as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (pos.r as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ salt.wrapping_mul(0x1656_67B1_9E37_79F9);
    // splitmix64 finalizer
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
