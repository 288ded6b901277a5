use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{EARTH_HEX_SIZE_KM, EARTH_MAP_HEIGHT, EARTH_MAP_WIDTH};
use crate::map::tile_pos::TilePos;

/// Named continents with their own climate signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinentType {
    /// Hot and wet, skews toward jungle
    Drantium,
    /// Temperate and wet, skews toward forest
    Brontium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IslandType {
    Desert,
    Tundra,
    Jungle,
    Forest,
    MountainRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentConfig {
    pub center_q: i32,
    pub center_r: i32,
    pub width: i32,
    pub height: i32,
    #[serde(rename = "type")]
    pub continent_type: ContinentType,
}

impl ContinentConfig {
    pub fn center(&self) -> TilePos {
        TilePos::new(self.center_q, self.center_r)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandConfig {
    pub center_q: i32,
    pub center_r: i32,
    #[serde(rename = "type")]
    pub island_type: IslandType,
}

impl IslandConfig {
    pub fn center(&self) -> TilePos {
        TilePos::new(self.center_q, self.center_r)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MapConfigError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    NonPositiveDimensions { width: i32, height: i32 },
    #[error("hex size must be a positive number of kilometres, got {0}")]
    InvalidHexSize(f64),
    #[error("continent {index} centre ({q},{r}) lies outside the map")]
    ContinentOutOfBounds { index: usize, q: i32, r: i32 },
    #[error("continent {index} has non-positive extent {width}x{height}")]
    ContinentExtent {
        index: usize,
        width: i32,
        height: i32,
    },
    #[error("island {index} centre ({q},{r}) lies outside the map")]
    IslandOutOfBounds { index: usize, q: i32, r: i32 },
}

/// Planet layout: size, scale and landmass placements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    pub hex_size_km: f64,
    #[serde(default)]
    pub continents: Vec<ContinentConfig>,
    #[serde(default)]
    pub islands: Vec<IslandConfig>,
}

impl MapConfig {
    /// The reference planet with both named continents
    pub fn earth() -> Self {
        Self {
            width: EARTH_MAP_WIDTH,
            height: EARTH_MAP_HEIGHT,
            hex_size_km: EARTH_HEX_SIZE_KM,
            continents: vec![
                ContinentConfig {
                    center_q: 140,
                    center_r: 93,
                    width: 70,
                    height: 70,
                    continent_type: ContinentType::Drantium,
                },
                ContinentConfig {
                    center_q: 280,
                    center_r: 110,
                    width: 70,
                    height: 70,
                    continent_type: ContinentType::Brontium,
                },
            ],
            islands: Vec::new(),
        }
    }

    /// Ocean-only world of the given size
    pub fn empty(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            hex_size_km: EARTH_HEX_SIZE_KM,
            continents: Vec::new(),
            islands: Vec::new(),
        }
    }

    pub fn with_continent(mut self, continent: ContinentConfig) -> Self {
        self.continents.push(continent);
        self
    }

    pub fn with_island(mut self, island: IslandConfig) -> Self {
        self.islands.push(island);
        self
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.q >= 0 && pos.q < self.width && pos.r >= 0 && pos.r < self.height
    }

    pub fn validate(&self) -> Result<(), MapConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(MapConfigError::NonPositiveDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.hex_size_km.is_finite() || self.hex_size_km <= 0.0 {
            return Err(MapConfigError::InvalidHexSize(self.hex_size_km));
        }
        for (index, continent) in self.continents.iter().enumerate() {
            if !self.in_bounds(continent.center()) {
                return Err(MapConfigError::ContinentOutOfBounds {
                    index,
                    q: continent.center_q,
                    r: continent.center_r,
                });
            }
            if continent.width <= 0 || continent.height <= 0 {
                return Err(MapConfigError::ContinentExtent {
                    index,
                    width: continent.width,
                    height: continent.height,
                });
            }
        }
        for (index, island) in self.islands.iter().enumerate() {
            if !self.in_bounds(island.center()) {
                return Err(MapConfigError::IslandOutOfBounds {
                    index,
                    q: island.center_q,
                    r: island.center_r,
                });
            }
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::earth()
    }
}
