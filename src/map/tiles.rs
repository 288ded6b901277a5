use serde::{Deserialize, Serialize};

use crate::constants::BASE_MOVEMENT_COST;
use crate::map::calendar::{Hemisphere, Season};
use crate::map::config::ContinentType;
use crate::map::tile_pos::{HexCoordinates, TilePos};
use crate::resources::{AnimalType, MineralType, NaturalResource};

/// Base terrain of a macro tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Ocean,
    Coast,
    Plains,
    Meadow,
    Hills,
    MountainRange,
    Tundra,
    Desert,
    Ice,
}

/// Static list of all terrain types for easy iteration.
pub const ALL_TERRAIN: &[TerrainType] = &[
    TerrainType::Ocean,
    TerrainType::Coast,
    TerrainType::Plains,
    TerrainType::Meadow,
    TerrainType::Hills,
    TerrainType::MountainRange,
    TerrainType::Tundra,
    TerrainType::Desert,
    TerrainType::Ice,
];

/// Properties that affect travel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainProperties {
    pub movement_cost: f64, // Days to enter at speed 1.0
    pub is_passable: bool,  // Can land units enter
    pub is_navigable: bool, // Can ships enter
}

impl TerrainType {
    /// Open water (ocean or its coastal shelf)
    pub fn is_water(self) -> bool {
        matches!(self, TerrainType::Ocean | TerrainType::Coast)
    }

    pub fn is_land(self) -> bool {
        !self.is_water()
    }

    pub fn properties(self) -> TerrainProperties {
        match self {
            TerrainType::Ocean | TerrainType::Coast => TerrainProperties {
                movement_cost: BASE_MOVEMENT_COST,
                is_passable: false, // Need ships
                is_navigable: true,
            },
            TerrainType::Plains | TerrainType::Meadow => TerrainProperties {
                movement_cost: BASE_MOVEMENT_COST,
                is_passable: true,
                is_navigable: false,
            },
            TerrainType::Hills => TerrainProperties {
                movement_cost: 1.5,
                is_passable: true,
                is_navigable: false,
            },
            TerrainType::Desert | TerrainType::Tundra => TerrainProperties {
                movement_cost: 2.0,
                is_passable: true,
                is_navigable: false,
            },
            TerrainType::MountainRange | TerrainType::Ice => TerrainProperties {
                movement_cost: 3.0,
                is_passable: true,
                is_navigable: false,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TerrainType::Ocean => "ocean",
            TerrainType::Coast => "coast",
            TerrainType::Plains => "plains",
            TerrainType::Meadow => "meadow",
            TerrainType::Hills => "hills",
            TerrainType::MountainRange => "mountain_range",
            TerrainType::Tundra => "tundra",
            TerrainType::Desert => "desert",
            TerrainType::Ice => "ice",
        }
    }
}

impl core::fmt::Display for TerrainType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Characteristics that sit on top of the base terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainFeature {
    Forest,
    Jungle,
    BorealForest,
    Oasis,
    Volcano,
    Mountain,
    River,
    Swamp,
}

impl TerrainFeature {
    /// Extra days spent entering a tile with this feature
    pub fn movement_surcharge(self) -> f64 {
        match self {
            TerrainFeature::Forest | TerrainFeature::BorealForest => 0.5,
            TerrainFeature::Jungle | TerrainFeature::Swamp => 1.0,
            _ => 0.0,
        }
    }

    pub fn is_vegetation(self) -> bool {
        matches!(
            self,
            TerrainFeature::Forest
                | TerrainFeature::Jungle
                | TerrainFeature::BorealForest
                | TerrainFeature::Swamp
        )
    }
}

/// One macro tile of the world map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexTile {
    pub coordinates: HexCoordinates,
    pub terrain: TerrainType,
    pub features: Vec<TerrainFeature>,
    pub resources: Vec<NaturalResource>,
    pub animals: Vec<AnimalType>,
    pub minerals: Vec<MineralType>,
    pub elevation: f64,   // 0-10
    pub temperature: f64, // -50 to 50 celsius
    pub rainfall: f64,    // 0-100
    pub has_volcano: bool,
    pub has_river: bool,
    pub continent: Option<ContinentType>,
    pub latitude: f64, // -90 to 90 degrees
    pub hemisphere: Hemisphere,
    pub season: Option<Season>,
}

impl HexTile {
    pub fn pos(&self) -> TilePos {
        self.coordinates.pos()
    }

    pub fn has_feature(&self, feature: TerrainFeature) -> bool {
        self.features.contains(&feature)
    }

    /// First vegetation feature, if any
    pub fn vegetation(&self) -> Option<TerrainFeature> {
        self.features.iter().copied().find(|f| f.is_vegetation())
    }

    /// Keeps the volcano/river flags in step with the feature list
    pub fn sync_feature_flags(&mut self) {
        self.has_volcano = self.has_feature(TerrainFeature::Volcano);
        self.has_river = self.has_feature(TerrainFeature::River);
    }

    /// Days to enter this tile by land, `None` when impassable
    pub fn land_movement_cost(&self) -> Option<f64> {
        let props = self.terrain.properties();
        if !props.is_passable {
            return None;
        }
        let surcharge: f64 = self.features.iter().map(|f| f.movement_surcharge()).sum();
        Some(props.movement_cost + surcharge)
    }

    /// Days to enter this tile by ship, `None` when not navigable
    pub fn naval_movement_cost(&self) -> Option<f64> {
        let props = self.terrain.properties();
        props.is_navigable.then_some(props.movement_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::plain_tile;

    #[test]
    fn water_and_land_partition_terrain() {
        for terrain in ALL_TERRAIN {
            assert_ne!(terrain.is_water(), terrain.is_land());
        }
        assert!(TerrainType::Coast.is_water());
        assert!(TerrainType::Ice.is_land());
    }

    #[test]
    fn every_movement_cost_is_at_least_one() {
        for terrain in ALL_TERRAIN {
            assert!(terrain.properties().movement_cost >= 1.0);
        }
    }

    #[test]
    fn features_add_to_land_cost() {
        let mut tile = plain_tile(TilePos::new(0, 0), TerrainType::Plains);
        assert_eq!(tile.land_movement_cost(), Some(1.0));
        tile.features.push(TerrainFeature::Jungle);
        assert_eq!(tile.land_movement_cost(), Some(2.0));
        assert_eq!(tile.naval_movement_cost(), None);
    }

    #[test]
    fn flags_follow_features() {
        let mut tile = plain_tile(TilePos::new(0, 0), TerrainType::MountainRange);
        tile.features = vec![TerrainFeature::Volcano, TerrainFeature::River];
        tile.sync_feature_flags();
        assert!(tile.has_volcano);
        assert!(tile.has_river);
    }

    #[test]
    fn terrain_names_match_serde() {
        for terrain in ALL_TERRAIN {
            let json = serde_json::to_string(terrain).unwrap();
            assert_eq!(json, format!("\"{}\"", terrain.as_str()));
        }
    }
}
