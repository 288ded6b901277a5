//! Deterministic resource, animal and mineral placement.
//!
//! `distribute` is a pure function of the tile's terrain, features, latitude,
//! coordinates and the world seed. It is used by world generation and by the
//! "resources only" editor path, so rerunning it on an unchanged tile always
//! reproduces the same sets.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::map::calendar::LatitudeBand;
use crate::map::terrain_gen::tile_seed;
use crate::map::tiles::{HexTile, TerrainFeature, TerrainType};

/// RNG stream reserved for resource rolls
const RESOURCE_STREAM: u64 = 0x5EED_0001;

/// Harvestable surface resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalResource {
    Wood,
    Fish,
    Whales,
    Crabs,
    Wheat,
    Cotton,
    Spices,
    Legumes,
    Flax,
    Corn,
    Dates,
    OilWell,
}

/// Static list of all natural resources for easy iteration.
pub const ALL_NATURAL_RESOURCES: &[NaturalResource] = &[
    NaturalResource::Wood,
    NaturalResource::Fish,
    NaturalResource::Whales,
    NaturalResource::Crabs,
    NaturalResource::Wheat,
    NaturalResource::Cotton,
    NaturalResource::Spices,
    NaturalResource::Legumes,
    NaturalResource::Flax,
    NaturalResource::Corn,
    NaturalResource::Dates,
    NaturalResource::OilWell,
];

impl NaturalResource {
    pub fn as_str(self) -> &'static str {
        match self {
            NaturalResource::Wood => "wood",
            NaturalResource::Fish => "fish",
            NaturalResource::Whales => "whales",
            NaturalResource::Crabs => "crabs",
            NaturalResource::Wheat => "wheat",
            NaturalResource::Cotton => "cotton",
            NaturalResource::Spices => "spices",
            NaturalResource::Legumes => "legumes",
            NaturalResource::Flax => "flax",
            NaturalResource::Corn => "corn",
            NaturalResource::Dates => "dates",
            NaturalResource::OilWell => "oil_well",
        }
    }

    /// Crops that can be laid out as farmland
    pub fn is_farmable(self) -> bool {
        matches!(
            self,
            NaturalResource::Wheat
                | NaturalResource::Cotton
                | NaturalResource::Spices
                | NaturalResource::Legumes
                | NaturalResource::Flax
                | NaturalResource::Corn
                | NaturalResource::Dates
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalType {
    Horses,
    Sheep,
    Buffalo,
    Muffon,
    Yaks,
    Camels,
    WildCattle,
    WildHorse,
    WildCamel,
    WildYak,
    Boar,
    Wolf,
    Jackal,
    WildCat,
    WildDog,
    WildDonkey,
}

/// Static list of all animals for easy iteration.
pub const ALL_ANIMALS: &[AnimalType] = &[
    AnimalType::Horses,
    AnimalType::Sheep,
    AnimalType::Buffalo,
    AnimalType::Muffon,
    AnimalType::Yaks,
    AnimalType::Camels,
    AnimalType::WildCattle,
    AnimalType::WildHorse,
    AnimalType::WildCamel,
    AnimalType::WildYak,
    AnimalType::Boar,
    AnimalType::Wolf,
    AnimalType::Jackal,
    AnimalType::WildCat,
    AnimalType::WildDog,
    AnimalType::WildDonkey,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MineralType {
    Gold,
    Silver,
    Iron,
    Tin,
    Bronze,
    Copper,
    Stone,
    Gems,
    Galena,
    Zinc,
    Nickel,
    Cobalt,
    Laterite,
    Cassiterite,
    Limestone,
    Marble,
}

/// Static list of all minerals for easy iteration.
pub const ALL_MINERALS: &[MineralType] = &[
    MineralType::Gold,
    MineralType::Silver,
    MineralType::Iron,
    MineralType::Tin,
    MineralType::Bronze,
    MineralType::Copper,
    MineralType::Stone,
    MineralType::Gems,
    MineralType::Galena,
    MineralType::Zinc,
    MineralType::Nickel,
    MineralType::Cobalt,
    MineralType::Laterite,
    MineralType::Cassiterite,
    MineralType::Limestone,
    MineralType::Marble,
];

impl MineralType {
    pub fn as_str(self) -> &'static str {
        match self {
            MineralType::Gold => "gold",
            MineralType::Silver => "silver",
            MineralType::Iron => "iron",
            MineralType::Tin => "tin",
            MineralType::Bronze => "bronze",
            MineralType::Copper => "copper",
            MineralType::Stone => "stone",
            MineralType::Gems => "gems",
            MineralType::Galena => "galena",
            MineralType::Zinc => "zinc",
            MineralType::Nickel => "nickel",
            MineralType::Cobalt => "cobalt",
            MineralType::Laterite => "laterite",
            MineralType::Cassiterite => "cassiterite",
            MineralType::Limestone => "limestone",
            MineralType::Marble => "marble",
        }
    }
}

/// Everything a tile yields, each list sorted and free of duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    pub resources: Vec<NaturalResource>,
    pub animals: Vec<AnimalType>,
    pub minerals: Vec<MineralType>,
}

impl ResourceSet {
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.animals.is_empty() && self.minerals.is_empty()
    }

    /// Overwrites only the resource fields of `tile`
    pub fn apply_to(self, tile: &mut HexTile) {
        tile.resources = self.resources;
        tile.animals = self.animals;
        tile.minerals = self.minerals;
    }

    fn normalize(mut self) -> Self {
        self.resources.sort_unstable();
        self.resources.dedup();
        self.animals.sort_unstable();
        self.animals.dedup();
        self.minerals.sort_unstable();
        self.minerals.dedup();
        self
    }
}

/// One RNG draw per table entry, hit or miss, so the roll sequence never
/// depends on earlier outcomes.
struct Rolls {
    rng: StdRng,
    set: ResourceSet,
}

impl Rolls {
    fn resource(&mut self, resource: NaturalResource, chance: f64) {
        if self.rng.random::<f64>() < chance {
            self.set.resources.push(resource);
        }
    }

    fn animal(&mut self, animal: AnimalType, chance: f64) {
        if self.rng.random::<f64>() < chance {
            self.set.animals.push(animal);
        }
    }

    fn mineral(&mut self, mineral: MineralType, chance: f64) {
        if self.rng.random::<f64>() < chance {
            self.set.minerals.push(mineral);
        }
    }
}

/// Resource, animal and mineral sets for a tile
pub fn distribute(tile: &HexTile, seed: u64) -> ResourceSet {
    let band = LatitudeBand::from_latitude(tile.latitude);
    let mut rolls = Rolls {
        rng: StdRng::seed_from_u64(tile_seed(seed, tile.pos(), RESOURCE_STREAM)),
        set: ResourceSet::default(),
    };

    roll_terrain(&mut rolls, tile.terrain, band);
    for feature in &tile.features {
        roll_feature(&mut rolls, *feature, band);
    }

    rolls.set.normalize()
}

fn roll_terrain(rolls: &mut Rolls, terrain: TerrainType, band: LatitudeBand) {
    use AnimalType as A;
    use LatitudeBand::*;
    use MineralType as M;
    use NaturalResource as R;

    let tropical = band == Tropical;
    let cold = band == Polar;

    match terrain {
        TerrainType::Ocean => {
            rolls.resource(R::Fish, 0.35);
            rolls.resource(R::Whales, if tropical { 0.02 } else { 0.15 });
            rolls.resource(R::Crabs, if cold { 0.0 } else { 0.1 });
            rolls.resource(R::OilWell, 0.02);
        }
        TerrainType::Coast => {
            rolls.resource(R::Fish, 0.6);
            rolls.resource(R::Crabs, if cold { 0.05 } else { 0.3 });
            rolls.resource(R::Whales, if cold { 0.2 } else { 0.05 });
            rolls.resource(R::OilWell, 0.03);
        }
        TerrainType::Plains => {
            rolls.resource(R::Wheat, if tropical { 0.1 } else { 0.4 });
            rolls.resource(R::Corn, if tropical { 0.35 } else { 0.15 });
            rolls.resource(R::Cotton, if cold { 0.0 } else { 0.25 });
            rolls.resource(R::Flax, if tropical { 0.05 } else { 0.2 });
            rolls.resource(R::Legumes, 0.2);
            rolls.resource(R::Spices, if tropical { 0.2 } else { 0.0 });
            rolls.animal(A::Horses, 0.3);
            rolls.animal(A::WildHorse, 0.15);
            rolls.animal(A::WildCattle, 0.2);
            rolls.animal(A::Sheep, 0.2);
            rolls.mineral(M::Stone, 0.2);
            rolls.mineral(M::Iron, 0.1);
            rolls.mineral(M::Copper, 0.08);
            rolls.mineral(M::Limestone, 0.1);
            rolls.mineral(M::Laterite, if tropical { 0.15 } else { 0.0 });
        }
        TerrainType::Meadow => {
            rolls.resource(R::Wheat, if tropical { 0.1 } else { 0.35 });
            rolls.resource(R::Legumes, 0.3);
            rolls.resource(R::Flax, if tropical { 0.05 } else { 0.25 });
            rolls.resource(R::Spices, if tropical { 0.2 } else { 0.0 });
            rolls.animal(A::Sheep, 0.35);
            rolls.animal(A::Horses, 0.25);
            rolls.animal(A::Buffalo, if tropical { 0.25 } else { 0.05 });
            rolls.mineral(M::Limestone, 0.1);
            rolls.mineral(M::Stone, 0.1);
            rolls.mineral(M::Laterite, if tropical { 0.15 } else { 0.0 });
        }
        TerrainType::Hills => {
            rolls.resource(R::Spices, if tropical { 0.1 } else { 0.0 });
            rolls.animal(A::Sheep, 0.3);
            rolls.animal(A::Boar, 0.2);
            rolls.animal(A::Wolf, if tropical { 0.0 } else { 0.15 });
            rolls.animal(A::WildDonkey, 0.1);
            rolls.animal(A::Muffon, 0.1);
            rolls.mineral(M::Iron, 0.3);
            rolls.mineral(M::Copper, 0.25);
            rolls.mineral(M::Tin, 0.15);
            rolls.mineral(M::Silver, 0.1);
            rolls.mineral(M::Gold, 0.06);
            rolls.mineral(M::Galena, 0.1);
            rolls.mineral(M::Zinc, 0.08);
            rolls.mineral(M::Stone, 0.3);
            rolls.mineral(M::Marble, 0.1);
            rolls.mineral(M::Cassiterite, if tropical { 0.08 } else { 0.03 });
        }
        TerrainType::MountainRange => {
            rolls.animal(A::Yaks, if tropical { 0.0 } else { 0.2 });
            rolls.animal(A::WildYak, if tropical { 0.0 } else { 0.15 });
            rolls.animal(A::Wolf, 0.2);
            rolls.animal(A::Muffon, 0.2);
            rolls.mineral(M::Gold, 0.15);
            rolls.mineral(M::Silver, 0.2);
            rolls.mineral(M::Iron, 0.3);
            rolls.mineral(M::Gems, 0.12);
            rolls.mineral(M::Nickel, 0.1);
            rolls.mineral(M::Cobalt, 0.08);
            rolls.mineral(M::Tin, 0.15);
            rolls.mineral(M::Copper, 0.2);
            rolls.mineral(M::Stone, 0.4);
            rolls.mineral(M::Marble, 0.15);
        }
        TerrainType::Tundra => {
            rolls.resource(R::OilWell, 0.06);
            rolls.animal(A::Wolf, 0.25);
            rolls.animal(A::WildYak, 0.1);
            rolls.mineral(M::Nickel, 0.1);
            rolls.mineral(M::Cobalt, 0.08);
            rolls.mineral(M::Iron, 0.1);
        }
        TerrainType::Desert => {
            rolls.resource(R::Dates, if cold { 0.0 } else { 0.3 });
            rolls.resource(R::OilWell, 0.12);
            rolls.animal(A::Camels, 0.3);
            rolls.animal(A::WildCamel, 0.2);
            rolls.animal(A::Jackal, 0.2);
            rolls.animal(A::WildDonkey, 0.15);
            rolls.mineral(M::Gems, 0.05);
            rolls.mineral(M::Copper, 0.1);
            rolls.mineral(M::Gold, 0.05);
            rolls.mineral(M::Stone, 0.2);
        }
        TerrainType::Ice => {
            rolls.animal(A::Wolf, 0.05);
            rolls.resource(R::OilWell, 0.02);
        }
    }
}

fn roll_feature(rolls: &mut Rolls, feature: TerrainFeature, band: LatitudeBand) {
    use AnimalType as A;
    use MineralType as M;
    use NaturalResource as R;

    match feature {
        TerrainFeature::Forest | TerrainFeature::BorealForest => {
            rolls.resource(R::Wood, 0.9);
            rolls.animal(A::Boar, 0.3);
            rolls.animal(A::Wolf, 0.2);
            rolls.animal(A::WildCat, 0.15);
        }
        TerrainFeature::Jungle => {
            rolls.resource(R::Wood, 0.8);
            rolls.resource(R::Spices, 0.35);
            rolls.animal(A::WildCat, 0.3);
            rolls.animal(A::WildDog, 0.2);
            rolls.animal(A::Boar, 0.2);
        }
        TerrainFeature::Swamp => {
            rolls.resource(R::Fish, 0.2);
            rolls.animal(A::Buffalo, 0.2);
            rolls.animal(A::WildDog, 0.1);
        }
        TerrainFeature::Oasis => {
            rolls.resource(R::Dates, 0.8);
            rolls.animal(A::Camels, 0.3);
        }
        TerrainFeature::River => {
            rolls.resource(R::Fish, 0.4);
            rolls.resource(
                R::Wheat,
                if band == LatitudeBand::Temperate { 0.2 } else { 0.0 },
            );
            rolls.animal(A::WildCattle, 0.1);
        }
        TerrainFeature::Volcano => {
            rolls.mineral(M::Gems, 0.2);
            rolls.mineral(M::Gold, 0.1);
            rolls.mineral(M::Stone, 0.3);
        }
        TerrainFeature::Mountain => {
            rolls.mineral(M::Bronze, 0.03);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tile_pos::TilePos;
    use crate::test_utils::plain_tile;

    #[test]
    fn distribution_is_reproducible() {
        let tile = plain_tile(TilePos::new(12, 30), TerrainType::Hills);
        assert_eq!(distribute(&tile, 42), distribute(&tile, 42));
    }

    #[test]
    fn output_is_sorted_and_unique() {
        for q in 0..200 {
            let mut tile = plain_tile(TilePos::new(q, 7), TerrainType::Plains);
            tile.features = vec![TerrainFeature::Forest, TerrainFeature::River];
            let set = distribute(&tile, 9);
            assert!(set.resources.windows(2).all(|w| w[0] < w[1]));
            assert!(set.animals.windows(2).all(|w| w[0] < w[1]));
            assert!(set.minerals.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn ice_never_yields_crops() {
        for q in 0..200 {
            let tile = plain_tile(TilePos::new(q, 0), TerrainType::Ice);
            let set = distribute(&tile, 5);
            assert!(set.resources.iter().all(|r| !r.is_farmable()));
            assert!(set.minerals.is_empty());
        }
    }

    #[test]
    fn different_seeds_eventually_differ() {
        let differs = (0..50).any(|q| {
            let tile = plain_tile(TilePos::new(q, 3), TerrainType::MountainRange);
            distribute(&tile, 1) != distribute(&tile, 2)
        });
        assert!(differs);
    }

    #[test]
    fn forests_usually_carry_wood() {
        let with_wood = (0..100)
            .filter(|q| {
                let mut tile = plain_tile(TilePos::new(*q, 1), TerrainType::Plains);
                tile.features = vec![TerrainFeature::Forest];
                distribute(&tile, 77).resources.contains(&NaturalResource::Wood)
            })
            .count();
        assert!(with_wood > 70, "only {with_wood} of 100 forests had wood");
    }

    #[test]
    fn names_match_serde() {
        for resource in ALL_NATURAL_RESOURCES {
            let json = serde_json::to_string(resource).unwrap();
            assert_eq!(json, format!("\"{}\"", resource.as_str()));
        }
        for mineral in ALL_MINERALS {
            let json = serde_json::to_string(mineral).unwrap();
            assert_eq!(json, format!("\"{}\"", mineral.as_str()));
        }
        assert_eq!(ALL_ANIMALS.len(), 16);
    }
}
