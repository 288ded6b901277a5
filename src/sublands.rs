//! On-demand subdivision of one macro tile into a dense sub-hex grid.
//!
//! Sub-lands are derived entirely from the parent's effective tile plus the
//! coastal and river hints taken from its neighbours. They are not persisted:
//! every visit regenerates the same grid from the same parent state.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::{
    BASE_MOVEMENT_COST, COAST_INNER_BAND, COAST_OUTER_BAND, FARMLAND_PATCH_RADIUS,
    MINE_CLUSTER_RADIUS, NAVIGABLE_RIVER_WIDTH, SUBLAND_GRID_SIZE,
};
use crate::map::terrain_gen::tile_seed;
use crate::map::tile_pos::{GridBounds, TilePos, axial_to_pixel, neighbors};
use crate::map::tiles::{HexTile, TerrainFeature, TerrainType};
use crate::map::world_gen::TileMap;
use crate::pathfinding::TraversableMap;
use crate::resources::{ALL_MINERALS, ALL_NATURAL_RESOURCES, MineralType, NaturalResource};

const MINE_STREAM: u64 = 0x5B1A_0001;
const FARMLAND_STREAM: u64 = 0x5B1A_0002;
const RIVER_STREAM: u64 = 0x5B1A_0003;

/// Placement attempts before a cluster is dropped
const PLACEMENT_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubLandBiome {
    Plains,
    Forest,
    Jungle,
    Swamp,
    Hills,
    Mountain,
    Desert,
    Tundra,
    Ice,
    Water,
}

impl SubLandBiome {
    /// Biome of a parent tile: vegetation first, then base terrain
    pub fn for_parent(tile: &HexTile) -> Self {
        match tile.vegetation() {
            Some(TerrainFeature::Jungle) => return SubLandBiome::Jungle,
            Some(TerrainFeature::Swamp) => return SubLandBiome::Swamp,
            Some(TerrainFeature::Forest | TerrainFeature::BorealForest) => {
                return SubLandBiome::Forest;
            }
            _ => {}
        }
        match tile.terrain {
            TerrainType::Plains | TerrainType::Meadow => SubLandBiome::Plains,
            TerrainType::Hills => SubLandBiome::Hills,
            TerrainType::MountainRange => SubLandBiome::Mountain,
            TerrainType::Desert => SubLandBiome::Desert,
            TerrainType::Tundra => SubLandBiome::Tundra,
            TerrainType::Ice => SubLandBiome::Ice,
            TerrainType::Ocean | TerrainType::Coast => SubLandBiome::Water,
        }
    }

    /// Days to enter a sub-land cell; water needs a boat
    pub fn movement_cost(self) -> Option<f64> {
        match self {
            SubLandBiome::Plains => Some(BASE_MOVEMENT_COST),
            SubLandBiome::Forest | SubLandBiome::Hills => Some(1.5),
            SubLandBiome::Jungle
            | SubLandBiome::Swamp
            | SubLandBiome::Desert
            | SubLandBiome::Tundra => Some(2.0),
            SubLandBiome::Mountain | SubLandBiome::Ice => Some(3.0),
            SubLandBiome::Water => None,
        }
    }

    fn suits_crop(self, crop: NaturalResource) -> bool {
        use NaturalResource as R;
        match self {
            SubLandBiome::Plains => crop.is_farmable(),
            SubLandBiome::Forest => matches!(crop, R::Wheat | R::Flax | R::Legumes),
            SubLandBiome::Hills => matches!(crop, R::Wheat | R::Legumes | R::Spices),
            SubLandBiome::Jungle => matches!(crop, R::Spices | R::Corn),
            SubLandBiome::Swamp => matches!(crop, R::Corn),
            SubLandBiome::Desert => matches!(crop, R::Dates | R::Cotton),
            _ => false,
        }
    }
}

/// What a sub-land cell is used for. Serialized as `none`, `coastal_land`,
/// `coastal_inland`, `mine_<mineral>` or `farmland_<resource>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SubLandResource {
    #[default]
    None,
    CoastalLand,
    CoastalInland,
    Mine(MineralType),
    Farmland(NaturalResource),
}

impl SubLandResource {
    pub fn is_none(&self) -> bool {
        *self == SubLandResource::None
    }
}

impl fmt::Display for SubLandResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubLandResource::None => f.write_str("none"),
            SubLandResource::CoastalLand => f.write_str("coastal_land"),
            SubLandResource::CoastalInland => f.write_str("coastal_inland"),
            SubLandResource::Mine(mineral) => write!(f, "mine_{}", mineral.as_str()),
            SubLandResource::Farmland(crop) => write!(f, "farmland_{}", crop.as_str()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sub-land resource '{0}'")]
pub struct ParseSubLandResourceError(String);

impl FromStr for SubLandResource {
    type Err = ParseSubLandResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseSubLandResourceError(s.to_string());
        match s {
            "none" => Ok(SubLandResource::None),
            "coastal_land" => Ok(SubLandResource::CoastalLand),
            "coastal_inland" => Ok(SubLandResource::CoastalInland),
            _ => {
                if let Some(name) = s.strip_prefix("mine_") {
                    ALL_MINERALS
                        .iter()
                        .find(|m| m.as_str() == name)
                        .map(|m| SubLandResource::Mine(*m))
                        .ok_or_else(unknown)
                } else if let Some(name) = s.strip_prefix("farmland_") {
                    ALL_NATURAL_RESOURCES
                        .iter()
                        .find(|r| r.as_str() == name && r.is_farmable())
                        .map(|r| SubLandResource::Farmland(*r))
                        .ok_or_else(unknown)
                } else {
                    Err(unknown())
                }
            }
        }
    }
}

impl From<SubLandResource> for String {
    fn from(resource: SubLandResource) -> Self {
        resource.to_string()
    }
}

impl TryFrom<String> for SubLandResource {
    type Error = ParseSubLandResourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One cell of the sub-hex grid, in its parent's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubLand {
    pub q: i32,
    pub r: i32,
    pub parent_q: i32,
    pub parent_r: i32,
    pub biome_type: SubLandBiome,
    pub resource_type: SubLandResource,
    pub has_river: bool,
    pub is_navigable_river: bool,
}

impl SubLand {
    pub fn pos(&self) -> TilePos {
        TilePos::new(self.q, self.r)
    }

    pub fn parent(&self) -> TilePos {
        TilePos::new(self.parent_q, self.parent_r)
    }
}

/// Parent edge (neighbour direction index 0..6) that faces open water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoastalHint {
    pub direction: u8,
}

/// A river crossing the parent tile from one edge to another. When
/// `entry == exit` the river runs between that edge and the tile centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiverHint {
    pub entry: u8,
    pub exit: u8,
    /// 0.0 (trickle) to 1.0 (full river)
    pub flow: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum SubLandError {
    #[error("parent tile is at {actual} but sub-lands were requested for {requested}")]
    ParentMismatch { requested: TilePos, actual: TilePos },
    #[error("sub-land {pos} lies outside the {size}x{size} grid")]
    OutOfGrid { pos: TilePos, size: i32 },
    #[error("neighbour direction {0} is not in 0..6")]
    InvalidDirection(u8),
}

/// Dense sub-land grid for one parent tile
#[derive(Debug, Clone, PartialEq)]
pub struct SubLandGrid {
    parent: TilePos,
    size: i32,
    cells: Vec<SubLand>,
}

impl SubLandGrid {
    pub fn parent(&self) -> TilePos {
        self.parent
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// Sub-land grids never wrap
    pub fn bounds(&self) -> GridBounds {
        GridBounds::bounded(self.size, self.size)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        self.bounds().contains(pos)
    }

    pub fn get(&self, pos: TilePos) -> Option<&SubLand> {
        self.contains(pos)
            .then(|| self.cells.get((pos.r * self.size + pos.q) as usize))
            .flatten()
    }

    /// Bounds-checked lookup
    pub fn locate(&self, pos: TilePos) -> Result<&SubLand, SubLandError> {
        self.get(pos).ok_or(SubLandError::OutOfGrid {
            pos,
            size: self.size,
        })
    }

    pub fn cells(&self) -> &[SubLand] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<SubLand> {
        self.cells
    }

    /// Cell counts per resource category
    pub fn resource_counts(&self) -> HashMap<SubLandResource, usize> {
        let mut counts = HashMap::new();
        for cell in &self.cells {
            *counts.entry(cell.resource_type).or_insert(0) += 1;
        }
        counts
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then_some((pos.r * self.size + pos.q) as usize)
    }
}

impl TraversableMap for SubLandGrid {
    type Terrain = SubLandBiome;

    fn terrain_at(&self, pos: TilePos) -> Option<SubLandBiome> {
        self.get(pos).map(|cell| cell.biome_type)
    }

    fn movement_cost(&self, pos: TilePos) -> Option<f64> {
        let cell = self.get(pos)?;
        if cell.is_navigable_river {
            // Boats carry travellers along the channel
            return Some(BASE_MOVEMENT_COST);
        }
        let cost = cell.biome_type.movement_cost()?;
        Some(if cell.has_river { cost + 0.5 } else { cost })
    }

    fn positions(&self) -> Vec<TilePos> {
        self.cells.iter().map(SubLand::pos).collect()
    }
}

/// Position of each cell relative to the grid centre, split into six
/// sectors matching the parent's neighbour directions.
struct Footprint {
    /// (sector, normalized distance toward that sector's edge) per cell
    cells: Vec<(usize, f64)>,
    /// Outermost cell of each sector
    edge_cells: [TilePos; 6],
    centre: TilePos,
}

impl Footprint {
    fn new(size: i32) -> Self {
        let directions = neighbors(TilePos::new(0, 0)).map(|d| {
            let (x, y) = axial_to_pixel(d.q, d.r, 1.0);
            let len = (x * x + y * y).sqrt();
            (x / len, y / len)
        });
        let last = size - 1;
        let corners =
            [(0, 0), (last, 0), (0, last), (last, last)].map(|(q, r)| axial_to_pixel(q, r, 1.0));
        let cx = corners.iter().map(|c| c.0).sum::<f64>() / 4.0;
        let cy = corners.iter().map(|c| c.1).sum::<f64>() / 4.0;

        let mut projections = Vec::with_capacity((size * size) as usize);
        let mut sector_max = [f64::EPSILON; 6];
        let mut edge_cells = [TilePos::new(size / 2, size / 2); 6];
        for r in 0..size {
            for q in 0..size {
                let (x, y) = axial_to_pixel(q, r, 1.0);
                let (vx, vy) = (x - cx, y - cy);
                let (sector, projection) = directions
                    .iter()
                    .map(|(dx, dy)| vx * dx + vy * dy)
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (i, p)| {
                        if p > best.1 { (i, p) } else { best }
                    });
                if projection > sector_max[sector] {
                    sector_max[sector] = projection;
                    edge_cells[sector] = TilePos::new(q, r);
                }
                projections.push((sector, projection));
            }
        }

        let cells = projections
            .into_iter()
            .map(|(sector, p)| (sector, (p / sector_max[sector]).clamp(0.0, 1.0)))
            .collect();

        Self {
            cells,
            edge_cells,
            centre: TilePos::new(size / 2, size / 2),
        }
    }
}

/// Stable per-parent seed derived from its effective state
fn parent_seed(parent: &HexTile) -> u64 {
    parent.elevation.to_bits()
        ^ parent.rainfall.to_bits().rotate_left(17)
        ^ parent.temperature.to_bits().rotate_left(31)
}

/// Generate the sub-land cells of `parent`, which must sit at
/// `(parent_q, parent_r)`.
pub fn generate_sub_lands_for_hex(
    parent: &HexTile,
    parent_q: i32,
    parent_r: i32,
    coastal_hints: &[CoastalHint],
    river_hints: &[RiverHint],
) -> Result<Vec<SubLand>, SubLandError> {
    generate_sub_land_grid(parent, parent_q, parent_r, coastal_hints, river_hints)
        .map(SubLandGrid::into_cells)
}

/// Same as [`generate_sub_lands_for_hex`], keeping the grid wrapper
pub fn generate_sub_land_grid(
    parent: &HexTile,
    parent_q: i32,
    parent_r: i32,
    coastal_hints: &[CoastalHint],
    river_hints: &[RiverHint],
) -> Result<SubLandGrid, SubLandError> {
    let requested = TilePos::new(parent_q, parent_r);
    if parent.pos() != requested {
        return Err(SubLandError::ParentMismatch {
            requested,
            actual: parent.pos(),
        });
    }
    for direction in coastal_hints
        .iter()
        .map(|h| h.direction)
        .chain(river_hints.iter().flat_map(|h| [h.entry, h.exit]))
    {
        if direction >= 6 {
            return Err(SubLandError::InvalidDirection(direction));
        }
    }

    let size = SUBLAND_GRID_SIZE;
    let footprint = Footprint::new(size);
    let seed = parent_seed(parent);

    // (a) parent biome everywhere
    let biome = SubLandBiome::for_parent(parent);
    let mut grid = SubLandGrid {
        parent: requested,
        size,
        cells: Vec::with_capacity((size * size) as usize),
    };
    for r in 0..size {
        for q in 0..size {
            grid.cells.push(SubLand {
                q,
                r,
                parent_q,
                parent_r,
                biome_type: biome,
                resource_type: SubLandResource::None,
                has_river: false,
                is_navigable_river: false,
            });
        }
    }

    // (b) coastline bands facing oceanic neighbours
    if biome != SubLandBiome::Water {
        mark_coast(&mut grid, &footprint, coastal_hints);
    }

    // (c) one mine cluster per mineral
    for mineral in &parent.minerals {
        let salt = MINE_STREAM ^ ((*mineral as u64) << 8);
        let claimed = place_cluster(
            &mut grid,
            tile_seed(seed, requested, salt),
            MINE_CLUSTER_RADIUS,
            SubLandResource::Mine(*mineral),
        );
        debug!("Mine cluster for {} claimed {} cells", mineral.as_str(), claimed);
    }

    // (d) farmland where the biome suits the crop
    for crop in parent
        .resources
        .iter()
        .filter(|r| r.is_farmable() && biome.suits_crop(**r))
    {
        let salt = FARMLAND_STREAM ^ ((*crop as u64) << 8);
        place_cluster(
            &mut grid,
            tile_seed(seed, requested, salt),
            FARMLAND_PATCH_RADIUS,
            SubLandResource::Farmland(*crop),
        );
    }

    // (e) rivers
    let mut rng = StdRng::seed_from_u64(tile_seed(seed, requested, RIVER_STREAM));
    let implicit;
    let river_hints = if river_hints.is_empty() && parent.has_river {
        let entry = rng.random_range(0..6u8);
        implicit = [RiverHint {
            entry,
            exit: (entry + 3) % 6,
            flow: river_flow(parent),
        }];
        &implicit[..]
    } else {
        river_hints
    };
    for hint in river_hints {
        trace_river(&mut grid, &footprint, hint, &mut rng);
    }

    Ok(grid)
}

fn mark_coast(grid: &mut SubLandGrid, footprint: &Footprint, hints: &[CoastalHint]) {
    let mut facing = [false; 6];
    for hint in hints {
        facing[hint.direction as usize] = true;
    }
    for (cell, (sector, depth)) in grid.cells.iter_mut().zip(&footprint.cells) {
        if !facing[*sector] {
            continue;
        }
        if *depth >= COAST_OUTER_BAND {
            cell.resource_type = SubLandResource::CoastalLand;
        } else if *depth >= COAST_INNER_BAND {
            cell.resource_type = SubLandResource::CoastalInland;
        }
    }
}

/// Claims unclaimed cells around a seeded interior centre. Returns how many
/// cells were claimed (0 if no free centre was found).
fn place_cluster(grid: &mut SubLandGrid, seed: u64, radius: i32, resource: SubLandResource) -> usize {
    let mut rng = StdRng::seed_from_u64(seed);
    let margin = grid.size / 7;
    let span = margin..(grid.size - margin).max(margin + 1);

    for _ in 0..PLACEMENT_ATTEMPTS {
        let centre = TilePos::new(rng.random_range(span.clone()), rng.random_range(span.clone()));
        let free = grid
            .get(centre)
            .is_some_and(|cell| cell.resource_type.is_none());
        if !free {
            continue;
        }

        let mut claimed = 0;
        for hex in centre.to_hex().range(radius.max(0) as u32) {
            let Some(index) = grid.index(TilePos::from_hex(hex)) else {
                continue;
            };
            let cell = &mut grid.cells[index];
            if cell.resource_type.is_none() {
                cell.resource_type = resource;
                claimed += 1;
            }
        }
        return claimed;
    }
    0
}

fn river_flow(parent: &HexTile) -> f64 {
    (0.4 + 0.6 * parent.rainfall / 100.0).clamp(0.0, 1.0)
}

/// Marks a meandering channel from the entry edge to the exit edge (or to
/// the centre). Width grows with distance travelled.
fn trace_river(grid: &mut SubLandGrid, footprint: &Footprint, hint: &RiverHint, rng: &mut StdRng) {
    let start = footprint.edge_cells[hint.entry as usize];
    let end = if hint.entry == hint.exit {
        footprint.centre
    } else {
        footprint.edge_cells[hint.exit as usize]
    };

    let wobble = grid.size / 12;
    let bend = TilePos::new(
        ((start.q + end.q) / 2 + rng.random_range(-wobble..=wobble)).clamp(1, grid.size - 2),
        ((start.r + end.r) / 2 + rng.random_range(-wobble..=wobble)).clamp(1, grid.size - 2),
    );

    let mut course: Vec<TilePos> = start
        .to_hex()
        .line_to(bend.to_hex())
        .map(TilePos::from_hex)
        .collect();
    course.extend(
        bend.to_hex()
            .line_to(end.to_hex())
            .skip(1)
            .map(TilePos::from_hex),
    );
    course.retain(|pos| grid.contains(*pos));

    let flow = hint.flow.clamp(0.0, 1.0);
    let last = course.len().saturating_sub(1).max(1) as f64;
    for (step, pos) in course.iter().enumerate() {
        let Some(index) = grid.index(*pos) else {
            continue;
        };
        let width = flow * step as f64 / last;
        let cell = &mut grid.cells[index];
        cell.has_river = true;
        cell.is_navigable_river |= width >= NAVIGABLE_RIVER_WIDTH;
    }
}

/// Directions (0..6) from `pos` whose neighbour is open water
pub fn coastal_hints_for(tiles: &TileMap, pos: TilePos, map_width: i32) -> Vec<CoastalHint> {
    neighbors(pos)
        .into_iter()
        .enumerate()
        .filter(|(_, n)| {
            tiles
                .get(&n.wrapped(map_width))
                .is_some_and(|t| t.terrain.is_water())
        })
        .map(|(i, _)| CoastalHint { direction: i as u8 })
        .collect()
}

/// River hints for `pos` from the rivers and water around it
pub fn river_hints_for(tiles: &TileMap, pos: TilePos, map_width: i32) -> Vec<RiverHint> {
    let Some(tile) = tiles.get(&pos.wrapped(map_width)) else {
        return Vec::new();
    };
    if !tile.has_river {
        return Vec::new();
    }

    let around: Vec<(u8, &HexTile)> = neighbors(pos)
        .into_iter()
        .enumerate()
        .filter_map(|(i, n)| tiles.get(&n.wrapped(map_width)).map(|t| (i as u8, t)))
        .collect();
    let river_dirs: Vec<u8> = around
        .iter()
        .filter(|(_, t)| t.has_river)
        .map(|(i, _)| *i)
        .collect();
    let sea_dir = around
        .iter()
        .find(|(_, t)| t.terrain.is_water())
        .map(|(i, _)| *i);

    let flow = river_flow(tile);
    match (river_dirs.as_slice(), sea_dir) {
        ([], Some(sea)) => vec![RiverHint {
            entry: sea,
            exit: sea,
            flow,
        }],
        ([], None) => Vec::new(),
        ([only], Some(sea)) => vec![RiverHint {
            entry: *only,
            exit: sea,
            flow: (flow + 0.2).min(1.0),
        }],
        ([only], None) => vec![RiverHint {
            entry: *only,
            exit: *only,
            flow,
        }],
        ([first, second, rest @ ..], _) => {
            let mut hints = vec![RiverHint {
                entry: *first,
                exit: *second,
                flow,
            }];
            // Tributaries join the main channel
            hints.extend(rest.iter().map(|entry| RiverHint {
                entry: *entry,
                exit: *second,
                flow: flow * 0.5,
            }));
            hints
        }
    }
}

#[cfg(test)]
mod tests;
