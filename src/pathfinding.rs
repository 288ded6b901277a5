use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use tracing::{debug, warn};

use crate::constants::{BASE_MOVEMENT_COST, DEFAULT_EXPANSION_CAP};
use crate::map::tile_pos::{TilePos, hex_distance, neighbors, wrap_coordinates, wrapped_distance};
use crate::map::tiles::TerrainType;
use crate::map::world_gen::TileMap;

/// A grid the pathfinder can walk: macro tiles or sub-lands
pub trait TraversableMap {
    type Terrain: Copy + Ord + Debug;

    fn terrain_at(&self, pos: TilePos) -> Option<Self::Terrain>;

    /// Days to enter `pos` at speed 1.0; `None` if impassable or off the map
    fn movement_cost(&self, pos: TilePos) -> Option<f64>;

    /// Every position on the map
    fn positions(&self) -> Vec<TilePos>;

    /// Horizontal wrap period, if the map wraps
    fn wrap_width(&self) -> Option<i32> {
        None
    }

    fn normalize(&self, pos: TilePos) -> TilePos {
        match self.wrap_width() {
            Some(width) => TilePos::new(wrap_coordinates(pos.q, width), pos.r),
            None => pos,
        }
    }

    fn distance(&self, a: TilePos, b: TilePos) -> i32 {
        match self.wrap_width() {
            Some(width) => wrapped_distance(a, b, width),
            None => hex_distance(a, b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    #[default]
    Land,
    Naval,
}

/// The effective macro map seen by one kind of traveller
#[derive(Debug, Clone, Copy)]
pub struct MacroGrid<'a> {
    tiles: &'a TileMap,
    map_width: i32,
    mode: TravelMode,
}

impl<'a> MacroGrid<'a> {
    pub fn new(tiles: &'a TileMap, map_width: i32) -> Self {
        Self {
            tiles,
            map_width,
            mode: TravelMode::Land,
        }
    }

    pub fn naval(tiles: &'a TileMap, map_width: i32) -> Self {
        Self::new(tiles, map_width).with_mode(TravelMode::Naval)
    }

    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }
}

impl TraversableMap for MacroGrid<'_> {
    type Terrain = TerrainType;

    fn terrain_at(&self, pos: TilePos) -> Option<TerrainType> {
        self.tiles.get(&self.normalize(pos)).map(|tile| tile.terrain)
    }

    fn movement_cost(&self, pos: TilePos) -> Option<f64> {
        let tile = self.tiles.get(&self.normalize(pos))?;
        match self.mode {
            TravelMode::Land => tile.land_movement_cost(),
            TravelMode::Naval => tile.naval_movement_cost(),
        }
    }

    fn positions(&self) -> Vec<TilePos> {
        let mut positions: Vec<TilePos> = self.tiles.keys().copied().collect();
        positions.sort_unstable();
        positions
    }

    fn wrap_width(&self) -> Option<i32> {
        (self.map_width > 0).then_some(self.map_width)
    }
}

#[derive(Debug, Clone)]
pub struct PathfindingNode {
    pub position: TilePos,
    pub cost: f64,
    pub heuristic: f64,
    /// Push order, last tie-breaker
    pub sequence: u64,
}

impl PathfindingNode {
    pub fn total_cost(&self) -> f64 {
        self.cost + self.heuristic
    }
}

impl PartialEq for PathfindingNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathfindingNode {}

impl PartialOrd for PathfindingNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathfindingNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cost()
            .total_cmp(&other.total_cost())
            .then_with(|| self.heuristic.total_cmp(&other.heuristic))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// A* search and route queries with a bounded number of expansions
#[derive(Debug, Clone, Copy)]
pub struct PathfindingSystem {
    expansion_cap: usize,
}

impl Default for PathfindingSystem {
    fn default() -> Self {
        Self {
            expansion_cap: DEFAULT_EXPANSION_CAP,
        }
    }
}

impl PathfindingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expansion_cap(mut self, expansion_cap: usize) -> Self {
        self.expansion_cap = expansion_cap;
        self
    }

    pub fn expansion_cap(&self) -> usize {
        self.expansion_cap
    }

    /// Cheapest route from `origin` to `destination`, both included.
    /// `None` when no finite path exists or the expansion cap is hit.
    pub fn find_path<M: TraversableMap>(
        &self,
        origin: TilePos,
        destination: TilePos,
        map: &M,
    ) -> Option<Vec<TilePos>> {
        let start = map.normalize(origin);
        let goal = map.normalize(destination);
        map.terrain_at(start)?;
        if !self.is_destination_reachable(goal, map) {
            return None;
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
        let mut cost_so_far: HashMap<TilePos, f64> = HashMap::new();
        let mut closed_set = HashSet::new();
        let mut sequence = 0u64;
        let mut expanded = 0usize;

        open_set.push(Reverse(PathfindingNode {
            position: start,
            cost: 0.0,
            heuristic: Self::heuristic(map, start, goal),
            sequence,
        }));
        cost_so_far.insert(start, 0.0);

        while let Some(Reverse(current)) = open_set.pop() {
            if current.position == goal {
                debug!("Path found after expanding {} nodes", expanded);
                return Some(Self::reconstruct_path(&came_from, goal));
            }

            if !closed_set.insert(current.position) {
                continue;
            }

            expanded += 1;
            if expanded > self.expansion_cap {
                warn!(
                    "Pathfinding from {} to {} gave up after {} expansions",
                    start, goal, self.expansion_cap
                );
                return None;
            }

            for neighbor in neighbors(current.position) {
                let neighbor = map.normalize(neighbor);
                if closed_set.contains(&neighbor) {
                    continue;
                }

                let Some(movement_cost) = map.movement_cost(neighbor) else {
                    continue; // Impassable tile
                };

                let tentative_cost = current.cost + movement_cost;
                if let Some(&existing_cost) = cost_so_far.get(&neighbor)
                    && tentative_cost >= existing_cost
                {
                    continue;
                }

                cost_so_far.insert(neighbor, tentative_cost);
                came_from.insert(neighbor, current.position);

                sequence += 1;
                open_set.push(Reverse(PathfindingNode {
                    position: neighbor,
                    cost: tentative_cost,
                    heuristic: Self::heuristic(map, neighbor, goal),
                    sequence,
                }));
            }
        }

        None // No path found
    }

    /// Passability pre-check: a destination nobody can enter is unreachable
    /// from every origin.
    pub fn is_destination_reachable<M: TraversableMap>(&self, coord: TilePos, map: &M) -> bool {
        map.movement_cost(map.normalize(coord)).is_some()
    }

    /// Days to walk `path` at `speed_multiplier`, counting every tile
    /// entered after the first. `None` if a step is impassable or the speed
    /// is not positive.
    pub fn calculate_path_travel_time<M: TraversableMap>(
        &self,
        path: &[TilePos],
        map: &M,
        speed_multiplier: f64,
    ) -> Option<f64> {
        if !(speed_multiplier.is_finite() && speed_multiplier > 0.0) {
            return None;
        }
        let mut total_cost = 0.0;
        for pos in path.iter().skip(1) {
            // Skip starting position
            total_cost += map.movement_cost(*pos)?;
        }
        Some(total_cost / speed_multiplier)
    }

    /// How many tiles of each terrain the path visits, endpoints included
    pub fn get_path_terrain_summary<M: TraversableMap>(
        &self,
        path: &[TilePos],
        map: &M,
    ) -> BTreeMap<M::Terrain, usize> {
        let mut summary = BTreeMap::new();
        for terrain in path.iter().filter_map(|pos| map.terrain_at(*pos)) {
            *summary.entry(terrain).or_insert(0) += 1;
        }
        summary
    }

    /// Every step costs at least one base unit, so this never overestimates
    fn heuristic<M: TraversableMap>(map: &M, from: TilePos, to: TilePos) -> f64 {
        f64::from(map.distance(from, to)) * BASE_MOVEMENT_COST
    }

    fn reconstruct_path(came_from: &HashMap<TilePos, TilePos>, mut current: TilePos) -> Vec<TilePos> {
        let mut path = vec![current];

        while let Some(&parent) = came_from.get(&current) {
            current = parent;
            path.push(current);
        }

        path.reverse();
        path
    }
}

/// Connected components of passable tiles, for origin-aware reachability
#[derive(Debug, Clone, Default)]
pub struct ReachabilityIndex {
    components: HashMap<TilePos, usize>,
    sizes: Vec<usize>,
}

impl ReachabilityIndex {
    /// Flood-fills every passable tile of `map`
    pub fn build<M: TraversableMap>(map: &M) -> Self {
        let mut index = Self::default();

        for seed in map.positions() {
            if index.components.contains_key(&seed) || map.movement_cost(seed).is_none() {
                continue;
            }

            let component = index.sizes.len();
            let mut size = 0;
            let mut queue = VecDeque::from([seed]);
            index.components.insert(seed, component);

            while let Some(current) = queue.pop_front() {
                size += 1;
                for neighbor in neighbors(current) {
                    let neighbor = map.normalize(neighbor);
                    if index.components.contains_key(&neighbor)
                        || map.movement_cost(neighbor).is_none()
                    {
                        continue;
                    }
                    index.components.insert(neighbor, component);
                    queue.push_back(neighbor);
                }
            }
            index.sizes.push(size);
        }

        debug!("Reachability index: {} components", index.sizes.len());
        index
    }

    pub fn component_of(&self, pos: TilePos) -> Option<usize> {
        self.components.get(&pos).copied()
    }

    pub fn component_size(&self, component: usize) -> usize {
        self.sizes.get(component).copied().unwrap_or(0)
    }

    pub fn component_count(&self) -> usize {
        self.sizes.len()
    }

    /// True when both tiles are passable and joined by passable tiles
    pub fn connected(&self, a: TilePos, b: TilePos) -> bool {
        match (self.component_of(a), self.component_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}
