//! Axial hex coordinates, pixel conversion and horizontal wrap.
//!
//! Maps use pointy-top axial coordinates. The macro map is an axial
//! parallelogram `q ∈ [0, width)`, `r ∈ [0, height)` that wraps east-west;
//! poles are hard edges.

use std::fmt;
use std::str::FromStr;

use hexx::Hex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Canonical map key: an axial (q, r) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub q: i32,
    pub r: i32,
}

impl TilePos {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn to_hex(self) -> Hex {
        Hex::new(self.q, self.r)
    }

    pub fn from_hex(hex: Hex) -> Self {
        Self::new(hex.x, hex.y)
    }

    /// Same tile with `q` folded into `[0, map_width)`
    pub fn wrapped(self, map_width: i32) -> Self {
        Self::new(wrap_coordinates(self.q, map_width), self.r)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid hex key '{0}', expected \"q,r\"")]
pub struct ParseTilePosError(String);

impl FromStr for TilePos {
    type Err = ParseTilePosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| ParseTilePosError(s.to_string()))?;
        let q = q.trim().parse().map_err(|_| ParseTilePosError(s.to_string()))?;
        let r = r.trim().parse().map_err(|_| ParseTilePosError(s.to_string()))?;
        Ok(Self::new(q, r))
    }
}

/// Axial pair plus its cartesian position at unit hex size, for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexCoordinates {
    pub q: i32,
    pub r: i32,
    pub x: f64,
    pub y: f64,
}

impl HexCoordinates {
    pub fn new(q: i32, r: i32) -> Self {
        let (x, y) = axial_to_pixel(q, r, 1.0);
        Self { q, r, x, y }
    }

    pub fn pos(&self) -> TilePos {
        TilePos::new(self.q, self.r)
    }
}

impl From<TilePos> for HexCoordinates {
    fn from(pos: TilePos) -> Self {
        Self::new(pos.q, pos.r)
    }
}

/// Pixel centre of an axial hex (pointy-top layout).
pub fn axial_to_pixel(q: i32, r: i32, hex_size: f64) -> (f64, f64) {
    let q = f64::from(q);
    let r = f64::from(r);
    let x = hex_size * SQRT_3 * (q + r / 2.0);
    let y = hex_size * 1.5 * r;
    (x, y)
}

/// Hex containing a pixel position (inverse of [`axial_to_pixel`]).
pub fn pixel_to_axial(x: f64, y: f64, hex_size: f64) -> TilePos {
    let q = (SQRT_3 / 3.0 * x - y / 3.0) / hex_size;
    let r = (2.0 / 3.0 * y) / hex_size;
    cube_round(q, r)
}

/// Round fractional axial coordinates to the nearest hex, fixing up the
/// component with the largest rounding error so that q + r + s == 0.
fn cube_round(q: f64, r: f64) -> TilePos {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }

    TilePos::new(rq as i32, rr as i32)
}

/// Folds `q` into `[0, map_width)`. Non-positive widths leave `q` unchanged.
pub fn wrap_coordinates(q: i32, map_width: i32) -> i32 {
    if map_width <= 0 {
        return q;
    }
    q.rem_euclid(map_width)
}

/// The six neighbours of a hex, always in the same order.
pub fn neighbors(pos: TilePos) -> [TilePos; 6] {
    pos.to_hex().all_neighbors().map(TilePos::from_hex)
}

/// Cube distance between two hexes, ignoring wrap.
pub fn hex_distance(a: TilePos, b: TilePos) -> i32 {
    a.to_hex().distance_to(b.to_hex())
}

/// Shortest cube distance on a map that wraps horizontally every `map_width`.
pub fn wrapped_distance(a: TilePos, b: TilePos, map_width: i32) -> i32 {
    if map_width <= 0 {
        return hex_distance(a, b);
    }
    let b = b.wrapped(map_width);
    let a = a.wrapped(map_width);
    [-map_width, 0, map_width]
        .into_iter()
        .map(|offset| hex_distance(a, TilePos::new(b.q + offset, b.r)))
        .min()
        .unwrap_or_else(|| hex_distance(a, b))
}

/// Rectangular axial bounds, optionally wrapping on `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub width: i32,
    pub height: i32,
    pub wraps: bool,
}

impl GridBounds {
    pub fn wrapping(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            wraps: true,
        }
    }

    pub fn bounded(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            wraps: false,
        }
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.q >= 0 && pos.q < self.width && pos.r >= 0 && pos.r < self.height
    }

    /// Brings a position back into range on wrapping grids
    pub fn normalize(&self, pos: TilePos) -> Option<TilePos> {
        let pos = if self.wraps {
            pos.wrapped(self.width)
        } else {
            pos
        };
        self.contains(pos).then_some(pos)
    }

    /// In-bounds neighbours in the fixed [`neighbors`] order
    pub fn neighbors(&self, pos: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        neighbors(pos)
            .into_iter()
            .filter_map(move |n| self.normalize(n))
    }

    pub fn distance(&self, a: TilePos, b: TilePos) -> i32 {
        if self.wraps {
            wrapped_distance(a, b, self.width)
        } else {
            hex_distance(a, b)
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.height).flat_map(move |r| (0..self.width).map(move |q| TilePos::new(q, r)))
    }
}
