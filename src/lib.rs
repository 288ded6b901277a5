//! hexworld - procedural hex world generation and travel planning
//!
//! The library builds a deterministic, horizontally wrapping world of hex
//! tiles from a seed, lets players pin edits on top of it, subdivides any
//! tile into a local sub-hex grid on demand and plans routes over either
//! level.

pub mod constants;
pub mod map;
pub mod pathfinding;
pub mod resources;
pub mod save;
pub mod sublands;

#[cfg(test)]
pub mod test_utils;
