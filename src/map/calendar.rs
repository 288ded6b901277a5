use serde::{Deserialize, Serialize};

use crate::constants::{EQUATORIAL_BAND_DEGREES, MONTHS_PER_YEAR, POLAR_LATITUDE, TROPIC_LATITUDE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl core::fmt::Display for Season {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Season::Spring => write!(f, "Spring"),
            Season::Summer => write!(f, "Summer"),
            Season::Autumn => write!(f, "Autumn"),
            Season::Winter => write!(f, "Winter"),
        }
    }
}

impl Season {
    /// Season half a year away
    pub fn opposite(self) -> Self {
        match self {
            Season::Spring => Season::Autumn,
            Season::Summer => Season::Winter,
            Season::Autumn => Season::Spring,
            Season::Winter => Season::Summer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    Northern,
    Southern,
    Equatorial,
}

impl Hemisphere {
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude.abs() < EQUATORIAL_BAND_DEGREES {
            Hemisphere::Equatorial
        } else if latitude > 0.0 {
            Hemisphere::Northern
        } else {
            Hemisphere::Southern
        }
    }
}

/// Coarse climate band used by resource tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatitudeBand {
    Tropical,
    Temperate,
    Polar,
}

impl LatitudeBand {
    pub fn from_latitude(latitude: f64) -> Self {
        let lat = latitude.abs();
        if lat < TROPIC_LATITUDE {
            LatitudeBand::Tropical
        } else if lat < POLAR_LATITUDE {
            LatitudeBand::Temperate
        } else {
            LatitudeBand::Polar
        }
    }
}

/// Latitude of row `r` on a map `height` rows tall; row 0 is the far north.
pub fn latitude(r: i32, height: i32) -> f64 {
    if height <= 0 {
        return 0.0;
    }
    90.0 - (f64::from(r) + 0.5) / f64::from(height) * 180.0
}

/// Folds any month number into 1..=12
pub fn normalize_month(month: i32) -> u32 {
    (i64::from(month) - 1).rem_euclid(i64::from(MONTHS_PER_YEAR)) as u32 + 1
}

/// Season seen from the northern hemisphere in `month`
pub fn northern_season(month: i32) -> Season {
    match normalize_month(month) {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => Season::Winter,
    }
}

/// Cosmetic season label for a tile; equatorial tiles have none
pub fn season_for(latitude: f64, month: i32) -> Option<Season> {
    match Hemisphere::from_latitude(latitude) {
        Hemisphere::Northern => Some(northern_season(month)),
        Hemisphere::Southern => Some(northern_season(month).opposite()),
        Hemisphere::Equatorial => None,
    }
}
