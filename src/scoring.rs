//! Score rules applied when star systems and planets are registered.
//!
//! A planet is worth [`PLANET_BASE_POINTS`] plus one point per descriptor
//! rated `bom` and minus one per descriptor rated `ruim`. A star system is
//! worth its declared planet count, taken as given.

use serde::Serialize;

/// Points awarded for every new planet before quality adjustments
pub const PLANET_BASE_POINTS: i64 = 5;

/// Rating attached to a planet descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Good,
    Bad,
    Unrated,
}

impl Quality {
    /// Parse a free-text rating. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Self {
        let cleaned = raw.trim().to_lowercase();
        match cleaned.as_str() {
            "bom" => Quality::Good,
            "ruim" => Quality::Bad,
            _ => Quality::Unrated,
        }
    }

    pub fn contribution(self) -> i64 {
        match self {
            Quality::Good => 1,
            Quality::Bad => -1,
            Quality::Unrated => 0,
        }
    }
}

/// Points earned by a single planet registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base: i64,
    pub quality_bonus: i64,
    pub total: i64,
}

/// Score a planet from its four descriptor ratings
pub fn planet_score<'a>(qualities: impl IntoIterator<Item = &'a str>) -> ScoreBreakdown {
    let quality_bonus = qualities
        .into_iter()
        .map(|q| Quality::parse(q).contribution())
        .sum();

    ScoreBreakdown {
        base: PLANET_BASE_POINTS,
        quality_bonus,
        total: PLANET_BASE_POINTS + quality_bonus,
    }
}

/// Score a star system registration
pub fn system_score(declared_planet_count: i64) -> i64 {
    declared_planet_count
}
