//! Ledger entities and the request/response shapes built from them.
//!
//! Entities reference each other by foreign key only; detail views are
//! assembled on demand by the ledger.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreBreakdown;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explorer {
    pub id: i64,
    pub name: String,
    pub score: i64,
}

impl Explorer {
    pub(crate) const COLUMNS: &'static str = "id, name, score";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            score: row.get("score")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystem {
    pub id: i64,
    pub name: String,
    pub declared_planet_count: i64,
    pub explorer_id: i64,
}

impl StarSystem {
    pub(crate) const COLUMNS: &'static str = "id, name, declared_planet_count, explorer_id";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            declared_planet_count: row.get("declared_planet_count")?,
            explorer_id: row.get("explorer_id")?,
        })
    }
}

/// Input for registering a star system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStarSystem {
    pub name: String,
    #[serde(default)]
    pub declared_planet_count: i64,
    pub explorer_id: i64,
}

/// Replacement values for a star system's mutable fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystemUpdate {
    pub name: String,
    pub declared_planet_count: i64,
    pub explorer_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Planet {
    pub name: String,
    pub climate: String,
    pub climate_quality: String,
    pub fauna: String,
    pub fauna_quality: String,
    pub flora: String,
    pub flora_quality: String,
    pub sentinels: String,
    pub sentinel_quality: String,
    /// Comma-separated resource names
    pub resources: String,
    pub system_id: i64,
    pub explorer_id: i64,
}

impl Planet {
    pub(crate) const COLUMNS: &'static str =
        "name, climate, climate_quality, fauna, fauna_quality, flora, flora_quality, \
         sentinels, sentinel_quality, resources, system_id, explorer_id";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            climate: row.get("climate")?,
            climate_quality: row.get("climate_quality")?,
            fauna: row.get("fauna")?,
            fauna_quality: row.get("fauna_quality")?,
            flora: row.get("flora")?,
            flora_quality: row.get("flora_quality")?,
            sentinels: row.get("sentinels")?,
            sentinel_quality: row.get("sentinel_quality")?,
            resources: row.get("resources")?,
            system_id: row.get("system_id")?,
            explorer_id: row.get("explorer_id")?,
        })
    }

    /// The four descriptor ratings, in climate/fauna/flora/sentinel order
    pub fn qualities(&self) -> [&str; 4] {
        [
            &self.climate_quality,
            &self.fauna_quality,
            &self.flora_quality,
            &self.sentinel_quality,
        ]
    }

    /// Resource names split out of the comma-separated field
    pub fn resource_list(&self) -> Vec<&str> {
        self.resources
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Replacement values for a planet's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanetUpdate {
    pub climate: String,
    pub climate_quality: String,
    pub fauna: String,
    pub fauna_quality: String,
    pub flora: String,
    pub flora_quality: String,
    pub sentinels: String,
    pub sentinel_quality: String,
    pub resources: String,
    pub explorer_id: i64,
}

impl PlanetUpdate {
    /// Start from a planet's current values
    pub fn from_planet(planet: &Planet) -> Self {
        Self {
            climate: planet.climate.clone(),
            climate_quality: planet.climate_quality.clone(),
            fauna: planet.fauna.clone(),
            fauna_quality: planet.fauna_quality.clone(),
            flora: planet.flora.clone(),
            flora_quality: planet.flora_quality.clone(),
            sentinels: planet.sentinels.clone(),
            sentinel_quality: planet.sentinel_quality.clone(),
            resources: planet.resources.clone(),
            explorer_id: planet.explorer_id,
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// An explorer together with everything credited to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerDetail {
    pub explorer: Explorer,
    pub star_systems: Vec<StarSystem>,
    pub planets: Vec<Planet>,
}

/// A star system as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystemSummary {
    #[serde(flatten)]
    pub system: StarSystem,
    pub explorer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystemDetail {
    #[serde(flatten)]
    pub system: StarSystem,
    pub explorer_name: Option<String>,
    pub planets: Vec<Planet>,
}

/// A planet as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetSummary {
    #[serde(flatten)]
    pub planet: Planet,
    pub system_name: Option<String>,
    pub explorer_name: Option<String>,
}

/// A planet with its parent records resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetDetail {
    pub planet: Planet,
    pub star_system: Option<StarSystem>,
    pub explorer: Option<Explorer>,
}

// =============================================================================
// Write results
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystemCreated {
    pub system: StarSystem,
    pub explorer_name: String,
    pub explorer_score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetCreated {
    pub planet: Planet,
    pub system_name: String,
    pub explorer_name: String,
    pub score: ScoreBreakdown,
    pub explorer_score: i64,
}

/// Identity of a deleted planet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetRemoved {
    pub system_id: i64,
    pub name: String,
}
