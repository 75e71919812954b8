//! The exploration ledger: explorers, the star systems and planets credited
//! to them, and the score each explorer accrues from those registrations.
//!
//! Every mutating operation runs inside a single write transaction. All
//! precondition checks happen before the first write, so a failed call
//! leaves the store untouched.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::model::{
    Explorer, ExplorerDetail, NewStarSystem, Planet, PlanetCreated, PlanetDetail, PlanetSummary,
    PlanetUpdate, StarSystem, StarSystemCreated, StarSystemDetail, StarSystemSummary,
    StarSystemUpdate,
};
use crate::scoring::{planet_score, system_score};
use crate::store::SqliteStore;

const EXPLORER: &str = "Explorer";
const STAR_SYSTEM: &str = "StarSystem";
const PLANET: &str = "Planet";

/// Rows removed by a cascading delete, including the target itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Removed {
    pub explorers: usize,
    pub star_systems: usize,
    pub planets: usize,
}

pub struct Ledger {
    store: SqliteStore,
}

impl Ledger {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Open a ledger backed by the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(SqliteStore::open(path)?))
    }

    /// Open a ledger backed by a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(SqliteStore::open_in_memory()?))
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    fn conn(&self) -> &Connection {
        self.store.connection()
    }

    // =========================================================================
    // Explorers
    // =========================================================================

    pub fn create_explorer(&mut self, name: &str) -> Result<Explorer> {
        let name = required_name("explorer", name)?;

        let tx = self.store.write()?;
        tx.execute(
            "INSERT INTO explorers (name, score) VALUES (?1, 0)",
            params![name],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(explorer_id = id, name = %name, "explorer created");
        Ok(Explorer { id, name, score: 0 })
    }

    pub fn update_explorer(&mut self, id: i64, name: &str) -> Result<Explorer> {
        let name = required_name("explorer", name)?;

        let tx = self.store.write()?;
        let changed = tx.execute(
            "UPDATE explorers SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(EXPLORER, id));
        }
        let explorer =
            find_explorer(&tx, id)?.ok_or_else(|| LedgerError::not_found(EXPLORER, id))?;
        tx.commit()?;

        debug!(explorer_id = id, "explorer renamed");
        Ok(explorer)
    }

    /// Remove an explorer, its star systems, the planets in those systems and
    /// the planets credited to it. Awarded score is not retracted elsewhere.
    pub fn delete_explorer(&mut self, id: i64) -> Result<Removed> {
        let tx = self.store.write()?;
        if find_explorer(&tx, id)?.is_none() {
            return Err(LedgerError::not_found(EXPLORER, id));
        }

        let planets = tx.execute(
            "DELETE FROM planets
             WHERE explorer_id = ?1
                OR system_id IN (SELECT id FROM star_systems WHERE explorer_id = ?1)",
            params![id],
        )?;
        let star_systems =
            tx.execute("DELETE FROM star_systems WHERE explorer_id = ?1", params![id])?;
        let explorers = tx.execute("DELETE FROM explorers WHERE id = ?1", params![id])?;
        tx.commit()?;

        let removed = Removed {
            explorers,
            star_systems,
            planets,
        };
        info!(explorer_id = id, ?removed, "explorer deleted");
        Ok(removed)
    }

    pub fn get_explorer(&self, id: i64) -> Result<ExplorerDetail> {
        let explorer =
            find_explorer(self.conn(), id)?.ok_or_else(|| LedgerError::not_found(EXPLORER, id))?;
        self.explorer_detail(explorer)
    }

    /// All explorers in id order
    pub fn list_explorers(&self) -> Result<Vec<Explorer>> {
        let sql = format!("SELECT {} FROM explorers ORDER BY id", Explorer::COLUMNS);
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], Explorer::from_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// All explorers, highest score first. Ties keep registration order.
    pub fn leaderboard(&self) -> Result<Vec<Explorer>> {
        let sql = format!(
            "SELECT {} FROM explorers ORDER BY score DESC, id ASC",
            Explorer::COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], Explorer::from_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// First explorer, in id order, whose name contains `fragment` ignoring case
    pub fn search_explorer_by_name(&self, fragment: &str) -> Result<ExplorerDetail> {
        let needle = fragment.to_lowercase();
        let explorer = self
            .list_explorers()?
            .into_iter()
            .find(|e| e.name.to_lowercase().contains(&needle))
            .ok_or_else(|| LedgerError::not_found(EXPLORER, fragment))?;

        debug!(explorer_id = explorer.id, fragment, "explorer search hit");
        self.explorer_detail(explorer)
    }

    fn explorer_detail(&self, explorer: Explorer) -> Result<ExplorerDetail> {
        let sql = format!(
            "SELECT {} FROM star_systems WHERE explorer_id = ?1 ORDER BY id",
            StarSystem::COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let star_systems = stmt
            .query_map(params![explorer.id], StarSystem::from_row)?
            .collect::<rusqlite::Result<_>>()?;

        let sql = format!(
            "SELECT {} FROM planets WHERE explorer_id = ?1 ORDER BY rowid",
            Planet::COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let planets = stmt
            .query_map(params![explorer.id], Planet::from_row)?
            .collect::<rusqlite::Result<_>>()?;

        Ok(ExplorerDetail {
            explorer,
            star_systems,
            planets,
        })
    }

    // =========================================================================
    // Star systems
    // =========================================================================

    /// Register a star system and credit its declared planet count to the owner
    pub fn create_star_system(&mut self, new: NewStarSystem) -> Result<StarSystemCreated> {
        let name = required_name("star system", &new.name)?;

        let tx = self.store.write()?;
        let explorer = find_explorer(&tx, new.explorer_id)?
            .ok_or_else(|| LedgerError::not_found(EXPLORER, new.explorer_id))?;

        tx.execute(
            "INSERT INTO star_systems (name, declared_planet_count, explorer_id)
             VALUES (?1, ?2, ?3)",
            params![name, new.declared_planet_count, explorer.id],
        )?;
        let id = tx.last_insert_rowid();

        let delta = system_score(new.declared_planet_count);
        let explorer_score = add_score(&tx, explorer.id, delta)?;
        tx.commit()?;

        info!(
            system_id = id,
            explorer_id = explorer.id,
            delta,
            explorer_score,
            "star system created"
        );

        Ok(StarSystemCreated {
            system: StarSystem {
                id,
                name,
                declared_planet_count: new.declared_planet_count,
                explorer_id: explorer.id,
            },
            explorer_name: explorer.name,
            explorer_score,
        })
    }

    /// Replace a star system's name, declared count and owner. Score is unchanged.
    pub fn update_star_system(&mut self, id: i64, update: StarSystemUpdate) -> Result<StarSystem> {
        let name = required_name("star system", &update.name)?;

        let tx = self.store.write()?;
        if find_star_system(&tx, id)?.is_none() {
            return Err(LedgerError::not_found(STAR_SYSTEM, id));
        }
        if find_explorer(&tx, update.explorer_id)?.is_none() {
            return Err(LedgerError::not_found(EXPLORER, update.explorer_id));
        }

        tx.execute(
            "UPDATE star_systems
             SET name = ?1, declared_planet_count = ?2, explorer_id = ?3
             WHERE id = ?4",
            params![name, update.declared_planet_count, update.explorer_id, id],
        )?;
        tx.commit()?;

        debug!(system_id = id, "star system updated");
        Ok(StarSystem {
            id,
            name,
            declared_planet_count: update.declared_planet_count,
            explorer_id: update.explorer_id,
        })
    }

    /// Remove a star system and every planet in it
    pub fn delete_star_system(&mut self, id: i64) -> Result<Removed> {
        let tx = self.store.write()?;
        if find_star_system(&tx, id)?.is_none() {
            return Err(LedgerError::not_found(STAR_SYSTEM, id));
        }

        let planets = tx.execute("DELETE FROM planets WHERE system_id = ?1", params![id])?;
        let star_systems = tx.execute("DELETE FROM star_systems WHERE id = ?1", params![id])?;
        tx.commit()?;

        let removed = Removed {
            explorers: 0,
            star_systems,
            planets,
        };
        info!(system_id = id, ?removed, "star system deleted");
        Ok(removed)
    }

    pub fn get_star_system(&self, id: i64) -> Result<StarSystemDetail> {
        let system = find_star_system(self.conn(), id)?
            .ok_or_else(|| LedgerError::not_found(STAR_SYSTEM, id))?;
        let explorer_name = find_explorer(self.conn(), system.explorer_id)?.map(|e| e.name);
        let planets = self.planets_in_system(id)?;

        Ok(StarSystemDetail {
            system,
            explorer_name,
            planets,
        })
    }

    /// All star systems in id order, with the owning explorer's name
    pub fn list_star_systems(&self) -> Result<Vec<StarSystemSummary>> {
        let mut stmt = self.conn().prepare(
            "SELECT s.id, s.name, s.declared_planet_count, s.explorer_id, e.name AS explorer_name
             FROM star_systems s
             LEFT JOIN explorers e ON e.id = s.explorer_id
             ORDER BY s.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StarSystemSummary {
                system: StarSystem::from_row(row)?,
                explorer_name: row.get("explorer_name")?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    // =========================================================================
    // Planets
    // =========================================================================

    /// Register a planet and credit its score to the explorer
    pub fn create_planet(&mut self, planet: Planet) -> Result<PlanetCreated> {
        let planet = Planet {
            name: required_name("planet", &planet.name)?,
            ..planet
        };
        let name_key = planet.name.to_lowercase();

        let tx = self.store.write()?;
        let system = find_star_system(&tx, planet.system_id)?
            .ok_or_else(|| LedgerError::not_found(STAR_SYSTEM, planet.system_id))?;
        let explorer = find_explorer(&tx, planet.explorer_id)?
            .ok_or_else(|| LedgerError::not_found(EXPLORER, planet.explorer_id))?;

        let taken: bool = tx
            .query_row(
                "SELECT 1 FROM planets WHERE name_key = ?1",
                params![name_key],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if taken {
            return Err(duplicate_planet(&planet.name));
        }

        let sql = format!(
            "INSERT INTO planets ({}, name_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            Planet::COLUMNS
        );
        tx.execute(
            &sql,
            params![
                planet.name,
                planet.climate,
                planet.climate_quality,
                planet.fauna,
                planet.fauna_quality,
                planet.flora,
                planet.flora_quality,
                planet.sentinels,
                planet.sentinel_quality,
                planet.resources,
                planet.system_id,
                planet.explorer_id,
                name_key,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                duplicate_planet(&planet.name)
            }
            other => LedgerError::Storage(other),
        })?;

        let score = planet_score(planet.qualities());
        let explorer_score = add_score(&tx, explorer.id, score.total)?;
        tx.commit()?;

        info!(
            planet = %planet.name,
            explorer_id = explorer.id,
            base = score.base,
            quality_bonus = score.quality_bonus,
            explorer_score,
            "planet created"
        );

        Ok(PlanetCreated {
            planet,
            system_name: system.name,
            explorer_name: explorer.name,
            score,
            explorer_score,
        })
    }

    /// Replace a planet's descriptors, ratings, resources and credited explorer.
    /// Score is unchanged.
    pub fn update_planet(
        &mut self,
        system_id: i64,
        name: &str,
        update: PlanetUpdate,
    ) -> Result<Planet> {
        let tx = self.store.write()?;
        let current = find_planet(&tx, system_id, name)?
            .ok_or_else(|| LedgerError::not_found(PLANET, name))?;
        if find_explorer(&tx, update.explorer_id)?.is_none() {
            return Err(LedgerError::not_found(EXPLORER, update.explorer_id));
        }

        tx.execute(
            "UPDATE planets SET
                climate = ?1, climate_quality = ?2,
                fauna = ?3, fauna_quality = ?4,
                flora = ?5, flora_quality = ?6,
                sentinels = ?7, sentinel_quality = ?8,
                resources = ?9, explorer_id = ?10
             WHERE name = ?11",
            params![
                update.climate,
                update.climate_quality,
                update.fauna,
                update.fauna_quality,
                update.flora,
                update.flora_quality,
                update.sentinels,
                update.sentinel_quality,
                update.resources,
                update.explorer_id,
                current.name,
            ],
        )?;
        tx.commit()?;

        debug!(planet = %current.name, "planet updated");
        Ok(Planet {
            name: current.name,
            climate: update.climate,
            climate_quality: update.climate_quality,
            fauna: update.fauna,
            fauna_quality: update.fauna_quality,
            flora: update.flora,
            flora_quality: update.flora_quality,
            sentinels: update.sentinels,
            sentinel_quality: update.sentinel_quality,
            resources: update.resources,
            system_id: current.system_id,
            explorer_id: update.explorer_id,
        })
    }

    pub fn delete_planet(&mut self, system_id: i64, name: &str) -> Result<()> {
        let tx = self.store.write()?;
        let removed = tx.execute(
            "DELETE FROM planets WHERE system_id = ?1 AND name_key = ?2",
            params![system_id, name.trim().to_lowercase()],
        )?;
        if removed == 0 {
            return Err(LedgerError::not_found(PLANET, name));
        }
        tx.commit()?;

        info!(system_id, planet = name, "planet deleted");
        Ok(())
    }

    /// Planet in `system_id` named `name` (ignoring case), with its parents
    pub fn get_planet(&self, system_id: i64, name: &str) -> Result<PlanetDetail> {
        let planet = find_planet(self.conn(), system_id, name)?
            .ok_or_else(|| LedgerError::not_found(PLANET, name))?;
        self.planet_detail(planet)
    }

    /// First planet, in registration order, whose name contains `fragment` ignoring case
    pub fn search_planet_by_name(&self, fragment: &str) -> Result<PlanetDetail> {
        let sql = format!(
            "SELECT {} FROM planets WHERE instr(name_key, ?1) > 0 ORDER BY rowid LIMIT 1",
            Planet::COLUMNS
        );
        let planet = self
            .conn()
            .query_row(&sql, params![fragment.to_lowercase()], Planet::from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found(PLANET, fragment))?;

        debug!(planet = %planet.name, fragment, "planet search hit");
        self.planet_detail(planet)
    }

    /// Planets of one star system in registration order
    pub fn planets_in_system(&self, system_id: i64) -> Result<Vec<Planet>> {
        let sql = format!(
            "SELECT {} FROM planets WHERE system_id = ?1 ORDER BY rowid",
            Planet::COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![system_id], Planet::from_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// All planets, or only those in `system_id`, with system and explorer names
    pub fn list_planets(&self, system_id: Option<i64>) -> Result<Vec<PlanetSummary>> {
        let mut stmt = self.conn().prepare(
            "SELECT p.name, p.climate, p.climate_quality, p.fauna, p.fauna_quality,
                    p.flora, p.flora_quality, p.sentinels, p.sentinel_quality,
                    p.resources, p.system_id, p.explorer_id,
                    s.name AS system_name, e.name AS explorer_name
             FROM planets p
             LEFT JOIN star_systems s ON s.id = p.system_id
             LEFT JOIN explorers e ON e.id = p.explorer_id
             WHERE ?1 IS NULL OR p.system_id = ?1
             ORDER BY p.rowid",
        )?;
        let rows = stmt.query_map(params![system_id], |row| {
            Ok(PlanetSummary {
                planet: Planet::from_row(row)?,
                system_name: row.get("system_name")?,
                explorer_name: row.get("explorer_name")?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn planet_detail(&self, planet: Planet) -> Result<PlanetDetail> {
        let star_system = find_star_system(self.conn(), planet.system_id)?;
        let explorer = find_explorer(self.conn(), planet.explorer_id)?;
        Ok(PlanetDetail {
            planet,
            star_system,
            explorer,
        })
    }
}

// =============================================================================
// Lookups shared by reads and write transactions
// =============================================================================

fn find_explorer(conn: &Connection, id: i64) -> Result<Option<Explorer>> {
    let sql = format!("SELECT {} FROM explorers WHERE id = ?1", Explorer::COLUMNS);
    Ok(conn.query_row(&sql, params![id], Explorer::from_row).optional()?)
}

fn find_star_system(conn: &Connection, id: i64) -> Result<Option<StarSystem>> {
    let sql = format!("SELECT {} FROM star_systems WHERE id = ?1", StarSystem::COLUMNS);
    Ok(conn.query_row(&sql, params![id], StarSystem::from_row).optional()?)
}

fn find_planet(conn: &Connection, system_id: i64, name: &str) -> Result<Option<Planet>> {
    let sql = format!(
        "SELECT {} FROM planets WHERE system_id = ?1 AND name_key = ?2",
        Planet::COLUMNS
    );
    let key = name.trim().to_lowercase();
    Ok(conn.query_row(&sql, params![system_id, key], Planet::from_row).optional()?)
}

/// Add `delta` to an explorer's score and return the new total
fn add_score(conn: &Connection, explorer_id: i64, delta: i64) -> Result<i64> {
    let current: i64 = conn.query_row(
        "SELECT score FROM explorers WHERE id = ?1",
        params![explorer_id],
        |row| row.get(0),
    )?;
    // SQLite would silently widen an overflowing sum to REAL
    let total = current.checked_add(delta).ok_or_else(|| {
        LedgerError::InvalidInput(format!(
            "score of explorer {} would overflow ({} + {})",
            explorer_id, current, delta
        ))
    })?;

    conn.execute(
        "UPDATE explorers SET score = ?1 WHERE id = ?2",
        params![total, explorer_id],
    )?;
    Ok(total)
}

fn required_name(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidInput(format!("{} name must not be empty", kind)));
    }
    Ok(trimmed.to_string())
}

fn duplicate_planet(name: &str) -> LedgerError {
    LedgerError::Conflict(format!("a planet named '{}' already exists", name))
}
