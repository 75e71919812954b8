//! End-to-end checks of the ledger against on-disk and in-memory databases.
//!
//! Run with:
//! ```sh
//! cargo test --test ledger_test
//! ```

use clap::Parser;
use pretty_assertions::assert_eq;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use std::thread;
use tempfile::{tempdir, TempDir};

use exploration_ledger::cli::{Cli, Commands, PlanetCommand, SystemCommand};
use exploration_ledger::model::{NewStarSystem, Planet, PlanetUpdate};
use exploration_ledger::schema::tables::{EXPLORERS, PLANETS, STAR_SYSTEMS};
use exploration_ledger::{Ledger, LedgerError, Removed, ScoreBreakdown};

// =============================================================================
// Test Configuration
// =============================================================================

/// Random seed for reproducible shuffles
const RANDOM_SEED: u64 = 42;

fn on_disk() -> (TempDir, Ledger) {
    let dir = tempdir().expect("Failed to create temp dir");
    let ledger = Ledger::open(&dir.path().join("ledger.db")).expect("Failed to open ledger");
    (dir, ledger)
}

fn system(ledger: &mut Ledger, name: &str, count: i64, explorer_id: i64) -> i64 {
    ledger
        .create_star_system(NewStarSystem {
            name: name.to_string(),
            declared_planet_count: count,
            explorer_id,
        })
        .expect("Failed to create star system")
        .system
        .id
}

fn planet(name: &str, system_id: i64, explorer_id: i64) -> Planet {
    Planet {
        name: name.to_string(),
        system_id,
        explorer_id,
        ..Default::default()
    }
}

fn score_of(ledger: &Ledger, explorer_id: i64) -> i64 {
    ledger.get_explorer(explorer_id).unwrap().explorer.score
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_ava_scenario() {
    let (_dir, mut ledger) = on_disk();

    let ava = ledger.create_explorer("Ava").unwrap();
    assert_eq!(ava.id, 1);
    assert_eq!(ava.score, 0);

    let alpha = ledger
        .create_star_system(NewStarSystem {
            name: "Alpha".into(),
            declared_planet_count: 2,
            explorer_id: 1,
        })
        .unwrap();
    assert_eq!(alpha.explorer_score, 2);
    assert_eq!(score_of(&ledger, 1), 2);

    let created = ledger
        .create_planet(Planet {
            name: "Proxima b".into(),
            system_id: alpha.system.id,
            explorer_id: 1,
            climate_quality: "bom".into(),
            fauna_quality: "ruim".into(),
            flora_quality: "".into(),
            sentinel_quality: "bom".into(),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(
        created.score,
        ScoreBreakdown {
            base: 5,
            quality_bonus: 1,
            total: 6
        }
    );
    assert_eq!(created.explorer_score, 8);
    assert_eq!(created.system_name, "Alpha");
    assert_eq!(created.explorer_name, "Ava");
    assert_eq!(score_of(&ledger, 1), 8);
}

#[test]
fn test_quality_totals() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();
    let sys = system(&mut ledger, "Alpha", 0, ava.id);

    let cases = [
        ("P1", ["bom", "bom", "bom", "bom"], 9),
        ("P2", ["ruim", "ruim", "ruim", "ruim"], 1),
        ("P3", ["", "BOM", "Ruim", "x"], 5),
        ("P4", [" bom ", "   ", "RUIM ", "Bom"], 6),
    ];

    let mut expected_score = 0;
    for (name, [c, fa, fl, se], total) in cases {
        let created = ledger
            .create_planet(Planet {
                climate_quality: c.into(),
                fauna_quality: fa.into(),
                flora_quality: fl.into(),
                sentinel_quality: se.into(),
                ..planet(name, sys, ava.id)
            })
            .unwrap();
        expected_score += total;
        assert_eq!(created.score.total, total, "total for {}", name);
        assert_eq!(created.explorer_score, expected_score);
    }
}

#[test]
fn test_star_system_increments_by_declared_count() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();

    for (i, count) in [0, 3, 11, -2].into_iter().enumerate() {
        let before = score_of(&ledger, ava.id);
        system(&mut ledger, &format!("S{}", i), count, ava.id);
        assert_eq!(score_of(&ledger, ava.id), before + count);
    }
}

#[test]
fn test_duplicate_planet_conflict_leaves_scores() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();
    let bea = ledger.create_explorer("Bea").unwrap();
    let a = system(&mut ledger, "Alpha", 1, ava.id);
    let b = system(&mut ledger, "Beta", 1, bea.id);

    ledger.create_planet(planet("Proxima b", a, ava.id)).unwrap();
    let ava_before = score_of(&ledger, ava.id);
    let bea_before = score_of(&ledger, bea.id);

    let err = ledger
        .create_planet(planet("PROXIMA B", b, bea.id))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)), "got {:?}", err);
    assert_eq!(err.status_hint(), 409);

    assert_eq!(score_of(&ledger, ava.id), ava_before);
    assert_eq!(score_of(&ledger, bea.id), bea_before);
    assert_eq!(ledger.list_planets(None).unwrap().len(), 1);
}

// =============================================================================
// Cascades
// =============================================================================

#[test]
fn test_delete_explorer_cascades() {
    let (_dir, mut ledger) = on_disk();
    let ava = ledger.create_explorer("Ava").unwrap();
    let bea = ledger.create_explorer("Bea").unwrap();

    let ava_sys = system(&mut ledger, "Alpha", 2, ava.id);
    let bea_sys = system(&mut ledger, "Beta", 2, bea.id);

    ledger.create_planet(planet("Ava in Alpha", ava_sys, ava.id)).unwrap();
    ledger.create_planet(planet("Ava in Beta", bea_sys, ava.id)).unwrap();
    ledger.create_planet(planet("Bea in Beta", bea_sys, bea.id)).unwrap();

    let removed = ledger.delete_explorer(ava.id).unwrap();
    assert_eq!(
        removed,
        Removed {
            explorers: 1,
            star_systems: 1,
            planets: 2
        }
    );

    assert!(ledger.get_explorer(ava.id).unwrap_err().is_not_found());
    assert!(ledger.get_star_system(ava_sys).unwrap_err().is_not_found());
    assert!(ledger.get_planet(ava_sys, "Ava in Alpha").unwrap_err().is_not_found());
    assert!(ledger.get_planet(bea_sys, "Ava in Beta").unwrap_err().is_not_found());

    // Unrelated explorer keeps its system, planet and score
    let bea_detail = ledger.get_explorer(bea.id).unwrap();
    assert_eq!(bea_detail.explorer.score, 2 + 5);
    assert_eq!(bea_detail.star_systems.len(), 1);
    assert_eq!(bea_detail.planets.len(), 1);

    assert!(ledger.delete_explorer(ava.id).unwrap_err().is_not_found());
}

#[test]
fn test_delete_explorer_removes_others_planets_in_its_systems() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();
    let bea = ledger.create_explorer("Bea").unwrap();
    let ava_sys = system(&mut ledger, "Alpha", 0, ava.id);

    ledger.create_planet(planet("Bea in Alpha", ava_sys, bea.id)).unwrap();

    let removed = ledger.delete_explorer(ava.id).unwrap();
    assert_eq!(removed.planets, 1);
    assert!(ledger.list_planets(None).unwrap().is_empty());
    // Score is never retracted
    assert_eq!(score_of(&ledger, bea.id), 5);
}

#[test]
fn test_delete_star_system_cascades_only_its_planets() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();
    let a = system(&mut ledger, "Alpha", 1, ava.id);
    let b = system(&mut ledger, "Beta", 1, ava.id);

    ledger.create_planet(planet("A1", a, ava.id)).unwrap();
    ledger.create_planet(planet("A2", a, ava.id)).unwrap();
    ledger.create_planet(planet("B1", b, ava.id)).unwrap();

    let removed = ledger.delete_star_system(a).unwrap();
    assert_eq!(removed.planets, 2);
    assert_eq!(removed.star_systems, 1);

    assert!(ledger.get_star_system(a).unwrap_err().is_not_found());
    assert!(ledger.planets_in_system(a).unwrap().is_empty());

    let beta = ledger.get_star_system(b).unwrap();
    assert_eq!(beta.planets.len(), 1);
    assert_eq!(beta.explorer_name.as_deref(), Some("Ava"));
    assert_eq!(score_of(&ledger, ava.id), 1 + 1 + 5 * 3);

    assert!(ledger.delete_star_system(a).unwrap_err().is_not_found());
}

// =============================================================================
// Leaderboard
// =============================================================================

#[test]
fn test_leaderboard_sorted_descending() {
    let mut ledger = Ledger::in_memory().unwrap();

    let mut scores: Vec<i64> = (0..20).map(|i| i * 3 + 1).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(RANDOM_SEED);
    scores.shuffle(&mut rng);

    for (i, score) in scores.iter().enumerate() {
        let explorer = ledger.create_explorer(&format!("Explorer {}", i)).unwrap();
        system(&mut ledger, &format!("S{}", i), *score, explorer.id);
    }

    let board = ledger.leaderboard().unwrap();
    assert_eq!(board.len(), scores.len());
    assert!(board.windows(2).all(|w| w[0].score > w[1].score));

    let mut expected = scores.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    let actual: Vec<i64> = board.iter().map(|e| e.score).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_leaderboard_ties_keep_registration_order() {
    let mut ledger = Ledger::in_memory().unwrap();
    let first = ledger.create_explorer("First").unwrap();
    let second = ledger.create_explorer("Second").unwrap();
    let third = ledger.create_explorer("Third").unwrap();
    system(&mut ledger, "S", 4, third.id);

    let ids: Vec<i64> = ledger.leaderboard().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![third.id, first.id, second.id]);
}

// =============================================================================
// Lookups and updates
// =============================================================================

#[test]
fn test_search_is_case_insensitive_substring() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava Nebulosa").unwrap();
    let sys = system(&mut ledger, "Alpha", 0, ava.id);
    ledger.create_planet(planet("Órbita Verde", sys, ava.id)).unwrap();

    let hit = ledger.search_explorer_by_name("NEBUL").unwrap();
    assert_eq!(hit.explorer.id, ava.id);
    assert_eq!(hit.star_systems.len(), 1);
    assert_eq!(hit.planets.len(), 1);

    let hit = ledger.search_planet_by_name("ÓRBITA").unwrap();
    assert_eq!(hit.planet.name, "Órbita Verde");

    let err = ledger.search_planet_by_name("nowhere").unwrap_err();
    assert_eq!(err.status_hint(), 404);
}

#[test]
fn test_update_planet_keeps_identity_and_score() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();
    let bea = ledger.create_explorer("Bea").unwrap();
    let sys = system(&mut ledger, "Alpha", 0, ava.id);
    ledger.create_planet(planet("Eden", sys, ava.id)).unwrap();

    let updated = ledger
        .update_planet(
            sys,
            "EDEN",
            PlanetUpdate {
                climate: "Paradise".into(),
                climate_quality: "bom".into(),
                resources: "Gold,Carbon".into(),
                explorer_id: bea.id,
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Eden");
    assert_eq!(updated.system_id, sys);
    assert_eq!(updated.explorer_id, bea.id);

    let stored = ledger.get_planet(sys, "eden").unwrap();
    assert_eq!(stored.planet, updated);
    assert_eq!(stored.explorer.unwrap().name, "Bea");

    assert_eq!(score_of(&ledger, ava.id), 5);
    assert_eq!(score_of(&ledger, bea.id), 0);
}

fn parse(args: &[&str]) -> Commands {
    let argv = std::iter::once("exploration-ledger").chain(args.iter().copied());
    Cli::try_parse_from(argv).expect("Failed to parse arguments").command
}

#[test]
fn test_command_line_updates_change_only_given_fields() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();
    let sys = system(&mut ledger, "Alpha", 6, ava.id);
    ledger
        .create_planet(Planet {
            climate: "Arid".into(),
            climate_quality: "ruim".into(),
            fauna: "Sparse".into(),
            resources: "Carbon,Salt".into(),
            ..planet("Dune", sys, ava.id)
        })
        .unwrap();
    let sys_arg = sys.to_string();

    match parse(&["system", "update", sys_arg.as_str(), "Alpha Prime"]) {
        Commands::System(SystemCommand::Update { id, changes }) => {
            let current = ledger.get_star_system(id).unwrap().system;
            ledger.update_star_system(id, changes.apply(&current)).unwrap();
        }
        other => panic!("unexpected command: {:?}", other),
    }
    let stored = ledger.get_star_system(sys).unwrap().system;
    assert_eq!(stored.name, "Alpha Prime");
    assert_eq!(stored.declared_planet_count, 6);
    assert_eq!(stored.explorer_id, ava.id);

    match parse(&["planet", "update", sys_arg.as_str(), "dune", "--fauna-quality", "bom"]) {
        Commands::Planet(PlanetCommand::Update {
            system,
            name,
            changes,
        }) => {
            let current = ledger.get_planet(system, &name).unwrap().planet;
            ledger
                .update_planet(system, &name, changes.apply(&current))
                .unwrap();
        }
        other => panic!("unexpected command: {:?}", other),
    }
    let stored = ledger.get_planet(sys, "Dune").unwrap().planet;
    assert_eq!(stored.climate, "Arid");
    assert_eq!(stored.climate_quality, "ruim");
    assert_eq!(stored.fauna, "Sparse");
    assert_eq!(stored.fauna_quality, "bom");
    assert_eq!(stored.resources, "Carbon,Salt");
    assert_eq!(stored.explorer_id, ava.id);

    // 6 for the system, 5 - 1 for the planet; updates never rescore
    assert_eq!(score_of(&ledger, ava.id), 10);
}

#[test]
fn test_parent_validation_errors() {
    let mut ledger = Ledger::in_memory().unwrap();
    let ava = ledger.create_explorer("Ava").unwrap();

    let err = ledger
        .create_star_system(NewStarSystem {
            name: "Alpha".into(),
            declared_planet_count: 1,
            explorer_id: ava.id + 100,
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "Explorer", .. }));

    let err = ledger.create_planet(planet("Nowhere", 77, ava.id)).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "StarSystem", .. }));

    assert_eq!(ledger.store().row_count(&STAR_SYSTEMS).unwrap(), 0);
    assert_eq!(ledger.store().row_count(&PLANETS).unwrap(), 0);
    assert_eq!(score_of(&ledger, ava.id), 0);
}

// =============================================================================
// Persistence and concurrency
// =============================================================================

fn reopen(path: &Path) -> Ledger {
    Ledger::open(path).expect("Failed to reopen ledger")
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let mut ledger = reopen(&path);
        let ava = ledger.create_explorer("Ava").unwrap();
        let sys = system(&mut ledger, "Alpha", 2, ava.id);
        ledger.create_planet(planet("Eden", sys, ava.id)).unwrap();
    }

    let ledger = reopen(&path);
    assert_eq!(ledger.store().row_count(&EXPLORERS).unwrap(), 1);
    assert_eq!(ledger.leaderboard().unwrap()[0].score, 7);
    assert_eq!(ledger.list_star_systems().unwrap()[0].system.name, "Alpha");
}

#[test]
fn test_concurrent_duplicate_planets_admit_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let (explorer_id, system_id) = {
        let mut ledger = reopen(&path);
        let ava = ledger.create_explorer("Ava").unwrap();
        (ava.id, system(&mut ledger, "Alpha", 0, ava.id))
    };

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let path = path.clone();
            thread::spawn(move || {
                let mut ledger = reopen(&path);
                ledger.create_planet(Planet {
                    name: if i % 2 == 0 { "Twin".into() } else { "TWIN".into() },
                    system_id,
                    explorer_id,
                    ..Default::default()
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let created = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::Conflict(_))))
        .count();

    assert_eq!(created, 1);
    assert_eq!(conflicts, 3);
    assert_eq!(score_of(&reopen(&path), explorer_id), 5);
}
