//! Plain-text rendering of ledger results for the command line

use std::fmt::Write;

use crate::ledger::Removed;
use crate::model::{
    Explorer, ExplorerDetail, Planet, PlanetCreated, PlanetDetail, PlanetRemoved, PlanetSummary,
    StarSystemCreated, StarSystemDetail, StarSystemSummary,
};

pub fn explorer_line(explorer: &Explorer) -> String {
    format!("#{} {} ({} pts)", explorer.id, explorer.name, explorer.score)
}

pub fn leaderboard(explorers: &[Explorer]) -> String {
    let mut out = String::new();
    let width = explorers.iter().map(|e| e.name.len()).max().unwrap_or(4).max(4);

    let _ = writeln!(out, "{:>4}  {:<width$}  {:>6}", "Pos", "Name", "Score");
    for (i, explorer) in explorers.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}º  {:<width$}  {:>6}",
            i + 1,
            explorer.name,
            explorer.score
        );
    }
    out
}

pub fn explorer_detail(detail: &ExplorerDetail) -> String {
    let mut out = explorer_line(&detail.explorer);
    out.push('\n');

    let _ = writeln!(out, "  Star systems ({}):", detail.star_systems.len());
    for system in &detail.star_systems {
        let _ = writeln!(
            out,
            "    #{} {} ({} declared planets)",
            system.id, system.name, system.declared_planet_count
        );
    }

    let _ = writeln!(out, "  Planets ({}):", detail.planets.len());
    for planet in &detail.planets {
        let _ = writeln!(out, "    {} (system #{})", planet.name, planet.system_id);
    }
    out
}

pub fn star_system_summary(summary: &StarSystemSummary) -> String {
    format!(
        "#{} {} ({} declared planets) by {}",
        summary.system.id,
        summary.system.name,
        summary.system.declared_planet_count,
        summary.explorer_name.as_deref().unwrap_or("unknown")
    )
}

pub fn star_system_detail(detail: &StarSystemDetail) -> String {
    let mut out = format!(
        "#{} {}\n  Declared planets: {}\n  Discovered by: {} (#{})\n",
        detail.system.id,
        detail.system.name,
        detail.system.declared_planet_count,
        detail.explorer_name.as_deref().unwrap_or("unknown"),
        detail.system.explorer_id
    );

    let _ = writeln!(out, "  Planets ({}):", detail.planets.len());
    for planet in &detail.planets {
        out.push_str(&indent(&planet_block(planet), 4));
    }
    out
}

pub fn planet_block(planet: &Planet) -> String {
    let mut out = format!("{}\n", planet.name);
    let rows = [
        ("Climate", &planet.climate, &planet.climate_quality),
        ("Fauna", &planet.fauna, &planet.fauna_quality),
        ("Flora", &planet.flora, &planet.flora_quality),
        ("Sentinels", &planet.sentinels, &planet.sentinel_quality),
    ];
    for (label, value, quality) in rows {
        let _ = writeln!(out, "  {:<10} {} [{}]", label, value, quality);
    }

    let resources = planet.resource_list();
    let resources = if resources.is_empty() {
        "none".to_string()
    } else {
        resources.join(", ")
    };
    let _ = writeln!(out, "  {:<10} {}", "Resources", resources);
    out
}

pub fn planet_summary(summary: &PlanetSummary) -> String {
    format!(
        "{} in {} (#{}) by {} (#{})",
        summary.planet.name,
        summary.system_name.as_deref().unwrap_or("unknown"),
        summary.planet.system_id,
        summary.explorer_name.as_deref().unwrap_or("unknown"),
        summary.planet.explorer_id
    )
}

pub fn planet_detail(detail: &PlanetDetail) -> String {
    let mut out = planet_block(&detail.planet);
    if let Some(system) = &detail.star_system {
        let _ = writeln!(out, "  System:    #{} {}", system.id, system.name);
    }
    if let Some(explorer) = &detail.explorer {
        let _ = writeln!(out, "  Explorer:  {}", explorer_line(explorer));
    }
    out
}

pub fn star_system_created(created: &StarSystemCreated) -> String {
    format!(
        "Created star system #{} '{}'. {}: +{} points (total: {})",
        created.system.id,
        created.system.name,
        created.explorer_name,
        created.system.declared_planet_count,
        created.explorer_score
    )
}

pub fn planet_created(created: &PlanetCreated) -> String {
    format!(
        "Created planet '{}' in {}. {}: +{} points (base: {}, qualities: {:+}) - total: {}",
        created.planet.name,
        created.system_name,
        created.explorer_name,
        created.score.total,
        created.score.base,
        created.score.quality_bonus,
        created.explorer_score
    )
}

pub fn removed(removed: &Removed) -> String {
    format!(
        "Removed {} explorer(s), {} star system(s), {} planet(s)",
        removed.explorers, removed.star_systems, removed.planets
    )
}

pub fn planet_removed(removed: &PlanetRemoved) -> String {
    format!(
        "Removed planet '{}' from star system #{}",
        removed.name, removed.system_id
    )
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines().map(|line| format!("{}{}\n", pad, line)).collect()
}
