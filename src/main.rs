use anyhow::{Context, Result};
use exploration_ledger::{
    cli::{Cli, Commands, ExplorerCommand, LogLevel, PlanetCommand, PlanetTraits, SystemCommand},
    config::{db_path_from_env, resolve_db_path},
    model::{NewStarSystem, Planet, PlanetRemoved},
    render,
    schema::{get_table, table_names},
    BoardApp, Ledger,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Print `value` as JSON, or the text rendering otherwise
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to serialize output")?
        );
    } else {
        let text = text(value);
        println!("{}", text.trim_end());
    }
    Ok(())
}

fn join_lines<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}

fn planet_from_traits(
    name: String,
    system_id: i64,
    explorer_id: i64,
    traits: PlanetTraits,
) -> Planet {
    let resources = traits.resources_field();
    Planet {
        name,
        climate: traits.climate,
        climate_quality: traits.climate_quality,
        fauna: traits.fauna,
        fauna_quality: traits.fauna_quality,
        flora: traits.flora,
        flora_quality: traits.flora_quality,
        sentinels: traits.sentinels,
        sentinel_quality: traits.sentinel_quality,
        resources,
        system_id,
        explorer_id,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level);

    let db_path = resolve_db_path(cli.db, db_path_from_env())?;
    let mut ledger = Ledger::open(&db_path)
        .with_context(|| format!("Failed to open ledger at {:?}", db_path))?;
    let json = cli.json;

    match cli.command {
        Commands::Explorer(command) => match command {
            ExplorerCommand::Add { name } => {
                let explorer = ledger.create_explorer(&name)?;
                emit(json, &explorer, |e| format!("Created {}", render::explorer_line(e)))?;
            }
            ExplorerCommand::Rename { id, name } => {
                let explorer = ledger.update_explorer(id, &name)?;
                emit(json, &explorer, |e| format!("Renamed {}", render::explorer_line(e)))?;
            }
            ExplorerCommand::Remove { id } => {
                let removed = ledger.delete_explorer(id)?;
                emit(json, &removed, render::removed)?;
            }
            ExplorerCommand::Show { id } => {
                let detail = ledger.get_explorer(id)?;
                emit(json, &detail, render::explorer_detail)?;
            }
            ExplorerCommand::Find { fragment } => {
                let detail = ledger.search_explorer_by_name(&fragment)?;
                emit(json, &detail, render::explorer_detail)?;
            }
            ExplorerCommand::List => {
                let explorers = ledger.list_explorers()?;
                emit(json, &explorers, |list| join_lines(list, render::explorer_line))?;
            }
        },

        Commands::System(command) => match command {
            SystemCommand::Add {
                name,
                explorer,
                planets,
            } => {
                let created = ledger.create_star_system(NewStarSystem {
                    name,
                    declared_planet_count: planets,
                    explorer_id: explorer,
                })?;
                emit(json, &created, render::star_system_created)?;
            }
            SystemCommand::Update { id, changes } => {
                let current = ledger.get_star_system(id)?.system;
                let system = ledger.update_star_system(id, changes.apply(&current))?;
                emit(json, &system, |s| format!("Updated star system #{} '{}'", s.id, s.name))?;
            }
            SystemCommand::Remove { id } => {
                let removed = ledger.delete_star_system(id)?;
                emit(json, &removed, render::removed)?;
            }
            SystemCommand::Show { id } => {
                let detail = ledger.get_star_system(id)?;
                emit(json, &detail, render::star_system_detail)?;
            }
            SystemCommand::Planets { id } => {
                let planets = ledger.planets_in_system(id)?;
                emit(json, &planets, |list| join_lines(list, render::planet_block))?;
            }
            SystemCommand::List => {
                let systems = ledger.list_star_systems()?;
                emit(json, &systems, |list| join_lines(list, render::star_system_summary))?;
            }
        },

        Commands::Planet(command) => match command {
            PlanetCommand::Add {
                name,
                system,
                explorer,
                traits,
            } => {
                let created =
                    ledger.create_planet(planet_from_traits(name, system, explorer, traits))?;
                emit(json, &created, render::planet_created)?;
            }
            PlanetCommand::Update {
                system,
                name,
                changes,
            } => {
                let current = ledger.get_planet(system, &name)?.planet;
                let planet = ledger.update_planet(system, &name, changes.apply(&current))?;
                emit(json, &planet, |p| format!("Updated planet '{}'", p.name))?;
            }
            PlanetCommand::Remove { system, name } => {
                ledger.delete_planet(system, &name)?;
                let removed = PlanetRemoved {
                    system_id: system,
                    name,
                };
                emit(json, &removed, render::planet_removed)?;
            }
            PlanetCommand::Show { system, name } => {
                let detail = ledger.get_planet(system, &name)?;
                emit(json, &detail, render::planet_detail)?;
            }
            PlanetCommand::Find { fragment } => {
                let detail = ledger.search_planet_by_name(&fragment)?;
                emit(json, &detail, render::planet_detail)?;
            }
            PlanetCommand::List { system } => {
                let planets = ledger.list_planets(system)?;
                emit(json, &planets, |list| join_lines(list, render::planet_summary))?;
            }
        },

        Commands::Leaderboard => {
            let explorers = ledger.leaderboard()?;
            emit(json, &explorers, |list| render::leaderboard(list))?;
        }

        Commands::Board => {
            let app = BoardApp::new()?;
            app.run(&ledger)?;
        }

        Commands::Tables => {
            println!("Tables in {:?}:\n", db_path);
            for name in table_names() {
                if let Some(table) = get_table(name) {
                    println!("  {:<14} {}", name, ledger.store().row_count(table)?);
                }
            }
        }
    }

    Ok(())
}
