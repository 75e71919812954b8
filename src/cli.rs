use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::{Planet, PlanetUpdate, StarSystem, StarSystemUpdate};

#[derive(Parser, Debug)]
#[command(name = "exploration-ledger")]
#[command(version, about = "Track explorers, star systems and planets, and who scored what")]
pub struct Cli {
    /// SQLite database path (defaults to $EXPLORATION_LEDGER_DB, then the user data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log verbosity (RUST_LOG takes precedence when set)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage explorers
    #[command(subcommand)]
    Explorer(ExplorerCommand),

    /// Manage star systems
    #[command(subcommand)]
    System(SystemCommand),

    /// Manage planets
    #[command(subcommand)]
    Planet(PlanetCommand),

    /// Print explorers ranked by score
    Leaderboard,

    /// Open the interactive leaderboard
    Board,

    /// List ledger tables and row counts
    Tables,
}

#[derive(Subcommand, Debug)]
pub enum ExplorerCommand {
    /// Register a new explorer
    Add { name: String },

    /// Rename an explorer
    Rename { id: i64, name: String },

    /// Delete an explorer with its star systems and planets
    Remove { id: i64 },

    /// Show an explorer with its systems and planets
    Show { id: i64 },

    /// Find the first explorer whose name contains the text
    Find { fragment: String },

    /// List all explorers
    List,
}

#[derive(Subcommand, Debug)]
pub enum SystemCommand {
    /// Register a star system; credits the declared planet count
    Add {
        name: String,

        /// Owning explorer id
        #[arg(short, long)]
        explorer: i64,

        /// Number of planets declared for the system
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        planets: i64,
    },

    /// Change a star system's name, declared count or owner
    Update {
        id: i64,

        #[command(flatten)]
        changes: SystemChanges,
    },

    /// Delete a star system and its planets
    Remove { id: i64 },

    /// Show a star system with its planets
    Show { id: i64 },

    /// List the planets registered in a star system
    Planets { id: i64 },

    /// List all star systems
    List,
}

#[derive(Subcommand, Debug)]
pub enum PlanetCommand {
    /// Register a planet; credits 5 points plus quality adjustments
    Add {
        name: String,

        /// Star system id
        #[arg(short, long)]
        system: i64,

        /// Credited explorer id
        #[arg(short, long)]
        explorer: i64,

        #[command(flatten)]
        traits: PlanetTraits,
    },

    /// Change a planet's descriptors, ratings, resources or explorer
    Update {
        /// Star system id
        system: i64,
        name: String,

        #[command(flatten)]
        changes: PlanetChanges,
    },

    /// Delete a planet
    Remove { system: i64, name: String },

    /// Show a planet
    Show { system: i64, name: String },

    /// Find the first planet whose name contains the text
    Find { fragment: String },

    /// List planets, optionally in one system
    List {
        #[arg(short, long)]
        system: Option<i64>,
    },
}

/// Descriptors and ratings; ratings are `bom`, `ruim` or anything else
#[derive(Args, Debug, Default)]
pub struct PlanetTraits {
    #[arg(long, default_value = "")]
    pub climate: String,
    #[arg(long, default_value = "")]
    pub climate_quality: String,
    #[arg(long, default_value = "")]
    pub fauna: String,
    #[arg(long, default_value = "")]
    pub fauna_quality: String,
    #[arg(long, default_value = "")]
    pub flora: String,
    #[arg(long, default_value = "")]
    pub flora_quality: String,
    #[arg(long, default_value = "")]
    pub sentinels: String,
    #[arg(long, default_value = "")]
    pub sentinel_quality: String,

    /// Resources found (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub resources: Vec<String>,
}

impl PlanetTraits {
    /// Resources joined back into the stored comma-separated form
    pub fn resources_field(&self) -> String {
        join_resources(&self.resources)
    }
}

/// Star system fields to change; omitted flags keep the stored value
#[derive(Args, Debug, Default)]
pub struct SystemChanges {
    /// New name
    pub name: Option<String>,

    /// New owning explorer id
    #[arg(short, long)]
    pub explorer: Option<i64>,

    /// New declared planet count
    #[arg(short, long, allow_negative_numbers = true)]
    pub planets: Option<i64>,
}

impl SystemChanges {
    pub fn apply(self, current: &StarSystem) -> StarSystemUpdate {
        StarSystemUpdate {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            declared_planet_count: self.planets.unwrap_or(current.declared_planet_count),
            explorer_id: self.explorer.unwrap_or(current.explorer_id),
        }
    }
}

/// Planet fields to change; omitted flags keep the stored value
#[derive(Args, Debug, Default)]
pub struct PlanetChanges {
    /// New credited explorer id
    #[arg(short, long)]
    pub explorer: Option<i64>,

    #[arg(long)]
    pub climate: Option<String>,
    #[arg(long)]
    pub climate_quality: Option<String>,
    #[arg(long)]
    pub fauna: Option<String>,
    #[arg(long)]
    pub fauna_quality: Option<String>,
    #[arg(long)]
    pub flora: Option<String>,
    #[arg(long)]
    pub flora_quality: Option<String>,
    #[arg(long)]
    pub sentinels: Option<String>,
    #[arg(long)]
    pub sentinel_quality: Option<String>,

    /// Replacement resource list (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub resources: Option<Vec<String>>,
}

impl PlanetChanges {
    pub fn apply(self, current: &Planet) -> PlanetUpdate {
        let mut update = PlanetUpdate::from_planet(current);

        let fields = [
            (self.climate, &mut update.climate),
            (self.climate_quality, &mut update.climate_quality),
            (self.fauna, &mut update.fauna),
            (self.fauna_quality, &mut update.fauna_quality),
            (self.flora, &mut update.flora),
            (self.flora_quality, &mut update.flora_quality),
            (self.sentinels, &mut update.sentinels),
            (self.sentinel_quality, &mut update.sentinel_quality),
        ];
        for (change, field) in fields {
            if let Some(value) = change {
                *field = value;
            }
        }

        if let Some(resources) = self.resources {
            update.resources = join_resources(&resources);
        }
        if let Some(explorer_id) = self.explorer {
            update.explorer_id = explorer_id;
        }
        update
    }
}

fn join_resources(resources: &[String]) -> String {
    resources
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
