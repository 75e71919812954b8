//! Table schema definitions for the exploration ledger

use super::types::*;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static EXPLORERS: TableSchema = TableSchema {
    name: "explorers",
    columns: &[
        Column::id("id"),
        Column::required("name", ColumnType::Text),
        Column::required("score", ColumnType::Integer).default("0"),
    ],
    foreign_keys: &[],
    indexes: &[Index::on(&["score"])],
};

// =============================================================================
// Dependent Tables
// =============================================================================

pub static STAR_SYSTEMS: TableSchema = TableSchema {
    name: "star_systems",
    columns: &[
        Column::id("id"),
        Column::required("name", ColumnType::Text),
        Column::required("declared_planet_count", ColumnType::Integer).default("0"),
        Column::required("explorer_id", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("explorer_id", "explorers")],
    indexes: &[],
};

pub static PLANETS: TableSchema = TableSchema {
    name: "planets",
    columns: &[
        Column::natural_key("name", ColumnType::Text),
        // Lowercased name; carries the case-insensitive uniqueness constraint
        Column::required("name_key", ColumnType::Text),
        Column::required("climate", ColumnType::Text).default("''"),
        Column::required("climate_quality", ColumnType::Text).default("''"),
        Column::required("fauna", ColumnType::Text).default("''"),
        Column::required("fauna_quality", ColumnType::Text).default("''"),
        Column::required("flora", ColumnType::Text).default("''"),
        Column::required("flora_quality", ColumnType::Text).default("''"),
        Column::required("sentinels", ColumnType::Text).default("''"),
        Column::required("sentinel_quality", ColumnType::Text).default("''"),
        Column::required("resources", ColumnType::Text).default("''"),
        Column::required("system_id", ColumnType::Integer),
        Column::required("explorer_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("system_id", "star_systems"),
        ForeignKey::new("explorer_id", "explorers"),
    ],
    indexes: &[Index::unique(&["name_key"])],
};

// =============================================================================
// Table Registry
// =============================================================================

/// All tables, in declaration order
pub static ALL_TABLES: &[&TableSchema] = &[&EXPLORERS, &STAR_SYSTEMS, &PLANETS];

/// Look up a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().copied().find(|t| t.name == name)
}

/// Names of every table in the ledger
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
