use crate::schema::{KeyKind, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let pk = match col.key {
            KeyKind::None => "",
            KeyKind::Natural => " PRIMARY KEY",
            KeyKind::AutoIncrement => " PRIMARY KEY AUTOINCREMENT",
        };
        // SQLite tolerates NULL in non-integer primary keys unless told otherwise
        let null_constraint = if !col.nullable && col.key != KeyKind::AutoIncrement {
            " NOT NULL"
        } else {
            ""
        };
        let default = col
            .default
            .map(|value| format!(" DEFAULT {}", value))
            .unwrap_or_default();

        columns.push(format!(
            "    {} {}{}{}{}",
            col.name,
            col.col_type.sql_type(),
            pk,
            null_constraint,
            default
        ));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns and explicit indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let fk_indexes = schema.foreign_keys.iter().map(|fk| {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            schema.name, fk.column, schema.name, fk.column
        )
    });

    let explicit = schema.indexes.iter().map(|index| {
        let unique = if index.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            unique,
            schema.name,
            index.columns.join("_"),
            schema.name,
            index.columns.join(", ")
        )
    });

    fk_indexes.chain(explicit).collect()
}
