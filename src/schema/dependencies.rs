use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use std::collections::{HashMap, HashSet};

/// Orders tables by their foreign key relationships
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let deps = ALL_TABLES
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { deps }
    }

    /// All tables with parents before children, the order tables must be created in
    pub fn creation_order(&self) -> Result<Vec<&'static TableSchema>, String> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in ALL_TABLES {
            if !visited.contains(table.name) {
                self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
            }
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<_> = deps.iter().copied().collect();
            deps.sort_unstable();
            for dep in deps {
                if dep != name {
                    self.visit(dep, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        match get_table(name) {
            Some(table) => result.push(table),
            None => return Err(format!("Unknown table: {}", name)),
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_order_puts_parents_first() {
        let resolver = DependencyResolver::new();
        let tables = resolver.creation_order().unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name).collect();

        let explorers_pos = names.iter().position(|&n| n == "explorers").unwrap();
        let systems_pos = names.iter().position(|&n| n == "star_systems").unwrap();
        let planets_pos = names.iter().position(|&n| n == "planets").unwrap();

        assert!(explorers_pos < systems_pos);
        assert!(systems_pos < planets_pos);
        assert_eq!(names.len(), 3);
    }
}
