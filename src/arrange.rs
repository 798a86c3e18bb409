//! Automatic table placement in dependency rows.
//!
//! A relationship's `from_table` is treated as the parent of its `to_table`.
//! Parents go to upper rows, so 1-N chains read top to bottom.

use crate::measure::BlockMetrics;
use crate::model::Schema;
use crate::view::attribute_line;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct Arrangement {
    pub origin: (f64, f64),
    pub gap_x: f64,
    pub gap_y: f64,
    pub metrics: BlockMetrics,
}

impl Default for Arrangement {
    fn default() -> Self {
        Self {
            origin: (100.0, 100.0),
            gap_x: 80.0,
            gap_y: 60.0,
            metrics: BlockMetrics::default(),
        }
    }
}

impl Arrangement {
    /// Group table names into rows. Row order within a level follows the
    /// schema's table order.
    pub fn levels(&self, schema: &Schema) -> Vec<Vec<String>> {
        if schema.table_count() == 0 {
            return vec![];
        }

        // child -> parents, ignoring self references and unknown tables
        let mut parents: HashMap<&str, HashSet<&str>> =
            schema.table_names().map(|name| (name, HashSet::new())).collect();
        for rel in schema.relationships() {
            if rel.from_table == rel.to_table || !schema.contains_table(&rel.from_table) {
                continue;
            }
            if let Some(deps) = parents.get_mut(rel.to_table.as_str()) {
                deps.insert(rel.from_table.as_str());
            }
        }

        let mut levels: HashMap<&str, usize> = parents
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(name, _)| (*name, 0))
            .collect();

        let mut changed = true;
        while changed {
            changed = false;
            for (name, deps) in &parents {
                if levels.contains_key(name) {
                    continue;
                }
                let resolved: Vec<usize> = deps.iter().filter_map(|p| levels.get(p).copied()).collect();
                if resolved.len() == deps.len() {
                    let level = resolved.iter().max().copied().unwrap_or(0) + 1;
                    levels.insert(*name, level);
                    changed = true;
                }
            }
        }

        // Whatever is left sits on a cycle
        let cycle_level = levels.values().copied().max().map_or(0, |max| max + 1);

        let mut rows: Vec<Vec<String>> = Vec::new();
        for name in schema.table_names() {
            let level = levels.get(name).copied().unwrap_or(cycle_level);
            if rows.len() <= level {
                rows.resize(level + 1, Vec::new());
            }
            rows[level].push(name.to_string());
        }

        rows.into_iter().filter(|r| !r.is_empty()).collect()
    }

    /// Move every table to its arranged position.
    pub fn apply(&self, schema: &mut Schema) {
        let rows = self.levels(schema);
        let mut y = self.origin.1;

        for row in &rows {
            let mut x = self.origin.0;
            let mut row_height: f64 = 0.0;

            for name in row {
                let Some(table) = schema.table(name) else {
                    continue;
                };
                let lines: Vec<String> = table.attributes().iter().map(attribute_line).collect();
                let (width, height) = self.metrics.block_size(table.name(), &lines);

                schema.move_table(name, x, y);
                x += width + self.gap_x;
                row_height = row_height.max(height);
            }

            y += row_height + self.gap_y;
        }

        tracing::debug!("Arranged {} tables in {} rows", schema.table_count(), rows.len());
    }
}
