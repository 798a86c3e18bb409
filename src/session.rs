//! Validating editing session around a [`Schema`].
//!
//! The model's mutators are total and silently ignore duplicates. A
//! `Designer` runs the user-facing checks first (empty names, duplicates,
//! unknown tables, self references) and reports them as [`DesignError`],
//! leaving the schema untouched whenever a check fails.

use crate::arrange::Arrangement;
use crate::document::{self, DocumentError};
use crate::measure::BlockMetrics;
use crate::model::{Attribute, DEFAULT_POSITION, Relationship, Schema, Table};
use crate::sql::generate_sql;
use crate::svg::SvgRenderer;
use crate::view::Canvas;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    #[error("Table name cannot be empty")]
    EmptyTableName,
    #[error("Table '{0}' already exists")]
    DuplicateTable(String),
    #[error("Table '{0}' does not exist")]
    UnknownTable(String),
    #[error("Attribute name cannot be empty")]
    EmptyAttributeName,
    #[error("Attribute '{attribute}' already exists in table '{table}'")]
    DuplicateAttribute { table: String, attribute: String },
    #[error("Attribute '{attribute}' does not exist in table '{table}'")]
    UnknownAttribute { table: String, attribute: String },
    #[error("At least {0} tables required to create a relationship")]
    NotEnoughTables(usize),
    #[error("Cannot create self-referencing relationship on '{0}'")]
    SelfReference(String),
    #[error("Relationship {0} does not exist")]
    UnknownRelationship(String),
    #[error("Schema name cannot be empty")]
    EmptySchemaName,
    #[error("Position of table '{0}' must be finite")]
    InvalidPosition(String),
}

#[derive(Debug, Clone)]
pub struct DesignerConfig {
    /// Where newly created tables are placed.
    pub default_position: (f64, f64),
    pub min_tables_for_relationship: usize,
    pub metrics: BlockMetrics,
    pub arrangement: Arrangement,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            default_position: (DEFAULT_POSITION, DEFAULT_POSITION),
            min_tables_for_relationship: 2,
            metrics: BlockMetrics::default(),
            arrangement: Arrangement::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Designer {
    schema: Schema,
    config: DesignerConfig,
}

impl Designer {
    pub fn new(config: DesignerConfig) -> Self {
        Self {
            schema: Schema::default(),
            config,
        }
    }

    pub fn with_schema(schema: Schema, config: DesignerConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    // ----- tables -----

    pub fn create_table(&mut self, name: &str) -> Result<(), DesignError> {
        let (x, y) = self.config.default_position;
        self.create_table_at(name, x, y)
    }

    pub fn create_table_at(&mut self, name: &str, x: f64, y: f64) -> Result<(), DesignError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DesignError::EmptyTableName);
        }
        if self.schema.contains_table(name) {
            return Err(DesignError::DuplicateTable(name.to_string()));
        }
        check_position(name, x, y)?;

        self.schema.add_table(Table::new(name).with_position(x, y));
        tracing::debug!("Created table {} at ({}, {})", name, x, y);
        Ok(())
    }

    /// Delete a table and its relationships. Returns how many relationships
    /// went with it.
    pub fn delete_table(&mut self, name: &str) -> Result<usize, DesignError> {
        let name = name.trim();
        if !self.schema.contains_table(name) {
            return Err(DesignError::UnknownTable(name.to_string()));
        }

        let before = self.schema.relationships().len();
        self.schema.remove_table(name);
        let dropped = before - self.schema.relationships().len();
        tracing::debug!("Deleted table {} and {} relationships", name, dropped);
        Ok(dropped)
    }

    pub fn move_table(&mut self, name: &str, x: f64, y: f64) -> Result<(), DesignError> {
        let name = name.trim();
        if !self.schema.contains_table(name) {
            return Err(DesignError::UnknownTable(name.to_string()));
        }
        check_position(name, x, y)?;

        self.schema.move_table(name, x, y);
        tracing::debug!("Moved table {} to ({}, {})", name, x, y);
        Ok(())
    }

    // ----- attributes -----

    pub fn add_attribute(&mut self, table: &str, attr: Attribute) -> Result<(), DesignError> {
        let table = table.trim();
        let attr = trim_attribute(attr)?;
        let target = self.table_mut(table)?;
        if target.attribute(&attr.name).is_some() {
            return Err(DesignError::DuplicateAttribute {
                table: table.to_string(),
                attribute: attr.name,
            });
        }

        tracing::debug!("Added attribute {}.{} {}", table, attr.name, attr.data_type);
        target.add_attribute(attr);
        Ok(())
    }

    pub fn remove_attribute(&mut self, table: &str, name: &str) -> Result<(), DesignError> {
        let table = table.trim();
        if !self.table_mut(table)?.remove_attribute(name) {
            return Err(unknown_attribute(table, name));
        }
        tracing::debug!("Removed attribute {}.{}", table, name);
        Ok(())
    }

    /// Replace the attribute called `name`, keeping its position in the table.
    pub fn edit_attribute(&mut self, table: &str, name: &str, attr: Attribute) -> Result<(), DesignError> {
        let table = table.trim();
        let attr = trim_attribute(attr)?;
        let target = self.table_mut(table)?;
        if target.attribute(name).is_none() {
            return Err(unknown_attribute(table, name));
        }
        if attr.name != name && target.attribute(&attr.name).is_some() {
            return Err(DesignError::DuplicateAttribute {
                table: table.to_string(),
                attribute: attr.name,
            });
        }

        tracing::debug!("Edited attribute {}.{} -> {}", table, name, attr.name);
        target.replace_attribute(name, attr);
        Ok(())
    }

    // ----- relationships -----

    /// Relate two existing, distinct tables. An identical relationship that
    /// is already stored is left as is.
    pub fn add_relationship(&mut self, mut rel: Relationship) -> Result<(), DesignError> {
        rel.from_table = rel.from_table.trim().to_string();
        rel.to_table = rel.to_table.trim().to_string();
        let min = self.config.min_tables_for_relationship;
        if self.schema.table_count() < min {
            return Err(DesignError::NotEnoughTables(min));
        }
        if rel.from_table == rel.to_table {
            return Err(DesignError::SelfReference(rel.from_table));
        }
        for name in [&rel.from_table, &rel.to_table] {
            if !self.schema.contains_table(name) {
                return Err(DesignError::UnknownTable(name.clone()));
            }
        }

        rel.from_key = rel.from_key.trim().to_string();
        rel.to_key = rel.to_key.trim().to_string();

        let summary = describe(&rel);
        if self.schema.add_relationship(rel) {
            tracing::debug!("Created relationship {}", summary);
        } else {
            tracing::debug!("Relationship {} already exists", summary);
        }
        Ok(())
    }

    pub fn remove_relationship(&mut self, rel: &Relationship) -> Result<(), DesignError> {
        if !self.schema.remove_relationship(rel) {
            return Err(DesignError::UnknownRelationship(describe(rel)));
        }
        tracing::debug!("Removed relationship {}", describe(rel));
        Ok(())
    }

    // ----- whole schema -----

    pub fn rename_schema(&mut self, name: &str) -> Result<(), DesignError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DesignError::EmptySchemaName);
        }
        self.schema.set_name(name);
        tracing::debug!("Renamed schema to {}", name);
        Ok(())
    }

    /// Start over with an empty default schema.
    pub fn new_schema(&mut self) {
        self.schema = Schema::default();
        tracing::debug!("Started a new schema");
    }

    /// Drop all tables and relationships, keeping the schema name.
    pub fn clear(&mut self) {
        self.schema.clear();
        tracing::debug!("Cleared schema {}", self.schema.name());
    }

    pub fn arrange(&mut self) {
        self.config.arrangement.apply(&mut self.schema);
    }

    // ----- files and output -----

    /// Replace the current schema with the one stored at `path`. On error
    /// the current schema is kept.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let schema = document::load(path)?;
        self.schema = schema;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        document::save(path, &self.schema)
    }

    pub fn export_sql(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        document::export_sql(path, &self.schema)
    }

    pub fn sql(&self) -> String {
        generate_sql(&self.schema)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::from_schema(&self.schema, &self.config.metrics)
    }

    pub fn render_svg(&self, selected: Option<&str>) -> String {
        let mut canvas = self.canvas();
        if let Some(name) = selected {
            canvas.select(name);
        }
        SvgRenderer::new(self.config.metrics.clone()).render(&canvas)
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, DesignError> {
        self.schema
            .table_mut(name)
            .ok_or_else(|| DesignError::UnknownTable(name.to_string()))
    }
}

// JSON has no representation for NaN or infinity
fn check_position(table: &str, x: f64, y: f64) -> Result<(), DesignError> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(DesignError::InvalidPosition(table.to_string()))
    }
}

fn trim_attribute(mut attr: Attribute) -> Result<Attribute, DesignError> {
    attr.name = attr.name.trim().to_string();
    if attr.name.is_empty() {
        return Err(DesignError::EmptyAttributeName);
    }
    attr.data_type = attr.data_type.trim().to_string();
    Ok(attr)
}

fn unknown_attribute(table: &str, name: &str) -> DesignError {
    DesignError::UnknownAttribute {
        table: table.to_string(),
        attribute: name.to_string(),
    }
}

fn describe(rel: &Relationship) -> String {
    format!("{} ({}) -> {}", rel.from_table, rel.relationship_type, rel.to_table)
}
