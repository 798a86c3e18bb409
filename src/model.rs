//! Schema data model: attributes, tables, relationships and the schema owning them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SCHEMA_NAME: &str = "MySchema";
pub const DEFAULT_POSITION: f64 = 100.0;

fn default_position() -> f64 {
    DEFAULT_POSITION
}

fn default_nullable() -> bool {
    true
}

fn default_schema_name() -> String {
    DEFAULT_SCHEMA_NAME.to_string()
}

/// One column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// Free-form type label, e.g. `VARCHAR(255)`.
    pub data_type: String,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_nullable: true,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn not_null(self) -> Self {
        self.nullable(false)
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }
}

/// A named, ordered set of attributes placed on the canvas.
///
/// Attribute names are unique within a table. The name itself is fixed at
/// construction since the owning [`Schema`] keys tables by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableRecord")]
pub struct Table {
    name: String,
    x: f64,
    y: f64,
    attributes: Vec<Attribute>,
}

#[derive(Deserialize)]
struct TableRecord {
    name: String,
    #[serde(default = "default_position")]
    x: f64,
    #[serde(default = "default_position")]
    y: f64,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

impl From<TableRecord> for Table {
    fn from(record: TableRecord) -> Self {
        let mut table = Table::new(record.name).with_position(record.x, record.y);
        for attr in record.attributes {
            table.add_attribute(attr);
        }
        table
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: DEFAULT_POSITION,
            y: DEFAULT_POSITION,
            attributes: Vec::new(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.set_position(x, y);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.attributes.iter().filter(|a| a.is_primary_key)
    }

    /// Append `attr` unless an attribute with the same name exists.
    /// Returns whether the table changed.
    pub fn add_attribute(&mut self, attr: Attribute) -> bool {
        if self.attribute(&attr.name).is_some() {
            return false;
        }
        self.attributes.push(attr);
        true
    }

    /// Remove the attribute named `name`. Returns whether one was removed.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.name != name);
        self.attributes.len() != before
    }

    /// Overwrite the attribute named `name` in place.
    ///
    /// No-op when `name` is absent or when `attr` would take the name of a
    /// different sibling.
    pub fn replace_attribute(&mut self, name: &str, attr: Attribute) -> bool {
        if attr.name != name && self.attribute(&attr.name).is_some() {
            return false;
        }
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(slot) => {
                *slot = attr;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationshipType {
    #[serde(rename = "1-1")]
    OneToOne,
    #[default]
    #[serde(rename = "1-N")]
    OneToMany,
    #[serde(rename = "N-N")]
    ManyToMany,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 3] = [Self::OneToOne, Self::OneToMany, Self::ManyToMany];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "1-1",
            Self::OneToMany => "1-N",
            Self::ManyToMany => "N-N",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown relationship type: {0} (expected 1-1, 1-N or N-N)")]
pub struct UnknownRelationshipType(pub String);

impl FromStr for RelationshipType {
    type Err = UnknownRelationshipType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRelationshipType(s.to_string()))
    }
}

/// Directed, typed association between two tables, by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub from_table: String,
    pub to_table: String,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub from_key: String,
    #[serde(default)]
    pub to_key: String,
}

impl Relationship {
    pub fn new(
        from_table: impl Into<String>,
        to_table: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            to_table: to_table.into(),
            relationship_type,
            from_key: String::new(),
            to_key: String::new(),
        }
    }

    pub fn with_keys(mut self, from_key: impl Into<String>, to_key: impl Into<String>) -> Self {
        self.from_key = from_key.into();
        self.to_key = to_key.into();
        self
    }

    pub fn references(&self, table: &str) -> bool {
        self.from_table == table || self.to_table == table
    }

    pub fn has_keys(&self) -> bool {
        !self.from_key.is_empty() && !self.to_key.is_empty()
    }

    pub fn constraint_name(&self) -> String {
        format!("fk_{}_{}", self.from_table, self.to_table)
    }
}

/// The complete design: tables in insertion order plus relationships.
///
/// Removing a table cascades to every relationship that names it, and a
/// relationship is never stored twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SchemaRecord")]
pub struct Schema {
    name: String,
    tables: IndexMap<String, Table>,
    relationships: Vec<Relationship>,
}

#[derive(Deserialize)]
struct SchemaRecord {
    #[serde(default = "default_schema_name")]
    name: String,
    #[serde(default)]
    tables: IndexMap<String, Table>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

impl From<SchemaRecord> for Schema {
    fn from(record: SchemaRecord) -> Self {
        let mut schema = Schema::new(record.name);
        for (key, table) in record.tables {
            if key != table.name {
                tracing::warn!(
                    "Table stored under key {:?} is named {:?}; keying it by name",
                    key,
                    table.name
                );
            }
            schema.add_table(table);
        }
        for rel in record.relationships {
            schema.add_relationship(rel);
        }
        schema
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_NAME)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.tables.iter().eq(other.tables.iter())
            && self.relationships == other.relationships
    }
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
            relationships: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Insert `table`, replacing any table of the same name in its slot.
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Remove the table and every relationship that references it.
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        let removed = self.tables.shift_remove(name);
        self.relationships.retain(|r| !r.references(name));
        removed
    }

    /// Append `rel` unless a field-identical relationship is stored.
    /// Returns whether the schema changed.
    pub fn add_relationship(&mut self, rel: Relationship) -> bool {
        if self.relationships.contains(&rel) {
            return false;
        }
        self.relationships.push(rel);
        true
    }

    pub fn remove_relationship(&mut self, rel: &Relationship) -> bool {
        match self.relationships.iter().position(|r| r == rel) {
            Some(index) => {
                self.relationships.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn move_table(&mut self, name: &str, x: f64, y: f64) -> bool {
        match self.tables.get_mut(name) {
            Some(table) => {
                table.set_position(x, y);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.relationships.clear();
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> + '_ {
        self.tables.values()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.keys().map(String::as_str)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationships_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| r.references(table))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.relationships.is_empty()
    }
}
