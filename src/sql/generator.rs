//! `CREATE TABLE` / `ALTER TABLE` emission.
//!
//! Output order is fixed: every table statement in schema order, then every
//! foreign-key constraint in relationship order, separated by blank lines.

use crate::model::{Relationship, RelationshipType, Schema, Table};

const INDENT: &str = "    ";

/// Generate the SQL script for a whole schema. Never fails.
pub fn generate_sql(schema: &Schema) -> String {
    let tables = schema.tables().map(table_statement);
    let constraints = schema.relationships().iter().filter_map(relationship_statement);

    tables.chain(constraints).collect::<Vec<_>>().join("\n\n")
}

/// `CREATE TABLE` for one table, or a comment when it has no columns.
pub fn table_statement(table: &Table) -> String {
    let attributes = table.attributes();
    if attributes.is_empty() {
        return format!("-- Table {} has no attributes", table.name());
    }

    let mut lines = Vec::with_capacity(attributes.len() + 2);
    lines.push(format!("CREATE TABLE {} (", table.name()));

    for (i, attr) in attributes.iter().enumerate() {
        let mut line = format!("{}{} {}", INDENT, attr.name, attr.data_type);
        if attr.is_primary_key {
            line.push_str(" PRIMARY KEY");
        }
        if !attr.is_nullable {
            line.push_str(" NOT NULL");
        }
        if i + 1 < attributes.len() {
            line.push(',');
        }
        lines.push(line);
    }

    lines.push(");".to_string());
    lines.join("\n")
}

/// Foreign-key constraint for a one-to-many relationship with both keys set.
/// Other relationships are not materialized.
pub fn relationship_statement(rel: &Relationship) -> Option<String> {
    if rel.relationship_type != RelationshipType::OneToMany || !rel.has_keys() {
        return None;
    }

    Some(format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({});",
        rel.to_table,
        rel.constraint_name(),
        rel.to_key,
        rel.from_table,
        rel.from_key
    ))
}
