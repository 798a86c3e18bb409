//! Schema to SQL DDL generation.

mod generator;

pub use generator::{generate_sql, relationship_statement, table_statement};
