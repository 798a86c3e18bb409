//! JSON persistence of a [`Schema`] and SQL export.
//!
//! The JSON layout is the designer's file format:
//!
//! ```json
//! {
//!   "name": "MySchema",
//!   "tables": {
//!     "Users": { "name": "Users", "x": 100.0, "y": 100.0, "attributes": [...] }
//!   },
//!   "relationships": [
//!     { "from_table": "Users", "to_table": "Orders", "relationship_type": "1-N",
//!       "from_key": "id", "to_key": "user_id" }
//!   ]
//! }
//! ```
//!
//! Missing optional fields fall back to the model defaults, unknown fields
//! are ignored.

use crate::model::Schema;
use crate::sql::generate_sql;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Table '{0}' has a non-finite position")]
    NonFinitePosition(String),
}

pub fn to_value(schema: &Schema) -> Result<Value, DocumentError> {
    check_positions(schema)?;
    Ok(serde_json::to_value(schema)?)
}

pub fn from_value(value: Value) -> Result<Schema, DocumentError> {
    Ok(serde_json::from_value(value)?)
}

pub fn to_json(schema: &Schema) -> Result<String, DocumentError> {
    check_positions(schema)?;
    Ok(serde_json::to_string_pretty(schema)?)
}

pub fn from_json(source: &str) -> Result<Schema, DocumentError> {
    Ok(serde_json::from_str(source)?)
}

/// Read a schema document from disk.
pub fn load(path: impl AsRef<Path>) -> Result<Schema, DocumentError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = from_json(&source)?;
    tracing::info!(
        "Loaded schema {:?} ({} tables) from {}",
        schema.name(),
        schema.table_count(),
        path.display()
    );
    Ok(schema)
}

pub fn save(path: impl AsRef<Path>, schema: &Schema) -> Result<(), DocumentError> {
    let json = to_json(schema)?;
    write(path.as_ref(), &json)?;
    tracing::info!("Saved schema {:?} to {}", schema.name(), path.as_ref().display());
    Ok(())
}

/// Write the generated SQL script verbatim.
pub fn export_sql(path: impl AsRef<Path>, schema: &Schema) -> Result<(), DocumentError> {
    write(path.as_ref(), &generate_sql(schema))?;
    tracing::info!("Exported SQL for {:?} to {}", schema.name(), path.as_ref().display());
    Ok(())
}

// serde_json writes NaN and infinity as null, which would not load again
fn check_positions(schema: &Schema) -> Result<(), DocumentError> {
    match schema.tables().find(|t| !(t.x().is_finite() && t.y().is_finite())) {
        Some(table) => Err(DocumentError::NonFinitePosition(table.name().to_string())),
        None => Ok(()),
    }
}

fn write(path: &Path, contents: &str) -> Result<(), DocumentError> {
    fs::write(path, contents).map_err(|source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    })
}
