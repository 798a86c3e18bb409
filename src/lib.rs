pub mod arrange;
pub mod document;
pub mod measure;
pub mod model;
pub mod session;
pub mod sql;
pub mod svg;
pub mod view;

use wasm_bindgen::prelude::*;

pub use document::DocumentError;
pub use model::{Attribute, Relationship, RelationshipType, Schema, Table};
pub use session::{DesignError, Designer, DesignerConfig};
pub use sql::generate_sql;

use measure::BlockMetrics;
use svg::SvgRenderer;
use view::Canvas;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Generate SQL from a schema JSON document
#[wasm_bindgen(js_name = "generateSql")]
pub fn generate_sql_from_json(source: &str) -> Result<String, String> {
    let schema = document::from_json(source).map_err(|e| e.to_string())?;
    Ok(generate_sql(&schema))
}

/// Render a schema JSON document to an SVG canvas snapshot
#[wasm_bindgen(js_name = "schemaToSvg")]
pub fn render_schema(source: &str, selected: Option<String>) -> Result<String, String> {
    let schema = document::from_json(source).map_err(|e| e.to_string())?;

    let metrics = BlockMetrics::default();
    let mut canvas = Canvas::from_schema(&schema, &metrics);
    if let Some(name) = selected.as_deref() {
        canvas.select(name);
    }

    Ok(SvgRenderer::new(metrics).render(&canvas))
}
