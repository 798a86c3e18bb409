//! Disposable canvas view-model derived from a [`Schema`].
//!
//! Nothing here feeds back into the schema: front ends rebuild a [`Canvas`]
//! after every change and keep selection state on it.

use crate::measure::BlockMetrics;
use crate::model::{Attribute, RelationshipType, Schema};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Canvas {
    pub blocks: Vec<TableBlock>,
    pub links: Vec<RelationshipLink>,
    /// Top-left corner of the visible area. Negative when a table sits left
    /// of or above the origin.
    pub origin: (f64, f64),
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct TableBlock {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<String>,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct RelationshipLink {
    pub from: String,
    pub to: String,
    pub kind: RelationshipType,
    pub from_point: (f64, f64),
    pub to_point: (f64, f64),
}

impl TableBlock {
    pub fn right_anchor(&self) -> (f64, f64) {
        (self.x + self.width, self.y + self.height / 2.0)
    }

    pub fn left_anchor(&self) -> (f64, f64) {
        (self.x, self.y + self.height / 2.0)
    }
}

pub fn attribute_line(attr: &Attribute) -> String {
    let prefix = if attr.is_primary_key { "[PK] " } else { "" };
    format!("{}{}: {}", prefix, attr.name, attr.data_type)
}

impl Canvas {
    pub fn from_schema(schema: &Schema, metrics: &BlockMetrics) -> Self {
        let blocks: Vec<TableBlock> = schema
            .tables()
            .map(|table| {
                let lines: Vec<String> = table.attributes().iter().map(attribute_line).collect();
                let (width, height) = metrics.block_size(table.name(), &lines);
                TableBlock {
                    name: table.name().to_string(),
                    x: table.x(),
                    y: table.y(),
                    width,
                    height,
                    lines,
                    selected: false,
                }
            })
            .collect();

        let block_map: HashMap<&str, &TableBlock> =
            blocks.iter().map(|b| (b.name.as_str(), b)).collect();

        // Relationships naming a missing table have nothing to attach to
        let links: Vec<RelationshipLink> = schema
            .relationships()
            .iter()
            .filter_map(|r| {
                let from = block_map.get(r.from_table.as_str())?;
                let to = block_map.get(r.to_table.as_str())?;
                Some(RelationshipLink {
                    from: r.from_table.clone(),
                    to: r.to_table.clone(),
                    kind: r.relationship_type,
                    from_point: from.right_anchor(),
                    to_point: to.left_anchor(),
                })
            })
            .collect();

        let margin = metrics.canvas_margin;
        let left = blocks.iter().map(|b| b.x - margin).fold(0.0, f64::min);
        let top = blocks.iter().map(|b| b.y - margin).fold(0.0, f64::min);
        let right = blocks.iter().map(|b| b.x + b.width).fold(0.0, f64::max);
        let bottom = blocks.iter().map(|b| b.y + b.height).fold(0.0, f64::max);

        Canvas {
            origin: (left, top),
            width: (right + margin - left).max(metrics.min_canvas_width),
            height: (bottom + margin - top).max(metrics.min_canvas_height),
            blocks,
            links,
        }
    }

    /// Select a single block by table name, clearing any previous selection.
    pub fn select(&mut self, name: &str) -> bool {
        let mut found = false;
        for block in &mut self.blocks {
            block.selected = block.name == name;
            found |= block.selected;
        }
        found
    }

    pub fn selected(&self) -> Option<&TableBlock> {
        self.blocks.iter().find(|b| b.selected)
    }

    pub fn block(&self, name: &str) -> Option<&TableBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Relationship, Table};

    fn schema() -> Schema {
        let mut schema = Schema::default();
        let mut users = Table::new("Users").with_position(50.0, 60.0);
        users.add_attribute(Attribute::new("id", "INT").primary_key());
        users.add_attribute(Attribute::new("email", "TEXT"));
        schema.add_table(users);
        schema.add_table(Table::new("Orders").with_position(400.0, 300.0));
        schema.add_relationship(Relationship::new("Users", "Orders", RelationshipType::OneToMany));
        schema
    }

    #[test]
    fn test_blocks_follow_schema() {
        let canvas = Canvas::from_schema(&schema(), &BlockMetrics::default());

        assert_eq!(canvas.blocks.len(), 2);
        let users = canvas.block("Users").unwrap();
        assert_eq!((users.x, users.y), (50.0, 60.0));
        assert_eq!(users.lines, vec!["[PK] id: INT", "email: TEXT"]);
        assert_eq!((users.width, users.height), (200.0, 150.0));
    }

    #[test]
    fn test_link_anchors() {
        let canvas = Canvas::from_schema(&schema(), &BlockMetrics::default());

        assert_eq!(canvas.links.len(), 1);
        let link = &canvas.links[0];
        assert_eq!(link.kind, RelationshipType::OneToMany);
        assert_eq!(link.from_point, (250.0, 135.0));
        assert_eq!(link.to_point, (400.0, 375.0));
    }

    #[test]
    fn test_dangling_relationship_has_no_link() {
        let mut schema = schema();
        schema.add_relationship(Relationship::new("Users", "Ghost", RelationshipType::OneToOne));

        let canvas = Canvas::from_schema(&schema, &BlockMetrics::default());
        assert_eq!(canvas.links.len(), 1);
    }

    #[test]
    fn test_canvas_size() {
        let metrics = BlockMetrics::default();
        let canvas = Canvas::from_schema(&schema(), &metrics);
        assert_eq!((canvas.width, canvas.height), (1200.0, 800.0));

        let mut far = schema();
        far.move_table("Orders", 2000.0, 1000.0);
        let canvas = Canvas::from_schema(&far, &metrics);
        assert_eq!((canvas.width, canvas.height), (2240.0, 1190.0));
        assert_eq!(canvas.origin, (0.0, 0.0));
    }

    #[test]
    fn test_canvas_covers_negative_positions() {
        let metrics = BlockMetrics::default();
        let mut schema = schema();
        schema.move_table("Users", -500.0, -400.0);
        let canvas = Canvas::from_schema(&schema, &metrics);

        assert_eq!(canvas.origin, (-540.0, -440.0));
        let users = canvas.block("Users").unwrap();
        assert!(users.x >= canvas.origin.0 && users.y >= canvas.origin.1);
        // Orders still ends at y = 450
        assert_eq!((canvas.width, canvas.height), (1200.0, 450.0 + 40.0 + 440.0));

        schema.move_table("Orders", 2000.0, 0.0);
        let canvas = Canvas::from_schema(&schema, &metrics);
        assert_eq!(canvas.width, 2000.0 + 200.0 + 40.0 + 540.0);
    }

    #[test]
    fn test_select() {
        let mut canvas = Canvas::from_schema(&schema(), &BlockMetrics::default());
        assert!(canvas.selected().is_none());

        assert!(canvas.select("Users"));
        assert!(canvas.select("Orders"));
        assert_eq!(canvas.selected().map(|b| b.name.as_str()), Some("Orders"));
        assert_eq!(canvas.blocks.iter().filter(|b| b.selected).count(), 1);

        assert!(!canvas.select("Ghost"));
        assert!(canvas.selected().is_none());
    }
}
