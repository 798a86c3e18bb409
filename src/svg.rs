use crate::measure::BlockMetrics;
use crate::model::RelationshipType;
use crate::view::{Canvas, RelationshipLink, TableBlock};
use std::fmt::Write;

pub struct SvgRenderer {
    metrics: BlockMetrics,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            metrics: BlockMetrics::default(),
        }
    }
}

impl SvgRenderer {
    pub fn new(metrics: BlockMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &BlockMetrics {
        &self.metrics
    }

    pub fn render(&self, canvas: &Canvas) -> String {
        let mut svg = String::new();

        let (left, top) = canvas.origin;
        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
            canvas.width, canvas.height, left, top, canvas.width, canvas.height
        )
        .unwrap();

        writeln!(
            &mut svg,
            r##"<style>
  .canvas {{ fill: #F5F5F5; }}
  .block {{ fill: #E8F4F8; stroke: #2E86AB; stroke-width: 2; }}
  .block.selected {{ stroke: #A23B72; stroke-width: 3; }}
  .table-name {{ font-family: Arial, sans-serif; font-size: 13px; font-weight: bold; }}
  .attribute {{ font-family: Courier, monospace; font-size: 11px; }}
  .link {{ stroke-width: 2; fill: none; }}
  .link-label {{ font-family: Arial, sans-serif; font-size: 11px; }}
</style>"##
        )
        .unwrap();

        writeln!(
            &mut svg,
            r#"<rect class="canvas" x="{}" y="{}" width="{}" height="{}" />"#,
            left, top, canvas.width, canvas.height
        )
        .unwrap();

        // Links first so blocks are drawn over them
        for link in &canvas.links {
            self.render_link(&mut svg, link);
        }

        for block in &canvas.blocks {
            self.render_block(&mut svg, block);
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_block(&self, svg: &mut String, block: &TableBlock) {
        let class = if block.selected { "block selected" } else { "block" };
        writeln!(
            svg,
            r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}" />"#,
            class, block.x, block.y, block.width, block.height
        )
        .unwrap();

        writeln!(
            svg,
            r#"<text class="table-name" x="{}" y="{}">{}</text>"#,
            block.x + self.metrics.padding_x / 2.0,
            block.y + self.metrics.title_height * 0.7,
            escape_xml(&block.name)
        )
        .unwrap();

        let mut line_y = block.y + self.metrics.title_height + self.metrics.line_height * 0.8;
        for line in &block.lines {
            writeln!(
                svg,
                r#"<text class="attribute" x="{}" y="{}">{}</text>"#,
                block.x + self.metrics.padding_x,
                line_y,
                escape_xml(line)
            )
            .unwrap();
            line_y += self.metrics.line_height;
        }
    }

    fn render_link(&self, svg: &mut String, link: &RelationshipLink) {
        let (x1, y1) = link.from_point;
        let (x2, y2) = link.to_point;
        let color = link_color(link.kind);

        writeln!(
            svg,
            r#"<line class="link" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" />"#,
            x1, y1, x2, y2, color
        )
        .unwrap();

        writeln!(
            svg,
            r#"<text class="link-label" x="{}" y="{}" fill="{}" text-anchor="middle">{}</text>"#,
            (x1 + x2) / 2.0,
            (y1 + y2) / 2.0 - 5.0,
            color,
            link.kind
        )
        .unwrap();
    }
}

pub fn link_color(kind: RelationshipType) -> &'static str {
    match kind {
        RelationshipType::OneToOne => "#F18F01",
        RelationshipType::OneToMany => "#C73E1D",
        RelationshipType::ManyToMany => "#6A994E",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Relationship, Schema, Table};

    fn canvas() -> Canvas {
        let mut schema = Schema::default();
        let mut users = Table::new("Users");
        users.add_attribute(Attribute::new("id", "INT").primary_key());
        users.add_attribute(Attribute::new("price", "DECIMAL(10,2)"));
        schema.add_table(users);
        schema.add_table(Table::new("Orders").with_position(500.0, 100.0));
        schema.add_table(Table::new("Tags").with_position(500.0, 400.0));
        schema.add_relationship(Relationship::new("Users", "Orders", RelationshipType::OneToMany));
        schema.add_relationship(Relationship::new("Users", "Tags", RelationshipType::ManyToMany));
        Canvas::from_schema(&schema, &BlockMetrics::default())
    }

    #[test]
    fn test_render_basic() {
        let svg = SvgRenderer::default().render(&canvas());

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="1200""#));
        assert!(svg.contains(">Users</text>"));
        assert!(svg.contains(">[PK] id: INT</text>"));
        assert!(svg.contains(">price: DECIMAL(10,2)</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_links() {
        let svg = SvgRenderer::default().render(&canvas());

        assert_eq!(svg.matches(r#"class="link""#).count(), 2);
        assert!(svg.contains(r##"stroke="#C73E1D""##));
        assert!(svg.contains(r##"stroke="#6A994E""##));
        assert!(svg.contains(">1-N</text>"));
        assert!(svg.contains(">N-N</text>"));
    }

    #[test]
    fn test_render_selection() {
        let mut canvas = canvas();
        let svg = SvgRenderer::default().render(&canvas);
        assert!(!svg.contains(r#"class="block selected""#));

        canvas.select("Orders");
        let svg = SvgRenderer::default().render(&canvas);
        assert_eq!(svg.matches(r#"class="block selected""#).count(), 1);
    }

    #[test]
    fn test_render_escapes_text() {
        let mut schema = Schema::default();
        let mut table = Table::new("A&B");
        table.add_attribute(Attribute::new("tag", "ENUM(\"<x>\")"));
        schema.add_table(table);
        let svg = SvgRenderer::default().render(&Canvas::from_schema(&schema, &BlockMetrics::default()));

        assert!(svg.contains(">A&amp;B</text>"));
        assert!(svg.contains("tag: ENUM(&quot;&lt;x&gt;&quot;)"));
    }

    #[test]
    fn test_view_box_follows_canvas_origin() {
        let svg = SvgRenderer::default().render(&canvas());
        assert!(svg.contains(r#"viewBox="0 0 1200 800""#));

        let mut schema = Schema::default();
        schema.add_table(Table::new("Users").with_position(-500.0, -400.0));
        let svg = SvgRenderer::default().render(&Canvas::from_schema(&schema, &BlockMetrics::default()));

        assert!(svg.contains(r#"viewBox="-540 -440 1200 800""#));
        assert!(svg.contains(r#"<rect class="canvas" x="-540" y="-440" width="1200" height="800" />"#));
        assert!(svg.contains(r#"<rect class="block" x="-500" y="-400" width="200" height="150" />"#));
    }

    #[test]
    fn test_link_colors() {
        assert_eq!(link_color(RelationshipType::OneToOne), "#F18F01");
        assert_eq!(link_color(RelationshipType::OneToMany), "#C73E1D");
        assert_eq!(link_color(RelationshipType::ManyToMany), "#6A994E");
    }
}
