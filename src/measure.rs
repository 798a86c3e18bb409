use unicode_width::UnicodeWidthStr;

/// Sizing rules for table blocks on the canvas.
#[derive(Debug, Clone)]
pub struct BlockMetrics {
    pub title_char_width: f64,
    pub line_char_width: f64,
    pub title_height: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub min_block_width: f64,
    pub min_block_height: f64,
    pub canvas_margin: f64,
    pub min_canvas_width: f64,
    pub min_canvas_height: f64,
}

impl Default for BlockMetrics {
    fn default() -> Self {
        Self {
            title_char_width: 8.0,
            line_char_width: 6.0,
            title_height: 25.0,
            line_height: 15.0,
            padding_x: 10.0,
            padding_y: 10.0,
            min_block_width: 200.0,
            min_block_height: 150.0,
            canvas_margin: 40.0,
            min_canvas_width: 1200.0,
            min_canvas_height: 800.0,
        }
    }
}

impl BlockMetrics {
    pub fn title_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.title_char_width
    }

    pub fn line_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.line_char_width
    }

    pub fn block_size(&self, title: &str, lines: &[String]) -> (f64, f64) {
        let content_width = lines
            .iter()
            .map(|l| self.line_width(l))
            .fold(self.title_width(title), f64::max);
        let width = (content_width + self.padding_x * 2.0).max(self.min_block_width);

        let height = self.title_height + lines.len() as f64 * self.line_height + self.padding_y;
        (width, height.max(self.min_block_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = BlockMetrics::default();
        assert_eq!(m.line_width("user_id"), 7.0 * 6.0);
        assert_eq!(m.title_width("Users"), 5.0 * 8.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = BlockMetrics::default();
        // full-width characters count double
        assert_eq!(m.line_width("ユーザー"), 8.0 * 6.0);
    }

    #[test]
    fn test_small_block_uses_minimum() {
        let m = BlockMetrics::default();
        assert_eq!(m.block_size("Users", &[]), (200.0, 150.0));
        assert_eq!(m.block_size("Users", &["id: INT".to_string()]), (200.0, 150.0));
    }

    #[test]
    fn test_block_grows_with_content() {
        let m = BlockMetrics::default();
        let long = "[PK] a_really_long_attribute_name: VARCHAR(255)".to_string();
        let (w, _) = m.block_size("Users", &[long.clone()]);
        assert_eq!(w, m.line_width(&long) + 20.0);

        let lines: Vec<String> = (0..12).map(|i| format!("c{}: INT", i)).collect();
        let (_, h) = m.block_size("Users", &lines);
        assert_eq!(h, 25.0 + 12.0 * 15.0 + 10.0);
    }
}
