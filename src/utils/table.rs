/// A simple text table for the end-of-run summary in the log
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

impl Table {
    /// Create a new table with the given headers
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| display_width(h)).collect();
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, col) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(display_width(col));
            }
        }
        self.rows.push(row);
    }

    /// Render the table as plain text, one line per row
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_separator());

        for row in &self.rows {
            output.push('\n');
            output.push_str(&self.render_row(row));
        }

        output
    }

    /// Render a single row with proper spacing
    fn render_row(&self, row: &[String]) -> String {
        let mut cells = Vec::with_capacity(row.len());
        for (i, col) in row.iter().enumerate().take(self.col_widths.len()) {
            let pad = self.col_widths[i] - display_width(col);
            cells.push(format!("{}{}", col, " ".repeat(pad)));
        }
        cells.join(" | ").trim_end().to_string()
    }

    /// Render a separator line
    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(vec!["Locale", "Image", "Delivery"]);
        table.add_row(vec!["de".to_string(), "output/indices_DE_20261018.png".to_string(), "✅ delivered".to_string()]);
        table.add_row(vec!["en".to_string(), "—".to_string(), "❌ upload".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Locale | Image"));
        assert!(lines[1].starts_with("-------+-"));
        assert!(lines[2].contains("indices_DE_20261018.png"));
        assert!(lines[3].ends_with("❌ upload"));
    }

    #[test]
    fn test_columns_align_on_char_width() {
        let mut table = Table::new(vec!["A", "B"]);
        table.add_row(vec!["—".to_string(), "x".to_string()]);
        table.add_row(vec!["ab".to_string(), "y".to_string()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2], "—  | x");
        assert_eq!(lines[3], "ab | y");
    }
}
