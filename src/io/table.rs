use prettytable::{format, Cell, Row, Table};

/// Renders rows as a borderless table with a bold header line.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();

    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    table.set_titles(Row::new(
        headers
            .iter()
            .map(|header| Cell::new(header).style_spec("bFg"))
            .collect(),
    ));

    for row in rows {
        table.add_row(Row::new(
            row.iter().map(|value| Cell::new(value).style_spec("Fw")).collect(),
        ));
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let rows = vec![
            vec!["Blog".to_string(), "yes".to_string()],
            vec!["Shop".to_string(), "no".to_string()],
        ];

        // Test
        let text = render_table(&["Plugin", "Loaded"], &rows);

        // Validate
        assert!(text.contains("Plugin"));
        assert!(text.contains("Blog"));
        assert!(text.contains("Shop"));
        assert!(text.find("Blog") < text.find("Shop"));
    }
}
