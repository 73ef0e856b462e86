//! Text output formatting.

use ytkit_core::Table;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Render a table with width-padded columns.
    pub fn format_table(&self, table: &Table) -> String {
        if table.n_cols() == 0 {
            return self.dim("(no columns)");
        }

        // Column width = widest of header and cells.
        let names = table.column_names();
        let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
        let rendered_rows: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        for row in &rendered_rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let mut lines = Vec::new();

        let header = names
            .iter()
            .zip(&widths)
            .map(|(name, &width)| format!("{name:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(self.bold(&header));
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("  "),
        );

        for row in &rendered_rows {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(line.trim_end().to_string());
        }

        if table.is_empty() {
            lines.push(self.dim("(no rows)"));
        }

        lines.join("\n")
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
