// =============================================================================
// Console Tables
// =============================================================================
//
// Fixed-width, left-aligned rendering. Every field is padded to the widest
// header or cell plus one space, so columns line up for any mix of names.
// =============================================================================

use std::fmt::Write;

use linreg_core::{Dataset, TabularData};

const NULL_CELL: &str = "(NULL)";

/// Render a dataset: header line, blank line, then one line per row.
///
/// Empty cells are shown as `(NULL)`.
pub fn render_table(data: &Dataset) -> String {
    let cells: Vec<Vec<String>> = data
        .iter()
        .map(|(_, column)| {
            (0..data.num_rows())
                .map(|row| match column.cell_text(row) {
                    Some(text) if !text.trim().is_empty() => text,
                    _ => NULL_CELL.to_string(),
                })
                .collect()
        })
        .collect();

    let width = data
        .column_headers()
        .iter()
        .map(|h| h.chars().count())
        .chain(cells.iter().flatten().map(|c| c.chars().count()))
        .max()
        .unwrap_or(0)
        + 1;

    let mut out = String::new();
    let header: String = data
        .column_headers()
        .iter()
        .map(|h| format!("{:<width$}", h, width = width))
        .collect();
    push_line(&mut out, &header);
    out.push('\n');

    for row in 0..data.num_rows() {
        let line: String = cells
            .iter()
            .map(|column| format!("{:<width$}", column[row], width = width))
            .collect();
        push_line(&mut out, &line);
    }
    out
}

/// Render `(term, estimate)` pairs as a two-column table.
pub fn render_coefficients(named: &[(String, f64)]) -> String {
    let term_width = named
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(std::iter::once("term".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{:<w$}  {:>16}", "term", "estimate", w = term_width);
    for (name, value) in named {
        let _ = writeln!(out, "{:<w$}  {:>16.8}", name, value, w = term_width);
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}
