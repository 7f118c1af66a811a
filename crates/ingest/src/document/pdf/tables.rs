//! Ruling-free table detection from column-aligned text lines.

use docstruct_core::config::PdfConfig;

use super::layout::{join_spans, TextLine, TextSpan};

/// A table found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// Top of the first row, top-down.
    pub top: f64,
    /// Cell texts, one entry per anchor column; missing cells are empty.
    pub rows: Vec<Vec<String>>,
    /// Indices of the page lines that make up the table.
    pub lines: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    x: f64,
    text: String,
}

/// Split a line into cells wherever two spans are further apart than
/// `column_gap`.
fn split_cells(line: &TextLine, column_gap: f64) -> Vec<Cell> {
    let mut groups: Vec<Vec<TextSpan>> = Vec::new();
    for span in &line.spans {
        match groups.last_mut() {
            Some(group)
                if group
                    .last()
                    .is_some_and(|prev| span.x - prev.right() <= column_gap) =>
            {
                group.push(span.clone());
            }
            _ => groups.push(vec![span.clone()]),
        }
    }
    groups
        .into_iter()
        .filter_map(|group| {
            let x = group.first()?.x;
            Some(Cell {
                x,
                text: join_spans(&group).trim().to_string(),
            })
        })
        .collect()
}

/// Column index of each cell against the anchor columns, or `None` when a
/// cell lines up with no column or two cells share one.
fn align(cells: &[Cell], columns: &[f64], tolerance: f64) -> Option<Vec<usize>> {
    let mut used = vec![false; columns.len()];
    let mut indices = Vec::with_capacity(cells.len());
    for cell in cells {
        let (index, distance) = columns
            .iter()
            .enumerate()
            .map(|(i, x)| (i, (cell.x - x).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        if distance > tolerance || used[index] {
            return None;
        }
        used[index] = true;
        indices.push(index);
    }
    Some(indices)
}

/// Find runs of at least `min_table_rows` consecutive lines that split into
/// two or more cells aligned with the first line's columns.
pub fn detect_tables(lines: &[TextLine], config: &PdfConfig) -> Vec<DetectedTable> {
    let cells: Vec<Vec<Cell>> = lines
        .iter()
        .map(|line| split_cells(line, config.column_gap))
        .collect();

    let mut tables = Vec::new();
    let mut start = 0;
    while start < lines.len() {
        if cells[start].len() < 2 {
            start += 1;
            continue;
        }
        let columns: Vec<f64> = cells[start].iter().map(|c| c.x).collect();
        let mut rows = Vec::new();
        let mut end = start;
        while end < lines.len() && cells[end].len() >= 2 {
            let Some(indices) = align(&cells[end], &columns, config.column_gap) else {
                break;
            };
            let mut row = vec![String::new(); columns.len()];
            for (cell, index) in cells[end].iter().zip(indices) {
                row[index] = cell.text.clone();
            }
            rows.push(row);
            end += 1;
        }

        if rows.len() >= config.min_table_rows.max(1) && end > start {
            tables.push(DetectedTable {
                top: lines[start].top,
                rows,
                lines: (start..end).collect(),
            });
            start = end;
        } else {
            start += 1;
        }
    }
    tables
}
