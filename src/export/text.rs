use std::io::Write;

use crate::error::FormatResult;
use crate::export::ExportOptions;
use crate::ingestion::paginated::PAGE_BREAK;
use crate::types::RecordSet;

const GAP: &str = "  ";

/// Fixed-width layout: every column padded to its widest cell and separated by two spaces.
///
/// Runs of whitespace inside a cell collapse to one space so cells stay single tokens for the
/// paginated reader. With `txt_page_rows` a form feed and the header start each new page.
pub(crate) fn write_fixed_width<W: Write>(rs: &RecordSet, mut writer: W, options: &ExportOptions) -> FormatResult<usize> {
    let header: Vec<String> = rs.columns().iter().map(|c| single_line(c)).collect();
    let rows: Vec<Vec<String>> = rs
        .records()
        .iter()
        .map(|r| {
            rs.columns()
                .iter()
                .map(|c| single_line(&options.cell_text(r.get(c))))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let page_rows = options.txt_page_rows.filter(|n| *n > 0).unwrap_or(usize::MAX);
    write_line(&mut writer, &header, &widths)?;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 && i % page_rows == 0 {
            write!(writer, "{PAGE_BREAK}")?;
            write_line(&mut writer, &header, &widths)?;
        }
        write_line(&mut writer, row, &widths)?;
    }
    Ok(rows.len())
}

fn write_line<W: Write>(writer: &mut W, cells: &[String], widths: &[usize]) -> std::io::Result<()> {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(GAP);
        }
        line.push_str(cell);
        line.extend(std::iter::repeat_n(' ', width - cell.chars().count()));
    }
    writeln!(writer, "{}", line.trim_end())
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
