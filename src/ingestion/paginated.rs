//! Paginated-table adapter (PDF-like).
//!
//! Input is the layout-preserving text layer of a paginated document: pages are separated by a
//! form feed (`\x0c`), cells within a line by two or more spaces or a tab. This is what a PDF text
//! extractor run in layout mode emits, and what [`crate::export::ExportFormat::Txt`] writes.
//!
//! Cells are assigned to the header column whose start offset is nearest, so a header spread
//! over several physical lines can be merged column-wise.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FormatResult;
use crate::normalize::compose_header;
use crate::types::{unique_labels, Record, RecordSet, Value};

/// Page separator emitted by PDF text extractors.
pub const PAGE_BREAK: char = '\x0c';

/// Which extent of the document a header applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageScope {
    /// One record set per page; the first line(s) of every page are consumed as its header.
    ///
    /// A table continuing over several pages loses one data row per continuation page to the
    /// header.
    #[default]
    PerPage,
    /// All pages form one table with a single header.
    WholeDocument,
}

/// Options for paginated reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginatedOptions {
    /// Header extent.
    pub scope: PageScope,
    /// The header spans more than one physical line.
    pub multi_line_headers: bool,
    /// Number of physical header lines merged when [`Self::multi_line_headers`] is set.
    pub header_depth: usize,
}

impl Default for PaginatedOptions {
    fn default() -> Self {
        Self {
            scope: PageScope::PerPage,
            multi_line_headers: false,
            header_depth: 2,
        }
    }
}

impl PaginatedOptions {
    fn header_lines(&self) -> usize {
        if self.multi_line_headers {
            self.header_depth.max(1)
        } else {
            1
        }
    }
}

/// A run of text and its character offset within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    start: usize,
    text: String,
}

/// Read a paginated text file. See [`read_pages_from_str`].
pub fn read_pages_from_path(path: impl AsRef<Path>, options: &PaginatedOptions) -> FormatResult<Vec<RecordSet>> {
    let text = fs::read_to_string(path)?;
    Ok(read_pages_from_str(&text, options))
}

/// Read paginated text.
///
/// With [`PageScope::PerPage`] the result has exactly one record set per non-blank page. With
/// [`PageScope::WholeDocument`] it has one record set; a header repeated on later pages shows up
/// as data rows, which the normalizer removes.
pub fn read_pages_from_str(input: &str, options: &PaginatedOptions) -> Vec<RecordSet> {
    let pages: Vec<Vec<&str>> = input
        .split(PAGE_BREAK)
        .map(|page| page.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>())
        .filter(|lines| !lines.is_empty())
        .collect();

    let out: Vec<RecordSet> = match options.scope {
        PageScope::PerPage => {
            // Later pages keep the column layout of the first page unless their own header line
            // has more cells than that layout has columns.
            let mut layout: Option<Vec<usize>> = None;
            let mut out = Vec::with_capacity(pages.len());
            for lines in &pages {
                let tokenized = tokenize_lines(lines);
                let own = header_anchors(&tokenized, options.header_lines());
                let anchors = match &layout {
                    Some(known) if own.len() <= known.len() => known.clone(),
                    _ => own,
                };
                layout.get_or_insert_with(|| anchors.clone());
                out.push(table_from_tokens(&tokenized, options.header_lines(), &anchors));
            }
            out
        }
        PageScope::WholeDocument => {
            let lines: Vec<&str> = pages.into_iter().flatten().collect();
            if lines.is_empty() {
                Vec::new()
            } else {
                let tokenized = tokenize_lines(&lines);
                let anchors = header_anchors(&tokenized, options.header_lines());
                vec![table_from_tokens(&tokenized, options.header_lines(), &anchors)]
            }
        }
    };
    tracing::debug!(scope = ?options.scope, tables = out.len(), "read paginated text");
    out
}

fn tokenize_lines(lines: &[&str]) -> Vec<Vec<Token>> {
    lines.iter().map(|l| tokenize(l)).collect()
}

/// Column anchors come from the header line with the most cells.
fn header_anchors(tokenized: &[Vec<Token>], header_lines: usize) -> Vec<usize> {
    let header_lines = header_lines.min(tokenized.len());
    tokenized[..header_lines]
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
        .map(|(_, toks)| toks.iter().map(|t| t.start).collect())
        .unwrap_or_default()
}

fn table_from_tokens(tokenized: &[Vec<Token>], header_lines: usize, anchors: &[usize]) -> RecordSet {
    let header_lines = header_lines.min(tokenized.len());
    let grid: Vec<Vec<String>> = tokenized
        .iter()
        .map(|toks| assign_to_columns(toks, anchors))
        .collect();

    let header = compose_header(&grid[..header_lines]);
    let labels = unique_labels(&header);
    let mut out = RecordSet::with_columns(labels.clone()).with_header_row(header);
    for row in &grid[header_lines..] {
        let record: Record = labels
            .iter()
            .zip(row)
            .map(|(label, cell)| (label.clone(), Value::text(cell.clone())))
            .collect();
        out.push(record);
    }
    out
}

/// Split a line into runs separated by a tab or two or more spaces.
fn tokenize(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while end < chars.len() {
            let c = chars[end];
            if c == '\t' {
                break;
            }
            if c == ' ' && chars.get(end + 1).is_none_or(|n| n.is_whitespace()) {
                break;
            }
            end += 1;
        }
        tokens.push(Token {
            start,
            text: chars[start..end].iter().collect(),
        });
        i = end;
    }
    tokens
}

/// Place each token in the column with the nearest anchor. Cells landing in the same column are
/// joined by a space.
fn assign_to_columns(tokens: &[Token], anchors: &[usize]) -> Vec<String> {
    let mut cells = vec![String::new(); anchors.len().max(1)];
    for tok in tokens {
        let col = anchors
            .iter()
            .enumerate()
            .min_by_key(|(_, a)| a.abs_diff(tok.start))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let cell = &mut cells[col];
        if !cell.is_empty() {
            cell.push(' ');
        }
        cell.push_str(&tok.text);
    }
    cells
}
